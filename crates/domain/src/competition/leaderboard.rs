//! Leaderboard payload of a v1 competition.

use serde::{Deserialize, Serialize};

/// One player's standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// Player display name.
    pub player_name: String,
    /// Points accumulated in the competition.
    #[serde(default)]
    pub total_points: f64,
    /// Number of logged entries.
    #[serde(default)]
    pub entries: u32,
    /// Timestamp of the latest entry.
    #[serde(default)]
    pub last_entry_at: Option<String>,
    /// Team the player competes for.
    #[serde(default)]
    pub team_name: Option<String>,
}

/// Leaderboard response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LeaderboardEntries {
    /// Standings, in server order.
    #[serde(default)]
    pub rows: Vec<LeaderboardRow>,
}

impl LeaderboardEntries {
    /// Returns true if at least one row exists.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.rows.is_empty()
    }
}

//! Wire shapes of v1 and v2 competitions.

use serde::{Deserialize, Serialize};

/// A v1 booking competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    /// Competition identifier.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Start timestamp as sent by the backend.
    #[serde(default)]
    pub start_time: String,
    /// End timestamp as sent by the backend.
    #[serde(default)]
    pub end_time: String,
    /// Whether the competition is marked active.
    #[serde(default)]
    pub is_active: bool,
    /// Whether the competition is hidden from players.
    #[serde(default)]
    pub is_hidden: bool,
    /// Tiebreaker strategy name.
    #[serde(default)]
    pub tiebreaker: String,
    /// Creator, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: String,
    /// Name of team A in team competitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_a_name: Option<String>,
    /// Name of team B in team competitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_b_name: Option<String>,
    /// Whether players are assigned to teams automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_assign_teams: Option<bool>,
}

impl Competition {
    /// Returns true if the competition is active and visible.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.is_active && !self.is_hidden
    }
}

/// Lifecycle state of a v2 competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionState {
    /// Being configured, not yet started.
    Draft,
    /// Running.
    Active,
    /// Temporarily halted.
    Paused,
    /// Scored and closed.
    Finalized,
    /// Missing, or any state this client does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A competitions 2.0 competition.
///
/// Rules, theme and prizes are carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionV2 {
    /// Competition identifier.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Start timestamp as sent by the backend.
    #[serde(default)]
    pub start_time: String,
    /// End timestamp as sent by the backend.
    #[serde(default)]
    pub end_time: String,
    /// Lifecycle state. Only the exact lowercase `active` is active.
    #[serde(default)]
    pub state: CompetitionState,
    /// Legacy active flag, not used for selection.
    #[serde(default)]
    pub is_active: bool,
    /// Whether the competition is hidden from players.
    #[serde(default)]
    pub is_hidden: bool,
    /// Scoring rules.
    #[serde(default)]
    pub rules: serde_json::Value,
    /// Visual theme.
    #[serde(default)]
    pub theme: serde_json::Value,
    /// Prize configuration.
    #[serde(default)]
    pub prizes: serde_json::Value,
    /// Owning team.
    #[serde(default)]
    pub team_id: Option<i64>,
    /// Creator, when known.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: String,
}

impl CompetitionV2 {
    /// Returns true if the state is `active` and the competition is visible.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.state == CompetitionState::Active && !self.is_hidden
    }
}

/// Converts a v2 competition into the v1 shape for legacy views.
impl From<&CompetitionV2> for Competition {
    fn from(v2: &CompetitionV2) -> Self {
        Self {
            id: v2.id,
            name: v2.name.clone(),
            description: Some(v2.description.clone().unwrap_or_default()),
            start_time: v2.start_time.clone(),
            end_time: v2.end_time.clone(),
            is_active: v2.state == CompetitionState::Active,
            is_hidden: v2.is_hidden,
            tiebreaker: "highest_total".to_string(),
            created_by: v2.created_by.clone(),
            created_at: v2.created_at.clone(),
            updated_at: v2.updated_at.clone(),
            team_a_name: None,
            team_b_name: None,
            auto_assign_teams: None,
        }
    }
}

/// A competition listing, either a bare array or wrapped in `data`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CompetitionList<T> {
    /// `[ ... ]`
    Bare(Vec<T>),
    /// `{ "data": [ ... ] }`; a missing `data` reads as empty.
    Wrapped {
        /// Wrapped items.
        #[serde(default = "Vec::new")]
        data: Vec<T>,
    },
}

impl<T> CompetitionList<T> {
    /// Returns the listed competitions in original order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

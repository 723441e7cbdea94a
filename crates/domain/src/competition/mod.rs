//! Competition payloads from both API generations.
//!
//! The backend serves two incompatible competition shapes: the original
//! booking competitions (v1, flagged by `is_active`) and competitions 2.0
//! (v2, driven by a `state` field). The client core reads both and
//! reduces them to a single [`ActiveCompetition`].

mod active;
mod helpers;
mod leaderboard;
mod payload;

pub use active::{ActiveCompetition, CompetitionPayload};
pub use helpers::{
    format_points, looks_like_v2, parse_timestamp, player_rank, progress_percent, time_remaining,
};
pub use leaderboard::{LeaderboardEntries, LeaderboardRow};
pub use payload::{Competition, CompetitionList, CompetitionState, CompetitionV2};

//! QuestBoard Domain - Core client types
//!
//! This crate defines the domain model of the QuestBoard client core:
//! typed API errors, call options, backend payloads, query keys and the
//! active-competition state. All types here are pure Rust with no I/O
//! dependencies.

pub mod api_error;
pub mod call_options;
pub mod competition;
pub mod error;
pub mod query;
pub mod response;
pub mod settings;
pub mod state;

pub use api_error::{ApiError, ApiErrorCause};
pub use call_options::{CallOptions, MAX_CALL_BACKOFF};
pub use competition::{
    ActiveCompetition, Competition, CompetitionList, CompetitionPayload, CompetitionState,
    CompetitionV2, LeaderboardEntries, LeaderboardRow,
};
pub use error::{DomainError, DomainResult};
pub use query::{QueryKey, QueryPolicy};
pub use response::BrainResponse;
pub use settings::ClientSettings;
pub use state::{CompetitionSnapshot, ResolverPhase};

//! Active-competition state for UI binding.
//!
//! The resolver publishes a [`CompetitionSnapshot`] after every
//! transition; consumers read `active` for feature gating and `phase` for
//! loading indicators.

use serde::{Deserialize, Serialize};

use crate::competition::ActiveCompetition;

/// Where the resolver is in its refresh cycle.
///
/// `Idle` until the first refresh starts, `Loading` while one runs and
/// `Resolved` once any refresh has committed a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolverPhase {
    /// No refresh has started yet.
    #[default]
    Idle,
    /// A refresh is in progress.
    Loading,
    /// A selection (possibly none) has been committed.
    Resolved,
}

/// Shared view of the active competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CompetitionSnapshot {
    /// The active competition, if any.
    pub active: Option<ActiveCompetition>,
    /// Refresh cycle position.
    pub phase: ResolverPhase,
}

impl CompetitionSnapshot {
    /// Returns true while a refresh is running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.phase, ResolverPhase::Loading)
    }

    /// Returns true if an active competition is known.
    ///
    /// Features that need a live competition (e.g. battles) gate on this.
    #[must_use]
    pub const fn has_active_competition(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the active competition id.
    #[must_use]
    pub fn active_id(&self) -> Option<i64> {
        self.active.as_ref().map(|c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_idle_and_empty() {
        let snapshot = CompetitionSnapshot::default();
        assert_eq!(snapshot.phase, ResolverPhase::Idle);
        assert!(!snapshot.is_loading());
        assert!(!snapshot.has_active_competition());
        assert_eq!(snapshot.active_id(), None);
    }

    #[test]
    fn test_loading_phase() {
        let snapshot = CompetitionSnapshot {
            active: None,
            phase: ResolverPhase::Loading,
        };
        assert!(snapshot.is_loading());
    }
}

//! Active-competition resolution across both competition API generations.
//!
//! A refresh lists v1 and v2 competitions concurrently. Eligible v1
//! competitions win over v2 ones; among v1 candidates the first one whose
//! leaderboard already has rows is preferred, otherwise the first candidate
//! is taken. The selection is published as a [`CompetitionSnapshot`] on a
//! watch channel.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use questboard_domain::{
    ActiveCompetition, BrainResponse, CallOptions, Competition, CompetitionList,
    CompetitionSnapshot, CompetitionV2, ResolverPhase,
};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::call::ApiCaller;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{BrainClient, Notifier, TransportResult};

/// Message shown to the user when a refresh fails.
pub const REFRESH_FAILED_MESSAGE: &str = "Failed to load active competition";

/// Leaderboard body read only for whether `rows` has entries.
#[derive(Deserialize)]
struct RowPresence {
    #[serde(default)]
    rows: Vec<IgnoredAny>,
}

/// Owns the active-competition state and keeps it current.
///
/// Overlapping refreshes are allowed; only the most recently started one
/// commits its result.
pub struct CompetitionResolver<B, N: Notifier> {
    brain: B,
    caller: ApiCaller<N>,
    options: CallOptions,
    state: watch::Sender<CompetitionSnapshot>,
    generation: AtomicU64,
    committed: AtomicBool,
}

impl<B: BrainClient, N: Notifier> CompetitionResolver<B, N> {
    /// Creates an idle resolver with no active competition.
    pub fn new(brain: B, notifier: N) -> Self {
        Self {
            brain,
            caller: ApiCaller::new(notifier),
            options: CallOptions::default().with_retries(0),
            state: watch::Sender::new(CompetitionSnapshot::default()),
            generation: AtomicU64::new(0),
            committed: AtomicBool::new(false),
        }
    }

    /// Sets the request policy used for listings and probes.
    ///
    /// Defaults to a 12 s timeout without retries.
    #[must_use]
    pub fn with_call_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<CompetitionSnapshot> {
        self.state.subscribe()
    }

    /// Returns the current state.
    pub fn snapshot(&self) -> CompetitionSnapshot {
        self.state.borrow().clone()
    }

    /// Returns the active competition, if any.
    pub fn active_competition(&self) -> Option<ActiveCompetition> {
        self.state.borrow().active.clone()
    }

    /// Returns true if an active competition is known.
    pub fn has_active_competition(&self) -> bool {
        self.state.borrow().has_active_competition()
    }

    /// Replaces the active competition directly.
    ///
    /// Supersedes any refresh still running.
    pub fn set_active_competition(&self, competition: Option<ActiveCompetition>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.committed.store(true, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.active = competition;
            s.phase = ResolverPhase::Resolved;
        });
    }

    /// Re-resolves the active competition and returns the resulting value.
    ///
    /// Never fails: on an unexpected error the user is notified and the
    /// previous selection is kept.
    pub async fn refresh(&self) -> Option<ActiveCompetition> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.phase = ResolverPhase::Loading);
        debug!(generation, "refreshing active competition");

        let outcome = self.resolve().await;
        let current = self.generation.load(Ordering::SeqCst) == generation;

        match outcome {
            Ok(selected) if current => {
                info!(
                    id = ?selected.as_ref().map(|c| c.id),
                    is_v2 = selected.as_ref().is_some_and(|c| c.is_v2),
                    "active competition resolved"
                );
                self.committed.store(true, Ordering::SeqCst);
                self.state.send_modify(|s| {
                    s.active = selected;
                    s.phase = ResolverPhase::Resolved;
                });
            }
            Ok(_) => debug!(generation, "discarding superseded refresh"),
            Err(e) if current => {
                warn!(error = %e, "failed to refresh active competition");
                self.caller.notifier().notify_error(REFRESH_FAILED_MESSAGE);
                let phase = if self.committed.load(Ordering::SeqCst) {
                    ResolverPhase::Resolved
                } else {
                    ResolverPhase::Idle
                };
                self.state.send_modify(|s| s.phase = phase);
            }
            Err(e) => debug!(generation, error = %e, "discarding superseded failed refresh"),
        }

        self.active_competition()
    }

    async fn resolve(&self) -> ApplicationResult<Option<ActiveCompetition>> {
        let (v1, v2) = futures::future::join(
            self.fetch("v1 competitions", || self.brain.list_competitions()),
            self.fetch("v2 competitions", || self.brain.list_competitions_v2()),
        )
        .await;

        if let Some(response) = v1 {
            let competitions: Vec<Competition> = decode_list(response, "v1 competitions")?;
            let candidates: Vec<Competition> =
                competitions.into_iter().filter(Competition::is_eligible).collect();
            if let Some(selected) = self.select_v1(candidates).await {
                return Ok(Some(ActiveCompetition::from_v1(selected)));
            }
        }

        if let Some(response) = v2 {
            let competitions: Vec<CompetitionV2> = decode_list(response, "v2 competitions")?;
            return Ok(competitions
                .into_iter()
                .find(CompetitionV2::is_eligible)
                .map(ActiveCompetition::from_v2));
        }

        Ok(None)
    }

    /// Prefers the first candidate with leaderboard rows, else the first one.
    async fn select_v1(&self, candidates: Vec<Competition>) -> Option<Competition> {
        for candidate in &candidates {
            if self.has_leaderboard_rows(candidate.id).await {
                debug!(id = candidate.id, "v1 competition has leaderboard data");
                return Some(candidate.clone());
            }
        }
        candidates.into_iter().next()
    }

    async fn has_leaderboard_rows(&self, competition_id: i64) -> bool {
        let Some(response) = self
            .fetch("leaderboard", || self.brain.leaderboard(competition_id))
            .await
        else {
            return false;
        };
        match response.into_json::<RowPresence>() {
            Ok(presence) => !presence.rows.is_empty(),
            Err(e) => {
                debug!(competition_id, error = %e, "unreadable leaderboard");
                false
            }
        }
    }

    /// Sends `call` under the resolver's options, keeping only ok responses.
    async fn fetch<F, Fut>(&self, what: &str, call: F) -> Option<BrainResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult>,
    {
        match self.caller.send(call, &self.options).await {
            Ok(response) => Some(response),
            Err(e) => {
                debug!(what, cause = ?e.cause, "treating failed request as empty");
                None
            }
        }
    }
}

fn decode_list<T: DeserializeOwned>(response: BrainResponse, what: &str) -> ApplicationResult<Vec<T>> {
    response
        .into_json::<CompetitionList<T>>()
        .map(CompetitionList::into_vec)
        .map_err(|e| ApplicationError::decode(what, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use questboard_domain::CompetitionPayload;
    use serde_json::{Value, json};

    use super::*;
    use crate::ports::TransportError;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify_error(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    /// Backend double. Each v1 listing pops the next scripted reply.
    #[derive(Default)]
    struct ScriptedBrain {
        v1: Mutex<VecDeque<(Duration, TransportResult)>>,
        v2: Option<TransportResult>,
        leaderboards: HashMap<i64, TransportResult>,
        probes: Mutex<Vec<i64>>,
    }

    impl ScriptedBrain {
        fn with_v1(self, body: Value) -> Self {
            self.push_v1(Duration::ZERO, Ok(BrainResponse::json(200, &body)));
            self
        }

        fn push_v1(&self, delay: Duration, reply: TransportResult) {
            self.v1.lock().push_back((delay, reply));
        }

        fn with_v2(mut self, body: Value) -> Self {
            self.v2 = Some(Ok(BrainResponse::json(200, &body)));
            self
        }

        fn with_rows(self, id: i64, rows: usize) -> Self {
            let rows: Vec<Value> = (0..rows)
                .map(|i| json!({"player_name": format!("p{i}"), "total_points": 10}))
                .collect();
            self.with_leaderboard(id, json!({ "rows": rows }))
        }

        fn with_leaderboard(mut self, id: i64, body: Value) -> Self {
            self.leaderboards
                .insert(id, Ok(BrainResponse::json(200, &body)));
            self
        }
    }

    fn empty_list() -> TransportResult {
        Ok(BrainResponse::json(200, &json!([])))
    }

    impl BrainClient for ScriptedBrain {
        fn list_competitions(&self) -> impl Future<Output = TransportResult> + Send {
            let (delay, reply) = self
                .v1
                .lock()
                .pop_front()
                .unwrap_or((Duration::ZERO, empty_list()));
            async move {
                tokio::time::sleep(delay).await;
                reply
            }
        }

        fn list_competitions_v2(&self) -> impl Future<Output = TransportResult> + Send {
            std::future::ready(self.v2.clone().unwrap_or_else(empty_list))
        }

        fn leaderboard(&self, competition_id: i64) -> impl Future<Output = TransportResult> + Send {
            self.probes.lock().push(competition_id);
            let reply = self
                .leaderboards
                .get(&competition_id)
                .cloned()
                .unwrap_or_else(|| Ok(BrainResponse::json(200, &json!({"rows": []}))));
            std::future::ready(reply)
        }
    }

    fn v1(id: i64, name: &str) -> Value {
        json!({"id": id, "name": name, "is_active": true, "is_hidden": false})
    }

    fn resolver(
        brain: ScriptedBrain,
    ) -> (
        CompetitionResolver<Arc<ScriptedBrain>, Arc<RecordingNotifier>>,
        Arc<ScriptedBrain>,
        Arc<RecordingNotifier>,
    ) {
        let brain = Arc::new(brain);
        let notifier = Arc::new(RecordingNotifier::default());
        (
            CompetitionResolver::new(Arc::clone(&brain), Arc::clone(&notifier)),
            brain,
            notifier,
        )
    }

    #[tokio::test]
    async fn test_prefers_v1_candidate_with_leaderboard_rows() {
        let brain = ScriptedBrain::default()
            .with_v1(json!([v1(1, "A"), v1(2, "B")]))
            .with_rows(2, 2);
        let (resolver, brain, _) = resolver(brain);

        let active = resolver.refresh().await.unwrap();

        assert_eq!(active.id, 2);
        assert_eq!(active.name, "B");
        assert!(!active.is_v2);
        assert_eq!(*brain.probes.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_any_leaderboard_row_counts_as_data() {
        let brain = ScriptedBrain::default()
            .with_v1(json!([v1(1, "A"), v1(2, "B")]))
            .with_leaderboard(1, json!({"rows": [{"player_name": "ana", "total_points": null}]}))
            .with_rows(2, 2);
        let (resolver, brain, _) = resolver(brain);

        assert_eq!(resolver.refresh().await.map(|c| c.id), Some(1));
        assert_eq!(*brain.probes.lock(), vec![1]);
    }

    #[tokio::test]
    async fn test_falls_back_to_first_v1_candidate() {
        let brain = ScriptedBrain::default().with_v1(json!([v1(5, "A")]));
        let (resolver, _, _) = resolver(brain);

        let active = resolver.refresh().await.unwrap();
        assert_eq!(active.id, 5);
        assert!(matches!(active.data, CompetitionPayload::V1(_)));
    }

    #[tokio::test]
    async fn test_skips_inactive_and_hidden_v1() {
        let brain = ScriptedBrain::default()
            .with_v1(json!({"data": [
                {"id": 1, "name": "old", "is_active": false},
                {"id": 2, "name": "secret", "is_active": true, "is_hidden": true},
                v1(3, "live"),
            ]}))
            .with_rows(1, 3);
        let (resolver, brain, _) = resolver(brain);

        assert_eq!(resolver.refresh().await.map(|c| c.id), Some(3));
        assert_eq!(*brain.probes.lock(), vec![3]);
    }

    #[tokio::test]
    async fn test_falls_back_to_v2_without_probing() {
        let brain = ScriptedBrain::default().with_v2(json!({"data": [
            {"id": 8, "name": "draft", "state": "draft"},
            {"id": 9, "name": "Spring", "state": "active", "is_hidden": false},
        ]}));
        let (resolver, brain, _) = resolver(brain);

        let active = resolver.refresh().await.unwrap();

        assert_eq!(active.id, 9);
        assert!(active.is_v2);
        assert!(brain.probes.lock().is_empty());
        assert!(resolver.has_active_competition());
    }

    #[tokio::test]
    async fn test_v2_state_must_be_exactly_active() {
        let brain = ScriptedBrain::default().with_v2(json!([
            {"id": 1, "name": "legacy"},
            {"id": 2, "name": "shouting", "state": "ACTIVE"},
            {"id": 3, "state": "active"},
        ]));
        let (resolver, _, notifier) = resolver(brain);

        let active = resolver.refresh().await.unwrap();

        assert_eq!(active.id, 3);
        assert_eq!(active.name, "");
        assert!(notifier.messages.lock().is_empty());
    }

    #[tokio::test]
    async fn test_no_candidates_publishes_none() {
        let (resolver, _, notifier) = resolver(ScriptedBrain::default());

        assert_eq!(resolver.refresh().await, None);

        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.active, None);
        assert_eq!(snapshot.phase, ResolverPhase::Resolved);
        assert!(notifier.messages.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failed_listing_counts_as_empty() {
        let brain = ScriptedBrain::default()
            .with_v2(json!([{"id": 4, "name": "v2", "state": "active"}]));
        brain.push_v1(
            Duration::ZERO,
            Err(TransportError::ConnectionFailed("reset".to_string())),
        );
        let (resolver, _, notifier) = resolver(brain);

        assert_eq!(resolver.refresh().await.map(|c| c.id), Some(4));
        assert!(notifier.messages.lock().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_listing_notifies_and_keeps_state() {
        let brain = ScriptedBrain::default().with_v1(json!([v1(1, "A")]));
        brain.push_v1(Duration::ZERO, Ok(BrainResponse::json(200, &json!("garbage"))));
        let (resolver, _, notifier) = resolver(brain);

        assert_eq!(resolver.refresh().await.map(|c| c.id), Some(1));
        assert_eq!(resolver.refresh().await.map(|c| c.id), Some(1));

        assert_eq!(*notifier.messages.lock(), vec![REFRESH_FAILED_MESSAGE]);
        assert_eq!(resolver.snapshot().phase, ResolverPhase::Resolved);
    }

    #[tokio::test]
    async fn test_failure_before_any_selection_returns_to_idle() {
        let brain = ScriptedBrain::default();
        brain.push_v1(Duration::ZERO, Ok(BrainResponse::json(200, &json!(42))));
        let (resolver, _, notifier) = resolver(brain);

        assert_eq!(resolver.refresh().await, None);
        assert_eq!(resolver.snapshot().phase, ResolverPhase::Idle);
        assert_eq!(notifier.messages.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_refresh_wins() {
        let brain = ScriptedBrain::default();
        brain.push_v1(
            Duration::from_millis(200),
            Ok(BrainResponse::json(200, &json!([v1(1, "slow")]))),
        );
        brain.push_v1(
            Duration::from_millis(10),
            Ok(BrainResponse::json(200, &json!([v1(2, "fast")]))),
        );
        let (resolver, _, _) = resolver(brain);

        tokio::join!(resolver.refresh(), resolver.refresh());

        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.active_id(), Some(2));
        assert!(!snapshot.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_listing_times_out_as_empty() {
        let brain = ScriptedBrain::default()
            .with_v2(json!([{"id": 6, "name": "v2", "state": "active"}]));
        brain.push_v1(
            Duration::from_secs(60),
            Ok(BrainResponse::json(200, &json!([v1(1, "late")]))),
        );
        let (resolver, _, _) = resolver(brain);
        let resolver = resolver.with_call_options(
            CallOptions::default()
                .with_retries(0)
                .with_timeout(Duration::from_secs(1)),
        );

        assert_eq!(resolver.refresh().await.map(|c| c.id), Some(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_failure_is_silent() {
        let brain = ScriptedBrain::default();
        brain.push_v1(
            Duration::from_millis(200),
            Ok(BrainResponse::json(200, &json!("garbage"))),
        );
        brain.push_v1(
            Duration::from_millis(10),
            Ok(BrainResponse::json(200, &json!([v1(2, "fast")]))),
        );
        let (resolver, _, notifier) = resolver(brain);

        tokio::join!(resolver.refresh(), resolver.refresh());

        assert_eq!(resolver.snapshot().active_id(), Some(2));
        assert_eq!(resolver.snapshot().phase, ResolverPhase::Resolved);
        assert!(notifier.messages.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_listings_follow_call_options() {
        let unavailable = || Ok(BrainResponse::json(503, &json!({"detail": "down"})));
        let brain = ScriptedBrain::default();
        brain.push_v1(Duration::ZERO, unavailable());
        brain.push_v1(
            Duration::ZERO,
            Ok(BrainResponse::json(200, &json!([v1(7, "after retry")]))),
        );
        let (resolver, brain, notifier) = resolver(brain);
        let resolver = resolver.with_call_options(CallOptions::default().with_retries(1));

        assert_eq!(resolver.refresh().await.map(|c| c.id), Some(7));
        assert!(brain.v1.lock().is_empty());
        assert!(notifier.messages.lock().is_empty());

        brain.push_v1(Duration::ZERO, unavailable());
        let resolver = resolver.with_call_options(
            CallOptions::default()
                .with_retries(0)
                .with_toast_on_error(true),
        );

        assert_eq!(resolver.refresh().await, None);
        assert_eq!(
            *notifier.messages.lock(),
            vec!["Request failed (HTTP 503): down"]
        );
    }

    #[tokio::test]
    async fn test_default_listing_is_not_retried() {
        let brain = ScriptedBrain::default();
        brain.push_v1(
            Duration::ZERO,
            Ok(BrainResponse::json(503, &json!({"detail": "down"}))),
        );
        brain.push_v1(Duration::ZERO, Ok(BrainResponse::json(200, &json!([v1(1, "A")]))));
        let (resolver, brain, _) = resolver(brain);

        assert_eq!(resolver.refresh().await, None);
        assert_eq!(brain.v1.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_manual_set_is_published() {
        let (resolver, _, _) = resolver(ScriptedBrain::default());
        let mut rx = resolver.subscribe();
        let competition: Competition =
            serde_json::from_value(v1(11, "Manual")).unwrap();

        resolver.set_active_competition(Some(ActiveCompetition::from_v1(competition)));

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.active_id(), Some(11));
        assert_eq!(snapshot.phase, ResolverPhase::Resolved);
    }
}

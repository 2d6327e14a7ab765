//! Shared visualization state.
//!
//! The store is the single source of truth for the current instance, its
//! markers, playback state, statistics and log. Every operation is one
//! synchronous critical section on a [`tokio::sync::watch`] channel, so
//! readers always see a whole committed state and subscribers are woken
//! on every change.

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::model::{ProblemInstance, Scenario};
use crate::patch::{initial_markers, Patch};
use crate::state::{EventLog, Outcome, PlaybackState, StatKind, Statistics, VisualState};
use crate::step::{RunToken, Step};

pub struct Store {
    tx: watch::Sender<VisualState>,
    config: EngineConfig,
}

impl Store {
    pub fn new(config: EngineConfig) -> Self {
        let initial = VisualState::new(config.clamp_speed(config.speed_ms), config.log_capacity);
        let (tx, _rx) = watch::channel(initial);
        Self { tx, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Latest committed state.
    pub fn snapshot(&self) -> VisualState {
        self.tx.borrow().clone()
    }

    /// Receiver woken on every committed change.
    pub fn subscribe(&self) -> watch::Receiver<VisualState> {
        self.tx.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    pub fn playback(&self) -> PlaybackState {
        self.tx.borrow().playback
    }

    pub fn is_live(&self, token: &RunToken) -> bool {
        token.is_live(self.tx.borrow().generation)
    }

    /// Replace the instance, dropping statistics, log, markers and outcome.
    /// Playback goes back to idle. Returns the new generation.
    pub fn replace_instance(&self, instance: ProblemInstance) -> u64 {
        self.load_scenario(&Scenario::new(instance))
    }

    /// Like [`Store::replace_instance`], also seeding the target and
    /// description markers.
    pub fn load_scenario(&self, scenario: &Scenario) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|state| {
            state.generation += 1;
            state.instance = scenario.instance.clone();
            state.markers = initial_markers(scenario.target, scenario.description.clone());
            state.stats = Statistics::default();
            state.log = EventLog::with_capacity(self.config.log_capacity);
            state.playback = PlaybackState::Idle;
            state.outcome = None;
            generation = state.generation;
        });
        debug!(generation, "instance replaced");
        generation
    }

    pub fn apply_patch(&self, patch: &Patch) {
        trace!(?patch, "apply patch");
        self.tx.send_modify(|state| patch.apply(state));
    }

    /// Pure state transition. Starting or stopping a driver is the run
    /// controller's job.
    pub fn set_playback_state(&self, playback: PlaybackState) {
        self.tx.send_if_modified(|state| {
            if state.playback == playback {
                return false;
            }
            debug!(from = ?state.playback, to = ?playback, "playback transition");
            state.playback = playback;
            true
        });
    }

    /// Move from `from` to `to` only if playback is currently `from`.
    /// Returns whether the transition happened.
    pub fn transition(&self, from: PlaybackState, to: PlaybackState) -> bool {
        self.tx.send_if_modified(|state| {
            if state.playback != from || from == to {
                return false;
            }
            debug!(?from, ?to, "playback transition");
            state.playback = to;
            true
        })
    }

    pub fn append_log(&self, line: impl Into<String>) {
        let line = line.into();
        self.tx.send_modify(|state| state.log.push(line));
    }

    pub fn bump_statistic(&self, kind: StatKind) {
        self.tx.send_modify(|state| state.stats.bump(kind));
    }

    /// Set milliseconds per base step, clamped to the configured bounds.
    /// Returns the applied value.
    pub fn set_speed(&self, speed_ms: u64) -> u64 {
        let speed_ms = self.config.clamp_speed(speed_ms);
        self.tx.send_if_modified(|state| {
            let changed = state.speed_ms != speed_ms;
            state.speed_ms = speed_ms;
            changed
        });
        speed_ms
    }

    pub fn speed(&self) -> u64 {
        self.tx.borrow().speed_ms
    }

    /// Apply a whole step if `token` is still live. The liveness check and
    /// the mutation share one critical section, so a cancelled run can
    /// never land a write after the instance was replaced.
    pub fn commit(&self, token: &RunToken, step: &Step) -> bool {
        self.tx.send_if_modified(|state| {
            if !token.is_live(state.generation) {
                return false;
            }
            for patch in &step.patches {
                patch.apply(state);
            }
            if let Some(line) = &step.log {
                state.log.push(line.clone());
            }
            if let Some(kind) = step.stat {
                state.stats.bump(kind);
            }
            true
        })
    }

    /// Record a finished run: store its outcome and go idle. Ignored if the
    /// run is no longer live.
    pub fn finish_run(&self, token: &RunToken, outcome: Outcome) -> bool {
        self.tx.send_if_modified(|state| {
            if !token.is_live(state.generation) {
                return false;
            }
            state.outcome = Some(outcome);
            state.playback = PlaybackState::Idle;
            true
        })
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    fn array(values: &[i64]) -> ProblemInstance {
        ProblemInstance::Array(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Element::new(i as u64, *v))
                .collect(),
        )
    }

    #[test]
    fn replace_resets_everything_but_speed() {
        let store = Store::default();
        store.replace_instance(array(&[3, 1]));
        store.set_speed(120);
        store.append_log("hello");
        store.bump_statistic(StatKind::Swap);
        store.apply_patch(&Patch::MarkAllSorted);
        store.set_playback_state(PlaybackState::Running);

        let generation = store.replace_instance(array(&[9]));
        let state = store.snapshot();
        assert_eq!(state.generation, generation);
        assert_eq!(state.instance, array(&[9]));
        assert_eq!(state.stats, Statistics::default());
        assert!(state.log.is_empty());
        assert!(state.markers.sorted.is_empty());
        assert_eq!(state.playback, PlaybackState::Idle);
        assert_eq!(state.speed_ms, 120);
    }

    #[test]
    fn scenario_seeds_markers() {
        let store = Store::default();
        store.load_scenario(&Scenario::new(array(&[1, 2])).with_target(2).with_description("find 2"));
        let markers = store.snapshot().markers;
        assert_eq!(markers.target, Some(2));
        assert_eq!(markers.description.as_deref(), Some("find 2"));
    }

    #[test]
    fn speed_is_clamped() {
        let store = Store::default();
        assert_eq!(store.set_speed(1_000_000), 5_000);
        assert_eq!(store.speed(), 5_000);
    }

    #[test]
    fn log_capacity_comes_from_config() {
        let store = Store::new(EngineConfig {
            log_capacity: 2,
            ..EngineConfig::default()
        });
        store.replace_instance(ProblemInstance::Empty);
        for line in ["a", "b", "c"] {
            store.append_log(line);
        }
        let lines: Vec<String> = store.snapshot().log.iter().map(str::to_string).collect();
        assert_eq!(lines, vec!["c", "b"]);
    }

    #[test]
    fn commit_is_all_or_nothing() {
        let store = Store::default();
        let generation = store.replace_instance(array(&[2, 1]));
        let token = RunToken::new(generation);
        let step = Step::new()
            .patch(Patch::compare(0, 1))
            .log("compare 2 and 1")
            .stat(StatKind::Comparison);

        assert!(store.commit(&token, &step));
        let state = store.snapshot();
        assert_eq!(state.markers.comparing, vec![0, 1]);
        assert_eq!(state.stats.comparisons, 1);
        assert_eq!(state.stats.operations, 1);

        store.replace_instance(array(&[2, 1]));
        assert!(!store.commit(&token, &step));
        let state = store.snapshot();
        assert!(state.markers.comparing.is_empty());
        assert_eq!(state.stats.comparisons, 0);
        assert!(state.log.is_empty());
    }

    #[test]
    fn transition_requires_expected_state() {
        let store = Store::default();
        assert!(!store.transition(PlaybackState::Running, PlaybackState::Paused));
        assert_eq!(store.playback(), PlaybackState::Idle);

        store.set_playback_state(PlaybackState::Running);
        assert!(store.transition(PlaybackState::Running, PlaybackState::Paused));
        assert!(!store.transition(PlaybackState::Running, PlaybackState::Paused));
        assert_eq!(store.playback(), PlaybackState::Paused);
    }

    #[test]
    fn stale_finish_is_ignored() {
        let store = Store::default();
        let token = RunToken::new(store.replace_instance(array(&[1])));
        store.set_playback_state(PlaybackState::Running);
        token.cancel();
        assert!(!store.finish_run(&token, Outcome::Sorted));
        assert_eq!(store.snapshot().outcome, None);
        assert_eq!(store.playback(), PlaybackState::Running);
    }

    #[tokio::test]
    async fn subscribers_see_commits() {
        let store = Store::default();
        let mut rx = store.subscribe();
        let token = RunToken::new(store.replace_instance(array(&[1])));
        rx.borrow_and_update();

        store.commit(&token, &Step::new().log("tick"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().log.latest(), Some("tick"));
    }
}

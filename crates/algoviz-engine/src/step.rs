//! Steps and the emitter drivers push them through.
//!
//! A [`Step`] is one observable unit of progress: patches, at most one log
//! line and at most one statistic bump, committed together. The
//! [`StepEmitter`] commits a step, waits for the paced delay, parks while
//! playback is paused and reports cancellation as `Err(Cancelled)` so a
//! driver can bail out with `?` from any depth of recursion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::trace;

use crate::patch::Patch;
use crate::state::{PlaybackState, StatKind};
use crate::store::Store;

/// The run was cancelled. Not a failure: drivers propagate it and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("run cancelled")]
pub struct Cancelled;

/// Liveness token for one run.
///
/// A run is live while the store is still on the generation it started
/// on and nobody called [`RunToken::cancel`].
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl RunToken {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Live against a store currently at `generation`.
    pub fn is_live(&self, generation: u64) -> bool {
        self.generation == generation && !self.is_cancelled()
    }
}

/// How long the emitter waits after a step, relative to the base speed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Pace {
    /// One base step.
    #[default]
    Full,
    /// Half a base step (color resets, bookkeeping).
    Half,
    /// Base step times a factor.
    Scaled(f32),
    /// No delay.
    Instant,
}

impl Pace {
    pub fn duration(&self, speed_ms: u64) -> Duration {
        let ms = match *self {
            Pace::Full => speed_ms,
            Pace::Half => speed_ms / 2,
            Pace::Scaled(factor) => (speed_ms as f64 * f64::from(factor.max(0.0))) as u64,
            Pace::Instant => 0,
        };
        Duration::from_millis(ms)
    }
}

/// One atomic unit of algorithm progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Step {
    pub patches: Vec<Patch>,
    pub log: Option<String>,
    pub stat: Option<StatKind>,
    pub pace: Pace,
}

impl Step {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patch(mut self, patch: Patch) -> Self {
        self.patches.push(patch);
        self
    }

    pub fn patches(mut self, patches: impl IntoIterator<Item = Patch>) -> Self {
        self.patches.extend(patches);
        self
    }

    pub fn log(mut self, line: impl Into<String>) -> Self {
        self.log = Some(line.into());
        self
    }

    pub fn stat(mut self, kind: StatKind) -> Self {
        self.stat = Some(kind);
        self
    }

    pub fn pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }
}

#[derive(Clone)]
struct Attached {
    store: Arc<Store>,
    token: RunToken,
}

/// Commits steps for one run.
///
/// A silent emitter has no store: every emit succeeds immediately. It lets
/// setup code (e.g. building a starting tree) reuse the animated
/// algorithms without producing any output.
#[derive(Clone)]
pub struct StepEmitter {
    attached: Option<Attached>,
}

impl StepEmitter {
    pub fn new(store: Arc<Store>, token: RunToken) -> Self {
        Self {
            attached: Some(Attached { store, token }),
        }
    }

    pub fn silent() -> Self {
        Self { attached: None }
    }

    pub fn is_silent(&self) -> bool {
        self.attached.is_none()
    }

    /// Whether the run may still commit. Always true when silent.
    pub fn is_live(&self) -> bool {
        match &self.attached {
            Some(a) => a.store.is_live(&a.token),
            None => true,
        }
    }

    /// Fail fast if the run was cancelled, without committing anything.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_live() {
            Ok(())
        } else {
            Err(Cancelled)
        }
    }

    /// Commit `step`, wait out its pace and any pause, then report whether
    /// the run may continue.
    pub async fn emit(&self, step: Step) -> Result<(), Cancelled> {
        let Some(Attached { store, token }) = &self.attached else {
            return Ok(());
        };

        if !store.commit(token, &step) {
            trace!(generation = token.generation(), "step dropped, run no longer live");
            return Err(Cancelled);
        }

        let delay = step.pace.duration(store.speed());
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }

        wait_while_paused(store, token).await?;
        self.check()
    }
}

async fn wait_while_paused(store: &Store, token: &RunToken) -> Result<(), Cancelled> {
    let mut rx = store.subscribe();
    loop {
        {
            let state = rx.borrow_and_update();
            if !token.is_live(state.generation) {
                return Err(Cancelled);
            }
            if state.playback != PlaybackState::Paused {
                return Ok(());
            }
        }
        if rx.changed().await.is_err() {
            return Err(Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::model::{Element, ProblemInstance};
    use crate::state::StatKind;

    fn store_with_speed(speed_ms: u64) -> Arc<Store> {
        let store = Arc::new(Store::new(EngineConfig {
            speed_ms,
            ..EngineConfig::default()
        }));
        store.replace_instance(ProblemInstance::Array(vec![Element::new(0, 1)]));
        store
    }

    #[test]
    fn pace_scales_with_speed() {
        assert_eq!(Pace::Full.duration(400), Duration::from_millis(400));
        assert_eq!(Pace::Half.duration(400), Duration::from_millis(200));
        assert_eq!(Pace::Scaled(1.5).duration(400), Duration::from_millis(600));
        assert_eq!(Pace::Instant.duration(400), Duration::ZERO);
    }

    #[test]
    fn token_cancel_is_idempotent() {
        let token = RunToken::new(3);
        assert!(token.is_live(3));
        assert!(!token.is_live(4));
        token.cancel();
        token.cancel();
        assert!(!token.is_live(3));
    }

    #[tokio::test]
    async fn silent_emitter_never_cancels() {
        let emitter = StepEmitter::silent();
        assert!(emitter.is_silent());
        for _ in 0..3 {
            emitter
                .emit(Step::new().log("ignored").stat(StatKind::Swap))
                .await
                .unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn emit_commits_and_sleeps() {
        let store = store_with_speed(100);
        let token = RunToken::new(store.generation());
        let emitter = StepEmitter::new(store.clone(), token);

        let started = tokio::time::Instant::now();
        emitter
            .emit(Step::new().log("compare").stat(StatKind::Comparison))
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(100));

        let state = store.snapshot();
        assert_eq!(state.stats.comparisons, 1);
        assert_eq!(state.log.latest(), Some("compare"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_run_commits_nothing() {
        let store = store_with_speed(100);
        let token = RunToken::new(store.generation());
        let emitter = StepEmitter::new(store.clone(), token.clone());
        token.cancel();

        let result = emitter.emit(Step::new().log("late").stat(StatKind::Swap)).await;
        assert_eq!(result, Err(Cancelled));
        let state = store.snapshot();
        assert_eq!(state.stats.swaps, 0);
        assert!(state.log.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn replacement_during_delay_reports_cancelled() {
        let store = store_with_speed(100);
        let token = RunToken::new(store.generation());
        let emitter = StepEmitter::new(store.clone(), token);

        let task = tokio::spawn({
            let emitter = emitter.clone();
            async move { emitter.emit(Step::new().log("first")).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.replace_instance(ProblemInstance::Empty);

        assert_eq!(task.await.unwrap(), Err(Cancelled));
        assert!(store.snapshot().log.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_parks_until_resumed() {
        let store = store_with_speed(10);
        let token = RunToken::new(store.generation());
        let emitter = StepEmitter::new(store.clone(), token);
        store.set_playback_state(PlaybackState::Paused);

        let task = tokio::spawn({
            let emitter = emitter.clone();
            async move { emitter.emit(Step::new()).await }
        });
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!task.is_finished());

        store.set_playback_state(PlaybackState::Running);
        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn speed_is_read_on_every_step() {
        let store = store_with_speed(100);
        let token = RunToken::new(store.generation());
        let emitter = StepEmitter::new(store.clone(), token);

        emitter.emit(Step::new()).await.unwrap();
        store.set_speed(20);
        let started = tokio::time::Instant::now();
        emitter.emit(Step::new()).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(20));
    }
}

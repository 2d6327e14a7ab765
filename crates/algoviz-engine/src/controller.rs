//! Run controller: starts, pauses, resumes and cancels driver runs.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, Instrument};

use crate::catalog::Algorithm;
use crate::error::{Error, Result};
use crate::model::{ProblemInstance, Scenario};
use crate::state::{Outcome, PlaybackState};
use crate::step::{Cancelled, RunToken, StepEmitter};
use crate::store::Store;

/// What a driver gets at run start: a copy of the instance as committed
/// at that moment, plus the search target if any.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInput {
    pub instance: ProblemInstance,
    pub target: Option<i64>,
}

/// One algorithm's step-by-step logic.
///
/// Drivers keep their working state local to `run` and publish progress
/// only through the emitter. They return `Err(Cancelled)` as soon as an
/// emit reports cancellation.
pub trait Driver: Send {
    fn algorithm(&self) -> Algorithm;

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, std::result::Result<Outcome, Cancelled>>;
}

/// Controller-side view of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    /// Cancelled, waiting for the driver to reach its next step boundary.
    CancelRequested,
}

/// Result of a play request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayOutcome {
    /// A fresh run was spawned.
    Started,
    /// A paused run continues where it stopped.
    Resumed,
    /// A run is already executing; nothing changed.
    AlreadyRunning,
}

struct ActiveRun {
    token: RunToken,
    handle: JoinHandle<()>,
}

impl ActiveRun {
    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Orchestrates at most one driver run against the store's instance.
pub struct RunController {
    store: Arc<Store>,
    driver: Arc<Mutex<Box<dyn Driver>>>,
    algorithm: Algorithm,
    scenario: Scenario,
    active: Option<ActiveRun>,
    draining: Vec<ActiveRun>,
}

impl RunController {
    /// Create a controller and load `scenario` into the store.
    pub fn new(store: Arc<Store>, driver: Box<dyn Driver>, scenario: Scenario) -> Self {
        let algorithm = driver.algorithm();
        store.load_scenario(&scenario);
        Self {
            store,
            driver: Arc::new(Mutex::new(driver)),
            algorithm,
            scenario,
            active: None,
            draining: Vec::new(),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The pristine scenario a reset restores.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn state(&mut self) -> RunState {
        self.reap();
        match &self.active {
            Some(run) if run.token.is_cancelled() => RunState::CancelRequested,
            Some(_) => RunState::Running,
            None if !self.draining.is_empty() => RunState::CancelRequested,
            None => RunState::Idle,
        }
    }

    /// Cancel any run and load a new scenario.
    pub fn install(&mut self, scenario: Scenario) {
        self.cancel_active();
        self.scenario = scenario;
        self.store.load_scenario(&self.scenario);
    }

    /// Switch algorithm. The old driver's run, if any, is cancelled.
    pub fn replace_driver(&mut self, driver: Box<dyn Driver>, scenario: Scenario) {
        self.cancel_active();
        self.algorithm = driver.algorithm();
        self.driver = Arc::new(Mutex::new(driver));
        self.install(scenario);
    }

    /// Start a run, or resume the paused one. Redundant plays are no-ops.
    pub fn play(&mut self) -> Result<PlayOutcome> {
        self.reap();
        if self.active.is_some() {
            if self.store.transition(PlaybackState::Paused, PlaybackState::Running) {
                debug!(algorithm = %self.algorithm, "run resumed");
                return Ok(PlayOutcome::Resumed);
            }
            return Ok(PlayOutcome::AlreadyRunning);
        }

        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let token = RunToken::new(self.store.generation());
        self.store.set_playback_state(PlaybackState::Running);

        let span = info_span!("run", algorithm = %self.algorithm, generation = token.generation());
        let handle = runtime.spawn(
            execute(self.driver.clone(), self.store.clone(), token.clone()).instrument(span),
        );
        self.active = Some(ActiveRun { token, handle });
        Ok(PlayOutcome::Started)
    }

    /// Pause the current run at its next step boundary. Returns whether a
    /// running run was there to pause. A run that already recorded its
    /// outcome is left alone even if its task has not exited yet.
    pub fn pause(&mut self) -> bool {
        self.reap();
        if self.active.is_none() {
            return false;
        }
        self.store.transition(PlaybackState::Running, PlaybackState::Paused)
    }

    /// Cancel the current run and restore the pristine scenario.
    pub fn reset(&mut self) {
        self.cancel_active();
        self.store.load_scenario(&self.scenario);
    }

    /// Wait for every spawned run to exit. A paused run only exits once
    /// resumed or cancelled.
    pub async fn settle(&mut self) {
        let runs: Vec<ActiveRun> = self
            .active
            .take()
            .into_iter()
            .chain(self.draining.drain(..))
            .collect();
        for run in runs {
            if let Err(err) = run.handle.await {
                debug!(%err, "run task ended abnormally");
            }
        }
    }

    fn cancel_active(&mut self) {
        if let Some(run) = self.active.take() {
            debug!(generation = run.token.generation(), "cancel requested");
            run.token.cancel();
            self.draining.push(run);
        }
        self.reap();
    }

    fn reap(&mut self) {
        if self.active.as_ref().is_some_and(ActiveRun::is_finished) {
            self.active = None;
        }
        self.draining.retain(|run| !run.is_finished());
    }
}

impl Drop for RunController {
    fn drop(&mut self) {
        for run in self.active.iter().chain(self.draining.iter()) {
            run.token.cancel();
            run.handle.abort();
        }
    }
}

async fn execute(driver: Arc<Mutex<Box<dyn Driver>>>, store: Arc<Store>, token: RunToken) {
    let mut driver = driver.lock().await;
    if !store.is_live(&token) {
        debug!("cancelled before start");
        return;
    }

    let state = store.snapshot();
    let input = RunInput {
        instance: state.instance,
        target: state.markers.target,
    };
    let emitter = StepEmitter::new(store.clone(), token.clone());

    match driver.run(input, emitter).await {
        Ok(outcome) => {
            info!(?outcome, "run finished");
            store.finish_run(&token, outcome);
        }
        Err(Cancelled) => debug!("run cancelled"),
    }
}

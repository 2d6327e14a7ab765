//! One user-facing visualization: the selected algorithm, its generator
//! and the controller running it against a shared store.

use std::sync::Arc;

use algoviz_engine::config::DEFAULT_SPEED_MS;
use algoviz_engine::{
    Algorithm, EngineConfig, PlayOutcome, PlaybackSpeed, Result, RunController, RunState,
    Scenario, Store, VisualState,
};
use tokio::sync::watch;
use tracing::info;

use crate::controls::{Controls, TraversalOrder, TreeAction};
use crate::generate::ScenarioGenerator;
use crate::registry::driver_for;

pub struct Session {
    controller: RunController,
    generator: ScenarioGenerator,
    controls: Controls,
}

impl Session {
    /// Create a session on a fresh store with a generated scenario for
    /// `algorithm`.
    pub fn new(config: EngineConfig, algorithm: Algorithm) -> Result<Self> {
        config.validate()?;
        let mut generator = ScenarioGenerator::new(config.seed);
        let controls = Controls::new();
        let store = Arc::new(Store::new(config));

        let driver = driver_for(algorithm, &controls, generator.next_seed());
        let scenario = generator.scenario(algorithm);
        info!(%algorithm, "session started");
        Ok(Self {
            controller: RunController::new(store, driver, scenario),
            generator,
            controls,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.controller.algorithm()
    }

    pub fn store(&self) -> &Arc<Store> {
        self.controller.store()
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// The scenario a reset restores.
    pub fn scenario(&self) -> &Scenario {
        self.controller.scenario()
    }

    /// Switch to `algorithm` with a fresh scenario. Any run is cancelled
    /// and queued tree actions are dropped.
    pub fn select(&mut self, algorithm: Algorithm) {
        self.controls.clear_tree_actions();
        let driver = driver_for(algorithm, &self.controls, self.generator.next_seed());
        let scenario = self.generator.scenario(algorithm);
        info!(%algorithm, "algorithm selected");
        self.controller.replace_driver(driver, scenario);
    }

    /// New random scenario for the current algorithm.
    pub fn regenerate(&mut self) {
        let scenario = self.generator.scenario(self.algorithm());
        self.controller.install(scenario);
    }

    pub fn play(&mut self) -> Result<PlayOutcome> {
        self.controller.play()
    }

    pub fn pause(&mut self) -> bool {
        self.controller.pause()
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Returns the applied, clamped speed.
    pub fn set_speed(&self, speed_ms: u64) -> u64 {
        self.store().set_speed(speed_ms)
    }

    pub fn set_speed_preset(&self, preset: PlaybackSpeed) -> u64 {
        self.set_speed(preset.ms_per_step(DEFAULT_SPEED_MS))
    }

    pub fn snapshot(&self) -> VisualState {
        self.store().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<VisualState> {
        self.store().subscribe()
    }

    pub fn state(&mut self) -> RunState {
        self.controller.state()
    }

    /// Wait for every spawned run to exit.
    pub async fn settle(&mut self) {
        self.controller.settle().await;
    }

    pub fn queue_tree_action(&self, action: TreeAction) {
        self.controls.queue_tree_action(action);
    }

    pub fn set_traversal_order(&self, order: TraversalOrder) {
        self.controls.set_traversal_order(order);
    }
}

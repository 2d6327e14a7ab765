//! Algoviz Algorithms - Animated Drivers
//!
//! One [`Driver`] per catalog entry, each owning the canonical step-by-step
//! logic of its algorithm and publishing progress through a
//! [`StepEmitter`]. Also home to the seeded scenario generators and the
//! [`Session`] that wires catalog, generators and run controller together.
//!
//! # Drivers
//!
//! - **Sorting**: bubble, insertion, selection, quick, merge, heap
//! - **Searching**: linear, binary (sorts its input first when needed)
//! - **Graphs**: BFS, DFS, Dijkstra
//! - **Trees**: BST and AVL insert/search, in/pre/post-order traversal
//! - **Linked lists**: singly/doubly search, iterative reversal
//! - **Dynamic programming**: Fibonacci, 0/1 knapsack
//!
//! # Example
//!
//! ```ignore
//! let mut session = Session::new(EngineConfig::from_env()?, Algorithm::QuickSort)?;
//! session.play()?;
//! let mut rx = session.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("{:?}", rx.borrow().log.latest());
//! }
//! ```

pub mod controls;
pub mod dp;
pub mod generate;
pub mod graph;
pub mod list;
pub mod registry;
pub mod searching;
pub mod session;
pub mod sorting;
pub mod tree;

use std::sync::Arc;

use algoviz_engine::{
    Cancelled, Driver, Outcome, PlaybackState, RunInput, RunToken, StepEmitter, Store,
};

pub use controls::{Controls, TraversalOrder, TreeAction};
pub use generate::ScenarioGenerator;
pub use registry::driver_for;
pub use session::Session;

/// Run `driver` once against the store's current instance, without a run
/// controller. The run is tied to the store's current generation.
pub async fn run_once(store: &Arc<Store>, driver: &mut dyn Driver) -> Result<Outcome, Cancelled> {
    let token = RunToken::new(store.generation());
    store.set_playback_state(PlaybackState::Running);
    let state = store.snapshot();
    let input = RunInput {
        instance: state.instance,
        target: state.markers.target,
    };
    let outcome = driver
        .run(input, StepEmitter::new(store.clone(), token.clone()))
        .await?;
    store.finish_run(&token, outcome.clone());
    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use algoviz_engine::{EngineConfig, Scenario, VisualState};

    /// Run a driver to completion on `scenario` with no delays.
    pub async fn run(driver: &mut dyn Driver, scenario: Scenario) -> (Outcome, VisualState) {
        let store = Arc::new(Store::new(EngineConfig {
            log_capacity: 500,
            ..EngineConfig::instant()
        }));
        store.load_scenario(&scenario);
        let outcome = run_once(&store, driver).await.expect("nothing cancels a test run");
        (outcome, store.snapshot())
    }

    /// Log lines oldest first.
    pub fn log_lines(state: &VisualState) -> Vec<String> {
        let mut lines: Vec<String> = state.log.iter().map(str::to_string).collect();
        lines.reverse();
        lines
    }
}

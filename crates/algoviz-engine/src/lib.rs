//! Algoviz Engine - Step-Driven Algorithm Animation
//!
//! Runs an algorithm one observable step at a time against a shared state
//! store, so a front-end can draw every intermediate state while the user
//! pauses, resumes, resets or changes speed.
//!
//! # Architecture
//!
//! - **Store**: Single source of truth for the instance, markers, playback,
//!   statistics and log, with watch-channel subscriptions
//! - **Step / StepEmitter**: One atomic (patches, log line, statistic) unit,
//!   paced by the configured speed and checked for cancellation
//! - **RunController**: At most one driver run per instance, with
//!   cooperative pause, resume and reset
//! - **Catalog**: The algorithms a session can select
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(Store::new(EngineConfig::default()));
//! let mut controller = RunController::new(store.clone(), driver, scenario);
//! controller.play()?;
//! let mut rx = store.subscribe();
//! while rx.changed().await.is_ok() {
//!     render(&rx.borrow());
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod patch;
pub mod state;
pub mod step;
pub mod store;

pub use catalog::{Algorithm, CatalogEntry, Category};
pub use config::EngineConfig;
pub use controller::{Driver, PlayOutcome, RunController, RunInput, RunState};
pub use error::{Error, Result};
pub use model::{
    Color, DpProblem, DpTable, Edge, EdgeId, Element, ElementId, Graph, Item, Node, NodeId,
    Position, ProblemInstance, Scenario,
};
pub use patch::Patch;
pub use state::{
    EventLog, Markers, Outcome, PlaybackSpeed, PlaybackState, SearchRange, StatKind, Statistics,
    VisualState,
};
pub use step::{Cancelled, Pace, RunToken, Step, StepEmitter};
pub use store::Store;

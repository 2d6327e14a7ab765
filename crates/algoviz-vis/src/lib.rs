//! Algoviz Web Adapter
//!
//! Serves a [`Session`](algoviz_algorithms::Session) over HTTP and
//! WebSocket so a browser front-end can render the visual state and drive
//! playback.
//!
//! # Architecture
//!
//! - **REST API**: select an algorithm, regenerate, play/pause/reset, speed
//! - **WebSocket**: one full snapshot per store change, plus commands
//! - **Config**: `[algorithm] [port]` arguments over the engine's env config
//!
//! # Usage
//!
//! ```ignore
//! let session = Session::new(EngineConfig::from_env()?, Algorithm::QuickSort)?;
//! VisServer::new(session).serve(3000).await?;
//! ```

mod config;
mod server;

pub use config::{VisConfig, DEFAULT_PORT};
pub use server::{AppState, VisServer};

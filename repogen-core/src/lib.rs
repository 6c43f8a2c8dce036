//! Repogen Core - shared infrastructure for the repogen workspace
//!
//! Errors, logging, configuration, async helpers and the small set of data
//! types every other crate agrees on.

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;

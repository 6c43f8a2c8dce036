//! HTTP request handlers for the repogen web server

pub mod analyze;
pub mod config;
pub mod health;
pub mod types;

pub use analyze::*;
pub use config::*;
pub use health::*;

pub use types::*;

//! Repogen Repository - working-copy acquisition and analysis
//!
//! Parses repository locations, clones remotes with the system `git` binary,
//! walks working copies and extracts the facts the artifact generators need.

pub mod analyzer;
pub mod filter;
pub mod location;
pub mod processor;

pub use analyzer::*;
pub use filter::*;
pub use location::*;
pub use processor::*;

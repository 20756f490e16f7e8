//! Shared test utilities for the heatmap workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Seeded heat store generators
//! - Synthetic base images
//! - Encoders for the legacy heatmap format
//! - Fixtures for the two-tile reference scenario
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod legacy;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

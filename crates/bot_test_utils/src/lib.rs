//! # Bot Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Recording mock world
//! - Determinism test harness
//! - Fixture helpers
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod mock_world;
pub mod strategies;

pub use mock_world::{MockWorld, Rejections};

/// Re-export proptest for convenience.
pub use proptest;

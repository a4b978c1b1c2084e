//! High-level operations.
//!
//! This module contains the implementation of projgen commands.

pub mod artifacts;
pub mod discover;
pub mod solution;
pub mod version;
pub mod write_descriptor;

pub use discover::{DiskTree, SourceTree};
pub use solution::{generate, plan, GenerateReport, Solution, VariantPlan};
pub use version::VersionInfo;

//! projgen - CMake project generator for convention-laid-out native trees.
//!
//! This crate provides the library behind the `projgen` binary: module
//! descriptors, variant discovery and merging, and descriptor writing.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for projgen unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory source tree and tree fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    config::Configuration, errors::GenError, layout::Layout, module::Module,
    variant::TargetVariant,
};

pub use crate::ops::solution::{generate, plan, GenerateReport, Solution, VariantPlan};

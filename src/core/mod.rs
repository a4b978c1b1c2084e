//! Core data structures for projgen.
//!
//! This module contains the foundational types used throughout projgen:
//! - The configuration record and its closed enums
//! - Module descriptors and their target variants
//! - Per-variant override files
//! - The source tree layout

pub mod config;
pub mod errors;
pub mod layout;
pub mod module;
pub mod overrides;
pub mod variant;

pub use config::Configuration;
pub use errors::GenError;
pub use layout::Layout;
pub use module::{ArtifactKind, Module};
pub use variant::{FileSets, TargetVariant};

//! Shared utilities

pub mod config;
pub mod fs;
pub mod hash;
pub mod lines;
pub mod progress;

pub use config::Config;
pub use progress::{BarProgress, Progress, SilentProgress};

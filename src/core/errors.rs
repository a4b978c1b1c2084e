//! Structural error types for project generation.
//!
//! These are the conditions that abort a whole generation run. Expected
//! absences (missing override files, missing platform trees, unmatched
//! dependency names) never surface here.

use std::path::PathBuf;

use thiserror::Error;

/// A fatal generation error.
#[derive(Debug, Error)]
pub enum GenError {
    /// A string did not map onto any member of a closed enum.
    #[error("unrecognized {kind} `{value}`")]
    Unmapped { kind: &'static str, value: String },

    /// A template contained a placeholder that is neither resolvable nor
    /// on the skippable whitelist.
    #[error("invalid keyword `{token}` in {}", file.display())]
    UnknownPlaceholder { token: String, file: PathBuf },

    /// Two variants resolved to the same `prefix_name` identity.
    #[error("duplicate project `{name}` (declared by `{first}` and `{second}`)")]
    DuplicateVariant {
        name: String,
        first: String,
        second: String,
    },

    /// The selected policy preset does not exist in the source tree.
    #[error("unable to open policy file: {}", path.display())]
    PolicyMissing { path: PathBuf },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Create an unmapped-enum error.
    pub fn unmapped(kind: &'static str, value: impl Into<String>) -> Self {
        GenError::Unmapped {
            kind,
            value: value.into(),
        }
    }

    /// Create an I/O error tagged with a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

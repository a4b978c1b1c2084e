//! Directory layout of the source tree being configured.
//!
//! ```text
//! <root>/
//!   <product>/             ImageMagick-style sources (MagickCore, config/, LICENSE)
//!   <build>/               module descriptor directories, one per subsystem
//!     <module>/Config.txt
//!     VisualStudioProjects/<PREFIX_name>/CMakeLists.txt
//!     CMakeLists.txt       aggregate descriptor
//!     bin/                 policy.xml, configure.xml, thresholds.xml
//! ```
//!
//! Scan directories and include overrides are stored relative to `<root>`.
//! Descriptors live three levels below the root, so every path they
//! reference is prefixed with [`RELATIVE_TO_ROOT`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Prefix that turns a root-relative path into one relative to a descriptor.
pub const RELATIVE_TO_ROOT: &str = "../../../";

/// Directory (under the build dir) that holds one descriptor per variant.
pub const PROJECTS_DIR: &str = "VisualStudioProjects";

/// File name of a per-module descriptor.
pub const MODULE_CONFIG: &str = "Config.txt";

/// File name of every emitted descriptor.
pub const DESCRIPTOR_FILE: &str = "CMakeLists.txt";

/// Tree layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Tree root; scan directories are relative to this.
    pub root: PathBuf,
    /// Directory under the root containing the module descriptors.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
    /// Directory under the root containing the product sources.
    #[serde(default = "default_product_dir")]
    pub product_dir: String,
}

fn default_build_dir() -> String {
    "VisualMagick".to_string()
}

fn default_product_dir() -> String {
    "ImageMagick".to_string()
}

impl Layout {
    /// Layout rooted at `root` with the conventional directory names.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout {
            root: root.into(),
            build_dir: default_build_dir(),
            product_dir: default_product_dir(),
        }
    }

    /// Resolve a root-relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn build_path(&self) -> PathBuf {
        self.root.join(&self.build_dir)
    }

    pub fn product_path(&self) -> PathBuf {
        self.root.join(&self.product_dir)
    }

    /// Directory holding a module's `Config.txt` and override files.
    pub fn module_path(&self, module: &str) -> PathBuf {
        self.build_path().join(module)
    }

    /// Directory receiving the descriptor for a variant.
    pub fn project_path(&self, variant_name: &str) -> PathBuf {
        self.build_path().join(PROJECTS_DIR).join(variant_name)
    }

    /// Path of the aggregate descriptor.
    pub fn aggregate_path(&self) -> PathBuf {
        self.build_path().join(DESCRIPTOR_FILE)
    }

    /// Build-side `bin/` directory.
    pub fn bin_path(&self) -> PathBuf {
        self.build_path().join("bin")
    }

    /// Root-relative form of a module-owned file, e.g. `VisualMagick/coders/coders.rc`.
    pub fn module_relative(&self, module: &str, file: &str) -> String {
        format!("{}/{}/{}", self.build_dir, module, file)
    }

    /// Name of the core library folder: `MagickCore` when it exists, otherwise `magick`.
    pub fn core_folder(&self) -> &'static str {
        if self.product_path().join("MagickCore").is_dir() {
            "MagickCore"
        } else {
            "magick"
        }
    }
}

/// Prefix a root-relative path for use inside a descriptor.
pub fn descriptor_path(relative: &str) -> String {
    format!("{}{}", RELATIVE_TO_ROOT, relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let layout = Layout::new("/src");
        assert_eq!(layout.build_path(), PathBuf::from("/src/VisualMagick"));
        assert_eq!(
            layout.project_path("CORE_zlib"),
            PathBuf::from("/src/VisualMagick/VisualStudioProjects/CORE_zlib")
        );
        assert_eq!(
            layout.aggregate_path(),
            PathBuf::from("/src/VisualMagick/CMakeLists.txt")
        );
        assert!(layout.module_path("coders").starts_with(layout.build_path()));
    }

    #[test]
    fn test_descriptor_path() {
        assert_eq!(descriptor_path("zlib/adler32.c"), "../../../zlib/adler32.c");
    }

    #[test]
    fn test_core_folder() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path());
        assert_eq!(layout.core_folder(), "magick");

        std::fs::create_dir_all(tmp.path().join("ImageMagick/MagickCore")).unwrap();
        assert_eq!(layout.core_folder(), "MagickCore");
    }
}

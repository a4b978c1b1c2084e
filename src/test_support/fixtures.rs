//! Test fixtures for common test scenarios.
//!
//! A [`TreeFixture`] is a small source tree: module descriptors under the
//! build directory plus arbitrary root-relative files. It can be written to
//! a real directory or to a [`MockFileSystem`](super::MockFileSystem).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default build directory name used by fixtures.
pub const BUILD_DIR: &str = "VisualMagick";

/// Fixture for a complete source tree.
#[derive(Debug, Clone, Default)]
pub struct TreeFixture {
    /// Module name -> `Config.txt` content.
    pub modules: BTreeMap<String, String>,
    /// Root-relative path -> content.
    pub files: BTreeMap<PathBuf, String>,
}

impl TreeFixture {
    /// Create a new empty tree fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// A small product tree: a core shared library depending on a static
    /// zlib, a module-style coders library and a module-style utility.
    pub fn magick() -> Self {
        TreeFixture::new()
            .with_module("MagickCore", &descriptors::magick_core())
            .with_module("zlib", &descriptors::static_lib("zlib", &[]))
            .with_module("coders", &descriptors::coders())
            .with_module("utilities", &descriptors::utilities())
            .with_file("ImageMagick/MagickCore/blob.c", "")
            .with_file("ImageMagick/MagickCore/blob.h", "")
            .with_file("ImageMagick/MagickCore/cache.c", "")
            .with_file("zlib/adler32.c", "")
            .with_file("zlib/zutil.c", "")
            .with_file("zlib/zutil.h", "")
            .with_file("ImageMagick/coders/png.c", "")
            .with_file("ImageMagick/coders/png.h", "")
            .with_file("ImageMagick/coders/bmp.c", "")
            .with_file("ImageMagick/utilities/magick.c", "")
            .with_file(
                "ImageMagick/config/policy-open.xml",
                "<policymap>\n</policymap>\n",
            )
    }

    /// Add a module descriptor.
    pub fn with_module(mut self, name: impl Into<String>, config: impl Into<String>) -> Self {
        self.modules.insert(name.into(), config.into());
        self
    }

    /// Add a file at a root-relative path.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Root-relative path of a module's `Config.txt`.
    pub fn module_config_path(name: &str) -> PathBuf {
        Path::new(BUILD_DIR).join(name).join("Config.txt")
    }

    /// Write this fixture to a real directory.
    pub fn write_to(&self, root: &Path) -> std::io::Result<()> {
        let entries = self
            .modules
            .iter()
            .map(|(name, config)| (Self::module_config_path(name), config))
            .chain(self.files.iter().map(|(p, c)| (p.clone(), c)));

        for (rel_path, content) in entries {
            let full_path = root.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }
        Ok(())
    }

    /// Write this fixture to a MockFileSystem.
    pub fn write_to_mock(&self, fs: &mut super::MockFileSystem) {
        for (name, config) in &self.modules {
            fs.add_file(Self::module_config_path(name), config.as_bytes());
        }
        for (rel_path, content) in &self.files {
            fs.add_file(rel_path, content.as_bytes());
        }
    }
}

/// Common `Config.txt` templates.
pub mod descriptors {
    /// A static library scanning one directory.
    pub fn static_lib(dir: &str, dependencies: &[&str]) -> String {
        let mut text = format!("[LIB]\n\n[DIRECTORIES]\n{dir}\n\n[INCLUDES]\n{dir}\n");
        if !dependencies.is_empty() {
            text.push_str("\n[DEPENDENCIES]\n");
            for dep in dependencies {
                text.push_str(dep);
                text.push('\n');
            }
        }
        text
    }

    /// The core shared library.
    pub fn magick_core() -> String {
        "\
[DLL]

[DIRECTORIES]
ImageMagick/MagickCore

[INCLUDES]
ImageMagick

[DEPENDENCIES]
zlib

[DEFINES_DLL]
_MAGICKLIB_

[DEFINES_LIB]
_MAGICKLIB_
"
        .to_string()
    }

    /// Module-style coders.
    pub fn coders() -> String {
        "\
[DLL]

[MODULE]

[DIRECTORIES]
ImageMagick/coders

[INCLUDES]
ImageMagick

[DEPENDENCIES]
MagickCore
zlib

[DEFINES_DLL]
_MAGICKMOD_
"
        .to_string()
    }

    /// Module-style command-line utilities.
    pub fn utilities() -> String {
        "\
[EXE]

[MODULE]

[DIRECTORIES]
ImageMagick/utilities

[INCLUDES]
ImageMagick

[DEPENDENCIES]
MagickCore
"
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::discover::SourceTree;
    use crate::test_support::MockFileSystem;
    use tempfile::TempDir;

    #[test]
    fn test_magick_fixture_on_disk() {
        let tmp = TempDir::new().unwrap();
        TreeFixture::magick().write_to(tmp.path()).unwrap();

        assert!(tmp.path().join("VisualMagick/coders/Config.txt").is_file());
        assert!(tmp.path().join("ImageMagick/coders/png.c").is_file());
    }

    #[test]
    fn test_magick_fixture_in_memory() {
        let mut fs = MockFileSystem::new();
        TreeFixture::magick().write_to_mock(&mut fs);

        assert!(fs.is_file("VisualMagick/zlib/Config.txt"));
        assert_eq!(fs.list_files("zlib"), vec!["adler32.c", "zutil.c", "zutil.h"]);
    }

    #[test]
    fn test_static_lib_descriptor() {
        let text = descriptors::static_lib("jpeg", &["zlib"]);
        assert!(text.starts_with("[LIB]\n"));
        assert!(text.ends_with("[DEPENDENCIES]\nzlib\n"));
    }
}

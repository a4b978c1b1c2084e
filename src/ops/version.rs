//! Version-stamped template files.
//!
//! Templates (`*.in`) carry `@TOKEN@` placeholders. Each token is either
//! resolved through a fixed table, known-but-unresolvable (the line is
//! dropped), or unknown, which aborts the run: an unknown token means the
//! templates and this table have drifted apart.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::core::config::Configuration;
use crate::core::errors::GenError;

/// Name of the version file under the build directory.
pub const VERSION_FILE: &str = "version.toml";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z_][A-Za-z0-9_]*)@").expect("valid placeholder regex"));

/// Release metadata substituted into templates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    /// `major.minor.patch`, e.g. `7.1.0`.
    pub version: String,
    /// Patch-level addendum, e.g. `-19`.
    #[serde(default)]
    pub addendum: String,
    /// Library interface version (`MAGICK_LIBRARY_CURRENT`).
    pub interface_version: String,
    /// C++ binding interface version.
    pub pp_interface_version: String,
    /// Library version as `a,b,c,d`.
    pub lib_version_number: String,
    /// C++ binding library version as `a:b:c`.
    pub pp_lib_version_number: String,
    /// `YYYY-MM-DD`.
    pub release_date: String,
    #[serde(default)]
    pub git_revision: String,
}

impl VersionInfo {
    /// Load `<build>/version.toml`. `Ok(None)` when the file is absent.
    pub fn load(config: &Configuration) -> Result<Option<VersionInfo>> {
        let path = config.layout.build_path().join(VERSION_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read version file: {}", path.display()))?;
        let info = toml::from_str(&text)
            .with_context(|| format!("failed to parse version file: {}", path.display()))?;
        Ok(Some(info))
    }

    /// Full version, `7.1.0-19`.
    pub fn full_version(&self) -> String {
        format!("{}{}", self.version, self.addendum)
    }

    /// Numeric form, `0x710`.
    pub fn version_number(&self) -> String {
        let digits: String = self.version.chars().filter(char::is_ascii_digit).collect();
        format!("0x{}", digits)
    }

    /// `7.1.0` plus the addendum without its leading dash, `7.1.0.19`.
    pub fn lib_version(&self) -> String {
        match self.addendum.strip_prefix('-') {
            Some(patch) if !patch.is_empty() => format!("{}.{}", self.version, patch),
            _ => self.version.clone(),
        }
    }
}

/// Everything a resolver may read.
pub struct TemplateContext<'a> {
    pub config: &'a Configuration,
    pub version: &'a VersionInfo,
}

type Resolver = fn(&TemplateContext<'_>) -> String;

/// Placeholder table. Every token a template may legitimately carry is
/// either here or in [`SKIPPABLE`].
const RESOLVERS: &[(&str, Resolver)] = &[
    ("CC", |c| c.config.toolchain.name().to_string()),
    ("CHANNEL_MASK_DEPTH", |c| c.config.channel_mask_depth().to_string()),
    ("CXX", |c| c.config.toolchain.name().to_string()),
    ("DOCUMENTATION_PATH", |_| "unavailable".to_string()),
    ("LIB_VERSION", |c| c.version.version.clone()),
    ("MAGICK_GIT_REVISION", |c| c.version.git_revision.clone()),
    ("MAGICK_LIB_VERSION_NUMBER", |c| c.version.lib_version_number.clone()),
    ("MAGICK_LIB_VERSION_TEXT", |c| c.version.version.clone()),
    ("MAGICK_LIBRARY_CURRENT", |c| c.version.interface_version.clone()),
    ("MAGICK_LIBRARY_CURRENT_MIN", |c| c.version.interface_version.clone()),
    ("MAGICK_TARGET_CPU", |c| c.config.platform.alias().to_string()),
    ("MAGICK_TARGET_OS", |_| "Windows".to_string()),
    ("MAGICKPP_LIB_VERSION_TEXT", |c| c.version.version.clone()),
    ("MAGICKPP_LIBRARY_CURRENT", |c| c.version.pp_interface_version.clone()),
    ("MAGICKPP_LIBRARY_CURRENT_MIN", |c| c.version.pp_interface_version.clone()),
    ("MAGICKPP_LIBRARY_VERSION_INFO", |c| c.version.pp_lib_version_number.clone()),
    ("MAGICKPP_LIBRARY_VERSION_TEXT", |c| c.version.version.clone()),
    ("PACKAGE_BASE_VERSION", |c| c.version.version.clone()),
    ("PACKAGE_FULL_VERSION", |c| c.version.full_version()),
    ("PACKAGE_LIB_VERSION", |c| c.version.lib_version()),
    ("PACKAGE_LIB_VERSION_NUMBER", |c| c.version.version_number()),
    ("PACKAGE_NAME", |_| "ImageMagick".to_string()),
    ("PACKAGE_VERSION_ADDENDUM", |c| c.version.addendum.clone()),
    ("PACKAGE_RELEASE_DATE", |c| c.version.release_date.clone()),
    ("QUANTUM_DEPTH", |c| c.config.quantum_depth.bits().to_string()),
    ("RELEASE_DATE", |c| c.version.release_date.clone()),
    ("TARGET_OS", |_| "Windows".to_string()),
];

/// Tokens that are recognized but have no value here; lines carrying them
/// are dropped from the output.
pub const SKIPPABLE: &[&str] = &[
    "CODER_PATH",
    "CONFIGURE_ARGS",
    "CONFIGURE_PATH",
    "CXXFLAGS",
    "DEFS",
    "DISTCHECK_CONFIG_FLAGS",
    "EXEC_PREFIX_DIR",
    "EXECUTABLE_PATH",
    "FILTER_PATH",
    "host",
    "INCLUDE_PATH",
    "LIBRARY_PATH",
    "MAGICK_CFLAGS",
    "MAGICK_CPPFLAGS",
    "MAGICK_DELEGATES",
    "MAGICK_FEATURES",
    "MAGICK_LDFLAGS",
    "MAGICK_LIBS",
    "MAGICK_PCFLAGS",
    "MAGICK_SECURITY_POLICY",
    "MAGICK_TARGET_VENDOR",
    "PREFIX_DIR",
    "SHARE_PATH",
    "SHAREARCH_PATH",
];

fn resolver(token: &str) -> Option<Resolver> {
    RESOLVERS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, resolve)| *resolve)
}

/// Substitute one template. `file` only labels errors.
pub fn render(text: &str, ctx: &TemplateContext<'_>, file: &Path) -> Result<String, GenError> {
    let mut out = String::with_capacity(text.len());

    'lines: for line in text.lines() {
        let mut rendered = String::with_capacity(line.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(line) {
            let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let token = token.as_str();

            match resolver(token) {
                Some(resolve) => {
                    rendered.push_str(&line[last..whole.start()]);
                    rendered.push_str(&resolve(ctx));
                    last = whole.end();
                }
                None if SKIPPABLE.contains(&token) => continue 'lines,
                None => {
                    return Err(GenError::UnknownPlaceholder {
                        token: token.to_string(),
                        file: file.to_path_buf(),
                    })
                }
            }
        }

        rendered.push_str(&line[last..]);
        out.push_str(&rendered);
        out.push('\n');
    }

    Ok(out)
}

/// Template/output pairs, root-relative.
pub fn version_files(config: &Configuration) -> Vec<(PathBuf, PathBuf)> {
    let layout = &config.layout;
    let product = layout.product_path();
    let build = layout.build_path();
    let folder = layout.core_folder();

    vec![
        (
            product.join(folder).join("version.h.in"),
            product.join(folder).join("version.h"),
        ),
        (
            product.join("config").join("configure.xml.in"),
            layout.bin_path().join("configure.xml"),
        ),
        (
            build.join("installer").join("inc").join("version.isx.in"),
            build.join("installer").join("inc").join("version.isx"),
        ),
        (
            build.join("utilities").join("ImageMagick.version.h.in"),
            build.join("utilities").join("ImageMagick.version.h"),
        ),
    ]
}

/// Render every version template that exists, paired with its output
/// path. Nothing is written here, so an unknown placeholder in any template
/// aborts before a single version file lands on disk.
pub fn render_version_files(
    config: &Configuration,
    version: &VersionInfo,
) -> Result<Vec<(PathBuf, String)>, GenError> {
    let ctx = TemplateContext { config, version };
    let mut rendered = Vec::new();

    for (input, output) in version_files(config) {
        let Ok(text) = std::fs::read_to_string(&input) else {
            tracing::debug!("no template at {}", input.display());
            continue;
        };
        rendered.push((output, render(&text, &ctx, &input)?));
    }

    Ok(rendered)
}

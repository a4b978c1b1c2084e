//! Configuration file support.
//!
//! Settings are read from `projgen.toml` in the source root, or from the
//! file named by `--config`. Every field is optional; command-line flags
//! take precedence over the file, and the file over built-in defaults.
//!
//! ```toml
//! [generate]
//! platform = "x64"
//! toolchain = "vs2022"
//! solution_type = "dynamic-mt"
//! quantum_depth = 16
//! policy = "open"
//! write_prefixes = ["CORE"]
//!
//! [features]
//! hdri = true
//! opencl = false
//!
//! [layout]
//! build_dir = "VisualMagick"
//! product_dir = "ImageMagick"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::config::{
    Configuration, Platform, PolicyPreset, QuantumDepth, SolutionType, ToolchainVersion,
};

/// Name of the configuration file looked up in the source root.
pub const CONFIG_FILE: &str = "projgen.toml";

/// Contents of a `projgen.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generate: GenerateConfig,
    pub features: FeatureConfig,
    pub output: OutputConfig,
    pub layout: LayoutConfig,
}

/// Top-level generation choices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub platform: Option<Platform>,
    pub toolchain: Option<ToolchainVersion>,
    pub solution_type: Option<SolutionType>,
    pub quantum_depth: Option<QuantumDepth>,
    pub policy: Option<PolicyPreset>,
    pub cmake_min_version: Option<String>,
    pub write_prefixes: Option<Vec<String>>,
}

/// Feature toggles; unset entries keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub hdri: Option<bool>,
    pub openmp: Option<bool>,
    pub opencl: Option<bool>,
    pub dpc: Option<bool>,
    pub exclude_deprecated: Option<bool>,
    pub installed_support: Option<bool>,
    pub zero_configuration: Option<bool>,
    pub include_optional: Option<bool>,
    pub include_incompatible_license: Option<bool>,
}

/// Output directories written into descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub bin: Option<String>,
    pub lib: Option<String>,
    pub fuzz_bin: Option<String>,
}

/// Directory names under the source root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub build_dir: Option<String>,
    pub product_dir: Option<String>,
}

fn set<T>(target: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(value) = value {
        *target = value.clone();
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config file at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let g = other.generate;
        if g.platform.is_some() {
            self.generate.platform = g.platform;
        }
        if g.toolchain.is_some() {
            self.generate.toolchain = g.toolchain;
        }
        if g.solution_type.is_some() {
            self.generate.solution_type = g.solution_type;
        }
        if g.quantum_depth.is_some() {
            self.generate.quantum_depth = g.quantum_depth;
        }
        if g.policy.is_some() {
            self.generate.policy = g.policy;
        }
        if g.cmake_min_version.is_some() {
            self.generate.cmake_min_version = g.cmake_min_version;
        }
        if g.write_prefixes.is_some() {
            self.generate.write_prefixes = g.write_prefixes;
        }

        let f = other.features;
        let mine = &mut self.features;
        for (target, value) in [
            (&mut mine.hdri, f.hdri),
            (&mut mine.openmp, f.openmp),
            (&mut mine.opencl, f.opencl),
            (&mut mine.dpc, f.dpc),
            (&mut mine.exclude_deprecated, f.exclude_deprecated),
            (&mut mine.installed_support, f.installed_support),
            (&mut mine.zero_configuration, f.zero_configuration),
            (&mut mine.include_optional, f.include_optional),
            (
                &mut mine.include_incompatible_license,
                f.include_incompatible_license,
            ),
        ] {
            if value.is_some() {
                *target = value;
            }
        }

        if other.output.bin.is_some() {
            self.output.bin = other.output.bin;
        }
        if other.output.lib.is_some() {
            self.output.lib = other.output.lib;
        }
        if other.output.fuzz_bin.is_some() {
            self.output.fuzz_bin = other.output.fuzz_bin;
        }

        if other.layout.build_dir.is_some() {
            self.layout.build_dir = other.layout.build_dir;
        }
        if other.layout.product_dir.is_some() {
            self.layout.product_dir = other.layout.product_dir;
        }
    }

    /// Write every set value onto `config`.
    pub fn apply(&self, config: &mut Configuration) {
        let g = &self.generate;
        set(&mut config.platform, &g.platform);
        set(&mut config.toolchain, &g.toolchain);
        set(&mut config.solution_type, &g.solution_type);
        set(&mut config.quantum_depth, &g.quantum_depth);
        set(&mut config.policy, &g.policy);
        set(&mut config.cmake_min_version, &g.cmake_min_version);
        set(&mut config.write_prefixes, &g.write_prefixes);

        let f = &self.features;
        let features = &mut config.features;
        set(&mut features.hdri, &f.hdri);
        set(&mut features.openmp, &f.openmp);
        set(&mut features.opencl, &f.opencl);
        set(&mut features.dpc, &f.dpc);
        set(&mut features.exclude_deprecated, &f.exclude_deprecated);
        set(&mut features.installed_support, &f.installed_support);
        set(&mut features.zero_configuration, &f.zero_configuration);
        set(&mut features.include_optional, &f.include_optional);
        set(
            &mut features.include_incompatible_license,
            &f.include_incompatible_license,
        );

        set(&mut config.output.bin, &self.output.bin);
        set(&mut config.output.lib, &self.output.lib);
        set(&mut config.output.fuzz_bin, &self.output.fuzz_bin);

        set(&mut config.layout.build_dir, &self.layout.build_dir);
        set(&mut config.layout.product_dir, &self.layout.product_dir);
    }
}

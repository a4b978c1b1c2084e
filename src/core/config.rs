//! The configuration record that drives a generation run.
//!
//! A [`Configuration`] is assembled once (file settings, then CLI flags)
//! and then only ever handed out by shared reference. Every enum here is a
//! closed set: string lookups fail with [`GenError::Unmapped`] and
//! enum-to-string mappings are exhaustive `match`es.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::GenError;
use crate::core::layout::Layout;

/// Target CPU platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "win32")]
    X86,
    #[default]
    X64,
    Arm64,
}

impl Platform {
    /// Name used in solution/intermediate directory names (`Win32`, `x64`, `ARM64`).
    pub fn name(&self) -> &'static str {
        match self {
            Platform::X86 => "Win32",
            Platform::X64 => "x64",
            Platform::Arm64 => "ARM64",
        }
    }

    /// Lowercase alias substituted into templates (`x86`, `x64`, `arm64`).
    pub fn alias(&self) -> &'static str {
        match self {
            Platform::X86 => "x86",
            Platform::X64 => "x64",
            Platform::Arm64 => "arm64",
        }
    }

}

impl FromStr for Platform {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "win32" => Ok(Platform::X86),
            "x64" => Ok(Platform::X64),
            "arm64" => Ok(Platform::Arm64),
            _ => Err(GenError::unmapped("platform", s)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// Supported toolchain (Visual Studio) versions, oldest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ToolchainVersion {
    #[serde(rename = "vs2017", alias = "2017")]
    Vs2017,
    #[serde(rename = "vs2019", alias = "2019")]
    Vs2019,
    #[default]
    #[serde(rename = "vs2022", alias = "2022")]
    Vs2022,
}

impl ToolchainVersion {
    /// The earliest version this generator targets.
    pub const EARLIEST: ToolchainVersion = ToolchainVersion::Vs2017;

    pub fn name(&self) -> &'static str {
        match self {
            ToolchainVersion::Vs2017 => "VS2017",
            ToolchainVersion::Vs2019 => "VS2019",
            ToolchainVersion::Vs2022 => "VS2022",
        }
    }
}

impl FromStr for ToolchainVersion {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("VS")
            .or_else(|| trimmed.strip_prefix("vs"))
            .unwrap_or(trimmed);
        match digits {
            "2017" => Ok(ToolchainVersion::Vs2017),
            "2019" => Ok(ToolchainVersion::Vs2019),
            "2022" => Ok(ToolchainVersion::Vs2022),
            _ => Err(GenError::unmapped("toolchain version", s)),
        }
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the runtime and libraries are linked across the whole solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolutionType {
    /// Static libraries, static runtime.
    #[serde(alias = "static-mt")]
    StaticMultithreaded,
    /// Static libraries, dynamic runtime.
    #[serde(alias = "static-mtd")]
    StaticMultithreadedDebug,
    /// Shared libraries and loadable modules.
    #[default]
    #[serde(alias = "dynamic-mt")]
    DynamicMultithreaded,
}

impl SolutionType {
    pub fn name(&self) -> &'static str {
        match self {
            SolutionType::StaticMultithreaded => "StaticMT",
            SolutionType::StaticMultithreadedDebug => "StaticMTD",
            SolutionType::DynamicMultithreaded => "DynamicMT",
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, SolutionType::DynamicMultithreaded)
    }
}

impl FromStr for SolutionType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static-multithreaded" | "static-mt" | "staticmt" => {
                Ok(SolutionType::StaticMultithreaded)
            }
            "static-multithreaded-debug" | "static-mtd" | "staticmtd" => {
                Ok(SolutionType::StaticMultithreadedDebug)
            }
            "dynamic-multithreaded" | "dynamic-mt" | "dynamicmt" => {
                Ok(SolutionType::DynamicMultithreaded)
            }
            _ => Err(GenError::unmapped("solution type", s)),
        }
    }
}

/// Bits per color quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum QuantumDepth {
    Q8,
    #[default]
    Q16,
    Q32,
    Q64,
}

impl QuantumDepth {
    pub fn bits(&self) -> u32 {
        match self {
            QuantumDepth::Q8 => 8,
            QuantumDepth::Q16 => 16,
            QuantumDepth::Q32 => 32,
            QuantumDepth::Q64 => 64,
        }
    }
}

impl TryFrom<u32> for QuantumDepth {
    type Error = GenError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(QuantumDepth::Q8),
            16 => Ok(QuantumDepth::Q16),
            32 => Ok(QuantumDepth::Q32),
            64 => Ok(QuantumDepth::Q64),
            _ => Err(GenError::unmapped("quantum depth", value.to_string())),
        }
    }
}

impl From<QuantumDepth> for u32 {
    fn from(depth: QuantumDepth) -> u32 {
        depth.bits()
    }
}

impl FromStr for QuantumDepth {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches(['Q', 'q']);
        digits
            .parse::<u32>()
            .map_err(|_| GenError::unmapped("quantum depth", s))
            .and_then(QuantumDepth::try_from)
    }
}

/// Security policy preset copied into the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyPreset {
    Limited,
    #[default]
    Open,
    Secure,
    Websafe,
}

impl PolicyPreset {
    /// File name of the preset inside the product `config/` directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            PolicyPreset::Limited => "policy-limited.xml",
            PolicyPreset::Open => "policy-open.xml",
            PolicyPreset::Secure => "policy-secure.xml",
            PolicyPreset::Websafe => "policy-websafe.xml",
        }
    }
}

impl FromStr for PolicyPreset {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "limited" => Ok(PolicyPreset::Limited),
            "open" => Ok(PolicyPreset::Open),
            "secure" => Ok(PolicyPreset::Secure),
            "websafe" => Ok(PolicyPreset::Websafe),
            _ => Err(GenError::unmapped("policy preset", s)),
        }
    }
}

/// Feature toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub hdri: bool,
    pub openmp: bool,
    pub opencl: bool,
    pub dpc: bool,
    pub exclude_deprecated: bool,
    pub installed_support: bool,
    pub zero_configuration: bool,
    pub include_optional: bool,
    pub include_incompatible_license: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            hdri: true,
            openmp: true,
            opencl: false,
            dpc: false,
            exclude_deprecated: true,
            installed_support: false,
            zero_configuration: false,
            include_optional: false,
            include_incompatible_license: false,
        }
    }
}

/// Output directories, emitted verbatim into descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDirs {
    pub bin: String,
    pub lib: String,
    pub fuzz_bin: String,
}

impl Default for OutputDirs {
    fn default() -> Self {
        OutputDirs {
            bin: "../bin/".to_string(),
            lib: "../lib/".to_string(),
            fuzz_bin: "../fuzz/".to_string(),
        }
    }
}

/// Immutable snapshot of every choice that drives generation.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub platform: Platform,
    pub toolchain: ToolchainVersion,
    pub solution_type: SolutionType,
    pub quantum_depth: QuantumDepth,
    pub policy: PolicyPreset,
    pub features: Features,
    pub output: OutputDirs,
    /// Minimum CMake version declared by every descriptor.
    pub cmake_min_version: String,
    /// Variant prefixes that get a descriptor and an aggregate entry.
    pub write_prefixes: Vec<String>,
    pub layout: Layout,
}

impl Configuration {
    /// A configuration with default choices for the given tree layout.
    pub fn new(layout: Layout) -> Self {
        Configuration {
            platform: Platform::default(),
            toolchain: ToolchainVersion::default(),
            solution_type: SolutionType::default(),
            quantum_depth: QuantumDepth::default(),
            policy: PolicyPreset::default(),
            features: Features::default(),
            output: OutputDirs::default(),
            cmake_min_version: "3.18".to_string(),
            write_prefixes: vec!["CORE".to_string()],
            layout,
        }
    }

    /// Solution name, e.g. `DynamicMT`.
    pub fn solution_name(&self) -> &'static str {
        self.solution_type.name()
    }

    /// Channel mask depth substituted into templates.
    pub fn channel_mask_depth(&self) -> &'static str {
        if self.toolchain >= ToolchainVersion::Vs2022 && self.platform != Platform::X86 {
            "64"
        } else {
            "32"
        }
    }

    /// Whether variants with this prefix are written.
    pub fn writes_prefix(&self, prefix: &str) -> bool {
        self.write_prefixes.iter().any(|p| p == prefix)
    }
}

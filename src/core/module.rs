//! Module descriptors - one per source-tree subsystem.
//!
//! A module is a directory under the build dir that carries a `Config.txt`
//! file. The file declares the artifact kind and the static composition
//! rules that every variant of the module starts from.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::config::{Configuration, Platform, ToolchainVersion};
use crate::core::errors::GenError;
use crate::core::layout::{Layout, MODULE_CONFIG};
use crate::core::variant::TargetVariant;
use crate::util::lines::{push_unique, SectionReader};

/// What a module builds. Fixed once the descriptor is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    StaticLibrary,
    SharedLibrary,
    Executable,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::StaticLibrary => write!(f, "static-library"),
            ArtifactKind::SharedLibrary => write!(f, "shared-library"),
            ArtifactKind::Executable => write!(f, "executable"),
        }
    }
}

/// Compiler frontend selected for a module's C sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compiler {
    #[default]
    C,
    Cpp,
}

/// A module descriptor and the variants discovered for it.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    kind: ArtifactKind,
    is_module: bool,
    is_fuzz: bool,
    unicode: bool,
    optional: bool,
    incompatible_license: bool,
    prefix: Option<String>,
    directories: Vec<String>,
    defines: Vec<String>,
    defines_dll: Vec<String>,
    defines_lib: Vec<String>,
    dependencies: Vec<String>,
    includes: Vec<String>,
    excludes: Vec<String>,
    platform_excludes: HashMap<Platform, Vec<String>>,
    libraries: Vec<String>,
    warning_level: u32,
    treat_warnings_as_errors: bool,
    icon: Option<String>,
    licenses: Vec<String>,
    notice: String,
    config_define: String,
    min_toolchain: ToolchainVersion,
    /// `Some(None)`: always C++; `Some(Some(v))`: C++ from toolchain `v` on.
    cpp_from: Option<Option<ToolchainVersion>>,
    variant_names: Vec<String>,
    module_names: Vec<String>,
    variants: Vec<TargetVariant>,
}

impl Module {
    /// Create an empty descriptor of the given kind.
    pub fn new(name: impl Into<String>, kind: ArtifactKind) -> Self {
        Module {
            name: name.into(),
            kind,
            is_module: false,
            is_fuzz: false,
            unicode: false,
            optional: false,
            incompatible_license: false,
            prefix: None,
            directories: Vec::new(),
            defines: Vec::new(),
            defines_dll: Vec::new(),
            defines_lib: Vec::new(),
            dependencies: Vec::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            platform_excludes: HashMap::new(),
            libraries: Vec::new(),
            warning_level: 3,
            treat_warnings_as_errors: false,
            icon: None,
            licenses: Vec::new(),
            notice: String::new(),
            config_define: String::new(),
            min_toolchain: ToolchainVersion::EARLIEST,
            cpp_from: None,
            variant_names: Vec::new(),
            module_names: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Load the descriptor for `<build>/<dir_name>`.
    ///
    /// Returns `Ok(None)` for directories that are not modules: no
    /// `Config.txt`, or one that declares no artifact kind.
    pub fn load(layout: &Layout, dir_name: &str) -> Result<Option<Module>> {
        let path = layout.module_path(dir_name).join(MODULE_CONFIG);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|e| GenError::io(&path, e))?;

        let mut module = match Module::parse(dir_name, &text)
            .with_context(|| format!("failed to parse {}", path.display()))?
        {
            Some(module) => module,
            None => return Ok(None),
        };

        module.notice = module.read_notice(layout);
        Ok(Some(module))
    }

    /// Parse descriptor text. `Ok(None)` when no kind section is present.
    pub fn parse(name: &str, text: &str) -> Result<Option<Module>, GenError> {
        let mut kind = None;
        let mut module = Module::new(name, ArtifactKind::StaticLibrary);
        let mut reader = SectionReader::new(text);

        while let Some(line) = reader.next_line() {
            match line {
                "[LIB]" => {
                    kind.get_or_insert(ArtifactKind::StaticLibrary);
                }
                "[DLL]" => {
                    kind.get_or_insert(ArtifactKind::SharedLibrary);
                }
                "[EXE]" => {
                    kind.get_or_insert(ArtifactKind::Executable);
                }
                "[MODULE]" => module.is_module = true,
                "[FUZZ]" => module.is_fuzz = true,
                "[UNICODE]" => module.unicode = true,
                "[OPTIONAL]" => module.optional = true,
                "[INCOMPATIBLE_LICENSE]" => module.incompatible_license = true,
                "[TREAT_WARNINGS_AS_ERRORS]" => module.treat_warnings_as_errors = true,
                "[DIRECTORIES]" => reader.read_into(&mut module.directories),
                "[DEFINES]" => reader.read_into(&mut module.defines),
                "[DEFINES_DLL]" => reader.read_into(&mut module.defines_dll),
                "[DEFINES_LIB]" => reader.read_into(&mut module.defines_lib),
                "[DEPENDENCIES]" => reader.read_into(&mut module.dependencies),
                "[INCLUDES]" => reader.read_into(&mut module.includes),
                "[EXCLUDES]" => reader.read_into(&mut module.excludes),
                "[EXCLUDES_X86]" => reader.read_into(
                    module.platform_excludes.entry(Platform::X86).or_default(),
                ),
                "[EXCLUDES_X64]" => reader.read_into(
                    module.platform_excludes.entry(Platform::X64).or_default(),
                ),
                "[EXCLUDES_ARM64]" => reader.read_into(
                    module.platform_excludes.entry(Platform::Arm64).or_default(),
                ),
                "[LIBRARIES]" => reader.read_into(&mut module.libraries),
                "[LICENSE]" => reader.read_into(&mut module.licenses),
                "[VARIANTS]" => reader.read_into(&mut module.variant_names),
                "[MODULES]" => reader.read_into(&mut module.module_names),
                "[WARNING_LEVEL]" => {
                    if let Some(value) = reader.read_value() {
                        module.warning_level = value
                            .parse()
                            .map_err(|_| GenError::unmapped("warning level", value))?;
                    }
                }
                "[ICON]" => module.icon = reader.read_value(),
                "[PREFIX]" => module.prefix = reader.read_value(),
                "[VISUAL_STUDIO]" => {
                    if let Some(value) = reader.read_value() {
                        module.min_toolchain = value.parse()?;
                    }
                }
                "[COMPILER_CPP]" => {
                    let from = match reader.read_value() {
                        Some(value) => Some(value.parse()?),
                        None => None,
                    };
                    module.cpp_from = Some(from);
                }
                "[CONFIG_DEFINE]" => {
                    let mut block = String::new();
                    while let Some(line) = reader.next_raw_line() {
                        if line.is_empty() {
                            break;
                        }
                        block.push_str(line);
                        block.push('\n');
                    }
                    module.config_define = block;
                }
                _ => {}
            }
        }

        Ok(kind.map(|kind| {
            module.kind = kind;
            module
        }))
    }

    fn read_notice(&self, layout: &Layout) -> String {
        let mut notice = String::new();
        for license in &self.licenses {
            match std::fs::read_to_string(layout.resolve(license)) {
                Ok(text) => {
                    notice.push_str(&format!("[ {} ] copyright:\n\n", self.name));
                    notice.push_str(text.trim_end());
                    notice.push_str("\n\n");
                }
                Err(e) => {
                    tracing::debug!("skipping license {} for {}: {}", license, self.name, e);
                }
            }
        }
        notice
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn is_lib(&self) -> bool {
        self.kind == ArtifactKind::StaticLibrary
    }

    pub fn is_dll(&self) -> bool {
        self.kind == ArtifactKind::SharedLibrary
    }

    pub fn is_exe(&self) -> bool {
        self.kind == ArtifactKind::Executable
    }

    /// Whether each source file may be compiled as an isolated unit.
    pub fn is_module(&self) -> bool {
        self.is_module
    }

    pub fn is_fuzz(&self) -> bool {
        self.is_fuzz
    }

    pub fn use_unicode(&self) -> bool {
        self.unicode
    }

    /// Whether this configuration builds one variant per source file.
    pub fn is_module_style(&self, config: &Configuration) -> bool {
        self.is_module && (self.is_exe() || (self.is_dll() && config.solution_type.is_dynamic()))
    }

    /// Whether the configuration's feature choices exclude this module.
    pub fn should_skip(&self, config: &Configuration) -> bool {
        (self.optional && !config.features.include_optional)
            || (self.incompatible_license && !config.features.include_incompatible_license)
    }

    pub fn is_supported(&self, toolchain: ToolchainVersion) -> bool {
        toolchain >= self.min_toolchain
    }

    /// Compiler frontend used under the given toolchain.
    pub fn compiler(&self, toolchain: ToolchainVersion) -> Compiler {
        match self.cpp_from {
            Some(None) => Compiler::Cpp,
            Some(Some(from)) if toolchain >= from => Compiler::Cpp,
            _ => Compiler::C,
        }
    }

    /// Variant prefix: explicit `[PREFIX]`, otherwise derived from the kind.
    pub fn prefix(&self, config: &Configuration) -> String {
        if let Some(prefix) = &self.prefix {
            return prefix.clone();
        }
        if self.is_fuzz {
            "FUZZ".to_string()
        } else if !self.is_module_style(config) {
            "CORE".to_string()
        } else if self.is_exe() {
            "UTIL".to_string()
        } else {
            "IM_MOD".to_string()
        }
    }

    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    pub fn defines(&self) -> &[String] {
        &self.defines
    }

    pub fn defines_dll(&self) -> &[String] {
        &self.defines_dll
    }

    pub fn defines_lib(&self) -> &[String] {
        &self.defines_lib
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn platform_excludes(&self, platform: Platform) -> &[String] {
        self.platform_excludes
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    pub fn warning_level(&self) -> u32 {
        self.warning_level
    }

    pub fn treat_warnings_as_errors(&self) -> bool {
        self.treat_warnings_as_errors
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn notice(&self) -> &str {
        &self.notice
    }

    pub fn config_define(&self) -> &str {
        &self.config_define
    }

    /// Explicit variant names for a non-module-style build.
    pub fn variant_names(&self) -> &[String] {
        &self.variant_names
    }

    /// Explicit `name` / `name=reference` entries for a module-style build.
    pub fn module_names(&self) -> &[String] {
        &self.module_names
    }

    pub fn variants(&self) -> &[TargetVariant] {
        &self.variants
    }

    pub(crate) fn variants_mut(&mut self) -> &mut Vec<TargetVariant> {
        &mut self.variants
    }

    /// Builder-style helpers used by callers that assemble descriptors in code.
    pub fn with_directory(mut self, dir: impl Into<String>) -> Self {
        push_unique(&mut self.directories, dir.into());
        self
    }

    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        push_unique(&mut self.dependencies, dep.into());
        self
    }

    pub fn with_module_flag(mut self) -> Self {
        self.is_module = true;
        self
    }
}

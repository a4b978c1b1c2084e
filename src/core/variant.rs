//! Target variants - one per buildable artifact of a module.
//!
//! A variant starts from its module's defaults, is populated by discovery,
//! extended by the override loader, optionally absorbs flagged duplicates,
//! and is finally serialized once by the descriptor writer.

use serde::Serialize;

use crate::core::config::{Configuration, ToolchainVersion};
use crate::core::module::Module;
use crate::util::hash::guid;
use crate::util::lines::{merge_unique, push_unique};

/// Classified file sets, root-relative paths in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSets {
    pub sources: Vec<String>,
    pub headers: Vec<String>,
    pub resources: Vec<String>,
}

impl FileSets {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.headers.is_empty() && self.resources.is_empty()
    }

    /// Union another set into this one, keeping first-occurrence order.
    pub fn extend(&mut self, other: &FileSets) {
        merge_unique(&other.sources, &mut self.sources);
        merge_unique(&other.headers, &mut self.headers);
        merge_unique(&other.resources, &mut self.resources);
    }
}

/// One concrete buildable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetVariant {
    prefix: String,
    name: String,
    reference: Option<String>,
    guid: String,
    duplicate: bool,
    pub(crate) dependencies: Vec<String>,
    pub(crate) includes: Vec<String>,
    pub(crate) defines_lib: Vec<String>,
    pub(crate) cpp_files: Vec<String>,
    pub(crate) min_toolchain: ToolchainVersion,
    pub(crate) aliases: Vec<String>,
    pub(crate) files: FileSets,
}

impl TargetVariant {
    /// Create a variant seeded with its module's dependencies, includes
    /// and library defines.
    pub fn new(module: &Module, prefix: impl Into<String>, name: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let name = name.into();
        let guid = guid(&format!("{}_{}", prefix, name));

        TargetVariant {
            prefix,
            name,
            reference: None,
            guid,
            duplicate: false,
            dependencies: module.dependencies().to_vec(),
            includes: module.includes().to_vec(),
            defines_lib: module.defines_lib().to_vec(),
            cpp_files: Vec::new(),
            min_toolchain: ToolchainVersion::EARLIEST,
            aliases: Vec::new(),
            files: FileSets::default(),
        }
    }

    /// Locate files by `reference` instead of the variant's own name.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Mark this variant as a secondary discovery of an earlier one.
    pub fn as_duplicate(mut self) -> Self {
        self.duplicate = true;
        self
    }

    /// `(prefix, name)` identity.
    pub fn identity(&self) -> (&str, &str) {
        (&self.prefix, &self.name)
    }

    /// Full name, `PREFIX_name`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.prefix, self.name)
    }

    pub fn base_name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name used to locate the implementation file.
    pub fn lookup_name(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.name)
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn defines_lib(&self) -> &[String] {
        &self.defines_lib
    }

    pub fn cpp_files(&self) -> &[String] {
        &self.cpp_files
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn files(&self) -> &FileSets {
        &self.files
    }

    pub fn min_toolchain(&self) -> ToolchainVersion {
        self.min_toolchain
    }

    pub fn is_supported(&self, toolchain: ToolchainVersion) -> bool {
        toolchain >= self.min_toolchain
    }

    /// Record discovered files.
    pub fn add_files(&mut self, files: &FileSets) {
        self.files.extend(files);
    }

    pub fn add_dependency(&mut self, dependency: impl Into<String>) {
        push_unique(&mut self.dependencies, dependency.into());
    }

    /// Union `other`'s collections into this variant. Never removes or
    /// overwrites, so merging the same variant twice is a no-op.
    pub fn merge(&mut self, other: &TargetVariant) {
        merge_unique(&other.dependencies, &mut self.dependencies);
        merge_unique(&other.includes, &mut self.includes);
        merge_unique(&other.cpp_files, &mut self.cpp_files);
        merge_unique(&other.defines_lib, &mut self.defines_lib);
        self.files.extend(&other.files);
    }

    /// Whether the variant is emitted as a static library.
    pub fn is_lib(&self, module: &Module, config: &Configuration) -> bool {
        module.is_lib() || (!config.solution_type.is_dynamic() && module.is_dll())
    }

    /// Output file base name, `PREFIX_DB_name_` / `PREFIX_RL_name_`.
    pub fn target_name(&self, debug: bool) -> String {
        let mut target = format!("{}_", self.prefix);
        if self.prefix != "FILTER" {
            target.push_str(if debug { "DB_" } else { "RL_" });
        }
        target.push_str(&self.name);
        target.push('_');
        target
    }

    /// Intermediate directory, e.g. `Release/DynamicMT-x64/CORE_zlib/`.
    pub fn intermediate_dir(&self, config: &Configuration, debug: bool) -> String {
        format!(
            "{}/{}-{}/{}_{}/",
            if debug { "Debug" } else { "Release" },
            config.solution_name(),
            config.platform.name(),
            self.prefix,
            self.name
        )
    }

    /// Directory the built artifact lands in.
    pub fn output_directory<'c>(&self, module: &Module, config: &'c Configuration) -> &'c str {
        if module.is_fuzz() {
            &config.output.fuzz_bin
        } else if self.is_lib(module, config) {
            &config.output.lib
        } else {
            &config.output.bin
        }
    }
}

//! The top-level generation loop.
//!
//! All mutation (discovery, overrides, merging, consistency checks) happens
//! in [`Solution::load_variants`]. Writing only reads the finished module
//! set, which is also the universe every descriptor resolves links against.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::config::{Configuration, SolutionType};
use crate::core::errors::GenError;
use crate::core::layout::PROJECTS_DIR;
use crate::core::module::{ArtifactKind, Module};
use crate::core::overrides;
use crate::core::variant::{FileSets, TargetVariant};
use crate::ops::artifacts;
use crate::ops::discover::{add_cpp_files, discover_variants, DiskTree, SourceTree};
use crate::ops::version::{self, VersionInfo};
use crate::ops::write_descriptor::{self, resolve_dependencies, target_decl, TargetDecl};
use crate::util::fs::{relative_path, subdirectories, write_string};
use crate::util::progress::Progress;

/// Steps beyond one per loaded variant: aggregate, base config, threshold
/// map, policy.
const FIXED_STEPS: u64 = 4;

/// Every module found under the build directory.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    modules: Vec<Module>,
}

/// What a generation run produced.
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    /// Variants that survived the consistency check.
    pub variants: usize,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
    /// Files whose write was abandoned.
    pub failed: Vec<PathBuf>,
}

/// One variant as reported by `projgen plan`.
#[derive(Debug, Clone, Serialize)]
pub struct VariantPlan {
    pub name: String,
    pub guid: String,
    pub module: String,
    pub kind: ArtifactKind,
    pub target: &'static str,
    pub debug_target: String,
    pub release_target: String,
    pub debug_intermediate_dir: String,
    pub release_intermediate_dir: String,
    pub output_directory: String,
    pub descriptor: Option<String>,
    pub links: Vec<String>,
    pub aliases: Vec<String>,
    pub files: FileSets,
}

impl Solution {
    /// A solution over already-constructed modules.
    pub fn new(modules: Vec<Module>) -> Self {
        Solution { modules }
    }

    /// Enumerate the build directory. Directories without a module
    /// descriptor are skipped; a malformed descriptor is fatal.
    pub fn load(config: &Configuration) -> Result<Solution> {
        let mut modules = Vec::new();

        for dir in subdirectories(&config.layout.build_path()) {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name == PROJECTS_DIR {
                continue;
            }

            match Module::load(&config.layout, name)? {
                Some(module) => {
                    tracing::debug!("found module {} ({})", module.name(), module.kind());
                    modules.push(module);
                }
                None => tracing::trace!("{} is not a module", name),
            }
        }

        tracing::info!("loaded {} modules", modules.len());
        Ok(Solution { modules })
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// All variants in module order.
    pub fn variants(&self) -> impl Iterator<Item = (&Module, &TargetVariant)> {
        self.modules
            .iter()
            .flat_map(|m| m.variants().iter().map(move |v| (m, v)))
    }

    /// Discover, override, filter and merge every module's variants, then
    /// check identities. Returns the number of variants loaded.
    pub fn load_variants(&mut self, config: &Configuration, tree: &dyn SourceTree) -> Result<usize> {
        let mut count = 0;

        for module in &mut self.modules {
            if module.should_skip(config) {
                tracing::debug!("skipping {}: excluded by feature selection", module.name());
                continue;
            }
            if !module.is_supported(config.toolchain) {
                tracing::debug!("skipping {}: requires a newer toolchain", module.name());
                continue;
            }

            let mut variants = discover_variants(tree, module, config);
            for variant in &mut variants {
                overrides::load(tree, variant, module, config)?;
                add_cpp_files(tree, variant);
            }

            variants.retain(|variant| {
                let supported = variant.is_supported(config.toolchain);
                if !supported {
                    tracing::debug!(
                        "dropping {}: requires {}",
                        variant.name(),
                        variant.min_toolchain()
                    );
                }
                supported
            });

            let merged = merge_duplicates(variants);
            count += merged.len();
            *module.variants_mut() = merged;
        }

        self.check_unique()?;
        Ok(count)
    }

    fn check_unique(&self) -> Result<(), GenError> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (module, variant) in self.variants() {
            if let Some(first) = seen.insert(variant.name(), module.name()) {
                return Err(GenError::DuplicateVariant {
                    name: variant.name(),
                    first: first.to_string(),
                    second: module.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Text of the aggregate descriptor.
    pub fn render_aggregate(&self, config: &Configuration) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "cmake_minimum_required(VERSION {})", config.cmake_min_version);
        let _ = writeln!(out, "project(Visual{} LANGUAGES C CXX ASM)", config.solution_name());
        out.push_str("set(CMAKE_CXX_STANDARD 17)\n");
        out.push_str("set(CMAKE_CXX_STANDARD_REQUIRED ON)\n");
        out.push_str("set(CMAKE_C_STANDARD 17)\n");
        out.push_str("set(CMAKE_C_STANDARD_REQUIRED ON)\n");

        let lib = &config.output.lib;
        let _ = writeln!(out, "set(CMAKE_LIBRARY_OUTPUT_DIRECTORY \"{}\")", lib);
        let _ = writeln!(out, "set(CMAKE_RUNTIME_OUTPUT_DIRECTORY \"{}\")", config.output.bin);
        let _ = writeln!(out, "set(CMAKE_ARCHIVE_OUTPUT_DIRECTORY \"{}\")", lib);
        let _ = writeln!(out, "link_directories(\"{}\")", lib);

        let runtime = match config.solution_type {
            SolutionType::StaticMultithreaded => "MultiThreaded$<$<CONFIG:Debug>:Debug>",
            SolutionType::StaticMultithreadedDebug | SolutionType::DynamicMultithreaded => {
                "MultiThreaded$<$<CONFIG:Debug>:Debug>DLL"
            }
        };
        let _ = writeln!(out, "set(CMAKE_MSVC_RUNTIME_LIBRARY \"{}\")", runtime);

        for (_, variant) in self.variants() {
            if config.writes_prefix(variant.prefix()) {
                let _ = writeln!(out, "add_subdirectory({}/{})", PROJECTS_DIR, variant.name());
            }
        }

        out
    }

    /// Write the aggregate, every written-prefix descriptor, and the derived
    /// artifacts. Output failures are logged and recorded; structural
    /// errors abort.
    pub fn write(
        &self,
        config: &Configuration,
        version: Option<&VersionInfo>,
        progress: &mut dyn Progress,
    ) -> Result<GenerateReport> {
        let mut report = GenerateReport {
            variants: self.variants().count(),
            ..GenerateReport::default()
        };

        progress.next_step("Writing solution");
        let aggregate = config.layout.aggregate_path();
        let written = write_string(&aggregate, &self.render_aggregate(config)).map(|_| aggregate.clone());
        record(&mut report, aggregate, written)?;

        for (module, variant) in self.variants() {
            if !config.writes_prefix(variant.prefix()) {
                continue;
            }
            progress.next_step(&format!("Writing: {}", variant.name()));
            let path = write_descriptor::descriptor_file(variant, config);
            let written = write_descriptor::write(variant, module, config, &self.modules);
            record(&mut report, path, written)?;

            let resource = write_descriptor::icon_resource_file(variant, config);
            let written = write_descriptor::write_icon_resource(variant, module, config);
            record_optional(&mut report, resource, written)?;
        }

        progress.next_step("Writing configuration");
        let base_config = config
            .layout
            .product_path()
            .join(config.layout.core_folder())
            .join("magick-baseconfig.h");
        record_optional(
            &mut report,
            base_config,
            artifacts::write_base_config(config, &self.modules),
        )?;

        progress.next_step("Writing threshold-map.h");
        let thresholds = config.layout.product_path().join("MagickCore").join("threshold-map.h");
        record_optional(&mut report, thresholds, artifacts::write_threshold_map(config))?;

        progress.next_step("Writing policy config");
        let policy = config.layout.bin_path().join("policy.xml");
        record(&mut report, policy, artifacts::write_policy(config))?;

        if let Some(version) = version {
            progress.next_step("Writing version");
            for (output, text) in version::render_version_files(config, version)? {
                let written = write_string(&output, &text).map(|_| output.clone());
                record(&mut report, output, written)?;
            }

            let notice = config.layout.build_path().join("NOTICE.txt");
            record(&mut report, notice, artifacts::write_notice(config, version, &self.modules))?;
        }

        Ok(report)
    }

    /// Describe every loaded variant without writing anything.
    pub fn plan(&self, config: &Configuration) -> Vec<VariantPlan> {
        self.variants()
            .map(|(module, variant)| {
                let descriptor = config.writes_prefix(variant.prefix()).then(|| {
                    let path = write_descriptor::descriptor_file(variant, config);
                    relative_path(&config.layout.root, &path)
                        .to_string_lossy()
                        .replace('\\', "/")
                });

                VariantPlan {
                    name: variant.name(),
                    guid: variant.guid().to_string(),
                    module: module.name().to_string(),
                    kind: module.kind(),
                    target: match target_decl(variant, module, config) {
                        TargetDecl::Static => "static",
                        TargetDecl::Shared => "shared",
                        TargetDecl::Executable => "executable",
                    },
                    debug_target: variant.target_name(true),
                    release_target: variant.target_name(false),
                    debug_intermediate_dir: variant.intermediate_dir(config, true),
                    release_intermediate_dir: variant.intermediate_dir(config, false),
                    output_directory: variant.output_directory(module, config).to_string(),
                    descriptor,
                    links: resolve_dependencies(variant, &self.modules),
                    aliases: variant.aliases().to_vec(),
                    files: variant.files().clone(),
                }
            })
            .collect()
    }
}

/// Fold flagged duplicates into the first variant with the same identity.
/// A duplicate whose original was dropped takes its place.
pub fn merge_duplicates(variants: Vec<TargetVariant>) -> Vec<TargetVariant> {
    let mut merged: Vec<TargetVariant> = Vec::with_capacity(variants.len());

    for variant in variants {
        if variant.is_duplicate() {
            if let Some(first) = merged.iter_mut().find(|m| m.identity() == variant.identity()) {
                tracing::debug!("merging duplicate {}", variant.name());
                first.merge(&variant);
                continue;
            }
        }
        merged.push(variant);
    }

    merged
}

fn is_structural(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.downcast_ref::<GenError>().is_some())
}

fn record(report: &mut GenerateReport, path: PathBuf, result: Result<PathBuf>) -> Result<()> {
    record_optional(report, path, result.map(Some))
}

fn record_optional(
    report: &mut GenerateReport,
    path: PathBuf,
    result: Result<Option<PathBuf>>,
) -> Result<()> {
    match result {
        Ok(Some(written)) => report.written.push(written),
        Ok(None) => {}
        Err(err) if is_structural(&err) => return Err(err),
        Err(err) => {
            tracing::warn!("abandoned write of {}: {:#}", path.display(), err);
            report.failed.push(path);
        }
    }
    Ok(())
}

/// Load, check and write everything under `config`.
pub fn generate(config: &Configuration, progress: &mut dyn Progress) -> Result<GenerateReport> {
    let tree = DiskTree::new(config.layout.root.clone());
    let mut solution = Solution::load(config)?;
    let count = solution.load_variants(config, &tree)?;
    progress.set_steps(count as u64 + FIXED_STEPS);

    let version = VersionInfo::load(config)?;
    if version.is_none() {
        tracing::info!("no {}; skipping version files", version::VERSION_FILE);
    }

    let report = solution.write(config, version.as_ref(), progress)?;
    progress.finish();

    tracing::info!(
        "generated {} variants, {} files written, {} failed",
        report.variants,
        report.written.len(),
        report.failed.len()
    );
    Ok(report)
}

/// Load and check everything under `config`, then describe it.
pub fn plan(config: &Configuration) -> Result<Vec<VariantPlan>> {
    let tree = DiskTree::new(config.layout.root.clone());
    let mut solution = Solution::load(config)?;
    solution.load_variants(config, &tree)?;
    Ok(solution.plan(config))
}

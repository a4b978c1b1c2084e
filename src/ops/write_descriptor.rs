//! CMake descriptor emission for a single variant.
//!
//! [`render`] is a pure function of the resolved variant, its module, the
//! configuration and the read-only universe of all modules (used to resolve
//! link dependencies by name). [`write`] puts the result on disk.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::config::{Configuration, SolutionType};
use crate::core::layout::{descriptor_path, DESCRIPTOR_FILE, RELATIVE_TO_ROOT};
use crate::core::module::{Compiler, Module};
use crate::core::variant::TargetVariant;
use crate::ops::discover::takes_language_override;
use crate::util::fs::write_string;
use crate::util::lines::push_unique;

/// Separator between a dependency's module name and a specific variant.
pub const QUALIFIER_SEPARATOR: char = '>';

/// Include path appended when OpenCL is enabled.
pub const OPENCL_INCLUDE: &str = "VisualMagick/OpenCL";

/// Target declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDecl {
    Static,
    Shared,
    Executable,
}

/// How the variant is declared under this configuration.
pub fn target_decl(variant: &TargetVariant, module: &Module, config: &Configuration) -> TargetDecl {
    if variant.is_lib(module, config) {
        TargetDecl::Static
    } else if module.is_dll() {
        TargetDecl::Shared
    } else {
        TargetDecl::Executable
    }
}

/// Resolve a variant's dependencies against every known module.
///
/// `Name` links every variant of module `Name`; `Name>Variant` links only
/// the variant whose base or full name is `Variant`. Names that match
/// nothing resolve to no link.
pub fn resolve_dependencies(variant: &TargetVariant, universe: &[Module]) -> Vec<String> {
    let mut links = Vec::new();

    for dependency in variant.dependencies() {
        let (project, qualifier) = match dependency.split_once(QUALIFIER_SEPARATOR) {
            Some((project, qualifier)) => (project, Some(qualifier)),
            None => (dependency.as_str(), None),
        };

        let mut matched = false;
        for module in universe.iter().filter(|m| m.name() == project) {
            for candidate in module.variants() {
                let name = candidate.name();
                let wanted = match qualifier {
                    Some(q) => candidate.base_name() == q || name == q,
                    None => true,
                };
                if wanted {
                    matched = true;
                    push_unique(&mut links, name);
                }
            }
        }

        if !matched {
            tracing::debug!("{}: dependency `{}` matches no project", variant.name(), dependency);
        }
    }

    links
}

/// Render the full descriptor text.
pub fn render(
    variant: &TargetVariant,
    module: &Module,
    config: &Configuration,
    universe: &[Module],
) -> String {
    let mut out = String::new();
    let name = variant.name();

    write_header(&mut out, &name, module, config);
    write_target(&mut out, &name, target_decl(variant, module, config));
    write_include_directories(&mut out, &name, variant, module, config);
    write_compile_definitions(&mut out, &name, variant, module, config);
    write_compile_options(&mut out, &name, module, config);
    write_properties(&mut out, &name, module, config);

    let compiler = module.compiler(config.toolchain);
    write_files(&mut out, &name, &variant.files().sources, compiler);
    write_files(&mut out, &name, &variant.files().headers, compiler);
    write_files(&mut out, &name, &variant.files().resources, compiler);
    write_icon(&mut out, &name, module);

    let mut links = resolve_dependencies(variant, universe);
    for library in module.libraries() {
        push_unique(&mut links, library.clone());
    }
    write_link_libraries(&mut out, &name, &links);

    out
}

fn write_header(out: &mut String, name: &str, module: &Module, config: &Configuration) {
    let _ = writeln!(out, "cmake_minimum_required(VERSION {})", config.cmake_min_version);
    let _ = writeln!(out, "project({} LANGUAGES C CXX ASM)", name);
    out.push_str("set(CMAKE_CXX_STANDARD 17)\n");
    out.push_str("set(CMAKE_CXX_STANDARD_REQUIRED ON)\n");
    out.push_str("set(CMAKE_C_STANDARD 17)\n");
    out.push_str("set(CMAKE_C_STANDARD_REQUIRED ON)\n");

    if module.use_unicode() {
        out.push_str("add_definitions(-DUNICODE -D_UNICODE)\n");
    }
}

fn write_target(out: &mut String, name: &str, decl: TargetDecl) {
    let _ = match decl {
        TargetDecl::Static => writeln!(out, "add_library({} STATIC)", name),
        TargetDecl::Shared => writeln!(out, "add_library({} SHARED)", name),
        TargetDecl::Executable => writeln!(out, "add_executable({})", name),
    };
}

/// Scan directories not covered by an explicit include, then the explicit
/// includes, then the OpenCL path.
pub fn include_directories(
    variant: &TargetVariant,
    module: &Module,
    config: &Configuration,
) -> Vec<String> {
    let mut dirs = Vec::new();

    for dir in module.directories() {
        let covered = variant
            .includes()
            .iter()
            .any(|include| dir.starts_with(include.as_str()));
        if !covered {
            dirs.push(descriptor_path(dir));
        }
    }

    for include in variant.includes() {
        dirs.push(descriptor_path(include));
    }

    if config.features.opencl {
        dirs.push(descriptor_path(OPENCL_INCLUDE));
    }

    dirs
}

fn write_include_directories(
    out: &mut String,
    name: &str,
    variant: &TargetVariant,
    module: &Module,
    config: &Configuration,
) {
    let _ = write!(out, "target_include_directories({} PUBLIC ", name);
    for dir in include_directories(variant, module, config) {
        let _ = write!(out, "\n  {}", dir);
    }
    out.push_str("\n)\n");
}

/// The resolved preprocessor define set, after the fixed baseline.
pub fn compile_definitions(
    variant: &TargetVariant,
    module: &Module,
    config: &Configuration,
) -> Vec<String> {
    let mut defines: Vec<String> = ["_WINDOWS", "WIN32", "_VISUALC_", "NeedFunctionPrototypes"]
        .iter()
        .map(|d| d.to_string())
        .collect();

    defines.extend(module.defines().iter().cloned());

    let dynamic = config.solution_type.is_dynamic();
    if variant.is_lib(module, config) || (!dynamic && module.is_exe()) {
        defines.extend(variant.defines_lib().iter().cloned());
        defines.push("_LIB".to_string());
    } else if module.is_dll() {
        defines.extend(module.defines_dll().iter().cloned());
        defines.push("_DLL".to_string());
        defines.push("_MAGICKMOD_".to_string());
    }

    if module.is_exe() && config.solution_type != SolutionType::StaticMultithreaded {
        defines.push("_AFXDLL".to_string());
    }

    if config.features.include_incompatible_license {
        defines.push("_MAGICK_INCOMPATIBLE_LICENSES_".to_string());
    }

    defines
}

fn write_compile_definitions(
    out: &mut String,
    name: &str,
    variant: &TargetVariant,
    module: &Module,
    config: &Configuration,
) {
    let _ = write!(out, "target_compile_definitions({} PRIVATE ", name);
    out.push_str("\n  $<$<CONFIG:Debug>:_DEBUG>");
    out.push_str("\n  $<$<CONFIG:Release>:NDEBUG>");
    for define in compile_definitions(variant, module, config) {
        let _ = write!(out, "\n  {}", define);
    }
    out.push_str("\n)\n");
}

fn write_compile_options(out: &mut String, name: &str, module: &Module, config: &Configuration) {
    let _ = write!(
        out,
        "target_compile_options({} PRIVATE /W{}",
        name,
        module.warning_level()
    );
    if module.treat_warnings_as_errors() {
        out.push_str(" /WX");
    }
    if module.compiler(config.toolchain) == Compiler::Cpp {
        out.push_str(" /TP");
    }
    out.push_str(" /Zi");
    if config.features.openmp {
        out.push_str(" /openmp");
    }
    out.push_str(" /FC /source-charset:utf-8)\n");
}

fn write_properties(out: &mut String, name: &str, module: &Module, config: &Configuration) {
    if !module.is_fuzz() {
        return;
    }
    let _ = writeln!(out, "set_target_properties({} PROPERTIES ", name);
    let _ = writeln!(out, "  RUNTIME_OUTPUT_DIRECTORY {}", config.output.fuzz_bin);
    out.push_str(")\n");
}

fn write_files(out: &mut String, name: &str, files: &[String], compiler: Compiler) {
    if files.is_empty() {
        return;
    }

    let _ = writeln!(out, "target_sources({} PRIVATE", name);
    for file in files {
        let _ = writeln!(out, "  {}", descriptor_path(file));
    }
    out.push_str(")\n");

    if compiler != Compiler::Cpp {
        return;
    }
    for file in files.iter().filter(|f| takes_language_override(f)) {
        let _ = writeln!(
            out,
            "set_source_files_properties({} PROPERTIES LANGUAGE CXX)",
            descriptor_path(file)
        );
    }
}

fn write_icon(out: &mut String, name: &str, module: &Module) {
    if !module.is_exe() || module.icon().is_none() {
        return;
    }
    let _ = writeln!(out, "target_sources({} PRIVATE", name);
    let _ = writeln!(out, "  {}.rc", name);
    out.push_str(")\n");
}

fn write_link_libraries(out: &mut String, name: &str, links: &[String]) {
    if links.is_empty() {
        return;
    }
    let _ = writeln!(out, "target_link_libraries({} PUBLIC ", name);
    for link in links {
        let _ = writeln!(out, "  {}", link);
    }
    out.push_str(")\n");
}

/// Icon resource script for executables that declare an icon.
pub fn render_icon_resource(module: &Module) -> Option<String> {
    let icon = module.icon().filter(|_| module.is_exe())?;
    Some(format!(
        "#define IDI_ICON1 101\nIDI_ICON1 ICON \"{}{}\"\n",
        RELATIVE_TO_ROOT, icon
    ))
}

/// Path of a variant's descriptor.
pub fn descriptor_file(variant: &TargetVariant, config: &Configuration) -> PathBuf {
    config.layout.project_path(&variant.name()).join(DESCRIPTOR_FILE)
}

/// Path of a variant's icon resource script, next to its descriptor.
pub fn icon_resource_file(variant: &TargetVariant, config: &Configuration) -> PathBuf {
    config
        .layout
        .project_path(&variant.name())
        .join(format!("{}.rc", variant.name()))
}

/// Write the descriptor for one variant. Returns its path.
pub fn write(
    variant: &TargetVariant,
    module: &Module,
    config: &Configuration,
    universe: &[Module],
) -> Result<PathBuf> {
    let path = descriptor_file(variant, config);
    write_string(&path, &render(variant, module, config, universe))?;
    Ok(path)
}

/// Write the icon resource script when the module declares one.
pub fn write_icon_resource(
    variant: &TargetVariant,
    module: &Module,
    config: &Configuration,
) -> Result<Option<PathBuf>> {
    let Some(resource) = render_icon_resource(module) else {
        return Ok(None);
    };
    let path = icon_resource_file(variant, config);
    write_string(&path, &resource)?;
    Ok(Some(path))
}

//! Per-variant override files.
//!
//! Two optional files live next to a module's `Config.txt`:
//!
//! - `Config.<name>.txt` with `[DEPENDENCIES]`, `[INCLUDES]`, `[CPP]`,
//!   `[VISUAL_STUDIO]` and `[DEFINES_LIB]` sections
//! - `Aliases.<name>.txt`, one public-facing alternate name per line
//!
//! A missing file leaves the variant at its module defaults.

use crate::core::config::Configuration;
use crate::core::errors::GenError;
use crate::core::module::Module;
use crate::core::variant::TargetVariant;
use crate::ops::discover::SourceTree;
use crate::util::lines::{push_unique, SectionReader};

/// Apply the text of a `Config.<name>.txt` file.
pub fn apply_config(variant: &mut TargetVariant, text: &str) -> Result<(), GenError> {
    let mut reader = SectionReader::new(text);

    while let Some(line) = reader.next_line() {
        match line {
            "[DEPENDENCIES]" => reader.read_into(&mut variant.dependencies),
            "[INCLUDES]" => reader.read_into(&mut variant.includes),
            "[CPP]" => reader.read_into(&mut variant.cpp_files),
            "[DEFINES_LIB]" => reader.read_into(&mut variant.defines_lib),
            "[VISUAL_STUDIO]" => {
                if let Some(value) = reader.read_value() {
                    variant.min_toolchain = value.parse()?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Parse an `Aliases.<name>.txt` file.
pub fn parse_aliases(text: &str) -> Vec<String> {
    let mut aliases = Vec::new();
    let mut reader = SectionReader::new(text);
    while let Some(line) = reader.next_line() {
        if !line.is_empty() {
            push_unique(&mut aliases, line.to_string());
        }
    }
    aliases
}

/// Load both override files for `variant` from the module's directory.
pub fn load(
    tree: &dyn SourceTree,
    variant: &mut TargetVariant,
    module: &Module,
    config: &Configuration,
) -> Result<(), GenError> {
    let layout = &config.layout;

    let config_path = layout.module_relative(
        module.name(),
        &format!("Config.{}.txt", variant.base_name()),
    );
    if let Some(text) = tree.read_to_string(&config_path) {
        tracing::debug!("applying overrides from {}", config_path);
        apply_config(variant, &text)?;
    }

    // Aliases only mean something for isolated executables.
    if !module.is_exe() || !module.is_module() {
        return Ok(());
    }

    let aliases_path = layout.module_relative(
        module.name(),
        &format!("Aliases.{}.txt", variant.base_name()),
    );
    if let Some(text) = tree.read_to_string(&aliases_path) {
        for alias in parse_aliases(&text) {
            push_unique(&mut variant.aliases, alias);
        }
    }

    Ok(())
}

//! Derived text artifacts written after the descriptors.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::config::Configuration;
use crate::core::errors::GenError;
use crate::core::module::Module;
use crate::ops::version::VersionInfo;
use crate::util::fs::{copy_file, read_to_string, write_string};

/// Marker line in the base-config template that receives the feature blocks.
pub const CONFIG_MARKER: &str = "$$CONFIG$$";

const RULE: &str =
    "* * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * *";

fn comment(out: &mut String, lines: &[&str]) {
    out.push_str("/*\n");
    for line in lines {
        let _ = writeln!(out, "  {}", line);
    }
    out.push_str("*/\n");
}

fn toggle(out: &mut String, enabled: bool, name: &str) {
    let _ = writeln!(out, "#{} {}", if enabled { "define" } else { "undef" }, name);
}

/// The block substituted for [`CONFIG_MARKER`].
pub fn feature_blocks(config: &Configuration, modules: &[Module]) -> String {
    let features = &config.features;
    let mut out = String::new();

    comment(
        &mut out,
        &[
            "Define to build an ImageMagick which uses registry settings or",
            "hard-coded paths to locate installed components.",
        ],
    );
    toggle(&mut out, features.installed_support, "MAGICKCORE_INSTALLED_SUPPORT");
    out.push('\n');

    comment(&mut out, &["Specify size of PixelPacket color Quantums (8, 16, 32 or 64)."]);
    let _ = writeln!(out, "#define MAGICKCORE_QUANTUM_DEPTH {}", config.quantum_depth.bits());
    out.push('\n');

    if modules.iter().any(|m| m.name() == "MagickCore") {
        comment(&mut out, &["Channel mask depth"]);
        out.push_str(
            "#if defined(WIN32) || defined(_WIN32) || defined(__WIN32__) || defined(__NT__)\n\
             #ifdef _WIN64\n\
             #define MAGICKCORE_CHANNEL_MASK_DEPTH 64\n\
             #else\n\
             #define MAGICKCORE_CHANNEL_MASK_DEPTH 32\n\
             #endif\n\
             #else\n\
             #define MAGICKCORE_CHANNEL_MASK_DEPTH 32\n\
             #endif\n\n",
        );
    }

    comment(&mut out, &["Define to enable high dynamic range imagery (HDRI)"]);
    let _ = writeln!(out, "#define MAGICKCORE_HDRI_ENABLE {}", u8::from(features.hdri));
    out.push('\n');

    comment(&mut out, &["Define to enable OpenCL"]);
    toggle(&mut out, features.opencl, "MAGICKCORE_HAVE_CL_CL_H");
    out.push('\n');

    comment(&mut out, &["Define to enable Distributed Pixel Cache"]);
    toggle(&mut out, features.dpc, "MAGICKCORE_DPC_SUPPORT");
    out.push('\n');

    comment(&mut out, &["Exclude deprecated methods in MagickCore API"]);
    toggle(&mut out, features.exclude_deprecated, "MAGICKCORE_EXCLUDE_DEPRECATED");
    out.push('\n');

    comment(&mut out, &["Define to only use the built-in (in-memory) settings."]);
    let _ = writeln!(
        out,
        "#define MAGICKCORE_ZERO_CONFIGURATION_SUPPORT {}",
        u8::from(features.zero_configuration)
    );

    for module in modules {
        if module.variants().is_empty() || module.config_define().is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(module.config_define());
    }

    out
}

/// Expand the base-config template. Lines other than the marker are kept.
pub fn render_base_config(template: &str, config: &Configuration, modules: &[Module]) -> String {
    let mut out = String::with_capacity(template.len());
    for line in template.lines() {
        if line.trim() == CONFIG_MARKER {
            out.push_str(&feature_blocks(config, modules));
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Write `<product>/<core>/magick-baseconfig.h`. Skipped when the template
/// is missing.
pub fn write_base_config(config: &Configuration, modules: &[Module]) -> Result<Option<PathBuf>> {
    let layout = &config.layout;
    let folder = layout.core_folder();
    let input = layout.build_path().join(folder).join("magick-baseconfig.h.in");
    if !input.is_file() {
        tracing::debug!("no base config template at {}", input.display());
        return Ok(None);
    }

    let output = layout.product_path().join(folder).join("magick-baseconfig.h");
    let template = read_to_string(&input)?;
    write_string(&output, &render_base_config(&template, config, modules))?;
    Ok(Some(output))
}

/// Copy the selected policy preset to `<build>/bin/policy.xml`.
pub fn write_policy(config: &Configuration) -> Result<PathBuf> {
    let input = config
        .layout
        .product_path()
        .join("config")
        .join(config.policy.file_name());
    if !input.is_file() {
        return Err(GenError::PolicyMissing { path: input }.into());
    }

    let output = config.layout.bin_path().join("policy.xml");
    copy_file(&input, &output)?;
    Ok(output)
}

/// Turn the thresholds XML into a C string table.
pub fn render_threshold_map(xml: &str) -> String {
    let mut out = String::from("static const char *const BuiltinMap=\n");
    for line in xml.lines().filter(|line| !line.is_empty()) {
        let _ = writeln!(out, "\"{}\"", line.replace('"', "\\\""));
    }
    out.push(';');
    out
}

/// Write `<product>/MagickCore/threshold-map.h` when zero-configuration
/// support is on and the thresholds file exists.
pub fn write_threshold_map(config: &Configuration) -> Result<Option<PathBuf>> {
    if !config.features.zero_configuration {
        return Ok(None);
    }

    let input = config.layout.bin_path().join("thresholds.xml");
    if !input.is_file() {
        tracing::debug!("no thresholds at {}", input.display());
        return Ok(None);
    }

    let output = config
        .layout
        .product_path()
        .join("MagickCore")
        .join("threshold-map.h");
    let xml = read_to_string(&input)?;
    write_string(&output, &render_threshold_map(&xml))?;
    Ok(Some(output))
}

/// Aggregate the product license and every non-skipped module notice.
pub fn render_notice(
    license: &str,
    version: &VersionInfo,
    config: &Configuration,
    modules: &[Module],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", RULE);
    let _ = writeln!(out, "[ ImageMagick {} ] copyright:\n", version.full_version());
    out.push_str(license);
    if !license.ends_with('\n') {
        out.push('\n');
    }
    let _ = writeln!(out, "\n{}\n", RULE);

    for module in modules {
        if module.notice().is_empty() || module.should_skip(config) {
            continue;
        }
        out.push_str(module.notice());
        let _ = writeln!(out, "{}\n", RULE);
    }

    out
}

/// Write `<build>/NOTICE.txt`.
pub fn write_notice(
    config: &Configuration,
    version: &VersionInfo,
    modules: &[Module],
) -> Result<PathBuf> {
    let license_path = config.layout.product_path().join("LICENSE");
    let license = std::fs::read_to_string(&license_path).unwrap_or_default();

    let output = config.layout.build_path().join("NOTICE.txt");
    write_string(&output, &render_notice(&license, version, config, modules))?;
    Ok(output)
}

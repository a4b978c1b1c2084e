//! CLI integration tests for projgen.
//!
//! These tests lay out a small source tree in a temporary directory and run
//! the binary against it.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the projgen binary command.
fn projgen() -> Command {
    Command::cargo_bin("projgen").unwrap()
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A tree with a core library, a static zlib, module-style coders and a
/// module-style utility.
fn magick_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write(
        root,
        "VisualMagick/MagickCore/Config.txt",
        "[DLL]\n\n[DIRECTORIES]\nImageMagick/MagickCore\n\n[INCLUDES]\nImageMagick\n\n\
         [DEPENDENCIES]\nzlib\n\n[DEFINES_DLL]\n_MAGICKLIB_\n",
    );
    write(
        root,
        "VisualMagick/zlib/Config.txt",
        "[LIB]\n\n[DIRECTORIES]\nzlib\n\n[INCLUDES]\nzlib\n",
    );
    write(
        root,
        "VisualMagick/coders/Config.txt",
        "[DLL]\n\n[MODULE]\n\n[DIRECTORIES]\nImageMagick/coders\n\n[INCLUDES]\nImageMagick\n\n\
         [DEPENDENCIES]\nMagickCore\nzlib\n",
    );
    write(
        root,
        "VisualMagick/utilities/Config.txt",
        "[EXE]\n\n[MODULE]\n\n[DIRECTORIES]\nImageMagick/utilities\n\n[DEPENDENCIES]\nMagickCore\n",
    );
    write(root, "VisualMagick/utilities/Aliases.magick.txt", "convert\nidentify\n");
    write(root, "VisualMagick/notes/README.txt", "not a module\n");

    for file in [
        "ImageMagick/MagickCore/blob.c",
        "ImageMagick/MagickCore/blob.h",
        "zlib/adler32.c",
        "zlib/zutil.c",
        "ImageMagick/coders/png.c",
        "ImageMagick/coders/bmp.c",
        "ImageMagick/utilities/magick.c",
    ] {
        write(root, file, "");
    }

    write(root, "ImageMagick/config/policy-open.xml", "<policymap open/>\n");
    write(root, "ImageMagick/config/policy-secure.xml", "<policymap secure/>\n");

    tmp
}

fn descriptor(root: &Path, name: &str) -> String {
    fs::read_to_string(
        root.join("VisualMagick/VisualStudioProjects")
            .join(name)
            .join("CMakeLists.txt"),
    )
    .unwrap()
}

fn plan_json(root: &Path, extra: &[&str]) -> serde_json::Value {
    let output = projgen()
        .args(["plan", "--root"])
        .arg(root)
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn find<'a>(plan: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    plan.as_array()
        .unwrap()
        .iter()
        .find(|v| v["name"] == name)
        .unwrap_or_else(|| panic!("{name} missing from plan"))
}

// ============================================================================
// projgen generate
// ============================================================================

#[test]
fn test_generate_writes_core_descriptors() {
    let tmp = magick_tree();

    projgen()
        .args(["generate", "--quiet", "--root"])
        .arg(tmp.path())
        .assert()
        .success();

    let aggregate = fs::read_to_string(tmp.path().join("VisualMagick/CMakeLists.txt")).unwrap();
    assert!(aggregate.contains("project(VisualDynamicMT LANGUAGES C CXX ASM)"));
    assert!(aggregate.contains("add_subdirectory(VisualStudioProjects/CORE_MagickCore)"));
    assert!(aggregate.contains("add_subdirectory(VisualStudioProjects/CORE_zlib)"));
    assert!(!aggregate.contains("IM_MOD_png"));

    let core = descriptor(tmp.path(), "CORE_MagickCore");
    assert!(core.contains("add_library(CORE_MagickCore SHARED)"));
    assert!(core.contains("  _MAGICKLIB_\n"));
    assert!(core.contains("target_link_libraries(CORE_MagickCore PUBLIC \n  CORE_zlib\n)"));

    let policy = fs::read_to_string(tmp.path().join("VisualMagick/bin/policy.xml")).unwrap();
    assert_eq!(policy, "<policymap open/>\n");
}

#[test]
fn test_generate_prints_summary() {
    let tmp = magick_tree();

    projgen()
        .args(["generate", "--root"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 5 variants"));
}

#[test]
fn test_generate_static_demotes_shared_libraries() {
    let tmp = magick_tree();

    projgen()
        .args(["generate", "-q", "--solution-type", "static-mt", "--root"])
        .arg(tmp.path())
        .assert()
        .success();

    let core = descriptor(tmp.path(), "CORE_MagickCore");
    assert!(core.contains("add_library(CORE_MagickCore STATIC)"));
    assert!(core.contains("  _LIB\n"));
    assert!(!core.contains("  _DLL\n"));

    let coders = descriptor(tmp.path(), "CORE_coders");
    assert!(coders.contains("ImageMagick/coders/bmp.c"));
    assert!(coders.contains("ImageMagick/coders/png.c"));
}

#[test]
fn test_generate_opencl_include() {
    let tmp = magick_tree();

    projgen()
        .args(["generate", "-q", "--enable", "opencl", "--root"])
        .arg(tmp.path())
        .assert()
        .success();

    let core = descriptor(tmp.path(), "CORE_MagickCore");
    assert!(core.contains("  ../../../ImageMagick\n  ../../../VisualMagick/OpenCL\n)"));
}

#[test]
fn test_generate_selected_policy() {
    let tmp = magick_tree();

    projgen()
        .args(["generate", "-q", "--policy", "secure", "--root"])
        .arg(tmp.path())
        .assert()
        .success();

    let policy = fs::read_to_string(tmp.path().join("VisualMagick/bin/policy.xml")).unwrap();
    assert_eq!(policy, "<policymap secure/>\n");
}

#[test]
fn test_generate_missing_policy_fails() {
    let tmp = magick_tree();

    projgen()
        .args(["generate", "-q", "--policy", "websafe", "--root"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("policy-websafe.xml"));
}

#[test]
fn test_generate_unknown_placeholder_fails() {
    let tmp = magick_tree();
    write(
        tmp.path(),
        "VisualMagick/version.toml",
        "version = \"7.1.0\"\naddendum = \"-19\"\ninterface_version = \"10\"\n\
         pp_interface_version = \"5\"\nlib_version_number = \"7,1,0,19\"\n\
         pp_lib_version_number = \"5:0:0\"\nrelease_date = \"2021-12-22\"\n",
    );
    write(
        tmp.path(),
        "VisualMagick/installer/inc/version.isx.in",
        "#define Version \"@NOT_A_REAL_TOKEN@\"\n",
    );

    projgen()
        .args(["generate", "-q", "--root"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOT_A_REAL_TOKEN"));

    assert!(!tmp.path().join("VisualMagick/installer/inc/version.isx").exists());
}

#[test]
fn test_generate_version_files_and_notice() {
    let tmp = magick_tree();
    write(
        tmp.path(),
        "VisualMagick/version.toml",
        "version = \"7.1.0\"\naddendum = \"-19\"\ninterface_version = \"10\"\n\
         pp_interface_version = \"5\"\nlib_version_number = \"7,1,0,19\"\n\
         pp_lib_version_number = \"5:0:0\"\nrelease_date = \"2021-12-22\"\n",
    );
    write(
        tmp.path(),
        "VisualMagick/installer/inc/version.isx.in",
        "#define Version \"@PACKAGE_FULL_VERSION@\"\n#define Prefix \"@PREFIX_DIR@\"\n",
    );
    write(tmp.path(), "ImageMagick/LICENSE", "Licensed.\n");

    projgen()
        .args(["generate", "-q", "--root"])
        .arg(tmp.path())
        .assert()
        .success();

    let isx = fs::read_to_string(tmp.path().join("VisualMagick/installer/inc/version.isx")).unwrap();
    assert_eq!(isx, "#define Version \"7.1.0-19\"\n");

    let notice = fs::read_to_string(tmp.path().join("VisualMagick/NOTICE.txt")).unwrap();
    assert!(notice.contains("[ ImageMagick 7.1.0-19 ] copyright:"));
    assert!(notice.contains("Licensed."));
}

// ============================================================================
// projgen plan
// ============================================================================

#[test]
fn test_plan_lists_module_variants() {
    let tmp = magick_tree();
    let plan = plan_json(tmp.path(), &[]);

    let png = find(&plan, "IM_MOD_png");
    assert_eq!(png["target"], "shared");
    assert_eq!(png["release_target"], "IM_MOD_RL_png_");
    assert_eq!(png["links"], serde_json::json!(["CORE_MagickCore", "CORE_zlib"]));
    assert!(png["descriptor"].is_null());

    let magick = find(&plan, "UTIL_magick");
    assert_eq!(magick["target"], "executable");
    assert_eq!(magick["aliases"], serde_json::json!(["convert", "identify"]));
    assert_eq!(magick["output_directory"], "../bin/");

    // Nothing is written by `plan`.
    assert!(!tmp.path().join("VisualMagick/CMakeLists.txt").exists());
}

#[test]
fn test_plan_written_only() {
    let tmp = magick_tree();
    let plan = plan_json(tmp.path(), &["--written-only"]);

    let names: Vec<&str> = plan
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["CORE_MagickCore", "CORE_zlib"]);
}

#[test]
fn test_config_file_then_cli_precedence() {
    let tmp = magick_tree();
    write(tmp.path(), "projgen.toml", "[generate]\nplatform = \"arm64\"\n");

    let plan = plan_json(tmp.path(), &[]);
    assert_eq!(
        find(&plan, "CORE_zlib")["release_intermediate_dir"],
        "Release/DynamicMT-ARM64/CORE_zlib/"
    );

    let plan = plan_json(tmp.path(), &["--platform", "x86"]);
    assert_eq!(
        find(&plan, "CORE_zlib")["release_intermediate_dir"],
        "Release/DynamicMT-Win32/CORE_zlib/"
    );
}

#[test]
fn test_explicit_missing_config_fails() {
    let tmp = magick_tree();

    projgen()
        .args(["plan", "--config"])
        .arg(tmp.path().join("absent.toml"))
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn test_invalid_platform_rejected() {
    let tmp = magick_tree();

    projgen()
        .args(["plan", "--platform", "sparc", "--root"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("sparc"));
}

#[test]
fn test_unknown_toolchain_in_descriptor_fails() {
    let tmp = magick_tree();
    write(
        tmp.path(),
        "VisualMagick/broken/Config.txt",
        "[LIB]\n\n[VISUAL_STUDIO]\nVS2005\n",
    );

    projgen()
        .args(["plan", "--root"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("VS2005"));
}

// ============================================================================
// projgen completions
// ============================================================================

#[test]
fn test_completions_bash() {
    projgen()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("projgen"));
}

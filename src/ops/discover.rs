//! File discovery and classification.
//!
//! Discovery is a pure function of a [`SourceTree`] plus exclusion rules:
//! it never writes, and a missing directory is an empty result.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::config::Configuration;
use crate::core::module::Module;
use crate::core::variant::{FileSets, TargetVariant};
use crate::util::lines::push_unique;

/// Source extensions, in lookup priority order.
pub const SOURCE_EXTENSIONS: &[&str] = &[".c", ".cpp", ".cc"];

/// Extensions that are sources but never get a language override.
pub const ASSEMBLY_EXTENSIONS: &[&str] = &[".asm"];

/// Read-only view of the tree being configured. Paths are root-relative
/// with forward slashes.
pub trait SourceTree {
    /// File names (not paths) directly inside `dir`, sorted. Empty when the
    /// directory is missing or unreadable.
    fn list_files(&self, dir: &str) -> Vec<String>;

    /// Whether `path` names an existing file.
    fn is_file(&self, path: &str) -> bool;

    /// Contents of the file at `path`, or `None` when it is missing or
    /// unreadable.
    fn read_to_string(&self, path: &str) -> Option<String>;
}

/// A [`SourceTree`] backed by the real filesystem.
#[derive(Debug, Clone)]
pub struct DiskTree {
    root: PathBuf,
}

impl DiskTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskTree { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceTree for DiskTree {
    fn list_files(&self, dir: &str) -> Vec<String> {
        let path = self.root.join(dir);
        if !path.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("skipping unreadable entry in {}: {}", dir, e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect()
    }

    fn is_file(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn read_to_string(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.root.join(path)).ok()
    }
}

/// Exclusion rules for one module under one platform.
#[derive(Debug, Clone, Copy)]
pub struct ExcludeRules<'a> {
    pub excludes: &'a [String],
    pub platform_excludes: &'a [String],
}

impl<'a> ExcludeRules<'a> {
    pub fn for_module(module: &'a Module, config: &Configuration) -> Self {
        ExcludeRules {
            excludes: module.excludes(),
            platform_excludes: module.platform_excludes(config.platform),
        }
    }

    /// Whether a whole scan directory is excluded on this platform.
    pub fn excludes_dir(&self, dir: &str) -> bool {
        self.platform_excludes.iter().any(|d| d == dir)
    }

    /// Whether a file is excluded. A header follows its implementation
    /// file: `foo.h` is excluded when any `foo.<src ext>` is.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        if self.matches(file_name) {
            return true;
        }

        match file_name.strip_suffix(".h") {
            Some(stem) => SOURCE_EXTENSIONS
                .iter()
                .any(|ext| self.matches(&format!("{}{}", stem, ext))),
            None => false,
        }
    }

    fn matches(&self, file_name: &str) -> bool {
        self.excludes.iter().any(|e| e == file_name)
            || self.platform_excludes.iter().any(|e| e == file_name)
    }
}

/// Which collection a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Source,
    Header,
    Resource,
}

/// Classify a file by extension; `None` for files discovery ignores.
pub fn classify(file_name: &str) -> Option<FileClass> {
    if is_source_file(file_name) {
        Some(FileClass::Source)
    } else if file_name.ends_with(".h") {
        Some(FileClass::Header)
    } else if file_name.ends_with(".rc") {
        Some(FileClass::Resource)
    } else {
        None
    }
}

pub fn is_source_file(file_name: &str) -> bool {
    SOURCE_EXTENSIONS
        .iter()
        .chain(ASSEMBLY_EXTENSIONS)
        .any(|ext| file_name.ends_with(ext))
}

/// Whether a file is compiled by the module's C/C++ frontend (and so may
/// need a language override).
pub fn takes_language_override(path: &str) -> bool {
    !(path.ends_with(".asm") || path.ends_with(".rc") || path.ends_with(".h"))
}

fn join(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), file)
    }
}

/// Walk one directory and classify every non-excluded file.
pub fn scan(tree: &dyn SourceTree, dir: &str, rules: &ExcludeRules<'_>) -> FileSets {
    let mut files = FileSets::default();
    if rules.excludes_dir(dir) {
        tracing::debug!("directory {} excluded on this platform", dir);
        return files;
    }

    for file_name in tree.list_files(dir) {
        if rules.is_excluded(&file_name) {
            continue;
        }
        let path = join(dir, &file_name);
        match classify(&file_name) {
            Some(FileClass::Source) => push_unique(&mut files.sources, path),
            Some(FileClass::Header) => push_unique(&mut files.headers, path),
            Some(FileClass::Resource) => push_unique(&mut files.resources, path),
            None => {}
        }
    }

    files
}

/// Locate the single implementation file `name.<ext>` in `dir` plus its
/// header. Executables also pick up the directory's `main.<ext>`.
pub fn locate(tree: &dyn SourceTree, dir: &str, name: &str, include_main: bool) -> FileSets {
    let mut files = FileSets::default();
    let header = join(dir, &format!("{}.h", name));

    let find = |stem: &str, files: &mut FileSets| {
        for ext in SOURCE_EXTENSIONS {
            let source = join(dir, &format!("{}{}", stem, ext));
            if tree.is_file(&source) {
                push_unique(&mut files.sources, source);
                if tree.is_file(&header) {
                    push_unique(&mut files.headers, header.clone());
                }
                break;
            }
        }
    };

    find(name, &mut files);
    if include_main {
        find("main", &mut files);
    }

    files
}

/// Candidate variant names in a directory: stems of non-excluded source
/// files, excluding the conventional `main`.
pub fn module_candidates(tree: &dyn SourceTree, dir: &str, rules: &ExcludeRules<'_>) -> Vec<String> {
    let mut names = Vec::new();
    if rules.excludes_dir(dir) {
        return names;
    }

    for file_name in tree.list_files(dir) {
        if rules.is_excluded(&file_name) {
            continue;
        }
        let stem = SOURCE_EXTENSIONS
            .iter()
            .find_map(|ext| file_name.strip_suffix(ext));
        if let Some(stem) = stem {
            if stem != "main" {
                push_unique(&mut names, stem.to_string());
            }
        }
    }

    names
}

/// Enumerate and populate the variants of one module.
///
/// Module-style builds produce one variant per implementation file (or per
/// `[MODULES]` entry); a name seen again in a later directory is flagged as
/// a duplicate for the merge step. Everything else produces one variant per
/// `[VARIANTS]` entry, defaulting to the module's own name, each scanning
/// every directory.
pub fn discover_variants(
    tree: &dyn SourceTree,
    module: &Module,
    config: &Configuration,
) -> Vec<TargetVariant> {
    let rules = ExcludeRules::for_module(module, config);
    let prefix = module.prefix(config);
    let mut variants: Vec<TargetVariant> = Vec::new();

    if module.is_module_style(config) {
        for dir in module.directories() {
            if rules.excludes_dir(dir) {
                continue;
            }

            let entries: Vec<(String, Option<String>)> = if module.module_names().is_empty() {
                module_candidates(tree, dir, &rules)
                    .into_iter()
                    .map(|name| (name, None))
                    .collect()
            } else {
                module
                    .module_names()
                    .iter()
                    .map(|entry| match entry.split_once('=') {
                        Some((name, reference)) => {
                            (name.trim().to_string(), Some(reference.trim().to_string()))
                        }
                        None => (entry.clone(), None),
                    })
                    .collect()
            };

            for (name, reference) in entries {
                let mut variant = TargetVariant::new(module, prefix.clone(), name.clone());
                if let Some(reference) = reference {
                    variant = variant.with_reference(reference);
                }

                let files = locate(tree, dir, variant.lookup_name(), module.is_exe());
                if files.sources.is_empty() {
                    continue;
                }

                if variants.iter().any(|v| v.base_name() == name) {
                    tracing::debug!("{}_{} seen again in {}", prefix, name, dir);
                    variant = variant.as_duplicate();
                }

                variant.add_files(&files);
                variants.push(variant);
            }
        }
    } else {
        let names: Vec<String> = if module.variant_names().is_empty() {
            vec![module.name().to_string()]
        } else {
            module.variant_names().to_vec()
        };

        let mut files = FileSets::default();
        for dir in module.directories() {
            files.extend(&scan(tree, dir, &rules));
        }

        for name in names {
            let mut variant = TargetVariant::new(module, prefix.clone(), name);
            variant.add_files(&files);
            variants.push(variant);
        }
    }

    let resource = config
        .layout
        .module_relative(module.name(), &format!("{}.rc", module.name()));
    if tree.is_file(&resource) {
        let extra = FileSets {
            resources: vec![resource],
            ..FileSets::default()
        };
        for variant in &mut variants {
            variant.add_files(&extra);
        }
    }

    variants
}

/// Append the override-declared `[CPP]` files to a variant's sources.
pub fn add_cpp_files(tree: &dyn SourceTree, variant: &mut TargetVariant) {
    let existing: Vec<String> = variant
        .cpp_files()
        .iter()
        .filter(|path| {
            let found = tree.is_file(path);
            if !found {
                tracing::debug!("{}: extra source {} not found", variant.name(), path);
            }
            found
        })
        .cloned()
        .collect();

    let extra = FileSets {
        sources: existing,
        ..FileSets::default()
    };
    variant.add_files(&extra);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Platform, SolutionType};
    use crate::core::layout::Layout;
    use crate::test_support::MockFileSystem;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn rules<'a>(excludes: &'a [String], platform: &'a [String]) -> ExcludeRules<'a> {
        ExcludeRules {
            excludes,
            platform_excludes: platform,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("a.c"), Some(FileClass::Source));
        assert_eq!(classify("a.cpp"), Some(FileClass::Source));
        assert_eq!(classify("a.asm"), Some(FileClass::Source));
        assert_eq!(classify("a.h"), Some(FileClass::Header));
        assert_eq!(classify("a.rc"), Some(FileClass::Resource));
        assert_eq!(classify("README"), None);
        assert_eq!(classify("a.hpp"), None);
    }

    #[test]
    fn test_header_follows_source_exclusion() {
        for ext in SOURCE_EXTENSIONS {
            let excludes = vec![format!("emf{}", ext)];
            let rules = rules(&excludes, &[]);
            assert!(rules.is_excluded(&format!("emf{}", ext)));
            assert!(rules.is_excluded("emf.h"), "header not excluded for {}", ext);
            assert!(!rules.is_excluded("png.h"));
        }
    }

    #[test]
    fn test_scan_classifies_and_excludes() {
        let mut fs = MockFileSystem::new();
        fs.add_file("zlib/adler32.c", "");
        fs.add_file("zlib/zutil.c", "");
        fs.add_file("zlib/zutil.h", "");
        fs.add_file("zlib/gzlib.c", "");
        fs.add_file("zlib/gzlib.h", "");
        fs.add_file("zlib/inffast.asm", "");
        fs.add_file("zlib/zlib.rc", "");
        fs.add_file("zlib/README", "");
        fs.add_file("zlib/sub/nested.c", "");

        let excludes = strings(&["gzlib.c"]);
        let files = scan(&fs, "zlib", &rules(&excludes, &[]));

        assert_eq!(
            files.sources,
            strings(&["zlib/adler32.c", "zlib/inffast.asm", "zlib/zutil.c"])
        );
        assert_eq!(files.headers, strings(&["zlib/zutil.h"]));
        assert_eq!(files.resources, strings(&["zlib/zlib.rc"]));
    }

    #[test]
    fn test_scan_missing_or_platform_excluded_dir_is_empty() {
        let mut fs = MockFileSystem::new();
        fs.add_file("coders/arm/neon.c", "");

        assert!(scan(&fs, "does/not/exist", &rules(&[], &[])).is_empty());

        let platform = strings(&["coders/arm"]);
        assert!(scan(&fs, "coders/arm", &rules(&[], &platform)).is_empty());
    }

    #[test]
    fn test_locate_with_header_and_main() {
        let mut fs = MockFileSystem::new();
        fs.add_file("utilities/magick.c", "");
        fs.add_file("utilities/magick.h", "");
        fs.add_file("utilities/main.cpp", "");

        let lib = locate(&fs, "utilities", "magick", false);
        assert_eq!(lib.sources, strings(&["utilities/magick.c"]));
        assert_eq!(lib.headers, strings(&["utilities/magick.h"]));

        let exe = locate(&fs, "utilities", "magick", true);
        assert_eq!(
            exe.sources,
            strings(&["utilities/magick.c", "utilities/main.cpp"])
        );
        assert_eq!(exe.headers, strings(&["utilities/magick.h"]));
    }

    #[test]
    fn test_locate_falls_back_to_main_for_executables() {
        let mut fs = MockFileSystem::new();
        fs.add_file("fuzz/main.cc", "");

        let files = locate(&fs, "fuzz", "encoder", true);
        assert_eq!(files.sources, strings(&["fuzz/main.cc"]));
        assert!(locate(&fs, "fuzz", "encoder", false).is_empty());
    }

    #[test]
    fn test_module_candidates() {
        let mut fs = MockFileSystem::new();
        fs.add_file("coders/png.c", "");
        fs.add_file("coders/jpeg.c", "");
        fs.add_file("coders/emf.c", "");
        fs.add_file("coders/main.c", "");
        fs.add_file("coders/coders.h", "");

        let excludes = strings(&["emf.c"]);
        assert_eq!(
            module_candidates(&fs, "coders", &rules(&excludes, &[])),
            strings(&["jpeg", "png"])
        );
    }

    #[test]
    fn test_discover_module_style_flags_duplicates() {
        let mut fs = MockFileSystem::new();
        fs.add_file("coders/png.c", "");
        fs.add_file("coders/jpeg.c", "");
        fs.add_file("coders/win/png.c", "");

        let module = Module::parse(
            "coders",
            "[DLL]\n\n[MODULE]\n\n[DIRECTORIES]\ncoders\ncoders/win\n",
        )
        .unwrap()
        .unwrap();
        let mut config = Configuration::new(Layout::new("."));
        config.solution_type = SolutionType::DynamicMultithreaded;

        let variants = discover_variants(&fs, &module, &config);
        let names: Vec<(String, bool)> = variants
            .iter()
            .map(|v| (v.name(), v.is_duplicate()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("IM_MOD_jpeg".to_string(), false),
                ("IM_MOD_png".to_string(), false),
                ("IM_MOD_png".to_string(), true),
            ]
        );
        assert_eq!(variants[2].files().sources, strings(&["coders/win/png.c"]));
    }

    #[test]
    fn test_discover_static_collapses_to_one_variant() {
        let mut fs = MockFileSystem::new();
        fs.add_file("coders/png.c", "");
        fs.add_file("coders/jpeg.c", "");
        fs.add_file("VisualMagick/coders/coders.rc", "");

        let module = Module::parse("coders", "[DLL]\n\n[MODULE]\n\n[DIRECTORIES]\ncoders\n")
            .unwrap()
            .unwrap();
        let mut config = Configuration::new(Layout::new("."));
        config.solution_type = SolutionType::StaticMultithreaded;

        let variants = discover_variants(&fs, &module, &config);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].name(), "CORE_coders");
        assert_eq!(
            variants[0].files().sources,
            strings(&["coders/jpeg.c", "coders/png.c"])
        );
        assert_eq!(
            variants[0].files().resources,
            strings(&["VisualMagick/coders/coders.rc"])
        );
    }

    #[test]
    fn test_discover_explicit_modules_with_reference() {
        let mut fs = MockFileSystem::new();
        fs.add_file("utilities/magick.c", "");

        let module = Module::parse(
            "utilities",
            "[EXE]\n\n[MODULE]\n\n[DIRECTORIES]\nutilities\n\n[MODULES]\nmagick\nconvert=magick\nmissing\n",
        )
        .unwrap()
        .unwrap();
        let config = Configuration::new(Layout::new("."));

        let variants = discover_variants(&fs, &module, &config);
        let names: Vec<String> = variants.iter().map(|v| v.name()).collect();
        assert_eq!(names, strings(&["UTIL_magick", "UTIL_convert"]));
        assert_eq!(variants[1].files().sources, strings(&["utilities/magick.c"]));
    }

    #[test]
    fn test_discover_platform_excluded_directory() {
        let mut fs = MockFileSystem::new();
        fs.add_file("lib/a.c", "");
        fs.add_file("lib/x86/b.c", "");

        let module = Module::parse(
            "lib",
            "[LIB]\n\n[DIRECTORIES]\nlib\nlib/x86\n\n[EXCLUDES_X64]\nlib/x86\n",
        )
        .unwrap()
        .unwrap();
        let mut config = Configuration::new(Layout::new("."));
        config.platform = Platform::X64;

        let variants = discover_variants(&fs, &module, &config);
        assert_eq!(variants[0].files().sources, strings(&["lib/a.c"]));

        config.platform = Platform::X86;
        let variants = discover_variants(&fs, &module, &config);
        assert_eq!(variants[0].files().sources, strings(&["lib/a.c", "lib/x86/b.c"]));
    }

    #[test]
    fn test_disk_tree_lists_sorted_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src/nested")).unwrap();
        std::fs::write(tmp.path().join("src/b.c"), "").unwrap();
        std::fs::write(tmp.path().join("src/a.c"), "int a;").unwrap();

        let tree = DiskTree::new(tmp.path());
        assert_eq!(tree.list_files("src"), strings(&["a.c", "b.c"]));
        assert!(tree.list_files("missing").is_empty());
        assert!(tree.is_file("src/a.c"));
        assert!(!tree.is_file("src/nested"));
        assert_eq!(tree.read_to_string("src/a.c").as_deref(), Some("int a;"));
        assert!(tree.read_to_string("src/missing.c").is_none());
    }
}

// src/core/loader.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::LoadingConfig;
use crate::error::{CallsliceError, Result};
use super::languages::{GoFrontend, LanguageFrontend, ModuleSymbols, PackageNames, ParsedSource};
use super::manifest::{ModuleManifest, MANIFEST_FILE};
use super::Package;

/// Directory names the Go tool never treats as part of `./...`
const SKIPPED_DIRS: [&str; 2] = ["vendor", "testdata"];

/// Loads every package of a module and resolves it through a language frontend
pub struct PackageLoader {
    config: LoadingConfig,
    frontend: Box<dyn LanguageFrontend>,
    build_ignore: Regex,
}

/// Files of one directory, grouped under their import path
struct PendingPackage {
    name: String,
    files: Vec<ParsedSource>,
}

impl PackageLoader {
    pub fn new(config: &LoadingConfig) -> Result<Self> {
        Self::with_frontend(config, Box::new(GoFrontend::new()?))
    }

    pub fn with_frontend(config: &LoadingConfig, frontend: Box<dyn LanguageFrontend>) -> Result<Self> {
        // `//go:build ignore` and the legacy `// +build ignore`
        let build_ignore = Regex::new(r"(?m)^//\s*(?:go:build|\+build)\s+(?:.*\s)?ignore(?:\s|$)")
            .map_err(|e| CallsliceError::Config(e.to_string()))?;
        Ok(Self {
            config: config.clone(),
            frontend,
            build_ignore,
        })
    }

    /// Load all packages below `module_root`, ordered by import path
    pub fn load(&mut self, module_root: &Path, manifest: &ModuleManifest) -> Result<Vec<Package>> {
        let files = self.discover(module_root)?;
        debug!("Discovered {} {} files", files.len(), self.frontend.language_name());

        let mut pending: BTreeMap<String, PendingPackage> = BTreeMap::new();
        for path in files {
            let Some(parsed) = self.parse_file(&path)? else {
                continue;
            };
            let Some(package_name) = parsed.package_name.clone() else {
                warn!("Skipping {}: no package clause", path.display());
                continue;
            };

            let dir = path.parent().unwrap_or(module_root);
            let mut import_path = import_path_for(module_root, dir, manifest.module_path());
            // External test package living next to the package it tests
            if package_name.ends_with("_test") && path_is_test(&path) {
                import_path.push_str("_test");
            }

            let entry = pending
                .entry(import_path.clone())
                .or_insert_with(|| PendingPackage {
                    name: package_name.clone(),
                    files: Vec::new(),
                });
            if entry.name != package_name {
                return Err(CallsliceError::PackageLoadFailure(format!(
                    "found packages {} and {} in {}",
                    entry.name,
                    package_name,
                    dir.display()
                )));
            }
            entry.files.push(parsed);
        }

        if pending.is_empty() {
            return Err(CallsliceError::PackageLoadFailure(format!(
                "no packages found in {}",
                module_root.display()
            )));
        }

        let names: PackageNames = pending
            .iter()
            .map(|(path, pkg)| (path.clone(), pkg.name.clone()))
            .collect();
        let mut symbols = ModuleSymbols {
            packages: names,
            ..ModuleSymbols::default()
        };
        // Field and variable types may be declared in any file of the module
        for (path, pkg) in &pending {
            for parsed in &pkg.files {
                let declared = self.frontend.declared_types(parsed, path, &symbols.packages);
                symbols.types.merge(declared);
            }
        }

        let packages: Vec<Package> = pending
            .into_iter()
            .map(|(path, pkg)| {
                let units = pkg
                    .files
                    .iter()
                    .map(|parsed| self.frontend.resolve_unit(parsed, &path, &symbols))
                    .collect();
                Package {
                    path,
                    name: pkg.name,
                    units,
                }
            })
            .collect();

        info!(
            "Loaded {} packages, {} functions",
            packages.len(),
            packages.iter().map(Package::function_count).sum::<usize>()
        );
        Ok(packages)
    }

    /// List candidate source files, sorted, honouring the Go tool's skip rules
    fn discover(&self, module_root: &Path) -> Result<Vec<PathBuf>> {
        let mut overrides = OverrideBuilder::new(module_root);
        for pattern in &self.config.ignore_patterns {
            overrides
                .add(&format!("!{}", pattern))
                .map_err(|e| CallsliceError::Config(format!("bad ignore pattern {}: {}", pattern, e)))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| CallsliceError::Config(e.to_string()))?;

        let root = module_root.to_path_buf();
        let walker = WalkBuilder::new(module_root)
            .standard_filters(false)
            .overrides(overrides)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let path = entry.path();
                if path == root || !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                !(name.starts_with('.')
                    || name.starts_with('_')
                    || SKIPPED_DIRS.contains(&name.as_str())
                    || path.join(MANIFEST_FILE).is_file())
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| CallsliceError::PackageLoadFailure(e.to_string()))?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || !self.should_parse_file(path) {
                continue;
            }
            files.push(path.to_path_buf());
        }
        Ok(files)
    }

    fn should_parse_file(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        if !self.frontend.file_extensions().contains(&extension) {
            return false;
        }
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .is_some_and(|n| n.starts_with('.') || n.starts_with('_'));
        !hidden && (self.config.include_tests || !path_is_test(path))
    }

    fn parse_file(&mut self, path: &Path) -> Result<Option<ParsedSource>> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| CallsliceError::PackageLoadFailure(format!("{}: {}", path.display(), e)))?;
        if metadata.len() as usize > self.config.max_file_size {
            warn!("Skipping {}: exceeds maximum size limit", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CallsliceError::PackageLoadFailure(format!("{}: {}", path.display(), e)))?;
        if self.excluded_by_constraint(&content) {
            debug!("Skipping {}: build constraint excludes it", path.display());
            return Ok(None);
        }

        let parsed = self
            .frontend
            .parse(content, path)
            .map_err(|e| CallsliceError::PackageLoadFailure(e.to_string()))?;
        if parsed.has_syntax_errors() {
            warn!("{} has syntax errors; results may be incomplete", path.display());
        }
        Ok(Some(parsed))
    }

    /// Constraint lines only count in the header, before the package clause
    fn excluded_by_constraint(&self, content: &str) -> bool {
        let mut header_end = 0;
        for line in content.split_inclusive('\n') {
            if line.trim_start().starts_with("package ") {
                break;
            }
            header_end += line.len();
        }
        self.build_ignore.is_match(&content[..header_end])
    }
}

fn path_is_test(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("_test.go"))
}

fn import_path_for(module_root: &Path, dir: &Path, module_path: &str) -> String {
    let relative = dir.strip_prefix(module_root).unwrap_or(Path::new(""));
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.is_empty() {
        module_path.to_string()
    } else {
        format!("{}/{}", module_path, segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn manifest() -> ModuleManifest {
        ModuleManifest::from_prefixes(vec!["example.com/m".to_string()])
    }

    fn load(root: &Path, config: &LoadingConfig) -> Result<Vec<Package>> {
        PackageLoader::new(config).unwrap().load(root, &manifest())
    }

    fn paths(packages: &[Package]) -> Vec<&str> {
        packages.iter().map(|p| p.path.as_str()).collect()
    }

    #[test]
    fn packages_follow_directories_in_path_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.go", "package main\n\nfunc main() {}\n");
        write(dir.path(), "util/b.go", "package util\n\nfunc B() {}\n");
        write(dir.path(), "util/a.go", "package util\n\nfunc A() {}\n");
        write(dir.path(), "api/v1/h.go", "package v1\n\nfunc H() {}\n");

        let packages = load(dir.path(), &LoadingConfig::default()).unwrap();
        assert_eq!(
            paths(&packages),
            vec!["example.com/m", "example.com/m/api/v1", "example.com/m/util"]
        );
        let util = &packages[2];
        assert_eq!(util.name, "util");
        assert_eq!(util.units.len(), 2);
        assert!(util.units[0].path.ends_with("a.go"));
    }

    #[test]
    fn go_tool_skip_rules() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.go", "package main\n");
        write(dir.path(), "main_test.go", "package main\n\nfunc TestX() {}\n");
        write(dir.path(), "vendor/x/x.go", "package x\n");
        write(dir.path(), "testdata/t.go", "package t\n");
        write(dir.path(), ".hidden/h.go", "package h\n");
        write(dir.path(), "_old/o.go", "package o\n");
        write(dir.path(), "nested/go.mod", "module example.com/nested\n");
        write(dir.path(), "nested/n.go", "package nested\n");
        write(dir.path(), "gen/tool.go", "//go:build ignore\n\npackage main\n");
        write(dir.path(), "gen/gen.go", "package gen\n");

        let packages = load(dir.path(), &LoadingConfig::default()).unwrap();
        assert_eq!(paths(&packages), vec!["example.com/m", "example.com/m/gen"]);
        assert_eq!(packages[0].units.len(), 1);
        assert_eq!(packages[1].units.len(), 1);
    }

    #[test]
    fn tests_and_external_test_packages_when_enabled() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.go", "package m\n");
        write(dir.path(), "a_test.go", "package m\n\nfunc TestA() {}\n");
        write(dir.path(), "b_test.go", "package m_test\n\nfunc TestB() {}\n");

        let config = LoadingConfig {
            include_tests: true,
            ..LoadingConfig::default()
        };
        let packages = load(dir.path(), &config).unwrap();
        assert_eq!(paths(&packages), vec!["example.com/m", "example.com/m_test"]);
        assert_eq!(packages[0].units.len(), 2);
    }

    #[test]
    fn ignore_patterns_exclude_paths() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.go", "package m\n");
        write(dir.path(), "mocks/mock.go", "package mocks\n");

        let config = LoadingConfig {
            ignore_patterns: vec!["mocks/**".to_string()],
            ..LoadingConfig::default()
        };
        let packages = load(dir.path(), &config).unwrap();
        assert_eq!(paths(&packages), vec!["example.com/m"]);
    }

    #[test]
    fn oversized_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.go", "package m\n");
        write(dir.path(), "big/big.go", &format!("package big\n\n// {}\n", "x".repeat(256)));

        let config = LoadingConfig {
            max_file_size: 64,
            ..LoadingConfig::default()
        };
        let packages = load(dir.path(), &config).unwrap();
        assert_eq!(paths(&packages), vec!["example.com/m"]);
    }

    #[test]
    fn crlf_header_with_multibyte_comment() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "w.go",
            "//a\r\n//b\r\n// é\r\npackage w\r\n\r\nfunc Run() {\r\n}\r\n",
        );
        write(
            dir.path(),
            "skip/gen.go",
            "// généré\r\n//go:build ignore\r\n\r\npackage main\r\n",
        );

        let packages = load(dir.path(), &LoadingConfig::default()).unwrap();
        assert_eq!(paths(&packages), vec!["example.com/m"]);
        assert_eq!(packages[0].function_count(), 1);
    }

    #[test]
    fn empty_module_is_a_load_failure() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "nothing here\n");

        let err = load(dir.path(), &LoadingConfig::default()).unwrap_err();
        assert!(matches!(err, CallsliceError::PackageLoadFailure(_)));
    }

    #[test]
    fn conflicting_package_clauses_fail() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.go", "package one\n");
        write(dir.path(), "b.go", "package two\n");

        let err = load(dir.path(), &LoadingConfig::default()).unwrap_err();
        assert!(matches!(err, CallsliceError::PackageLoadFailure(_)));
    }
}

// src/core/manifest.rs
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CallsliceError, Result};

pub const MANIFEST_FILE: &str = "go.mod";

/// Module membership derived from `go.mod`
///
/// The first prefix is always the module's own path; `require` entries
/// follow in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleManifest {
    prefixes: Vec<String>,
}

impl ModuleManifest {
    /// Read and parse `go.mod` from the module root
    pub fn read(module_root: &Path) -> Result<Self> {
        let path = module_root.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| {
            CallsliceError::ManifestUnreadable {
                path: path.clone(),
                source,
            }
        })?;
        let manifest = Self::parse(&content, &path)?;
        debug!(
            "Module {} with {} membership prefixes",
            manifest.module_path(),
            manifest.prefixes.len()
        );
        Ok(manifest)
    }

    /// Parse manifest text; `origin` is only used for error reporting
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut module = None;
        let mut requires = Vec::new();
        let mut block: Option<String> = None;

        for raw in content.lines() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(directive) = &block {
                if line == ")" {
                    block = None;
                } else if directive == "require" {
                    if let Some(path) = line.split_whitespace().next() {
                        requires.push(unquote(path));
                    }
                }
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(directive) = fields.next() else {
                continue;
            };
            let rest: Vec<&str> = fields.collect();

            if rest.first() == Some(&"(") {
                block = Some(directive.to_string());
                continue;
            }

            match (directive, rest.first()) {
                ("module", Some(path)) => module = Some(unquote(path)),
                ("require", Some(path)) => requires.push(unquote(path)),
                _ => {}
            }
        }

        let module = module.ok_or_else(|| CallsliceError::ManifestInvalid {
            path: PathBuf::from(origin),
            reason: "no module directive".to_string(),
        })?;

        let mut prefixes = vec![module];
        prefixes.extend(requires);
        Ok(Self { prefixes })
    }

    /// Build a manifest directly from prefixes, primary first
    pub fn from_prefixes(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// Import path of the module itself
    pub fn module_path(&self) -> &str {
        self.prefixes.first().map_or("", String::as_str)
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether a package path equals a prefix or lies beneath one
    pub fn is_member(&self, package_path: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            package_path == prefix
                || package_path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Expand a user supplied package selector to a full import path
    ///
    /// Accepts a full import path, a path relative to the module root, or
    /// `.`/empty for the root package.
    pub fn qualify(&self, selector: &str) -> String {
        let selector = selector.trim_start_matches("./").trim_end_matches('/');
        if selector.is_empty() || selector == "." {
            return self.module_path().to_string();
        }
        if self.is_member(selector) {
            return selector.to_string();
        }
        format!("{}/{}", self.module_path(), selector)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn unquote(field: &str) -> String {
    field.trim_matches(|c| c == '"' || c == '`').to_string()
}

//! Language frontends that turn source files into the resolved model
//!
//! A frontend parses a file once and reports its package clause so the loader
//! can group files. It then contributes the package-level types the file
//! declares, and finally resolves the file's declarations and call sites
//! against what the whole module declares.

mod go;

pub use go::GoFrontend;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use super::CompilationUnit;

/// Import path → package clause name for every package loaded from the module
pub type PackageNames = HashMap<String, String>;

/// A named type, identified by its declaring package
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub package: String,
    pub name: String,
}

impl TypeKey {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

/// Statically known types of package-level variables and struct fields
#[derive(Debug, Default, Clone)]
pub struct TypeTable {
    vars: HashMap<(String, String), TypeKey>,
    fields: HashMap<TypeKey, HashMap<String, TypeKey>>,
}

impl TypeTable {
    pub fn declare_var(&mut self, package: &str, name: &str, ty: TypeKey) {
        self.vars.insert((package.to_string(), name.to_string()), ty);
    }

    pub fn declare_field(&mut self, owner: TypeKey, field: &str, ty: TypeKey) {
        self.fields
            .entry(owner)
            .or_default()
            .insert(field.to_string(), ty);
    }

    pub fn var(&self, package: &str, name: &str) -> Option<&TypeKey> {
        self.vars.get(&(package.to_string(), name.to_string()))
    }

    pub fn field(&self, owner: &TypeKey, field: &str) -> Option<&TypeKey> {
        self.fields.get(owner).and_then(|fields| fields.get(field))
    }

    /// Fold another file's declarations into this table
    pub fn merge(&mut self, other: TypeTable) {
        self.vars.extend(other.vars);
        for (owner, fields) in other.fields {
            self.fields.entry(owner).or_default().extend(fields);
        }
    }
}

/// Module-wide facts every unit is resolved against
#[derive(Debug, Default, Clone)]
pub struct ModuleSymbols {
    pub packages: PackageNames,
    pub types: TypeTable,
}

/// A file parsed but not yet resolved
pub struct ParsedSource {
    pub path: PathBuf,
    pub source: String,
    pub tree: tree_sitter::Tree,
    /// Name from the package clause, if the file has one
    pub package_name: Option<String>,
}

impl ParsedSource {
    pub fn has_syntax_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Trait that all language frontends must implement
pub trait LanguageFrontend {
    /// Parse source code of one file
    fn parse(&mut self, content: String, file_path: &Path) -> Result<ParsedSource>;

    /// Package-level variable and struct field types declared by a parsed file
    fn declared_types(
        &self,
        parsed: &ParsedSource,
        package_path: &str,
        packages: &PackageNames,
    ) -> TypeTable;

    /// Resolve declarations and call sites of a parsed file
    fn resolve_unit(
        &self,
        parsed: &ParsedSource,
        package_path: &str,
        symbols: &ModuleSymbols,
    ) -> CompilationUnit;

    /// Get the file extensions this frontend handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}

// src/core/model.rs
//! Resolved semantic model handed from the language frontend to the core.
//!
//! The frontend owns parsing and name resolution; everything downstream only
//! sees packages, compilation units, declarations with line spans, and call
//! sites whose targets are already resolved to a [`SymbolId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Unique identity of a resolved function or method symbol
///
/// Two call expressions denoting the same declaration produce equal ids;
/// equal names in different packages, or on different receivers, never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId {
    /// Import path of the declaring package
    pub package: String,
    /// Receiver base type for methods
    pub receiver: Option<String>,
    /// Declared name
    pub name: String,
    /// Declaration site, only for names a package may declare more than once
    pub site: Option<DeclSite>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclSite {
    pub file: PathBuf,
    pub line: usize,
}

impl SymbolId {
    pub fn function(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            receiver: None,
            name: name.into(),
            site: None,
        }
    }

    pub fn method(
        package: impl Into<String>,
        receiver: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            receiver: Some(receiver.into()),
            name: name.into(),
            site: None,
        }
    }

    /// Pin the id to a declaration site
    pub fn at(mut self, file: PathBuf, line: usize) -> Self {
        self.site = Some(DeclSite { file, line });
        self
    }

    /// Short name as written by a caller: `Name` or `Recv.Name`
    pub fn display_name(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{}", recv, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(recv) => write!(f, "{}.({}).{}", self.package, recv, self.name)?,
            None => write!(f, "{}.{}", self.package, self.name)?,
        }
        if let Some(site) = &self.site {
            write!(f, "@{}:{}", site.file.display(), site.line)?;
        }
        Ok(())
    }
}

/// Inclusive 1-based line range in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A call expression found in a function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Resolved callee, when the frontend could resolve it statically
    pub target: Option<SymbolId>,
    /// Line of the call expression
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionBody {
    /// Calls in source pre-order
    pub calls: Vec<CallSite>,
}

/// One function or method definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub id: SymbolId,
    /// Line ranges of the documentation comments, in source order
    pub doc: Vec<LineSpan>,
    /// Lines of the declaration itself, signature through closing brace
    pub span: LineSpan,
    /// Absent for body-less declarations (implemented elsewhere, e.g. assembly)
    pub body: Option<FunctionBody>,
}

impl FunctionDecl {
    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn receiver(&self) -> Option<&str> {
        self.id.receiver.as_deref()
    }
}

/// One parsed source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Absolute path of the file backing this unit
    pub path: PathBuf,
    pub functions: Vec<FunctionDecl>,
}

/// A group of compilation units sharing one import path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Import path, the package identity
    pub path: String,
    /// Name from the package clause
    pub name: String,
    pub units: Vec<CompilationUnit>,
}

impl Package {
    pub fn function_count(&self) -> usize {
        self.units.iter().map(|u| u.functions.len()).sum()
    }
}

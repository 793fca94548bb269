// src/core/index.rs
use std::collections::HashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CallsliceError, Result};
use super::manifest::ModuleManifest;
use super::{CompilationUnit, FunctionDecl, Package, SymbolId};

/// Where a symbol is declared
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry<'m> {
    pub decl: &'m FunctionDecl,
    pub unit: &'m CompilationUnit,
    pub package: &'m Package,
}

/// Function requested by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySelector {
    /// Import path of the package to search
    pub package: String,
    /// `Name`, or `Recv.Name` for a method
    pub name: String,
}

/// One row of `list` output
#[derive(Debug, Clone, Serialize)]
pub struct FunctionListing {
    pub symbol: String,
    pub package: String,
    pub name: String,
    pub file: String,
    pub line: usize,
    pub has_body: bool,
}

/// Signature identity → declaration, over every in-module package
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Default)]
pub struct SymbolIndex<'m> {
    entries: HashMap<SymbolId, IndexEntry<'m>>,
}

impl<'m> SymbolIndex<'m> {
    /// Index every function of every member package
    pub fn build(packages: &'m [Package], manifest: &ModuleManifest) -> Self {
        let mut entries = HashMap::new();
        for package in packages {
            if !manifest.is_member(&package.path) {
                debug!("Not indexing {}: outside the module", package.path);
                continue;
            }
            for unit in &package.units {
                for decl in &unit.functions {
                    let entry = IndexEntry {
                        decl,
                        unit,
                        package,
                    };
                    if entries.insert(decl.id.clone(), entry).is_some() {
                        warn!("{} declared more than once; keeping the last", decl.id);
                    }
                }
            }
        }

        info!("Indexed {} functions", entries.len());
        Self { entries }
    }

    pub fn get(&self, id: &SymbolId) -> Option<&IndexEntry<'m>> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the identity of the requested entry function
    ///
    /// A plain name prefers a function over methods of that name; among
    /// methods the last one declared wins. `Recv.Name` selects a method.
    pub fn locate_entry(&self, packages: &'m [Package], selector: &EntrySelector) -> Result<SymbolId> {
        let not_found = || CallsliceError::EntryPointNotFound {
            name: selector.name.clone(),
            package: selector.package.clone(),
        };

        let package = packages
            .iter()
            .find(|p| p.path == selector.package)
            .ok_or_else(not_found)?;

        let (receiver, name) = match selector.name.split_once('.') {
            Some((recv, name)) => (Some(recv), name),
            None => (None, selector.name.as_str()),
        };

        let mut function = None;
        let mut method = None;
        for decl in package.units.iter().flat_map(|u| &u.functions) {
            if decl.name() != name || !self.entries.contains_key(&decl.id) {
                continue;
            }
            match (receiver, decl.receiver()) {
                (Some(want), Some(have)) if want == have => function = Some(&decl.id),
                (None, None) => function = Some(&decl.id),
                (None, Some(_)) => method = Some(&decl.id),
                _ => {}
            }
        }

        let found = function.or(method).cloned().ok_or_else(not_found)?;
        debug!("Entry point resolved to {}", found);
        Ok(found)
    }

    /// Every indexed function, ordered by package then position
    pub fn listing(&self) -> Vec<FunctionListing> {
        let mut rows: Vec<FunctionListing> = self
            .entries
            .values()
            .map(|entry| FunctionListing {
                symbol: entry.decl.id.to_string(),
                package: entry.package.path.clone(),
                name: entry.decl.id.display_name(),
                file: entry.unit.path.display().to_string(),
                line: entry.decl.span.start,
                has_body: entry.decl.body.is_some(),
            })
            .collect();
        rows.sort_by(|a, b| {
            (&a.package, &a.file, a.line).cmp(&(&b.package, &b.file, b.line))
        });
        rows
    }
}

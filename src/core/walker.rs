// src/core/walker.rs
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::error::Result;
use super::index::SymbolIndex;
use super::slicer::slice_source;
use super::{Package, SymbolId};

/// Extracted source per package, in first-visited order
#[derive(Debug, Default)]
pub struct Accumulator<'m> {
    order: Vec<&'m Package>,
    sources: HashMap<&'m str, String>,
}

impl<'m> Accumulator<'m> {
    /// Register a package at the end of the order if it is new
    pub fn register(&mut self, package: &'m Package) {
        if !self.sources.contains_key(package.path.as_str()) {
            self.order.push(package);
            self.sources.insert(package.path.as_str(), String::new());
        }
    }

    /// Append one function's text to its package, separated by a newline
    pub fn append(&mut self, package: &'m Package, source: &str) {
        self.register(package);
        if let Some(text) = self.sources.get_mut(package.path.as_str()) {
            text.push('\n');
            text.push_str(source);
        }
    }

    pub fn order(&self) -> &[&'m Package] {
        &self.order
    }

    pub fn source(&self, package: &Package) -> &str {
        self.sources
            .get(package.path.as_str())
            .map_or("", String::as_str)
    }
}

/// Depth-bounded walk of the module-internal call graph
pub struct CallGraphWalker<'i, 'm> {
    index: &'i SymbolIndex<'m>,
    visited: HashSet<SymbolId>,
    accumulator: Accumulator<'m>,
    exclude_root: bool,
}

impl<'i, 'm> CallGraphWalker<'i, 'm> {
    pub fn new(index: &'i SymbolIndex<'m>, exclude_root: bool) -> Self {
        Self {
            index,
            visited: HashSet::new(),
            accumulator: Accumulator::default(),
            exclude_root,
        }
    }

    /// Walk from `entry` with `budget` hops and hand back what was collected
    ///
    /// With `exclude_root` the entry's package still takes the first slot,
    /// but the entry's own text is not appended.
    pub fn walk(mut self, entry: &SymbolId, budget: usize) -> Result<Accumulator<'m>> {
        debug!("Walking from {} with depth {}", entry, budget);
        self.visit(entry, budget, true)?;
        debug!("Visited {} functions", self.visited.len());
        Ok(self.accumulator)
    }

    fn visit(&mut self, id: &SymbolId, remaining: usize, is_entry: bool) -> Result<()> {
        if self.visited.contains(id) {
            return Ok(());
        }
        let Some(entry) = self.index.get(id).copied() else {
            trace!("{} is outside the index", id);
            return Ok(());
        };

        if is_entry && self.exclude_root {
            self.accumulator.register(entry.package);
        } else {
            let source = slice_source(entry.unit, entry.decl)?;
            self.accumulator.append(entry.package, &source);
        }
        self.visited.insert(id.clone());
        trace!("Visited {} with {} hops left", id, remaining);

        if remaining == 0 {
            return Ok(());
        }
        let Some(body) = &entry.decl.body else {
            return Ok(());
        };
        for call in &body.calls {
            if let Some(target) = &call.target {
                self.visit(target, remaining - 1, false)?;
            }
        }
        Ok(())
    }
}

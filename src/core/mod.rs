// src/core/mod.rs
//! Call graph slicing for Go modules
//!
//! ```text
//! go.mod ──> ModuleManifest (membership prefixes)
//!              │
//! *.go ────> PackageLoader ──> GoFrontend (tree-sitter, call resolution)
//!              │
//!              └──> Package / CompilationUnit / FunctionDecl
//!                      │
//!                      ├──> SymbolIndex (SymbolId → declaration)
//!                      ├──> CallGraphWalker (depth-bounded DFS, dedup)
//!                      │       └─ slice_source (verbatim text + docs)
//!                      └──> assemble (package blocks, headers, fences)
//! ```

mod assembler;
mod engine;
mod index;
mod languages;
mod loader;
mod manifest;
mod model;
mod slicer;
mod walker;
mod workdir;

pub use assembler::{assemble, FormatOptions};
pub use engine::{Engine, ExtractRequest};
pub use index::{EntrySelector, FunctionListing, IndexEntry, SymbolIndex};
pub use languages::{
    GoFrontend, LanguageFrontend, ModuleSymbols, PackageNames, ParsedSource, TypeKey, TypeTable,
};
pub use loader::PackageLoader;
pub use manifest::{ModuleManifest, MANIFEST_FILE};
pub use model::{
    CallSite, CompilationUnit, DeclSite, FunctionBody, FunctionDecl, LineSpan, Package, SymbolId,
};
pub use slicer::slice_source;
pub use walker::{Accumulator, CallGraphWalker};
pub use workdir::WorkdirGuard;

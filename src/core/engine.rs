// src/core/engine.rs
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CallsliceError, Result};
use super::assembler::{assemble, FormatOptions};
use super::index::{EntrySelector, FunctionListing, SymbolIndex};
use super::loader::PackageLoader;
use super::manifest::{ModuleManifest, MANIFEST_FILE};
use super::walker::CallGraphWalker;
use super::workdir::WorkdirGuard;
use super::Package;

/// What to extract, with per-run overrides of the configuration
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    /// Module root directory (holding `go.mod`)
    pub module_dir: PathBuf,
    /// `Name` or `Recv.Name`
    pub function: String,
    /// Entry package; the module root package when absent
    pub package: Option<String>,
    pub exclude_root: Option<bool>,
    pub code_only: Option<bool>,
    /// Explicit hop budget, used as given
    pub depth: Option<usize>,
}

/// Loaded and indexed module, valid for one run
struct LoadedModule {
    root: PathBuf,
    manifest: ModuleManifest,
    packages: Vec<Package>,
}

/// Main orchestration engine
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Extract the entry function and its module-internal callees as one document
    pub fn extract(&self, request: &ExtractRequest) -> Result<String> {
        let exclude_root = request
            .exclude_root
            .unwrap_or(self.config.output.exclude_root);
        let code_only = request.code_only.unwrap_or(self.config.output.code_only);
        let budget = request.depth.unwrap_or(if exclude_root {
            self.config.traversal.exclude_root_depth
        } else {
            self.config.traversal.depth
        });

        let module = self.load(&request.module_dir)?;
        let index = SymbolIndex::build(&module.packages, &module.manifest);
        if index.is_empty() {
            warn!("No functions declared in module {}", module.manifest.module_path());
        }
        let selector = self.selector(&module.manifest, request.package.as_deref(), &request.function);
        let entry = index.locate_entry(&module.packages, &selector)?;

        info!(
            "Extracting {} from {} (depth {}, exclude root: {})",
            entry,
            module.root.display(),
            budget,
            exclude_root
        );
        let accumulator = CallGraphWalker::new(&index, exclude_root).walk(&entry, budget)?;

        let options = FormatOptions {
            exclude_root,
            code_only,
            ..FormatOptions::from_config(&self.config.output)
        };
        Ok(assemble(&accumulator, &options))
    }

    /// List indexed functions, optionally restricted to one package
    pub fn list(&self, module_dir: &Path, package: Option<&str>) -> Result<Vec<FunctionListing>> {
        let module = self.load(module_dir)?;
        let index = SymbolIndex::build(&module.packages, &module.manifest);
        let wanted = package.map(|p| module.manifest.qualify(p));

        Ok(index
            .listing()
            .into_iter()
            .filter(|row| wanted.as_ref().map_or(true, |w| &row.package == w))
            .collect())
    }

    fn selector(&self, manifest: &ModuleManifest, package: Option<&str>, function: &str) -> EntrySelector {
        EntrySelector {
            package: package
                .map(|p| manifest.qualify(p))
                .unwrap_or_else(|| manifest.module_path().to_string()),
            name: function.to_string(),
        }
    }

    /// Read the manifest and load every package below the module root
    fn load(&self, module_dir: &Path) -> Result<LoadedModule> {
        let root = module_dir.canonicalize().map_err(|source| {
            CallsliceError::ManifestUnreadable {
                path: module_dir.join(MANIFEST_FILE),
                source,
            }
        })?;

        let guard = if self.config.loading.enter_module_dir {
            Some(WorkdirGuard::enter(&root)?)
        } else {
            None
        };

        let manifest = ModuleManifest::read(&root)?;
        let packages = PackageLoader::new(&self.config.loading)?.load(&root, &manifest)?;
        debug!("Module {} loaded from {}", manifest.module_path(), root.display());

        if let Some(guard) = guard {
            guard.restore()?;
        }

        Ok(LoadedModule {
            root,
            manifest,
            packages,
        })
    }
}

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CallsliceError, Result};

/// File names probed in the module root when no explicit config is given
pub const CONFIG_CANDIDATES: [&str; 2] = ["callslice.toml", ".callslice.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Call graph traversal settings
    pub traversal: TraversalConfig,

    /// Document rendering settings
    pub output: OutputConfig,

    /// Package loading settings
    pub loading: LoadingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Hops followed from the entry point when it is part of the output
    pub depth: usize,

    /// Hops followed when the entry point itself is left out
    pub exclude_root_depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit bare source with comment-style package headers
    pub code_only: bool,

    /// Leave the entry point's own package slot out of the document
    pub exclude_root: bool,

    /// Info string placed after the opening fence (e.g. "go")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fence_info: Option<String>,

    /// Use the full import path instead of the package name in headers
    pub qualified_headers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Load `_test.go` files as well
    pub include_tests: bool,

    /// Gitignore-style globs excluded from loading
    pub ignore_patterns: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,

    /// Change into the module directory while the index is built
    pub enter_module_dir: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            depth: 5,
            exclude_root_depth: 6,
        }
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            include_tests: false,
            ignore_patterns: Vec::new(),
            max_file_size: 1024 * 1024, // 1MB
            enter_module_dir: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| CallsliceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CallsliceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to the module root candidates, then defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>, module_root: &Path) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                for candidate in &CONFIG_CANDIDATES {
                    let candidate = module_root.join(candidate);
                    if candidate.is_file() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.loading.max_file_size == 0 {
            return Err(CallsliceError::Config(
                "loading.max_file_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{Config, CONFIG_CANDIDATES};
use crate::core::{Engine, ExtractRequest};

#[derive(Parser)]
#[command(name = "callslice")]
#[command(about = "Extract a Go function and everything it calls within its module")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a function with the module-internal functions it calls
    Extract {
        /// Function name, or Type.Method for a method
        function: String,

        /// Module root directory (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Package holding the function, relative to the module root or as an import path
        #[arg(short, long)]
        package: Option<String>,

        /// Leave the function itself out of the output
        #[arg(long)]
        exclude_root: bool,

        /// Emit bare code without fences
        #[arg(long)]
        code_only: bool,

        /// Call hops to follow from the function
        #[arg(long)]
        depth: Option<usize>,

        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the functions available as entry points
    List {
        /// Module root directory (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Only list functions of this package
        #[arg(short, long)]
        package: Option<String>,

        /// Print JSON instead of plain lines
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file into the module root
    Init {
        /// Module root directory (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Extract {
                function,
                dir,
                package,
                exclude_root,
                code_only,
                depth,
                output,
            } => {
                let engine = engine_for(self.config.as_deref(), &dir)?;
                let request = ExtractRequest {
                    module_dir: dir,
                    function,
                    package,
                    // Flags only ever switch a mode on; config provides the default
                    exclude_root: exclude_root.then_some(true),
                    code_only: code_only.then_some(true),
                    depth,
                };
                let document = engine.extract(&request)?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, &document)
                            .with_context(|| format!("writing {}", path.display()))?;
                        info!("Wrote {}", path.display());
                    }
                    None => println!("{}", document),
                }
                Ok(())
            }
            Commands::List { dir, package, json } => {
                let engine = engine_for(self.config.as_deref(), &dir)?;
                let rows = engine.list(&dir, package.as_deref())?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                } else {
                    for row in rows {
                        println!("{}\t{}:{}", row.symbol, row.file, row.line);
                    }
                }
                Ok(())
            }
            Commands::Init { dir, force } => {
                let path = dir.join(CONFIG_CANDIDATES[0]);
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                Config::default().save(&path)?;
                info!("Wrote {}", path.display());
                Ok(())
            }
        }
    }
}

fn engine_for(config: Option<&Path>, module_dir: &Path) -> Result<Engine> {
    let config = Config::load_or_default(config, module_dir)?;
    Ok(Engine::new(config))
}

//! Extract a Go function together with every module-internal function it
//! calls, up to a bounded depth, as one readable document.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use crate::config::Config;
pub use crate::core::{Engine, ExtractRequest};
pub use crate::error::{CallsliceError, Result};

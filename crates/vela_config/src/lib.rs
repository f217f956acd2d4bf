//! Options for compilation and simulation, loadable from `vela.toml` text.
//!
//! Every section and field has a default, so an empty document is a valid
//! configuration. Callers that never read a file use
//! [`VelaConfig::default`] directly.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::load_config_from_str;
pub use types::*;

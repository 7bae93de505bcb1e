// src/config/mod.rs

//! Validated run configuration.
//!
//! There is no config file: the CLI invocation is the configuration. This
//! module turns [`CliArgs`](crate::cli::CliArgs) into immutable [`Settings`]
//! (watch targets, command template and [`RunPolicy`]).

pub mod model;
pub mod validate;

pub use model::{RunPolicy, Settings, MAX_VERBOSITY};

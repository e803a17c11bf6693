//! Configuration for the eLVL region tools.
//!
//! Settings persist to disk as a RON file, tolerate missing and unknown
//! fields, and can be overridden from the command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE, CodecConfig, Config, LogConfig, OutputConfig, default_config_dir};
pub use error::ConfigError;

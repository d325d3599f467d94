//! CLI, configuration and the report pipeline
//!
//! This crate provides the `gcalbill` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;

pub use cli::Cli;
pub use config::{ClientConfig, ReportConfig};
pub use error::{ClientError, ClientResult};
pub use pipeline::ReportPipeline;

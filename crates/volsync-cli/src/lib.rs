//! # volsync-cli
//!
//! Command-line entry point for a volsync node.
//!
//! ## Features
//!
//! - **Layered configuration**: flags, environment variables, TOML file
//! - **Signal handling**: SIGINT and SIGTERM stop the node cleanly
//! - **Inspection**: `--print-config` shows the effective configuration

pub mod cli;
pub mod config;

pub use cli::run;

//! CLI subcommands.

pub mod cache;
pub mod common;
pub mod config;
pub mod fetch;
pub mod holdings;
pub mod settings;

//! Application bootstrap and lifecycle management.
//!
//! [`FolioApp`] wires every component from one [`AppConfig`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      FolioApp                         │
//! │                                                       │
//! │  TieredCache ─────────┐                               │
//! │  (memory + disk queue)│                               │
//! │                       ├──► DataOrchestrator            │
//! │  HttpFetcher ─────────┤                               │
//! │  (reqwest)            │                               │
//! │  FileSettingsStore ───┘                               │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use foliocache::app::{AppConfig, FolioApp};
//!
//! let app = FolioApp::start(AppConfig::from_config_file(&config)).await?;
//! let holdings = app.holdings().await;
//! app.shutdown().await;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::FolioApp;
pub use config::AppConfig;
pub use error::AppError;

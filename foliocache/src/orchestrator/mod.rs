//! Cache-first data orchestration.
//!
//! [`DataOrchestrator::resolve`] answers a typed request from the keyed
//! store when it can and otherwise fetches, decodes and populates:
//!
//! ```text
//! has(key)? ──yes──► read(key) ─► decode ─► Done(value)
//!     │                              └─ fails ─► Empty (or fetch, per policy)
//!     no
//!     ▼
//! fetch(descriptor) ─► decode ─► encode ─► write(key) ─► Done(value)
//!     └─ fails ─► Failed(error)
//! ```
//!
//! [`DataOrchestrator::execute`] is the wider entry point that also routes
//! persistent-store commands to the configured settings store.

mod data;
mod types;

pub use data::DataOrchestrator;
pub use types::{
    DataRequest, DecodeFailurePolicy, Execution, OrchestratorError, Resolution, StoreAction,
    StoreCommand, StoreKind,
};

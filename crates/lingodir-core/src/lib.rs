//! # lingodir-core
//!
//! Core types, localization rules, and the directory service for lingodir,
//! a multilingual directory of companies and the tags attached to them.
//!
//! Storage is abstracted behind [`DirectoryStore`]; the PostgreSQL
//! implementation lives in `lingodir-db`, and [`MemoryStore`] backs tests
//! and database-less runs.

pub mod error;
pub mod localize;
pub mod logging;
pub mod memory;
pub mod models;
pub mod service;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use localize::{resolve, sorted_unique};
pub use memory::{MemoryStore, StoreCounts};
pub use models::*;
pub use service::DirectoryService;
pub use traits::{DirectoryStore, DirectoryTx};

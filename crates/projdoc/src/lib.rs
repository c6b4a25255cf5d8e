//! `projdoc` - Per-contributor project documentation records
//!
//! This library stores one documentation record per (project, developer)
//! pair, reconciles client-held copies with stored ones, and compiles the
//! result into single-project or system-wide PDF reports.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod merge;
pub mod record;
pub mod report;
pub mod service;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{DocumentationRecord, Field, PartialRecord, RecordContent, Section};
pub use report::{CompiledReport, ReportCompiler};
pub use service::DocumentationService;
pub use storage::{MemoryStore, NameRegistry, RecordStore, SqliteStore};

//! 数据库结构元数据导出
//!
//! Runs a fixed list of metadata queries against Postgres and writes one JSON
//! file per query plus a `build-metadata.json` manifest.

pub mod descriptors;
pub mod executor;
pub mod manifest;
pub mod report;
pub mod rows;
pub mod runner;
pub mod splitter;

pub use descriptors::{QueryDescriptor, DB_QUERIES};
pub use executor::{PgExecutor, PoolSettings, QueryExecutor};
pub use runner::{run_export, ExportPaths};

//! Export orchestration.
//!
//! Each descriptor is loaded, executed and persisted on its own; a failure is
//! recorded in the manifest and the run moves on. Only setup, manifest and
//! pool errors abort the run.

use std::path::PathBuf;

use common::errors::{AppError, AppResult};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::descriptors::{QueryDescriptor, MANIFEST_FILE};
use crate::executor::QueryExecutor;
use crate::manifest::{BuildMetadata, ManifestBuilder};
use crate::report::render_summary;
use crate::splitter::{has_sql, is_comment, is_multi_statement, split_statements};

const PREVIEW_CHARS: usize = 100;

/// Input and output locations of a run.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub scripts_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl Default for ExportPaths {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("db-setup").join("scripts"),
            out_dir: PathBuf::from("db-setup"),
        }
    }
}

/// Runs descriptors against an executor.
pub struct Exporter<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    paths: &'a ExportPaths,
}

impl<'a, E: QueryExecutor + ?Sized> Exporter<'a, E> {
    pub fn new(executor: &'a E, paths: &'a ExportPaths) -> Self {
        Self { executor, paths }
    }

    /// Runs every descriptor, writes the manifest and returns it.
    pub async fn export(&self, descriptors: &[QueryDescriptor]) -> AppResult<BuildMetadata> {
        tokio::fs::create_dir_all(&self.paths.out_dir).await?;

        let mut manifest = ManifestBuilder::new();
        for descriptor in descriptors {
            info!("📄 {}...", descriptor.description);
            match self.export_one(descriptor).await {
                Ok(records) => {
                    info!(
                        output = descriptor.output_file,
                        records, "💾 Saved {} ({} records)", descriptor.output_file, records
                    );
                    manifest.record_success(descriptor, records);
                }
                Err(e) => {
                    error!(script = descriptor.name, error = %e, "❌ Error executing {}", descriptor.name);
                    manifest.record_failure(descriptor, e.to_string());
                }
            }
        }

        let metadata = manifest.finish();
        let path = self.paths.out_dir.join(MANIFEST_FILE);
        tokio::fs::write(&path, serde_json::to_string_pretty(&metadata)?).await?;
        info!(path = %path.display(), "Manifest written");
        Ok(metadata)
    }

    /// Load, execute and persist one descriptor. Returns the number of rows written.
    async fn export_one(&self, descriptor: &QueryDescriptor) -> AppResult<usize> {
        let sql = self.read_script(descriptor.sql_file).await?;
        let rows = self.execute_script(&sql).await?;

        let path = self.paths.out_dir.join(descriptor.output_file);
        tokio::fs::write(&path, serde_json::to_string_pretty(&rows)?).await?;
        Ok(rows.len())
    }

    async fn read_script(&self, file_name: &str) -> AppResult<String> {
        let path = self.paths.scripts_dir.join(file_name);
        match tokio::fs::read_to_string(&path).await {
            Ok(sql) => Ok(sql),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::SqlFileNotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A multi-statement script runs statement by statement and concatenates
    /// the rows of the statements that succeed. Anything else is a single call.
    async fn execute_script(&self, sql: &str) -> AppResult<Vec<Value>> {
        if !is_multi_statement(sql) {
            return self.executor.fetch_rows(sql).await;
        }

        let mut rows = Vec::new();
        for statement in split_statements(sql) {
            if is_comment(statement) || !has_sql(statement) {
                continue;
            }
            match self.executor.fetch_rows(statement).await {
                Ok(mut batch) => rows.append(&mut batch),
                Err(e) => {
                    warn!(error = %e, "⚠️  Query failed");
                    warn!(statement = %preview(statement), "⚠️  Failed query skipped");
                }
            }
        }
        Ok(rows)
    }
}

/// Runs the export, prints the summary and closes the executor.
///
/// The executor is closed exactly once, whether or not the export succeeded.
pub async fn run_export<E: QueryExecutor + ?Sized>(
    executor: &E,
    paths: &ExportPaths,
    descriptors: &[QueryDescriptor],
) -> AppResult<BuildMetadata> {
    let outcome = Exporter::new(executor, paths).export(descriptors).await;
    if let Ok(metadata) = &outcome {
        println!("{}", render_summary(metadata, &paths.out_dir));
    }
    executor.close().await;
    outcome
}

fn preview(statement: &str) -> String {
    let mut text: String = statement.chars().take(PREVIEW_CHARS).collect();
    if text.len() < statement.len() {
        text.push_str("...");
    }
    text
}

//! Run summary persisted as `build-metadata.json`.

use chrono::{SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::descriptors::QueryDescriptor;

/// Marker identifying how the metadata was collected.
pub const EXPORT_METHOD: &str = "direct_postgres";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// One line of the execution summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub script: String,
    pub output: String,
    pub records: usize,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-descriptor outcome keyed by name in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Name-to-result mapping that serializes in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsMap(Vec<(String, ExecutionResult)>);

impl ResultsMap {
    pub fn get(&self, name: &str) -> Option<&ExecutionResult> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}

impl Serialize for ResultsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, result)| (name, result)))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetadata {
    pub generated_at: String,
    pub method: &'static str,
    pub successful_executions: usize,
    pub failed_executions: usize,
    pub execution_summary: Vec<SummaryEntry>,
    pub results: ResultsMap,
}

impl BuildMetadata {
    pub fn successes(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.execution_summary
            .iter()
            .filter(|s| s.status == Status::Success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.execution_summary
            .iter()
            .filter(|s| s.status != Status::Success)
    }
}

/// Accumulates descriptor outcomes during a run.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    summary: Vec<SummaryEntry>,
    results: ResultsMap,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, descriptor: &QueryDescriptor, records: usize) {
        self.summary.push(SummaryEntry {
            script: descriptor.name.to_string(),
            output: descriptor.output_file.to_string(),
            records,
            status: Status::Success,
            error: None,
        });
        self.results.0.push((
            descriptor.name.to_string(),
            ExecutionResult {
                success: true,
                record_count: Some(records),
                error: None,
            },
        ));
    }

    pub fn record_failure(&mut self, descriptor: &QueryDescriptor, error: String) {
        self.summary.push(SummaryEntry {
            script: descriptor.name.to_string(),
            output: descriptor.output_file.to_string(),
            records: 0,
            status: Status::Error,
            error: Some(error.clone()),
        });
        self.results.0.push((
            descriptor.name.to_string(),
            ExecutionResult {
                success: false,
                record_count: None,
                error: Some(error),
            },
        ));
    }

    pub fn finish(self) -> BuildMetadata {
        let successful_executions = self
            .summary
            .iter()
            .filter(|s| s.status == Status::Success)
            .count();
        BuildMetadata {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            method: EXPORT_METHOD,
            successful_executions,
            failed_executions: self.summary.len() - successful_executions,
            execution_summary: self.summary,
            results: self.results,
        }
    }
}

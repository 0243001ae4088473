//! JSON report sink for one-shot benchmark runs.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::stats::PartitionStat;

#[derive(Debug, Clone, Serialize)]
pub struct PartitionRecord {
    pub partition_index: u64,
    pub row_count: u64,
    pub data_size: u64,
}

/// Everything one benchmark invocation produced, labelled with the variant
/// under test.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRecord {
    pub timestamp: String,
    pub endpoint: String,
    pub table_path: String,
    pub store: String,
    pub profile: String,
    pub row_count: u64,
    pub elapsed_seconds: f64,
    pub total_data_size: u64,
    pub partitions: Vec<PartitionRecord>,
}

impl BenchmarkRecord {
    pub fn partition_records(stats: &[PartitionStat]) -> Vec<PartitionRecord> {
        stats
            .iter()
            .map(|s| PartitionRecord {
                partition_index: s.partition_index,
                row_count: s.row_count,
                data_size: s.data_size,
            })
            .collect()
    }
}

/// Write the record as pretty JSON under `output_dir`, returning the path.
pub fn write_report(record: &BenchmarkRecord, output_dir: &str) -> anyhow::Result<String> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir {}", output_dir))?;

    let stamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");
    let filename = format!("bench-{}-{}.json", stamp, record.store);
    let path = Path::new(output_dir).join(filename);

    let json = serde_json::to_string_pretty(record).context("failed to serialize report")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lands_on_disk() {
        let dir = std::env::temp_dir().join(format!(
            "stratum-bench-report-{}",
            std::process::id()
        ));
        let record = BenchmarkRecord {
            timestamp: "2024-01-01T00:00:00Z".into(),
            endpoint: "grpc://localhost:2136".into(),
            table_path: "/Root/bench/series/time_series_table".into(),
            store: "column".into(),
            profile: "int-string".into(),
            row_count: 100,
            elapsed_seconds: 0.25,
            total_data_size: 4096,
            partitions: vec![PartitionRecord {
                partition_index: 0,
                row_count: 100,
                data_size: 4096,
            }],
        };
        let path = write_report(&record, dir.to_str().unwrap()).unwrap();
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.contains("\"total_data_size\": 4096"));
        let _ = fs::remove_dir_all(&dir);
    }
}

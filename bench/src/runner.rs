//! One-shot batch mode: schema setup, timed ingestion, settle, stats.
//!
//! Unlike the interactive loop, any terminal failure here aborts the run.

use std::thread;
use std::time::Duration;

use stratum_link::{Result, SchemeClient, SessionPool, TableClient};

use crate::client::BenchClient;
use crate::config::Config;
use crate::generator::generate_rows;
use crate::report::BenchmarkRecord;

/// Run the full benchmark sequence once and return the labelled record.
pub fn run_once<S, P, T>(
    client: &BenchClient<S, P, T>,
    config: &Config,
) -> Result<BenchmarkRecord>
where
    S: SchemeClient,
    P: SessionPool,
    T: TableClient,
{
    let schema = config.table_schema()?;
    client.create_table(&schema, config.create_mode())?;

    let desc = client.describe_table(&schema.name)?;
    println!("> describe table: {}", desc.name);
    for column in &desc.columns {
        println!("column, name: {}, type: {}", column.name, column.ty);
    }

    // Generation finishes before the timing window opens.
    let rows = generate_rows(config.rows, &config.key_spec(), &config.value_spec());

    println!("> bulk upsert: {}", schema.name);
    let elapsed_seconds = client.bulk_load(&schema, &rows)?;
    println!("Bulk upsert of {} rows took {:.3}s", rows.len(), elapsed_seconds);

    // Partition statistics lag storage compaction; give them time to land.
    if config.settle_ms > 0 {
        thread::sleep(Duration::from_millis(config.settle_ms));
    }

    let (partitions, total_data_size) = client.partition_stats(&schema.name)?;
    for stat in &partitions {
        println!(
            "part_idx: {}, row_count: {}, data_size: {}",
            stat.partition_index, stat.row_count, stat.data_size
        );
    }
    println!("Total data size is: {}", total_data_size);

    if config.drop_after {
        client.drop_table(&schema.name, true)?;
    }

    Ok(BenchmarkRecord {
        timestamp: chrono::Utc::now().to_rfc3339(),
        endpoint: config.endpoint.clone(),
        table_path: crate::provision::join(client.prefix(), &schema.name),
        store: config.store_label().to_string(),
        profile: config.profile_label().to_string(),
        row_count: config.rows,
        elapsed_seconds,
        total_data_size,
        partitions: BenchmarkRecord::partition_records(&partitions),
    })
}

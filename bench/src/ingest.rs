//! Timed bulk ingestion.
//!
//! The caller materializes the full row set before calling in, so the timing
//! window covers transport and storage cost only, never synthetic-data
//! construction.

use std::time::Instant;

use stratum_link::{BulkColumns, BulkRow, Result, TableClient};
use tracing::info;

use crate::generator::Row;
use crate::schema::TableSchema;

/// Submit `rows` to `table_path` in one bulk operation and return the
/// wall-clock seconds the call took.
pub fn bulk_load<T: TableClient>(
    table_client: &T,
    table_path: &str,
    schema: &TableSchema,
    rows: &[Row],
) -> Result<f64> {
    let mut columns = BulkColumns::new();
    for col in &schema.columns {
        columns = columns.add_column(&col.name, col.ty);
    }
    let bulk_rows: Vec<BulkRow> = rows
        .iter()
        .map(|r| BulkRow(vec![r.key.clone(), r.value.clone()]))
        .collect();

    info!(table = %table_path, rows = bulk_rows.len(), "bulk upsert");
    let start = Instant::now();
    table_client.bulk_upsert(table_path, &bulk_rows, &columns)?;
    let elapsed = start.elapsed().as_secs_f64();
    info!(table = %table_path, elapsed_seconds = elapsed, "bulk upsert done");
    Ok(elapsed)
}

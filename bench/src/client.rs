//! Thin wrapper bundling the three collaborator handles behind convenience
//! helpers, so the runner and the interactive loop talk to one object.

use stratum_link::{Result, SchemeClient, SessionPool, TableClient, TableDescription};

use crate::generator::Row;
use crate::ingest;
use crate::provision;
use crate::schema::{self, CreateMode, TableSchema};
use crate::stats::{self, PartitionStat};

pub struct BenchClient<S, P, T> {
    scheme: S,
    pool: P,
    table: T,
    database: String,
    relative: String,
    prefix: String,
}

impl<S, P, T> BenchClient<S, P, T>
where
    S: SchemeClient,
    P: SessionPool,
    T: TableClient,
{
    pub fn new(scheme: S, pool: P, table: T, database: &str, relative: &str) -> Self {
        Self {
            scheme,
            pool,
            table,
            database: database.trim_end_matches('/').to_string(),
            relative: relative.trim_matches('/').to_string(),
            prefix: provision::join(database, relative),
        }
    }

    /// Absolute namespace prefix the benchmark table lives under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Provision the namespace prefix. Invoked once at startup.
    pub fn ensure_namespace(&self) -> Result<()> {
        provision::ensure_path_exists(&self.scheme, &self.database, &self.relative)
    }

    pub fn create_table(&self, schema: &TableSchema, mode: CreateMode) -> Result<()> {
        schema::create_table(&self.pool, &self.prefix, schema, mode)
    }

    pub fn describe_table(&self, name: &str) -> Result<TableDescription> {
        schema::describe_table(&self.pool, &self.prefix, name)
    }

    pub fn drop_table(&self, name: &str, teardown: bool) -> Result<()> {
        schema::drop_table(&self.pool, &self.prefix, name, teardown)
    }

    /// Bulk-load pre-generated rows, returning elapsed wall-clock seconds.
    pub fn bulk_load(&self, schema: &TableSchema, rows: &[Row]) -> Result<f64> {
        let path = provision::join(&self.prefix, &schema.name);
        ingest::bulk_load(&self.table, &path, schema, rows)
    }

    pub fn partition_stats(&self, name: &str) -> Result<(Vec<PartitionStat>, u64)> {
        stats::collect_partition_stats(&self.pool, &self.prefix, name)
    }
}

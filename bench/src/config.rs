use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use stratum_link::{PrimitiveType, Result, StoreKind};

use crate::generator::{KeySpec, ValueSpec};
use crate::schema::{ColumnSpec, CreateMode, TableSchema};

/// Key/payload shape of the benchmark table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Uint64 key, fixed-length Utf8 payload.
    IntString,
    /// Date key, Int8 payload.
    DateInt8,
}

/// Storage-encoding variant under test. Labels the output records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Store {
    Row,
    Column,
}

/// CLI configuration for the benchmark harness.
#[derive(Parser, Debug, Clone)]
#[command(name = "stratum-bench", about = "Column-store time-series ingestion & storage benchmark")]
pub struct Config {
    /// Database endpoint address
    #[arg(long, default_value = "grpc://localhost:2136", env = "STRATUM_ENDPOINT")]
    pub endpoint: String,

    /// Pre-existing database root (absolute)
    #[arg(long, default_value = "/Root", env = "STRATUM_DATABASE")]
    pub database: String,

    /// Namespace prefix under the database root; missing directories are
    /// provisioned at startup
    #[arg(long, default_value = "bench/series", env = "STRATUM_PATH")]
    pub path: String,

    /// Connection establishment timeout, seconds
    #[arg(long, default_value_t = 5)]
    pub connect_timeout_secs: u64,

    /// Benchmark table name
    #[arg(long, default_value = "time_series_table")]
    pub table_name: String,

    /// Primary-key column name
    #[arg(long, default_value = "time")]
    pub key_column: String,

    /// Payload column name
    #[arg(long, default_value = "data")]
    pub value_column: String,

    /// Rows per bulk upsert
    #[arg(long, default_value_t = 1000)]
    pub rows: u64,

    /// Payload string length (int-string profile)
    #[arg(long, default_value_t = 1000)]
    pub payload_size: usize,

    /// Character the payload string repeats (int-string profile)
    #[arg(long, default_value_t = '*')]
    pub payload_char: char,

    /// Key/payload profile
    #[arg(long, value_enum, default_value = "int-string")]
    pub profile: Profile,

    /// Storage-encoding variant tag
    #[arg(long, value_enum, default_value = "column")]
    pub store: Store,

    /// Days between consecutive date keys; 0 seeds every row with the same
    /// date (date-int8 profile)
    #[arg(long, default_value_t = 1)]
    pub date_step_days: u64,

    /// Fail instead of no-op when the table already exists
    #[arg(long, default_value_t = false)]
    pub fresh: bool,

    /// Settle delay between bulk load and the stats query, milliseconds.
    /// Partition statistics lag asynchronous compaction, so querying too
    /// early observes a stale total.
    #[arg(long, default_value_t = 2000)]
    pub settle_ms: u64,

    /// Drop into the interactive command loop instead of the one-shot run
    #[arg(long, default_value_t = false)]
    pub interactive: bool,

    /// Drop the table after a one-shot run
    #[arg(long, default_value_t = false)]
    pub drop_after: bool,

    /// Output directory for benchmark reports
    #[arg(long, default_value = "results")]
    pub output_dir: String,
}

/// First date key of the date-int8 profile.
const DATE_START: (i32, u32, u32) = (2019, 1, 1);

impl Config {
    pub fn create_mode(&self) -> CreateMode {
        if self.fresh {
            CreateMode::Strict
        } else {
            CreateMode::IfNotExists
        }
    }

    pub fn store_kind(&self) -> StoreKind {
        match self.store {
            Store::Row => StoreKind::Row,
            Store::Column => StoreKind::Column,
        }
    }

    pub fn table_schema(&self) -> Result<TableSchema> {
        let (key_ty, value_ty) = match self.profile {
            Profile::IntString => (PrimitiveType::Uint64, PrimitiveType::Utf8),
            Profile::DateInt8 => (PrimitiveType::Date, PrimitiveType::Int8),
        };
        TableSchema::new(
            &self.table_name,
            vec![
                ColumnSpec { name: self.key_column.clone(), ty: key_ty, nullable: false },
                ColumnSpec { name: self.value_column.clone(), ty: value_ty, nullable: true },
            ],
            &self.key_column,
            self.store_kind(),
        )
    }

    pub fn key_spec(&self) -> KeySpec {
        match self.profile {
            Profile::IntString => KeySpec::SerialUint64,
            Profile::DateInt8 => {
                let (y, m, d) = DATE_START;
                // In-range constants; construction cannot fail.
                let start = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
                KeySpec::Date { start, step_days: self.date_step_days }
            }
        }
    }

    pub fn value_spec(&self) -> ValueSpec {
        match self.profile {
            Profile::IntString => {
                ValueSpec::RepeatedUtf8 { ch: self.payload_char, len: self.payload_size }
            }
            Profile::DateInt8 => ValueSpec::ConstInt8(1),
        }
    }

    pub fn profile_label(&self) -> &'static str {
        match self.profile {
            Profile::IntString => "int-string",
            Profile::DateInt8 => "date-int8",
        }
    }

    pub fn store_label(&self) -> &'static str {
        match self.store {
            Store::Row => "row",
            Store::Column => "column",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &[&str]) -> Config {
        let mut args = vec!["stratum-bench"];
        args.extend_from_slice(extra);
        Config::parse_from(args)
    }

    #[test]
    fn defaults_mirror_the_reference_run() {
        let cfg = config(&[]);
        assert_eq!(cfg.endpoint, "grpc://localhost:2136");
        assert_eq!(cfg.database, "/Root");
        assert_eq!(cfg.rows, 1000);
        assert_eq!(cfg.payload_size, 1000);
        assert_eq!(cfg.create_mode(), CreateMode::IfNotExists);
        assert_eq!(cfg.store_kind(), StoreKind::Column);
    }

    #[test]
    fn date_profile_builds_temporal_schema() {
        let cfg = config(&["--profile", "date-int8", "--store", "row", "--fresh"]);
        let schema = cfg.table_schema().unwrap();
        assert_eq!(schema.columns[0].ty, PrimitiveType::Date);
        assert_eq!(schema.columns[1].ty, PrimitiveType::Int8);
        assert_eq!(schema.store, StoreKind::Row);
        assert_eq!(cfg.create_mode(), CreateMode::Strict);
        assert!(matches!(cfg.key_spec(), KeySpec::Date { step_days: 1, .. }));
        assert_eq!(cfg.value_spec(), ValueSpec::ConstInt8(1));
    }
}

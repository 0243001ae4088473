//! Partition-statistics aggregation.
//!
//! Each call is self-contained: the data-size fold happens into a local
//! total that is returned to the caller. A benchmark total spanning several
//! calls is the caller's accumulator to thread, never ambient state here.

use stratum_link::{LinkError, Result, Session, SessionPool, Value};
use tracing::debug;

use crate::provision::join;

/// Backend-reported statistics for one partition of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionStat {
    pub partition_index: u64,
    pub row_count: u64,
    pub data_size: u64,
}

/// Query the internal statistics surface for the table's fully-qualified
/// path and fold `data_size` across the returned partitions.
pub fn collect_partition_stats<P: SessionPool>(
    pool: &P,
    prefix: &str,
    table: &str,
) -> Result<(Vec<PartitionStat>, u64)> {
    let path = join(prefix, table);
    let query = format!(
        "PRAGMA TablePathPrefix(\"{}\");\n\
         SELECT PartIdx, RowCount, DataSize\n\
         FROM `.sys/partition_stats`\n\
         WHERE Path = \"{}\"",
        prefix, path
    );

    let result = pool.retry_operation_sync(|session| session.execute_query(&query))?;

    let mut partitions = Vec::with_capacity(result.rows.len());
    let mut total_data_size = 0u64;
    for row in &result.rows {
        let stat = parse_stat_row(row)?;
        debug!(
            partition = stat.partition_index,
            rows = stat.row_count,
            bytes = stat.data_size,
            %path,
            "partition stats"
        );
        total_data_size += stat.data_size;
        partitions.push(stat);
    }
    Ok((partitions, total_data_size))
}

fn parse_stat_row(row: &[Value]) -> Result<PartitionStat> {
    let field = |i: usize| -> Result<u64> {
        row.get(i).and_then(Value::as_u64).ok_or_else(|| {
            LinkError::BadRequest(format!("malformed partition_stats row: {:?}", row))
        })
    };
    Ok(PartitionStat {
        partition_index: field(0)?,
        row_count: field(1)?,
        data_size: field(2)?,
    })
}

#[cfg(test)]
mod tests {
    use stratum_link::{ResultSet, TableDescription};

    use super::*;

    /// Pool double that replays a fixed statistics result set.
    struct ScriptedPool {
        rows: Vec<Vec<Value>>,
    }

    struct ScriptedSession {
        rows: Vec<Vec<Value>>,
    }

    impl Session for ScriptedSession {
        fn execute_scheme(&mut self, _ddl: &str) -> stratum_link::Result<()> {
            unreachable!("stats never executes scheme statements")
        }
        fn execute_query(&mut self, query: &str) -> stratum_link::Result<ResultSet> {
            assert!(query.contains("`.sys/partition_stats`"));
            assert!(query.contains("Path = \"/Root/bench/series\""));
            Ok(ResultSet { rows: self.rows.clone() })
        }
        fn describe_table(&mut self, _path: &str) -> stratum_link::Result<TableDescription> {
            unreachable!("stats never describes tables")
        }
    }

    impl SessionPool for ScriptedPool {
        type Session = ScriptedSession;
        fn retry_operation_sync<T, F>(&self, mut op: F) -> stratum_link::Result<T>
        where
            F: FnMut(&mut Self::Session) -> stratum_link::Result<T>,
        {
            op(&mut ScriptedSession { rows: self.rows.clone() })
        }
    }

    fn stat_row(idx: u64, rows: u64, size: u64) -> Vec<Value> {
        vec![Value::Uint64(idx), Value::Uint64(rows), Value::Uint64(size)]
    }

    #[test]
    fn totals_sum_across_partitions() {
        let pool = ScriptedPool {
            rows: vec![stat_row(0, 4, 10), stat_row(1, 3, 20), stat_row(2, 1, 5)],
        };
        let (stats, total) = collect_partition_stats(&pool, "/Root/bench", "series").unwrap();
        assert_eq!(total, 35);
        assert_eq!(stats.len(), 3);
        assert_eq!(
            stats[1],
            PartitionStat { partition_index: 1, row_count: 3, data_size: 20 }
        );
    }

    #[test]
    fn empty_result_set_totals_zero() {
        let pool = ScriptedPool { rows: vec![] };
        let (stats, total) = collect_partition_stats(&pool, "/Root/bench", "series").unwrap();
        assert!(stats.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn malformed_row_is_rejected() {
        let pool = ScriptedPool { rows: vec![vec![Value::Utf8("junk".into())]] };
        let err = collect_partition_stats(&pool, "/Root/bench", "series").unwrap_err();
        assert!(matches!(err, LinkError::BadRequest(_)));
    }
}

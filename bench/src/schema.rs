//! Table schema declaration and the scheme operations built on it.

use std::fmt::Write as _;

use stratum_link::{
    LinkError, PrimitiveType, Result, Session, SessionPool, StoreKind, TableDescription,
};
use tracing::info;

/// Creation mode: re-runnable setup versus a guard against dirty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// `CREATE TABLE IF NOT EXISTS` — a no-op when the table is present.
    IfNotExists,
    /// Plain `CREATE TABLE` — fails with `AlreadyExists` on a dirty
    /// environment.
    Strict,
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: PrimitiveType,
    pub nullable: bool,
}

/// Declared shape of the benchmark table. Validated on construction: the
/// primary key names exactly one declared column.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub primary_key: String,
    pub store: StoreKind,
}

impl TableSchema {
    pub fn new(
        name: &str,
        columns: Vec<ColumnSpec>,
        primary_key: &str,
        store: StoreKind,
    ) -> Result<Self> {
        let matches = columns.iter().filter(|c| c.name == primary_key).count();
        if matches != 1 {
            return Err(LinkError::BadRequest(format!(
                "primary key {} must name exactly one declared column, found {}",
                primary_key, matches
            )));
        }
        Ok(Self {
            name: name.to_string(),
            columns,
            primary_key: primary_key.to_string(),
            store,
        })
    }

    /// Render the DDL for this table, addressed at `prefix` via the
    /// table-path-prefix pragma.
    pub fn ddl(&self, prefix: &str, mode: CreateMode) -> String {
        let clause = match mode {
            CreateMode::IfNotExists => "IF NOT EXISTS ",
            CreateMode::Strict => "",
        };
        let mut ddl = format!(
            "PRAGMA TablePathPrefix(\"{}\");\nCREATE TABLE {}`{}` (\n",
            prefix, clause, self.name
        );
        for col in &self.columns {
            let null = if col.nullable { "" } else { " NOT NULL" };
            let _ = writeln!(ddl, "    `{}` {}{},", col.name, col.ty, null);
        }
        let _ = write!(ddl, "    PRIMARY KEY (`{}`)\n)", self.primary_key);
        if self.store == StoreKind::Column {
            ddl.push_str(" WITH (STORE = COLUMN)");
        }
        ddl
    }
}

/// Create the table under `prefix` according to `mode`.
pub fn create_table<P: SessionPool>(
    pool: &P,
    prefix: &str,
    schema: &TableSchema,
    mode: CreateMode,
) -> Result<()> {
    let ddl = schema.ddl(prefix, mode);
    info!(table = %schema.name, %prefix, ?mode, "creating table");
    pool.retry_operation_sync(|session| session.execute_scheme(&ddl))
}

/// Fetch the table description: columns in declaration order with resolved
/// types, for verification logging.
pub fn describe_table<P: SessionPool>(
    pool: &P,
    prefix: &str,
    name: &str,
) -> Result<TableDescription> {
    let path = crate::provision::join(prefix, name);
    pool.retry_operation_sync(|session| session.describe_table(&path))
}

/// Drop the table. In teardown mode a missing table is tolerated; otherwise
/// it is a reportable error.
pub fn drop_table<P: SessionPool>(
    pool: &P,
    prefix: &str,
    name: &str,
    teardown: bool,
) -> Result<()> {
    let ddl = format!(
        "PRAGMA TablePathPrefix(\"{}\");\nDROP TABLE `{}`",
        prefix, name
    );
    info!(table = %name, %prefix, teardown, "dropping table");
    match pool.retry_operation_sync(|session| session.execute_scheme(&ddl)) {
        Err(LinkError::TableNotFound(_)) if teardown => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_schema(store: StoreKind) -> TableSchema {
        TableSchema::new(
            "time_series_table",
            vec![
                ColumnSpec { name: "time".into(), ty: PrimitiveType::Uint64, nullable: false },
                ColumnSpec { name: "data".into(), ty: PrimitiveType::Utf8, nullable: true },
            ],
            "time",
            store,
        )
        .unwrap()
    }

    #[test]
    fn ddl_embeds_prefix_columns_and_store() {
        let ddl = series_schema(StoreKind::Column).ddl("/Root/bench", CreateMode::IfNotExists);
        assert!(ddl.starts_with("PRAGMA TablePathPrefix(\"/Root/bench\");"));
        assert!(ddl.contains("CREATE TABLE IF NOT EXISTS `time_series_table`"));
        assert!(ddl.contains("`time` Uint64 NOT NULL,"));
        assert!(ddl.contains("`data` Utf8,"));
        assert!(ddl.contains("PRIMARY KEY (`time`)"));
        assert!(ddl.ends_with("WITH (STORE = COLUMN)"));
    }

    #[test]
    fn strict_ddl_omits_if_not_exists() {
        let ddl = series_schema(StoreKind::Row).ddl("/Root/bench", CreateMode::Strict);
        assert!(ddl.contains("CREATE TABLE `time_series_table`"));
        assert!(!ddl.contains("IF NOT EXISTS"));
        assert!(!ddl.contains("STORE = COLUMN"));
    }

    #[test]
    fn primary_key_must_name_a_declared_column() {
        let err = TableSchema::new(
            "t",
            vec![ColumnSpec { name: "a".into(), ty: PrimitiveType::Uint64, nullable: false }],
            "missing",
            StoreKind::Row,
        )
        .unwrap_err();
        assert!(matches!(err, LinkError::BadRequest(_)));
    }
}

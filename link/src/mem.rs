//! In-process backend implementing the full client surface.
//!
//! Backs the harness binary and the test suite: a directory tree for scheme
//! probes, a minimal scheme-DDL executor, keyed bulk upserts and the
//! `.sys/partition_stats` statistics query. Rows are spread across simulated
//! partitions (2 500 rows each); per-row size is the wire size of its values,
//! with non-key columns of column-store tables shrunk 4x to model columnar
//! compression. All of it is deterministic.
//!
//! Transient faults can be injected with
//! [`MemDriver::inject_transient_failures`] to exercise the retry executor.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use crate::error::{LinkError, Result};
use crate::scheme::{EntryKind, SchemeClient, SchemeEntry};
use crate::session::{
    ColumnMeta, ResultSet, Session, SessionPool, StoreKind, TableDescription,
};
use crate::table::{BulkColumns, BulkRow, TableClient};
use crate::types::{PrimitiveType, Value};

const ROWS_PER_PARTITION: u64 = 2_500;
const MAX_RETRIES: u32 = 5;
const RETRY_BACKOFF: Duration = Duration::from_millis(5);

#[derive(Debug)]
struct MemTable {
    description: TableDescription,
    rows: BTreeMap<Value, BulkRow>,
}

#[derive(Debug, Default)]
struct State {
    dirs: BTreeSet<String>,
    tables: BTreeMap<String, MemTable>,
    fail_next: u32,
}

impl State {
    /// Consume one injected fault, if any.
    fn take_fault(&mut self) -> Result<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(LinkError::Transient("injected backend pressure".into()));
        }
        Ok(())
    }
}

/// Entry point to the in-process backend. Hands out scheme, session-pool and
/// table-client handles that share one state.
#[derive(Clone, Debug)]
pub struct MemDriver {
    state: Arc<Mutex<State>>,
    endpoint: String,
    database: String,
}

impl MemDriver {
    /// Validate the endpoint and database root, seed the root directory
    /// chain, and return a connected driver.
    pub fn connect(endpoint: &str, database: &str, timeout: Duration) -> Result<Self> {
        if !(endpoint.starts_with("grpc://") || endpoint.starts_with("grpcs://")) {
            return Err(LinkError::Connectivity {
                endpoint: endpoint.to_string(),
                reason: "unsupported endpoint scheme".into(),
            });
        }
        if timeout.is_zero() {
            return Err(LinkError::Connectivity {
                endpoint: endpoint.to_string(),
                reason: "connection timeout elapsed".into(),
            });
        }
        let database = normalize(database);
        if !database.starts_with('/') || database == "/" {
            return Err(LinkError::Connectivity {
                endpoint: endpoint.to_string(),
                reason: format!("invalid database path: {:?}", database),
            });
        }

        let mut state = State::default();
        // The database root and its ancestors pre-exist on the server side.
        let mut prefix = String::new();
        for part in database.trim_start_matches('/').split('/') {
            prefix.push('/');
            prefix.push_str(part);
            state.dirs.insert(prefix.clone());
        }
        debug!(endpoint, %database, "mem backend connected");

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            endpoint: endpoint.to_string(),
            database,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn scheme_client(&self) -> MemSchemeClient {
        MemSchemeClient { state: self.state.clone() }
    }

    pub fn session_pool(&self) -> MemSessionPool {
        MemSessionPool { state: self.state.clone() }
    }

    pub fn table_client(&self) -> MemTableClient {
        MemTableClient { state: self.state.clone() }
    }

    /// Make the next `n` session/bulk operations fail with a transient error
    /// before succeeding.
    pub fn inject_transient_failures(&self, n: u32) {
        self.state.lock().unwrap().fail_next = n;
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parent_of(path: &str) -> Option<&str> {
    let idx = path.rfind('/')?;
    if idx == 0 {
        None
    } else {
        Some(&path[..idx])
    }
}

// ---------------------------------------------------------------------------
// Scheme client

#[derive(Clone)]
pub struct MemSchemeClient {
    state: Arc<Mutex<State>>,
}

impl SchemeClient for MemSchemeClient {
    fn describe_path(&self, path: &str) -> Result<SchemeEntry> {
        let path = normalize(path);
        let state = self.state.lock().unwrap();
        if state.dirs.contains(&path) {
            return Ok(SchemeEntry { path, kind: EntryKind::Directory });
        }
        if state.tables.contains_key(&path) {
            return Ok(SchemeEntry { path, kind: EntryKind::Table });
        }
        Err(LinkError::SchemeNotFound(path))
    }

    fn make_directory(&self, path: &str) -> Result<()> {
        let path = normalize(path);
        let mut state = self.state.lock().unwrap();
        if let Some(parent) = parent_of(&path) {
            if !state.dirs.contains(parent) {
                return Err(LinkError::BadRequest(format!(
                    "cannot create {}: parent directory {} is absent",
                    path, parent
                )));
            }
        }
        debug!(%path, "make directory");
        state.dirs.insert(path);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session pool

pub struct MemSession {
    state: Arc<Mutex<State>>,
}

#[derive(Clone)]
pub struct MemSessionPool {
    state: Arc<Mutex<State>>,
}

impl SessionPool for MemSessionPool {
    type Session = MemSession;

    fn retry_operation_sync<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(&mut Self::Session) -> Result<T>,
    {
        let mut session = MemSession { state: self.state.clone() };
        let mut last = String::new();
        for attempt in 0..MAX_RETRIES {
            match op(&mut session) {
                Ok(v) => return Ok(v),
                Err(LinkError::Transient(msg)) => {
                    debug!(attempt, %msg, "retrying transient backend error");
                    last = msg;
                    std::thread::sleep(RETRY_BACKOFF * (attempt + 1));
                }
                Err(e) => return Err(e),
            }
        }
        Err(LinkError::RetriesExhausted { attempts: MAX_RETRIES, last })
    }
}

impl Session for MemSession {
    fn execute_scheme(&mut self, ddl: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.take_fault()?;
        let mut prefix = String::new();
        for stmt in ddl.split(';') {
            let stmt = canonicalize(stmt);
            if stmt.is_empty() {
                continue;
            }
            if let Some(rest) = stmt.strip_prefix("PRAGMA TablePathPrefix(") {
                let inner = rest.trim_end_matches(')').trim().trim_matches('"');
                prefix = normalize(inner);
            } else if stmt.starts_with("CREATE TABLE") {
                execute_create(&mut state, &prefix, &stmt)?;
            } else if stmt.starts_with("DROP TABLE") {
                execute_drop(&mut state, &prefix, &stmt)?;
            } else {
                return Err(LinkError::BadRequest(format!(
                    "unsupported scheme statement: {}",
                    stmt
                )));
            }
        }
        Ok(())
    }

    fn execute_query(&mut self, query: &str) -> Result<ResultSet> {
        let mut state = self.state.lock().unwrap();
        state.take_fault()?;
        let canonical = canonicalize(query);
        if !canonical.contains("FROM `.sys/partition_stats`") {
            return Err(LinkError::BadRequest(
                "only .sys/partition_stats queries are supported".into(),
            ));
        }
        let path = extract_quoted(&canonical, "Path =").ok_or_else(|| {
            LinkError::BadRequest("partition_stats query without a Path filter".into())
        })?;
        let path = normalize(&path);

        // A filter that matches no table yields an empty result set, the same
        // as the real statistics surface.
        let mut result = ResultSet::default();
        if let Some(table) = state.tables.get(&path) {
            for (idx, rows, size) in partition_stats(table) {
                result.rows.push(vec![
                    Value::Uint64(idx),
                    Value::Uint64(rows),
                    Value::Uint64(size),
                ]);
            }
        }
        Ok(result)
    }

    fn describe_table(&mut self, path: &str) -> Result<TableDescription> {
        let mut state = self.state.lock().unwrap();
        state.take_fault()?;
        let path = normalize(path);
        state
            .tables
            .get(&path)
            .map(|t| t.description.clone())
            .ok_or(LinkError::TableNotFound(path))
    }
}

// ---------------------------------------------------------------------------
// Table client

#[derive(Clone)]
pub struct MemTableClient {
    state: Arc<Mutex<State>>,
}

impl TableClient for MemTableClient {
    fn bulk_upsert(
        &self,
        table_path: &str,
        rows: &[BulkRow],
        columns: &BulkColumns,
    ) -> Result<()> {
        // The bulk path carries its own retry policy, like the session pool.
        let mut last = String::new();
        for attempt in 0..MAX_RETRIES {
            match self.try_bulk_upsert(table_path, rows, columns) {
                Ok(()) => return Ok(()),
                Err(LinkError::Transient(msg)) => {
                    debug!(attempt, %msg, "retrying transient bulk upsert error");
                    last = msg;
                    std::thread::sleep(RETRY_BACKOFF * (attempt + 1));
                }
                Err(e) => return Err(e),
            }
        }
        Err(LinkError::RetriesExhausted { attempts: MAX_RETRIES, last })
    }
}

impl MemTableClient {
    fn try_bulk_upsert(
        &self,
        table_path: &str,
        rows: &[BulkRow],
        columns: &BulkColumns,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.take_fault()?;
        let path = normalize(table_path);
        let table = state
            .tables
            .get_mut(&path)
            .ok_or_else(|| LinkError::TableNotFound(path.clone()))?;

        if columns.is_empty() {
            return Err(LinkError::BadRequest("bulk upsert without columns".into()));
        }
        for (name, ty) in columns.columns() {
            let declared = table
                .description
                .columns
                .iter()
                .find(|c| &c.name == name)
                .ok_or_else(|| {
                    LinkError::BadRequest(format!("unknown column in bulk upsert: {}", name))
                })?;
            if declared.ty != *ty {
                return Err(LinkError::BadRequest(format!(
                    "column {} declared as {} but upserted as {}",
                    name, declared.ty, ty
                )));
            }
        }
        let key_pos = columns
            .columns()
            .iter()
            .position(|(name, _)| *name == table.description.primary_key)
            .ok_or_else(|| {
                LinkError::BadRequest(format!(
                    "bulk upsert must include the primary key column {}",
                    table.description.primary_key
                ))
            })?;

        for row in rows {
            if row.0.len() != columns.len() {
                return Err(LinkError::BadRequest(format!(
                    "row has {} values for {} columns",
                    row.0.len(),
                    columns.len()
                )));
            }
            table.rows.insert(row.0[key_pos].clone(), row.clone());
        }
        debug!(%path, rows = rows.len(), "bulk upsert applied");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scheme-DDL executor

/// Collapse a statement to single-space separation for keyword matching.
fn canonicalize(stmt: &str) -> String {
    stmt.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn execute_create(state: &mut State, prefix: &str, stmt: &str) -> Result<()> {
    let mut rest = stmt.strip_prefix("CREATE TABLE").unwrap_or(stmt).trim_start();
    let if_not_exists = if let Some(r) = rest.strip_prefix("IF NOT EXISTS") {
        rest = r.trim_start();
        true
    } else {
        false
    };

    let (name, rest) = take_backticked(rest)
        .ok_or_else(|| LinkError::BadRequest(format!("unparsable table name in: {}", stmt)))?;
    let (body, tail) = take_parenthesized(rest)
        .ok_or_else(|| LinkError::BadRequest(format!("unparsable column list in: {}", stmt)))?;
    let store = if tail.contains("STORE = COLUMN") {
        StoreKind::Column
    } else {
        StoreKind::Row
    };

    let mut columns = Vec::new();
    let mut primary_key: Option<String> = None;
    for item in split_top_level(body) {
        let item = item.trim();
        if let Some(pk) = item.strip_prefix("PRIMARY KEY") {
            let inner = pk.trim().trim_start_matches('(').trim_end_matches(')');
            let (col, _) = take_backticked(inner.trim()).ok_or_else(|| {
                LinkError::BadRequest(format!("unparsable primary key in: {}", stmt))
            })?;
            if primary_key.replace(col).is_some() {
                return Err(LinkError::BadRequest("multiple PRIMARY KEY clauses".into()));
            }
        } else {
            columns.push(parse_column(item)?);
        }
    }

    let primary_key = primary_key
        .ok_or_else(|| LinkError::BadRequest("CREATE TABLE without PRIMARY KEY".into()))?;
    if !columns.iter().any(|c: &ColumnMeta| c.name == primary_key) {
        return Err(LinkError::BadRequest(format!(
            "primary key {} is not a declared column",
            primary_key
        )));
    }

    if prefix.is_empty() {
        return Err(LinkError::BadRequest(
            "CREATE TABLE without a TablePathPrefix pragma".into(),
        ));
    }
    if !state.dirs.contains(prefix) {
        return Err(LinkError::SchemeNotFound(prefix.to_string()));
    }

    let path = format!("{}/{}", prefix, name);
    if state.tables.contains_key(&path) {
        if if_not_exists {
            return Ok(());
        }
        return Err(LinkError::AlreadyExists(path));
    }

    debug!(%path, ?store, "create table");
    state.tables.insert(
        path,
        MemTable {
            description: TableDescription { name, columns, primary_key, store },
            rows: BTreeMap::new(),
        },
    );
    Ok(())
}

fn execute_drop(state: &mut State, prefix: &str, stmt: &str) -> Result<()> {
    let rest = stmt.strip_prefix("DROP TABLE").unwrap_or(stmt).trim_start();
    let (name, _) = take_backticked(rest)
        .ok_or_else(|| LinkError::BadRequest(format!("unparsable table name in: {}", stmt)))?;
    if prefix.is_empty() {
        return Err(LinkError::BadRequest(
            "DROP TABLE without a TablePathPrefix pragma".into(),
        ));
    }
    let path = format!("{}/{}", prefix, name);
    if state.tables.remove(&path).is_none() {
        return Err(LinkError::TableNotFound(path));
    }
    debug!(%path, "drop table");
    Ok(())
}

fn parse_column(item: &str) -> Result<ColumnMeta> {
    let (name, rest) = take_backticked(item)
        .ok_or_else(|| LinkError::BadRequest(format!("unparsable column: {}", item)))?;
    let rest = rest.trim();
    let mut parts = rest.splitn(2, ' ');
    let ty_name = parts.next().unwrap_or("");
    let ty = PrimitiveType::parse(ty_name)
        .ok_or_else(|| LinkError::BadRequest(format!("unknown column type: {}", ty_name)))?;
    let nullable = !rest.ends_with("NOT NULL");
    Ok(ColumnMeta { name, ty, nullable })
}

/// Read a backtick-quoted identifier, returning it and the remaining input.
fn take_backticked(input: &str) -> Option<(String, &str)> {
    let rest = input.trim_start().strip_prefix('`')?;
    let end = rest.find('`')?;
    Some((rest[..end].to_string(), &rest[end + 1..]))
}

/// Read a balanced `( ... )` group, returning its interior and the tail.
fn take_parenthesized(input: &str) -> Option<(&str, &str)> {
    let start = input.find('(')?;
    let mut depth = 0usize;
    for (i, ch) in input[start..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + i;
                    return Some((&input[start + 1..end], &input[end + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas outside parentheses.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !input[start..].trim().is_empty() {
        items.push(&input[start..]);
    }
    items
}

/// Extract the first double-quoted string following `marker`.
fn extract_quoted(input: &str, marker: &str) -> Option<String> {
    let after = &input[input.find(marker)? + marker.len()..];
    let open = after.find('"')?;
    let rest = &after[open + 1..];
    let close = rest.find('"')?;
    Some(rest[..close].to_string())
}

// ---------------------------------------------------------------------------
// Partition model

/// (partition_index, row_count, data_size) per simulated partition.
fn partition_stats(table: &MemTable) -> Vec<(u64, u64, u64)> {
    let total = table.rows.len() as u64;
    if total == 0 {
        return vec![(0, 0, 0)];
    }
    let parts = (total - 1) / ROWS_PER_PARTITION + 1;
    let key_pos = table
        .description
        .columns
        .iter()
        .position(|c| c.name == table.description.primary_key)
        .unwrap_or(0);

    let mut stats = vec![(0u64, 0u64, 0u64); parts as usize];
    for (i, row) in table.rows.values().enumerate() {
        let part = i as u64 % parts;
        let mut size = 0u64;
        for (pos, value) in row.0.iter().enumerate() {
            let raw = value.wire_size();
            size += if pos == key_pos || table.description.store == StoreKind::Row {
                raw
            } else if raw == 0 {
                0
            } else {
                (raw / 4).max(1)
            };
        }
        let entry = &mut stats[part as usize];
        entry.1 += 1;
        entry.2 += size;
    }
    stats
        .into_iter()
        .enumerate()
        .map(|(idx, (_, rows, size))| (idx as u64, rows, size))
        .collect()
}

use crate::error::Result;
use crate::types::{PrimitiveType, Value};

/// Rows returned by a query, in backend order.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub rows: Vec<Vec<Value>>,
}

/// Storage engine a table was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Row,
    Column,
}

#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,
    pub ty: PrimitiveType,
    pub nullable: bool,
}

/// Table metadata as reported by the backend. Columns are in declaration
/// order.
#[derive(Debug, Clone)]
pub struct TableDescription {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
    pub primary_key: String,
    pub store: StoreKind,
}

/// A single backend session. Obtained only through [`SessionPool`], which
/// owns retry and lifecycle concerns.
pub trait Session {
    /// Execute a scheme (DDL) script: pragmas, CREATE TABLE, DROP TABLE.
    fn execute_scheme(&mut self, ddl: &str) -> Result<()>;

    /// Execute a read query in a transaction and return its rows.
    fn execute_query(&mut self, query: &str) -> Result<ResultSet>;

    /// Describe a table at an absolute path.
    fn describe_table(&mut self, path: &str) -> Result<TableDescription>;
}

/// Retrying synchronous operation executor.
///
/// The pool hands a session to `op` and re-invokes it on transient backend
/// errors, with backoff owned entirely by the implementation. The caller sees
/// either the operation's result or a terminal error
/// ([`LinkError::RetriesExhausted`](crate::LinkError::RetriesExhausted) once
/// the budget is spent; non-retriable errors pass through on first
/// occurrence).
pub trait SessionPool {
    type Session: Session;

    fn retry_operation_sync<T, F>(&self, op: F) -> Result<T>
    where
        F: FnMut(&mut Self::Session) -> Result<T>;
}

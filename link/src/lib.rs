//! Client surface for the Stratum benchmark harness.
//!
//! The harness never speaks a wire protocol itself. It depends on three small
//! traits — a scheme client for directory probes and creation, a session pool
//! that runs scheme/query operations under its own retry policy, and a table
//! client for batched upserts — plus the value/type model they exchange.
//!
//! [`mem`] provides an in-process backend implementing the full surface, used
//! by the harness binary and the test suite. A network transport plugs in by
//! implementing the same traits.

pub mod error;
pub mod mem;
pub mod scheme;
pub mod session;
pub mod table;
pub mod types;

pub use error::{LinkError, Result};
pub use scheme::{EntryKind, SchemeClient, SchemeEntry};
pub use session::{ColumnMeta, ResultSet, Session, SessionPool, StoreKind, TableDescription};
pub use table::{BulkColumns, BulkRow, TableClient};
pub use types::{PrimitiveType, Value};

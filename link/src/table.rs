use crate::error::Result;
use crate::types::{PrimitiveType, Value};

/// Column metadata attached to a bulk upsert: names and types, in the order
/// the row values are laid out.
#[derive(Debug, Clone, Default)]
pub struct BulkColumns {
    columns: Vec<(String, PrimitiveType)>,
}

impl BulkColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(mut self, name: &str, ty: PrimitiveType) -> Self {
        self.columns.push((name.to_string(), ty));
        self
    }

    pub fn columns(&self) -> &[(String, PrimitiveType)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One row of a bulk upsert, values aligned with the [`BulkColumns`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRow(pub Vec<Value>);

/// Batched insert-or-replace. The backend batches internally; one call
/// submits the whole row set.
pub trait TableClient {
    fn bulk_upsert(&self, table_path: &str, rows: &[BulkRow], columns: &BulkColumns)
        -> Result<()>;
}

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Primitive column types understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    Uint64,
    Int8,
    Date,
    Utf8,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Uint64 => "Uint64",
            PrimitiveType::Int8 => "Int8",
            PrimitiveType::Date => "Date",
            PrimitiveType::Utf8 => "Utf8",
        };
        f.write_str(name)
    }
}

impl PrimitiveType {
    /// Parse the DDL spelling of a type name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Uint64" => Some(PrimitiveType::Uint64),
            "Int8" => Some(PrimitiveType::Int8),
            "Date" => Some(PrimitiveType::Date),
            "Utf8" => Some(PrimitiveType::Utf8),
            _ => None,
        }
    }
}

/// A single scalar cell exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    Uint64(u64),
    Int8(i8),
    Date(NaiveDate),
    Utf8(String),
    Null,
}

impl Value {
    pub fn kind(&self) -> Option<PrimitiveType> {
        match self {
            Value::Uint64(_) => Some(PrimitiveType::Uint64),
            Value::Int8(_) => Some(PrimitiveType::Int8),
            Value::Date(_) => Some(PrimitiveType::Date),
            Value::Utf8(_) => Some(PrimitiveType::Utf8),
            Value::Null => None,
        }
    }

    /// Encoded size in bytes. Dates are stored as days-since-epoch (2 bytes).
    pub fn wire_size(&self) -> u64 {
        match self {
            Value::Uint64(_) => 8,
            Value::Int8(_) => 1,
            Value::Date(_) => 2,
            Value::Utf8(s) => s.len() as u64,
            Value::Null => 0,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint64(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint64(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d),
            Value::Utf8(s) => f.write_str(s),
            Value::Null => f.write_str("NULL"),
        }
    }
}

// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

//! The primitive type vocabulary of the engine.
//!
//! Every typed segment is parameterized by one member of the closed set
//! [`DataType`]. The textual spellings (`"int"`, `"long"`, `"float"`,
//! `"double"`, `"string"`) are the only bridge from schema text to static
//! types; [`dispatch_data_type!`] expands that bridge into a closed match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod native;
mod value;

pub use native::PrimitiveType;
pub use value::DataValue;

/// A wrapper around floats providing implementations of `Eq`, `Ord`, and `Hash`.
pub type F32 = ordered_float::OrderedFloat<f32>;
pub type F64 = ordered_float::OrderedFloat<f64>;

/// Index of a chunk inside a table.
pub type ChunkId = u32;
/// Row index inside a chunk.
pub type ChunkOffset = u32;
/// Column index inside a table.
pub type ColumnId = u16;
/// Number of columns of a table or chunk.
pub type ColumnCount = u16;
/// Number of chunks of a table.
pub type ChunkCount = u32;
/// Index into a dictionary.
pub type ValueId = u32;

/// Sentinel for "no dictionary entry at or beyond the probe".
pub const INVALID_VALUE_ID: ValueId = ValueId::MAX;

/// Position of a single row: which chunk, and which offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

impl RowId {
    pub const fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> RowId {
        RowId {
            chunk_id,
            chunk_offset,
        }
    }
}

/// An ordered list of row positions, shared by all segments of a reference chunk.
pub type PosList = Vec<RowId>;

/// The error type of value conversion and type-name resolution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("unknown type name: {0:?}")]
    UnknownTypeName(String),
    #[error("cannot cast {0:?} as {1}")]
    TypeMismatch(DataValue, DataType),
}

/// One of the primitive element types a segment can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int32,
    Int64,
    Float32,
    Float64,
    String,
}

impl DataType {
    /// The external spelling of the type.
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Int32 => "int",
            DataType::Int64 => "long",
            DataType::Float32 => "float",
            DataType::Float64 => "double",
            DataType::String => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<DataType, ConvertError> {
        match s {
            "int" => Ok(DataType::Int32),
            "long" => Ok(DataType::Int64),
            "float" => Ok(DataType::Float32),
            "double" => Ok(DataType::Float64),
            "string" => Ok(DataType::String),
            _ => Err(ConvertError::UnknownTypeName(s.into())),
        }
    }
}

/// Expands to a closed match over [`DataType`], aliasing `$T` to the native
/// Rust type of `$data_type` inside the block.
///
/// This is the single place where a runtime [`DataType`] selects a
/// monomorphized body; all typed segment constructors route through it.
macro_rules! dispatch_data_type {
    ($data_type:expr, $T:ident, $body:block) => {
        match $data_type {
            $crate::types::DataType::Int32 => {
                type $T = i32;
                $body
            }
            $crate::types::DataType::Int64 => {
                type $T = i64;
                $body
            }
            $crate::types::DataType::Float32 => {
                type $T = $crate::types::F32;
                $body
            }
            $crate::types::DataType::Float64 => {
                type $T = $crate::types::F64;
                $body
            }
            $crate::types::DataType::String => {
                type $T = ::std::string::String;
                $body
            }
        }
    };
}
pub(crate) use dispatch_data_type;

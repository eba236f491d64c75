// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use thiserror::Error;

use crate::types::{ConvertError, ValueId};

/// The error type of the storage subsystem.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{0} index {1} is out of bounds")]
    OutOfBounds(&'static str, usize),
    #[error("{0}({1}) not found")]
    NotFound(&'static str, String),
    #[error("duplicated {0}: {1}")]
    Duplicated(&'static str, String),
    #[error("table schema cannot be changed once rows have been appended")]
    SchemaFrozen,
    #[error("cannot emplace a chunk while the current last chunk is not full")]
    LastChunkNotFull,
    #[error("{0} segments are immutable")]
    Immutable(&'static str),
    #[error("segment has more distinct values than a value id can address")]
    TooManyDistinctValues,
    #[error("operation is not implemented for this segment type")]
    UnsupportedSegment,
    #[error("value id {0} does not fit into an attribute vector of width {1}")]
    ValueIdOverflow(ValueId, usize),
    #[error("row has {0} values but the chunk has {1} columns")]
    RowWidthMismatch(usize, usize),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl StorageError {
    pub fn out_of_bounds(what: &'static str, index: usize) -> Self {
        StorageError::OutOfBounds(what, index)
    }

    pub fn not_found(what: &'static str, item: impl ToString) -> Self {
        StorageError::NotFound(what, item.to_string())
    }

    pub fn duplicated(what: &'static str, item: impl ToString) -> Self {
        StorageError::Duplicated(what, item.to_string())
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use super::{StorageError, StorageResult};
use crate::types::{ChunkOffset, DataValue, PrimitiveType};

/// An append-only, unencoded column fragment.
///
/// This is the segment variant that backs freshly inserted data. It grows by
/// `append` until its chunk is handed to dictionary compression, which
/// replaces it wholesale.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValueSegment<T: PrimitiveType> {
    values: Vec<T>,
}

impl<T: PrimitiveType> ValueSegment<T> {
    pub fn new() -> ValueSegment<T> {
        ValueSegment { values: Vec::new() }
    }

    /// Append a value to the end of the segment, coercing it to the segment's
    /// element type.
    pub fn append(&mut self, value: DataValue) -> StorageResult<()> {
        self.values.push(T::from_value(value)?);
        Ok(())
    }

    pub fn get(&self, chunk_offset: ChunkOffset) -> StorageResult<DataValue> {
        self.values
            .get(chunk_offset as usize)
            .cloned()
            .map(T::into_value)
            .ok_or_else(|| StorageError::out_of_bounds("chunk offset", chunk_offset as usize))
    }

    /// Zero-copy view of the underlying values, in insertion order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn size(&self) -> ChunkOffset {
        self.values.len() as ChunkOffset
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.values.capacity() * std::mem::size_of::<T>()
    }
}

impl<T: PrimitiveType> FromIterator<T> for ValueSegment<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ValueSegment {
            values: iter.into_iter().collect(),
        }
    }
}

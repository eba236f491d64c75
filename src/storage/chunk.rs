// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use smallvec::SmallVec;

use super::{SegmentRef, StorageError, StorageResult};
use crate::types::{ChunkOffset, ColumnCount, ColumnId, DataValue};

/// A horizontal partition of a table: one segment per column, all of equal
/// length.
#[derive(Default)]
pub struct Chunk {
    segments: SmallVec<[SegmentRef; 16]>,
}

pub type ChunkRef = Arc<Chunk>;

impl Chunk {
    pub fn new() -> Chunk {
        Chunk::default()
    }

    pub fn from_segments(segments: Vec<SegmentRef>) -> Chunk {
        Chunk {
            segments: SmallVec::from_vec(segments),
        }
    }

    pub fn add_segment(&mut self, segment: SegmentRef) {
        self.segments.push(segment);
    }

    pub fn segment(&self, column_id: ColumnId) -> StorageResult<&SegmentRef> {
        self.segments
            .get(column_id as usize)
            .ok_or_else(|| StorageError::out_of_bounds("column id", column_id as usize))
    }

    pub fn segments(&self) -> &[SegmentRef] {
        &self.segments
    }

    pub fn column_count(&self) -> ColumnCount {
        self.segments.len() as ColumnCount
    }

    /// Number of rows, read from the first segment (all segments are kept at
    /// the same height).
    pub fn size(&self) -> ChunkOffset {
        self.segments
            .first()
            .map(|segment| segment.read().size())
            .unwrap_or(0)
    }

    /// Append one row, forwarding the i-th value to the i-th segment.
    ///
    /// Callers guarantee schema compatibility; a failing segment aborts the
    /// append without rolling back the already written columns.
    pub fn append(&self, values: Vec<DataValue>) -> StorageResult<()> {
        if values.len() != self.segments.len() {
            return Err(StorageError::RowWidthMismatch(
                values.len(),
                self.segments.len(),
            ));
        }
        for (segment, value) in self.segments.iter().zip(values) {
            segment.write().append(value)?;
        }
        Ok(())
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| segment.read().estimate_memory_usage())
            .sum()
    }
}

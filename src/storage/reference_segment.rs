// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use std::fmt;
use std::sync::Arc;

use super::{StorageError, StorageResult, TableRef};
use crate::types::{ChunkOffset, ColumnId, DataValue, PosList, RowId};

/// A positional view over one column of a base table.
///
/// Reads resolve through the shared position list into the referenced
/// table's own segments; no values are copied. The referenced segments must
/// be value or dictionary segments: reference segments never nest, which the
/// scan operator guarantees by resolving its input's base table first.
pub struct ReferenceSegment {
    referenced_table: TableRef,
    referenced_column_id: ColumnId,
    pos_list: Arc<PosList>,
}

impl ReferenceSegment {
    pub fn new(
        referenced_table: TableRef,
        referenced_column_id: ColumnId,
        pos_list: Arc<PosList>,
    ) -> ReferenceSegment {
        ReferenceSegment {
            referenced_table,
            referenced_column_id,
            pos_list,
        }
    }

    /// Read through the position list into the referenced segment.
    pub fn get(&self, chunk_offset: ChunkOffset) -> StorageResult<DataValue> {
        let row_id = self
            .pos_list
            .get(chunk_offset as usize)
            .copied()
            .ok_or_else(|| StorageError::out_of_bounds("chunk offset", chunk_offset as usize))?;
        let chunk = self.referenced_table.get_chunk(row_id.chunk_id)?;
        let segment = chunk.segment(self.referenced_column_id)?;
        let value = segment.read().get(row_id.chunk_offset)?;
        Ok(value)
    }

    pub fn size(&self) -> ChunkOffset {
        self.pos_list.len() as ChunkOffset
    }

    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    pub fn referenced_table(&self) -> &TableRef {
        &self.referenced_table
    }

    pub fn referenced_column_id(&self) -> ColumnId {
        self.referenced_column_id
    }

    pub fn estimate_memory_usage(&self) -> usize {
        std::mem::size_of::<ColumnId>()
            + std::mem::size_of::<TableRef>()
            + self.pos_list.capacity() * std::mem::size_of::<RowId>()
    }
}

impl fmt::Debug for ReferenceSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceSegment")
            .field("referenced_column_id", &self.referenced_column_id)
            .field("rows", &self.pos_list.len())
            .finish()
    }
}

// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;
use std::thread;

use itertools::Itertools;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::{
    Chunk, ChunkRef, DictionarySegmentImpl, SegmentImpl, StorageError, StorageResult,
    ValueSegmentImpl,
};
use crate::types::{ChunkCount, ChunkId, ChunkOffset, ColumnCount, ColumnId, DataType, DataValue};

/// Name and element type of one table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> ColumnDefinition {
        ColumnDefinition {
            name: name.into(),
            data_type,
        }
    }
}

/// A chunked column table.
///
/// Rows are appended into the last chunk; once it reaches
/// `target_chunk_size` a fresh chunk is started. The chunk list and schema
/// live behind one lock so that a compressed chunk can be installed as a
/// single slot write while readers keep whatever chunk handle they already
/// hold.
pub struct Table {
    target_chunk_size: ChunkOffset,
    inner: RwLock<TableInner>,
}

struct TableInner {
    columns: Vec<ColumnDefinition>,
    chunks: Vec<ChunkRef>,
}

pub type TableRef = Arc<Table>;

impl Default for Table {
    /// A table with an unbounded chunk target, as used for operator outputs.
    fn default() -> Table {
        Table::new(ChunkOffset::MAX)
    }
}

impl TableInner {
    fn row_count(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.size() as u64).sum()
    }

    fn new_chunk(&self) -> Chunk {
        let segments = self
            .columns
            .iter()
            .map(|column| SegmentImpl::Value(ValueSegmentImpl::new(column.data_type)).into_ref())
            .collect();
        Chunk::from_segments(segments)
    }
}

impl Table {
    pub fn new(target_chunk_size: ChunkOffset) -> Table {
        Table {
            target_chunk_size,
            inner: RwLock::new(TableInner {
                columns: Vec::new(),
                chunks: vec![Arc::new(Chunk::new())],
            }),
        }
    }

    pub fn target_chunk_size(&self) -> ChunkOffset {
        self.target_chunk_size
    }

    /// Add a column given the external spelling of its type.
    pub fn add_column(&self, name: &str, type_name: &str) -> StorageResult<()> {
        let data_type = type_name.parse::<DataType>()?;
        self.add_column_definition(ColumnDefinition::new(name, data_type))
    }

    /// Add a column; only allowed while the table holds no rows.
    pub fn add_column_definition(&self, column: ColumnDefinition) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if inner.row_count() > 0 {
            return Err(StorageError::SchemaFrozen);
        }
        let data_type = column.data_type;
        inner.columns.push(column);
        // Extend every (empty) chunk with a fresh segment of the new type.
        for chunk in &mut inner.chunks {
            let mut segments = chunk.segments().to_vec();
            segments.push(SegmentImpl::Value(ValueSegmentImpl::new(data_type)).into_ref());
            *chunk = Arc::new(Chunk::from_segments(segments));
        }
        Ok(())
    }

    /// Clone a column definition from another table, shaping this table's
    /// schema after it.
    pub fn copy_column_definition(&self, other: &Table, column_id: ColumnId) -> StorageResult<()> {
        let column = {
            let other_inner = other.inner.read();
            other_inner
                .columns
                .get(column_id as usize)
                .cloned()
                .ok_or_else(|| StorageError::out_of_bounds("column id", column_id as usize))?
        };
        self.add_column_definition(column)
    }

    /// Append one row, starting a new chunk first if the current one is full.
    pub fn append(&self, values: Vec<DataValue>) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if inner.chunks.last().unwrap().size() == self.target_chunk_size {
            let chunk = inner.new_chunk();
            inner.chunks.push(Arc::new(chunk));
        }
        inner.chunks.last().unwrap().append(values)
    }

    /// Install a chunk produced elsewhere (e.g. a scan's reference chunk).
    ///
    /// An empty table has its placeholder chunk replaced; otherwise the
    /// current last chunk must be full and the new chunk is appended.
    pub fn emplace_chunk(&self, chunk: Chunk) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if inner.row_count() == 0 {
            inner.chunks = vec![Arc::new(chunk)];
            return Ok(());
        }
        if inner.chunks.last().unwrap().size() != self.target_chunk_size {
            return Err(StorageError::LastChunkNotFull);
        }
        inner.chunks.push(Arc::new(chunk));
        Ok(())
    }

    /// Dictionary-compress the chunk at `chunk_id`, one worker per column.
    ///
    /// The source chunk is not mutated; the compressed chunk is installed
    /// into its slot after all workers have joined. Readers holding the old
    /// chunk keep reading it until they release their handle.
    pub fn compress_chunk(&self, chunk_id: ChunkId) -> StorageResult<()> {
        let chunk = self.get_chunk(chunk_id)?;
        let column_count = chunk.column_count() as usize;

        let compressed = thread::scope(|scope| {
            let chunk = &chunk;
            let workers: Vec<_> = (0..column_count)
                .map(|column_id| {
                    scope.spawn(move || -> StorageResult<SegmentImpl> {
                        let segment = chunk.segment(column_id as ColumnId)?;
                        let guard = segment.read();
                        match &*guard {
                            SegmentImpl::Value(source) => {
                                Ok(SegmentImpl::Dictionary(DictionarySegmentImpl::encode(source)?))
                            }
                            _ => Err(StorageError::UnsupportedSegment),
                        }
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap().map(SegmentImpl::into_ref))
                .try_collect::<_, Vec<_>, _>()
        })?;

        let mut inner = self.inner.write();
        inner.chunks[chunk_id as usize] = Arc::new(Chunk::from_segments(compressed));
        tracing::debug!(chunk_id, "chunk compressed");
        Ok(())
    }

    pub fn column_id_by_name(&self, column_name: &str) -> StorageResult<ColumnId> {
        let inner = self.inner.read();
        inner
            .columns
            .iter()
            .position(|column| column.name == column_name)
            .map(|index| index as ColumnId)
            .ok_or_else(|| StorageError::not_found("column", column_name))
    }

    pub fn column_count(&self) -> ColumnCount {
        self.inner.read().columns.len() as ColumnCount
    }

    pub fn row_count(&self) -> u64 {
        self.inner.read().row_count()
    }

    pub fn chunk_count(&self) -> ChunkCount {
        self.inner.read().chunks.len() as ChunkCount
    }

    pub fn column_name(&self, column_id: ColumnId) -> StorageResult<String> {
        let inner = self.inner.read();
        inner
            .columns
            .get(column_id as usize)
            .map(|column| column.name.clone())
            .ok_or_else(|| StorageError::out_of_bounds("column id", column_id as usize))
    }

    pub fn column_type(&self, column_id: ColumnId) -> StorageResult<DataType> {
        let inner = self.inner.read();
        inner
            .columns
            .get(column_id as usize)
            .map(|column| column.data_type)
            .ok_or_else(|| StorageError::out_of_bounds("column id", column_id as usize))
    }

    pub fn column_names(&self) -> Vec<String> {
        let inner = self.inner.read();
        inner
            .columns
            .iter()
            .map(|column| column.name.clone())
            .collect()
    }

    pub fn column_definitions(&self) -> Vec<ColumnDefinition> {
        self.inner.read().columns.clone()
    }

    pub fn get_chunk(&self, chunk_id: ChunkId) -> StorageResult<ChunkRef> {
        let inner = self.inner.read();
        inner
            .chunks
            .get(chunk_id as usize)
            .cloned()
            .ok_or_else(|| StorageError::out_of_bounds("chunk id", chunk_id as usize))
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read();
        inner.chunks.is_empty() || inner.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DictionarySegment;

    fn test_table() -> Table {
        let table = Table::new(2);
        table.add_column("col_1", "int").unwrap();
        table.add_column("col_2", "string").unwrap();
        table
    }

    fn append_greeting(table: &Table) {
        table.append(vec![4.into(), "Hello,".into()]).unwrap();
        table.append(vec![6.into(), "world".into()]).unwrap();
        table.append(vec![3.into(), "!".into()]).unwrap();
    }

    #[test]
    fn test_chunks_roll_over_at_target_size() {
        let table = test_table();
        assert_eq!(table.chunk_count(), 1);
        append_greeting(&table);
        assert_eq!(table.chunk_count(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.get_chunk(0).unwrap().size(), 2);
        assert_eq!(table.get_chunk(1).unwrap().size(), 1);
        assert!(matches!(
            table.get_chunk(42),
            Err(StorageError::OutOfBounds(..))
        ));
    }

    #[test]
    fn test_column_accessors() {
        let table = test_table();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_name(0).unwrap(), "col_1");
        assert_eq!(table.column_type(1).unwrap(), DataType::String);
        assert_eq!(table.column_names(), vec!["col_1", "col_2"]);
        assert_eq!(table.column_id_by_name("col_2").unwrap(), 1);
        assert!(matches!(
            table.column_id_by_name("col_3"),
            Err(StorageError::NotFound(..))
        ));
        assert!(matches!(
            table.column_name(2),
            Err(StorageError::OutOfBounds(..))
        ));
    }

    #[test]
    fn test_schema_freezes_after_first_row() {
        let table = test_table();
        table.append(vec![1.into(), "one".into()]).unwrap();
        assert!(matches!(
            table.add_column("col_3", "double"),
            Err(StorageError::SchemaFrozen)
        ));
    }

    #[test]
    fn test_unknown_column_type_is_rejected() {
        let table = Table::new(2);
        assert!(table.add_column("col_1", "decimal").is_err());
    }

    #[test]
    fn test_copy_column_definition() {
        let table = test_table();
        let other = Table::new(4);
        other.copy_column_definition(&table, 1).unwrap();
        assert_eq!(other.column_name(0).unwrap(), "col_2");
        assert_eq!(other.column_type(0).unwrap(), DataType::String);
        assert!(other.copy_column_definition(&table, 9).is_err());
    }

    #[test]
    fn test_is_empty() {
        let table = Table::new(2);
        assert!(table.is_empty());
        table.add_column("col_1", "int").unwrap();
        assert!(!table.is_empty());
    }

    #[test]
    fn test_emplace_chunk_replaces_placeholder_or_requires_full_last_chunk() {
        let table = test_table();

        // While no rows exist the placeholder chunk is replaced.
        let chunk = {
            let inner = table.inner.read();
            inner.new_chunk()
        };
        chunk.append(vec![1.into(), "one".into()]).unwrap();
        table.emplace_chunk(chunk).unwrap();
        assert_eq!(table.chunk_count(), 1);
        assert_eq!(table.row_count(), 1);

        // The last chunk now holds one of two target rows; emplacing must
        // fail until it is full.
        let partial = {
            let inner = table.inner.read();
            inner.new_chunk()
        };
        assert!(matches!(
            table.emplace_chunk(partial),
            Err(StorageError::LastChunkNotFull)
        ));

        table.append(vec![2.into(), "two".into()]).unwrap();
        let next = {
            let inner = table.inner.read();
            inner.new_chunk()
        };
        table.emplace_chunk(next).unwrap();
        assert_eq!(table.chunk_count(), 2);
    }

    #[test]
    fn test_compress_chunk() {
        let table = test_table();
        table.append(vec![0.into(), "Alexander".into()]).unwrap();
        table.append(vec![1.into(), "Alexander".into()]).unwrap();

        table.compress_chunk(0).unwrap();

        let chunk = table.get_chunk(0).unwrap();
        assert_eq!(chunk.size(), 2);
        let segment = chunk.segment(1).unwrap();
        let guard = segment.read();
        let dictionary_segment: &DictionarySegment<String> = match &*guard {
            SegmentImpl::Dictionary(encoded) => encoded.try_into().unwrap(),
            _ => panic!("expected a dictionary segment after compression"),
        };
        assert_eq!(dictionary_segment.get(0).unwrap(), "Alexander");
        assert_eq!(dictionary_segment.get(1).unwrap(), "Alexander");
        assert_eq!(dictionary_segment.unique_values_count(), 1);

        // Compressing the same chunk again finds no value segments.
        assert!(matches!(
            table.compress_chunk(0),
            Err(StorageError::UnsupportedSegment)
        ));
    }

    #[test]
    fn test_compressed_chunk_still_serves_readers_of_the_old_chunk() {
        let table = test_table();
        append_greeting(&table);

        let old_chunk = table.get_chunk(0).unwrap();
        table.compress_chunk(0).unwrap();

        // The pre-compression handle still reads the value segments.
        assert!(matches!(
            &*old_chunk.segment(0).unwrap().read(),
            SegmentImpl::Value(_)
        ));
        // A fresh handle observes the dictionary segments.
        assert!(matches!(
            &*table.get_chunk(0).unwrap().segment(0).unwrap().read(),
            SegmentImpl::Dictionary(_)
        ));
        assert_eq!(table.row_count(), 3);
    }
}

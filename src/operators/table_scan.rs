// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{ExecuteError, ExecutionState, Operator, OperatorRef};
use crate::storage::{
    AttributeVectorImpl, Chunk, DictionarySegment, ReferenceSegment, SegmentImpl, Table, TableRef,
    ValueSegment,
};
use crate::types::{
    dispatch_data_type, ChunkId, ChunkOffset, ColumnId, DataValue, PosList, PrimitiveType, RowId,
    ValueId,
};

/// The comparison predicate of a table scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOp {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

impl ScanOp {
    /// Whether `probe OP search_value` holds, given `probe.cmp(search_value)`.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            ScanOp::Equals => ordering.is_eq(),
            ScanOp::NotEquals => ordering.is_ne(),
            ScanOp::LessThan => ordering.is_lt(),
            ScanOp::LessThanEquals => ordering.is_le(),
            ScanOp::GreaterThan => ordering.is_gt(),
            ScanOp::GreaterThanEquals => ordering.is_ge(),
        }
    }
}

/// Filters one column of the input table and publishes the matching rows as
/// a table of reference segments.
///
/// The scan picks its algorithm per chunk from the physical segment variant:
/// value segments are compared row by row, dictionary segments are filtered
/// on value ids after two binary searches, and reference segments are read
/// through their position list, emitting the underlying row ids so that
/// chained scans always reference the base table directly.
pub struct TableScan {
    input: OperatorRef,
    column_id: ColumnId,
    scan_op: ScanOp,
    search_value: DataValue,
    state: ExecutionState,
}

impl TableScan {
    pub fn new(
        input: OperatorRef,
        column_id: ColumnId,
        scan_op: ScanOp,
        search_value: DataValue,
    ) -> TableScan {
        TableScan {
            input,
            column_id,
            scan_op,
            search_value,
            state: ExecutionState::new(),
        }
    }

    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    pub fn scan_op(&self) -> ScanOp {
        self.scan_op
    }

    pub fn search_value(&self) -> &DataValue {
        &self.search_value
    }
}

fn scan_value_segment<T: PrimitiveType>(
    scan_op: ScanOp,
    chunk_id: ChunkId,
    segment: &ValueSegment<T>,
    search_value: &T,
    pos_list: &mut PosList,
) {
    for (chunk_offset, value) in segment.values().iter().enumerate() {
        if scan_op.matches(value.cmp(search_value)) {
            pos_list.push(RowId::new(chunk_id, chunk_offset as ChunkOffset));
        }
    }
}

fn collect_matching_value_ids(
    chunk_id: ChunkId,
    attribute_vector: &AttributeVectorImpl,
    pos_list: &mut PosList,
    predicate: impl Fn(ValueId) -> bool,
) {
    for (chunk_offset, value_id) in attribute_vector.iter().enumerate() {
        if predicate(value_id) {
            pos_list.push(RowId::new(chunk_id, chunk_offset as ChunkOffset));
        }
    }
}

fn scan_dictionary_segment<T: PrimitiveType>(
    scan_op: ScanOp,
    chunk_id: ChunkId,
    segment: &DictionarySegment<T>,
    search_value: &T,
    pos_list: &mut PosList,
) {
    // Both bounds are computed once per chunk. INVALID_VALUE_ID (u32::MAX)
    // acts as past-the-end in every comparison below.
    let lower = segment.lower_bound(search_value);
    let upper = segment.upper_bound(search_value);
    let attribute_vector = segment.attribute_vector();
    match scan_op {
        ScanOp::Equals => {
            if lower != upper {
                collect_matching_value_ids(chunk_id, attribute_vector, pos_list, |id| id == lower);
            }
        }
        ScanOp::NotEquals => {
            if lower == upper {
                // The dictionary lacks the search value, every row matches.
                collect_matching_value_ids(chunk_id, attribute_vector, pos_list, |_| true);
            } else {
                collect_matching_value_ids(chunk_id, attribute_vector, pos_list, |id| id != lower);
            }
        }
        ScanOp::LessThan => {
            collect_matching_value_ids(chunk_id, attribute_vector, pos_list, |id| id < lower);
        }
        ScanOp::LessThanEquals => {
            if lower == upper {
                collect_matching_value_ids(chunk_id, attribute_vector, pos_list, |id| id < lower);
            } else {
                collect_matching_value_ids(chunk_id, attribute_vector, pos_list, |id| id <= lower);
            }
        }
        ScanOp::GreaterThan => {
            collect_matching_value_ids(chunk_id, attribute_vector, pos_list, |id| id >= upper);
        }
        ScanOp::GreaterThanEquals => {
            collect_matching_value_ids(chunk_id, attribute_vector, pos_list, |id| id >= lower);
        }
    }
}

fn scan_reference_segment<T: PrimitiveType>(
    scan_op: ScanOp,
    segment: &ReferenceSegment,
    search_value: &T,
    pos_list: &mut PosList,
) -> Result<(), ExecuteError> {
    for (index, row_id) in segment.pos_list().iter().enumerate() {
        let value = T::from_value(segment.get(index as ChunkOffset)?)?;
        if scan_op.matches(value.cmp(search_value)) {
            // Emit the underlying position, not the local offset, so chained
            // scans stay one level deep.
            pos_list.push(*row_id);
        }
    }
    Ok(())
}

impl Operator for TableScan {
    fn on_execute(&self) -> Result<TableRef, ExecuteError> {
        let input = self.input.get_output()?;
        let column_count = input.column_count();

        let output = Table::default();
        for column_id in 0..column_count {
            output.copy_column_definition(&input, column_id)?;
        }

        if input.is_empty() {
            return Ok(Arc::new(output));
        }

        let data_type = input.column_type(self.column_id)?;
        let mut pos_list = PosList::new();
        dispatch_data_type!(data_type, T, {
            let search_value = T::from_value(self.search_value.clone())?;
            for chunk_id in 0..input.chunk_count() {
                let chunk = input.get_chunk(chunk_id)?;
                let guard = chunk.segment(self.column_id)?.read();
                match &*guard {
                    SegmentImpl::Value(segment) => {
                        let segment: &ValueSegment<T> = segment.try_into()?;
                        scan_value_segment(
                            self.scan_op,
                            chunk_id,
                            segment,
                            &search_value,
                            &mut pos_list,
                        );
                    }
                    SegmentImpl::Dictionary(segment) => {
                        let segment: &DictionarySegment<T> = segment.try_into()?;
                        scan_dictionary_segment(
                            self.scan_op,
                            chunk_id,
                            segment,
                            &search_value,
                            &mut pos_list,
                        );
                    }
                    SegmentImpl::Reference(segment) => {
                        scan_reference_segment(self.scan_op, segment, &search_value, &mut pos_list)?;
                    }
                }
            }
        });

        // A reference input was scanned through to its base table, so the
        // output references that base directly.
        let first_chunk = input.get_chunk(0)?;
        let referenced_table = match &*first_chunk.segment(0)?.read() {
            SegmentImpl::Reference(segment) => segment.referenced_table().clone(),
            _ => input.clone(),
        };

        tracing::debug!(rows = pos_list.len(), "table scan matched");

        let pos_list = Arc::new(pos_list);
        let mut chunk = Chunk::new();
        for column_id in 0..column_count {
            chunk.add_segment(
                SegmentImpl::Reference(ReferenceSegment::new(
                    referenced_table.clone(),
                    column_id,
                    pos_list.clone(),
                ))
                .into_ref(),
            );
        }
        output.emplace_chunk(chunk)?;
        Ok(Arc::new(output))
    }

    fn state(&self) -> &ExecutionState {
        &self.state
    }

    fn left_input(&self) -> Option<&OperatorRef> {
        Some(&self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageManager;

    #[test]
    fn test_scan_op_matches() {
        assert!(ScanOp::Equals.matches(Ordering::Equal));
        assert!(!ScanOp::Equals.matches(Ordering::Less));
        assert!(ScanOp::NotEquals.matches(Ordering::Greater));
        assert!(ScanOp::LessThan.matches(Ordering::Less));
        assert!(ScanOp::LessThanEquals.matches(Ordering::Equal));
        assert!(ScanOp::GreaterThan.matches(Ordering::Greater));
        assert!(!ScanOp::GreaterThanEquals.matches(Ordering::Less));
    }

    fn register_int_table(name: &str, values: &[i32], target_chunk_size: ChunkOffset) -> TableRef {
        let table = Arc::new(Table::new(target_chunk_size));
        table.add_column("a", "int").unwrap();
        for &v in values {
            table.append(vec![v.into()]).unwrap();
        }
        StorageManager::get().add_table(name, table.clone()).unwrap();
        table
    }

    fn scan_positions(scan: &TableScan) -> PosList {
        scan.execute().unwrap();
        let output = scan.get_output().unwrap();
        let chunk = output.get_chunk(0).unwrap();
        let guard = chunk.segment(0).unwrap().read();
        match &*guard {
            SegmentImpl::Reference(segment) => segment.pos_list().as_ref().clone(),
            _ => panic!("scan output must consist of reference segments"),
        }
    }

    #[test]
    fn test_scan_value_segments() {
        register_int_table("scan_values", &[3, 1, 4, 1, 5], 3);
        let get_table = Arc::new(crate::operators::GetTable::new("scan_values"));
        get_table.execute().unwrap();

        let scan = TableScan::new(get_table, 0, ScanOp::GreaterThan, 2.into());
        assert_eq!(
            scan_positions(&scan),
            vec![RowId::new(0, 0), RowId::new(0, 2), RowId::new(1, 1)]
        );

        StorageManager::get().drop_table("scan_values").unwrap();
    }

    #[test]
    fn test_scan_output_shape() {
        let table = Arc::new(Table::new(2));
        table.add_column("col_1", "int").unwrap();
        table.add_column("col_2", "string").unwrap();
        table.append(vec![1.into(), "one".into()]).unwrap();
        table.append(vec![2.into(), "two".into()]).unwrap();
        StorageManager::get()
            .add_table("scan_shape", table)
            .unwrap();

        let get_table = Arc::new(crate::operators::GetTable::new("scan_shape"));
        get_table.execute().unwrap();
        let scan = TableScan::new(get_table, 0, ScanOp::Equals, 2.into());
        scan.execute().unwrap();
        let output = scan.get_output().unwrap();

        assert_eq!(output.column_count(), 2);
        assert_eq!(output.chunk_count(), 1);
        assert_eq!(output.row_count(), 1);
        assert_eq!(output.column_names(), vec!["col_1", "col_2"]);
        let chunk = output.get_chunk(0).unwrap();
        assert_eq!(chunk.column_count(), 2);
        assert_eq!(
            chunk.segment(1).unwrap().read().get(0).unwrap(),
            DataValue::from("two")
        );

        StorageManager::get().drop_table("scan_shape").unwrap();
    }

    #[test]
    fn test_incompatible_search_value_fails() {
        register_int_table("scan_mismatch", &[1, 2], 4);
        let get_table = Arc::new(crate::operators::GetTable::new("scan_mismatch"));
        get_table.execute().unwrap();

        let scan = TableScan::new(get_table, 0, ScanOp::Equals, "two".into());
        assert!(matches!(scan.execute(), Err(ExecuteError::Convert(_))));
        assert!(matches!(
            scan.get_output(),
            Err(ExecuteError::NotExecuted)
        ));

        StorageManager::get().drop_table("scan_mismatch").unwrap();
    }

    #[test]
    fn test_scan_empty_table_emits_schema_only() {
        let table = Arc::new(Table::new(2));
        StorageManager::get()
            .add_table("scan_empty", table)
            .unwrap();

        let get_table = Arc::new(crate::operators::GetTable::new("scan_empty"));
        get_table.execute().unwrap();
        let scan = TableScan::new(get_table, 0, ScanOp::Equals, 1.into());
        scan.execute().unwrap();
        let output = scan.get_output().unwrap();
        assert_eq!(output.column_count(), 0);
        assert_eq!(output.row_count(), 0);

        StorageManager::get().drop_table("scan_empty").unwrap();
    }
}

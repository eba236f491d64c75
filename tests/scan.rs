// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

//! End-to-end scans through the storage manager and operator chain.

use std::sync::Arc;

use silica::operators::{GetTable, Operator, OperatorRef, ScanOp, TableScan};
use silica::storage::{SegmentImpl, StorageManager, Table, TableRef};
use silica::types::{ChunkOffset, DataValue, PosList, RowId};

fn register_int_table(name: &str, values: &[i32], target_chunk_size: ChunkOffset) -> TableRef {
    let table = Arc::new(Table::new(target_chunk_size));
    table.add_column("a", "int").unwrap();
    for &value in values {
        table.append(vec![value.into()]).unwrap();
    }
    StorageManager::get()
        .add_table(name, table.clone())
        .unwrap();
    table
}

fn compress_all_chunks(table: &Table) {
    for chunk_id in 0..table.chunk_count() {
        table.compress_chunk(chunk_id).unwrap();
    }
}

fn executed_get_table(name: &str) -> OperatorRef {
    let get_table = Arc::new(GetTable::new(name));
    get_table.execute().unwrap();
    get_table
}

fn positions(output: &Table) -> PosList {
    let chunk = output.get_chunk(0).unwrap();
    let guard = chunk.segment(0).unwrap().read();
    match &*guard {
        SegmentImpl::Reference(segment) => segment.pos_list().as_ref().clone(),
        _ => panic!("scan output must consist of reference segments"),
    }
}

fn scan(input: OperatorRef, scan_op: ScanOp, search_value: DataValue) -> TableRef {
    let scan = TableScan::new(input, 0, scan_op, search_value);
    scan.execute().unwrap();
    scan.get_output().unwrap()
}

#[test]
fn test_scan_compressed_chunks_and_rescan_reference_output() {
    let table = register_int_table("pi_digits", &[3, 1, 4, 1, 5, 9, 2, 6, 5, 3], 4);
    compress_all_chunks(&table);

    let first = scan(
        executed_get_table("pi_digits"),
        ScanOp::GreaterThanEquals,
        4.into(),
    );
    assert_eq!(
        positions(&first),
        vec![
            RowId::new(0, 2),
            RowId::new(1, 0),
            RowId::new(1, 1),
            RowId::new(1, 3),
            RowId::new(2, 0),
        ]
    );

    // Scanning the reference output flattens back onto the base table.
    let first_scan = Arc::new(TableScan::new(
        executed_get_table("pi_digits"),
        0,
        ScanOp::GreaterThanEquals,
        4.into(),
    ));
    first_scan.execute().unwrap();
    let second = TableScan::new(first_scan, 0, ScanOp::LessThan, 6.into());
    second.execute().unwrap();
    let output = second.get_output().unwrap();
    assert_eq!(
        positions(&output),
        vec![RowId::new(0, 2), RowId::new(1, 0), RowId::new(2, 0)]
    );
    // The surviving rows read through to the base values 4, 5, 5.
    let chunk = output.get_chunk(0).unwrap();
    let segment = chunk.segment(0).unwrap();
    let values: Vec<DataValue> = (0..3).map(|i| segment.read().get(i).unwrap()).collect();
    assert_eq!(
        values,
        vec![
            DataValue::Int32(4),
            DataValue::Int32(5),
            DataValue::Int32(5)
        ]
    );

    StorageManager::get().drop_table("pi_digits").unwrap();
}

#[test]
fn test_scan_results_agree_across_physical_layouts() {
    let values = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3];
    register_int_table("layout_plain", &values, 4);
    let compressed = register_int_table("layout_encoded", &values, 4);
    compress_all_chunks(&compressed);

    let probes = [1, 4, 7, -1, 10];
    let ops = [
        ScanOp::Equals,
        ScanOp::NotEquals,
        ScanOp::LessThan,
        ScanOp::LessThanEquals,
        ScanOp::GreaterThan,
        ScanOp::GreaterThanEquals,
    ];
    for probe in probes {
        for op in ops {
            let plain = scan(executed_get_table("layout_plain"), op, probe.into());
            let encoded = scan(executed_get_table("layout_encoded"), op, probe.into());
            assert_eq!(
                positions(&plain),
                positions(&encoded),
                "layouts disagree for {:?} {}",
                op,
                probe
            );
        }
    }

    StorageManager::get().drop_table("layout_plain").unwrap();
    StorageManager::get().drop_table("layout_encoded").unwrap();
}

#[test]
fn test_scan_is_idempotent() {
    register_int_table("rescan", &[5, 3, 8, 3, 9], 2);

    let first = scan(executed_get_table("rescan"), ScanOp::NotEquals, 3.into());
    let second = scan(executed_get_table("rescan"), ScanOp::NotEquals, 3.into());
    assert_eq!(positions(&first), positions(&second));

    StorageManager::get().drop_table("rescan").unwrap();
}

#[test]
fn test_scan_string_column_through_dictionary() {
    let table = Arc::new(Table::new(3));
    table.add_column("id", "int").unwrap();
    table.add_column("name", "string").unwrap();
    for (id, name) in [
        (0, "Bill"),
        (1, "Steve"),
        (2, "Alexander"),
        (3, "Steve"),
        (4, "Hasso"),
        (5, "Bill"),
    ] {
        table.append(vec![id.into(), name.into()]).unwrap();
    }
    compress_all_chunks(&table);
    StorageManager::get()
        .add_table("founders", table)
        .unwrap();

    let get_table = executed_get_table("founders");
    let scan = TableScan::new(get_table, 1, ScanOp::Equals, "Steve".into());
    scan.execute().unwrap();
    let output = scan.get_output().unwrap();

    assert_eq!(
        positions(&output),
        vec![RowId::new(0, 1), RowId::new(1, 0)]
    );
    let chunk = output.get_chunk(0).unwrap();
    assert_eq!(
        chunk.segment(0).unwrap().read().get(1).unwrap(),
        DataValue::Int32(3)
    );

    StorageManager::get().drop_table("founders").unwrap();
}

#[test]
fn test_scan_keeps_base_table_alive_after_drop() {
    register_int_table("short_lived", &[1, 2, 3], 4);
    let output = scan(
        executed_get_table("short_lived"),
        ScanOp::GreaterThan,
        1.into(),
    );
    StorageManager::get().drop_table("short_lived").unwrap();

    // The reference segments co-own the base table.
    let chunk = output.get_chunk(0).unwrap();
    assert_eq!(
        chunk.segment(0).unwrap().read().get(0).unwrap(),
        DataValue::Int32(2)
    );
    assert_eq!(output.row_count(), 2);
}

// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use std::collections::BTreeMap;
use std::io;

use parking_lot::RwLock;

use super::{StorageError, StorageResult, TableRef};

/// The process-wide registry of tables by name.
///
/// Operators resolve their base tables here. The map is ordered so that
/// diagnostics print deterministically.
pub struct StorageManager {
    tables: RwLock<BTreeMap<String, TableRef>>,
}

impl StorageManager {
    const fn new() -> StorageManager {
        StorageManager {
            tables: RwLock::new(BTreeMap::new()),
        }
    }

    /// The singleton instance.
    pub fn get() -> &'static StorageManager {
        static INSTANCE: StorageManager = StorageManager::new();
        &INSTANCE
    }

    pub fn add_table(&self, name: impl Into<String>, table: TableRef) -> StorageResult<()> {
        let name = name.into();
        let mut tables = self.tables.write();
        if tables.contains_key(&name) {
            return Err(StorageError::duplicated("table", name));
        }
        tracing::debug!(name = %name, "table registered");
        tables.insert(name, table);
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> StorageResult<()> {
        self.tables
            .write()
            .remove(name)
            .map(|_| tracing::debug!(name, "table dropped"))
            .ok_or_else(|| StorageError::not_found("table", name))
    }

    pub fn get_table(&self, name: &str) -> StorageResult<TableRef> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::not_found("table", name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    /// One line per table, preceded by a count header.
    pub fn print(&self, out: &mut impl io::Write) -> io::Result<()> {
        let tables = self.tables.read();
        writeln!(out, "{} tables available:", tables.len())?;
        for (name, table) in tables.iter() {
            writeln!(
                out,
                " - \"{}\" [column_count={}, row_count={}, chunk_count={}]",
                name,
                table.column_count(),
                table.row_count(),
                table.chunk_count()
            )?;
        }
        Ok(())
    }

    /// Drop every registered table.
    pub fn reset(&self) {
        self.tables.write().clear();
    }
}

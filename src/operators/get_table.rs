// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use super::{ExecuteError, ExecutionState, Operator};
use crate::storage::{StorageManager, TableRef};

/// Leaf operator resolving a table by name from the [`StorageManager`].
pub struct GetTable {
    name: String,
    state: ExecutionState,
}

impl GetTable {
    pub fn new(name: impl Into<String>) -> GetTable {
        GetTable {
            name: name.into(),
            state: ExecutionState::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.name
    }
}

impl Operator for GetTable {
    fn on_execute(&self) -> Result<TableRef, ExecuteError> {
        Ok(StorageManager::get().get_table(&self.name)?)
    }

    fn state(&self) -> &ExecutionState {
        &self.state
    }
}

// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

//! Physical operators.
//!
//! Operators run synchronously and at most once: `execute` materializes the
//! output table, `get_output` hands it out afterwards. Operators are shared
//! as [`OperatorRef`]s so a downstream operator can read its input's output
//! after the caller has executed the chain front to back.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::storage::{StorageError, TableRef};
use crate::types::ConvertError;

mod get_table;
mod table_scan;

pub use get_table::GetTable;
pub use table_scan::{ScanOp, TableScan};

/// The error type of operator execution.
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("operator has already been executed")]
    AlreadyExecuted,
    #[error("operator is currently executing")]
    Reentrant,
    #[error("operator has not been executed yet")]
    NotExecuted,
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("convert error: {0}")]
    Convert(#[from] ConvertError),
}

/// A physical operator producing a table.
///
/// Implementors provide [`on_execute`](Operator::on_execute); the lifecycle
/// (run-once, reentrancy, output publication) is handled by the provided
/// methods through the operator's [`ExecutionState`].
pub trait Operator: Send + Sync {
    /// Produce the output table. Called exactly once, via
    /// [`execute`](Operator::execute).
    fn on_execute(&self) -> Result<TableRef, ExecuteError>;

    fn state(&self) -> &ExecutionState;

    fn left_input(&self) -> Option<&OperatorRef> {
        None
    }

    fn right_input(&self) -> Option<&OperatorRef> {
        None
    }

    /// Run the operator. Fails if it already ran or is currently running; on
    /// failure of the body no output is published.
    fn execute(&self) -> Result<(), ExecuteError> {
        self.state().begin()?;
        let result = self.on_execute();
        self.state().finish(result)
    }

    /// The output table of a previously successful [`execute`](Operator::execute).
    fn get_output(&self) -> Result<TableRef, ExecuteError> {
        self.state().output()
    }
}

pub type OperatorRef = Arc<dyn Operator>;

enum State {
    Pending,
    Running,
    Done,
}

/// Tracks the run-once lifecycle of an operator and holds its output.
pub struct ExecutionState {
    inner: Mutex<(State, Option<TableRef>)>,
}

impl Default for ExecutionState {
    fn default() -> ExecutionState {
        ExecutionState {
            inner: Mutex::new((State::Pending, None)),
        }
    }
}

impl ExecutionState {
    pub fn new() -> ExecutionState {
        ExecutionState::default()
    }

    fn begin(&self) -> Result<(), ExecuteError> {
        let mut inner = self.inner.lock();
        match inner.0 {
            State::Pending => {
                inner.0 = State::Running;
                Ok(())
            }
            State::Running => Err(ExecuteError::Reentrant),
            State::Done => Err(ExecuteError::AlreadyExecuted),
        }
    }

    fn finish(&self, result: Result<TableRef, ExecuteError>) -> Result<(), ExecuteError> {
        let mut inner = self.inner.lock();
        inner.0 = State::Done;
        match result {
            Ok(output) => {
                inner.1 = Some(output);
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    fn output(&self) -> Result<TableRef, ExecuteError> {
        self.inner
            .lock()
            .1
            .clone()
            .ok_or(ExecuteError::NotExecuted)
    }
}

// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

//! Silica is a chunk-based columnar in-memory table engine.
//!
//! A table is a sequence of fixed-capacity chunks; each chunk holds one
//! segment per column. Freshly appended data lives in mutable value
//! segments, cold chunks are dictionary compressed, and scan results are
//! published as positional reference segments over the base table.

#![deny(unused_must_use)]

pub mod operators;
pub mod storage;
pub mod types;

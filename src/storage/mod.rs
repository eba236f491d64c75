// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

//! The chunked column store.
//!
//! A [`Table`] owns an ordered list of [`Chunk`]s; each chunk holds one
//! segment per column. Segments come in three variants: append-only
//! [`ValueSegment`]s backing fresh data, immutable [`DictionarySegment`]s
//! produced by chunk compression, and [`ReferenceSegment`]s which are
//! positional views published by operators. The [`StorageManager`] is the
//! process-wide table registry.

mod attribute_vector;
mod chunk;
mod dictionary_segment;
mod error;
mod reference_segment;
mod segment;
mod storage_manager;
mod table;
mod value_segment;

pub use attribute_vector::{AttributeVectorImpl, AttributeWidth, FixedWidthAttributeVector};
pub use chunk::{Chunk, ChunkRef};
pub use dictionary_segment::DictionarySegment;
pub use error::{StorageError, StorageResult};
pub use reference_segment::ReferenceSegment;
pub use segment::{DictionarySegmentImpl, SegmentImpl, SegmentRef, ValueSegmentImpl};
pub use storage_manager::StorageManager;
pub use table::{ColumnDefinition, Table, TableRef};
pub use value_segment::ValueSegment;

// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{DictionarySegment, ReferenceSegment, StorageError, StorageResult, ValueSegment};
use crate::types::{dispatch_data_type, ChunkOffset, DataType, DataValue, PrimitiveType, F32, F64};

/// A shared handle on one segment slot of a chunk.
///
/// Value segments are the only variant written after creation, and only by
/// the owning table's append path; everything else is read-only once
/// published.
pub type SegmentRef = Arc<RwLock<SegmentImpl>>;

/// Embeds all segment variants a chunk slot can hold.
pub enum SegmentImpl {
    Value(ValueSegmentImpl),
    Dictionary(DictionarySegmentImpl),
    Reference(ReferenceSegment),
}

/// Embeds the typed value segments.
pub enum ValueSegmentImpl {
    Int32(ValueSegment<i32>),
    Int64(ValueSegment<i64>),
    Float32(ValueSegment<F32>),
    Float64(ValueSegment<F64>),
    Utf8(ValueSegment<String>),
}

/// Embeds the typed dictionary segments.
pub enum DictionarySegmentImpl {
    Int32(DictionarySegment<i32>),
    Int64(DictionarySegment<i64>),
    Float32(DictionarySegment<F32>),
    Float64(DictionarySegment<F64>),
    Utf8(DictionarySegment<String>),
}

macro_rules! impl_segment_conversions {
    ($({ $Variant:ident, $T:ty }),*) => {
        $(
            impl From<ValueSegment<$T>> for ValueSegmentImpl {
                fn from(segment: ValueSegment<$T>) -> Self {
                    Self::$Variant(segment)
                }
            }

            impl From<DictionarySegment<$T>> for DictionarySegmentImpl {
                fn from(segment: DictionarySegment<$T>) -> Self {
                    Self::$Variant(segment)
                }
            }

            impl<'a> TryFrom<&'a ValueSegmentImpl> for &'a ValueSegment<$T> {
                type Error = StorageError;

                fn try_from(segment: &'a ValueSegmentImpl) -> StorageResult<Self> {
                    match segment {
                        ValueSegmentImpl::$Variant(segment) => Ok(segment),
                        _ => Err(StorageError::UnsupportedSegment),
                    }
                }
            }

            impl<'a> TryFrom<&'a DictionarySegmentImpl> for &'a DictionarySegment<$T> {
                type Error = StorageError;

                fn try_from(segment: &'a DictionarySegmentImpl) -> StorageResult<Self> {
                    match segment {
                        DictionarySegmentImpl::$Variant(segment) => Ok(segment),
                        _ => Err(StorageError::UnsupportedSegment),
                    }
                }
            }
        )*
    };
}

impl_segment_conversions! {
    { Int32, i32 },
    { Int64, i64 },
    { Float32, F32 },
    { Float64, F64 },
    { Utf8, String }
}

impl ValueSegmentImpl {
    /// Create an empty value segment for a column of `data_type`.
    pub fn new(data_type: DataType) -> ValueSegmentImpl {
        dispatch_data_type!(data_type, T, { ValueSegment::<T>::new().into() })
    }

    pub fn size(&self) -> ChunkOffset {
        match self {
            Self::Int32(s) => s.size(),
            Self::Int64(s) => s.size(),
            Self::Float32(s) => s.size(),
            Self::Float64(s) => s.size(),
            Self::Utf8(s) => s.size(),
        }
    }

    pub fn get(&self, chunk_offset: ChunkOffset) -> StorageResult<DataValue> {
        match self {
            Self::Int32(s) => s.get(chunk_offset),
            Self::Int64(s) => s.get(chunk_offset),
            Self::Float32(s) => s.get(chunk_offset),
            Self::Float64(s) => s.get(chunk_offset),
            Self::Utf8(s) => s.get(chunk_offset),
        }
    }

    pub fn append(&mut self, value: DataValue) -> StorageResult<()> {
        match self {
            Self::Int32(s) => s.append(value),
            Self::Int64(s) => s.append(value),
            Self::Float32(s) => s.append(value),
            Self::Float64(s) => s.append(value),
            Self::Utf8(s) => s.append(value),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            Self::Int32(s) => s.estimate_memory_usage(),
            Self::Int64(s) => s.estimate_memory_usage(),
            Self::Float32(s) => s.estimate_memory_usage(),
            Self::Float64(s) => s.estimate_memory_usage(),
            Self::Utf8(s) => s.estimate_memory_usage(),
        }
    }
}

impl DictionarySegmentImpl {
    /// Dictionary-encode a value segment of the same element type.
    pub fn encode(segment: &ValueSegmentImpl) -> StorageResult<DictionarySegmentImpl> {
        Ok(match segment {
            ValueSegmentImpl::Int32(s) => DictionarySegment::encode(s)?.into(),
            ValueSegmentImpl::Int64(s) => DictionarySegment::encode(s)?.into(),
            ValueSegmentImpl::Float32(s) => DictionarySegment::encode(s)?.into(),
            ValueSegmentImpl::Float64(s) => DictionarySegment::encode(s)?.into(),
            ValueSegmentImpl::Utf8(s) => DictionarySegment::encode(s)?.into(),
        })
    }

    pub fn size(&self) -> ChunkOffset {
        match self {
            Self::Int32(s) => s.size(),
            Self::Int64(s) => s.size(),
            Self::Float32(s) => s.size(),
            Self::Float64(s) => s.size(),
            Self::Utf8(s) => s.size(),
        }
    }

    pub fn get(&self, chunk_offset: ChunkOffset) -> StorageResult<DataValue> {
        match self {
            Self::Int32(s) => Ok(s.get(chunk_offset)?.clone().into_value()),
            Self::Int64(s) => Ok(s.get(chunk_offset)?.clone().into_value()),
            Self::Float32(s) => Ok(s.get(chunk_offset)?.clone().into_value()),
            Self::Float64(s) => Ok(s.get(chunk_offset)?.clone().into_value()),
            Self::Utf8(s) => Ok(s.get(chunk_offset)?.clone().into_value()),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            Self::Int32(s) => s.estimate_memory_usage(),
            Self::Int64(s) => s.estimate_memory_usage(),
            Self::Float32(s) => s.estimate_memory_usage(),
            Self::Float64(s) => s.estimate_memory_usage(),
            Self::Utf8(s) => s.estimate_memory_usage(),
        }
    }
}

impl SegmentImpl {
    pub fn size(&self) -> ChunkOffset {
        match self {
            SegmentImpl::Value(s) => s.size(),
            SegmentImpl::Dictionary(s) => s.size(),
            SegmentImpl::Reference(s) => s.size(),
        }
    }

    pub fn get(&self, chunk_offset: ChunkOffset) -> StorageResult<DataValue> {
        match self {
            SegmentImpl::Value(s) => s.get(chunk_offset),
            SegmentImpl::Dictionary(s) => s.get(chunk_offset),
            SegmentImpl::Reference(s) => s.get(chunk_offset),
        }
    }

    /// Append to a value segment; encoded and reference segments reject the
    /// write.
    pub fn append(&mut self, value: DataValue) -> StorageResult<()> {
        match self {
            SegmentImpl::Value(s) => s.append(value),
            SegmentImpl::Dictionary(_) => Err(StorageError::Immutable("dictionary")),
            SegmentImpl::Reference(_) => Err(StorageError::Immutable("reference")),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            SegmentImpl::Value(s) => s.estimate_memory_usage(),
            SegmentImpl::Dictionary(s) => s.estimate_memory_usage(),
            SegmentImpl::Reference(s) => s.estimate_memory_usage(),
        }
    }

    /// Wrap into a shared segment handle.
    pub fn into_ref(self) -> SegmentRef {
        Arc::new(RwLock::new(self))
    }
}

impl From<ValueSegmentImpl> for SegmentImpl {
    fn from(segment: ValueSegmentImpl) -> Self {
        SegmentImpl::Value(segment)
    }
}

impl From<DictionarySegmentImpl> for SegmentImpl {
    fn from(segment: DictionarySegmentImpl) -> Self {
        SegmentImpl::Dictionary(segment)
    }
}

impl From<ReferenceSegment> for SegmentImpl {
    fn from(segment: ReferenceSegment) -> Self {
        SegmentImpl::Reference(segment)
    }
}

// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use super::{AttributeVectorImpl, StorageError, StorageResult, ValueSegment};
use crate::types::{
    ChunkOffset, ConvertError, DataValue, PrimitiveType, ValueId, INVALID_VALUE_ID,
};

/// An immutable dictionary-encoded column fragment.
///
/// Values are replaced by indices into a sorted, deduplicated dictionary. The
/// sort order makes range predicates answerable on value ids alone:
/// `lower_bound`/`upper_bound` locate the probe once, and the attribute
/// vector is compared against the resulting ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionarySegment<T: PrimitiveType> {
    dictionary: Vec<T>,
    attribute_vector: AttributeVectorImpl,
}

impl<T: PrimitiveType> DictionarySegment<T> {
    /// Encode a value segment.
    ///
    /// The attribute vector is stored at the narrowest of the supported
    /// widths that can address the last dictionary entry.
    pub fn encode(segment: &ValueSegment<T>) -> StorageResult<DictionarySegment<T>> {
        let mut dictionary = segment.values().to_vec();
        dictionary.sort();
        dictionary.dedup();

        let max_value_id = ValueId::try_from(dictionary.len().saturating_sub(1))
            .map_err(|_| StorageError::TooManyDistinctValues)?;

        let value_ids: Vec<ValueId> = segment
            .values()
            .iter()
            .map(|value| dictionary.partition_point(|entry| entry < value) as ValueId)
            .collect();
        let attribute_vector = AttributeVectorImpl::from_value_ids(&value_ids, max_value_id)?;

        Ok(DictionarySegment {
            dictionary,
            attribute_vector,
        })
    }

    /// The decoded value at `chunk_offset`.
    pub fn get(&self, chunk_offset: ChunkOffset) -> StorageResult<&T> {
        let value_id = self.attribute_vector.get(chunk_offset as usize)?;
        self.value_by_value_id(value_id)
    }

    /// The sorted, deduplicated dictionary.
    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &AttributeVectorImpl {
        &self.attribute_vector
    }

    pub fn value_by_value_id(&self, value_id: ValueId) -> StorageResult<&T> {
        self.dictionary
            .get(value_id as usize)
            .ok_or_else(|| StorageError::out_of_bounds("value id", value_id as usize))
    }

    /// The first value id whose dictionary entry is `>= value`, or
    /// [`INVALID_VALUE_ID`] if every entry is smaller.
    pub fn lower_bound(&self, value: &T) -> ValueId {
        let index = self.dictionary.partition_point(|entry| entry < value);
        if index == self.dictionary.len() {
            INVALID_VALUE_ID
        } else {
            index as ValueId
        }
    }

    /// The first value id whose dictionary entry is `> value`, or
    /// [`INVALID_VALUE_ID`] if every entry is smaller or equal.
    pub fn upper_bound(&self, value: &T) -> ValueId {
        let index = self.dictionary.partition_point(|entry| entry <= value);
        if index == self.dictionary.len() {
            INVALID_VALUE_ID
        } else {
            index as ValueId
        }
    }

    /// Same as [`lower_bound`](Self::lower_bound), but coerces a dynamic
    /// value first.
    pub fn lower_bound_by_value(&self, value: DataValue) -> Result<ValueId, ConvertError> {
        Ok(self.lower_bound(&T::from_value(value)?))
    }

    /// Same as [`upper_bound`](Self::upper_bound), but coerces a dynamic
    /// value first.
    pub fn upper_bound_by_value(&self, value: DataValue) -> Result<ValueId, ConvertError> {
        Ok(self.upper_bound(&T::from_value(value)?))
    }

    /// Number of dictionary entries.
    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn size(&self) -> ChunkOffset {
        self.attribute_vector.size() as ChunkOffset
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.dictionary.capacity() * std::mem::size_of::<T>()
            + self.attribute_vector.estimate_memory_usage()
    }
}

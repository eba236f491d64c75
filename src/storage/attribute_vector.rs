// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use super::{StorageError, StorageResult};
use crate::types::ValueId;

/// An unsigned integer width an attribute vector can be stored at.
pub trait AttributeWidth:
    Copy + Default + TryFrom<ValueId> + Into<ValueId> + Send + Sync + 'static
{
}

impl AttributeWidth for u8 {}
impl AttributeWidth for u16 {}
impl AttributeWidth for u32 {}

/// Value ids stored at a fixed element width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWidthAttributeVector<W: AttributeWidth> {
    ids: Vec<W>,
}

impl<W: AttributeWidth> FixedWidthAttributeVector<W> {
    fn from_value_ids(value_ids: &[ValueId]) -> StorageResult<Self> {
        let mut ids = Vec::with_capacity(value_ids.len());
        for &value_id in value_ids {
            ids.push(Self::narrow(value_id)?);
        }
        Ok(FixedWidthAttributeVector { ids })
    }

    fn narrow(value_id: ValueId) -> StorageResult<W> {
        W::try_from(value_id)
            .map_err(|_| StorageError::ValueIdOverflow(value_id, std::mem::size_of::<W>()))
    }

    fn get(&self, index: usize) -> StorageResult<ValueId> {
        self.ids
            .get(index)
            .map(|&id| id.into())
            .ok_or_else(|| StorageError::out_of_bounds("attribute vector index", index))
    }

    fn set(&mut self, index: usize, value_id: ValueId) -> StorageResult<()> {
        let narrowed = Self::narrow(value_id)?;
        match self.ids.get_mut(index) {
            Some(slot) => {
                *slot = narrowed;
                Ok(())
            }
            None => Err(StorageError::out_of_bounds("attribute vector index", index)),
        }
    }

    fn estimate_memory_usage(&self) -> usize {
        self.ids.capacity() * std::mem::size_of::<W>()
    }
}

/// An attribute vector at one of the three supported widths.
///
/// The width is fixed at construction time to the narrowest element that can
/// hold the largest value id; it is never resized afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeVectorImpl {
    Width8(FixedWidthAttributeVector<u8>),
    Width16(FixedWidthAttributeVector<u16>),
    Width32(FixedWidthAttributeVector<u32>),
}

impl AttributeVectorImpl {
    /// Store `value_ids` at the narrowest width that fits `max_value_id`.
    pub fn from_value_ids(value_ids: &[ValueId], max_value_id: ValueId) -> StorageResult<Self> {
        let vector = if max_value_id <= u8::MAX as ValueId {
            AttributeVectorImpl::Width8(FixedWidthAttributeVector::from_value_ids(value_ids)?)
        } else if max_value_id <= u16::MAX as ValueId {
            AttributeVectorImpl::Width16(FixedWidthAttributeVector::from_value_ids(value_ids)?)
        } else {
            AttributeVectorImpl::Width32(FixedWidthAttributeVector::from_value_ids(value_ids)?)
        };
        Ok(vector)
    }

    pub fn get(&self, index: usize) -> StorageResult<ValueId> {
        match self {
            AttributeVectorImpl::Width8(v) => v.get(index),
            AttributeVectorImpl::Width16(v) => v.get(index),
            AttributeVectorImpl::Width32(v) => v.get(index),
        }
    }

    pub fn set(&mut self, index: usize, value_id: ValueId) -> StorageResult<()> {
        match self {
            AttributeVectorImpl::Width8(v) => v.set(index, value_id),
            AttributeVectorImpl::Width16(v) => v.set(index, value_id),
            AttributeVectorImpl::Width32(v) => v.set(index, value_id),
        }
    }

    /// Element width in bytes: 1, 2 or 4.
    pub fn width(&self) -> usize {
        match self {
            AttributeVectorImpl::Width8(_) => 1,
            AttributeVectorImpl::Width16(_) => 2,
            AttributeVectorImpl::Width32(_) => 4,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            AttributeVectorImpl::Width8(v) => v.ids.len(),
            AttributeVectorImpl::Width16(v) => v.ids.len(),
            AttributeVectorImpl::Width32(v) => v.ids.len(),
        }
    }

    /// Iterate all value ids widened back to [`ValueId`].
    pub fn iter(&self) -> impl Iterator<Item = ValueId> + '_ {
        (0..self.size()).map(move |i| match self {
            AttributeVectorImpl::Width8(v) => v.ids[i].into(),
            AttributeVectorImpl::Width16(v) => v.ids[i].into(),
            AttributeVectorImpl::Width32(v) => v.ids[i].into(),
        })
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            AttributeVectorImpl::Width8(v) => v.estimate_memory_usage(),
            AttributeVectorImpl::Width16(v) => v.estimate_memory_usage(),
            AttributeVectorImpl::Width32(v) => v.estimate_memory_usage(),
        }
    }
}

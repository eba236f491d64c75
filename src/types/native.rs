// Copyright 2024 Silica Project Authors. Licensed under Apache-2.0.

use std::fmt::Debug;

use super::{ConvertError, DataType, DataValue, F32, F64};

/// A native Rust type that a segment can be parameterized over.
///
/// Implemented exactly once per [`DataType`] member. `from_value` applies the
/// engine's coercion rules: widening between numeric types of the same family
/// is accepted (`int` to `long`, `float` to `double`), narrowing is accepted
/// only when it loses no information, and everything else fails with
/// [`ConvertError::TypeMismatch`]. Strings never convert to numerics and vice
/// versa.
pub trait PrimitiveType:
    Clone + Ord + Debug + Default + Send + Sync + 'static
{
    const DATA_TYPE: DataType;

    fn from_value(value: DataValue) -> Result<Self, ConvertError>;

    fn into_value(self) -> DataValue;
}

impl PrimitiveType for i32 {
    const DATA_TYPE: DataType = DataType::Int32;

    fn from_value(value: DataValue) -> Result<i32, ConvertError> {
        match value {
            DataValue::Int32(v) => Ok(v),
            DataValue::Int64(v) => {
                i32::try_from(v).map_err(|_| mismatch::<i32>(DataValue::Int64(v)))
            }
            v => Err(mismatch::<i32>(v)),
        }
    }

    fn into_value(self) -> DataValue {
        DataValue::Int32(self)
    }
}

impl PrimitiveType for i64 {
    const DATA_TYPE: DataType = DataType::Int64;

    fn from_value(value: DataValue) -> Result<i64, ConvertError> {
        match value {
            DataValue::Int32(v) => Ok(v as i64),
            DataValue::Int64(v) => Ok(v),
            v => Err(mismatch::<i64>(v)),
        }
    }

    fn into_value(self) -> DataValue {
        DataValue::Int64(self)
    }
}

impl PrimitiveType for F32 {
    const DATA_TYPE: DataType = DataType::Float32;

    fn from_value(value: DataValue) -> Result<F32, ConvertError> {
        match value {
            DataValue::Float32(v) => Ok(v),
            DataValue::Float64(v) => {
                let narrowed = v.into_inner() as f32;
                if narrowed as f64 == v.into_inner() {
                    Ok(narrowed.into())
                } else {
                    Err(mismatch::<F32>(DataValue::Float64(v)))
                }
            }
            v => Err(mismatch::<F32>(v)),
        }
    }

    fn into_value(self) -> DataValue {
        DataValue::Float32(self)
    }
}

impl PrimitiveType for F64 {
    const DATA_TYPE: DataType = DataType::Float64;

    fn from_value(value: DataValue) -> Result<F64, ConvertError> {
        match value {
            DataValue::Float32(v) => Ok(F64::from(v.into_inner() as f64)),
            DataValue::Float64(v) => Ok(v),
            v => Err(mismatch::<F64>(v)),
        }
    }

    fn into_value(self) -> DataValue {
        DataValue::Float64(self)
    }
}

impl PrimitiveType for String {
    const DATA_TYPE: DataType = DataType::String;

    fn from_value(value: DataValue) -> Result<String, ConvertError> {
        match value {
            DataValue::String(v) => Ok(v),
            v => Err(mismatch::<String>(v)),
        }
    }

    fn into_value(self) -> DataValue {
        DataValue::String(self)
    }
}

fn mismatch<T: PrimitiveType>(value: DataValue) -> ConvertError {
    ConvertError::TypeMismatch(value, T::DATA_TYPE)
}

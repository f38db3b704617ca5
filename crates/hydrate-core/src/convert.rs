use crate::{row::SourceType, Error, Result, Value};

use std::fmt::Debug;

/// Type-conversion collaborator consulted for every column read.
///
/// `has_converter` answers whether a (destination, source) pair is worth
/// attempting; automatic mapping and automatic constructor matching use it
/// to qualify candidates before any value is read.
pub trait ConverterRegistry: Debug + Send + Sync + 'static {
    fn has_converter(&self, destination: SourceType, source: SourceType) -> bool;

    /// Converts a natural column value to the destination type. A `None`
    /// destination is the unknown-type fallback: the natural value passes
    /// through unchanged.
    fn convert(&self, value: Value, destination: Option<SourceType>) -> Result<Value>;
}

/// Built-in conversions among the scalar types.
#[derive(Debug, Default)]
pub struct DefaultConverters;

impl ConverterRegistry for DefaultConverters {
    fn has_converter(&self, destination: SourceType, source: SourceType) -> bool {
        use SourceType::*;

        if source == Unknown || destination == Unknown {
            return true;
        }
        match destination {
            Bool => matches!(source, Bool),
            I32 => matches!(source, I32 | I64),
            I64 => matches!(source, I32 | I64),
            F64 => matches!(source, F64 | I32 | I64),
            String => matches!(source, String | Bool | I32 | I64 | F64),
            Bytes => matches!(source, Bytes | String),
            Object => matches!(source, Object),
            List => matches!(source, List),
            Unknown => true,
        }
    }

    fn convert(&self, value: Value, destination: Option<SourceType>) -> Result<Value> {
        use SourceType::*;

        let Some(destination) = destination else {
            return Ok(value);
        };
        if value.is_null() {
            return Ok(Value::Null);
        }
        match (destination, value) {
            (Unknown, value) => Ok(value),
            (Bool, Value::Bool(v)) => Ok(Value::Bool(v)),
            (I32, Value::I32(v)) => Ok(Value::I32(v)),
            (I32, Value::I64(v)) => match i32::try_from(v) {
                Ok(v) => Ok(Value::I32(v)),
                Err(_) => Err(Error::type_conversion(Value::I64(v), "i32")),
            },
            (I64, value @ (Value::I32(_) | Value::I64(_))) => Ok(Value::I64(value.to_i64()?)),
            (F64, Value::F64(v)) => Ok(Value::F64(v)),
            (F64, Value::I32(v)) => Ok(Value::F64(v.into())),
            (F64, Value::I64(v)) => Ok(Value::F64(v as f64)),
            (String, Value::String(v)) => Ok(Value::String(v)),
            (String, value) => match value.to_text() {
                Some(text) => Ok(Value::String(text)),
                None => Err(Error::type_conversion(value, "String")),
            },
            (Bytes, Value::Bytes(v)) => Ok(Value::Bytes(v)),
            (Bytes, Value::String(v)) => Ok(Value::Bytes(v.into_bytes())),
            (Object, value @ Value::Object(_)) => Ok(value),
            (List, value @ Value::List(_)) => Ok(value),
            (_, value) => Err(Error::type_conversion(value, type_name(destination))),
        }
    }
}

fn type_name(ty: SourceType) -> &'static str {
    use SourceType::*;

    match ty {
        Bool => "bool",
        Bytes => "bytes",
        F64 => "f64",
        I32 => "i32",
        I64 => "i64",
        String => "String",
        Object => "object",
        List => "list",
        Unknown => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_destination_passes_through() {
        let registry = DefaultConverters;
        let value = Value::from("raw");
        assert_eq!(registry.convert(value.clone(), None).unwrap(), value);
    }

    #[test]
    fn null_converts_to_null() {
        let registry = DefaultConverters;
        assert!(registry
            .convert(Value::Null, Some(SourceType::I64))
            .unwrap()
            .is_null());
    }

    #[test]
    fn narrowing_overflow_is_an_error() {
        let registry = DefaultConverters;
        let err = registry
            .convert(Value::I64(i64::MAX), Some(SourceType::I32))
            .unwrap_err();
        assert!(err.is_type_conversion());
    }
}

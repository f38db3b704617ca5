mod lazy;
pub use lazy::Lazy;

use crate::{graph::ObjectId, Error, Result};

use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// A dynamically typed value flowing through materialization.
///
/// Values are produced by column conversion, bound into instance properties,
/// and used as linking keys between result sets. Equality and hashing are
/// total: floats compare by bit pattern and unresolved deferred slots compare
/// by cell identity.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Raw byte payload
    Bytes(Vec<u8>),

    /// A lazily loaded value; resolves on first read
    Deferred(Lazy),

    /// 64-bit float
    F64(f64),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// A list of values
    List(Vec<Value>),

    /// String-keyed fields, used for generic map destinations and composite
    /// sub-query parameters
    Map(IndexMap<String, Value>),

    /// Null value
    #[default]
    Null,

    /// Handle to a materialized instance in the statement's object graph
    Object(ObjectId),

    /// String value
    String(String),
}

impl Value {
    /// Returns a `Value` representing null
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(&**v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_bool(self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "bool")),
        }
    }

    pub fn to_i32(self) -> Result<i32> {
        match self {
            Self::I32(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "i32")),
        }
    }

    pub fn to_i64(self) -> Result<i64> {
        match self {
            Self::I64(v) => Ok(v),
            Self::I32(v) => Ok(v.into()),
            _ => Err(Error::type_conversion(self, "i64")),
        }
    }

    pub fn to_string_value(self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "String")),
        }
    }

    #[track_caller]
    pub fn expect_object(&self) -> ObjectId {
        match self {
            Self::Object(id) => *id,
            _ => panic!("expected Value::Object; value={self:#?}"),
        }
    }

    #[track_caller]
    pub fn expect_list(&self) -> &[Value] {
        match self {
            Self::List(items) => items,
            _ => panic!("expected Value::List; value={self:#?}"),
        }
    }

    #[track_caller]
    pub fn expect_list_mut(&mut self) -> &mut Vec<Value> {
        match self {
            Self::List(items) => items,
            _ => panic!("expected Value::List; value={self:#?}"),
        }
    }

    /// Renders the value as the text form used for string-keyed linking and
    /// discriminator case lookup. Returns `None` for null and for values
    /// with no scalar text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::Bytes(v) => Some(String::from_utf8_lossy(v).into_owned()),
            Self::F64(v) => Some(v.to_string()),
            Self::I32(v) => Some(v.to_string()),
            Self::I64(v) => Some(v.to_string()),
            Self::String(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Takes the value, leaving `Null` in its place.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Deferred(a), Deferred(b)) => a == b,
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Null, Null) => true,
            (Object(a), Object(b)) => a == b,
            (String(a), String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use Value::*;

        core::mem::discriminant(self).hash(state);
        match self {
            Bool(v) => v.hash(state),
            Bytes(v) => v.hash(state),
            Deferred(v) => v.hash(state),
            F64(v) => v.to_bits().hash(state),
            I32(v) => v.hash(state),
            I64(v) => v.hash(state),
            List(v) => v.hash(state),
            // Map equality is order-insensitive, so only the length can
            // safely contribute here.
            Map(v) => v.len().hash(state),
            Null => {}
            Object(v) => v.hash(state),
            String(v) => v.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Value {
        Value::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Value {
        Value::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Value {
        Value::I64(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Value {
        Value::F64(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Value {
        Value::String(src.to_string())
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Value {
        Value::String(src.clone())
    }
}

impl From<String> for Value {
    fn from(src: String) -> Value {
        Value::String(src)
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Value {
        Value::Bytes(src)
    }
}

impl From<Vec<Value>> for Value {
    fn from(src: Vec<Value>) -> Value {
        Value::List(src)
    }
}

impl From<ObjectId> for Value {
    fn from(src: ObjectId) -> Value {
        Value::Object(src)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(src: Option<T>) -> Value {
        match src {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

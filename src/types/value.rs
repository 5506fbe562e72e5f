//! MessagePack value model.

use std::fmt;

/// An application-defined extension blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ext {
    /// Application type identifier.
    pub type_id: i8,
    pub data: Vec<u8>,
}

impl Ext {
    pub fn new(type_id: i8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            type_id,
            data: data.into(),
        }
    }
}

/// A single MessagePack item as it appears on the wire.
///
/// Arrays and maps are represented by their headers only; the elements that
/// follow are separate items.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float32(f32),
    Float64(f64),
    Bytes(Vec<u8>),
    Str(String),
    ArrayLength(u32),
    MapLength(u32),
    Ext(Ext),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the value as a string reference, if it is a `Str` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Int` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns either float width as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(f) => Some(f64::from(*f)),
            Self::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float32(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<Ext> for Value {
    fn from(e: Ext) -> Self {
        Self::Ext(e)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Nil, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float32(v) => write!(f, "{v}f32"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::ArrayLength(n) => write!(f, "array({n})"),
            Self::MapLength(n) => write!(f, "map({n})"),
            Self::Ext(e) => write!(f, "ext({}, <{} bytes>)", e.type_id, e.data.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_becomes_nil() {
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Int(5).as_int(), Some(5));
        assert_eq!(Value::Str("a".into()).as_int(), None);
        assert_eq!(Value::Float32(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Bytes(vec![1]).as_bytes(), Some(&[1u8][..]));
        assert!(Value::Nil.is_nil());
    }

    #[test]
    fn display() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Str("hi".into()).to_string(), "\"hi\"");
        assert_eq!(Value::ArrayLength(3).to_string(), "array(3)");
        assert_eq!(Value::Ext(Ext::new(-1, vec![0; 4])).to_string(), "ext(-1, <4 bytes>)");
    }
}

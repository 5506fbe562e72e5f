//! Error types for MessagePack encoding and decoding.

use crate::msgpack::marker::Category;

/// Errors that can occur while encoding or decoding MessagePack data.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("buffer overflow: need {needed} bytes at position {position}, capacity is {capacity}")]
    BufferOverflow {
        position: usize,
        needed: usize,
        capacity: usize,
    },

    #[error("unknown type tag: 0x{0:02X}")]
    UnknownType(u8),

    #[error("type mismatch: expected {expected}, found tag 0x{found:02X}")]
    TypeMismatch { expected: Category, found: u8 },

    #[error("integer {value} does not fit in {target}")]
    IntegerOverflow { value: i128, target: &'static str },

    #[error("invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("length {0} exceeds the 32-bit length prefix")]
    LengthOverflow(usize),

    #[error("range {offset}+{len} is outside a source of {available} bytes")]
    InvalidRange {
        offset: usize,
        len: usize,
        available: usize,
    },
}

impl CodecError {
    /// Builds a mismatch error for a recognized tag, or `UnknownType` when the
    /// tag belongs to no category at all.
    pub fn unexpected(tag: u8, expected: Category) -> Self {
        match crate::msgpack::marker::classify(tag) {
            Some(_) => Self::TypeMismatch {
                expected,
                found: tag,
            },
            None => Self::UnknownType(tag),
        }
    }

    /// Returns the offending tag byte for decode failures.
    pub fn tag(&self) -> Option<u8> {
        match self {
            Self::UnknownType(tag) => Some(*tag),
            Self::TypeMismatch { found, .. } => Some(*found),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_recognized_tag_is_mismatch() {
        let err = CodecError::unexpected(0xCC, Category::Boolean);
        assert!(matches!(
            err,
            CodecError::TypeMismatch {
                expected: Category::Boolean,
                found: 0xCC
            }
        ));
        assert_eq!(err.tag(), Some(0xCC));
    }

    #[test]
    fn unexpected_unrecognized_tag_is_unknown() {
        let err = CodecError::unexpected(0xC1, Category::Integer);
        assert!(matches!(err, CodecError::UnknownType(0xC1)));
    }

    #[test]
    fn display_names_tag_and_category() {
        let err = CodecError::TypeMismatch {
            expected: Category::String,
            found: 0x93,
        };
        assert_eq!(err.to_string(), "type mismatch: expected string, found tag 0x93");
    }
}

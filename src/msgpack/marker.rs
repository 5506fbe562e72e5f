//! MessagePack tag byte constants and classification.

use std::fmt;

// Nil
pub const NIL: u8 = 0xC0;

// Boolean
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

// Binary
pub const BIN_8: u8 = 0xC4;
pub const BIN_16: u8 = 0xC5;
pub const BIN_32: u8 = 0xC6;

// Extension (explicit length)
pub const EXT_8: u8 = 0xC7;
pub const EXT_16: u8 = 0xC8;
pub const EXT_32: u8 = 0xC9;

// Float (IEEE 754)
pub const FLOAT_32: u8 = 0xCA;
pub const FLOAT_64: u8 = 0xCB;

// Unsigned integer
pub const UINT_8: u8 = 0xCC;
pub const UINT_16: u8 = 0xCD;
pub const UINT_32: u8 = 0xCE;
pub const UINT_64: u8 = 0xCF;

// Signed integer
pub const INT_8: u8 = 0xD0;
pub const INT_16: u8 = 0xD1;
pub const INT_32: u8 = 0xD2;
pub const INT_64: u8 = 0xD3;

// Extension (fixed length)
pub const FIXEXT_1: u8 = 0xD4;
pub const FIXEXT_2: u8 = 0xD5;
pub const FIXEXT_4: u8 = 0xD6;
pub const FIXEXT_8: u8 = 0xD7;
pub const FIXEXT_16: u8 = 0xD8;

// String (str8 0xD9 is not recognized)
// FIXSTR: 0xA0..=0xBF (high bits 101, low 5 bits = byte length 0..31)
pub const STR_16: u8 = 0xDA;
pub const STR_32: u8 = 0xDB;

// Array
// FIXARRAY: 0x90..=0x9F (high nibble 0x9, low = element count 0..15)
pub const ARRAY_16: u8 = 0xDC;
pub const ARRAY_32: u8 = 0xDD;

// Map
// FIXMAP: 0x80..=0x8F (high nibble 0x8, low = pair count 0..15)
pub const MAP_16: u8 = 0xDE;
pub const MAP_32: u8 = 0xDF;

// Fixnum: 0x00..=0x7F positive (0..127), 0xE0..=0xFF negative (-32..-1)
pub const NEGATIVE_FIXNUM_PREFIX: u8 = 0xE0;

// Prefixes and masks for inline-length types.
pub const FIXSTR_PREFIX: u8 = 0xA0;
pub const FIXARRAY_PREFIX: u8 = 0x90;
pub const FIXMAP_PREFIX: u8 = 0x80;
pub const FIXSTR_MASK: u8 = 0x1F;
pub const FIXCOLLECTION_MASK: u8 = 0x0F;

/// Largest length that still fits a fixstr tag.
pub const FIXSTR_MAX: usize = 31;
/// Largest element count that still fits a fixarray or fixmap tag.
pub const FIXCOLLECTION_MAX: usize = 15;

/// Value category a tag byte belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Binary,
    Array,
    Map,
    Ext,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Array => "array",
            Self::Map => "map",
            Self::Ext => "ext",
        };
        f.write_str(name)
    }
}

/// Classifies a tag byte, or returns `None` for bytes this codec does not
/// recognize (0xC1 and str8).
pub fn classify(tag: u8) -> Option<Category> {
    let category = match tag {
        0x00..=0x7F | 0xE0..=0xFF => Category::Integer,
        0x80..=0x8F => Category::Map,
        0x90..=0x9F => Category::Array,
        0xA0..=0xBF => Category::String,
        NIL => Category::Nil,
        FALSE | TRUE => Category::Boolean,
        BIN_8 | BIN_16 | BIN_32 => Category::Binary,
        EXT_8 | EXT_16 | EXT_32 => Category::Ext,
        FLOAT_32 | FLOAT_64 => Category::Float,
        UINT_8..=INT_64 => Category::Integer,
        FIXEXT_1..=FIXEXT_16 => Category::Ext,
        STR_16 | STR_32 => Category::String,
        ARRAY_16 | ARRAY_32 => Category::Array,
        MAP_16 | MAP_32 => Category::Map,
        _ => return None,
    };
    Some(category)
}

pub fn is_positive_fixnum(tag: u8) -> bool {
    tag & 0x80 == 0
}

pub fn is_negative_fixnum(tag: u8) -> bool {
    tag & 0xE0 == NEGATIVE_FIXNUM_PREFIX
}

pub fn is_fixstr(tag: u8) -> bool {
    tag & 0xE0 == FIXSTR_PREFIX
}

pub fn is_fixarray(tag: u8) -> bool {
    tag & 0xF0 == FIXARRAY_PREFIX
}

pub fn is_fixmap(tag: u8) -> bool {
    tag & 0xF0 == FIXMAP_PREFIX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_every_range() {
        assert_eq!(classify(0x00), Some(Category::Integer));
        assert_eq!(classify(0x7F), Some(Category::Integer));
        assert_eq!(classify(0x80), Some(Category::Map));
        assert_eq!(classify(0x9F), Some(Category::Array));
        assert_eq!(classify(0xA0), Some(Category::String));
        assert_eq!(classify(0xBF), Some(Category::String));
        assert_eq!(classify(0xC0), Some(Category::Nil));
        assert_eq!(classify(0xC2), Some(Category::Boolean));
        assert_eq!(classify(0xC6), Some(Category::Binary));
        assert_eq!(classify(0xC8), Some(Category::Ext));
        assert_eq!(classify(0xCA), Some(Category::Float));
        assert_eq!(classify(0xCF), Some(Category::Integer));
        assert_eq!(classify(0xD3), Some(Category::Integer));
        assert_eq!(classify(0xD8), Some(Category::Ext));
        assert_eq!(classify(0xDB), Some(Category::String));
        assert_eq!(classify(0xDD), Some(Category::Array));
        assert_eq!(classify(0xDF), Some(Category::Map));
        assert_eq!(classify(0xE0), Some(Category::Integer));
        assert_eq!(classify(0xFF), Some(Category::Integer));
    }

    #[test]
    fn unrecognized_tags() {
        assert_eq!(classify(0xC1), None);
        assert_eq!(classify(0xD9), None);
    }

    #[test]
    fn inline_predicates() {
        assert!(is_positive_fixnum(0x7F));
        assert!(!is_positive_fixnum(0x80));
        assert!(is_negative_fixnum(0xE0));
        assert!(!is_negative_fixnum(0xDF));
        assert!(is_fixstr(0xBF));
        assert!(!is_fixstr(0xC0));
        assert!(is_fixarray(0x90));
        assert!(!is_fixarray(0xA0));
        assert!(is_fixmap(0x8F));
        assert!(!is_fixmap(0x90));
    }
}

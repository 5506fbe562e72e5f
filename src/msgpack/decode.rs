//! MessagePack decoding: bytes → typed values.

use std::collections::HashMap;

use super::marker::{self, Category};
use crate::buffer::Buffer;
use crate::error::CodecError;
use crate::types::{Ext, Value};

/// Reads MessagePack items from a borrowed [`Buffer`].
///
/// Every typed read returns `Ok(None)` when the next item is nil.
pub struct Decoder<'a> {
    buf: &'a mut Buffer,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a mut Buffer) -> Self {
        Self { buf }
    }

    /// Rewinds the read cursor to the start of the buffer.
    pub fn reset(&mut self) {
        self.buf.reset();
    }

    pub fn position(&self) -> usize {
        self.buf.position()
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.buf.remaining() == 0
    }

    /// Classifies the next item without consuming it.
    pub fn peek_category(&self) -> Result<Category, CodecError> {
        let tag = self.buf.peek_u8()?;
        marker::classify(tag).ok_or(CodecError::UnknownType(tag))
    }

    /// Decodes the next item of any category. Arrays and maps yield only
    /// their header; the elements are read by further calls.
    pub fn read_value(&mut self) -> Result<Value, CodecError> {
        let value = match self.peek_category()? {
            Category::Nil => {
                self.buf.get_u8()?;
                Value::Nil
            }
            Category::Boolean => self.read_boolean()?.map_or(Value::Nil, Value::Bool),
            Category::Integer => self.read_long()?.map_or(Value::Nil, Value::Int),
            Category::Float => {
                if self.buf.peek_u8()? == marker::FLOAT_32 {
                    self.read_float()?.map_or(Value::Nil, Value::Float32)
                } else {
                    self.read_double()?.map_or(Value::Nil, Value::Float64)
                }
            }
            Category::String => self.read_string()?.map_or(Value::Nil, Value::Str),
            Category::Binary => self.read_byte_array()?.map_or(Value::Nil, Value::Bytes),
            Category::Array => self.read_list_begin()?.map_or(Value::Nil, Value::ArrayLength),
            Category::Map => self.read_map_begin()?.map_or(Value::Nil, Value::MapLength),
            Category::Ext => self.read_ext_data()?.map_or(Value::Nil, Value::Ext),
        };
        Ok(value)
    }

    pub fn read_boolean(&mut self) -> Result<Option<bool>, CodecError> {
        match self.buf.get_u8()? {
            marker::NIL => Ok(None),
            marker::TRUE => Ok(Some(true)),
            marker::FALSE => Ok(Some(false)),
            other => Err(mismatch(other, Category::Boolean)),
        }
    }

    /// Reads an integer that must fit in 32 signed bits.
    ///
    /// A 64-bit item fails with [`CodecError::IntegerOverflow`] and is left
    /// unconsumed.
    pub fn read_integer(&mut self) -> Result<Option<i32>, CodecError> {
        let tag = self.buf.get_u8()?;
        if tag == marker::NIL {
            return Ok(None);
        }
        let value = self.decode_int_body(tag)?;
        i32::try_from(value)
            .map(Some)
            .map_err(|_| CodecError::IntegerOverflow {
                value: i128::from(value),
                target: "i32",
            })
    }

    /// Reads an integer of up to 64 bits.
    ///
    /// Only the 64-bit tags are handled here; every narrower encoding is shared
    /// with [`read_integer`](Self::read_integer), so the tag is unread and the
    /// common path decodes it.
    pub fn read_long(&mut self) -> Result<Option<i64>, CodecError> {
        let tag = self.buf.get_u8()?;
        match tag {
            marker::NIL => Ok(None),
            // uint64 above i64::MAX comes back as its two's-complement pattern.
            marker::INT_64 | marker::UINT_64 => Ok(Some(self.buf.get_u64()? as i64)),
            _ => {
                self.buf.unread(1);
                self.read_small_int()
            }
        }
    }

    /// Reads an integer widened to 128 bits. The widening adds no range: the
    /// wire format tops out at 64 bits, and uint64 values with the top bit set
    /// arrive negative (reinterpret with `as u64` when needed).
    pub fn read_big_integer(&mut self) -> Result<Option<i128>, CodecError> {
        Ok(self.read_long()?.map(i128::from))
    }

    pub fn read_float(&mut self) -> Result<Option<f32>, CodecError> {
        match self.buf.get_u8()? {
            marker::NIL => Ok(None),
            marker::FLOAT_32 => Ok(Some(f32::from_bits(self.buf.get_u32()?))),
            other => Err(mismatch(other, Category::Float)),
        }
    }

    /// Reads a double; a float32 item is widened.
    pub fn read_double(&mut self) -> Result<Option<f64>, CodecError> {
        match self.buf.get_u8()? {
            marker::NIL => Ok(None),
            marker::FLOAT_64 => Ok(Some(f64::from_bits(self.buf.get_u64()?))),
            marker::FLOAT_32 => Ok(Some(f64::from(f32::from_bits(self.buf.get_u32()?)))),
            other => Err(mismatch(other, Category::Float)),
        }
    }

    pub fn read_string(&mut self) -> Result<Option<String>, CodecError> {
        let tag = self.buf.get_u8()?;
        if tag == marker::NIL {
            return Ok(None);
        }
        let len = match self.str_len(tag)? {
            Some(len) => len,
            None => return Err(mismatch(tag, Category::String)),
        };
        let data = self.buf.get_vec(len)?;
        Ok(Some(String::from_utf8(data)?))
    }

    /// Reads a byte array tagged with either the bin or the str family.
    pub fn read_byte_array(&mut self) -> Result<Option<Vec<u8>>, CodecError> {
        let tag = self.buf.get_u8()?;
        if tag == marker::NIL {
            return Ok(None);
        }
        let len = match tag {
            marker::BIN_8 => usize::from(self.buf.get_u8()?),
            marker::BIN_16 => usize::from(self.buf.get_u16()?),
            marker::BIN_32 => self.buf.get_u32()? as usize,
            _ => match self.str_len(tag)? {
                Some(len) => len,
                None => return Err(mismatch(tag, Category::Binary)),
            },
        };
        Ok(Some(self.buf.get_vec(len)?))
    }

    /// Reads an array header and returns its element count.
    pub fn read_list_begin(&mut self) -> Result<Option<u32>, CodecError> {
        let tag = self.buf.get_u8()?;
        match tag {
            marker::NIL => Ok(None),
            marker::ARRAY_16 => Ok(Some(u32::from(self.buf.get_u16()?))),
            marker::ARRAY_32 => Ok(Some(self.buf.get_u32()?)),
            _ if marker::is_fixarray(tag) => Ok(Some(u32::from(tag & marker::FIXCOLLECTION_MASK))),
            _ => Err(mismatch(tag, Category::Array)),
        }
    }

    /// Reads a map header and returns its pair count (not doubled).
    pub fn read_map_begin(&mut self) -> Result<Option<u32>, CodecError> {
        let tag = self.buf.get_u8()?;
        match tag {
            marker::NIL => Ok(None),
            marker::MAP_16 => Ok(Some(u32::from(self.buf.get_u16()?))),
            marker::MAP_32 => Ok(Some(self.buf.get_u32()?)),
            _ if marker::is_fixmap(tag) => Ok(Some(u32::from(tag & marker::FIXCOLLECTION_MASK))),
            _ => Err(mismatch(tag, Category::Map)),
        }
    }

    /// Reads a list of strings; nil elements come back as `None`.
    pub fn read_string_list(&mut self) -> Result<Option<Vec<Option<String>>>, CodecError> {
        let Some(len) = self.read_list_begin()? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(capacity_hint(len, self.buf.remaining()));
        for _ in 0..len {
            items.push(self.read_string()?);
        }
        Ok(Some(items))
    }

    /// Reads a map of strings. Values may be nil; keys may not. Key order on
    /// the wire is not preserved.
    pub fn read_string_map(
        &mut self,
    ) -> Result<Option<HashMap<String, Option<String>>>, CodecError> {
        let Some(len) = self.read_map_begin()? else {
            return Ok(None);
        };
        let mut map = HashMap::with_capacity(capacity_hint(len, self.buf.remaining() / 2));
        for _ in 0..len {
            let key = self.require_string()?;
            let value = self.read_string()?;
            map.insert(key, value);
        }
        Ok(Some(map))
    }

    pub fn read_ext_data(&mut self) -> Result<Option<Ext>, CodecError> {
        let tag = self.buf.get_u8()?;
        let len = match tag {
            marker::NIL => return Ok(None),
            marker::FIXEXT_1 => 1,
            marker::FIXEXT_2 => 2,
            marker::FIXEXT_4 => 4,
            marker::FIXEXT_8 => 8,
            marker::FIXEXT_16 => 16,
            marker::EXT_8 => usize::from(self.buf.get_u8()?),
            marker::EXT_16 => usize::from(self.buf.get_u16()?),
            marker::EXT_32 => self.buf.get_u32()? as usize,
            other => return Err(mismatch(other, Category::Ext)),
        };
        let type_id = self.buf.get_u8()? as i8;
        let data = self.buf.get_vec(len)?;
        Ok(Some(Ext { type_id, data }))
    }

    // -- Internals --

    /// Reads a tag and decodes any integer encoding narrower than 64 bits.
    fn read_small_int(&mut self) -> Result<Option<i64>, CodecError> {
        let tag = self.buf.get_u8()?;
        if tag == marker::NIL {
            return Ok(None);
        }
        self.decode_int_body(tag).map(Some)
    }

    fn decode_int_body(&mut self, tag: u8) -> Result<i64, CodecError> {
        if marker::is_positive_fixnum(tag) {
            return Ok(i64::from(tag & 0x7F));
        }
        if marker::is_negative_fixnum(tag) {
            return Ok(i64::from(tag & 0x1F) - 32);
        }
        let value = match tag {
            marker::INT_8 => i64::from(self.buf.get_u8()? as i8),
            marker::INT_16 => i64::from(self.buf.get_u16()? as i16),
            marker::INT_32 => i64::from(self.buf.get_u32()? as i32),
            marker::UINT_8 => i64::from(self.buf.get_u8()?),
            marker::UINT_16 => i64::from(self.buf.get_u16()?),
            marker::UINT_32 => i64::from(self.buf.get_u32()?),
            marker::INT_64 | marker::UINT_64 => {
                let wide = self.buf.get_u64()?;
                // The whole item stays unread.
                self.buf.unread(9);
                let value = if tag == marker::UINT_64 {
                    i128::from(wide)
                } else {
                    i128::from(wide as i64)
                };
                return Err(CodecError::IntegerOverflow {
                    value,
                    target: "i32",
                });
            }
            other => return Err(mismatch(other, Category::Integer)),
        };
        Ok(value)
    }

    /// Resolves a fixstr/str16/str32 length, or `None` if `tag` is not a
    /// string tag.
    fn str_len(&mut self, tag: u8) -> Result<Option<usize>, CodecError> {
        let len = match tag {
            marker::STR_16 => usize::from(self.buf.get_u16()?),
            marker::STR_32 => self.buf.get_u32()? as usize,
            _ if marker::is_fixstr(tag) => usize::from(tag & marker::FIXSTR_MASK),
            _ => return Ok(None),
        };
        Ok(Some(len))
    }

    fn require_string(&mut self) -> Result<String, CodecError> {
        self.read_string()?
            .ok_or_else(|| mismatch(marker::NIL, Category::String))
    }
}

fn mismatch(tag: u8, expected: Category) -> CodecError {
    tracing::trace!(tag, %expected, "unexpected tag");
    CodecError::unexpected(tag, expected)
}

/// Caps a declared element count by what the remaining bytes could hold, so
/// a corrupt header cannot trigger a huge allocation.
fn capacity_hint(declared: u32, remaining: usize) -> usize {
    (declared as usize).min(remaining)
}

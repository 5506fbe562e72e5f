//! MessagePack encoding: typed values → bytes.

use std::collections::HashMap;

use bytes::Bytes;

use super::config::{BinaryEncoding, EncoderConfig};
use super::marker;
use crate::buffer::Buffer;
use crate::error::CodecError;
use crate::types::Value;

/// Writes MessagePack items into a borrowed [`Buffer`].
///
/// Every method that takes an `Option` writes nil for `None`. Payload-bearing
/// writes check the full encoded size up front, so a failed write leaves no
/// partial item behind.
pub struct Encoder<'a> {
    buf: &'a mut Buffer,
    config: EncoderConfig,
}

impl<'a> Encoder<'a> {
    pub fn new(buf: &'a mut Buffer) -> Self {
        Self::with_config(buf, EncoderConfig::default())
    }

    pub fn with_config(buf: &'a mut Buffer, config: EncoderConfig) -> Self {
        Self { buf, config }
    }

    /// Rewinds the write cursor so the buffer can be reused.
    pub fn reset(&mut self) {
        self.buf.reset();
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.position()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.buf.written()
    }

    pub fn to_bytes(&self) -> Bytes {
        self.buf.to_bytes()
    }

    /// Encodes any [`Value`]. Array and map values write only their header.
    pub fn write_value(&mut self, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Nil => self.write_nil(),
            Value::Bool(b) => self.write_boolean(Some(*b)),
            Value::Int(i) => self.write_long(Some(*i)),
            Value::Float32(f) => self.write_float(Some(*f)),
            Value::Float64(f) => self.write_double(Some(*f)),
            Value::Bytes(b) => self.write_byte_array(Some(b.as_slice())),
            Value::Str(s) => self.write_string(Some(s.as_str())),
            Value::ArrayLength(n) => self.write_list_begin(*n),
            Value::MapLength(n) => self.write_map_begin(*n),
            Value::Ext(e) => self.write_ext_data(e.type_id, Some(e.data.as_slice())),
        }
    }

    pub fn write_nil(&mut self) -> Result<(), CodecError> {
        self.buf.put_u8(marker::NIL)
    }

    pub fn write_boolean(&mut self, value: Option<bool>) -> Result<(), CodecError> {
        match value {
            None => self.write_nil(),
            Some(b) => self.buf.put_u8(if b { marker::TRUE } else { marker::FALSE }),
        }
    }

    /// Encodes a 32-bit integer using the smallest representation.
    pub fn write_integer(&mut self, value: Option<i32>) -> Result<(), CodecError> {
        match value {
            None => self.write_nil(),
            Some(v) => self.encode_i32(v),
        }
    }

    /// Encodes a 64-bit integer, falling back to the 32-bit path when it fits.
    pub fn write_long(&mut self, value: Option<i64>) -> Result<(), CodecError> {
        let Some(v) = value else {
            return self.write_nil();
        };
        if v < i64::from(i32::MIN) {
            self.tagged_u64(marker::INT_64, v as u64)
        } else if v >= 1 << 32 {
            self.tagged_u64(marker::UINT_64, v as u64)
        } else if v > i64::from(i32::MAX) {
            self.tagged_u32(marker::UINT_32, v as u32)
        } else {
            self.encode_i32(v as i32)
        }
    }

    /// Encodes an integer of up to 64 bits of magnitude. Values above
    /// `i64::MAX` up to `u64::MAX` use uint64; anything wider fails.
    pub fn write_big_integer(&mut self, value: Option<i128>) -> Result<(), CodecError> {
        let Some(v) = value else {
            return self.write_nil();
        };
        if let Ok(v) = i64::try_from(v) {
            return self.write_long(Some(v));
        }
        match u64::try_from(v) {
            Ok(u) => self.tagged_u64(marker::UINT_64, u),
            Err(_) => {
                tracing::trace!(value = %v, "integer wider than 64 bits");
                Err(CodecError::IntegerOverflow {
                    value: v,
                    target: "64 bits",
                })
            }
        }
    }

    pub fn write_float(&mut self, value: Option<f32>) -> Result<(), CodecError> {
        match value {
            None => self.write_nil(),
            Some(f) => self.tagged_u32(marker::FLOAT_32, f.to_bits()),
        }
    }

    pub fn write_double(&mut self, value: Option<f64>) -> Result<(), CodecError> {
        match value {
            None => self.write_nil(),
            Some(d) => self.tagged_u64(marker::FLOAT_64, d.to_bits()),
        }
    }

    /// Encodes a string (size = UTF-8 byte length, not char count).
    pub fn write_string(&mut self, value: Option<&str>) -> Result<(), CodecError> {
        let Some(s) = value else {
            return self.write_nil();
        };
        let data = s.as_bytes();
        self.encode_str_header(data.len())?;
        self.buf.put_slice(data)
    }

    pub fn write_byte_array(&mut self, value: Option<&[u8]>) -> Result<(), CodecError> {
        match value {
            None => self.write_nil(),
            Some(data) => self.encode_bytes(data),
        }
    }

    /// Encodes `len` bytes of `value` starting at `offset`.
    pub fn write_byte_array_range(
        &mut self,
        value: Option<&[u8]>,
        offset: usize,
        len: usize,
    ) -> Result<(), CodecError> {
        let Some(src) = value else {
            return self.write_nil();
        };
        let data = offset
            .checked_add(len)
            .and_then(|end| src.get(offset..end))
            .ok_or(CodecError::InvalidRange {
                offset,
                len,
                available: src.len(),
            })?;
        self.encode_bytes(data)
    }

    /// Writes an array header. The caller must follow with `size` items.
    pub fn write_list_begin(&mut self, size: u32) -> Result<(), CodecError> {
        if (size as usize) <= marker::FIXCOLLECTION_MAX {
            self.buf.put_u8(marker::FIXARRAY_PREFIX | size as u8)
        } else if size <= u32::from(u16::MAX) {
            self.tagged_u16(marker::ARRAY_16, size as u16)
        } else {
            self.tagged_u32(marker::ARRAY_32, size)
        }
    }

    /// Writes a map header. The caller must follow with `size` key/value pairs.
    pub fn write_map_begin(&mut self, size: u32) -> Result<(), CodecError> {
        if (size as usize) <= marker::FIXCOLLECTION_MAX {
            self.buf.put_u8(marker::FIXMAP_PREFIX | size as u8)
        } else if size <= u32::from(u16::MAX) {
            self.tagged_u16(marker::MAP_16, size as u16)
        } else {
            self.tagged_u32(marker::MAP_32, size)
        }
    }

    /// Encodes a list of optional strings; a `None` element is written as nil.
    /// On failure the whole list is discarded.
    pub fn write_string_list<S: AsRef<str>>(
        &mut self,
        value: Option<&[Option<S>]>,
    ) -> Result<(), CodecError> {
        let Some(items) = value else {
            return self.write_nil();
        };
        self.all_or_nothing(|enc| {
            enc.write_list_begin(length_prefix(items.len())?)?;
            for item in items {
                enc.write_string(item.as_ref().map(|s| s.as_ref()))?;
            }
            Ok(())
        })
    }

    /// Encodes a string-keyed map whose values may be nil. On failure the
    /// whole map is discarded.
    pub fn write_string_map(
        &mut self,
        value: Option<&HashMap<String, Option<String>>>,
    ) -> Result<(), CodecError> {
        let Some(map) = value else {
            return self.write_nil();
        };
        self.all_or_nothing(|enc| {
            enc.write_map_begin(length_prefix(map.len())?)?;
            for (key, val) in map {
                enc.write_string(Some(key.as_str()))?;
                enc.write_string(val.as_deref())?;
            }
            Ok(())
        })
    }

    /// Encodes an extension blob: fixext when the length is 1, 2, 4, 8 or 16,
    /// otherwise ext8/16/32 with an explicit length.
    pub fn write_ext_data(&mut self, type_id: i8, data: Option<&[u8]>) -> Result<(), CodecError> {
        let Some(data) = data else {
            return self.write_nil();
        };
        let len = data.len();
        let fixed = match len {
            1 => Some(marker::FIXEXT_1),
            2 => Some(marker::FIXEXT_2),
            4 => Some(marker::FIXEXT_4),
            8 => Some(marker::FIXEXT_8),
            16 => Some(marker::FIXEXT_16),
            _ => None,
        };

        if let Some(tag) = fixed {
            self.buf.ensure(2 + len)?;
            self.buf.put_u8(tag)?;
        } else if len <= usize::from(u8::MAX) {
            self.buf.ensure(3 + len)?;
            self.buf.put_u8(marker::EXT_8)?;
            self.buf.put_u8(len as u8)?;
        } else if len <= usize::from(u16::MAX) {
            self.buf.ensure(4 + len)?;
            self.buf.put_u8(marker::EXT_16)?;
            self.buf.put_u16(len as u16)?;
        } else {
            let size = length_prefix(len)?;
            self.buf.ensure(6 + len)?;
            self.buf.put_u8(marker::EXT_32)?;
            self.buf.put_u32(size)?;
        }
        self.buf.put_u8(type_id as u8)?;
        self.buf.put_slice(data)
    }

    // -- Internals --

    /// Runs a multi-item write, rewinding to the starting position if any
    /// part of it fails.
    fn all_or_nothing(
        &mut self,
        write: impl FnOnce(&mut Self) -> Result<(), CodecError>,
    ) -> Result<(), CodecError> {
        let start = self.buf.position();
        let result = write(self);
        if result.is_err() {
            self.buf.rewind_to(start);
        }
        result
    }

    fn encode_i32(&mut self, v: i32) -> Result<(), CodecError> {
        if v < -32 {
            if v < i32::from(i16::MIN) {
                self.tagged_u32(marker::INT_32, v as u32)
            } else if v < i32::from(i8::MIN) {
                self.tagged_u16(marker::INT_16, v as u16)
            } else {
                self.tagged_u8(marker::INT_8, v as u8)
            }
        } else if v < 128 {
            // Positive fixnum, or negative fixnum 111xxxxx for -32..=-1.
            self.buf.put_u8(v as u8)
        } else if v <= i32::from(u8::MAX) {
            self.tagged_u8(marker::UINT_8, v as u8)
        } else if v <= i32::from(u16::MAX) {
            self.tagged_u16(marker::UINT_16, v as u16)
        } else {
            self.tagged_u32(marker::UINT_32, v as u32)
        }
    }

    fn encode_bytes(&mut self, data: &[u8]) -> Result<(), CodecError> {
        match self.config.binary_encoding() {
            BinaryEncoding::Bin => self.encode_bin_header(data.len())?,
            BinaryEncoding::Raw => self.encode_str_header(data.len())?,
        }
        self.buf.put_slice(data)
    }

    /// Writes a str header, checking room for the `len` payload bytes as well.
    fn encode_str_header(&mut self, len: usize) -> Result<(), CodecError> {
        if len <= marker::FIXSTR_MAX {
            self.buf.ensure(1 + len)?;
            self.buf.put_u8(marker::FIXSTR_PREFIX | len as u8)
        } else if len <= usize::from(u16::MAX) {
            self.buf.ensure(3 + len)?;
            self.buf.put_u8(marker::STR_16)?;
            self.buf.put_u16(len as u16)
        } else {
            let size = length_prefix(len)?;
            self.buf.ensure(5 + len)?;
            self.buf.put_u8(marker::STR_32)?;
            self.buf.put_u32(size)
        }
    }

    fn encode_bin_header(&mut self, len: usize) -> Result<(), CodecError> {
        if len <= usize::from(u8::MAX) {
            self.buf.ensure(2 + len)?;
            self.buf.put_u8(marker::BIN_8)?;
            self.buf.put_u8(len as u8)
        } else if len <= usize::from(u16::MAX) {
            self.buf.ensure(3 + len)?;
            self.buf.put_u8(marker::BIN_16)?;
            self.buf.put_u16(len as u16)
        } else {
            let size = length_prefix(len)?;
            self.buf.ensure(5 + len)?;
            self.buf.put_u8(marker::BIN_32)?;
            self.buf.put_u32(size)
        }
    }

    fn tagged_u8(&mut self, tag: u8, v: u8) -> Result<(), CodecError> {
        self.buf.ensure(2)?;
        self.buf.put_u8(tag)?;
        self.buf.put_u8(v)
    }

    fn tagged_u16(&mut self, tag: u8, v: u16) -> Result<(), CodecError> {
        self.buf.ensure(3)?;
        self.buf.put_u8(tag)?;
        self.buf.put_u16(v)
    }

    fn tagged_u32(&mut self, tag: u8, v: u32) -> Result<(), CodecError> {
        self.buf.ensure(5)?;
        self.buf.put_u8(tag)?;
        self.buf.put_u32(v)
    }

    fn tagged_u64(&mut self, tag: u8, v: u64) -> Result<(), CodecError> {
        self.buf.ensure(9)?;
        self.buf.put_u8(tag)?;
        self.buf.put_u64(v)
    }
}

fn length_prefix(len: usize) -> Result<u32, CodecError> {
    u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))
}

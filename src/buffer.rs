//! Fixed-capacity byte buffer with a single cursor.
//!
//! All multi-byte integers are big-endian. The buffer never grows: a write or
//! read that would cross the capacity fails with
//! [`CodecError::BufferOverflow`] and leaves the cursor where it was.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::CodecError;

/// An owned byte region of fixed capacity plus a read/write cursor.
#[derive(Debug, Clone)]
pub struct Buffer {
    data: BytesMut,
    pos: usize,
}

impl Buffer {
    /// Creates a zero-filled buffer for encoding.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::zeroed(capacity),
            pos: 0,
        }
    }

    /// Creates a buffer over a copy of `data`, cursor at the start.
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: BytesMut::from(data),
            pos: 0,
        }
    }

    /// Total size in bytes, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Cursor offset from the start: bytes written or consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the capacity.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Rewinds the cursor to the start. Contents are left in place.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Moves the cursor back by `n` bytes, stopping at the start.
    pub fn unread(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n);
    }

    /// Moves the cursor back to an earlier `position`. A later position is
    /// ignored, so this can only discard bytes.
    pub fn rewind_to(&mut self, position: usize) {
        self.pos = self.pos.min(position);
    }

    /// Checks that `needed` more bytes fit without touching the cursor.
    pub fn ensure(&self, needed: usize) -> Result<(), CodecError> {
        if needed > self.remaining() {
            tracing::debug!(
                position = self.pos,
                needed,
                capacity = self.capacity(),
                "buffer overflow"
            );
            return Err(CodecError::BufferOverflow {
                position: self.pos,
                needed,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// The bytes before the cursor (what has been written so far).
    pub fn written(&self) -> &[u8] {
        &self.data[..self.pos]
    }

    /// A frozen copy of the written bytes.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.written())
    }

    // -- Write primitives --

    pub fn put_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.ensure(1)?;
        self.data[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    pub fn put_u16(&mut self, value: u16) -> Result<(), CodecError> {
        self.ensure(2)?;
        let mut dst = &mut self.data[self.pos..];
        dst.put_u16(value);
        self.pos += 2;
        Ok(())
    }

    pub fn put_u32(&mut self, value: u32) -> Result<(), CodecError> {
        self.ensure(4)?;
        let mut dst = &mut self.data[self.pos..];
        dst.put_u32(value);
        self.pos += 4;
        Ok(())
    }

    pub fn put_u64(&mut self, value: u64) -> Result<(), CodecError> {
        self.ensure(8)?;
        let mut dst = &mut self.data[self.pos..];
        dst.put_u64(value);
        self.pos += 8;
        Ok(())
    }

    pub fn put_slice(&mut self, src: &[u8]) -> Result<(), CodecError> {
        self.ensure(src.len())?;
        self.data[self.pos..self.pos + src.len()].copy_from_slice(src);
        self.pos += src.len();
        Ok(())
    }

    // -- Read primitives --

    pub fn get_u8(&mut self) -> Result<u8, CodecError> {
        self.ensure(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    pub fn get_u16(&mut self) -> Result<u16, CodecError> {
        self.ensure(2)?;
        let mut src = &self.data[self.pos..];
        let value = src.get_u16();
        self.pos += 2;
        Ok(value)
    }

    pub fn get_u32(&mut self) -> Result<u32, CodecError> {
        self.ensure(4)?;
        let mut src = &self.data[self.pos..];
        let value = src.get_u32();
        self.pos += 4;
        Ok(value)
    }

    pub fn get_u64(&mut self) -> Result<u64, CodecError> {
        self.ensure(8)?;
        let mut src = &self.data[self.pos..];
        let value = src.get_u64();
        self.pos += 8;
        Ok(value)
    }

    /// Copies `len` bytes out into fresh storage.
    pub fn get_vec(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        self.ensure(len)?;
        let out = self.data[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(out)
    }

    /// Returns the byte under the cursor without consuming it.
    pub fn peek_u8(&self) -> Result<u8, CodecError> {
        self.ensure(1)?;
        Ok(self.data[self.pos])
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data: BytesMut::from(&data[..]),
            pos: 0,
        }
    }
}

impl From<Bytes> for Buffer {
    fn from(data: Bytes) -> Self {
        Self {
            data: BytesMut::from(&data[..]),
            pos: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_big_endian_widths() {
        let mut buf = Buffer::with_capacity(15);
        buf.put_u8(0xAB).unwrap();
        buf.put_u16(0x0102).unwrap();
        buf.put_u32(0x0304_0506).unwrap();
        buf.put_u64(0x0708_090A_0B0C_0D0E).unwrap();
        assert_eq!(
            buf.written(),
            &[
                0xAB, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C,
                0x0D, 0x0E
            ]
        );
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn get_big_endian_widths() {
        let mut buf = Buffer::from_slice(&[0xFF, 0xFF, 0xFE, 0x80, 0x00, 0x00, 0x00]);
        assert_eq!(buf.get_u8().unwrap(), 0xFF);
        // Sign interpretation is left to the caller.
        assert_eq!(buf.get_u16().unwrap() as i16, -2);
        assert_eq!(buf.get_u32().unwrap() as i32, i32::MIN);
        assert_eq!(buf.position(), 7);
    }

    #[test]
    fn write_past_capacity_fails_without_moving() {
        let mut buf = Buffer::with_capacity(3);
        buf.put_u16(0xBEEF).unwrap();
        let err = buf.put_u16(0x0001).unwrap_err();
        assert!(matches!(
            err,
            CodecError::BufferOverflow {
                position: 2,
                needed: 2,
                capacity: 3
            }
        ));
        assert_eq!(buf.position(), 2);
        buf.put_u8(0x01).unwrap();
        assert!(buf.put_u8(0x02).is_err());
    }

    #[test]
    fn read_past_capacity_fails() {
        let mut buf = Buffer::from_slice(&[0x00, 0x01, 0x02]);
        assert!(matches!(
            buf.get_u32(),
            Err(CodecError::BufferOverflow { needed: 4, .. })
        ));
        assert_eq!(buf.position(), 0);
        assert!(buf.get_vec(4).is_err());
        assert_eq!(buf.get_vec(3).unwrap(), vec![0x00, 0x01, 0x02]);
    }

    #[test]
    fn reset_and_unread_rewind_cursor() {
        let mut buf = Buffer::from(vec![0x10, 0x20, 0x30]);
        buf.get_u16().unwrap();
        buf.unread(1);
        assert_eq!(buf.get_u8().unwrap(), 0x20);
        buf.unread(10);
        assert_eq!(buf.position(), 0);
        buf.get_u8().unwrap();
        buf.reset();
        assert_eq!(buf.peek_u8().unwrap(), 0x10);
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn rewind_to_discards_tail() {
        let mut buf = Buffer::with_capacity(4);
        buf.put_slice(&[1, 2, 3]).unwrap();
        buf.rewind_to(1);
        assert_eq!(buf.written(), &[1]);
        buf.rewind_to(3);
        assert_eq!(buf.position(), 1);
        buf.put_u8(9).unwrap();
        assert_eq!(buf.written(), &[1, 9]);
    }

    #[test]
    fn to_bytes_copies_written_prefix() {
        let mut buf = Buffer::with_capacity(8);
        buf.put_slice(&[1, 2, 3]).unwrap();
        let frozen = buf.to_bytes();
        assert_eq!(&frozen[..], &[1, 2, 3]);
        assert_eq!(Buffer::from(frozen).capacity(), 3);
    }
}

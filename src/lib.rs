//! msgpax — MessagePack encoding and decoding over caller-sized buffers.
//!
//! The caller allocates a [`Buffer`] of fixed capacity and lends it to an
//! [`Encoder`] or [`Decoder`] for one pass. Nothing grows: running out of room
//! is an error, not a reallocation.
//!
//! # Architecture
//!
//! - **`buffer`** — Fixed-capacity bytes with a cursor and big-endian primitives
//! - **`msgpack`** — Tag table, encoder and decoder
//! - **`types`** — The `Value` model (nil, bool, int, float, str, bin, ext, headers)
//! - **`error`** — `CodecError`
//!
//! ```
//! use msgpax::{Buffer, Decoder, Encoder};
//!
//! let mut buf = Buffer::with_capacity(16);
//! let mut enc = Encoder::new(&mut buf);
//! enc.write_integer(Some(-1))?;
//! enc.write_string(Some("0"))?;
//! assert_eq!(enc.as_slice(), &[0xFF, 0xA1, 0x30]);
//!
//! let mut input = Buffer::from(enc.to_bytes());
//! let mut dec = Decoder::new(&mut input);
//! assert_eq!(dec.read_integer()?, Some(-1));
//! assert_eq!(dec.read_string()?.as_deref(), Some("0"));
//! # Ok::<(), msgpax::CodecError>(())
//! ```

pub mod buffer;
pub mod error;
pub mod msgpack;
pub mod types;

#[cfg(test)]
mod hex;

pub use buffer::Buffer;
pub use error::CodecError;
pub use msgpack::{Decoder, Encoder};
pub use types::{Ext, Value};

//! MessagePack binary encoding format.
//!
//! Every item starts with a tag byte that names its category and, for small
//! values, carries the payload inline. Multi-byte fields are big-endian.

pub mod config;
pub mod decode;
pub mod encode;
pub mod marker;

pub use config::{BinaryEncoding, EncoderConfig};
pub use decode::Decoder;
pub use encode::Encoder;
pub use marker::Category;

//! Value types carried by the codec.

mod value;

pub use value::{Ext, Value};

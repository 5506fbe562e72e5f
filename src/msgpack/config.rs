//! Encoder configuration.

/// How raw byte arrays are tagged on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BinaryEncoding {
    /// bin8 / bin16 / bin32 tags.
    #[default]
    Bin,
    /// fixstr / str16 / str32 tags, for peers that predate the bin family.
    Raw,
}

/// Options for an [`Encoder`](super::Encoder).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderConfig {
    binary: BinaryEncoding,
}

impl EncoderConfig {
    /// Sets the tag family used for byte arrays.
    pub fn binary(mut self, encoding: BinaryEncoding) -> Self {
        self.binary = encoding;
        self
    }

    pub fn binary_encoding(&self) -> BinaryEncoding {
        self.binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_bin_family() {
        assert_eq!(EncoderConfig::default().binary_encoding(), BinaryEncoding::Bin);
    }

    #[test]
    fn binary_setter() {
        let config = EncoderConfig::default().binary(BinaryEncoding::Raw);
        assert_eq!(config.binary_encoding(), BinaryEncoding::Raw);
    }
}

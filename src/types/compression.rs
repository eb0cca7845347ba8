use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::Compression;
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::Result;

/// Available compression algorithms.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc9580.html#name-compression-algorithms>
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum CompressionAlgorithm {
    Uncompressed = 0,
    ZIP = 1,
    ZLIB = 2,
    BZip2 = 3,

    #[num_enum(catch_all)]
    Other(u8),
}

impl Default for CompressionAlgorithm {
    fn default() -> Self {
        Self::ZLIB
    }
}

impl CompressionAlgorithm {
    /// Compresses the given data with this algorithm.
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        use std::io::Write;

        match self {
            CompressionAlgorithm::Uncompressed => Ok(data.to_vec()),
            CompressionAlgorithm::ZIP => {
                let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
                enc.write_all(data)?;
                Ok(enc.finish()?)
            }
            CompressionAlgorithm::ZLIB => {
                let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
                enc.write_all(data)?;
                Ok(enc.finish()?)
            }
            CompressionAlgorithm::BZip2 => {
                unsupported_err!("BZip2 compression");
            }
            CompressionAlgorithm::Other(typ) => {
                unsupported_err!("compression algorithm {}", typ);
            }
        }
    }

    /// Decompresses the given data with this algorithm.
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionAlgorithm::Uncompressed => Ok(data.to_vec()),
            CompressionAlgorithm::ZIP => {
                let mut out = Vec::new();
                DeflateDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
            CompressionAlgorithm::ZLIB => {
                let mut out = Vec::new();
                ZlibDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
            CompressionAlgorithm::BZip2 => {
                unsupported_err!("BZip2 compression");
            }
            CompressionAlgorithm::Other(typ) => {
                unsupported_err!("compression algorithm {}", typ);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_roundtrip() {
        let data = b"hello world hello world hello world";
        let compressed = CompressionAlgorithm::ZIP.compress(data).unwrap();
        let back = CompressionAlgorithm::ZIP.decompress(&compressed).unwrap();
        assert_eq!(&back, data);
    }

    #[test]
    fn test_zlib_roundtrip() {
        let data = b"hello world hello world hello world";
        let compressed = CompressionAlgorithm::ZLIB.compress(data).unwrap();
        let back = CompressionAlgorithm::ZLIB.decompress(&compressed).unwrap();
        assert_eq!(&back, data);
    }

    #[test]
    fn test_uncompressed_passthrough() {
        let data = b"plain";
        assert_eq!(
            CompressionAlgorithm::Uncompressed.compress(data).unwrap(),
            data
        );
        assert_eq!(
            CompressionAlgorithm::Uncompressed.decompress(data).unwrap(),
            data
        );
    }

    #[test]
    fn test_bzip2_unsupported() {
        assert!(CompressionAlgorithm::BZip2.compress(b"x").is_err());
        assert!(CompressionAlgorithm::BZip2.decompress(b"x").is_err());
    }
}

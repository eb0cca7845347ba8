use digest::DynDigest;
use md5::Md5;
use num_enum::{FromPrimitive, IntoPrimitive};
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_256, Sha3_512};

use crate::errors::Result;

/// Available hash algorithms.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc9580.html#name-hash-algorithms>
#[derive(
    Debug,
    PartialEq,
    Eq,
    Copy,
    Clone,
    Hash,
    FromPrimitive,
    IntoPrimitive,
    derive_more::Display,
)]
#[repr(u8)]
#[non_exhaustive]
pub enum HashAlgorithm {
    #[display("MD5")]
    Md5 = 1,
    #[display("SHA1")]
    Sha1 = 2,
    #[display("RIPEMD160")]
    Ripemd160 = 3,
    #[display("SHA256")]
    Sha256 = 8,
    #[display("SHA384")]
    Sha384 = 9,
    #[display("SHA512")]
    Sha512 = 10,
    #[display("SHA224")]
    Sha224 = 11,
    #[display("SHA3-256")]
    Sha3_256 = 12,
    #[display("SHA3-512")]
    Sha3_512 = 14,

    /// Do not use, just for compatibility
    #[display("SHA0")]
    Sha0 = 4,
    /// Do not use, just for compatibility
    #[display("DoubleSha")]
    DoubleSha = 5,

    #[num_enum(catch_all)]
    #[display("Unknown({:x})", _0)]
    Other(u8),
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl HashAlgorithm {
    /// Create a new hasher.
    pub fn new_hasher(self) -> Result<Box<dyn DynDigest + Send>> {
        match self {
            HashAlgorithm::Md5 => Ok(Box::<Md5>::default()),
            HashAlgorithm::Sha1 => Ok(Box::<Sha1>::default()),
            HashAlgorithm::Ripemd160 => Ok(Box::<Ripemd160>::default()),
            HashAlgorithm::Sha256 => Ok(Box::<Sha256>::default()),
            HashAlgorithm::Sha384 => Ok(Box::<Sha384>::default()),
            HashAlgorithm::Sha512 => Ok(Box::<Sha512>::default()),
            HashAlgorithm::Sha224 => Ok(Box::<Sha224>::default()),
            HashAlgorithm::Sha3_256 => Ok(Box::<Sha3_256>::default()),
            HashAlgorithm::Sha3_512 => Ok(Box::<Sha3_512>::default()),
            _ => unsupported_err!("hash algorithm {:?}", self),
        }
    }

    /// Calculate the digest of the given input data.
    pub fn digest(self, data: &[u8]) -> Result<Vec<u8>> {
        let mut hasher = self.new_hasher()?;
        hasher.update(data);
        Ok(hasher.finalize().to_vec())
    }

    /// Returns the expected digest size for the given algorithm.
    pub fn digest_size(self) -> Option<usize> {
        let size = match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Ripemd160 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha3_256 => 32,
            HashAlgorithm::Sha3_512 => 64,
            _ => return None,
        };
        Some(size)
    }

    /// Whether the algorithm id maps to a hash function we can run.
    pub fn known(self) -> bool {
        self.digest_size().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_sha1_empty() {
        let out = HashAlgorithm::Sha1.digest(b"").unwrap();
        assert_eq!(hex::encode(out), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_digest_sha256() {
        let out = HashAlgorithm::Sha256.digest(b"abc").unwrap();
        assert_eq!(
            hex::encode(out),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_unknown_roundtrip() {
        let alg = HashAlgorithm::from(99u8);
        assert_eq!(alg, HashAlgorithm::Other(99));
        assert_eq!(u8::from(alg), 99);
        assert!(!alg.known());
        assert!(alg.new_hasher().is_err());
    }
}

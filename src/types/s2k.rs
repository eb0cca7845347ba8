use std::io;

use byteorder::WriteBytesExt;
use bytes::Buf;

use crate::crypto::hash::HashAlgorithm;
use crate::errors::{Error, Result};
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Exponent bias of the iterated S2K octet count, defined in RFC 4880.
const EXPBIAS: u32 = 6;

/// Decodes the coded iteration count octet into the actual octet count.
pub fn coded_count(coded: u8) -> usize {
    ((16 + (coded as usize & 15)) << ((coded as usize >> 4) + EXPBIAS as usize)) as usize
}

/// String-To-Key specifier, turning a passphrase into a symmetric key.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-3.7>
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum StringToKey {
    Simple {
        hash_alg: HashAlgorithm,
    },
    Salted {
        hash_alg: HashAlgorithm,
        salt: [u8; 8],
    },
    IteratedAndSalted {
        hash_alg: HashAlgorithm,
        salt: [u8; 8],
        count: u8,
    },
}

impl StringToKey {
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let typ = i.read_u8()?;

        match typ {
            0 => {
                let hash_alg = i.read_u8()?.into();
                Ok(StringToKey::Simple { hash_alg })
            }
            1 => {
                let hash_alg = i.read_u8()?.into();
                let salt = i.read_array::<8>()?;
                Ok(StringToKey::Salted { hash_alg, salt })
            }
            3 => {
                let hash_alg = i.read_u8()?.into();
                let salt = i.read_array::<8>()?;
                let count = i.read_u8()?;
                Ok(StringToKey::IteratedAndSalted {
                    hash_alg,
                    salt,
                    count,
                })
            }
            _ => Err(Error::InvalidS2kType { typ }),
        }
    }

    pub fn typ(&self) -> u8 {
        match self {
            StringToKey::Simple { .. } => 0,
            StringToKey::Salted { .. } => 1,
            StringToKey::IteratedAndSalted { .. } => 3,
        }
    }

    pub fn hash_alg(&self) -> HashAlgorithm {
        match self {
            StringToKey::Simple { hash_alg }
            | StringToKey::Salted { hash_alg, .. }
            | StringToKey::IteratedAndSalted { hash_alg, .. } => *hash_alg,
        }
    }

    pub fn salt(&self) -> Option<&[u8; 8]> {
        match self {
            StringToKey::Simple { .. } => None,
            StringToKey::Salted { salt, .. } | StringToKey::IteratedAndSalted { salt, .. } => {
                Some(salt)
            }
        }
    }

    /// Derives `key_size` octets of key material from the passphrase.
    ///
    /// When the digest is shorter than `key_size`, the digest context is
    /// instantiated multiple times, each preloaded with as many zero
    /// octets as its position, and the outputs are concatenated.
    pub fn derive(&self, passphrase: &[u8], key_size: usize) -> Result<Vec<u8>> {
        let hash_alg = self.hash_alg();
        let digest_size = hash_alg
            .digest_size()
            .ok_or_else(|| format_err!("s2k with unsupported hash algorithm {:?}", hash_alg))?;
        ensure!(key_size > 0, "s2k key size must not be zero");

        let contexts = (key_size + digest_size - 1) / digest_size;
        let mut key = Vec::with_capacity(contexts * digest_size);

        for ctx in 0..contexts {
            let mut hasher = hash_alg.new_hasher()?;
            // Zero prefix distinguishes the contexts.
            hasher.update(&vec![0u8; ctx]);

            match self {
                StringToKey::Simple { .. } => {
                    hasher.update(passphrase);
                }
                StringToKey::Salted { salt, .. } => {
                    hasher.update(salt);
                    hasher.update(passphrase);
                }
                StringToKey::IteratedAndSalted { salt, count, .. } => {
                    let count = coded_count(*count);
                    let mut combined = Vec::with_capacity(8 + passphrase.len());
                    combined.extend_from_slice(salt);
                    combined.extend_from_slice(passphrase);

                    // Full repetitions first, then a partial slice so
                    // that exactly `count` octets are hashed. If the
                    // count is smaller than one repetition, the whole
                    // salt and passphrase are hashed regardless.
                    let mut hashed = combined.len();
                    hasher.update(&combined);
                    while hashed + combined.len() <= count {
                        hasher.update(&combined);
                        hashed += combined.len();
                    }
                    if hashed < count {
                        hasher.update(&combined[..count - hashed]);
                    }
                }
            }

            key.extend_from_slice(&hasher.finalize());
        }

        key.truncate(key_size);
        Ok(key)
    }
}

impl Serialize for StringToKey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.typ())?;

        match self {
            StringToKey::Simple { hash_alg } => {
                writer.write_u8((*hash_alg).into())?;
            }
            StringToKey::Salted { hash_alg, salt } => {
                writer.write_u8((*hash_alg).into())?;
                writer.write_all(salt)?;
            }
            StringToKey::IteratedAndSalted {
                hash_alg,
                salt,
                count,
            } => {
                writer.write_u8((*hash_alg).into())?;
                writer.write_all(salt)?;
                writer.write_u8(*count)?;
            }
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        match self {
            StringToKey::Simple { .. } => 2,
            StringToKey::Salted { .. } => 10,
            StringToKey::IteratedAndSalted { .. } => 11,
        }
    }
}

use std::io;

use byteorder::WriteBytesExt;
use bytes::{Buf, Bytes};

use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::StringToKey;

/// Symmetric-Key Encrypted Session Key Packet (version 4).
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.3>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct SymKeyEncryptedSessionKey {
    packet_header: PacketHeader,
    sym_algorithm: SymmetricKeyAlgorithm,
    s2k: StringToKey,
    /// Encrypted session key. Empty when the S2K output is used as the
    /// session key directly.
    #[debug("{}", hex::encode(encrypted_key))]
    encrypted_key: Bytes,
}

impl SymKeyEncryptedSessionKey {
    /// Parses a `SymKeyEncryptedSessionKey` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        let version = input.read_u8()?;
        ensure_eq!(version, 4, "unexpected skesk version {}", version);

        let sym_algorithm = input.read_u8()?.into();
        let s2k = StringToKey::from_buf(&mut input)?;
        let encrypted_key = input.rest();

        Ok(SymKeyEncryptedSessionKey {
            packet_header,
            sym_algorithm,
            s2k,
            encrypted_key,
        })
    }

    pub fn version(&self) -> u8 {
        4
    }

    pub fn sym_algorithm(&self) -> SymmetricKeyAlgorithm {
        self.sym_algorithm
    }

    pub fn s2k(&self) -> &StringToKey {
        &self.s2k
    }

    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    /// Derives the session key from the passphrase, sized for the
    /// symmetric algorithm in this packet.
    pub fn derive_session_key(&self, passphrase: &[u8]) -> Result<Vec<u8>> {
        self.s2k
            .derive(passphrase, self.sym_algorithm.key_size())
    }
}

impl Serialize for SymKeyEncryptedSessionKey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(4)?;
        writer.write_u8(self.sym_algorithm.into())?;
        self.s2k.to_writer(writer)?;
        writer.write_all(&self.encrypted_key)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + 1 + self.s2k.write_len() + self.encrypted_key.len()
    }
}

impl PacketTrait for SymKeyEncryptedSessionKey {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::HashAlgorithm;
    use crate::types::Tag;

    #[test]
    fn test_roundtrip() {
        let mut data: Vec<u8> = vec![4, 9]; // v4, AES256
        data.extend_from_slice(&[
            0x03, 0x02, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x60,
        ]);

        let header = PacketHeader::new_fixed(Tag::SymKeyEncryptedSessionKey, data.len());
        let skesk = SymKeyEncryptedSessionKey::try_from_buf(header, &data[..]).unwrap();
        assert_eq!(skesk.sym_algorithm(), SymmetricKeyAlgorithm::AES256);
        assert_eq!(skesk.s2k().hash_alg(), HashAlgorithm::Sha1);
        assert!(skesk.encrypted_key().is_empty());
        assert_eq!(skesk.to_bytes().unwrap(), data);
        assert_eq!(skesk.write_len(), data.len());
    }

    #[test]
    fn test_derive_session_key() {
        let s2k = StringToKey::IteratedAndSalted {
            hash_alg: HashAlgorithm::Sha256,
            salt: *b"\x01\x02\x03\x04\x05\x06\x07\x08",
            count: 0x60,
        };
        let header = PacketHeader::new_fixed(Tag::SymKeyEncryptedSessionKey, 13);
        let skesk = SymKeyEncryptedSessionKey {
            packet_header: header,
            sym_algorithm: SymmetricKeyAlgorithm::AES256,
            s2k: s2k.clone(),
            encrypted_key: Bytes::new(),
        };
        let key = skesk.derive_session_key(b"passphrase").unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(key, s2k.derive(b"passphrase", 32).unwrap());
    }
}

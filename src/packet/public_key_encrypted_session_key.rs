use std::io;

use byteorder::WriteBytesExt;
use bytes::Buf;

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyId, MpiBytes};

/// Public-Key Encrypted Session Key Packet (version 3).
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.1>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyEncryptedSessionKey {
    packet_header: PacketHeader,
    id: KeyId,
    pk_algorithm: PublicKeyAlgorithm,
    /// The encrypted session key, one MPI for the RSA family, two for
    /// Elgamal and the ECDH-style algorithms.
    values: Vec<MpiBytes>,
}

impl PublicKeyEncryptedSessionKey {
    /// Parses a `PublicKeyEncryptedSessionKey` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        let version = input.read_u8()?;
        ensure_eq!(version, 3, "unexpected pkesk version {}", version);

        let id = KeyId::from_buf(&mut input)?;
        let pk_algorithm: PublicKeyAlgorithm = input.read_u8()?.into();

        let mut values = Vec::new();
        while input.has_remaining() {
            values.push(MpiBytes::from_buf(&mut input)?);
        }
        ensure!(!values.is_empty(), "pkesk without session key material");

        Ok(PublicKeyEncryptedSessionKey {
            packet_header,
            id,
            pk_algorithm,
            values,
        })
    }

    pub fn version(&self) -> u8 {
        3
    }

    pub fn id(&self) -> &KeyId {
        &self.id
    }

    pub fn pk_algorithm(&self) -> PublicKeyAlgorithm {
        self.pk_algorithm
    }

    pub fn values(&self) -> &[MpiBytes] {
        &self.values
    }
}

impl Serialize for PublicKeyEncryptedSessionKey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(3)?;
        self.id.to_writer(writer)?;
        writer.write_u8(self.pk_algorithm.into())?;
        for mpi in &self.values {
            mpi.to_writer(writer)?;
        }
        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + 8 + 1 + self.values.iter().map(Serialize::write_len).sum::<usize>()
    }
}

impl PacketTrait for PublicKeyEncryptedSessionKey {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tag;

    #[test]
    fn test_roundtrip() {
        let mut data: Vec<u8> = vec![3];
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data.push(1); // RSA
        data.extend_from_slice(&[0x00, 0x09, 0x01, 0xff]);

        let header = PacketHeader::new_fixed(Tag::PublicKeyEncryptedSessionKey, data.len());
        let pkesk = PublicKeyEncryptedSessionKey::try_from_buf(header, &data[..]).unwrap();
        assert_eq!(pkesk.pk_algorithm(), PublicKeyAlgorithm::RSA);
        assert_eq!(pkesk.values().len(), 1);
        assert_eq!(pkesk.to_bytes().unwrap(), data);
        assert_eq!(pkesk.write_len(), data.len());
    }

    #[test]
    fn test_bad_version() {
        let data = [5u8, 1, 2, 3, 4, 5, 6, 7, 8, 1, 0x00, 0x01, 0x01];
        let header = PacketHeader::new_fixed(Tag::PublicKeyEncryptedSessionKey, data.len());
        assert!(PublicKeyEncryptedSessionKey::try_from_buf(header, &data[..]).is_err());
    }
}

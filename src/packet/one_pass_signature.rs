use std::io;

use byteorder::WriteBytesExt;
use bytes::Buf;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::Result;
use crate::packet::signature::SignatureType;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyId, Tag};

/// One-Pass Signature Packet (version 3).
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.4>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnePassSignature {
    packet_header: PacketHeader,
    typ: SignatureType,
    hash_algorithm: HashAlgorithm,
    pub_algorithm: PublicKeyAlgorithm,
    issuer: KeyId,
    /// Zero if this signature nests another one, non-zero otherwise.
    last: u8,
}

impl OnePassSignature {
    /// Parses a `OnePassSignature` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        let version = input.read_u8()?;
        ensure_eq!(version, 3, "unexpected one pass signature version {}", version);

        let typ = input.read_u8()?.into();
        let hash_algorithm = input.read_u8()?.into();
        let pub_algorithm = input.read_u8()?.into();
        let issuer = KeyId::from_buf(&mut input)?;
        let last = input.read_u8()?;

        Ok(OnePassSignature {
            packet_header,
            typ,
            hash_algorithm,
            pub_algorithm,
            issuer,
            last,
        })
    }

    pub fn new(
        typ: SignatureType,
        hash_algorithm: HashAlgorithm,
        pub_algorithm: PublicKeyAlgorithm,
        issuer: KeyId,
        last: u8,
    ) -> Self {
        OnePassSignature {
            packet_header: PacketHeader::new_fixed(Tag::OnePassSignature, 13),
            typ,
            hash_algorithm,
            pub_algorithm,
            issuer,
            last,
        }
    }

    pub fn version(&self) -> u8 {
        3
    }

    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn pub_algorithm(&self) -> PublicKeyAlgorithm {
        self.pub_algorithm
    }

    pub fn issuer(&self) -> &KeyId {
        &self.issuer
    }

    pub fn is_nested(&self) -> bool {
        self.last == 0
    }
}

impl Serialize for OnePassSignature {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(3)?;
        writer.write_u8(self.typ.into())?;
        writer.write_u8(self.hash_algorithm.into())?;
        writer.write_u8(self.pub_algorithm.into())?;
        self.issuer.to_writer(writer)?;
        writer.write_u8(self.last)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        // version + type + hash + pub alg + key id + last
        1 + 1 + 1 + 1 + 8 + 1
    }
}

impl PacketTrait for OnePassSignature {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

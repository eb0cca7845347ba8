use std::io;

use bytes::Bytes;
use log::warn;

use crate::errors::{Result, ValidationError};
use crate::packet::{
    CompressedData, Experimental, LiteralData, Marker, OnePassSignature, PacketHeader,
    PublicKeyEncryptedSessionKey, Signature, SymEncryptedData, SymEncryptedProtectedData,
    SymKeyEncryptedSessionKey,
};
use crate::ser::Serialize;
use crate::types::{PacketLength, Tag};

pub trait PacketTrait: Serialize {
    fn packet_header(&self) -> &PacketHeader;

    fn tag(&self) -> Tag {
        self.packet_header().tag()
    }

    /// Serializes the full packet, header included.
    ///
    /// The length field of the stored header is replaced when it does
    /// not match the body about to be written, so a modified packet
    /// always produces consistent framing. Partial and indeterminate
    /// lengths are re-encoded as fixed ones.
    fn to_writer_with_header<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let header = self.normalized_header()?;
        header.to_writer(writer)?;
        self.to_writer(writer)?;
        Ok(())
    }

    fn write_len_with_header(&self) -> usize {
        let body_len = self.write_len();
        match self.normalized_header() {
            Ok(header) => header.write_len() + body_len,
            Err(_) => body_len,
        }
    }

    fn normalized_header(&self) -> Result<PacketHeader> {
        let header = self.packet_header();
        let body_len = self.write_len();
        match header.packet_length() {
            PacketLength::Fixed(len) if len == body_len => Ok(*header),
            length => {
                if let PacketLength::Fixed(len) = length {
                    warn!(
                        "packet {:?}: header length {} does not match body length {}",
                        header.tag(),
                        len,
                        body_len
                    );
                }
                PacketHeader::from_parts(
                    header.version(),
                    header.tag(),
                    PacketLength::Fixed(body_len),
                )
            }
        }
    }
}

/// Sum type of all supported packets.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Packet {
    PublicKeyEncryptedSessionKey(PublicKeyEncryptedSessionKey),
    Signature(Signature),
    SymKeyEncryptedSessionKey(SymKeyEncryptedSessionKey),
    OnePassSignature(OnePassSignature),
    CompressedData(CompressedData),
    SymEncryptedData(SymEncryptedData),
    Marker(Marker),
    LiteralData(LiteralData),
    SymEncryptedProtectedData(SymEncryptedProtectedData),
    Experimental(Experimental),
}

impl Packet {
    /// Parses a packet body according to the tag in the header.
    pub fn try_from_buf(packet_header: PacketHeader, body: Bytes) -> Result<Self> {
        let packet = match packet_header.tag() {
            Tag::PublicKeyEncryptedSessionKey => Packet::PublicKeyEncryptedSessionKey(
                PublicKeyEncryptedSessionKey::try_from_buf(packet_header, body)?,
            ),
            Tag::Signature => Packet::Signature(Signature::try_from_buf(packet_header, body)?),
            Tag::SymKeyEncryptedSessionKey => Packet::SymKeyEncryptedSessionKey(
                SymKeyEncryptedSessionKey::try_from_buf(packet_header, body)?,
            ),
            Tag::OnePassSignature => {
                Packet::OnePassSignature(OnePassSignature::try_from_buf(packet_header, body)?)
            }
            Tag::CompressedData => {
                Packet::CompressedData(CompressedData::try_from_buf(packet_header, body)?)
            }
            Tag::SymEncryptedData => {
                Packet::SymEncryptedData(SymEncryptedData::try_from_buf(packet_header, body)?)
            }
            Tag::Marker => Packet::Marker(Marker::try_from_buf(packet_header, body)?),
            Tag::LiteralData => {
                Packet::LiteralData(LiteralData::try_from_buf(packet_header, body)?)
            }
            Tag::SymEncryptedProtectedData => Packet::SymEncryptedProtectedData(
                SymEncryptedProtectedData::try_from_buf(packet_header, body)?,
            ),
            Tag::Experimental => {
                Packet::Experimental(Experimental::try_from_buf(packet_header, body)?)
            }
        };
        Ok(packet)
    }

    /// Structural validation of the decoded packet.
    pub fn validate(&self, strict_mpis: bool) -> Result<(), ValidationError> {
        match self {
            Packet::Signature(p) => p.validate(strict_mpis),
            Packet::LiteralData(p) => p.validate(),
            _ => Ok(()),
        }
    }
}

impl Serialize for Packet {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Packet::PublicKeyEncryptedSessionKey(p) => p.to_writer(writer),
            Packet::Signature(p) => p.to_writer(writer),
            Packet::SymKeyEncryptedSessionKey(p) => p.to_writer(writer),
            Packet::OnePassSignature(p) => p.to_writer(writer),
            Packet::CompressedData(p) => p.to_writer(writer),
            Packet::SymEncryptedData(p) => p.to_writer(writer),
            Packet::Marker(p) => p.to_writer(writer),
            Packet::LiteralData(p) => p.to_writer(writer),
            Packet::SymEncryptedProtectedData(p) => p.to_writer(writer),
            Packet::Experimental(p) => p.to_writer(writer),
        }
    }

    fn write_len(&self) -> usize {
        match self {
            Packet::PublicKeyEncryptedSessionKey(p) => p.write_len(),
            Packet::Signature(p) => p.write_len(),
            Packet::SymKeyEncryptedSessionKey(p) => p.write_len(),
            Packet::OnePassSignature(p) => p.write_len(),
            Packet::CompressedData(p) => p.write_len(),
            Packet::SymEncryptedData(p) => p.write_len(),
            Packet::Marker(p) => p.write_len(),
            Packet::LiteralData(p) => p.write_len(),
            Packet::SymEncryptedProtectedData(p) => p.write_len(),
            Packet::Experimental(p) => p.write_len(),
        }
    }
}

impl PacketTrait for Packet {
    fn packet_header(&self) -> &PacketHeader {
        match self {
            Packet::PublicKeyEncryptedSessionKey(p) => p.packet_header(),
            Packet::Signature(p) => p.packet_header(),
            Packet::SymKeyEncryptedSessionKey(p) => p.packet_header(),
            Packet::OnePassSignature(p) => p.packet_header(),
            Packet::CompressedData(p) => p.packet_header(),
            Packet::SymEncryptedData(p) => p.packet_header(),
            Packet::Marker(p) => p.packet_header(),
            Packet::LiteralData(p) => p.packet_header(),
            Packet::SymEncryptedProtectedData(p) => p.packet_header(),
            Packet::Experimental(p) => p.packet_header(),
        }
    }
}

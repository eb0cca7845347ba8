use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;
use num_enum::IntoPrimitive;

use crate::errors::{Error, Result};
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Packet tag as defined in RFC 4880, Section 4.3 "Packet Tags".
///
/// Only the tags this crate can dispatch are representable; an
/// unrecognized tag value is a decode error, never a silent pass-through.
#[derive(Debug, PartialEq, Eq, Copy, Clone, IntoPrimitive, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[repr(u8)]
pub enum Tag {
    /// Public-Key Encrypted Session Key Packet
    PublicKeyEncryptedSessionKey = 1,
    /// Signature Packet
    Signature = 2,
    /// Symmetric-Key Encrypted Session Key Packet
    SymKeyEncryptedSessionKey = 3,
    /// One-Pass Signature Packet
    OnePassSignature = 4,
    /// Compressed Data Packet
    CompressedData = 8,
    /// Symmetrically Encrypted Data Packet
    SymEncryptedData = 9,
    /// Marker Packet
    Marker = 10,
    /// Literal Data Packet
    LiteralData = 11,
    /// Sym. Encrypted and Integrity Protected Data Packet
    SymEncryptedProtectedData = 18,
    /// Private or Experimental Values
    Experimental = 63,
}

impl Tag {
    pub fn try_from_u8(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Tag::PublicKeyEncryptedSessionKey),
            2 => Ok(Tag::Signature),
            3 => Ok(Tag::SymKeyEncryptedSessionKey),
            4 => Ok(Tag::OnePassSignature),
            8 => Ok(Tag::CompressedData),
            9 => Ok(Tag::SymEncryptedData),
            10 => Ok(Tag::Marker),
            11 => Ok(Tag::LiteralData),
            18 => Ok(Tag::SymEncryptedProtectedData),
            63 => Ok(Tag::Experimental),
            _ => Err(Error::InvalidPacketType { tag }),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketHeaderVersion {
    /// Old Packet Format
    Old,
    /// New Packet Format
    New,
}

/// Body length of a packet.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketLength {
    Fixed(usize),
    Indeterminate,
    /// New format partial body length. Must be a power of two
    /// between 1 and 2^30.
    Partial(u32),
}

impl PacketLength {
    /// Parses a new format packet length (also used for the length of
    /// partial chunk trains).
    pub fn from_buf_new<B: Buf>(mut i: B) -> Result<Self> {
        let olen = i.read_u8()?;
        let len = match olen {
            // One-Octet Lengths
            0..=191 => PacketLength::Fixed(olen as usize),
            // Two-Octet Lengths
            192..=223 => {
                let a = i.read_u8()?;
                let l = ((olen as usize - 192) << 8) + 192 + a as usize;
                PacketLength::Fixed(l)
            }
            // Partial Body Lengths
            224..=254 => PacketLength::Partial(1u32 << (olen as u32 & 0x1F)),
            // Five-Octet Lengths
            255 => {
                let len = i.read_be_u32()?;
                PacketLength::Fixed(len.try_into()?)
            }
        };
        Ok(len)
    }

    /// Serializes in the new packet format.
    pub fn to_writer_new<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            PacketLength::Fixed(len) => {
                if *len < 192 {
                    writer.write_u8(*len as u8)?;
                } else if *len < 8384 {
                    writer.write_u8((((len - 192) / 256) + 192) as u8)?;
                    writer.write_u8(((len - 192) % 256) as u8)?;
                } else {
                    writer.write_u8(255)?;
                    writer.write_u32::<BigEndian>((*len).try_into()?)?;
                }
            }
            PacketLength::Partial(len) => {
                ensure!(
                    len.is_power_of_two() && *len <= (1 << 30),
                    "invalid partial length: {}",
                    len
                );
                // y such that len == 1 << y, encoded as 224 + y
                writer.write_u8(224 + len.trailing_zeros() as u8)?;
            }
            PacketLength::Indeterminate => {
                bail!("indeterminate lengths are old format only");
            }
        }
        Ok(())
    }

    pub fn write_len_new(&self) -> usize {
        match self {
            PacketLength::Fixed(len) => {
                if *len < 192 {
                    1
                } else if *len < 8384 {
                    2
                } else {
                    5
                }
            }
            PacketLength::Partial(_) => 1,
            PacketLength::Indeterminate => 0,
        }
    }

}

impl From<usize> for PacketLength {
    fn from(val: usize) -> PacketLength {
        PacketLength::Fixed(val)
    }
}

impl Serialize for Tag {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let t: u8 = (*self).into();
        writer.write_u8(t)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        1
    }
}

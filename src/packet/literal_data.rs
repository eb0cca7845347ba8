use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, Bytes};
use chrono::{DateTime, SubsecRound, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::{Result, ValidationError};
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::Tag;

/// The format octet of a Literal Data packet.
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[non_exhaustive]
pub enum DataMode {
    Binary = b'b',
    Text = b't',
    Utf8 = b'u',

    #[num_enum(catch_all)]
    Other(u8),
}

/// Literal Data Packet.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.9>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct LiteralData {
    packet_header: PacketHeader,
    mode: DataMode,
    /// The filename, may contain non utf-8 bytes
    file_name: Bytes,
    created: DateTime<Utc>,
    #[debug("{}", hex::encode(data))]
    data: Bytes,
}

impl LiteralData {
    /// Creates a literal data packet from the given bytes.
    pub fn from_bytes(mode: DataMode, file_name: impl Into<Bytes>, data: impl Into<Bytes>) -> Result<Self> {
        let file_name = file_name.into();
        let data = data.into();
        ensure!(file_name.len() <= 255, "file name too long");

        let created = Utc::now().trunc_subsecs(0);
        let len = 1 + 1 + file_name.len() + 4 + data.len();
        Ok(LiteralData {
            packet_header: PacketHeader::new_fixed(Tag::LiteralData, len),
            mode,
            file_name,
            created,
            data,
        })
    }

    /// Parses a `LiteralData` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        let mode = input.read_u8()?.into();
        let name_len = input.read_u8()?;
        let file_name = input.read_take(name_len.into())?;
        let created = input.read_be_u32()?;
        let created = DateTime::<Utc>::from_timestamp(created.into(), 0)
            .ok_or_else(|| format_err!("invalid creation time"))?;
        let data = input.rest();

        Ok(LiteralData {
            packet_header,
            mode,
            file_name,
            created,
            data,
        })
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn file_name(&self) -> &[u8] {
        &self.file_name
    }

    pub fn created(&self) -> &DateTime<Utc> {
        &self.created
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Checks the format octet against the defined set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.mode {
            DataMode::Binary | DataMode::Text | DataMode::Utf8 => Ok(()),
            DataMode::Other(format) => Err(ValidationError::InvalidLiteralDataFormat { format }),
        }
    }
}

impl Serialize for LiteralData {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.mode.into())?;
        writer.write_u8(self.file_name.len() as u8)?;
        writer.write_all(&self.file_name)?;
        writer.write_u32::<BigEndian>(self.created.timestamp() as u32)?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + 1 + self.file_name.len() + 4 + self.data.len()
    }
}

impl PacketTrait for LiteralData {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        // 'b', name "a.txt", time 0x5E000000, data "hi"
        let mut data: Vec<u8> = vec![b'b', 5];
        data.extend_from_slice(b"a.txt");
        data.extend_from_slice(&[0x5E, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"hi");

        let header = PacketHeader::new_fixed(Tag::LiteralData, data.len());
        let literal = LiteralData::try_from_buf(header, &data[..]).unwrap();
        assert_eq!(literal.mode(), DataMode::Binary);
        assert_eq!(literal.file_name(), b"a.txt");
        assert_eq!(literal.created().timestamp(), 0x5E000000);
        assert_eq!(literal.data(), b"hi");
        assert!(literal.validate().is_ok());

        assert_eq!(literal.to_bytes().unwrap(), data);
        assert_eq!(literal.write_len(), data.len());
    }

    #[test]
    fn test_unknown_format() {
        let mut data: Vec<u8> = vec![b'x', 0];
        data.extend_from_slice(&[0, 0, 0, 0]);

        let header = PacketHeader::new_fixed(Tag::LiteralData, data.len());
        let literal = LiteralData::try_from_buf(header, &data[..]).unwrap();
        assert_eq!(
            literal.validate(),
            Err(ValidationError::InvalidLiteralDataFormat { format: b'x' })
        );
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let literal = LiteralData::from_bytes(DataMode::Binary, "hello.txt", &b"hello"[..]).unwrap();
        let bytes = literal.to_bytes().unwrap();

        let header = PacketHeader::new_fixed(Tag::LiteralData, bytes.len());
        let back = LiteralData::try_from_buf(header, &bytes[..]).unwrap();
        assert_eq!(literal, back);
    }
}

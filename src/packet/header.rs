use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;

use crate::errors::Result;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, PacketLength, Tag};

/// Header of a packet: the packet format version, the tag and the
/// length of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    version: PacketHeaderVersion,
    tag: Tag,
    length: PacketLength,
}

impl PacketHeader {
    /// Parses a packet header from the given buffer.
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let header = i.read_u8()?;
        ensure!(header & 0b1000_0000 != 0, "marker bit must be set");

        if header & 0b0100_0000 != 0 {
            // New format
            let tag = Tag::try_from_u8(header & 0b0011_1111)?;
            let length = PacketLength::from_buf_new(&mut i)?;
            Ok(PacketHeader {
                version: PacketHeaderVersion::New,
                tag,
                length,
            })
        } else {
            // Old format
            let tag = Tag::try_from_u8((header & 0b0011_1100) >> 2)?;
            let length = match header & 0b0000_0011 {
                0 => PacketLength::Fixed(i.read_u8()? as usize),
                1 => PacketLength::Fixed(i.read_be_u16()? as usize),
                2 => PacketLength::Fixed(i.read_be_u32()?.try_into()?),
                3 => PacketLength::Indeterminate,
                _ => unreachable!("masked to two bits"),
            };
            Ok(PacketHeader {
                version: PacketHeaderVersion::Old,
                tag,
                length,
            })
        }
    }

    /// Creates a new format header with a fixed body length.
    pub fn new_fixed(tag: Tag, len: usize) -> Self {
        PacketHeader {
            version: PacketHeaderVersion::New,
            tag,
            length: PacketLength::Fixed(len),
        }
    }

    /// Creates a header from the individual parts, checking that the
    /// combination is expressible on the wire.
    pub fn from_parts(
        version: PacketHeaderVersion,
        tag: Tag,
        length: PacketLength,
    ) -> Result<Self> {
        match (version, &length) {
            (PacketHeaderVersion::Old, PacketLength::Partial(_)) => {
                bail!("partial body lengths are new format only");
            }
            (PacketHeaderVersion::Old, _) => {
                ensure!(u8::from(tag) < 16, "old format tags are limited to 4 bits");
            }
            (PacketHeaderVersion::New, PacketLength::Indeterminate) => {
                bail!("indeterminate lengths are old format only");
            }
            (PacketHeaderVersion::New, PacketLength::Partial(len)) => {
                ensure!(
                    len.is_power_of_two() && *len <= (1 << 30),
                    "invalid partial length: {}",
                    len
                );
            }
            (PacketHeaderVersion::New, PacketLength::Fixed(_)) => {}
        }
        Ok(PacketHeader {
            version,
            tag,
            length,
        })
    }

    pub fn version(&self) -> PacketHeaderVersion {
        self.version
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn packet_length(&self) -> PacketLength {
        self.length
    }
}

impl Serialize for PacketHeader {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self.version {
            PacketHeaderVersion::Old => {
                let tag: u8 = self.tag.into();
                match self.length {
                    PacketLength::Fixed(len) => {
                        if len <= 0xFF {
                            writer.write_u8(0b1000_0000 | (tag << 2))?;
                            writer.write_u8(len as u8)?;
                        } else if len <= 0xFFFF {
                            writer.write_u8(0b1000_0000 | (tag << 2) | 0b01)?;
                            writer.write_u16::<BigEndian>(len as u16)?;
                        } else {
                            writer.write_u8(0b1000_0000 | (tag << 2) | 0b10)?;
                            writer.write_u32::<BigEndian>(len.try_into()?)?;
                        }
                    }
                    PacketLength::Indeterminate => {
                        writer.write_u8(0b1000_0000 | (tag << 2) | 0b11)?;
                    }
                    PacketLength::Partial(_) => {
                        bail!("partial body lengths are new format only");
                    }
                }
            }
            PacketHeaderVersion::New => {
                let tag: u8 = self.tag.into();
                writer.write_u8(0b1100_0000 | tag)?;
                self.length.to_writer_new(writer)?;
            }
        }
        Ok(())
    }

    fn write_len(&self) -> usize {
        match self.version {
            PacketHeaderVersion::Old => match self.length {
                PacketLength::Fixed(len) => {
                    if len <= 0xFF {
                        2
                    } else if len <= 0xFFFF {
                        3
                    } else {
                        5
                    }
                }
                PacketLength::Indeterminate => 1,
                PacketLength::Partial(_) => 1,
            },
            PacketHeaderVersion::New => 1 + self.length.write_len_new(),
        }
    }
}

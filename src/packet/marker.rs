use std::io;

use bytes::Buf;

use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::Tag;

/// The three octet body of a Marker packet. Always "PGP".
const MARKER: &[u8; 3] = b"PGP";

/// Marker Packet, to be ignored by receiving implementations.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.8>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    packet_header: PacketHeader,
}

impl Marker {
    /// Parses a `Marker` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        let body = input.read_array::<3>()?;
        ensure_eq!(&body, MARKER, "invalid marker content");
        ensure_eq!(input.remaining(), 0, "trailing data after marker");

        Ok(Marker { packet_header })
    }

    pub fn new() -> Self {
        Marker {
            packet_header: PacketHeader::new_fixed(Tag::Marker, MARKER.len()),
        }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Marker {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&MARKER[..])?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        MARKER.len()
    }
}

impl PacketTrait for Marker {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

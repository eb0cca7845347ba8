use std::io;

use byteorder::WriteBytesExt;
use bytes::{Buf, Bytes};

use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Symmetrically Encrypted Integrity Protected Data Packet (version 1).
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.13>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct SymEncryptedProtectedData {
    packet_header: PacketHeader,
    #[debug("{}", hex::encode(data))]
    data: Bytes,
}

impl SymEncryptedProtectedData {
    /// Parses a `SymEncryptedProtectedData` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        let version = input.read_u8()?;
        ensure_eq!(version, 1, "unexpected seipd version {}", version);
        let data = input.rest();

        Ok(SymEncryptedProtectedData {
            packet_header,
            data,
        })
    }

    pub fn version(&self) -> u8 {
        1
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Serialize for SymEncryptedProtectedData {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(1)?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + self.data.len()
    }
}

impl PacketTrait for SymEncryptedProtectedData {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

use std::io;

use byteorder::WriteBytesExt;
use bytes::{Buf, Bytes};

use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{CompressionAlgorithm, Tag};

/// Compressed Data Packet.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.6>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct CompressedData {
    packet_header: PacketHeader,
    compression: CompressionAlgorithm,
    #[debug("{}", hex::encode(compressed_data))]
    compressed_data: Bytes,
}

impl CompressedData {
    /// Parses a `CompressedData` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        let alg = input.read_u8()?.into();
        let compressed_data = input.rest();

        Ok(CompressedData {
            packet_header,
            compression: alg,
            compressed_data,
        })
    }

    /// Compresses the given raw packet bytes into a new packet.
    pub fn from_compressed(compression: CompressionAlgorithm, data: &[u8]) -> Result<Self> {
        let compressed_data: Bytes = compression.compress(data)?.into();
        Ok(CompressedData {
            packet_header: PacketHeader::new_fixed(
                Tag::CompressedData,
                1 + compressed_data.len(),
            ),
            compression,
            compressed_data,
        })
    }

    pub fn compression(&self) -> CompressionAlgorithm {
        self.compression
    }

    pub fn compressed_data(&self) -> &[u8] {
        &self.compressed_data
    }

    /// Decompresses the body, yielding the contained raw packet bytes.
    pub fn decompress(&self) -> Result<Vec<u8>> {
        self.compression.decompress(&self.compressed_data)
    }
}

impl Serialize for CompressedData {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.compression.into())?;
        writer.write_all(&self.compressed_data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + self.compressed_data.len()
    }
}

impl PacketTrait for CompressedData {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

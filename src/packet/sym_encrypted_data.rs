use std::io;

use bytes::{Buf, Bytes};

use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Symmetrically Encrypted Data Packet.
///
/// Carries the ciphertext opaquely; the body must at least hold the
/// block-prefix octets, so anything shorter than two octets is rejected.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.7>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct SymEncryptedData {
    packet_header: PacketHeader,
    #[debug("{}", hex::encode(data))]
    data: Bytes,
}

impl SymEncryptedData {
    /// Parses a `SymEncryptedData` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        ensure!(
            input.remaining() >= 2,
            "encrypted data body too short: {}",
            input.remaining()
        );
        let data = input.rest();
        Ok(SymEncryptedData {
            packet_header,
            data,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Serialize for SymEncryptedData {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.data.len()
    }
}

impl PacketTrait for SymEncryptedData {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

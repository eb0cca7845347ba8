use std::io;

use bytes::{Buf, Bytes};

use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Private or Experimental packet, carried as an opaque body.
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct Experimental {
    packet_header: PacketHeader,
    #[debug("{}", hex::encode(data))]
    data: Bytes,
}

impl Experimental {
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut input: B) -> Result<Self> {
        let data = input.rest();
        Ok(Experimental {
            packet_header,
            data,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Serialize for Experimental {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.data.len()
    }
}

impl PacketTrait for Experimental {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

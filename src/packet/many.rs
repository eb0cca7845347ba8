use bytes::{Buf, Bytes, BytesMut};
use log::debug;

use crate::errors::Result;
use crate::packet::{Packet, PacketHeader};
use crate::parsing::BufParsing;
use crate::types::PacketLength;

/// Parses a complete sequence of packets out of the given buffer.
///
/// The buffer must hold nothing but whole packets; a packet body that
/// runs past the end of the input is an error, as is any unknown tag.
pub fn parse_many(mut input: Bytes) -> Result<Vec<Packet>> {
    let mut packets = Vec::new();

    while input.has_remaining() {
        let header = PacketHeader::from_buf(&mut input)?;
        debug!("packet {:?} {:?}", header.tag(), header.packet_length());

        let body = match header.packet_length() {
            PacketLength::Fixed(len) => input.read_take(len)?,
            PacketLength::Indeterminate => input.rest(),
            PacketLength::Partial(len) => read_partial_body(&mut input, len)?,
        };

        packets.push(Packet::try_from_buf(header, body)?);
    }

    Ok(packets)
}

/// Assembles the chunks of a packet using partial body lengths.
///
/// After the first chunk, each chunk is preceded by its own length
/// octets; the train ends with a regular fixed length chunk. Running
/// out of input before that terminal chunk is an error.
fn read_partial_body(input: &mut Bytes, first: u32) -> Result<Bytes> {
    let mut body = BytesMut::new();
    body.extend_from_slice(&input.read_take(first as usize)?);

    loop {
        match PacketLength::from_buf_new(&mut *input)? {
            PacketLength::Partial(len) => {
                body.extend_from_slice(&input.read_take(len as usize)?);
            }
            PacketLength::Fixed(len) => {
                body.extend_from_slice(&input.read_take(len)?);
                break;
            }
            PacketLength::Indeterminate => {
                bail!("indeterminate length inside a partial body");
            }
        }
    }

    Ok(body.freeze())
}

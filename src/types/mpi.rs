use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, Bytes};

use crate::errors::Result;
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Maximum size in bits for an MPI we are willing to read.
/// Same limit GnuPG enforces for externally sourced MPIs.
const MAX_EXTERN_MPI_BITS: u32 = 16384;

/// Represents an owned MPI value.
///
/// The inner value is stored without any leading zero octets; the bit
/// length prefix is re-derived from the value on write, so writing a
/// parsed MPI always produces the canonical encoding.
#[derive(Default, Clone, PartialEq, Eq, derive_more::Debug)]
pub struct MpiBytes(#[debug("{}", hex::encode(_0))] Bytes);

impl MpiBytes {
    /// Parses an MPI from the given buffer: a two octet big endian bit
    /// length, followed by `ceil(bits / 8)` value octets.
    pub fn from_buf<B: Buf>(mut b: B) -> Result<Self> {
        let len = b.read_be_u16()?;
        ensure!(
            (len as u32) < MAX_EXTERN_MPI_BITS,
            "mpi too large: {} bits",
            len
        );
        let len_bytes = (len as usize + 7) / 8;
        let bytes = b.read_take(len_bytes)?;

        Ok(Self::from_slice(&bytes))
    }

    /// Strips leading zero octets.
    pub fn from_slice(raw: &[u8]) -> Self {
        let offset = raw.iter().take_while(|v| **v == 0).count();
        MpiBytes(Bytes::copy_from_slice(&raw[offset..]))
    }

    pub fn as_ref(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Number of significant bits in the value.
    fn bit_size(&self) -> usize {
        match self.0.first() {
            None => 0,
            Some(first) => (self.0.len() - 1) * 8 + (8 - first.leading_zeros() as usize),
        }
    }
}

impl From<Bytes> for MpiBytes {
    fn from(other: Bytes) -> Self {
        Self::from_slice(&other)
    }
}

impl Serialize for MpiBytes {
    fn to_writer<W: io::Write>(&self, w: &mut W) -> Result<()> {
        w.write_u16::<BigEndian>(self.bit_size() as u16)?;
        w.write_all(&self.0)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        2 + self.0.len()
    }
}

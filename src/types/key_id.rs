use std::io;

use bytes::Buf;

use crate::errors::Result;
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Represents a Key ID, the low 64 bits of a key fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, derive_more::Debug, derive_more::Display)]
#[display("{}", hex::encode(_0))]
#[debug("KeyId({})", hex::encode(_0))]
pub struct KeyId([u8; 8]);

impl KeyId {
    pub fn from_buf<B: Buf>(mut b: B) -> Result<Self> {
        let arr = b.read_array::<8>()?;
        Ok(KeyId(arr))
    }

    pub fn from_slice(input: &[u8]) -> Result<Self> {
        ensure_eq!(input.len(), 8, "invalid key id length");
        let mut arr = [0u8; 8];
        arr.copy_from_slice(input);
        Ok(KeyId(arr))
    }

    pub fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 8]> for KeyId {
    fn from(val: [u8; 8]) -> Self {
        KeyId(val)
    }
}

impl Serialize for KeyId {
    fn to_writer<W: io::Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.0)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_id_from_slice() {
        let id = KeyId::from_slice(&[0x4C, 0x07, 0x3A, 0xE0, 0xC8, 0x44, 0x5C, 0x0C]).unwrap();
        assert_eq!(format!("{id}"), "4c073ae0c8445c0c");
        assert_eq!(id.to_bytes().unwrap().len(), 8);

        assert!(KeyId::from_slice(&[0x01, 0x02]).is_err());
    }
}

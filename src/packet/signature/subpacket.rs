use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, Bytes};
use chrono::{DateTime, Duration, Utc};
use smallvec::SmallVec;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::packet::signature::Signature;
use crate::packet::PacketHeader;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{CompressionAlgorithm, KeyId, Tag};

/// Defined signature subpacket types.
///
/// This is a closed set: an id outside of it fails the parse, carrying
/// the offending id in the error.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.2.3.1>
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum SubpacketType {
    SignatureCreationTime = 2,
    SignatureExpirationTime = 3,
    ExportableCertification = 4,
    TrustSignature = 5,
    RegularExpression = 6,
    Revocable = 7,
    KeyExpirationTime = 9,
    Placeholder = 10,
    PreferredSymmetricAlgorithms = 11,
    RevocationKey = 12,
    Issuer = 16,
    Notation = 20,
    PreferredHashAlgorithms = 21,
    PreferredCompressionAlgorithms = 22,
    KeyServerPreferences = 23,
    PreferredKeyServer = 24,
    PrimaryUserId = 25,
    PolicyURI = 26,
    KeyFlags = 27,
    SignersUserID = 28,
    RevocationReason = 29,
    Features = 30,
    SignatureTarget = 31,
    EmbeddedSignature = 32,
    IssuerFingerprint = 33,
}

impl SubpacketType {
    /// Splits the raw type octet into the type and the critical bit.
    pub fn from_u8(n: u8) -> Result<(Self, bool)> {
        let is_critical = n & 0b1000_0000 != 0;
        let typ = match n & 0b0111_1111 {
            2 => SubpacketType::SignatureCreationTime,
            3 => SubpacketType::SignatureExpirationTime,
            4 => SubpacketType::ExportableCertification,
            5 => SubpacketType::TrustSignature,
            6 => SubpacketType::RegularExpression,
            7 => SubpacketType::Revocable,
            9 => SubpacketType::KeyExpirationTime,
            10 => SubpacketType::Placeholder,
            11 => SubpacketType::PreferredSymmetricAlgorithms,
            12 => SubpacketType::RevocationKey,
            16 => SubpacketType::Issuer,
            20 => SubpacketType::Notation,
            21 => SubpacketType::PreferredHashAlgorithms,
            22 => SubpacketType::PreferredCompressionAlgorithms,
            23 => SubpacketType::KeyServerPreferences,
            24 => SubpacketType::PreferredKeyServer,
            25 => SubpacketType::PrimaryUserId,
            26 => SubpacketType::PolicyURI,
            27 => SubpacketType::KeyFlags,
            28 => SubpacketType::SignersUserID,
            29 => SubpacketType::RevocationReason,
            30 => SubpacketType::Features,
            31 => SubpacketType::SignatureTarget,
            32 => SubpacketType::EmbeddedSignature,
            33 => SubpacketType::IssuerFingerprint,
            typ => return Err(Error::InvalidSubpacketType { typ }),
        };
        Ok((typ, is_critical))
    }

    pub fn as_u8(self, is_critical: bool) -> u8 {
        let base = self as u8;
        if is_critical {
            base | 0b1000_0000
        } else {
            base
        }
    }
}

/// Length prefix of a subpacket, covering the type octet and the body.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SubpacketLength {
    One(u8),
    Two(u16),
    Five(u32),
}

impl SubpacketLength {
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let olen = i.read_u8()?;
        match olen {
            0..=191 => Ok(SubpacketLength::One(olen)),
            192..=254 => {
                let a = i.read_u8()?;
                let l = ((olen as u16 - 192) << 8) + 192 + a as u16;
                Ok(SubpacketLength::Two(l))
            }
            255 => {
                let len = i.read_be_u32()?;
                Ok(SubpacketLength::Five(len))
            }
        }
    }

    /// Minimal encoding of the given length.
    pub fn new(len: usize) -> Result<Self> {
        if len < 192 {
            Ok(SubpacketLength::One(len as u8))
        } else if len < 16320 {
            Ok(SubpacketLength::Two(len as u16))
        } else {
            Ok(SubpacketLength::Five(len.try_into()?))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SubpacketLength::One(l) => *l as usize,
            SubpacketLength::Two(l) => *l as usize,
            SubpacketLength::Five(l) => *l as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for SubpacketLength {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            SubpacketLength::One(l) => {
                writer.write_u8(*l)?;
            }
            SubpacketLength::Two(l) => {
                writer.write_u8((((l - 192) >> 8) + 192) as u8)?;
                writer.write_u8(((l - 192) & 0xFF) as u8)?;
            }
            SubpacketLength::Five(l) => {
                writer.write_u8(255)?;
                writer.write_u32::<BigEndian>(*l)?;
            }
        }
        Ok(())
    }

    fn write_len(&self) -> usize {
        match self {
            SubpacketLength::One(_) => 1,
            SubpacketLength::Two(_) => 2,
            SubpacketLength::Five(_) => 5,
        }
    }
}

/// Notation Data subpacket body.
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct Notation {
    pub readable: bool,
    #[debug("{}", hex::encode(name))]
    pub name: Bytes,
    #[debug("{}", hex::encode(value))]
    pub value: Bytes,
}

/// Revocation Key subpacket body.
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct RevocationKey {
    pub class: u8,
    pub algorithm: PublicKeyAlgorithm,
    #[debug("{}", hex::encode(fingerprint))]
    pub fingerprint: [u8; 20],
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Subpacket {
    pub is_critical: bool,
    pub data: SubpacketData,
    len: SubpacketLength,
}

#[derive(derive_more::Debug, PartialEq, Eq, Clone)]
pub enum SubpacketData {
    /// The time the signature was made.
    SignatureCreationTime(DateTime<Utc>),
    /// The time the signature will expire, relative to creation.
    SignatureExpirationTime(Duration),
    ExportableCertification(bool),
    TrustSignature(u8, u8),
    RegularExpression(#[debug("{}", hex::encode(_0))] Bytes),
    Revocable(bool),
    /// The time the key will expire, relative to key creation.
    KeyExpirationTime(Duration),
    Placeholder(#[debug("{}", hex::encode(_0))] Bytes),
    PreferredSymmetricKeyAlgorithms(SmallVec<[SymmetricKeyAlgorithm; 8]>),
    RevocationKey(RevocationKey),
    Issuer(KeyId),
    Notation(Notation),
    PreferredHashAlgorithms(SmallVec<[HashAlgorithm; 8]>),
    PreferredCompressionAlgorithms(SmallVec<[CompressionAlgorithm; 8]>),
    KeyServerPreferences(#[debug("{}", hex::encode(_0))] Bytes),
    PreferredKeyServer(#[debug("{}", hex::encode(_0))] Bytes),
    IsPrimary(bool),
    PolicyURI(#[debug("{}", hex::encode(_0))] Bytes),
    KeyFlags(#[debug("{}", hex::encode(_0))] Bytes),
    SignersUserID(#[debug("{}", hex::encode(_0))] Bytes),
    /// Code octet plus a human readable reason string.
    RevocationReason(u8, #[debug("{}", hex::encode(_1))] Bytes),
    Features(#[debug("{}", hex::encode(_0))] Bytes),
    SignatureTarget(
        PublicKeyAlgorithm,
        HashAlgorithm,
        #[debug("{}", hex::encode(_2))] Bytes,
    ),
    EmbeddedSignature(Box<Signature>),
    IssuerFingerprint(u8, #[debug("{}", hex::encode(_1))] Bytes),
}

impl Subpacket {
    /// Creates a non-critical subpacket.
    pub fn regular(data: SubpacketData) -> Result<Self> {
        let len = SubpacketLength::new(1 + data.write_len())?;
        Ok(Subpacket {
            is_critical: false,
            data,
            len,
        })
    }

    /// Creates a critical subpacket.
    pub fn critical(data: SubpacketData) -> Result<Self> {
        let len = SubpacketLength::new(1 + data.write_len())?;
        Ok(Subpacket {
            is_critical: true,
            data,
            len,
        })
    }

    /// Parses a single subpacket: length, type octet, body.
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let len = SubpacketLength::from_buf(&mut i)?;
        ensure!(!len.is_empty(), "empty subpacket");
        let mut body = i.read_take(len.len())?;

        let (typ, is_critical) = SubpacketType::from_u8(body.read_u8()?)?;
        let data = SubpacketData::try_from_buf(typ, &mut body)?;

        Ok(Subpacket {
            is_critical,
            data,
            len,
        })
    }

    pub fn typ(&self) -> SubpacketType {
        self.data.typ()
    }
}

impl Serialize for Subpacket {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        self.len.to_writer(writer)?;
        writer.write_u8(self.typ().as_u8(self.is_critical))?;
        self.data.to_writer(writer)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.len.write_len() + 1 + self.data.write_len()
    }
}

impl SubpacketData {
    pub fn typ(&self) -> SubpacketType {
        match self {
            SubpacketData::SignatureCreationTime(_) => SubpacketType::SignatureCreationTime,
            SubpacketData::SignatureExpirationTime(_) => SubpacketType::SignatureExpirationTime,
            SubpacketData::ExportableCertification(_) => SubpacketType::ExportableCertification,
            SubpacketData::TrustSignature(_, _) => SubpacketType::TrustSignature,
            SubpacketData::RegularExpression(_) => SubpacketType::RegularExpression,
            SubpacketData::Revocable(_) => SubpacketType::Revocable,
            SubpacketData::KeyExpirationTime(_) => SubpacketType::KeyExpirationTime,
            SubpacketData::Placeholder(_) => SubpacketType::Placeholder,
            SubpacketData::PreferredSymmetricKeyAlgorithms(_) => {
                SubpacketType::PreferredSymmetricAlgorithms
            }
            SubpacketData::RevocationKey(_) => SubpacketType::RevocationKey,
            SubpacketData::Issuer(_) => SubpacketType::Issuer,
            SubpacketData::Notation(_) => SubpacketType::Notation,
            SubpacketData::PreferredHashAlgorithms(_) => SubpacketType::PreferredHashAlgorithms,
            SubpacketData::PreferredCompressionAlgorithms(_) => {
                SubpacketType::PreferredCompressionAlgorithms
            }
            SubpacketData::KeyServerPreferences(_) => SubpacketType::KeyServerPreferences,
            SubpacketData::PreferredKeyServer(_) => SubpacketType::PreferredKeyServer,
            SubpacketData::IsPrimary(_) => SubpacketType::PrimaryUserId,
            SubpacketData::PolicyURI(_) => SubpacketType::PolicyURI,
            SubpacketData::KeyFlags(_) => SubpacketType::KeyFlags,
            SubpacketData::SignersUserID(_) => SubpacketType::SignersUserID,
            SubpacketData::RevocationReason(_, _) => SubpacketType::RevocationReason,
            SubpacketData::Features(_) => SubpacketType::Features,
            SubpacketData::SignatureTarget(_, _, _) => SubpacketType::SignatureTarget,
            SubpacketData::EmbeddedSignature(_) => SubpacketType::EmbeddedSignature,
            SubpacketData::IssuerFingerprint(_, _) => SubpacketType::IssuerFingerprint,
        }
    }

    /// Parses the body of a subpacket of the given type.
    pub fn try_from_buf<B: Buf>(typ: SubpacketType, mut i: B) -> Result<Self> {
        let data = match typ {
            SubpacketType::SignatureCreationTime => {
                let timestamp = i.read_be_u32()?;
                let created = DateTime::<Utc>::from_timestamp(timestamp.into(), 0)
                    .ok_or_else(|| format_err!("invalid creation time"))?;
                SubpacketData::SignatureCreationTime(created)
            }
            SubpacketType::SignatureExpirationTime => {
                let seconds = i.read_be_u32()?;
                SubpacketData::SignatureExpirationTime(Duration::seconds(seconds.into()))
            }
            SubpacketType::ExportableCertification => {
                SubpacketData::ExportableCertification(i.read_u8()? != 0)
            }
            SubpacketType::TrustSignature => {
                let depth = i.read_u8()?;
                let value = i.read_u8()?;
                SubpacketData::TrustSignature(depth, value)
            }
            SubpacketType::RegularExpression => SubpacketData::RegularExpression(i.rest()),
            SubpacketType::Revocable => SubpacketData::Revocable(i.read_u8()? != 0),
            SubpacketType::KeyExpirationTime => {
                let seconds = i.read_be_u32()?;
                SubpacketData::KeyExpirationTime(Duration::seconds(seconds.into()))
            }
            SubpacketType::Placeholder => SubpacketData::Placeholder(i.rest()),
            SubpacketType::PreferredSymmetricAlgorithms => {
                let algs = i.rest().iter().map(|v| (*v).into()).collect();
                SubpacketData::PreferredSymmetricKeyAlgorithms(algs)
            }
            SubpacketType::RevocationKey => {
                let class = i.read_u8()?;
                let algorithm = i.read_u8()?.into();
                let fingerprint = i.read_array::<20>()?;
                SubpacketData::RevocationKey(RevocationKey {
                    class,
                    algorithm,
                    fingerprint,
                })
            }
            SubpacketType::Issuer => SubpacketData::Issuer(KeyId::from_buf(&mut i)?),
            SubpacketType::Notation => {
                let flags = i.read_array::<4>()?;
                let name_len = i.read_be_u16()?;
                let value_len = i.read_be_u16()?;
                let name = i.read_take(name_len.into())?;
                let value = i.read_take(value_len.into())?;
                SubpacketData::Notation(Notation {
                    readable: flags[0] & 0x80 != 0,
                    name,
                    value,
                })
            }
            SubpacketType::PreferredHashAlgorithms => {
                let algs = i.rest().iter().map(|v| (*v).into()).collect();
                SubpacketData::PreferredHashAlgorithms(algs)
            }
            SubpacketType::PreferredCompressionAlgorithms => {
                let algs = i.rest().iter().map(|v| (*v).into()).collect();
                SubpacketData::PreferredCompressionAlgorithms(algs)
            }
            SubpacketType::KeyServerPreferences => {
                SubpacketData::KeyServerPreferences(i.rest())
            }
            SubpacketType::PreferredKeyServer => SubpacketData::PreferredKeyServer(i.rest()),
            SubpacketType::PrimaryUserId => SubpacketData::IsPrimary(i.read_u8()? != 0),
            SubpacketType::PolicyURI => SubpacketData::PolicyURI(i.rest()),
            SubpacketType::KeyFlags => SubpacketData::KeyFlags(i.rest()),
            SubpacketType::SignersUserID => SubpacketData::SignersUserID(i.rest()),
            SubpacketType::RevocationReason => {
                let code = i.read_u8()?;
                SubpacketData::RevocationReason(code, i.rest())
            }
            SubpacketType::Features => SubpacketData::Features(i.rest()),
            SubpacketType::SignatureTarget => {
                let pub_alg = i.read_u8()?.into();
                let hash_alg = i.read_u8()?.into();
                SubpacketData::SignatureTarget(pub_alg, hash_alg, i.rest())
            }
            SubpacketType::EmbeddedSignature => {
                let body = i.rest();
                let header = PacketHeader::new_fixed(Tag::Signature, body.len());
                let sig = Signature::try_from_buf(header, body)?;
                SubpacketData::EmbeddedSignature(Box::new(sig))
            }
            SubpacketType::IssuerFingerprint => {
                let version = i.read_u8()?;
                SubpacketData::IssuerFingerprint(version, i.rest())
            }
        };

        Ok(data)
    }
}

impl Serialize for SubpacketData {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            SubpacketData::SignatureCreationTime(t) => {
                writer.write_u32::<BigEndian>(t.timestamp() as u32)?;
            }
            SubpacketData::SignatureExpirationTime(d) | SubpacketData::KeyExpirationTime(d) => {
                writer.write_u32::<BigEndian>(d.num_seconds() as u32)?;
            }
            SubpacketData::ExportableCertification(v)
            | SubpacketData::Revocable(v)
            | SubpacketData::IsPrimary(v) => {
                writer.write_u8(u8::from(*v))?;
            }
            SubpacketData::TrustSignature(depth, value) => {
                writer.write_u8(*depth)?;
                writer.write_u8(*value)?;
            }
            SubpacketData::RegularExpression(b)
            | SubpacketData::Placeholder(b)
            | SubpacketData::KeyServerPreferences(b)
            | SubpacketData::PreferredKeyServer(b)
            | SubpacketData::PolicyURI(b)
            | SubpacketData::KeyFlags(b)
            | SubpacketData::SignersUserID(b)
            | SubpacketData::Features(b) => {
                writer.write_all(b)?;
            }
            SubpacketData::PreferredSymmetricKeyAlgorithms(algs) => {
                for alg in algs {
                    writer.write_u8((*alg).into())?;
                }
            }
            SubpacketData::RevocationKey(rk) => {
                writer.write_u8(rk.class)?;
                writer.write_u8(rk.algorithm.into())?;
                writer.write_all(&rk.fingerprint)?;
            }
            SubpacketData::Issuer(id) => {
                id.to_writer(writer)?;
            }
            SubpacketData::Notation(n) => {
                let flags = [if n.readable { 0x80 } else { 0 }, 0, 0, 0];
                writer.write_all(&flags)?;
                writer.write_u16::<BigEndian>(n.name.len() as u16)?;
                writer.write_u16::<BigEndian>(n.value.len() as u16)?;
                writer.write_all(&n.name)?;
                writer.write_all(&n.value)?;
            }
            SubpacketData::PreferredHashAlgorithms(algs) => {
                for alg in algs {
                    writer.write_u8((*alg).into())?;
                }
            }
            SubpacketData::PreferredCompressionAlgorithms(algs) => {
                for alg in algs {
                    writer.write_u8((*alg).into())?;
                }
            }
            SubpacketData::RevocationReason(code, reason) => {
                writer.write_u8(*code)?;
                writer.write_all(reason)?;
            }
            SubpacketData::SignatureTarget(pub_alg, hash_alg, digest) => {
                writer.write_u8((*pub_alg).into())?;
                writer.write_u8((*hash_alg).into())?;
                writer.write_all(digest)?;
            }
            SubpacketData::EmbeddedSignature(sig) => {
                sig.to_writer(writer)?;
            }
            SubpacketData::IssuerFingerprint(version, fp) => {
                writer.write_u8(*version)?;
                writer.write_all(fp)?;
            }
        }
        Ok(())
    }

    fn write_len(&self) -> usize {
        match self {
            SubpacketData::SignatureCreationTime(_)
            | SubpacketData::SignatureExpirationTime(_)
            | SubpacketData::KeyExpirationTime(_) => 4,
            SubpacketData::ExportableCertification(_)
            | SubpacketData::Revocable(_)
            | SubpacketData::IsPrimary(_) => 1,
            SubpacketData::TrustSignature(_, _) => 2,
            SubpacketData::RegularExpression(b)
            | SubpacketData::Placeholder(b)
            | SubpacketData::KeyServerPreferences(b)
            | SubpacketData::PreferredKeyServer(b)
            | SubpacketData::PolicyURI(b)
            | SubpacketData::KeyFlags(b)
            | SubpacketData::SignersUserID(b)
            | SubpacketData::Features(b) => b.len(),
            SubpacketData::PreferredSymmetricKeyAlgorithms(algs) => algs.len(),
            SubpacketData::RevocationKey(_) => 22,
            SubpacketData::Issuer(_) => 8,
            SubpacketData::Notation(n) => 4 + 2 + 2 + n.name.len() + n.value.len(),
            SubpacketData::PreferredHashAlgorithms(algs) => algs.len(),
            SubpacketData::PreferredCompressionAlgorithms(algs) => algs.len(),
            SubpacketData::RevocationReason(_, reason) => 1 + reason.len(),
            SubpacketData::SignatureTarget(_, _, digest) => 2 + digest.len(),
            SubpacketData::EmbeddedSignature(sig) => sig.write_len(),
            SubpacketData::IssuerFingerprint(_, fp) => 1 + fp.len(),
        }
    }
}

/// Parses all subpackets of one region (hashed or unhashed).
pub fn subpackets_from_buf<B: Buf>(mut i: B) -> Result<Vec<Subpacket>> {
    let mut packets = Vec::new();
    while i.has_remaining() {
        packets.push(Subpacket::from_buf(&mut i)?);
    }
    Ok(packets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_octet_critical_bit() {
        let (typ, critical) = SubpacketType::from_u8(0x82).unwrap();
        assert_eq!(typ, SubpacketType::SignatureCreationTime);
        assert!(critical);
        assert_eq!(typ.as_u8(true), 0x82);
        assert_eq!(typ.as_u8(false), 0x02);

        let (typ, critical) = SubpacketType::from_u8(16).unwrap();
        assert_eq!(typ, SubpacketType::Issuer);
        assert!(!critical);
    }

    #[test]
    fn test_unknown_type_fails_closed() {
        // 34 and up are not defined here
        let err = SubpacketType::from_u8(34).unwrap_err();
        assert!(matches!(err, Error::InvalidSubpacketType { typ: 34 }));
        // critical bit is stripped before the check
        let err = SubpacketType::from_u8(0x80 | 64).unwrap_err();
        assert!(matches!(err, Error::InvalidSubpacketType { typ: 64 }));
    }

    #[test]
    fn test_length_codec() {
        let len = SubpacketLength::from_buf(&mut &[5u8][..]).unwrap();
        assert_eq!(len, SubpacketLength::One(5));
        assert_eq!(len.len(), 5);

        // ((0xC0 - 192) << 8) + 192 + 0x10 = 208
        let len = SubpacketLength::from_buf(&mut &[0xC0u8, 0x10][..]).unwrap();
        assert_eq!(len, SubpacketLength::Two(208));
        let mut out = Vec::new();
        len.to_writer(&mut out).unwrap();
        assert_eq!(out, vec![0xC0, 0x10]);

        let len = SubpacketLength::from_buf(&mut &[0xFFu8, 0x00, 0x01, 0x00, 0x00][..]).unwrap();
        assert_eq!(len, SubpacketLength::Five(65536));
        let mut out = Vec::new();
        len.to_writer(&mut out).unwrap();
        assert_eq!(out, vec![0xFF, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_creation_time_roundtrip() {
        // len 5, type 2, four octet timestamp
        let data = [0x05u8, 0x02, 0x5C, 0x5E, 0x72, 0x53];
        let sp = Subpacket::from_buf(&mut &data[..]).unwrap();
        assert_eq!(sp.typ(), SubpacketType::SignatureCreationTime);
        assert!(!sp.is_critical);
        assert_eq!(sp.to_bytes().unwrap(), data);
        assert_eq!(sp.write_len(), data.len());
    }

    #[test]
    fn test_issuer_roundtrip() {
        let sp = Subpacket::regular(SubpacketData::Issuer(KeyId::from([
            1, 2, 3, 4, 5, 6, 7, 8,
        ])))
        .unwrap();
        let bytes = sp.to_bytes().unwrap();
        assert_eq!(bytes[0], 9); // length: type octet + 8
        assert_eq!(bytes[1], 16); // issuer type
        let back = Subpacket::from_buf(&mut &bytes[..]).unwrap();
        assert_eq!(sp, back);
    }

    #[test]
    fn test_notation_roundtrip() {
        let sp = Subpacket::regular(SubpacketData::Notation(Notation {
            readable: true,
            name: Bytes::from_static(b"test@example.org"),
            value: Bytes::from_static(b"yes"),
        }))
        .unwrap();
        let bytes = sp.to_bytes().unwrap();
        let back = Subpacket::from_buf(&mut &bytes[..]).unwrap();
        assert_eq!(sp, back);
    }

    #[test]
    fn test_critical_roundtrip() {
        let sp = Subpacket::critical(SubpacketData::ExportableCertification(false)).unwrap();
        let bytes = sp.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x02, 0x80 | 4, 0x00]);
        let back = Subpacket::from_buf(&mut &bytes[..]).unwrap();
        assert!(back.is_critical);
        assert_eq!(sp, back);
    }

    #[test]
    fn test_undefined_subpacket_rejected() {
        // len 2, type 99, one body octet
        let data = [0x02u8, 99, 0x00];
        let err = Subpacket::from_buf(&mut &data[..]).unwrap_err();
        assert!(matches!(err, Error::InvalidSubpacketType { typ: 99 }));
    }

    #[test]
    fn test_region_parse() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x05, 0x02, 0x00, 0x00, 0x00, 0x01]);
        data.extend_from_slice(&[0x09, 0x10, 1, 2, 3, 4, 5, 6, 7, 8]);
        let subpackets = subpackets_from_buf(&mut &data[..]).unwrap();
        assert_eq!(subpackets.len(), 2);
        assert_eq!(subpackets[0].typ(), SubpacketType::SignatureCreationTime);
        assert_eq!(subpackets[1].typ(), SubpacketType::Issuer);
    }

    #[test]
    fn test_expiration_roundtrip() {
        let sp =
            Subpacket::regular(SubpacketData::KeyExpirationTime(Duration::seconds(86400))).unwrap();
        let bytes = sp.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x05, 9, 0x00, 0x01, 0x51, 0x80]);
        let back = Subpacket::from_buf(&mut &bytes[..]).unwrap();
        assert_eq!(sp, back);
    }

    #[test]
    fn test_preferred_algorithms() {
        // AES256, AES192, AES128
        let data = [0x04u8, 11, 9, 8, 7];
        let sp = Subpacket::from_buf(&mut &data[..]).unwrap();
        match &sp.data {
            SubpacketData::PreferredSymmetricKeyAlgorithms(algs) => {
                assert_eq!(
                    algs.as_slice(),
                    &[
                        SymmetricKeyAlgorithm::AES256,
                        SymmetricKeyAlgorithm::AES192,
                        SymmetricKeyAlgorithm::AES128,
                    ]
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(sp.to_bytes().unwrap(), data);
    }
}

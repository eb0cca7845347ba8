mod subpacket;

pub use self::subpacket::{
    subpackets_from_buf, Notation, RevocationKey, Subpacket, SubpacketData, SubpacketLength,
    SubpacketType,
};

use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;
use chrono::{DateTime, Duration, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::{Result, ValidationError};
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyId, MpiBytes, Tag};

#[derive(Debug, PartialEq, Eq, Clone, Copy, IntoPrimitive)]
#[repr(u8)]
pub enum SignatureVersion {
    V2 = 2,
    V3 = 3,
    V4 = 4,
}

/// Signature classification.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.2.1>
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive, IntoPrimitive, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum SignatureType {
    /// Signature of a binary document
    Binary = 0x00,
    /// Signature of a canonical text document
    Text = 0x01,
    /// Standalone signature
    Standalone = 0x02,
    /// Generic certification of a User ID and Public-Key packet
    CertGeneric = 0x10,
    /// Persona certification of a User ID and Public-Key packet
    CertPersona = 0x11,
    /// Casual certification of a User ID and Public-Key packet
    CertCasual = 0x12,
    /// Positive certification of a User ID and Public-Key packet
    CertPositive = 0x13,
    /// Subkey Binding Signature
    SubkeyBinding = 0x18,
    /// Primary Key Binding Signature
    KeyBinding = 0x19,
    /// Signature directly on a key
    Key = 0x1F,
    /// Key revocation signature
    KeyRevocation = 0x20,
    /// Subkey revocation signature
    SubkeyRevocation = 0x28,
    /// Certification revocation signature
    CertRevocation = 0x30,
    /// Timestamp signature
    Timestamp = 0x40,
    /// Third-Party Confirmation signature
    ThirdParty = 0x50,

    #[num_enum(catch_all)]
    Other(u8),
}

/// The material only present in some signature versions.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SignatureVersionSpecific {
    /// v2 and v3 signatures carry creation time and issuer directly.
    V3 {
        created: DateTime<Utc>,
        issuer: KeyId,
    },
    V4,
}

/// Resolved timing information of a signature.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SignatureTimes {
    pub created: DateTime<Utc>,
    pub expires: Option<DateTime<Utc>>,
    pub key_expires: Option<DateTime<Utc>>,
}

/// Signature Packet.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.2>
#[derive(derive_more::Debug, PartialEq, Eq, Clone)]
pub struct Signature {
    packet_header: PacketHeader,
    version: SignatureVersion,
    typ: SignatureType,
    pub_alg: PublicKeyAlgorithm,
    hash_alg: HashAlgorithm,
    version_specific: SignatureVersionSpecific,
    hashed_subpackets: Vec<Subpacket>,
    unhashed_subpackets: Vec<Subpacket>,
    /// The left 16 bits of the signed hash value.
    #[debug("{}", hex::encode(signed_hash_value))]
    signed_hash_value: [u8; 2],
    signature: Vec<MpiBytes>,
}

impl Signature {
    /// Parses a `Signature` packet from the given buffer.
    pub fn try_from_buf<B: Buf>(packet_header: PacketHeader, mut i: B) -> Result<Self> {
        let version = i.read_u8()?;
        match version {
            2 | 3 => Self::try_from_buf_v3(packet_header, version, i),
            4 => Self::try_from_buf_v4(packet_header, i),
            _ => unsupported_err!("signature version {}", version),
        }
    }

    fn try_from_buf_v3<B: Buf>(
        packet_header: PacketHeader,
        version: u8,
        mut i: B,
    ) -> Result<Self> {
        // Length of the hashed material: type octet plus the four
        // octet creation time. Fixed by the format.
        let hashed_len = i.read_u8()?;
        ensure_eq!(hashed_len, 5, "invalid hashed material length");

        let typ = i.read_u8()?.into();
        let created = i.read_be_u32()?;
        let created = DateTime::<Utc>::from_timestamp(created.into(), 0)
            .ok_or_else(|| format_err!("invalid creation time"))?;
        let issuer = KeyId::from_buf(&mut i)?;
        let pub_alg = i.read_u8()?.into();
        let hash_alg = i.read_u8()?.into();
        let signed_hash_value = i.read_array::<2>()?;
        let signature = read_mpis(i)?;

        Ok(Signature {
            packet_header,
            version: if version == 2 {
                SignatureVersion::V2
            } else {
                SignatureVersion::V3
            },
            typ,
            pub_alg,
            hash_alg,
            version_specific: SignatureVersionSpecific::V3 { created, issuer },
            hashed_subpackets: Vec::new(),
            unhashed_subpackets: Vec::new(),
            signed_hash_value,
            signature,
        })
    }

    fn try_from_buf_v4<B: Buf>(packet_header: PacketHeader, mut i: B) -> Result<Self> {
        let typ = i.read_u8()?.into();
        let pub_alg = i.read_u8()?.into();
        let hash_alg = i.read_u8()?.into();

        let hashed_len = i.read_be_u16()?;
        let hashed_buf = i.read_take(hashed_len.into())?;
        let hashed_subpackets = subpackets_from_buf(hashed_buf)?;

        let unhashed_len = i.read_be_u16()?;
        let unhashed_buf = i.read_take(unhashed_len.into())?;
        let unhashed_subpackets = subpackets_from_buf(unhashed_buf)?;

        let signed_hash_value = i.read_array::<2>()?;
        let signature = read_mpis(i)?;

        Ok(Signature {
            packet_header,
            version: SignatureVersion::V4,
            typ,
            pub_alg,
            hash_alg,
            version_specific: SignatureVersionSpecific::V4,
            hashed_subpackets,
            unhashed_subpackets,
            signed_hash_value,
            signature,
        })
    }

    /// Creates a v4 signature packet.
    pub fn v4(
        typ: SignatureType,
        pub_alg: PublicKeyAlgorithm,
        hash_alg: HashAlgorithm,
        hashed_subpackets: Vec<Subpacket>,
        unhashed_subpackets: Vec<Subpacket>,
        signed_hash_value: [u8; 2],
        signature: Vec<MpiBytes>,
    ) -> Self {
        let mut sig = Signature {
            packet_header: PacketHeader::new_fixed(Tag::Signature, 0),
            version: SignatureVersion::V4,
            typ,
            pub_alg,
            hash_alg,
            version_specific: SignatureVersionSpecific::V4,
            hashed_subpackets,
            unhashed_subpackets,
            signed_hash_value,
            signature,
        };
        sig.packet_header = PacketHeader::new_fixed(Tag::Signature, sig.write_len());
        sig
    }

    /// Creates a v3 signature packet.
    pub fn v3(
        typ: SignatureType,
        pub_alg: PublicKeyAlgorithm,
        hash_alg: HashAlgorithm,
        created: DateTime<Utc>,
        issuer: KeyId,
        signed_hash_value: [u8; 2],
        signature: Vec<MpiBytes>,
    ) -> Self {
        let mut sig = Signature {
            packet_header: PacketHeader::new_fixed(Tag::Signature, 0),
            version: SignatureVersion::V3,
            typ,
            pub_alg,
            hash_alg,
            version_specific: SignatureVersionSpecific::V3 { created, issuer },
            hashed_subpackets: Vec::new(),
            unhashed_subpackets: Vec::new(),
            signed_hash_value,
            signature,
        };
        sig.packet_header = PacketHeader::new_fixed(Tag::Signature, sig.write_len());
        sig
    }

    pub fn version(&self) -> SignatureVersion {
        self.version
    }

    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    pub fn pub_alg(&self) -> PublicKeyAlgorithm {
        self.pub_alg
    }

    pub fn hash_alg(&self) -> HashAlgorithm {
        self.hash_alg
    }

    pub fn hashed_subpackets(&self) -> &[Subpacket] {
        &self.hashed_subpackets
    }

    pub fn unhashed_subpackets(&self) -> &[Subpacket] {
        &self.unhashed_subpackets
    }

    pub fn signed_hash_value(&self) -> [u8; 2] {
        self.signed_hash_value
    }

    pub fn signature(&self) -> &[MpiBytes] {
        &self.signature
    }

    /// Finds the first subpacket of the given type. A match in the
    /// unhashed area takes precedence over one in the hashed area.
    pub fn find_subpacket(&self, typ: SubpacketType) -> Option<&Subpacket> {
        let mut found = self.hashed_subpackets.iter().find(|sp| sp.typ() == typ);
        if let Some(sp) = self.unhashed_subpackets.iter().find(|sp| sp.typ() == typ) {
            found = Some(sp);
        }
        found
    }

    /// Resolves creation and expiration times.
    ///
    /// For v4 signatures the creation time must be present in the
    /// hashed area. Expiration deltas may come from either area, with
    /// the unhashed area winning; a delta of zero means no expiration.
    pub fn times(&self) -> Result<SignatureTimes> {
        if let SignatureVersionSpecific::V3 { created, .. } = &self.version_specific {
            return Ok(SignatureTimes {
                created: *created,
                expires: None,
                key_expires: None,
            });
        }

        // The creation time must come from the hashed area; expiration
        // deltas from the unhashed area replace hashed ones. Within an
        // area, duplicates keep overwriting, so the last one wins.
        let mut created = None;
        let mut sig_delta = None;
        let mut key_delta = None;

        for sp in &self.hashed_subpackets {
            match &sp.data {
                SubpacketData::SignatureCreationTime(t) => {
                    created = Some(*t);
                }
                SubpacketData::SignatureExpirationTime(d) => {
                    sig_delta = Some(*d);
                }
                SubpacketData::KeyExpirationTime(d) => {
                    key_delta = Some(*d);
                }
                _ => {}
            }
        }

        for sp in &self.unhashed_subpackets {
            match &sp.data {
                SubpacketData::SignatureExpirationTime(d) => {
                    sig_delta = Some(*d);
                }
                SubpacketData::KeyExpirationTime(d) => {
                    key_delta = Some(*d);
                }
                _ => {}
            }
        }

        let created = created.ok_or_else(|| format_err!("signature without creation time"))?;

        Ok(SignatureTimes {
            created,
            expires: expiry(created, sig_delta),
            key_expires: expiry(created, key_delta),
        })
    }

    /// Returns the issuer key id, preferring the unhashed area.
    pub fn issuer_key_id(&self) -> Option<KeyId> {
        if let SignatureVersionSpecific::V3 { issuer, .. } = &self.version_specific {
            return Some(*issuer);
        }

        for area in [&self.unhashed_subpackets, &self.hashed_subpackets] {
            for sp in area.iter() {
                if let SubpacketData::Issuer(id) = &sp.data {
                    return Some(*id);
                }
            }
        }
        None
    }

    /// Sets the creation time, replacing the first existing creation
    /// time subpacket in the hashed area or appending a new one.
    pub fn set_created(&mut self, created: DateTime<Utc>) -> Result<()> {
        if let SignatureVersionSpecific::V3 {
            created: ref mut c, ..
        } = self.version_specific
        {
            *c = created;
            return Ok(());
        }

        let new = Subpacket::regular(SubpacketData::SignatureCreationTime(created))?;
        upsert(
            &mut self.hashed_subpackets,
            SubpacketType::SignatureCreationTime,
            new,
        );
        Ok(())
    }

    /// Sets the issuer key id, replacing the first existing issuer
    /// subpacket in the unhashed area or appending a new one.
    pub fn set_issuer(&mut self, issuer: KeyId) -> Result<()> {
        if let SignatureVersionSpecific::V3 {
            issuer: ref mut id, ..
        } = self.version_specific
        {
            *id = issuer;
            return Ok(());
        }

        let new = Subpacket::regular(SubpacketData::Issuer(issuer))?;
        upsert(&mut self.unhashed_subpackets, SubpacketType::Issuer, new);
        Ok(())
    }

    /// The octets covered by the hash, up to and including the hashed
    /// subpacket area.
    pub fn hashed_area_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match &self.version_specific {
            SignatureVersionSpecific::V3 { created, .. } => {
                out.write_u8(self.typ.into())?;
                out.write_u32::<BigEndian>(created.timestamp() as u32)?;
            }
            SignatureVersionSpecific::V4 => {
                out.write_u8(self.version.into())?;
                out.write_u8(self.typ.into())?;
                out.write_u8(self.pub_alg.into())?;
                out.write_u8(self.hash_alg.into())?;
                let hashed_len = self.hashed_subpackets.write_len();
                out.write_u16::<BigEndian>(hashed_len.try_into()?)?;
                self.hashed_subpackets.to_writer(&mut out)?;
            }
        }
        Ok(out)
    }

    /// Checks the decoded fields against the known algorithm sets.
    ///
    /// With `strict_mpis` the signature MPI count must match what the
    /// public key algorithm produces; otherwise any non-empty set of
    /// MPIs passes.
    pub fn validate(&self, strict_mpis: bool) -> Result<(), ValidationError> {
        if let SignatureType::Other(typ) = self.typ {
            return Err(ValidationError::InvalidSignatureType { typ });
        }
        if let PublicKeyAlgorithm::Unknown(alg) = self.pub_alg {
            return Err(ValidationError::InvalidPublicKeyAlgorithm { alg });
        }
        if !self.pub_alg.can_sign() {
            return Err(ValidationError::NotASigningAlgorithm {
                alg: self.pub_alg.into(),
            });
        }
        if let HashAlgorithm::Other(alg) = self.hash_alg {
            return Err(ValidationError::InvalidHashAlgorithm { alg });
        }

        if strict_mpis {
            let expected = self.pub_alg.sig_mpi_count();
            if self.signature.len() != expected {
                return Err(ValidationError::InvalidMpiCount {
                    expected,
                    found: self.signature.len(),
                });
            }
        } else if self.signature.is_empty() {
            return Err(ValidationError::InvalidLength);
        }

        Ok(())
    }
}

fn read_mpis<B: Buf>(mut i: B) -> Result<Vec<MpiBytes>> {
    let mut mpis = Vec::new();
    while i.has_remaining() {
        mpis.push(MpiBytes::from_buf(&mut i)?);
    }
    Ok(mpis)
}

fn expiry(created: DateTime<Utc>, delta: Option<Duration>) -> Option<DateTime<Utc>> {
    match delta {
        Some(d) if !d.is_zero() => Some(created + d),
        _ => None,
    }
}

fn upsert(area: &mut Vec<Subpacket>, typ: SubpacketType, new: Subpacket) {
    match area.iter_mut().find(|sp| sp.typ() == typ) {
        Some(existing) => *existing = new,
        None => area.push(new),
    }
}

impl Serialize for Signature {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.version.into())?;

        match &self.version_specific {
            SignatureVersionSpecific::V3 { created, issuer } => {
                writer.write_u8(5)?;
                writer.write_u8(self.typ.into())?;
                writer.write_u32::<BigEndian>(created.timestamp() as u32)?;
                issuer.to_writer(writer)?;
                writer.write_u8(self.pub_alg.into())?;
                writer.write_u8(self.hash_alg.into())?;
            }
            SignatureVersionSpecific::V4 => {
                writer.write_u8(self.typ.into())?;
                writer.write_u8(self.pub_alg.into())?;
                writer.write_u8(self.hash_alg.into())?;

                let hashed_len = self.hashed_subpackets.write_len();
                writer.write_u16::<BigEndian>(hashed_len.try_into()?)?;
                self.hashed_subpackets.to_writer(writer)?;

                let unhashed_len = self.unhashed_subpackets.write_len();
                writer.write_u16::<BigEndian>(unhashed_len.try_into()?)?;
                self.unhashed_subpackets.to_writer(writer)?;
            }
        }

        writer.write_all(&self.signed_hash_value)?;
        self.signature.to_writer(writer)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        let version_specific = match &self.version_specific {
            // hashed material length octet + type + time + issuer +
            // pub alg + hash alg
            SignatureVersionSpecific::V3 { .. } => 1 + 1 + 4 + 8 + 1 + 1,
            SignatureVersionSpecific::V4 => {
                1 + 1
                    + 1
                    + 2
                    + self.hashed_subpackets.write_len()
                    + 2
                    + self.unhashed_subpackets.write_len()
            }
        };
        1 + version_specific + 2 + self.signature.write_len()
    }
}

impl PacketTrait for Signature {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

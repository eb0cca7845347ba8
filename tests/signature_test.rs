use chrono::{DateTime, Duration, Utc};
use pgp_packet::crypto::hash::HashAlgorithm;
use pgp_packet::crypto::public_key::PublicKeyAlgorithm;
use pgp_packet::packet::{parse_many, Packet, PacketTrait, SignatureVersion, SubpacketType};
use pgp_packet::ser::Serialize;
use pgp_packet::types::KeyId;

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
}

fn v4_signature_wire() -> Vec<u8> {
    let mut body: Vec<u8> = vec![
        0x04, // version
        0x00, // binary document signature
        22,   // EdDSA legacy
        0x08, // SHA256
    ];
    // hashed area: creation time
    body.extend_from_slice(&[0x00, 0x06]);
    body.extend_from_slice(&[0x05, 0x02, 0x5C, 0x5E, 0x72, 0x53]);
    // unhashed area: issuer
    body.extend_from_slice(&[0x00, 0x0A]);
    body.extend_from_slice(&[0x09, 0x10, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
    // left 16 bits of the hash
    body.extend_from_slice(&[0xDE, 0xAD]);
    // two MPIs
    body.extend_from_slice(&[0x00, 0x08, 0xAB]);
    body.extend_from_slice(&[0x00, 0x07, 0x5F]);

    let mut data = vec![0xC2, body.len() as u8];
    data.extend_from_slice(&body);
    data
}

#[test]
fn v4_signature_from_wire() {
    let data = v4_signature_wire();
    let packets = parse_many(data.clone().into()).unwrap();
    assert_eq!(packets.len(), 1);

    let sig = match &packets[0] {
        Packet::Signature(sig) => sig,
        other => panic!("unexpected packet: {other:?}"),
    };

    assert_eq!(sig.version(), SignatureVersion::V4);
    assert_eq!(sig.pub_alg(), PublicKeyAlgorithm::EdDSALegacy);
    assert_eq!(sig.hash_alg(), HashAlgorithm::Sha256);
    assert_eq!(sig.hashed_subpackets().len(), 1);
    assert_eq!(sig.unhashed_subpackets().len(), 1);
    assert_eq!(sig.signed_hash_value(), [0xDE, 0xAD]);
    assert_eq!(sig.signature().len(), 2);

    let times = sig.times().unwrap();
    assert_eq!(times.created, ts(0x5C5E7253));
    assert_eq!(times.expires, None);

    assert_eq!(
        sig.issuer_key_id(),
        Some(KeyId::from([1, 2, 3, 4, 5, 6, 7, 8]))
    );

    assert!(sig.validate(true).is_ok());

    // byte exact round trip, header included
    let mut out = Vec::new();
    packets[0].to_writer_with_header(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn v3_signature_from_wire() {
    let mut body: Vec<u8> = vec![
        0x03, // version
        0x05, // hashed material length, always 5
        0x00, // binary document signature
        0x5C, 0x5E, 0x72, 0x53, // creation time
        0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // issuer
        0x01, // RSA
        0x02, // SHA1
        0x12, 0x34, // left 16
        0x00, 0x08, 0xAB, // one MPI
    ];
    // old format header, one octet length
    let mut data = vec![0x88, body.len() as u8];
    data.append(&mut body);

    let packets = parse_many(data.clone().into()).unwrap();
    let sig = match &packets[0] {
        Packet::Signature(sig) => sig,
        other => panic!("unexpected packet: {other:?}"),
    };

    assert_eq!(sig.version(), SignatureVersion::V3);
    assert_eq!(sig.pub_alg(), PublicKeyAlgorithm::RSA);
    assert_eq!(sig.hash_alg(), HashAlgorithm::Sha1);
    assert_eq!(sig.times().unwrap().created, ts(0x5C5E7253));
    assert_eq!(
        sig.issuer_key_id(),
        Some(KeyId::from([8, 7, 6, 5, 4, 3, 2, 1]))
    );
    assert!(sig.validate(true).is_ok());

    let mut out = Vec::new();
    packets[0].to_writer_with_header(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn expiration_precedence_from_wire() {
    let mut body: Vec<u8> = vec![0x04, 0x00, 22, 0x08];
    // hashed: creation time + key expiration of 100 seconds
    body.extend_from_slice(&[0x00, 0x0C]);
    body.extend_from_slice(&[0x05, 0x02, 0x5C, 0x5E, 0x72, 0x53]);
    body.extend_from_slice(&[0x05, 0x09, 0x00, 0x00, 0x00, 0x64]);
    // unhashed: key expiration of 500 seconds, which wins
    body.extend_from_slice(&[0x00, 0x06]);
    body.extend_from_slice(&[0x05, 0x09, 0x00, 0x00, 0x01, 0xF4]);
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(&[0x00, 0x08, 0xAB]);
    body.extend_from_slice(&[0x00, 0x08, 0xCD]);

    let mut data = vec![0xC2, body.len() as u8];
    data.extend_from_slice(&body);

    let packets = parse_many(data.into()).unwrap();
    let sig = match &packets[0] {
        Packet::Signature(sig) => sig,
        other => panic!("unexpected packet: {other:?}"),
    };

    let times = sig.times().unwrap();
    assert_eq!(
        times.key_expires,
        Some(ts(0x5C5E7253) + Duration::seconds(500))
    );

    // find_subpacket resolves the same way
    let sp = sig.find_subpacket(SubpacketType::KeyExpirationTime).unwrap();
    assert_eq!(sp.data.write_len(), 4);
    assert_eq!(sp.to_bytes().unwrap(), &[0x05, 0x09, 0x00, 0x00, 0x01, 0xF4]);
}

#[test]
fn undefined_subpacket_fails() {
    let mut body: Vec<u8> = vec![0x04, 0x00, 22, 0x08];
    // hashed area with an undefined subpacket type (42)
    body.extend_from_slice(&[0x00, 0x03]);
    body.extend_from_slice(&[0x02, 42, 0x00]);
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(&[0x00, 0x08, 0xAB]);

    let mut data = vec![0xC2, body.len() as u8];
    data.extend_from_slice(&body);

    assert!(parse_many(data.into()).is_err());
}

#[test]
fn set_created_and_issuer_survive_roundtrip() {
    let data = v4_signature_wire();
    let packets = parse_many(data.into()).unwrap();
    let mut sig = match &packets[0] {
        Packet::Signature(sig) => sig.clone(),
        other => panic!("unexpected packet: {other:?}"),
    };

    sig.set_created(ts(1_700_000_000)).unwrap();
    sig.set_issuer(KeyId::from([9; 8])).unwrap();

    let bytes = sig.to_bytes().unwrap();
    let header = *sig.packet_header();
    let back = match parse_many(
        {
            let mut full = Vec::new();
            pgp_packet::packet::PacketHeader::new_fixed(header.tag(), bytes.len())
                .to_writer(&mut full)
                .unwrap();
            full.extend_from_slice(&bytes);
            full
        }
        .into(),
    )
    .unwrap()
    .remove(0)
    {
        Packet::Signature(sig) => sig,
        other => panic!("unexpected packet: {other:?}"),
    };

    assert_eq!(back.times().unwrap().created, ts(1_700_000_000));
    assert_eq!(back.issuer_key_id(), Some(KeyId::from([9; 8])));
    // still exactly one of each subpacket
    assert_eq!(back.hashed_subpackets().len(), 1);
    assert_eq!(back.unhashed_subpackets().len(), 1);
}

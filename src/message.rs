//! Verification of packet sequences against the OpenPGP Message
//! grammar, plus transparent handling of compressed messages.
//!
//! Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-11.3>

use bytes::Bytes;
use log::debug;

use crate::errors::{Error, Result};
use crate::packet::{parse_many, CompressedData, Packet, PacketTrait};
use crate::types::{CompressionAlgorithm, Tag};

/// Grammar token. The terminals map one to one onto packet tags; the
/// rest are produced by reductions.
///
/// The message non-terminals (`OpenPgpMessage`, `EncryptedMessage`,
/// `SignedMessage`, `CompressedMessage`, `LiteralMessage`) double as
/// targets for [`Message::matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    // terminals
    Cdp,
    Ldp,
    Pkesk,
    Skesk,
    Sed,
    Seipd,
    Ops,
    Sig,
    // non-terminals
    CompressedMessage,
    LiteralMessage,
    Esk,
    EskSequence,
    EncryptedData,
    EncryptedMessage,
    OnePassSignedMessage,
    SignedMessage,
    OpenPgpMessage,
}

fn token(tag: Tag) -> Result<Token> {
    match tag {
        Tag::CompressedData => Ok(Token::Cdp),
        Tag::LiteralData => Ok(Token::Ldp),
        Tag::PublicKeyEncryptedSessionKey => Ok(Token::Pkesk),
        Tag::SymKeyEncryptedSessionKey => Ok(Token::Skesk),
        Tag::SymEncryptedData => Ok(Token::Sed),
        Tag::SymEncryptedProtectedData => Ok(Token::Seipd),
        Tag::OnePassSignature => Ok(Token::Ops),
        Tag::Signature => Ok(Token::Sig),
        Tag::Marker | Tag::Experimental => Err(Error::NonMessagePacket { tag }),
    }
}

// Each rule inspects the tokens at position `i` and rewrites them in
// place when it applies.

fn rule_openpgp_message(tokens: &mut [Token], i: usize) -> bool {
    match tokens[i] {
        Token::EncryptedMessage
        | Token::SignedMessage
        | Token::CompressedMessage
        | Token::LiteralMessage => {
            tokens[i] = Token::OpenPgpMessage;
            true
        }
        _ => false,
    }
}

fn rule_compressed_message(tokens: &mut [Token], i: usize) -> bool {
    if tokens[i] == Token::Cdp {
        tokens[i] = Token::CompressedMessage;
        return true;
    }
    false
}

fn rule_literal_message(tokens: &mut [Token], i: usize) -> bool {
    if tokens[i] == Token::Ldp {
        tokens[i] = Token::LiteralMessage;
        return true;
    }
    false
}

fn rule_esk(tokens: &mut [Token], i: usize) -> bool {
    if matches!(tokens[i], Token::Pkesk | Token::Skesk) {
        tokens[i] = Token::Esk;
        return true;
    }
    false
}

fn rule_esk_sequence(tokens: &mut Vec<Token>, i: usize) -> bool {
    if tokens[i] == Token::Esk {
        tokens[i] = Token::EskSequence;
        return true;
    }
    if tokens[i] == Token::EskSequence && tokens.get(i + 1) == Some(&Token::Esk) {
        tokens.remove(i + 1);
        return true;
    }
    false
}

fn rule_encrypted_data(tokens: &mut [Token], i: usize) -> bool {
    if matches!(tokens[i], Token::Sed | Token::Seipd) {
        tokens[i] = Token::EncryptedData;
        return true;
    }
    false
}

fn rule_encrypted_message(tokens: &mut Vec<Token>, i: usize) -> bool {
    if tokens[i] == Token::EskSequence && tokens.get(i + 1) == Some(&Token::EncryptedData) {
        tokens[i] = Token::EncryptedMessage;
        tokens.remove(i + 1);
        return true;
    }
    if tokens[i] == Token::EncryptedData {
        tokens[i] = Token::EncryptedMessage;
        return true;
    }
    false
}

fn rule_one_pass_signed_message(tokens: &mut Vec<Token>, i: usize) -> bool {
    if tokens[i] == Token::Ops
        && tokens.get(i + 1) == Some(&Token::OpenPgpMessage)
        && tokens.get(i + 2) == Some(&Token::Sig)
    {
        tokens[i] = Token::OnePassSignedMessage;
        tokens.drain(i + 1..i + 3);
        return true;
    }
    false
}

fn rule_signed_message(tokens: &mut Vec<Token>, i: usize) -> bool {
    if tokens[i] == Token::Sig && tokens.get(i + 1) == Some(&Token::OpenPgpMessage) {
        tokens[i] = Token::SignedMessage;
        tokens.remove(i + 1);
        return true;
    }
    if tokens[i] == Token::OnePassSignedMessage {
        tokens[i] = Token::SignedMessage;
        return true;
    }
    false
}

/// Tries each rule at position `i`, in priority order.
fn reduce_at(tokens: &mut Vec<Token>, i: usize) -> bool {
    rule_openpgp_message(tokens, i)
        || rule_compressed_message(tokens, i)
        || rule_literal_message(tokens, i)
        || rule_esk(tokens, i)
        || rule_esk_sequence(tokens, i)
        || rule_encrypted_data(tokens, i)
        || rule_encrypted_message(tokens, i)
        || rule_one_pass_signed_message(tokens, i)
        || rule_signed_message(tokens, i)
}

/// Reduces the token sequence until it is exactly the target
/// non-terminal.
///
/// In each pass the positions are scanned left to right and each rule
/// is tried in its priority order; the first reduction that fires
/// restarts the scan. The sequence is checked against the target
/// before every pass, so reduction stops as soon as it is reached and
/// never promotes past it. A full pass with no reduction is a grammar
/// violation.
fn reduce(mut tokens: Vec<Token>, target: Token) -> Result<()> {
    ensure!(
        matches!(
            target,
            Token::OpenPgpMessage
                | Token::EncryptedMessage
                | Token::SignedMessage
                | Token::CompressedMessage
                | Token::LiteralMessage
        ),
        "invalid grammar target: {:?}",
        target
    );
    if tokens.is_empty() {
        return Err(Error::NoPackets);
    }

    loop {
        if tokens == [target] {
            return Ok(());
        }

        let mut fired = false;
        for i in 0..tokens.len() {
            if reduce_at(&mut tokens, i) {
                debug!("reduced at {}: {:?}", i, tokens);
                fired = true;
                break;
            }
        }

        if !fired {
            return Err(Error::TokenReduction);
        }
    }
}

fn check_grammar(packets: &[Packet], target: Token) -> Result<()> {
    let tokens = packets
        .iter()
        .map(|p| token(p.tag()))
        .collect::<Result<Vec<_>>>()?;
    reduce(tokens, target)
}

/// A sequence of packets forming an OpenPGP Message.
///
/// Compressed messages are unwrapped on construction: the contained
/// packets are what [`Message::packets`] exposes, and the compression
/// algorithm is re-applied when writing the message back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    packets: Vec<Packet>,
    compression: Option<CompressionAlgorithm>,
}

impl Message {
    /// Builds a message from packets, verifying the grammar and
    /// unwrapping compressed data.
    pub fn from_packets(packets: Vec<Packet>) -> Result<Self> {
        check_grammar(&packets, Token::OpenPgpMessage)?;

        let mut packets = packets;
        let mut compression = None;

        // A message that is exactly one compressed data packet gets
        // unwrapped, repeatedly for nested compression. The contained
        // packets must form a valid message themselves.
        loop {
            let inner = match packets.as_slice() {
                [Packet::CompressedData(inner)] => inner.clone(),
                _ => break,
            };
            let raw = inner.decompress()?;
            compression = Some(inner.compression());
            packets = parse_many(raw.into())?;
            check_grammar(&packets, Token::OpenPgpMessage)?;
        }

        Ok(Message {
            packets,
            compression,
        })
    }

    /// Parses a message from its binary serialization.
    pub fn from_bytes(bytes: Bytes) -> Result<Self> {
        let packets = parse_many(bytes)?;
        Self::from_packets(packets)
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Whether the packet sequence reduces to the given non-terminal.
    ///
    /// Every message matches [`Token::OpenPgpMessage`]; the narrower
    /// targets distinguish the message kinds. Targets that are not one
    /// of the message non-terminals are an error.
    pub fn matches(&self, target: Token) -> Result<bool> {
        match check_grammar(&self.packets, target) {
            Ok(()) => Ok(true),
            Err(Error::TokenReduction) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// The compression this message was wrapped in, if any.
    pub fn compression(&self) -> Option<CompressionAlgorithm> {
        self.compression
    }

    /// Configures the compression used when writing the message out.
    /// `Uncompressed` removes the wrapping entirely.
    pub fn set_compression(&mut self, compression: CompressionAlgorithm) {
        self.compression = match compression {
            CompressionAlgorithm::Uncompressed => None,
            other => Some(other),
        };
    }

    /// Serializes the message, re-applying the configured compression.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut raw = Vec::new();
        for packet in &self.packets {
            packet.to_writer_with_header(&mut raw)?;
        }

        match self.compression {
            None => Ok(raw),
            Some(alg) => {
                let compressed = CompressedData::from_compressed(alg, &raw)?;
                let packet = Packet::CompressedData(compressed);
                let mut out = Vec::new();
                packet.to_writer_with_header(&mut out)?;
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::HashAlgorithm;
    use crate::crypto::public_key::PublicKeyAlgorithm;
    use crate::packet::signature::{Subpacket, SubpacketData};
    use crate::packet::{
        DataMode, LiteralData, Marker, OnePassSignature, PacketHeader, Signature, SignatureType,
    };
    use crate::types::{KeyId, MpiBytes};
    use chrono::{DateTime, Utc};

    fn literal() -> Packet {
        Packet::LiteralData(
            LiteralData::from_bytes(DataMode::Binary, "f", &b"test"[..]).unwrap(),
        )
    }

    fn signature() -> Packet {
        Packet::Signature(Signature::v4(
            SignatureType::Binary,
            PublicKeyAlgorithm::EdDSALegacy,
            HashAlgorithm::Sha256,
            vec![Subpacket::regular(SubpacketData::SignatureCreationTime(
                DateTime::<Utc>::from_timestamp(1_600_000_000, 0).unwrap(),
            ))
            .unwrap()],
            vec![],
            [0xAA, 0xBB],
            vec![
                MpiBytes::from_slice(&[1, 2, 3]),
                MpiBytes::from_slice(&[4, 5, 6]),
            ],
        ))
    }

    fn one_pass_signature() -> Packet {
        Packet::OnePassSignature(OnePassSignature::new(
            SignatureType::Binary,
            HashAlgorithm::Sha256,
            PublicKeyAlgorithm::EdDSALegacy,
            KeyId::from([1, 2, 3, 4, 5, 6, 7, 8]),
            1,
        ))
    }

    fn seipd() -> Packet {
        let header = PacketHeader::new_fixed(Tag::SymEncryptedProtectedData, 4);
        Packet::SymEncryptedProtectedData(
            crate::packet::SymEncryptedProtectedData::try_from_buf(
                header,
                &[0x01u8, 0xDE, 0xAD, 0xBF][..],
            )
            .unwrap(),
        )
    }

    fn skesk() -> Packet {
        let mut data: Vec<u8> = vec![4, 9];
        data.extend_from_slice(&[
            0x03, 0x02, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x60,
        ]);
        let header = PacketHeader::new_fixed(Tag::SymKeyEncryptedSessionKey, data.len());
        Packet::SymKeyEncryptedSessionKey(
            crate::packet::SymKeyEncryptedSessionKey::try_from_buf(header, &data[..]).unwrap(),
        )
    }

    #[test]
    fn test_literal_message() {
        let msg = Message::from_packets(vec![literal()]).unwrap();
        assert_eq!(msg.packets().len(), 1);
        assert_eq!(msg.compression(), None);
    }

    #[test]
    fn test_one_pass_signed_message() {
        let msg =
            Message::from_packets(vec![one_pass_signature(), literal(), signature()]).unwrap();
        assert_eq!(msg.packets().len(), 3);
    }

    #[test]
    fn test_signed_message() {
        Message::from_packets(vec![signature(), literal()]).unwrap();
    }

    #[test]
    fn test_encrypted_message() {
        Message::from_packets(vec![seipd()]).unwrap();
        Message::from_packets(vec![skesk(), seipd()]).unwrap();
        Message::from_packets(vec![skesk(), skesk(), seipd()]).unwrap();
    }

    #[test]
    fn test_matches_literal_target() {
        let msg = Message::from_packets(vec![literal()]).unwrap();
        assert!(msg.matches(Token::OpenPgpMessage).unwrap());
        assert!(msg.matches(Token::LiteralMessage).unwrap());
        assert!(!msg.matches(Token::EncryptedMessage).unwrap());
        assert!(!msg.matches(Token::CompressedMessage).unwrap());
        assert!(!msg.matches(Token::SignedMessage).unwrap());
    }

    #[test]
    fn test_matches_encrypted_target() {
        let msg = Message::from_packets(vec![skesk(), seipd()]).unwrap();
        assert!(msg.matches(Token::EncryptedMessage).unwrap());
        assert!(msg.matches(Token::OpenPgpMessage).unwrap());
        assert!(!msg.matches(Token::LiteralMessage).unwrap());
    }

    #[test]
    fn test_matches_signed_target() {
        let msg = Message::from_packets(vec![signature(), literal()]).unwrap();
        assert!(msg.matches(Token::SignedMessage).unwrap());
        assert!(!msg.matches(Token::LiteralMessage).unwrap());
    }

    #[test]
    fn test_matches_rejects_non_message_target() {
        let msg = Message::from_packets(vec![literal()]).unwrap();
        assert!(msg.matches(Token::Esk).is_err());
        assert!(msg.matches(Token::Ldp).is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            Message::from_packets(vec![]).unwrap_err(),
            Error::NoPackets
        ));
    }

    #[test]
    fn test_lone_signature_rejected() {
        assert!(matches!(
            Message::from_packets(vec![signature()]).unwrap_err(),
            Error::TokenReduction
        ));
    }

    #[test]
    fn test_unterminated_one_pass_rejected() {
        assert!(matches!(
            Message::from_packets(vec![one_pass_signature(), literal()]).unwrap_err(),
            Error::TokenReduction
        ));
    }

    #[test]
    fn test_two_literals_rejected() {
        assert!(matches!(
            Message::from_packets(vec![literal(), literal()]).unwrap_err(),
            Error::TokenReduction
        ));
    }

    #[test]
    fn test_marker_rejected() {
        assert!(matches!(
            Message::from_packets(vec![Packet::Marker(Marker::new()), literal()]).unwrap_err(),
            Error::NonMessagePacket { tag: Tag::Marker }
        ));
    }

    #[test]
    fn test_roundtrip_uncompressed() {
        let msg = Message::from_packets(vec![literal()]).unwrap();
        let bytes = msg.to_bytes().unwrap();
        let back = Message::from_bytes(bytes.into()).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn test_compressed_roundtrip() {
        let mut msg = Message::from_packets(vec![literal()]).unwrap();
        msg.set_compression(CompressionAlgorithm::ZLIB);

        let bytes = msg.to_bytes().unwrap();
        // on the wire: a single compressed data packet
        let packets = parse_many(Bytes::from(bytes.clone())).unwrap();
        assert_eq!(packets.len(), 1);
        assert!(matches!(packets[0], Packet::CompressedData(_)));

        let back = Message::from_bytes(bytes.into()).unwrap();
        assert_eq!(back.compression(), Some(CompressionAlgorithm::ZLIB));
        assert_eq!(back.packets(), msg.packets());
    }

    #[test]
    fn test_nested_compression_unwrapped() {
        let mut inner = Message::from_packets(vec![literal()]).unwrap();
        inner.set_compression(CompressionAlgorithm::ZIP);
        let inner_bytes = inner.to_bytes().unwrap();

        let outer = CompressedData::from_compressed(
            CompressionAlgorithm::ZLIB,
            &inner_bytes,
        )
        .unwrap();
        let mut bytes = Vec::new();
        Packet::CompressedData(outer)
            .to_writer_with_header(&mut bytes)
            .unwrap();

        let msg = Message::from_bytes(bytes.into()).unwrap();
        // the innermost algorithm is the one remembered
        assert_eq!(msg.compression(), Some(CompressionAlgorithm::ZIP));
        assert_eq!(msg.packets(), inner.packets());
    }

    #[test]
    fn test_compressed_garbage_rejected() {
        // a compressed packet containing a lone signature is not a message
        let mut raw = Vec::new();
        signature().to_writer_with_header(&mut raw).unwrap();
        let compressed =
            CompressedData::from_compressed(CompressionAlgorithm::ZLIB, &raw).unwrap();
        let mut bytes = Vec::new();
        Packet::CompressedData(compressed)
            .to_writer_with_header(&mut bytes)
            .unwrap();

        assert!(Message::from_bytes(bytes.into()).is_err());
    }

    #[test]
    fn test_set_compression_uncompressed_clears() {
        let mut msg = Message::from_packets(vec![literal()]).unwrap();
        msg.set_compression(CompressionAlgorithm::ZLIB);
        assert_eq!(msg.compression(), Some(CompressionAlgorithm::ZLIB));
        msg.set_compression(CompressionAlgorithm::Uncompressed);
        assert_eq!(msg.compression(), None);
    }
}

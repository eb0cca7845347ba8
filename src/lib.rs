//! # OpenPGP packet handling
//!
//! Binary encoding and decoding of OpenPGP packets and signature
//! subpackets, string-to-key (S2K) passphrase derivation, and validation
//! of packet sequences against the OpenPGP Message grammar.
//!
//! Ref: <https://www.rfc-editor.org/rfc/rfc4880.html>
//!
//! ```rust
//! use pgp_packet::message::Message;
//! use pgp_packet::packet::{DataMode, LiteralData, Packet};
//!
//! let literal = LiteralData::from_bytes(DataMode::Binary, "hello.txt", &b"hello world"[..]).unwrap();
//! let message = Message::from_packets(vec![Packet::LiteralData(literal)]).unwrap();
//!
//! let bytes = message.to_bytes().unwrap();
//! let back = Message::from_bytes(bytes.into()).unwrap();
//! assert_eq!(message, back);
//! ```

#[macro_use]
pub mod errors;

pub mod crypto;
pub mod message;
pub mod packet;
pub mod parsing;
pub mod ser;
pub mod types;

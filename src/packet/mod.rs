mod compressed_data;
mod experimental;
mod header;
mod literal_data;
mod many;
mod marker;
mod one_pass_signature;
mod packet_sum;
mod public_key_encrypted_session_key;
pub mod signature;
mod sym_encrypted_data;
mod sym_encrypted_protected_data;
mod sym_key_encrypted_session_key;

pub use self::compressed_data::CompressedData;
pub use self::experimental::Experimental;
pub use self::header::PacketHeader;
pub use self::literal_data::{DataMode, LiteralData};
pub use self::many::parse_many;
pub use self::marker::Marker;
pub use self::one_pass_signature::OnePassSignature;
pub use self::packet_sum::{Packet, PacketTrait};
pub use self::public_key_encrypted_session_key::PublicKeyEncryptedSessionKey;
pub use self::signature::{
    Signature, SignatureType, SignatureVersion, Subpacket, SubpacketData, SubpacketType,
};
pub use self::sym_encrypted_data::SymEncryptedData;
pub use self::sym_encrypted_protected_data::SymEncryptedProtectedData;
pub use self::sym_key_encrypted_session_key::SymKeyEncryptedSessionKey;

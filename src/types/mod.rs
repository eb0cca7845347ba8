mod compression;
mod key_id;
mod mpi;
mod packet;
mod s2k;

pub use self::compression::CompressionAlgorithm;
pub use self::key_id::KeyId;
pub use self::mpi::MpiBytes;
pub use self::packet::{PacketHeaderVersion, PacketLength, Tag};
pub use self::s2k::StringToKey;

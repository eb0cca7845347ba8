use std::num::TryFromIntError;

use snafu::{Backtrace, Snafu};

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

pub use crate::parsing::{Error as ParsingError, RemainingError};

/// Error types
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("unrecognized packet type: {tag}"))]
    InvalidPacketType { tag: u8 },
    #[snafu(display("undefined subpacket type: {typ}"))]
    InvalidSubpacketType { typ: u8 },
    #[snafu(display("unknown s2k type: {typ}"))]
    InvalidS2kType { typ: u8 },
    #[snafu(display("non-Message packet found: {tag:?}"))]
    NonMessagePacket { tag: crate::types::Tag },
    #[snafu(display("failed to reduce tokens"))]
    TokenReduction,
    #[snafu(display("empty packet sequence"))]
    NoPackets,
    #[snafu(transparent)]
    Validation { source: ValidationError },
    #[snafu(transparent)]
    PacketParsing { source: ParsingError },
    #[snafu(transparent)]
    IO {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(transparent)]
    Utf8Error { source: std::str::Utf8Error },
    #[snafu(transparent)]
    TryFromInt { source: TryFromIntError },
    /// Signals packet versions and parameters we don't support, but can safely ignore
    #[snafu(display("Unsupported: {message}"))]
    Unsupported { message: String },
    #[snafu(display("{message}"))]
    Message { message: String },
}

/// Structural validation failures.
///
/// Raised for fields that decoded fine but carry values outside the known
/// sets, so callers can distinguish them from hard decode errors and pick
/// their own strictness.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ValidationError {
    #[snafu(display("invalid signature type: 0x{typ:02x}"))]
    InvalidSignatureType { typ: u8 },
    #[snafu(display("invalid public key algorithm: {alg}"))]
    InvalidPublicKeyAlgorithm { alg: u8 },
    #[snafu(display("public key algorithm {alg} cannot be used for signing"))]
    NotASigningAlgorithm { alg: u8 },
    #[snafu(display("invalid hash algorithm: {alg}"))]
    InvalidHashAlgorithm { alg: u8 },
    #[snafu(display("expected {expected} signature MPIs, found {found}"))]
    InvalidMpiCount { expected: usize, found: usize },
    #[snafu(display("invalid literal data format: {format}"))]
    InvalidLiteralDataFormat { format: u8 },
    #[snafu(display("invalid length"))]
    InvalidLength,
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::Message { message: err }
    }
}

#[macro_export]
macro_rules! unsupported_err {
    ($e:expr) => {
        return Err($crate::errors::Error::Unsupported { message: $e.to_string()})
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::Unsupported { message: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! bail {
    ($e:expr) => {
        return Err($crate::errors::Error::Message { message: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::Message { message: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! format_err {
    ($e:expr) => {
        $crate::errors::Error::Message { message: $e.to_string() }
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::Message { message: format!($fmt, $($arg)+) }
    };
}

#[macro_export(local_inner_macros)]
macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            bail!($e);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)+) => {
        if !($cond) {
            bail!($fmt, $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr) => ({
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    bail!(r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#, left_val, right_val)
                }
            }
        }
    });
    ($left:expr, $right:expr,) => ({
        ensure_eq!($left, $right)
    });
    ($left:expr, $right:expr, $($arg:tt)+) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    bail!(r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`: {}"#, left_val, right_val,
                           format_args!($($arg)+))
                }
            }
        }
    });
}

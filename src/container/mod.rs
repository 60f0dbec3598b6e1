//! `EMULATOR_DATA` blob container
//!
//! One or more named byte buffers (save states, SRAM, RTC) framed into a single
//! self-describing byte stream:
//! - 13-byte magic, 4-byte little-endian total length
//! - 1-byte console ID length + console ID text
//! - repeated blob records: 1-byte ID length, ID, 4-byte content length, content
//!
//! Decoding is lenient: unknown data yields an empty container and a damaged
//! tail is dropped, never read out of bounds.

pub mod codec;
pub mod types;

use thiserror::Error;

pub use codec::{decode, encode_multi, encode_single, encode_with_console, encoded_len};
pub use types::{Blob, Container};

/// Magic marker at offset 0 of every container
pub const MAGIC: &[u8; 13] = b"EMULATOR_DATA";
/// Magic + total length + console ID length byte
pub const HEADER_LEN: usize = MAGIC.len() + 4 + 1;
/// Console ID written by the emulator front end
pub const CONSOLE_ID: &str = "GameBoy";
/// Largest ID (blob or console) that fits the 1-byte length field
pub const MAX_ID_LEN: usize = u8::MAX as usize;
/// Largest content that fits the 4-byte length field
pub const MAX_CONTENT_LEN: usize = u32::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("{field} is {len} bytes, limit is {max}")]
    InvalidBlobSize {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("container truncated at offset {offset}: {reason}")]
    DecodeTruncated { offset: usize, reason: &'static str },

    #[error("data does not start with the EMULATOR_DATA magic")]
    DecodeMagicMismatch,
}

//! GBS audio container header
//!
//! # Layout
//!
//! ```text
//! 0x000: magic "GBAL"
//! 0x004: file_size u32 LE (informational)
//! 0x008: marker "MUSI"
//! 0x00C: reserved
//! 0x010: mode u32 LE (0..4)
//! 0x014: reserved to 0x200
//! 0x200: first block
//! ```

use gbs_codec::GbsMode;
use thiserror::Error;

/// Fixed header size; the first block starts here
pub const GBS_HEADER_SIZE: usize = 0x200;

/// Container magic at offset 0
pub const GBS_MAGIC: &[u8; 4] = b"GBAL";

/// Sub-marker at offset 8
pub const GBS_MARKER: &[u8; 4] = b"MUSI";

/// Errors from GBS container validation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GbsError {
    /// Container smaller than the fixed header, or no whole block after it
    #[error("container too small (need a 512-byte header and at least one block)")]
    ShortContainer,

    /// Header does not carry the GBAL/MUSI signature
    #[error("bad container signature (expected \"GBAL\"+\"MUSI\")")]
    BadMagic,

    /// Mode selector outside 0..4
    #[error("unsupported audio mode: {0}")]
    UnsupportedMode(u32),
}

/// Parsed GBS container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GbsHeader {
    /// Informational file size from the header
    pub file_size: u32,
    /// Validated wire mode
    pub mode: GbsMode,
}

impl GbsHeader {
    /// Validate and parse the container header
    pub fn parse(data: &[u8]) -> Result<Self, GbsError> {
        if data.len() < GBS_HEADER_SIZE {
            return Err(GbsError::ShortContainer);
        }
        if &data[0..4] != GBS_MAGIC || &data[8..12] != GBS_MARKER {
            return Err(GbsError::BadMagic);
        }

        let raw_mode = u32::from_le_bytes([data[0x10], data[0x11], data[0x12], data[0x13]]);
        let mode = GbsMode::from_raw(raw_mode).ok_or(GbsError::UnsupportedMode(raw_mode))?;

        if (data.len() - GBS_HEADER_SIZE) / mode.block_size() == 0 {
            return Err(GbsError::ShortContainer);
        }

        let file_size = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        Ok(Self { file_size, mode })
    }

    /// The block region following the fixed header
    #[must_use]
    pub fn blocks<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[GBS_HEADER_SIZE..]
    }
}

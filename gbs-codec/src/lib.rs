//! GBS-Codec: ADPCM audio codec for the GBS container
//!
//! **This is a pure codec** - it handles only the decompression of block
//! audio data. The container header (magic, mode selector) is handled by the
//! caller (media-common's `GbsHeader`).
//!
//! GBS audio is a sequence of equally-sized blocks. Every block starts with a
//! small header that reseeds the decoder, so any block can be decoded without
//! its predecessors - this is what makes minute-granular seeking cheap.
//!
//! # Wire modes
//!
//! | Mode | Coding | Rate | Channels | Block | Header |
//! |------|--------------------|-------|----------|-------|--------|
//! | 0 | Stereo 4-bit IMA | 22050 | 2 | 0x400 | 8 |
//! | 1 | Mono 3-bit | 11025 | 1 | 0x400 | 4 |
//! | 2 | Mono 4-bit IMA | 22050 | 1 | 0x200 | 4 |
//! | 3 | Mono 2-bit | 22050 | 1 | 0x200 | 4 |
//! | 4 | Mono 2-bit (small) | 11025 | 1 | 0x100 | 4 |
//!
//! # Block format
//!
//! ```text
//! Mono header (4 bytes):
//!   0x00: predictor u16 LE
//!   0x02: step_index u16 LE
//!
//! Stereo header (8 bytes): left header, then right header.
//!
//! Body: packed codes, LSB-first within each byte / 3-byte group.
//!   Mode 0: 1 byte = 1 sample pair (low nibble left, high nibble right)
//!   Mode 1: 3 bytes = 8 samples (3-bit codes from a 24-bit LE group)
//!   Mode 2: 1 byte = 2 samples (low nibble first)
//!   Mode 3/4: 1 byte = 4 samples (2-bit codes from bit 0 up)
//! ```
//!
//! # Usage
//!
//! ```
//! use gbs_codec::{BlockDecoder, GbsMode};
//!
//! // One mode-3 block: 4-byte header + 508 bytes of codes
//! let mut block = vec![0u8; 0x200];
//! block[0..4].copy_from_slice(&[0x00, 0x80, 0x00, 0x00]);
//!
//! let mut decoder = BlockDecoder::new(&block, GbsMode::Mono2Bit);
//! let mut pcm = [0i8; 32];
//! let decoded = decoder.decode(&mut pcm, None);
//! assert_eq!(decoded, 32);
//! ```

mod block;
mod channel;
mod mode;
mod tables;

pub use block::BlockDecoder;
pub use channel::ChannelState;
pub use mode::GbsMode;
pub use tables::{DELTA_TABLE_2BIT, INDEX_TABLE_3BIT, INDEX_TABLE_4BIT, STEP_TABLE};

/// Step index ceiling for the IMA (4-bit) and 3-bit modes.
pub const STEP_INDEX_MAX_IMA: i32 = 88;

/// Step index ceiling for the 2-bit modes. The 2-bit step index moves in
/// strides of 4 through the flat delta table rather than indexing the step
/// table directly.
pub const STEP_INDEX_MAX_2BIT: i32 = 0x160;

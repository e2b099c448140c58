//! Per-frame decode driver

use crate::tiles::DecodeContext;
use crate::{FRAME_PIXELS, ROW_BYTES, VersionKey};

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Frame decoder for a GBM container
///
/// Holds only the version key; all frame state is per-call, so one decoder
/// can serve any number of streams of the same generation.
#[derive(Clone, Copy, Debug, Default)]
pub struct GbmDecoder {
    version_key: VersionKey,
}

impl GbmDecoder {
    /// Create a decoder for containers of the given generation
    #[must_use]
    pub fn new(version_key: VersionKey) -> Self {
        Self { version_key }
    }

    /// Select the XOR key for subsequent frames
    pub fn set_version_key(&mut self, version_key: VersionKey) {
        self.version_key = version_key;
    }

    /// Decode the frame at `offset` into `dst`, returning the offset of the
    /// next frame
    ///
    /// `reference` is the previously presented frame; pass `None` for the
    /// first frame of a stream (or a seek landing point), which makes the
    /// destination double as the reference. Returns 0 at end of stream
    /// (`frame_len` of 0 or 0xFFFF) or when the header does not fit the
    /// container.
    pub fn decode_frame(
        &self,
        data: &[u8],
        offset: usize,
        dst: &mut [u16],
        reference: Option<&[u16]>,
    ) -> usize {
        debug_assert_eq!(dst.len(), FRAME_PIXELS);

        if offset + 6 > data.len() {
            return 0;
        }
        let frame_len = read_u16_le(data, offset);
        if frame_len == 0 || frame_len == 0xFFFF {
            return 0;
        }
        let next_offset = offset + 2 + frame_len as usize;
        if next_offset > data.len() {
            return 0;
        }

        let flag_bytes = read_u16_le(data, offset + 2) ^ self.version_key.xor_mask();
        let palette_bytes = read_u16_le(data, offset + 4);

        let flag_start = offset + 6;
        let palette_start = flag_start + flag_bytes as usize;
        let palette_end = palette_start + palette_bytes as usize;
        if palette_end > next_offset {
            return 0;
        }

        // The flag stream is word-fed, so its final word may spill past the
        // nominal flag byte count; the reader is bounded by the container
        // instead of the sub-stream.
        let mut ctx = DecodeContext::new(
            &data[flag_start..],
            &data[palette_start..palette_end],
            &data[palette_end..next_offset],
            dst,
            reference,
        );

        for y_block in 0..20 {
            let row_offset = y_block * 8 * ROW_BYTES;
            for x_block in 0..30 {
                ctx.block_offset = row_offset + x_block * 8 * 2;
                ctx.decode_8x8();
            }
        }

        next_offset
    }
}

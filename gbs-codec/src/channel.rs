//! Per-channel decoder state and the per-sample decode primitives

use crate::tables::{DELTA_TABLE_2BIT, INDEX_TABLE_3BIT, INDEX_TABLE_4BIT, STEP_TABLE};
use crate::{STEP_INDEX_MAX_2BIT, STEP_INDEX_MAX_IMA};

/// Per-channel ADPCM decoder state
///
/// The predictor runs in the signed 16-bit range for the 4-bit IMA modes and
/// in the unsigned range (centered at 0x8000 on output) for the 2- and 3-bit
/// modes. Each block header replaces both fields, so any block decodes
/// independently of the ones before it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChannelState {
    /// Running predictor; clamped after every update to its mode's range
    pub predictor: i32,

    /// Adaptive quantization step index
    pub step_index: i32,
}

impl ChannelState {
    /// Create state with explicit predictor and step index
    #[must_use]
    pub fn new(predictor: i32, step_index: i32) -> Self {
        Self {
            predictor,
            step_index,
        }
    }

    /// Decode one 4-bit IMA ADPCM code
    ///
    /// The nibble is `SMMM`: sign at bit 3, magnitude at bits 2..0. The
    /// difference is accumulated from truncated step fractions, which is the
    /// canonical IMA formulation.
    #[inline]
    pub fn decode_ima_4bit(&mut self, nibble: u8) -> i16 {
        let step = i32::from(STEP_TABLE[self.step_index as usize]);

        let mut diff = step >> 3;
        if nibble & 4 != 0 {
            diff += step;
        }
        if nibble & 2 != 0 {
            diff += step >> 1;
        }
        if nibble & 1 != 0 {
            diff += step >> 2;
        }

        if nibble & 8 != 0 {
            self.predictor -= diff;
        } else {
            self.predictor += diff;
        }
        self.predictor = self.predictor.clamp(-32768, 32767);

        self.step_index = (self.step_index + i32::from(INDEX_TABLE_4BIT[(nibble & 0x0F) as usize]))
            .clamp(0, STEP_INDEX_MAX_IMA);

        self.predictor as i16
    }

    /// Decode one 3-bit code
    ///
    /// The code is `SMM`. The predictor runs unsigned; the returned sample is
    /// re-centered by subtracting 0x8000.
    #[inline]
    pub fn decode_3bit(&mut self, code: u8) -> i16 {
        let step = i32::from(STEP_TABLE[self.step_index as usize]);

        let mut diff = step >> 2;
        if code & 2 != 0 {
            diff += step;
        }
        if code & 1 != 0 {
            diff += step >> 1;
        }

        if code & 4 != 0 {
            self.predictor -= diff;
        } else {
            self.predictor += diff;
        }
        self.predictor = self.predictor.clamp(0, 65535);

        self.step_index = (self.step_index + i32::from(INDEX_TABLE_3BIT[(code & 7) as usize]))
            .clamp(0, STEP_INDEX_MAX_IMA);

        (self.predictor - 0x8000) as i16
    }

    /// Decode one 2-bit code
    ///
    /// The signed delta comes straight out of the flat table at
    /// `step_index + code`; the step index walks the table in strides of 4,
    /// up when bit 0 is set, down otherwise.
    #[inline]
    pub fn decode_2bit(&mut self, code: u8) -> i16 {
        let index = (self.step_index + i32::from(code)).min(352) as usize;

        self.predictor += i32::from(DELTA_TABLE_2BIT[index]);
        self.predictor = self.predictor.clamp(0, 65535);

        if code & 1 != 0 {
            self.step_index = (self.step_index + 4).min(STEP_INDEX_MAX_2BIT);
        } else {
            self.step_index = (self.step_index - 4).max(0);
        }

        (self.predictor - 0x8000) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ima_4bit_negative_full_magnitude() {
        // step_index 10 -> step 19
        // nibble 0xF: sign set, all magnitude bits set
        // diff = 19/8 + 19 + 9 + 4 = 2 + 19 + 9 + 4 = 34
        // predictor = 0 - 34 = -34, index 10 + 8 = 18
        let mut ch = ChannelState::new(0, 10);
        assert_eq!(ch.decode_ima_4bit(0x0F), -34);
        assert_eq!(ch.predictor, -34);
        assert_eq!(ch.step_index, 18);
    }

    #[test]
    fn test_ima_4bit_positive_small() {
        // step_index 20 -> step 50
        // nibble 0x2: diff = 50/8 + 25 = 6 + 25 = 31
        // index 20 - 1 = 19
        let mut ch = ChannelState::new(0, 20);
        assert_eq!(ch.decode_ima_4bit(0x02), 31);
        assert_eq!(ch.step_index, 19);
    }

    #[test]
    fn test_ima_4bit_clamps_predictor() {
        // step 32767: diff for nibble 7 = 4095 + 32767 + 16383 + 8191 = 61436
        let mut ch = ChannelState::new(32000, 88);
        assert_eq!(ch.decode_ima_4bit(0x07), 32767);

        let mut ch = ChannelState::new(-32000, 88);
        assert_eq!(ch.decode_ima_4bit(0x0F), -32768);
    }

    #[test]
    fn test_ima_4bit_step_index_stays_in_range() {
        for start in [0, 1, 44, 87, 88] {
            for nibble in 0..16u8 {
                let mut ch = ChannelState::new(0, start);
                ch.decode_ima_4bit(nibble);
                assert!((0..=88).contains(&ch.step_index));
            }
        }
    }

    #[test]
    fn test_3bit_known_values() {
        // step_index 0 -> step 7
        // code 3 (011): diff = 7/4 + 7 + 3 = 1 + 7 + 3 = 11
        // predictor 0x8000 + 11, output = 11; index 0 + 6 = 6
        let mut ch = ChannelState::new(0x8000, 0);
        assert_eq!(ch.decode_3bit(3), 11);
        assert_eq!(ch.step_index, 6);

        // code 7 (111): sign set, same magnitude path
        let mut ch = ChannelState::new(0x8000, 0);
        assert_eq!(ch.decode_3bit(7), -11);
    }

    #[test]
    fn test_3bit_clamps_unsigned() {
        // Predictor is clamped to [0, 65535], not the signed range
        let mut ch = ChannelState::new(5, 88);
        ch.decode_3bit(7);
        assert_eq!(ch.predictor, 0);

        let mut ch = ChannelState::new(65530, 88);
        ch.decode_3bit(3);
        assert_eq!(ch.predictor, 65535);
    }

    #[test]
    fn test_2bit_known_values() {
        // step_index 0, code 0: delta = table[0] = 3, step index stays 0
        let mut ch = ChannelState::new(0x8000, 0);
        assert_eq!(ch.decode_2bit(0), 3);
        assert_eq!(ch.step_index, 0);

        // code 1: delta = table[1] = 10, step index 0 + 4
        let mut ch = ChannelState::new(0x8000, 0);
        assert_eq!(ch.decode_2bit(1), 10);
        assert_eq!(ch.step_index, 4);
    }

    #[test]
    fn test_2bit_lookup_clamp() {
        // At the step index ceiling, codes 1..3 would address past the table;
        // the lookup clamps to 352 where the delta is zero.
        let mut ch = ChannelState::new(0x8000, 0x160);
        assert_eq!(ch.decode_2bit(3), 0);
        assert_eq!(ch.step_index, 0x160);
    }

    #[test]
    fn test_2bit_step_index_stays_in_range() {
        for start in [0, 4, 0x15C, 0x160] {
            for code in 0..4u8 {
                let mut ch = ChannelState::new(0x8000, start);
                ch.decode_2bit(code);
                assert!((0..=0x160).contains(&ch.step_index));
            }
        }
    }
}

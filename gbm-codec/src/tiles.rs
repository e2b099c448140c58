//! Recursive tile decoder
//!
//! Every tile shape decodes the same grammar from the flag stream:
//!
//! ```text
//! 00        copy from the reference at this position
//! 01        copy from the reference displaced through the codebook
//! 10        split in half and recurse (one more bit picks the direction,
//!           except for the single-row/column shapes which can only halve
//!           one way)
//! 11 0      per-pixel delta against a codebook-displaced reference tile
//! 11 1      fill with one palette color
//! ```
//!
//! The 1x2 and 2x1 leaves deviate: `10` is the delta form directly, and
//! `11` is either a single-color fill or a pair of palette colors written
//! straight into the two pixels.
//!
//! After each leaf the tile cursor advances by the shape's stride so that a
//! parent's second half starts in the right place; subdivisions that stack
//! vertically compensate between and after the halves. These adjustment
//! constants are part of the wire format.

use crate::bitstream::BitReader;
use crate::{ROW_BYTES, codebook_offset};

/// Cursor state for one frame decode
pub(crate) struct DecodeContext<'a> {
    bits: BitReader<'a>,
    palette: &'a [u8],
    palette_pos: usize,
    payload: &'a [u8],
    payload_pos: usize,
    dst: &'a mut [u16],
    reference: Option<&'a [u16]>,
    pub(crate) block_offset: i32,
}

impl<'a> DecodeContext<'a> {
    pub(crate) fn new(
        flags: &'a [u8],
        palette: &'a [u8],
        payload: &'a [u8],
        dst: &'a mut [u16],
        reference: Option<&'a [u16]>,
    ) -> Self {
        Self {
            bits: BitReader::new(flags),
            palette,
            palette_pos: 0,
            payload,
            payload_pos: 0,
            dst,
            reference,
            block_offset: 0,
        }
    }

    fn read_code(&mut self) -> u8 {
        let code = self.payload[self.payload_pos];
        self.payload_pos += 1;
        code
    }

    fn read_color(&mut self) -> u16 {
        let color = u16::from_le_bytes([
            self.palette[self.palette_pos],
            self.palette[self.palette_pos + 1],
        ]);
        self.palette_pos += 2;
        color
    }

    /// Read a reference pixel at a byte offset. With no separate reference
    /// frame the destination doubles as the reference (self-describing
    /// first frame / seek landing point).
    fn ref_pixel(&self, byte_offset: i32) -> u16 {
        let index = (byte_offset >> 1) as usize;
        match self.reference {
            Some(reference) => reference[index],
            None => self.dst[index],
        }
    }

    fn put_pixel(&mut self, byte_offset: i32, value: u16) {
        self.dst[(byte_offset >> 1) as usize] = value;
    }

    /// Copy `rows` x `width` pixels from the reference into the tile
    fn copy_block(&mut self, ref_offset: i32, rows: i32, width: i32) {
        for r in 0..rows {
            for c in 0..width {
                let within = r * ROW_BYTES + c * 2;
                let value = self.ref_pixel(ref_offset + within);
                self.put_pixel(self.block_offset + within, value);
            }
        }
    }

    fn fill_block(&mut self, rows: i32, width: i32, color: u16) {
        for r in 0..rows {
            for c in 0..width {
                self.put_pixel(self.block_offset + r * ROW_BYTES + c * 2, color);
            }
        }
    }

    /// Write `reference pixel + delta` (mod 2^16) per pixel. Bit 15 of the
    /// pixel format is unused, so carries out of the low color are harmless.
    fn delta_block(&mut self, ref_offset: i32, rows: i32, width: i32, delta: u16) {
        for r in 0..rows {
            for c in 0..width {
                let within = r * ROW_BYTES + c * 2;
                let value = self.ref_pixel(ref_offset + within).wrapping_add(delta);
                self.put_pixel(self.block_offset + within, value);
            }
        }
    }

    /// The three non-split arms shared by every shape above 2x1/1x2
    fn standard_leaf(&mut self, tag: u32, rows: i32, width: i32) {
        match tag {
            0b00 => self.copy_block(self.block_offset, rows, width),
            0b01 => {
                let code = self.read_code();
                self.copy_block(self.block_offset + codebook_offset(code), rows, width);
            }
            _ => {
                if self.bits.next_bit() == 0 {
                    let code = self.read_code();
                    let delta = self.read_color();
                    self.delta_block(self.block_offset + codebook_offset(code), rows, width, delta);
                } else {
                    let color = self.read_color();
                    self.fill_block(rows, width, color);
                }
            }
        }
    }

    /// Macroblock entry point. The 8x8 shape is the only one that does not
    /// advance the cursor: the frame driver repositions it per macroblock.
    pub(crate) fn decode_8x8(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 8, 8);
            return;
        }
        if self.bits.next_bit() == 0 {
            self.decode_8x4();
            self.decode_8x4();
        } else {
            self.decode_4x8();
            self.decode_4x8();
        }
    }

    fn decode_8x4(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 4, 8);
            self.block_offset += 0x780;
            return;
        }
        if self.bits.next_bit() != 0 {
            self.decode_4x4();
            self.decode_4x4();
            self.block_offset += 0x770;
        } else {
            self.decode_8x2();
            self.decode_8x2();
        }
    }

    fn decode_4x8(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 8, 4);
            self.block_offset += 8;
            return;
        }
        if self.bits.next_bit() != 0 {
            self.decode_2x8();
            self.decode_2x8();
        } else {
            self.decode_4x4();
            self.block_offset += 0x778;
            self.decode_4x4();
            self.block_offset -= 0x780;
        }
    }

    fn decode_2x8(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 8, 2);
            self.block_offset += 4;
            return;
        }
        if self.bits.next_bit() != 0 {
            self.decode_1x8();
            self.decode_1x8();
        } else {
            self.decode_2x4();
            self.block_offset += 0x77C;
            self.decode_2x4();
            self.block_offset -= 0x780;
        }
    }

    fn decode_1x8(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 8, 1);
            self.block_offset += 2;
            return;
        }
        // Single-column shape: only a vertical halving exists
        self.decode_1x4();
        self.block_offset += 0x77E;
        self.decode_1x4();
        self.block_offset -= 0x780;
    }

    fn decode_4x4(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 4, 4);
            self.block_offset += 8;
            return;
        }
        if self.bits.next_bit() != 0 {
            self.decode_2x4();
            self.decode_2x4();
        } else {
            self.decode_4x2();
            self.block_offset += 0x3B8;
            self.decode_4x2();
            self.block_offset -= 0x3C0;
        }
    }

    fn decode_8x2(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 2, 8);
            self.block_offset += 0x3C0;
            return;
        }
        if self.bits.next_bit() != 0 {
            self.decode_4x2();
            self.decode_4x2();
            self.block_offset += 0x3B0;
        } else {
            self.decode_8x1();
            self.decode_8x1();
        }
    }

    fn decode_2x4(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 4, 2);
            self.block_offset += 4;
            return;
        }
        if self.bits.next_bit() != 0 {
            self.decode_1x4();
            self.decode_1x4();
        } else {
            self.decode_2x2();
            self.block_offset += 0x3BC;
            self.decode_2x2();
            self.block_offset -= 0x3C0;
        }
    }

    fn decode_4x2(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 2, 4);
            self.block_offset += 8;
            return;
        }
        if self.bits.next_bit() != 0 {
            self.decode_2x2();
            self.decode_2x2();
        } else {
            self.decode_4x1();
            self.block_offset += 0x1D8;
            self.decode_4x1();
            self.block_offset -= 0x1E0;
        }
    }

    fn decode_8x1(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 1, 8);
            self.block_offset += 0x1E0;
            return;
        }
        // Single-row shape: only a horizontal halving exists
        self.decode_4x1();
        self.decode_4x1();
        self.block_offset += 0x1D0;
    }

    fn decode_1x4(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 4, 1);
            self.block_offset += 2;
            return;
        }
        self.decode_1x2();
        self.block_offset += 0x3BE;
        self.decode_1x2();
        self.block_offset -= 0x3C0;
    }

    fn decode_2x2(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 2, 2);
            self.block_offset += 4;
            return;
        }
        if self.bits.next_bit() != 0 {
            self.decode_1x2();
            self.decode_1x2();
        } else {
            self.decode_2x1();
            self.block_offset += 0x1DC;
            self.decode_2x1();
            self.block_offset -= 0x1E0;
        }
    }

    fn decode_4x1(&mut self) {
        let tag = self.bits.next_two_bits();
        if tag != 0b10 {
            self.standard_leaf(tag, 1, 4);
            self.block_offset += 8;
            return;
        }
        self.decode_2x1();
        self.decode_2x1();
    }

    fn decode_1x2(&mut self) {
        match self.bits.next_two_bits() {
            0b00 => self.copy_block(self.block_offset, 2, 1),
            0b01 => {
                let code = self.read_code();
                self.copy_block(self.block_offset + codebook_offset(code), 2, 1);
            }
            0b10 => {
                let code = self.read_code();
                let delta = self.read_color();
                self.delta_block(self.block_offset + codebook_offset(code), 2, 1, delta);
            }
            _ => {
                if self.bits.next_bit() == 0 {
                    let color = self.read_color();
                    self.fill_block(2, 1, color);
                } else {
                    // Two distinct palette colors, stacked vertically
                    let color0 = self.read_color();
                    let color1 = self.read_color();
                    self.put_pixel(self.block_offset, color0);
                    self.put_pixel(self.block_offset + ROW_BYTES, color1);
                }
            }
        }
        self.block_offset += 2;
    }

    fn decode_2x1(&mut self) {
        match self.bits.next_two_bits() {
            0b00 => self.copy_block(self.block_offset, 1, 2),
            0b01 => {
                let code = self.read_code();
                self.copy_block(self.block_offset + codebook_offset(code), 1, 2);
            }
            0b10 => {
                let code = self.read_code();
                let delta = self.read_color();
                self.delta_block(self.block_offset + codebook_offset(code), 1, 2, delta);
            }
            _ => {
                if self.bits.next_bit() == 0 {
                    let color = self.read_color();
                    self.put_pixel(self.block_offset, color);
                    self.put_pixel(self.block_offset + 2, color);
                } else {
                    // Two distinct palette colors, side by side
                    let color0 = self.read_color();
                    let color1 = self.read_color();
                    self.put_pixel(self.block_offset, color0);
                    self.put_pixel(self.block_offset + 2, color1);
                }
            }
        }
        self.block_offset += 4;
    }
}

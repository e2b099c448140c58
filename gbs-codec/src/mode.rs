//! Wire mode configuration

/// GBS audio wire modes
///
/// The mode selector in the container header fixes the sample rate, channel
/// count, block geometry and code packing all at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GbsMode {
    /// Stereo 4-bit IMA ADPCM, 22050 Hz, 0x400 blocks
    Stereo4Bit = 0,
    /// Mono 3-bit ADPCM, 11025 Hz, 0x400 blocks
    Mono3Bit = 1,
    /// Mono 4-bit IMA ADPCM, 22050 Hz, 0x200 blocks
    Mono4Bit = 2,
    /// Mono 2-bit ADPCM, 22050 Hz, 0x200 blocks
    Mono2Bit = 3,
    /// Mono 2-bit ADPCM, 11025 Hz, 0x100 blocks
    Mono2BitSmall = 4,
}

impl GbsMode {
    /// Map the container's mode selector to a mode, `None` for values > 4
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Stereo4Bit),
            1 => Some(Self::Mono3Bit),
            2 => Some(Self::Mono4Bit),
            3 => Some(Self::Mono2Bit),
            4 => Some(Self::Mono2BitSmall),
            _ => None,
        }
    }

    /// Output sample rate in Hz
    #[must_use]
    pub fn sample_rate(self) -> u32 {
        match self {
            Self::Stereo4Bit | Self::Mono4Bit | Self::Mono2Bit => 22050,
            Self::Mono3Bit | Self::Mono2BitSmall => 11025,
        }
    }

    /// Channel count (1 or 2)
    #[must_use]
    pub fn channels(self) -> u8 {
        match self {
            Self::Stereo4Bit => 2,
            _ => 1,
        }
    }

    /// Total block size in bytes, header included
    #[must_use]
    pub fn block_size(self) -> usize {
        match self {
            Self::Stereo4Bit | Self::Mono3Bit => 0x400,
            Self::Mono4Bit | Self::Mono2Bit => 0x200,
            Self::Mono2BitSmall => 0x100,
        }
    }

    /// Per-block header size in bytes (4 per channel)
    #[must_use]
    pub fn header_size(self) -> usize {
        match self {
            Self::Stereo4Bit => 8,
            _ => 4,
        }
    }

    /// Code bytes per block (block size minus the header)
    #[must_use]
    pub fn body_size(self) -> usize {
        self.block_size() - self.header_size()
    }

    /// Samples decoded from one block (per channel for stereo)
    #[must_use]
    pub fn samples_per_block(self) -> u32 {
        let body = self.body_size() as u32;
        match self {
            Self::Stereo4Bit => body,
            Self::Mono3Bit => (body / 3) * 8,
            Self::Mono4Bit => body * 2,
            Self::Mono2Bit | Self::Mono2BitSmall => body * 4,
        }
    }

    /// Whether this mode's step index is bounded by the 2-bit ceiling (0x160)
    /// rather than the IMA ceiling (88)
    #[must_use]
    pub fn uses_2bit_step_range(self) -> bool {
        matches!(self, Self::Mono2Bit | Self::Mono2BitSmall)
    }
}

//! Video playback driver
//!
//! The driver decodes one frame ahead of presentation into the back half of
//! a buffer pair, then waits for the pacing counter before presenting.
//! Pacing comes from the display ticker: every sixth 60 Hz tick releases
//! one frame, for a nominal 10 fps regardless of how fast the decoder runs.
//!
//! Seeking is minute-granular through an I-frame table built once at load
//! by scanning the frame-length chain: one entry per 600 frames, capped at
//! 256 minutes.

use gbm_codec::{FRAME_PIXELS, GBM_HEADER_SIZE, GbmDecoder, VersionKey};
use thiserror::Error;
use tracing::{debug, info};

use crate::hal::{FrameSink, Ticker};

/// Frames per minute at the nominal 10 fps
pub const FRAMES_PER_MINUTE: u32 = 600;

/// Display refresh ticks per presented frame (60 Hz / 10 fps)
const VBLANKS_PER_FRAME: u32 = 6;

/// Display refresh rate handed to the ticker
const VBLANK_RATE: u32 = 60;

/// I-frame table capacity in minutes
pub const MAX_IFRAME_MINUTES: usize = 256;

/// Errors from GBM container validation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VideoError {
    /// Container smaller than its fixed header
    #[error("container too small for its 512-byte header")]
    ShortContainer,

    /// No decodable frame after the header
    #[error("container holds no decodable frames")]
    EmptyStream,
}

/// Paced video player over a GBM container
pub struct VideoPlayer<'a, F: FrameSink, T: Ticker> {
    sink: F,
    ticker: T,
    decoder: GbmDecoder,

    data: Option<&'a [u8]>,
    offset: usize,

    current_frame: u32,
    target_frame: u32,
    vblank_count: u32,
    current_minute: u32,

    iframe_table: Vec<u32>,
    total_frames: u32,

    frames: [Vec<u16>; 2],
    back: usize,
    frame_ready: bool,
    /// Next decode has no valid reference (stream start or seek landing)
    fresh: bool,
    running: bool,
}

impl<'a, F: FrameSink, T: Ticker> VideoPlayer<'a, F, T> {
    /// Create a player around a frame sink and its pacing ticker
    pub fn new(sink: F, ticker: T, version_key: VersionKey) -> Self {
        Self {
            sink,
            ticker,
            decoder: GbmDecoder::new(version_key),
            data: None,
            offset: GBM_HEADER_SIZE,
            current_frame: 0,
            target_frame: 0,
            vblank_count: 0,
            current_minute: 0,
            iframe_table: Vec::new(),
            total_frames: 0,
            frames: [vec![0; FRAME_PIXELS], vec![0; FRAME_PIXELS]],
            back: 0,
            frame_ready: false,
            fresh: true,
            running: false,
        }
    }

    /// Select the XOR key for subsequent frames
    pub fn set_version_key(&mut self, version_key: VersionKey) {
        self.decoder.set_version_key(version_key);
    }

    /// Validate a GBM container and build its I-frame table
    pub fn load(&mut self, data: &'a [u8]) -> Result<(), VideoError> {
        if data.len() < GBM_HEADER_SIZE + 6 {
            return Err(VideoError::ShortContainer);
        }

        // Forward scan of the frame-length chain; only the lengths matter
        let mut iframe_table = Vec::new();
        let mut offset = GBM_HEADER_SIZE;
        let mut frame = 0u32;
        while offset + 6 <= data.len() {
            let frame_len = u16::from_le_bytes([data[offset], data[offset + 1]]);
            if frame_len == 0 || frame_len == 0xFFFF {
                break;
            }
            let next = offset + 2 + frame_len as usize;
            if next > data.len() {
                break;
            }
            if frame % FRAMES_PER_MINUTE == 0 && iframe_table.len() < MAX_IFRAME_MINUTES {
                iframe_table.push(offset as u32);
            }
            frame += 1;
            offset = next;
        }
        if frame == 0 {
            return Err(VideoError::EmptyStream);
        }
        info!(
            frames = frame,
            minutes = iframe_table.len(),
            "video stream ready"
        );

        self.data = Some(data);
        self.iframe_table = iframe_table;
        self.total_frames = frame;
        self.offset = GBM_HEADER_SIZE;
        self.current_frame = 0;
        self.target_frame = 0;
        self.vblank_count = 0;
        self.current_minute = 0;
        self.back = 0;
        self.frame_ready = false;
        self.fresh = true;
        Ok(())
    }

    /// Begin pacing
    pub fn start(&mut self) {
        if self.data.is_none() {
            return;
        }
        self.ticker.start(VBLANK_RATE, 1);
        self.running = true;
    }

    /// Stop pacing; the cursor keeps its position
    pub fn stop(&mut self) {
        self.ticker.stop();
        self.running = false;
    }

    /// Display-rate tick: every sixth invocation releases one frame
    pub fn on_vblank(&mut self) {
        self.vblank_count += 1;
        if self.vblank_count >= VBLANKS_PER_FRAME {
            self.vblank_count = 0;
            self.target_frame += 1;
        }
    }

    /// One iteration of the foreground loop
    ///
    /// Decodes ahead if no frame is pending, then presents it once pacing
    /// allows. Returns whether a frame was presented.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if !self.frame_ready {
            self.decode_ahead();
            if !self.frame_ready {
                return false;
            }
        }
        if self.current_frame >= self.target_frame {
            return false;
        }

        self.sink.present(&self.frames[self.back]);
        self.current_frame += 1;
        self.current_minute = self.current_frame / FRAMES_PER_MINUTE;
        self.back ^= 1;
        self.frame_ready = false;
        true
    }

    /// Jump to the I-frame at `minute`
    ///
    /// Returns false (and does nothing) when the minute is past the I-frame
    /// table.
    pub fn seek_to_minute(&mut self, minute: u32) -> bool {
        let Some(&offset) = self.iframe_table.get(minute as usize) else {
            return false;
        };
        debug!(minute, offset, "video seek");
        self.offset = offset as usize;
        self.current_frame = minute * FRAMES_PER_MINUTE;
        self.target_frame = self.current_frame;
        self.vblank_count = 0;
        self.current_minute = minute;
        self.frame_ready = false;
        self.fresh = true;
        true
    }

    /// Minute of the presentation cursor
    pub fn current_minute(&self) -> u32 {
        self.current_minute
    }

    /// Presented frame count since the last seek target
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Seekable minutes (I-frame table length)
    pub fn minutes(&self) -> u32 {
        self.iframe_table.len() as u32
    }

    /// Frames discovered by the load scan
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn decode_ahead(&mut self) {
        if self.data.is_none() {
            return;
        }
        let mut next = self.decode_once();
        if next == 0 {
            // End of stream: wrap to the first frame and restart pacing
            debug!("video stream wrapped");
            self.offset = GBM_HEADER_SIZE;
            self.current_frame = 0;
            self.target_frame = 0;
            self.current_minute = 0;
            self.fresh = true;
            next = self.decode_once();
            if next == 0 {
                self.running = false;
                return;
            }
        }
        self.offset = next;
        self.frame_ready = true;
        self.fresh = false;
    }

    fn decode_once(&mut self) -> usize {
        let Some(data) = self.data else { return 0 };
        let (front, rear) = self.frames.split_at_mut(1);
        let (dst, reference) = if self.back == 0 {
            (&mut front[0], &rear[0])
        } else {
            (&mut rear[0], &front[0])
        };
        let reference = if self.fresh {
            None
        } else {
            Some(reference.as_slice())
        };
        self.decoder.decode_frame(data, self.offset, dst, reference)
    }
}

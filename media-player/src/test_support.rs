//! Shared test doubles and container builders

use std::cell::RefCell;
use std::rc::Rc;

use gbm_codec::{GBM_HEADER_SIZE, VersionKey};
use gbs_codec::GbsMode;
use media_common::formats::gbs::{GBS_MAGIC, GBS_MARKER};

use crate::hal::{FrameSink, SampleSink, Ticker};

#[derive(Default)]
struct SinkState {
    begun: Option<(u32, u8)>,
    submissions: usize,
    stopped: bool,
    last_left: Vec<i8>,
    saw_right: bool,
}

/// Recording sample sink; clones share one recording
#[derive(Clone, Default)]
pub struct TestSink(Rc<RefCell<SinkState>>);

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begun(&self) -> Option<(u32, u8)> {
        self.0.borrow().begun
    }

    pub fn submissions(&self) -> usize {
        self.0.borrow().submissions
    }

    pub fn is_stopped(&self) -> bool {
        self.0.borrow().stopped
    }

    pub fn last_left(&self) -> Vec<i8> {
        self.0.borrow().last_left.clone()
    }

    pub fn saw_right(&self) -> bool {
        self.0.borrow().saw_right
    }
}

impl SampleSink for TestSink {
    fn begin(&mut self, sample_rate: u32, channels: u8) {
        let mut state = self.0.borrow_mut();
        state.begun = Some((sample_rate, channels));
        state.stopped = false;
    }

    fn submit(&mut self, left: &[i8], right: Option<&[i8]>) {
        let mut state = self.0.borrow_mut();
        state.submissions += 1;
        state.last_left = left.to_vec();
        state.saw_right |= right.is_some();
    }

    fn stop(&mut self) {
        self.0.borrow_mut().stopped = true;
    }
}

#[derive(Default)]
struct TickerState {
    running: bool,
    config: Option<(u32, u32)>,
}

/// Recording ticker; clones share one recording
#[derive(Clone, Default)]
pub struct TestTicker(Rc<RefCell<TickerState>>);

impl TestTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.0.borrow().running
    }

    pub fn config(&self) -> Option<(u32, u32)> {
        self.0.borrow().config
    }
}

impl Ticker for TestTicker {
    fn start(&mut self, rate_hz: u32, divider: u32) {
        let mut state = self.0.borrow_mut();
        state.running = true;
        state.config = Some((rate_hz, divider));
    }

    fn stop(&mut self) {
        self.0.borrow_mut().running = false;
    }
}

#[derive(Default)]
struct FrameState {
    presents: usize,
    last_frame: Vec<u16>,
}

/// Recording frame sink; clones share one recording
#[derive(Clone, Default)]
pub struct TestFrameSink(Rc<RefCell<FrameState>>);

impl TestFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presents(&self) -> usize {
        self.0.borrow().presents
    }

    pub fn last_frame(&self) -> Vec<u16> {
        self.0.borrow().last_frame.clone()
    }
}

impl FrameSink for TestFrameSink {
    fn present(&mut self, frame: &[u16]) {
        let mut state = self.0.borrow_mut();
        state.presents += 1;
        state.last_frame = frame.to_vec();
    }
}

/// A valid GBS container: `blocks` blocks of silence-seeded headers
pub fn gbs_container(mode: GbsMode, blocks: usize) -> Vec<u8> {
    let block_size = mode.block_size();
    let mut data = vec![0u8; 0x200 + blocks * block_size];
    let data_len = data.len() as u32;
    data[0..4].copy_from_slice(GBS_MAGIC);
    data[4..8].copy_from_slice(&data_len.to_le_bytes());
    data[8..12].copy_from_slice(GBS_MARKER);
    data[0x10..0x14].copy_from_slice(&(mode as u32).to_le_bytes());

    for block in 0..blocks {
        let base = 0x200 + block * block_size;
        data[base..base + 4].copy_from_slice(&[0x00, 0x80, 0x00, 0x00]);
        if mode.channels() == 2 {
            data[base + 4..base + 8].copy_from_slice(&[0x00, 0x80, 0x00, 0x00]);
        }
    }
    data
}

/// A GBM container of `frames` frames: the first fills every macroblock
/// with `fill_color`, the rest are all copy-same
pub fn gbm_container(frames: usize, fill_color: u16) -> Vec<u8> {
    let mut data = vec![0u8; GBM_HEADER_SIZE];
    for frame in 0..frames {
        if frame == 0 {
            data.extend_from_slice(&fill_frame(fill_color));
        } else {
            data.extend_from_slice(&copy_same_frame());
        }
    }
    data
}

/// Pack flag bits MSB-first into LE words
fn pack_flags(bits: &[u8]) -> Vec<u8> {
    let mut flags = Vec::new();
    for chunk in bits.chunks(32) {
        let mut word = 0u32;
        for (i, &bit) in chunk.iter().enumerate() {
            word |= u32::from(bit) << (31 - i);
        }
        flags.extend_from_slice(&word.to_le_bytes());
    }
    flags
}

fn frame_bytes(flags: &[u8], palette: &[u8], payload: &[u8]) -> Vec<u8> {
    let frame_len = (4 + flags.len() + palette.len() + payload.len()) as u16;
    let mut out = Vec::new();
    out.extend_from_slice(&frame_len.to_le_bytes());
    out.extend_from_slice(&((flags.len() as u16) ^ VersionKey::Gen1.xor_mask()).to_le_bytes());
    out.extend_from_slice(&(palette.len() as u16).to_le_bytes());
    out.extend_from_slice(flags);
    out.extend_from_slice(palette);
    out.extend_from_slice(payload);
    out
}

/// Self-describing frame: 600 macroblock fills of one color
fn fill_frame(color: u16) -> Vec<u8> {
    let bits: Vec<u8> = std::iter::repeat_n([1u8, 1, 1], 600).flatten().collect();
    let palette: Vec<u8> = std::iter::repeat_n(color.to_le_bytes(), 600)
        .flatten()
        .collect();
    frame_bytes(&pack_flags(&bits), &palette, &[])
}

/// Frame that reproduces its reference: 600 copy-same macroblocks
fn copy_same_frame() -> Vec<u8> {
    let bits = vec![0u8; 1200];
    frame_bytes(&pack_flags(&bits), &[], &[])
}

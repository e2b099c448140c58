//! Double-buffered audio streaming engine
//!
//! Two PCM buffers per channel alternate between the sink and the decoder:
//! while the sink drains the active buffer, the buffer-consumed callback
//! refills the other one. The swap rate at 22050 Hz with 1024-sample
//! buffers is about 21.5 Hz.
//!
//! The engine also tracks minute boundaries as it decodes. Each crossing is
//! published through a one-slot mailbox (`check_minute_sync`) that the
//! video driver reads and clears, which is the only coupling between the
//! two decoders.

use gbs_codec::{BlockDecoder, GbsMode};
use media_common::{GbsError, GbsHeader};
use tracing::{debug, info};

use crate::hal::{SampleSink, Ticker};

/// Samples per PCM buffer, per channel
///
/// Must stay divisible by 8 so a mode-1 sample group never straddles a
/// buffer swap.
pub const AUDIO_BUFFER_SAMPLES: usize = 1024;

/// Static stream parameters, fixed at init
#[derive(Debug, Clone, Copy)]
pub struct AudioInfo {
    pub mode: GbsMode,
    pub sample_rate: u32,
    pub channels: u8,
    pub total_blocks: u32,
    /// Per channel for stereo
    pub total_samples: u32,
}

/// Engine lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayState {
    Uninitialized,
    Ready,
    Playing,
    Paused,
    Finished,
}

/// Streaming audio engine over a GBS container
pub struct AudioEngine<'a, S: SampleSink, T: Ticker> {
    sink: S,
    ticker: T,

    decoder: Option<BlockDecoder<'a>>,
    info: Option<AudioInfo>,
    state: PlayState,

    left: [[i8; AUDIO_BUFFER_SAMPLES]; 2],
    right: [[i8; AUDIO_BUFFER_SAMPLES]; 2],
    active_buffer: usize,

    samples_decoded: u32,
    samples_per_minute: u32,
    next_minute_sample: u32,
    current_minute: u32,
    sync_minute: Option<u32>,
}

impl<'a, S: SampleSink, T: Ticker> AudioEngine<'a, S, T> {
    /// Create an engine around a sink and its buffer-consumed ticker
    pub fn new(sink: S, ticker: T) -> Self {
        Self {
            sink,
            ticker,
            decoder: None,
            info: None,
            state: PlayState::Uninitialized,
            left: [[0; AUDIO_BUFFER_SAMPLES]; 2],
            right: [[0; AUDIO_BUFFER_SAMPLES]; 2],
            active_buffer: 0,
            samples_decoded: 0,
            samples_per_minute: 0,
            next_minute_sample: 0,
            current_minute: 0,
            sync_minute: None,
        }
    }

    /// Validate a GBS container and become ready to play it
    pub fn init(&mut self, data: &'a [u8]) -> Result<(), GbsError> {
        self.shutdown();

        let header = GbsHeader::parse(data)?;
        let decoder = BlockDecoder::new(header.blocks(data), header.mode);

        let info = AudioInfo {
            mode: header.mode,
            sample_rate: header.mode.sample_rate(),
            channels: header.mode.channels(),
            total_blocks: decoder.total_blocks(),
            total_samples: decoder.total_samples(),
        };
        info!(
            mode = ?info.mode,
            sample_rate = info.sample_rate,
            blocks = info.total_blocks,
            seconds = info.total_samples / info.sample_rate,
            "audio stream ready"
        );

        self.samples_per_minute = info.sample_rate * 60;
        self.next_minute_sample = self.samples_per_minute;
        self.decoder = Some(decoder);
        self.info = Some(info);
        self.state = PlayState::Ready;
        Ok(())
    }

    /// Static stream parameters, `None` before a successful `init`
    pub fn info(&self) -> Option<&AudioInfo> {
        self.info.as_ref()
    }

    /// Preload both buffers and start the sink and ticker
    pub fn start(&mut self) {
        if self.state != PlayState::Ready {
            return;
        }
        let Some(info) = self.info else { return };

        self.refill(0);
        self.refill(1);
        self.active_buffer = 0;

        self.sink.begin(info.sample_rate, info.channels);
        self.submit_active();
        self.ticker
            .start(info.sample_rate, AUDIO_BUFFER_SAMPLES as u32);
        self.state = PlayState::Playing;
    }

    /// Stop playback, keeping the decode position
    pub fn stop(&mut self) {
        if self.state == PlayState::Uninitialized {
            return;
        }
        self.ticker.stop();
        self.sink.stop();
        self.state = PlayState::Ready;
    }

    /// Halt the ticks without touching buffers or decoder state
    pub fn pause(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        self.ticker.stop();
        self.sink.stop();
        self.state = PlayState::Paused;
    }

    /// Resume from a pause with the same active buffer
    pub fn resume(&mut self) {
        if self.state != PlayState::Paused {
            return;
        }
        let Some(info) = self.info else { return };
        self.sink.begin(info.sample_rate, info.channels);
        self.submit_active();
        self.ticker
            .start(info.sample_rate, AUDIO_BUFFER_SAMPLES as u32);
        self.state = PlayState::Playing;
    }

    /// Back to the top of the stream
    pub fn restart(&mut self) {
        if self.state == PlayState::Uninitialized {
            return;
        }
        debug!("audio restart");
        self.seek_minute(0);
    }

    /// Reposition to the block containing minute `minute` and play
    ///
    /// A target at or past the end wraps to minute 0.
    pub fn seek_minute(&mut self, minute: u32) {
        if self.state == PlayState::Uninitialized {
            return;
        }
        self.stop();

        let Some(info) = self.info else { return };
        let Some(decoder) = self.decoder.as_mut() else {
            return;
        };

        let mut minute = minute;
        let mut target_sample = minute.saturating_mul(self.samples_per_minute);
        if target_sample >= info.total_samples {
            minute = 0;
            target_sample = 0;
        }

        let samples_per_block = info.mode.samples_per_block();
        let mut target_block = target_sample / samples_per_block;
        if target_block >= info.total_blocks {
            target_block = 0;
        }
        debug!(minute, block = target_block, "audio seek");

        decoder.seek_to_block(target_block);
        self.samples_decoded = target_block * samples_per_block;
        self.current_minute = minute;
        self.next_minute_sample = (minute + 1) * self.samples_per_minute;
        self.sync_minute = None;

        self.state = PlayState::Ready;
        self.start();
    }

    /// Release the container and return to the uninitialized state
    pub fn shutdown(&mut self) {
        if self.state != PlayState::Uninitialized {
            self.stop();
        }
        self.decoder = None;
        self.info = None;
        self.state = PlayState::Uninitialized;
        self.active_buffer = 0;
        self.samples_decoded = 0;
        self.samples_per_minute = 0;
        self.next_minute_sample = 0;
        self.current_minute = 0;
        self.sync_minute = None;
    }

    /// Buffer-consumed callback: flip buffers, refill the drained one, and
    /// detect minute crossings
    ///
    /// Invoked by the host's ticker each time the sink finishes the active
    /// buffer.
    pub fn on_buffer_consumed(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        if self.decoder.as_ref().is_none_or(BlockDecoder::is_finished) {
            self.ticker.stop();
            self.sink.stop();
            self.state = PlayState::Finished;
            debug!("audio stream finished");
            return;
        }

        let drained = self.active_buffer;
        self.active_buffer ^= 1;
        self.submit_active();
        self.refill(drained);

        if self.samples_decoded >= self.next_minute_sample {
            self.current_minute += 1;
            self.next_minute_sample += self.samples_per_minute;
            self.sync_minute = Some(self.current_minute);
            debug!(minute = self.current_minute, "audio minute boundary");
        }
    }

    /// Pending minute crossing, read-and-clear
    ///
    /// Each crossing is observed exactly once; the slot is `None` again on
    /// the next read.
    pub fn check_minute_sync(&mut self) -> Option<u32> {
        self.sync_minute.take()
    }

    /// Playing or paused (a pause does not end playback)
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlayState::Playing | PlayState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlayState::Paused
    }

    /// Whether the decoder has run past the last block
    pub fn is_finished(&self) -> bool {
        self.state == PlayState::Finished
            || self.decoder.as_ref().is_some_and(BlockDecoder::is_finished)
    }

    /// Decode progress in percent
    pub fn progress_percent(&self) -> u32 {
        let Some(info) = self.info else { return 0 };
        if info.total_samples == 0 {
            return 0;
        }
        (u64::from(self.samples_decoded) * 100 / u64::from(info.total_samples)) as u32
    }

    /// Minute the decode cursor is in
    pub fn current_minute(&self) -> u32 {
        self.current_minute
    }

    /// Stream length in whole minutes, rounded up
    pub fn total_minutes(&self) -> u32 {
        let Some(info) = self.info else { return 0 };
        if self.samples_per_minute == 0 {
            return 0;
        }
        info.total_samples.div_ceil(self.samples_per_minute)
    }

    /// Samples decoded so far (per channel for stereo)
    pub fn samples_decoded(&self) -> u32 {
        self.samples_decoded
    }

    fn submit_active(&mut self) {
        let stereo = self.info.is_some_and(|info| info.channels == 2);
        let bank = self.active_buffer;
        let right = if stereo {
            Some(&self.right[bank][..])
        } else {
            None
        };
        self.sink.submit(&self.left[bank], right);
    }

    fn refill(&mut self, bank: usize) {
        let Some(decoder) = self.decoder.as_mut() else {
            return;
        };
        let stereo = self.info.is_some_and(|info| info.channels == 2);
        let decoded = if stereo {
            let (left, right) = (&mut self.left[bank], &mut self.right[bank]);
            decoder.decode(left, Some(right))
        } else {
            decoder.decode(&mut self.left[bank], None)
        };
        self.samples_decoded += decoded;
    }
}

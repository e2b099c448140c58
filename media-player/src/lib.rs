//! Synchronized GBS/GBM playback engine
//!
//! Ties the two codecs to the host hardware through three narrow traits:
//!
//! - [`SampleSink`] drains double-buffered PCM at the stream's sample rate
//! - [`FrameSink`] presents decoded 240x160 RGB555 frames
//! - [`Ticker`] fires the two periodic callbacks (buffer-consumed and
//!   display refresh)
//!
//! The host wires its timers to [`MediaPlayer::on_audio_tick`] and
//! [`MediaPlayer::on_vblank`], then runs [`MediaPlayer::poll`] in its
//! foreground loop. Everything is single-threaded and cooperative: the
//! engines mutate state only inside these calls, and seeks stop the tickers
//! first so no callback observes a half-updated cursor.

pub mod audio;
pub mod hal;
pub mod player;
pub mod video;

#[cfg(test)]
mod test_support;

pub use audio::{AUDIO_BUFFER_SAMPLES, AudioEngine, AudioInfo};
pub use hal::{FrameSink, SampleSink, Ticker};
pub use player::MediaPlayer;
pub use video::{FRAMES_PER_MINUTE, MAX_IFRAME_MINUTES, VideoError, VideoPlayer};

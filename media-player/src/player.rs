//! Synchronized A/V playback
//!
//! The coordinator owns both engines and runs the one coupling between
//! them: after every presented frame it drains the audio engine's minute
//! mailbox and, when a boundary was crossed, snaps the video to that
//! minute's I-frame. Audio is never adjusted to video.

use anyhow::{Context, Result};
use media_common::MediaSource;
use tracing::debug;

use crate::audio::AudioEngine;
use crate::hal::{FrameSink, SampleSink, Ticker};
use crate::video::VideoPlayer;

/// Audio engine plus video driver behind one control surface
pub struct MediaPlayer<'a, S, AT, F, VT>
where
    S: SampleSink,
    AT: Ticker,
    F: FrameSink,
    VT: Ticker,
{
    pub audio: AudioEngine<'a, S, AT>,
    pub video: VideoPlayer<'a, F, VT>,
}

impl<'a, S, AT, F, VT> MediaPlayer<'a, S, AT, F, VT>
where
    S: SampleSink,
    AT: Ticker,
    F: FrameSink,
    VT: Ticker,
{
    pub fn new(audio: AudioEngine<'a, S, AT>, video: VideoPlayer<'a, F, VT>) -> Self {
        Self { audio, video }
    }

    /// Locate the media pair in an archive and initialize both engines
    pub fn load(&mut self, source: &MediaSource<'a>) -> Result<()> {
        let (audio_name, audio_bytes) = source
            .find_audio()
            .context("archive holds no audio container")?;
        let (video_name, video_bytes) = source
            .find_video()
            .context("archive holds no video container")?;

        self.audio
            .init(audio_bytes)
            .with_context(|| format!("invalid audio container: {audio_name}"))?;
        self.video
            .load(video_bytes)
            .with_context(|| format!("invalid video container: {video_name}"))?;
        Ok(())
    }

    /// Start both engines
    pub fn start(&mut self) {
        self.audio.start();
        self.video.start();
    }

    /// Stop both engines, keeping their positions
    pub fn stop(&mut self) {
        self.audio.stop();
        self.video.stop();
    }

    /// One foreground iteration: advance video, then re-sync it to audio
    ///
    /// Returns whether a frame was presented.
    pub fn poll(&mut self) -> bool {
        let presented = self.video.step();
        if presented {
            if let Some(minute) = self.audio.check_minute_sync() {
                if !self.video.seek_to_minute(minute) {
                    debug!(minute, "sync target past the i-frame table, ignored");
                }
            }
        }
        presented
    }

    /// Buffer-consumed tick, forwarded to the audio engine
    pub fn on_audio_tick(&mut self) {
        self.audio.on_buffer_consumed();
    }

    /// Display tick, forwarded to the video driver
    pub fn on_vblank(&mut self) {
        self.video.on_vblank();
    }

    /// Both streams back to the top
    pub fn restart(&mut self) {
        self.audio.restart();
        self.video.seek_to_minute(0);
    }

    /// Skip forward one minute, wrapping at the end
    pub fn seek_next_minute(&mut self) {
        let total = self.audio.total_minutes();
        if total == 0 {
            return;
        }
        let current = self.audio.current_minute();
        let target = if current + 1 >= total { 0 } else { current + 1 };
        self.seek_both(target);
    }

    /// Skip back one minute, saturating at the start
    pub fn seek_previous_minute(&mut self) {
        let target = self.audio.current_minute().saturating_sub(1);
        self.seek_both(target);
    }

    fn seek_both(&mut self, minute: u32) {
        self.audio.seek_minute(minute);
        self.video.seek_to_minute(minute);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestFrameSink, TestSink, TestTicker, gbm_container, gbs_container};
    use gbm_codec::VersionKey;
    use gbs_codec::GbsMode;
    use media_common::ArchiveBuilder;

    fn build_archive(audio_blocks: usize, video_frames: usize) -> Vec<u8> {
        ArchiveBuilder::new()
            .add(
                "movie.gbm",
                &gbm_container(video_frames, 0x03E0),
            )
            .add(
                "movie.gbs",
                &gbs_container(GbsMode::Mono2BitSmall, audio_blocks),
            )
            .build()
    }

    fn player_for<'a>(
        source: &MediaSource<'a>,
    ) -> MediaPlayer<'a, TestSink, TestTicker, TestFrameSink, TestTicker> {
        let audio = AudioEngine::new(TestSink::new(), TestTicker::new());
        let video = VideoPlayer::new(TestFrameSink::new(), TestTicker::new(), VersionKey::Gen1);
        let mut player = MediaPlayer::new(audio, video);
        player.load(source).unwrap();
        player
    }

    #[test]
    fn test_load_requires_both_containers() {
        let bytes = ArchiveBuilder::new()
            .add("movie.gbs", &gbs_container(GbsMode::Mono2Bit, 2))
            .build();
        let source = MediaSource::from_bytes(&bytes).unwrap();

        let audio = AudioEngine::new(TestSink::new(), TestTicker::new());
        let video = VideoPlayer::new(TestFrameSink::new(), TestTicker::new(), VersionKey::Gen1);
        let mut player = MediaPlayer::new(audio, video);
        assert!(player.load(&source).is_err());
    }

    #[test]
    fn test_minute_crossing_resyncs_video() {
        // 700 mode-4 blocks run just past one minute of audio; 601 frames
        // give the video a second I-frame to land on.
        let bytes = build_archive(700, 601);
        let source = MediaSource::from_bytes(&bytes).unwrap();
        let mut player = player_for(&source);
        player.start();

        // Drive audio across the minute-1 boundary
        for _ in 0..650 {
            player.on_audio_tick();
        }
        // Release and present one video frame; poll consumes the crossing
        for _ in 0..6 {
            player.on_vblank();
        }
        assert!(player.poll());
        assert_eq!(player.video.current_minute(), 1);
        assert_eq!(player.video.current_frame(), 600);
        // Mailbox is clear afterwards
        assert_eq!(player.audio.check_minute_sync(), None);
    }

    #[test]
    fn test_sync_past_iframe_table_is_ignored() {
        // Only one minute of video: a crossing to minute 1 has no I-frame
        let bytes = build_archive(700, 3);
        let source = MediaSource::from_bytes(&bytes).unwrap();
        let mut player = player_for(&source);
        player.start();

        for _ in 0..650 {
            player.on_audio_tick();
        }
        for _ in 0..6 {
            player.on_vblank();
        }
        assert!(player.poll());
        // Video continues unsynced from frame 1
        assert_eq!(player.video.current_minute(), 0);
        assert_eq!(player.video.current_frame(), 1);
    }

    #[test]
    fn test_restart_resets_both_engines() {
        let bytes = build_archive(8, 3);
        let source = MediaSource::from_bytes(&bytes).unwrap();
        let mut player = player_for(&source);
        player.start();

        for _ in 0..3 {
            player.on_audio_tick();
        }
        for _ in 0..6 {
            player.on_vblank();
        }
        player.poll();

        player.restart();
        assert_eq!(player.audio.current_minute(), 0);
        assert_eq!(player.video.current_frame(), 0);
        assert!(player.audio.is_playing());
    }

    #[test]
    fn test_minute_step_seeks_wrap() {
        let bytes = build_archive(700, 601);
        let source = MediaSource::from_bytes(&bytes).unwrap();
        let mut player = player_for(&source);
        player.start();

        assert_eq!(player.audio.total_minutes(), 2);
        player.seek_next_minute();
        assert_eq!(player.audio.current_minute(), 1);
        assert_eq!(player.video.current_minute(), 1);

        // Wraps past the end
        player.seek_next_minute();
        assert_eq!(player.audio.current_minute(), 0);
        assert_eq!(player.video.current_minute(), 0);

        // Saturates at the start
        player.seek_previous_minute();
        assert_eq!(player.audio.current_minute(), 0);
    }
}

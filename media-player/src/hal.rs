//! Hardware abstraction traits
//!
//! The engine never touches timers, DMA or VRAM directly; the host supplies
//! these three capabilities and in return invokes the engine's callbacks
//! (`on_buffer_consumed`, `on_vblank`) when the corresponding tick fires.

/// PCM output path
///
/// The sink drains whichever buffer it was last handed, one sample per tick
/// of the configured rate. Completion of a buffer is reported back to the
/// engine by the host invoking `AudioEngine::on_buffer_consumed`.
pub trait SampleSink {
    /// Prepare the output path for a stream
    fn begin(&mut self, sample_rate: u32, channels: u8);

    /// Redirect the sink at a freshly activated buffer
    ///
    /// `right` is present exactly for stereo streams. The engine hands the
    /// buffer over in the same call that makes it active, so the sink's
    /// view of the flip can never run ahead of the data.
    fn submit(&mut self, left: &[i8], right: Option<&[i8]>);

    /// Stop draining
    fn stop(&mut self);
}

/// Frame output path: blits one 240x160 RGB555 frame
pub trait FrameSink {
    /// Present a frame of `gbm_codec::FRAME_PIXELS` pixels
    fn present(&mut self, frame: &[u16]);
}

/// Periodic callback control
///
/// One instance drives one callback: the audio engine configures its ticker
/// to fire once per buffer's worth of samples, the video driver its ticker
/// at the display refresh rate. Stopping the ticker is what makes seeks
/// quiescent - no callback runs between `stop` and the next `start`.
pub trait Ticker {
    /// Begin firing once every `divider` counts of a `rate_hz` counter
    fn start(&mut self, rate_hz: u32, divider: u32);

    /// Cease firing
    fn stop(&mut self);
}

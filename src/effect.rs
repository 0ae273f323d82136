//! # Host-Facing Effect Interface
//!
//! An audio pipeline drives an effect through a short, fixed lifecycle:
//!
//! ```text
//! capabilities() ─► set_properties() ─► set_format() ─► process_frame() ×N ─► close()
//!   (negotiate)       (optional)          (size state)     ▲        │
//!                                                          │        ▼
//!                                              discard_queued_frames()
//!                                              (seek / loop / restart)
//! ```
//!
//! The host owns the ordering. It only offers formats the effect
//! advertised, never overlaps calls on one instance, and calls
//! `process_frame` from its real-time audio callback. The effect itself
//! does no locking.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::properties::PropertySet;

/// A negotiated PCM stream format.
///
/// Samples are IEEE floats when `bits_per_sample` is 32 and signed
/// integers otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
}

impl AudioFormat {
    /// Single-channel, 32-bit float PCM at `sample_rate`.
    pub const fn mono_f32(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            bits_per_sample: 32,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}-bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}

/// What an effect tells the host before format negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The effect writes its output back into the input frame.
    pub supports_in_place_output: bool,

    /// The only formats the host may pass to
    /// [`AudioEffect::set_format`].
    pub supported_formats: &'static [AudioFormat],
}

impl Capabilities {
    pub fn supports(&self, format: &AudioFormat) -> bool {
        self.supported_formats.contains(format)
    }

    /// The advertised format running at `sample_rate`, if any.
    pub fn format_for_rate(&self, sample_rate: u32) -> Option<AudioFormat> {
        self.supported_formats
            .iter()
            .copied()
            .find(|format| format.sample_rate == sample_rate)
    }
}

/// Why the host is closing an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedReason {
    /// Playback finished normally.
    Done,
    /// The pipeline hit an error of its own.
    UnknownError,
    /// Format negotiation failed.
    UnsupportedFormat,
    /// The effect was removed from the pipeline while running.
    Unloaded,
}

/// The lifecycle every pipeline effect implements.
///
/// Only [`process_frame`](Self::process_frame) runs on the real-time
/// thread; it must not allocate, block, or fail. Everything else runs on
/// the control thread and is never concurrent with it.
pub trait AudioEffect: Send {
    /// The fixed capability report. Does not depend on effect state.
    fn capabilities(&self) -> Capabilities;

    /// Store the configuration the effect reads its parameters from.
    /// Replaces any previously stored set.
    fn set_properties(&mut self, properties: Arc<PropertySet>);

    /// Apply the negotiated format and size internal state for it.
    fn set_format(&mut self, format: AudioFormat) -> Result<()>;

    /// Process one frame of samples in place.
    fn process_frame(&mut self, frame: &mut [f32]);

    /// Forget any buffered audio, e.g. after a seek or loop.
    fn discard_queued_frames(&mut self);

    /// Release all resources. Terminal.
    fn close(&mut self, reason: ClosedReason);
}

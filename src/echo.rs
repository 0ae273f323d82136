//! # Echo Processor
//!
//! A mono echo: every input sample is blended with the sample that went
//! into the delay line `delay_samples` steps earlier, and a
//! feedback-scaled copy of that echo is pushed back in so repeats decay
//! geometrically.
//!
//! ```text
//! Input ──┬─────────────────────────────── × (1 - mix) ──┐
//!         │                                               │
//!         └──►(+)──► [ DelayLine: N samples ] ──┬─ × mix ─(+)──► Output
//!              ▲                                │
//!              └──────────── × feedback ◄───────┘
//! ```
//!
//! Per sample:
//!
//! ```text
//! echo = delay_line.dequeue()
//! out  = (1 - mix) * x + mix * echo
//! delay_line.enqueue(x + feedback * echo)
//! ```
//!
//! ## When parameters are read
//!
//! - `Delay` is read once, in [`set_format`](AudioEffect::set_format). The
//!   delay line length is frozen until the next `set_format`, even if the
//!   host changes `Delay` in the meantime.
//! - `Mix` and `Feedback` are read at the start of every frame, so a host
//!   that updates them between frames hears the change on the next one.

use std::sync::Arc;

use nih_plug::{nih_log, nih_warn};

use crate::dsp::delay_line::DelayLine;
use crate::effect::{AudioEffect, AudioFormat, Capabilities, ClosedReason};
use crate::error::{EchoError, Result};
use crate::properties::{self, PropertySet};

const SUPPORTED_FORMATS: &[AudioFormat] = &[
    AudioFormat::mono_f32(44_100),
    AudioFormat::mono_f32(48_000),
];

/// Longest delay the processor will size a delay line for. One minute at
/// 48 kHz is 2.88M samples, about 11 MB.
pub const MAX_DELAY_MS: f32 = 60_000.0;

/// What the echo advertises to the host: in-place processing of mono
/// float audio at 44.1 or 48 kHz.
pub const CAPABILITIES: Capabilities = Capabilities {
    supports_in_place_output: true,
    supported_formats: SUPPORTED_FORMATS,
};

/// Where the processor is in its lifecycle.
///
/// ```text
/// Created ─► Configured ─► Ready ─► Processing ⇄ Flushed ─► Closed
///    └───────────────────────┘ ▲          │
///                              └─ set_format ┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    /// Freshly constructed, no properties or format yet.
    Created,
    /// Properties supplied, waiting for a format.
    Configured,
    /// Format applied; delay line sized and silent.
    Ready,
    /// At least one frame processed since the last format set or flush.
    Processing,
    /// Delay line just reset to silence by a flush.
    Flushed,
    /// Terminal.
    Closed,
}

impl EffectState {
    /// States in which the delay line is sized and frames may arrive.
    pub fn accepts_frames(self) -> bool {
        matches!(
            self,
            EffectState::Ready | EffectState::Processing | EffectState::Flushed
        )
    }
}

/// The echo effect. See the [module docs](self) for the algorithm.
#[derive(Debug)]
pub struct EchoProcessor {
    /// Host configuration. `None` behaves like an empty set (all defaults).
    properties: Option<Arc<PropertySet>>,

    /// Set by the last successful [`set_format`](AudioEffect::set_format).
    format: Option<AudioFormat>,

    /// `round(delay_ms / 1000 * sample_rate)`, fixed at format-set time.
    delay_samples: usize,

    /// Holds exactly `delay_samples` samples once a format is set.
    delay_line: DelayLine,

    state: EffectState,
}

impl Default for EchoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoProcessor {
    pub fn new() -> Self {
        Self {
            properties: None,
            format: None,
            delay_samples: 0,
            delay_line: DelayLine::new(0),
            state: EffectState::Created,
        }
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn format(&self) -> Option<AudioFormat> {
        self.format
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    pub fn delay_line_len(&self) -> usize {
        self.delay_line.len()
    }

    /// How many samples the echo keeps ringing after the input goes
    /// silent, using the current feedback.
    ///
    /// Each repeat is `feedback` times quieter than the last, so after `n`
    /// repeats the level is `feedback^n`. Solving `feedback^n = 0.001`
    /// (-60 dB) gives `n = -3 / log10(feedback)`. With no feedback there
    /// is exactly one echo. Returns `None` when the loop never decays
    /// (`|feedback| >= 1`).
    pub fn tail_samples(&self) -> Option<u32> {
        let feedback = properties::feedback(self.properties.as_deref()).abs();
        let delay = self.delay_samples as f32;

        if feedback >= 1.0 || feedback.is_nan() {
            None
        } else if feedback > 0.001 {
            let repeats = -3.0 / feedback.log10();
            Some((repeats * delay) as u32)
        } else {
            Some(self.delay_samples as u32)
        }
    }

    /// `round(delay_ms / 1000 * sample_rate)`, with ties going to the even
    /// neighbour: 5 ms at 44.1 kHz is 220.5 samples and becomes 220.
    fn delay_samples_for(delay_ms: f32, sample_rate: u32) -> Result<usize> {
        let samples = (delay_ms / 1000.0 * sample_rate as f32).round_ties_even();
        // The negated comparison also rejects NaN.
        if !(samples >= 1.0) {
            return Err(EchoError::DelayTooShort {
                delay_ms,
                sample_rate,
            });
        }
        if delay_ms > MAX_DELAY_MS {
            return Err(EchoError::DelayTooLong {
                delay_ms,
                max_ms: MAX_DELAY_MS,
            });
        }
        Ok(samples as usize)
    }
}

impl AudioEffect for EchoProcessor {
    fn capabilities(&self) -> Capabilities {
        CAPABILITIES
    }

    fn set_properties(&mut self, properties: Arc<PropertySet>) {
        if self.state == EffectState::Closed {
            nih_warn!("Ignoring properties for a closed echo processor");
            return;
        }

        if properties.is_empty() {
            nih_log!("Echo properties replaced with an empty set, using defaults");
        } else {
            nih_log!("Echo properties replaced ({} keys)", properties.len());
        }
        self.properties = Some(properties);
        if self.state == EffectState::Created {
            self.state = EffectState::Configured;
        }
    }

    fn set_format(&mut self, format: AudioFormat) -> Result<()> {
        if self.state == EffectState::Closed {
            return Err(EchoError::Closed);
        }
        if !CAPABILITIES.supports(&format) {
            nih_warn!("Rejecting echo format {format}");
            return Err(EchoError::UnsupportedFormat(format));
        }

        let delay_ms = properties::delay_ms(self.properties.as_deref());
        let delay_samples = Self::delay_samples_for(delay_ms, format.sample_rate)?;

        self.format = Some(format);
        self.delay_samples = delay_samples;
        self.delay_line.resize(delay_samples);
        self.state = EffectState::Ready;

        nih_log!("Echo format set to {format}: {delay_ms} ms = {delay_samples} samples");
        Ok(())
    }

    fn process_frame(&mut self, frame: &mut [f32]) {
        debug_assert!(
            self.state.accepts_frames(),
            "process_frame called while {:?}",
            self.state
        );
        debug_assert!(
            !self.delay_line.is_empty(),
            "echo delay line is empty; set_format must run before process_frame"
        );
        // Release builds pass the frame through dry rather than read an
        // empty delay line.
        if self.delay_line.is_empty() {
            return;
        }

        let properties = self.properties.as_deref();
        let wet = properties::mix(properties);
        let dry = 1.0 - wet;
        let feedback = properties::feedback(properties);

        for sample in frame.iter_mut() {
            let input = *sample;
            let echo = self.delay_line.front();

            *sample = dry * input + wet * echo;
            self.delay_line.push(input + feedback * echo);
        }

        self.state = EffectState::Processing;
    }

    fn discard_queued_frames(&mut self) {
        // Hosts may flush from the audio thread: clear in place, no
        // allocation and no logging.
        if self.state == EffectState::Closed {
            return;
        }

        self.delay_line.clear();
        if self.state.accepts_frames() {
            self.state = EffectState::Flushed;
        }
    }

    fn close(&mut self, reason: ClosedReason) {
        if self.state == EffectState::Closed {
            return;
        }

        nih_log!("Closing echo processor ({reason:?})");
        self.delay_line.release();
        self.properties = None;
        self.state = EffectState::Closed;
    }
}

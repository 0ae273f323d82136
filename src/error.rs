//! Errors reported by the echo processor's control-thread operations.
//!
//! Nothing on the per-frame path returns an error. Only format setup can
//! fail, and it fails before any audio flows.

use thiserror::Error;

use crate::effect::AudioFormat;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EchoError {
    /// The host asked for a format outside the advertised capability list.
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(AudioFormat),

    /// The configured delay rounds to less than one sample, which would
    /// leave the delay line empty.
    #[error("delay of {delay_ms} ms is shorter than one sample at {sample_rate} Hz")]
    DelayTooShort { delay_ms: f32, sample_rate: u32 },

    /// The configured delay is infinite or longer than the processor
    /// will allocate a delay line for.
    #[error("delay of {delay_ms} ms exceeds the {max_ms} ms maximum")]
    DelayTooLong { delay_ms: f32, max_ms: f32 },

    /// The processor was already closed.
    #[error("echo processor is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, EchoError>;

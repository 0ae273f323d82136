//! # Plugin Parameters
//!
//! The knobs the DAW shows for the echo. Each one mirrors a key in the
//! processor's [`PropertySet`]:
//!
//! | parameter  | ID     | property key |
//! |------------|--------|--------------|
//! | Delay      | `delay`| `Delay`      |
//! | Feedback   | `fdbk` | `Feedback`   |
//! | Mix        | `mix`  | `Mix`        |
//!
//! Once published, never change the IDs or existing presets will break.
//!
//! ## No smoothing
//!
//! The echo reads `Mix` and `Feedback` once per frame, and `Delay` only
//! when the format is (re)applied. The plugin copies the plain parameter
//! values into the shared property set at the start of every host buffer,
//! so a knob move lands on the next buffer boundary.
//!
//! ## Ranges
//!
//! The processor itself never clamps. The ranges here are what keep the
//! host from feeding it something unstable: feedback stays below 1.0 so
//! the loop always decays, and the delay stays at least 1 ms so the delay
//! line is never empty.

use nih_plug::prelude::*;

use crate::properties::{
    PropertySet, DEFAULT_DELAY_MS, DEFAULT_FEEDBACK, DEFAULT_MIX, DELAY_KEY, FEEDBACK_KEY,
    MIX_KEY,
};

/// All user-facing parameters for the Loveless Echo plugin.
#[derive(Params)]
pub struct EchoParams {
    /// **Delay**: time between the dry signal and the first echo.
    ///
    /// Range: 1ms to 2000ms, skewed toward short delays.
    /// Default: 500ms. Takes effect the next time the host initializes
    /// the plugin.
    #[id = "delay"]
    pub delay: FloatParam,

    /// **Feedback**: how much of each echo is fed back in.
    ///
    /// 0% = a single echo, 95% = very long decaying repeats.
    #[id = "fdbk"]
    pub feedback: FloatParam,

    /// **Mix**: dry/wet balance. 0% = dry only, 100% = echo only.
    #[id = "mix"]
    pub mix: FloatParam,
}

impl Default for EchoParams {
    fn default() -> Self {
        Self {
            delay: FloatParam::new(
                "Delay",
                DEFAULT_DELAY_MS,
                FloatRange::Skewed {
                    min: 1.0,
                    max: 2000.0,
                    factor: FloatRange::skew_factor(-1.0),
                },
            )
            .with_unit(" ms")
            .with_step_size(0.1),

            feedback: FloatParam::new(
                "Feedback",
                DEFAULT_FEEDBACK,
                FloatRange::Linear {
                    min: 0.0,
                    max: 0.95,
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            mix: FloatParam::new("Mix", DEFAULT_MIX, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),
        }
    }
}

impl EchoParams {
    /// A property set holding every key the echo reads, seeded with the
    /// current parameter values.
    pub fn to_property_set(&self) -> PropertySet {
        PropertySet::new()
            .with(DELAY_KEY, self.delay.value())
            .with(FEEDBACK_KEY, self.feedback.value())
            .with(MIX_KEY, self.mix.value())
    }

    /// Copy the current values into `properties`. Atomic stores only, so
    /// this is safe to call from `process()`.
    pub fn sync(&self, properties: &PropertySet) {
        properties.set(DELAY_KEY, self.delay.value());
        properties.set(FEEDBACK_KEY, self.feedback.value());
        properties.set(MIX_KEY, self.mix.value());
    }
}

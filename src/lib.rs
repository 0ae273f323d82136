//! # Loveless Echo: A Mono Echo Plugin (AU/VST3/CLAP)
//!
//! A feedback echo built around [`EchoProcessor`], a host-driven effect
//! with a narrow lifecycle (configure, set format, process frames, flush,
//! close). The processor knows nothing about plugin formats: any audio
//! pipeline can drive it through the [`AudioEffect`] trait. This crate
//! also wraps it with [nih-plug](https://github.com/robbert-vdh/nih-plug)
//! so DAWs can load it as AUv2, VST3 or CLAP.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬──────────────────────────────────────── × (1 - mix) ───┐
//!         │                                                        │
//!         └──►(+)──► [ Delay line: round(delay_ms · rate / 1000) ] │
//!              ▲                       │                           │
//!              │                       ▼                           │
//!              └────── × feedback ── echo ──── × mix ────────────►(+)──► Output
//! ```

pub mod dsp;
pub mod echo;
pub mod effect;
pub mod error;
pub mod params;
pub mod properties;

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

pub use echo::{EchoProcessor, EffectState, CAPABILITIES};
pub use effect::{AudioEffect, AudioFormat, Capabilities, ClosedReason};
pub use error::EchoError;
pub use params::EchoParams;
pub use properties::PropertySet;

/// The plugin: nih-plug on the outside, [`EchoProcessor`] on the inside.
///
/// nih-plug's lifecycle maps directly onto the processor's:
///
/// | nih-plug       | processor                         |
/// |----------------|-----------------------------------|
/// | `initialize()` | `set_properties()` + `set_format()` |
/// | `reset()`      | `discard_queued_frames()`         |
/// | `process()`    | `process_frame()`                 |
/// | `deactivate()` | `close()`                         |
struct LovelessEcho {
    params: Arc<EchoParams>,

    /// Shared with the processor. The plugin writes parameter values into
    /// it; the processor reads them at frame boundaries.
    properties: Arc<PropertySet>,

    processor: EchoProcessor,
}

impl Default for LovelessEcho {
    fn default() -> Self {
        let params = Arc::new(EchoParams::default());
        let properties = Arc::new(params.to_property_set());

        Self {
            params,
            properties,
            // Replaced in initialize() once the sample rate is known.
            processor: EchoProcessor::new(),
        }
    }
}

impl Plugin for LovelessEcho {
    const NAME: &'static str = "Loveless Echo";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // The echo is strictly mono.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(1),
        main_output_channels: NonZeroU32::new(1),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read per buffer, so splitting buffers at automation
    // points would only add overhead.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is first loaded, or when the audio
    /// configuration changes (e.g., a new sample rate). This is where the
    /// delay line gets allocated.
    ///
    /// # Why allocate here instead of in `default()`?
    ///
    /// The delay line holds `round(delay_ms * sample_rate / 1000)`
    /// samples, and the sample rate is only known once the host calls
    /// `initialize()`. Allocating here also keeps `process()` free of
    /// allocations: at 500 ms and 48 kHz the line is 24000 samples (about
    /// 94 KB), which we never want to touch malloc for on the audio thread.
    ///
    /// # Why a fresh processor every time?
    ///
    /// `initialize()` can follow a `deactivate()`, which closes the old
    /// processor for good. Building a new one keeps the processor's
    /// lifecycle simple: properties, then format, then frames.
    ///
    /// # Return value
    ///
    /// Returns `false` for sample rates the echo doesn't advertise (only
    /// 44.1 and 48 kHz are supported), or when the delay can't be turned
    /// into a usable delay line. The host then won't use this
    /// configuration.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        // The host reports the rate as an f32. Round it so 44099.998
        // still matches the advertised 44100 Hz format.
        let sample_rate = buffer_config.sample_rate.round() as u32;
        let Some(format) = CAPABILITIES.format_for_rate(sample_rate) else {
            nih_error!("Loveless Echo only runs at 44100 or 48000 Hz, host asked for {sample_rate} Hz");
            return false;
        };

        // The processor reads Delay exactly once, inside set_format(), so
        // push the knob's current value into the property set first.
        // Later Delay changes wait for the next initialize().
        self.params.sync(&self.properties);

        // Both the plugin and the processor hold the same property set.
        // The plugin writes into it, the processor reads from it, and
        // neither ever locks: every value is an atomic.
        let mut processor = EchoProcessor::new();
        processor.set_properties(Arc::clone(&self.properties));
        match processor.set_format(format) {
            Ok(()) => {
                self.processor = processor;
                true
            }
            Err(err) => {
                nih_error!("Failed to initialize Loveless Echo: {err}");
                false
            }
        }
    }

    /// Called when playback stops, loops or seeks.
    ///
    /// Without this, pressing "play" after "stop" would replay whatever
    /// echoes were still in the delay line. The flush zero-fills the line
    /// in place and keeps its length, so it never allocates. That matters
    /// because hosts are allowed to call `reset()` from the audio thread.
    fn reset(&mut self) {
        self.processor.discard_queued_frames();
    }

    /// The audio callback. The host calls this repeatedly with small
    /// buffers (typically 64-1024 samples) and expects the output to be
    /// written back into the same buffer.
    ///
    /// # One buffer = one frame
    ///
    /// The processor reads `Mix` and `Feedback` once per frame. Each host
    /// buffer is treated as one frame, so knob moves are picked up at
    /// buffer boundaries. At 256 samples and 44.1 kHz that is every 5.8 ms,
    /// fast enough to feel immediate.
    ///
    /// # The echo, per sample
    ///
    /// 1. **Dequeue** the oldest sample from the delay line (the echo)
    /// 2. **Mix** `(1 - mix) * input + mix * echo` into the output slot
    /// 3. **Enqueue** `input + feedback * echo` so the echo repeats
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // Copy the knob values into the shared property set. These are
        // relaxed atomic stores, so they are safe on the audio thread and
        // can't trip `assert_process_allocs`.
        self.params.sync(&self.properties);

        // The layout is mono, so `as_slice()` holds exactly one channel.
        // The processor works in place on that slice.
        if let Some(channel) = buffer.as_slice().first_mut() {
            self.processor.process_frame(channel);
        }

        // Tell the host how long the effect tail is, so it keeps calling
        // process() after the input goes silent (e.g., when a region ends).
        // Without this the repeats would be cut off abruptly.
        //
        // Each repeat is `feedback` times the one before, so the tail lasts
        // until feedback^N drops to -60 dB: N = log(0.001) / log(feedback)
        // delay periods. With feedback at 1.0 or above the loop never
        // decays, and we ask the host to keep us alive indefinitely.
        match self.processor.tail_samples() {
            Some(samples) => ProcessStatus::Tail(samples),
            None => ProcessStatus::KeepAlive,
        }
    }

    /// Called when the host deactivates the plugin. Closing drops the
    /// delay line. The next `initialize()` builds a new processor.
    fn deactivate(&mut self) {
        self.processor.close(ClosedReason::Done);
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for LovelessEcho {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-echo-v1";
    const CLAP_DESCRIPTION: Option<&'static str> = Some("A mono feedback echo");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for LovelessEcho {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssEcho___v001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay, Vst3SubCategory::Mono];
}

nih_export_clap!(LovelessEcho);
nih_export_vst3!(LovelessEcho);

// AUv2 entry point for Logic Pro, wrapped from the CLAP export.
clap_wrapper::export_auv2!();

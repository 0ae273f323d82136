//! # Configuration Properties
//!
//! The host configures the echo through a small key-value map of `f32`
//! values. The map is built once on the control thread, then shared with
//! the processor behind an `Arc`. From that point its *keys* are fixed but
//! its *values* stay live: [`PropertySet::set`] stores through an atomic,
//! so a host can nudge `Mix` or `Feedback` between frames without a lock
//! and without allocating.
//!
//! | key        | unit | default |
//! |------------|------|---------|
//! | `Delay`    | ms   | 500.0   |
//! | `Feedback` | gain | 0.5     |
//! | `Mix`      | wet  | 0.5     |

use std::sync::atomic::{AtomicU32, Ordering};

pub const DELAY_KEY: &str = "Delay";
pub const FEEDBACK_KEY: &str = "Feedback";
pub const MIX_KEY: &str = "Mix";

pub const DEFAULT_DELAY_MS: f32 = 500.0;
pub const DEFAULT_FEEDBACK: f32 = 0.5;
pub const DEFAULT_MIX: f32 = 0.5;

/// A named `f32` value. The bits live in an `AtomicU32` because stable
/// Rust has no `AtomicF32`.
#[derive(Debug)]
struct Entry {
    key: Box<str>,
    bits: AtomicU32,
}

/// Key-value configuration shared between the host and an effect.
#[derive(Debug, Default)]
pub struct PropertySet {
    entries: Vec<Entry>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: f32) -> Self {
        self.insert(key, value);
        self
    }

    /// Add `key`, or overwrite it if already present.
    pub fn insert(&mut self, key: impl Into<String>, value: f32) {
        let key = key.into();
        if !self.set(&key, value) {
            self.entries.push(Entry {
                key: key.into_boxed_str(),
                bits: AtomicU32::new(value.to_bits()),
            });
        }
    }

    /// Exact-name lookup.
    #[inline]
    pub fn get(&self, key: &str) -> Option<f32> {
        self.entry(key)
            .map(|entry| f32::from_bits(entry.bits.load(Ordering::Relaxed)))
    }

    /// Update an existing key through a shared reference.
    ///
    /// Returns `false` (and changes nothing) when `key` is not present;
    /// new keys need [`insert`](Self::insert).
    pub fn set(&self, key: &str, value: f32) -> bool {
        match self.entry(key) {
            Some(entry) => {
                entry.bits.store(value.to_bits(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| &*entry.key == key)
    }
}

// Readers for the echo's keys. `None` means "no configuration supplied",
// which behaves the same as an empty set.

pub fn delay_ms(properties: Option<&PropertySet>) -> f32 {
    lookup(properties, DELAY_KEY, DEFAULT_DELAY_MS)
}

pub fn feedback(properties: Option<&PropertySet>) -> f32 {
    lookup(properties, FEEDBACK_KEY, DEFAULT_FEEDBACK)
}

pub fn mix(properties: Option<&PropertySet>) -> f32 {
    lookup(properties, MIX_KEY, DEFAULT_MIX)
}

#[inline]
fn lookup(properties: Option<&PropertySet>, key: &str, default: f32) -> f32 {
    properties
        .and_then(|properties| properties.get(key))
        .unwrap_or(default)
}

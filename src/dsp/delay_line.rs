//! # Delay Line (Fixed-Length FIFO Ring)
//!
//! The echo needs exactly one thing from its delay line: the sample that
//! was pushed `N` steps ago, where `N` never changes while audio flows.
//! That is a first-in, first-out queue whose length stays constant: every
//! step takes the oldest sample out and puts one new sample in.
//!
//! ## Why a ring instead of a `VecDeque`?
//!
//! A queue of constant length is the same thing as a ring buffer whose
//! read head and write head sit on the *same* slot. The slot under the
//! head holds the oldest sample (written `N` steps ago); we read it, then
//! overwrite it with the new sample, then move the head forward:
//!
//! ```text
//!   len = 4, head = 1
//!
//!   ┌─────┬─────┬─────┬─────┐
//!   │ x3  │ x0  │ x1  │ x2  │   read x0 (oldest), write x4 in its place
//!   └─────┴─────┴─────┴─────┘
//!           ▲ head
//! ```
//!
//! No index arithmetic beyond a single wrap, no reallocation, and the
//! length can never drift, which is the invariant the echo relies on.

/// A constant-length FIFO of `f32` samples.
///
/// The buffer is sized off the audio thread (see [`resize`](Self::resize))
/// and never reallocates while samples are being pushed through it.
#[derive(Debug, Default)]
pub struct DelayLine {
    /// Ring storage. Its length *is* the delay in samples.
    buffer: Vec<f32>,

    /// Slot holding the oldest sample; the next one to be read and then
    /// overwritten.
    head: usize,
}

impl DelayLine {
    /// Create a delay line holding `len` samples of silence.
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len],
            head: 0,
        }
    }

    /// Number of samples held. Constant between [`resize`](Self::resize)
    /// calls.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Peek at the oldest sample, the one [`push`](Self::push) will
    /// replace.
    ///
    /// # Panics
    ///
    /// Panics if the delay line is empty.
    #[inline]
    pub fn front(&self) -> f32 {
        self.buffer[self.head]
    }

    /// Dequeue the oldest sample and enqueue `sample` in one step.
    ///
    /// Returns the dequeued sample. The length is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the delay line is empty.
    #[inline]
    pub fn push(&mut self, sample: f32) -> f32 {
        let oldest = std::mem::replace(&mut self.buffer[self.head], sample);
        self.head += 1;
        if self.head == self.buffer.len() {
            self.head = 0;
        }
        oldest
    }

    /// Fill with silence, keeping the current length.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.head = 0;
    }

    /// Change the length to `len` and fill with silence.
    ///
    /// This may allocate, so it belongs on the control thread, never in
    /// the per-frame path.
    pub fn resize(&mut self, len: usize) {
        self.buffer.clear();
        self.buffer.resize(len, 0.0);
        self.head = 0;
    }

    /// Drop the storage entirely.
    pub fn release(&mut self) {
        self.buffer = Vec::new();
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A new delay line starts as `len` samples of silence.
    #[test]
    fn test_new_is_silent() {
        let mut dl = DelayLine::new(8);
        assert_eq!(dl.len(), 8);

        for _ in 0..8 {
            let out = dl.push(1.0);
            assert!(out.abs() < 1e-6, "Expected silence, got {out}");
        }
    }

    /// Samples come back out exactly `len` pushes later, in order.
    #[test]
    fn test_fifo_sequence() {
        let mut dl = DelayLine::new(3);

        // The first three pushes return the initial silence.
        for i in 1..=3 {
            assert_eq!(dl.push(i as f32), 0.0);
        }

        // From now on every push returns the value pushed 3 steps ago.
        assert_eq!(dl.push(4.0), 1.0);
        assert_eq!(dl.push(5.0), 2.0);
        assert_eq!(dl.push(6.0), 3.0);
        assert_eq!(dl.push(7.0), 4.0);
    }

    /// Pushing never changes the length, however long it runs.
    #[test]
    fn test_length_is_constant() {
        let mut dl = DelayLine::new(5);
        for i in 0..1000 {
            dl.push(i as f32);
            assert_eq!(dl.len(), 5);
        }
    }

    /// `front()` shows the sample the next push will return.
    #[test]
    fn test_front_matches_next_push() {
        let mut dl = DelayLine::new(2);
        dl.push(0.25);
        dl.push(0.5);

        assert_eq!(dl.front(), 0.25);
        assert_eq!(dl.push(0.0), 0.25);
        assert_eq!(dl.front(), 0.5);
    }

    /// Clearing zero-fills but keeps the length.
    #[test]
    fn test_clear() {
        let mut dl = DelayLine::new(4);
        for _ in 0..6 {
            dl.push(0.5);
        }

        dl.clear();

        assert_eq!(dl.len(), 4);
        for _ in 0..4 {
            let out = dl.push(0.0);
            assert!(out.abs() < 1e-6, "Expected 0.0 after clear, got {out}");
        }
    }

    /// Resizing discards old content and changes the length.
    #[test]
    fn test_resize() {
        let mut dl = DelayLine::new(4);
        for _ in 0..4 {
            dl.push(1.0);
        }

        dl.resize(6);

        assert_eq!(dl.len(), 6);
        for _ in 0..6 {
            assert_eq!(dl.push(0.0), 0.0);
        }
    }

    #[test]
    fn test_release() {
        let mut dl = DelayLine::new(16);
        dl.release();
        assert!(dl.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_push_on_empty_panics() {
        let mut dl = DelayLine::default();
        dl.push(1.0);
    }
}

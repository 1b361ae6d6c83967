//! Carry-over of decoded samples between reads
//!
//! A decoded frame rarely matches the number of samples a caller asks for.
//! What is left over waits here, in order, for the next read. The ring is
//! sized once for the largest frame of the stream and never reallocates.

use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::HeapRb;

/// Fixed-capacity FIFO of interleaved samples
pub struct CarryOver {
    ring: HeapRb<i16>,
}

impl CarryOver {
    /// Create a ring holding at most `capacity` samples
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: HeapRb::new(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity().get()
    }

    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Append samples; returns how many fit
    pub fn push(&mut self, samples: &[i16]) -> usize {
        self.ring.push_slice(samples)
    }

    /// Move the oldest samples into `dest`; returns how many were moved
    pub fn drain_into(&mut self, dest: &mut [i16]) -> usize {
        self.ring.pop_slice(dest)
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.ring.clear();
    }
}

impl std::fmt::Debug for CarryOver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarryOver")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

//! Grid-aligned resampling with last-value carry-forward.
//!
//! Input samples arrive on an irregular timeline; output samples sit on
//! multiples of `every` milliseconds (aligned to the epoch). A grid point
//! strictly between two input samples carries the most recently observed
//! value; a grid point that coincides with an input sample takes that
//! sample's own value.

use crate::timestamp::Instant;

pub struct Resampler {
    every: i64,
    last_grid: Instant,
    last_value: f64,
    first: bool,
}

impl Resampler {
    /// `every <= 0` disables resampling; samples pass through unchanged.
    /// A negative interval has no usable grid, so it is clamped to 0 rather
    /// than letting the candidate walk step backwards forever.
    pub fn new(every: i64) -> Self {
        Self { every: every.max(0), last_grid: 0, last_value: 0.0, first: true }
    }

    /// Consume one input sample, appending emitted samples to `out`.
    pub fn push(&mut self, t: Instant, value: f64, out: &mut Vec<(Instant, f64)>) {
        if self.every == 0 {
            out.push((t, value));
            return;
        }

        if self.first {
            if t.rem_euclid(self.every) == 0 {
                out.push((t, value));
            }
            self.first = false;
            self.last_grid = t;
            self.last_value = value;
            return;
        }

        let mut candidate = next_grid(self.last_grid, self.every);
        while candidate < t {
            out.push((candidate, self.last_value));
            self.last_grid = candidate;
            candidate += self.every;
        }
        if candidate == t {
            out.push((t, value));
            self.last_grid = t;
        }
        self.last_value = value;
    }
}

/// Smallest multiple of `every` strictly greater than `after`.
fn next_grid(after: Instant, every: i64) -> Instant {
    after.div_euclid(every) * every + every
}

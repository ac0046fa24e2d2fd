//! Change suppression: dead-band around zero plus a minimum-delta gate.

/// Suppresses samples whose value moved less than `min_delta` from the last
/// value that passed. Values inside `(-zero_dead_band, zero_dead_band)` are
/// snapped to exactly 0 before any comparison. The first sample of a stream
/// always passes.
pub struct ChangeFilter {
    zero_dead_band: f64,
    min_delta: f64,
    last_value: f64,
    first: bool,
}

impl ChangeFilter {
    pub fn new(zero_dead_band: f64, min_delta: f64) -> Self {
        Self { zero_dead_band, min_delta, last_value: 0.0, first: true }
    }

    /// Returns the (possibly snapped) value when it passes, `None` when it is
    /// suppressed. Suppressed samples do not move the reference value.
    pub fn accept(&mut self, value: f64) -> Option<f64> {
        let snapped = if value.abs() < self.zero_dead_band { 0.0 } else { value };
        if self.first {
            self.first = false;
            self.last_value = snapped;
            return Some(snapped);
        }
        if (snapped - self.last_value).abs() < self.min_delta {
            return None;
        }
        self.last_value = snapped;
        Some(snapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_always_passes() {
        let mut f = ChangeFilter::new(0.0, 100.0);
        assert_eq!(f.accept(1.0), Some(1.0));
        assert_eq!(f.accept(50.0), None);
    }

    #[test]
    fn min_delta_measured_from_last_passed() {
        let mut f = ChangeFilter::new(0.0, 0.5);
        assert_eq!(f.accept(1.0), Some(1.0));
        assert_eq!(f.accept(1.2), None); // 0.2 < 0.5
        assert_eq!(f.accept(1.8), Some(1.8)); // 0.8 from 1.0
        assert_eq!(f.accept(1.9), None); // 0.1 from 1.8
    }

    #[test]
    fn zero_min_delta_passes_everything() {
        let mut f = ChangeFilter::new(0.0, 0.0);
        assert_eq!(f.accept(1.0), Some(1.0));
        assert_eq!(f.accept(1.0), Some(1.0));
    }

    #[test]
    fn dead_band_snaps_to_zero() {
        let mut f = ChangeFilter::new(0.05, 0.0);
        assert_eq!(f.accept(0.03), Some(0.0));
        assert_eq!(f.accept(-0.02), Some(0.0));
        assert_eq!(f.accept(0.05), Some(0.05)); // boundary is exclusive
    }

    #[test]
    fn dead_band_feeds_the_delta_comparison() {
        // 0.04 snaps to 0, so the move from 1.0 is a full 1.0
        let mut f = ChangeFilter::new(0.05, 0.5);
        assert_eq!(f.accept(1.0), Some(1.0));
        assert_eq!(f.accept(0.04), Some(0.0));
        // and staying inside the band is no change at all
        assert_eq!(f.accept(0.01), None);
    }
}

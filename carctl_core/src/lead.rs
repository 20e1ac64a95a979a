//! Rough lead-vehicle speed from a quantized distance reading.

/// Blend weight applied to each fresh rate sample.
pub const LEAD_SPEED_BLEND: f32 = 0.3334;

/// Smoothed relative lead speed (m/s per cycle-normalized sample).
///
/// The radar distance repeats for several cycles between updates. A changed
/// reading yields a rate over the cycles since the last change; a repeated one
/// decays the estimate toward zero once it has been stale for longer than the
/// previous update interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadSpeedEstimator {
    prev_distance: f32,
    counter: f32,
    counter_prev: f32,
    speed: f32,
}

impl Default for LeadSpeedEstimator {
    fn default() -> Self {
        Self {
            prev_distance: 0.0,
            counter: 1.0,
            counter_prev: 1.0,
            speed: 0.0,
        }
    }
}

impl LeadSpeedEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one distance sample and return the updated estimate.
    pub fn update(&mut self, distance: f32) -> f32 {
        let distance = if distance.is_finite() {
            distance
        } else {
            self.prev_distance
        };
        if distance != self.prev_distance {
            self.counter_prev = self.counter;
            let rate = (distance - self.prev_distance) / self.counter_prev;
            self.speed += LEAD_SPEED_BLEND * (rate - self.speed);
            self.counter = 0.0;
        } else if self.counter >= self.counter_prev {
            self.speed = self.counter * self.speed / (self.counter + 1.0);
        }
        self.counter += 1.0;
        self.prev_distance = distance;
        self.speed
    }

    /// Record `distance` as the comparison baseline without counting a sample.
    pub fn rebase(&mut self, distance: f32) {
        if distance.is_finite() {
            self.prev_distance = distance;
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn prev_distance(&self) -> f32 {
        self.prev_distance
    }
}

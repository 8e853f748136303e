//! Fixed-timestep tick clock.
//!
//! Turns variable frame delta times into a whole number of simulation
//! ticks, carrying the remainder to the next frame. The leftover fraction
//! of a tick is exposed as [`TickClock::alpha`] for render interpolation.
//!
//! # Example
//!
//! ```ignore
//! use pointsbuilder::time::TickClock;
//!
//! let mut clock = TickClock::new(20.0);
//!
//! // In your frame loop:
//! for _ in 0..clock.advance(frame_delta) {
//!     simulation.tick();
//! }
//! let alpha = clock.alpha();
//! ```

/// Accumulator-based tick scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct TickClock {
    /// Ticks per second.
    ticks_per_second: f64,
    /// Most ticks released by a single [`TickClock::advance`] call.
    max_ticks_per_frame: u32,
    /// Unconsumed time in seconds, always below one tick after `advance`.
    accumulator: f64,
    /// Total ticks released.
    tick_count: u64,
    /// Whether time is paused.
    paused: bool,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f64,
}

impl TickClock {
    /// Create a clock running at `ticks_per_second`.
    ///
    /// Non-positive rates fall back to 20 ticks per second.
    pub fn new(ticks_per_second: f64) -> Self {
        let ticks_per_second = if ticks_per_second > 0.0 && ticks_per_second.is_finite() {
            ticks_per_second
        } else {
            20.0
        };
        Self {
            ticks_per_second,
            max_ticks_per_frame: 8,
            accumulator: 0.0,
            tick_count: 0,
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Bound the ticks released per frame, so a long stall does not trigger
    /// a burst of catch-up work.
    pub fn with_max_ticks_per_frame(mut self, max: u32) -> Self {
        self.max_ticks_per_frame = max.max(1);
        self
    }

    /// Add a frame's delta time and return how many ticks to run.
    ///
    /// Time beyond the per-frame bound is dropped.
    pub fn advance(&mut self, delta_seconds: f64) -> u32 {
        if self.paused || !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return 0;
        }
        let step = self.tick_duration();
        self.accumulator += delta_seconds * self.time_scale;

        let mut ticks = 0;
        while self.accumulator >= step && ticks < self.max_ticks_per_frame {
            self.accumulator -= step;
            ticks += 1;
        }
        if ticks == self.max_ticks_per_frame && self.accumulator >= step {
            log::debug!("tick clock fell behind, dropping {:.3}s", self.accumulator - self.accumulator % step);
            self.accumulator %= step;
        }
        self.tick_count += ticks as u64;
        ticks
    }

    /// Fraction of the next tick already accumulated, in `[0, 1)`.
    #[inline]
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.tick_duration()).clamp(0.0, 1.0)
    }

    /// Seconds per tick.
    #[inline]
    pub fn tick_duration(&self) -> f64 {
        1.0 / self.ticks_per_second
    }

    #[inline]
    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    /// Total ticks released since creation.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick_count
    }

    /// Simulated seconds, counted in whole ticks.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.tick_count as f64 * self.tick_duration()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_ticks_and_remainder() {
        let mut clock = TickClock::new(4.0);
        assert_eq!(clock.advance(0.625), 2);
        assert_eq!(clock.alpha(), 0.5);
        assert_eq!(clock.advance(0.125), 1);
        assert_eq!(clock.alpha(), 0.0);
        assert_eq!(clock.tick(), 3);
        assert_eq!(clock.elapsed(), 0.75);
    }

    #[test]
    fn test_small_frames_accumulate() {
        let mut clock = TickClock::new(10.0);
        let ticks: u32 = (0..10).map(|_| clock.advance(1.0 / 60.0)).sum();
        assert_eq!(ticks, 1);
    }

    #[test]
    fn test_bounded_ticks_per_frame() {
        let mut clock = TickClock::new(20.0).with_max_ticks_per_frame(4);
        assert_eq!(clock.advance(10.0), 4);
        assert!(clock.alpha() < 1.0);
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_pause() {
        let mut clock = TickClock::default();
        clock.pause();
        assert_eq!(clock.advance(1.0), 0);
        assert!(clock.is_paused());
        clock.resume();
        assert_eq!(clock.advance(0.1), 2);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        assert_eq!(TickClock::new(0.0).ticks_per_second(), 20.0);
        assert_eq!(TickClock::new(f64::NAN).ticks_per_second(), 20.0);
    }
}

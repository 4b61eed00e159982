use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// `1 - (1 - t)^4`: fast start, zero velocity at the end.
    #[default]
    EaseOutQuart,
}

impl Easing {
    /// Samples the curve at `t`, clamped to `[0, 1]`. NaN samples as 0.
    pub fn sample(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}

/// An eased interpolation from one rotation to another over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start: Instant,
    pub duration: Duration,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f64, to: f64, start: Instant, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// Elapsed share of the duration in `[0, 1]`. Instants before `start` count as 0; a zero
    /// duration is already complete.
    pub fn fraction(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.fraction(now) >= 1.0
    }

    pub fn sample(&self, now: Instant) -> f64 {
        self.value_at(self.fraction(now))
    }

    /// Value at a given fraction. The end of the tween lands exactly on `to`.
    pub fn value_at(&self, fraction: f64) -> f64 {
        if fraction >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.sample(fraction)
    }
}

//! L3 Molecular Layer: One-sided inset animation

use std::time::{Duration, Instant};

use super::easing::{EasingType, EasingTypeExt};
use super::timing::{is_complete, lerp, progress};

/// Direction of an inset change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsetPhase {
    /// Reserving room for the loading indicator
    Grow,
    /// Giving the room back
    Shrink,
}

/// Active animation of one inset side
#[derive(Debug, Clone)]
pub struct InsetAnimation {
    pub phase: InsetPhase,
    start: Instant,
    from: f64,
    to: f64,
    duration: Duration,
    easing: EasingType,
}

impl InsetAnimation {
    pub fn new(
        phase: InsetPhase,
        from: f64,
        to: f64,
        start: Instant,
        duration: Duration,
        easing: EasingType,
    ) -> Self {
        Self {
            phase,
            start,
            from,
            to,
            duration,
            easing,
        }
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        is_complete(self.start, self.duration, now)
    }

    /// Interpolated value at `now`; exactly the target once complete
    pub fn sample(&self, now: Instant) -> f64 {
        if self.is_complete(now) {
            return self.to;
        }
        let t = self.easing.apply(progress(self.start, self.duration, now));
        lerp(self.from, self.to, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_ends_exactly_on_target() {
        let start = Instant::now();
        let anim = InsetAnimation::new(
            InsetPhase::Grow,
            0.0,
            50.0,
            start,
            Duration::from_millis(200),
            EasingType::Cubic,
        );

        assert_eq!(anim.sample(start), 0.0);
        let mid = anim.sample(start + Duration::from_millis(100));
        assert!(mid > 25.0 && mid < 50.0, "cubic ease-out is ahead of linear: {}", mid);
        assert_eq!(anim.sample(start + Duration::from_millis(200)), 50.0);
        assert!(anim.is_complete(start + Duration::from_millis(250)));
    }

    #[test]
    fn test_shrink_runs_backwards() {
        let start = Instant::now();
        let anim = InsetAnimation::new(
            InsetPhase::Shrink,
            50.0,
            10.0,
            start,
            Duration::from_millis(100),
            EasingType::Linear,
        );
        assert!((anim.sample(start + Duration::from_millis(50)) - 30.0).abs() < 0.001);
        assert_eq!(anim.sample(start + Duration::from_millis(100)), 10.0);
    }
}

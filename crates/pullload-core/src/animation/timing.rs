//! L4 Atomic Layer: Time calculation utilities
//!
//! Every function takes `now` explicitly so callers drive the clock.

use std::time::{Duration, Instant};

/// Animation progress at `now`, clamped to [0.0, 1.0]
#[inline]
pub fn progress(start: Instant, duration: Duration, now: Instant) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

#[inline]
pub fn is_complete(start: Instant, duration: Duration, now: Instant) -> bool {
    now.saturating_duration_since(start) >= duration
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(50.0, 0.0, 1.0) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_zero_duration() {
        let start = Instant::now();
        assert!((progress(start, Duration::ZERO, start) - 1.0).abs() < 0.001);
        assert!(is_complete(start, Duration::ZERO, start));
    }

    #[test]
    fn test_progress_midway() {
        let start = Instant::now();
        let duration = Duration::from_millis(200);
        let now = start + Duration::from_millis(50);
        assert!((progress(start, duration, now) - 0.25).abs() < 0.001);
        assert!(!is_complete(start, duration, now));
        assert!(is_complete(start, duration, start + duration));
    }

    #[test]
    fn test_progress_before_start() {
        let now = Instant::now();
        let start = now + Duration::from_millis(10);
        assert_eq!(progress(start, Duration::from_millis(100), now), 0.0);
    }
}

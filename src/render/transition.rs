use std::time::Duration;

/// Animated x-domain change recorded by the last viewport update.
///
/// Hosts that animate sample `domain_at(elapsed)`; the chart itself already
/// holds the end domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub duration: Duration,
}

impl Transition {
    #[must_use]
    pub fn new(from: (f64, f64), to: (f64, f64), duration: Duration) -> Self {
        Self { from, to, duration }
    }

    /// Interpolated domain after `elapsed`, eased cubic in-out.
    #[must_use]
    pub fn domain_at(&self, elapsed: Duration) -> (f64, f64) {
        let t = self.progress(elapsed);
        let eased = ease_cubic_in_out(t);
        (
            lerp(self.from.0, self.to.0, eased),
            lerp(self.from.1, self.to.1, eased),
        )
    }

    /// Linear progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_from_and_to() {
        let transition = Transition::new((0.0, 10.0), (2.0, 4.0), Duration::from_millis(1000));
        assert_eq!(transition.domain_at(Duration::ZERO), (0.0, 10.0));
        assert_eq!(transition.domain_at(Duration::from_millis(1000)), (2.0, 4.0));
        assert_eq!(transition.domain_at(Duration::from_secs(5)), (2.0, 4.0));
    }

    #[test]
    fn midpoint_is_halfway_under_symmetric_easing() {
        let transition = Transition::new((0.0, 10.0), (10.0, 20.0), Duration::from_millis(500));
        let (start, end) = transition.domain_at(Duration::from_millis(250));
        assert!((start - 5.0).abs() < 1e-9);
        assert!((end - 15.0).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_is_immediately_complete() {
        let transition = Transition::new((0.0, 1.0), (1.0, 2.0), Duration::ZERO);
        assert!(transition.is_complete(Duration::ZERO));
        assert_eq!(transition.domain_at(Duration::ZERO), (1.0, 2.0));
    }
}

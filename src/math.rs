//! Scalar helpers shared by the track builder, renderer and kinematics.

use std::f64::consts::PI;

pub fn limit(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

pub fn accelerate(v: f64, accel: f64, dt: f64) -> f64 {
    v + accel * dt
}

pub fn interpolate(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * percent
}

pub fn ease_in(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * percent.powi(2)
}

pub fn ease_out(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * (1.0 - (1.0 - percent).powi(2))
}

pub fn ease_in_out(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * (-(percent * PI).cos() / 2.0 + 0.5)
}

/// `1 / e^(distance² · density)`; 1 at the camera, falling toward 0 with distance.
pub fn exponential_fog(distance: f64, density: f64) -> f64 {
    1.0 / (distance * distance * density).exp()
}

/// Adds `increment` to `start` and wraps the result into `[0, max)`.
/// A non-positive `max` leaves `start` untouched.
pub fn increase(start: f64, increment: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return start;
    }
    let result = (start + increment).rem_euclid(max);
    // rem_euclid can round up to `max` for tiny negative inputs
    if result >= max { 0.0 } else { result }
}

/// Shortest signed distance from `from` to `to` on a loop of length `max`.
pub fn wrapped_delta(from: f64, to: f64, max: f64) -> f64 {
    let delta = to - from;
    if max <= 0.0 {
        delta
    } else if delta > max / 2.0 {
        delta - max
    } else if delta < -max / 2.0 {
        delta + max
    } else {
        delta
    }
}

/// Fractional progress of `n` through its current `total`-sized slot.
pub fn percent_remaining(n: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    n.rem_euclid(total) / total
}

/// Symmetric interval overlap of two footprints centred on `x1` and `x2`.
/// `percent` shrinks (< 1) or widens (> 1) both footprints before testing.
pub fn overlap(x1: f64, w1: f64, x2: f64, w2: f64, percent: f64) -> bool {
    let half = percent / 2.0;
    let min1 = x1 - w1 * half;
    let max1 = x1 + w1 * half;
    let min2 = x2 - w2 * half;
    let max2 = x2 + w2 * half;
    !(max1 < min2 || min1 > max2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increase_wraps_both_ways() {
        assert_eq!(increase(90.0, 20.0, 100.0), 10.0);
        assert_eq!(increase(10.0, -20.0, 100.0), 90.0);
        assert_eq!(increase(10.0, 5.0, 0.0), 10.0);
    }

    #[test]
    fn wrapped_delta_crosses_the_seam() {
        assert_eq!(wrapped_delta(10.0, 30.0, 100.0), 20.0);
        assert_eq!(wrapped_delta(95.0, 5.0, 100.0), 10.0);
        assert_eq!(wrapped_delta(5.0, 95.0, 100.0), -10.0);
        assert_eq!(wrapped_delta(5.0, 95.0, 0.0), 90.0);
    }

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_in(0.0, 4.0, 0.0), 0.0);
        assert_eq!(ease_in(0.0, 4.0, 0.5), 1.0);
        assert!((ease_in_out(0.0, 10.0, 1.0) - 10.0).abs() < 1e-12);
        assert!((ease_in_out(0.0, 10.0, 0.5) - 5.0).abs() < 1e-12);
        assert_eq!(ease_out(0.0, 4.0, 1.0), 4.0);
    }

    #[test]
    fn fog_falls_off_with_distance() {
        assert_eq!(exponential_fog(0.0, 5.0), 1.0);
        assert!(exponential_fog(0.5, 5.0) < 1.0);
        assert!(exponential_fog(1.0, 5.0) < exponential_fog(0.5, 5.0));
    }

    #[test]
    fn overlap_tightness() {
        assert!(overlap(0.0, 1.0, 0.9, 1.0, 1.0));
        assert!(!overlap(0.0, 1.0, 1.1, 1.0, 1.0));
        // looser tolerance catches the near miss
        assert!(overlap(0.0, 1.0, 1.1, 1.0, 1.2));
    }

    #[test]
    fn percent_remaining_in_slot() {
        assert_eq!(percent_remaining(250.0, 200.0), 0.25);
        assert_eq!(percent_remaining(0.0, 200.0), 0.0);
    }
}

use std::time::Duration;

use rand::Rng;

/// Number of amplitude points in a synthesized waveform
pub const WAVEFORM_POINTS: usize = 100;

/// Amplitude bounds for synthesized points
pub const MIN_AMPLITUDE: f32 = 0.1;
pub const MAX_AMPLITUDE: f32 = 0.9;

/// Synthesize a decorative waveform for the seek bar.
///
/// The values are a fresh random draw on every load and have no relationship
/// to the decoded audio.
pub fn generate() -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..WAVEFORM_POINTS)
        .map(|_| rng.gen_range(MIN_AMPLITUDE..=MAX_AMPLITUDE))
        .collect()
}

/// Whether point `index` of `point_count` falls in the played portion.
///
/// A point is played iff its fractional index lies before the elapsed
/// fraction of the track.
pub fn is_played(index: usize, point_count: usize, elapsed: Duration, total: Duration) -> bool {
    if point_count == 0 || total.is_zero() {
        return false;
    }
    (index as f64 / point_count as f64) < (elapsed.as_secs_f64() / total.as_secs_f64())
}

/// Number of leading points currently rendered as played
pub fn played_point_count(point_count: usize, elapsed: Duration, total: Duration) -> usize {
    (0..point_count)
        .take_while(|&i| is_played(i, point_count, elapsed, total))
        .count()
}

/// Map a tap at horizontal offset `x` within a control of width `width` to a
/// seek position, clamped into `[0, total]`
pub fn seek_position(x: f32, width: f32, total: Duration) -> Duration {
    if width <= 0.0 {
        return Duration::ZERO;
    }
    let fraction = (x / width).clamp(0.0, 1.0);
    Duration::from_secs_f64(total.as_secs_f64() * fraction as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_has_fixed_point_count() {
        assert_eq!(generate().len(), WAVEFORM_POINTS);
    }

    #[test]
    fn test_waveform_values_stay_in_range() {
        for _ in 0..10 {
            for value in generate() {
                assert!((MIN_AMPLITUDE..=MAX_AMPLITUDE).contains(&value));
            }
        }
    }

    #[test]
    fn test_played_portion_tracks_elapsed_fraction() {
        let total = Duration::from_secs(100);

        assert_eq!(played_point_count(100, Duration::ZERO, total), 0);
        assert_eq!(played_point_count(100, Duration::from_secs(50), total), 50);
        assert_eq!(played_point_count(100, total, total), 100);
    }

    #[test]
    fn test_is_played_boundary_is_strict() {
        let total = Duration::from_secs(100);
        // Point 50 sits exactly at the elapsed fraction and is not yet played
        assert!(!is_played(50, 100, Duration::from_secs(50), total));
        assert!(is_played(49, 100, Duration::from_secs(50), total));
    }

    #[test]
    fn test_zero_duration_has_no_played_points() {
        assert!(!is_played(0, 100, Duration::from_secs(10), Duration::ZERO));
        assert_eq!(played_point_count(100, Duration::from_secs(10), Duration::ZERO), 0);
    }

    #[test]
    fn test_seek_position_mapping() {
        let total = Duration::from_secs(200);

        assert_eq!(seek_position(0.0, 320.0, total), Duration::ZERO);
        assert_eq!(seek_position(160.0, 320.0, total), Duration::from_secs(100));
        assert_eq!(seek_position(320.0, 320.0, total), total);
    }

    #[test]
    fn test_seek_position_clamps_outside_taps() {
        let total = Duration::from_secs(200);

        assert_eq!(seek_position(-15.0, 320.0, total), Duration::ZERO);
        assert_eq!(seek_position(500.0, 320.0, total), total);
        assert_eq!(seek_position(50.0, 0.0, total), Duration::ZERO);
    }
}

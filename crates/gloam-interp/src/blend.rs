//! Renderer-side helpers for drawing between two ticks.
//!
//! These take the [`BlendFactors`](crate::BlendFactors) position alpha and
//! turn it into concrete, still center-relative, coordinates.

use gloam_protocol::FrameMobile;

use crate::motion::MAX_SHIFT_PIXELS;

/// Where to draw a mobile at blend position `alpha`.
///
/// Lerps from the previous position when there is one and the mobile moved
/// at most 64 pixels. Longer moves are teleports and snap straight to the
/// current position.
pub fn mobile_position(cur: &FrameMobile, prev: Option<&FrameMobile>, alpha: f64) -> (f64, f64) {
    mobile_position_within(cur, prev, alpha, MAX_SHIFT_PIXELS)
}

/// [`mobile_position`] with an explicit teleport threshold.
pub fn mobile_position_within(
    cur: &FrameMobile,
    prev: Option<&FrameMobile>,
    alpha: f64,
    max_pixels: i32,
) -> (f64, f64) {
    let (h, v) = (f64::from(cur.h), f64::from(cur.v));
    let Some(p) = prev else {
        return (h, v);
    };
    let dh = i64::from(cur.h) - i64::from(p.h);
    let dv = i64::from(cur.v) - i64::from(p.v);
    if dh * dh + dv * dv > i64::from(max_pixels).pow(2) {
        return (h, v);
    }
    let (ph, pv) = (f64::from(p.h), f64::from(p.v));
    (ph * (1.0 - alpha) + h * alpha, pv * (1.0 - alpha) + v * alpha)
}

/// Offset to add to every picture so scenery scrolls instead of jumping.
///
/// At `alpha = 0` pictures appear where they were last tick; at `alpha = 1`
/// they are at their new positions.
pub fn picture_offset(shift: (i32, i32), alpha: f64) -> (f64, f64) {
    let k = 1.0 - alpha;
    (-f64::from(shift.0) * k, -f64::from(shift.1) * k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mobile(h: i16, v: i16) -> FrameMobile {
        FrameMobile {
            index: 1,
            pose: 0,
            h,
            v,
            color: 0,
        }
    }

    #[test]
    fn test_lerp_halfway() {
        let (h, v) = mobile_position(&mobile(10, 20), Some(&mobile(0, 0)), 0.5);
        assert_eq!((h, v), (5.0, 10.0));
    }

    #[test]
    fn test_no_previous_uses_current() {
        assert_eq!(mobile_position(&mobile(3, 4), None, 0.0), (3.0, 4.0));
    }

    #[test]
    fn test_teleport_snaps() {
        let (h, _) = mobile_position(&mobile(100, 0), Some(&mobile(0, 0)), 0.1);
        assert_eq!(h, 100.0);
        // Exactly 64 still lerps.
        let (h, _) = mobile_position(&mobile(64, 0), Some(&mobile(0, 0)), 0.5);
        assert_eq!(h, 32.0);
    }

    #[test]
    fn test_full_range_jump_snaps() {
        let prev = mobile(i16::MIN, i16::MIN);
        let cur = mobile(i16::MAX, i16::MAX);
        assert_eq!(mobile_position(&cur, Some(&prev), 0.5), (32767.0, 32767.0));
        let (h, _) = mobile_position_within(&cur, Some(&prev), 0.0, i32::MAX);
        assert_eq!(h, -32768.0);
    }

    #[test]
    fn test_picture_offset() {
        assert_eq!(picture_offset((-4, 2), 0.0), (4.0, -2.0));
        assert_eq!(picture_offset((-4, 2), 0.5), (2.0, -1.0));
        let (x, y) = picture_offset((-4, 2), 1.0);
        assert_eq!((x.abs(), y.abs()), (0.0, 0.0));
    }
}

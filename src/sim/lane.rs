//! Lane and depth projection
//!
//! Maps discrete lane indices and normalized depth onto screen space.
//! The play field is a trapezoid: a narrow centered "far" line where
//! bread spawns and a full-width "near" line where collision happens.
//! All functions are pure and total; a degenerate viewport clamps
//! instead of dividing by zero.

use serde::{Deserialize, Serialize};

use crate::{Tuning, lerp};

/// Screen dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn degenerate(&self) -> bool {
        !(self.width > 0.0) || !(self.height > 0.0)
    }
}

/// Center of a lane as a normalized horizontal coordinate in [0, 1].
#[inline]
pub fn lane_to_u(lane: u32, num_lanes: u32) -> f32 {
    (lane as f32 + 0.5) / num_lanes as f32
}

/// Screen X for a normalized coordinate at a given depth.
///
/// The far line spans `far_span_frac` of the width, centered; the near
/// line spans the full width. Linear in z, which reads as perspective
/// narrowing toward the horizon.
pub fn u_to_screen_x(u: f32, z: f32, viewport: Viewport, tuning: &Tuning) -> f32 {
    if viewport.degenerate() {
        return 0.0;
    }
    let far_width = viewport.width * tuning.far_span_frac;
    let far_left = (viewport.width - far_width) / 2.0;
    let x_far = far_left + far_width * u;
    let x_near = u * viewport.width;
    lerp(x_far, x_near, z)
}

/// Screen Y for a given depth: far line fraction at z=0, collision line
/// fraction at z=1.
pub fn z_to_screen_y(z: f32, viewport: Viewport, tuning: &Tuning) -> f32 {
    if viewport.degenerate() {
        return 0.0;
    }
    let far_y = viewport.height * tuning.far_y_frac;
    let near_y = viewport.height * tuning.near_y_frac;
    lerp(far_y, near_y, z)
}

/// Sprite scale at a given depth. Power-law growth so near objects grow
/// disproportionately faster.
pub fn scale_at(z: f32, tuning: &Tuning) -> f32 {
    let t = z.powf(tuning.scale_power);
    lerp(tuning.scale_far, tuning.scale_near, t)
}

/// Lane index under a screen X at the collision line, clamped to the
/// valid range. The inverse of `lane_to_u` composed with the near-line
/// projection.
pub fn screen_x_to_lane(x: f32, viewport: Viewport, num_lanes: u32) -> u32 {
    if viewport.degenerate() || num_lanes == 0 {
        return 0;
    }
    let lane = ((x / viewport.width) * num_lanes as f32).floor();
    (lane.max(0.0) as u32).min(num_lanes - 1)
}

/// Whether a screen X lies inside an unspawnable edge margin. The
/// player may stand here; only spawning (and the edge auto-collect
/// option) care.
pub fn in_margin_zone(x: f32, viewport: Viewport, tuning: &Tuning) -> bool {
    if viewport.degenerate() {
        return false;
    }
    let lane_width = viewport.width / tuning.num_lanes as f32;
    let margin_x = lane_width * tuning.margin_lanes as f32;
    x < margin_x || x > viewport.width - margin_x
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport {
        width: 450.0,
        height: 800.0,
    };

    #[test]
    fn test_lane_centers_span_unit_interval() {
        let t = Tuning::default();
        let first = lane_to_u(0, t.num_lanes);
        let last = lane_to_u(t.num_lanes - 1, t.num_lanes);
        assert!(first > 0.0 && first < 1.0 / t.num_lanes as f32);
        assert!(last < 1.0 && last > 1.0 - 1.0 / t.num_lanes as f32);
    }

    #[test]
    fn test_projection_narrows_at_horizon() {
        let t = Tuning::default();
        // Leftmost lane: far X is pulled toward center, near X is not
        let u = lane_to_u(0, t.num_lanes);
        let x_far = u_to_screen_x(u, 0.0, VIEW, &t);
        let x_near = u_to_screen_x(u, 1.0, VIEW, &t);
        assert!(x_far > x_near);
        // Center stays centered at every depth
        let center_far = u_to_screen_x(0.5, 0.0, VIEW, &t);
        let center_near = u_to_screen_x(0.5, 1.0, VIEW, &t);
        assert!((center_far - VIEW.width / 2.0).abs() < 1e-3);
        assert!((center_near - VIEW.width / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_screen_y_hits_collision_line() {
        let t = Tuning::default();
        let y = z_to_screen_y(1.0, VIEW, &t);
        assert!((y - VIEW.height * t.near_y_frac).abs() < 1e-3);
        assert!(z_to_screen_y(0.0, VIEW, &t) < y);
    }

    #[test]
    fn test_scale_grows_faster_near() {
        let t = Tuning::default();
        assert!((scale_at(0.0, &t) - t.scale_far).abs() < 1e-6);
        assert!((scale_at(1.0, &t) - t.scale_near).abs() < 1e-6);
        // Power-law: second half grows more than the first
        let mid = scale_at(0.5, &t);
        assert!(t.scale_near - mid > mid - t.scale_far);
    }

    #[test]
    fn test_lane_roundtrip_at_collision_line() {
        let t = Tuning::default();
        for lane in 0..t.num_lanes {
            let u = lane_to_u(lane, t.num_lanes);
            let x = u_to_screen_x(u, 1.0, VIEW, &t);
            assert_eq!(screen_x_to_lane(x, VIEW, t.num_lanes), lane);
        }
    }

    #[test]
    fn test_screen_x_to_lane_clamps() {
        let t = Tuning::default();
        assert_eq!(screen_x_to_lane(-50.0, VIEW, t.num_lanes), 0);
        assert_eq!(
            screen_x_to_lane(VIEW.width + 50.0, VIEW, t.num_lanes),
            t.num_lanes - 1
        );
    }

    #[test]
    fn test_degenerate_viewport_is_noop() {
        let t = Tuning::default();
        let zero = Viewport::new(0.0, 0.0);
        assert_eq!(u_to_screen_x(0.5, 0.5, zero, &t), 0.0);
        assert_eq!(z_to_screen_y(0.5, zero, &t), 0.0);
        assert_eq!(screen_x_to_lane(100.0, zero, t.num_lanes), 0);
        assert!(!in_margin_zone(0.0, zero, &t));
    }

    #[test]
    fn test_margin_zone_edges_only() {
        let t = Tuning::default();
        assert!(in_margin_zone(1.0, VIEW, &t));
        assert!(in_margin_zone(VIEW.width - 1.0, VIEW, &t));
        assert!(!in_margin_zone(VIEW.width / 2.0, VIEW, &t));
    }
}

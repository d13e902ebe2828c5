//! Falling bread entity
//!
//! Lifecycle: spawned at the far line (z=0), eased toward the collision
//! line (z=1), then either collected (gone immediately) or missed
//! (shakes in place for a moment before being purged). Collision is
//! reported upward exactly once; the entity never judges hit vs miss
//! itself.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::lane::{self, Viewport};
use crate::{Tuning, ease_in};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bread {
    pub id: u32,
    /// Lane index, fixed at spawn
    pub lane: u32,
    /// Normalized horizontal coordinate, derived from the lane
    pub u: f32,
    /// Depth progress in [0, 1]; never decreases
    pub z: f32,
    travel_time: f32,
    pub alive: bool,
    pub collected: bool,
    pub missed: bool,
    collision_checked: bool,
    pub anim_frame: u32,
    anim_time: f32,
    shake_time: f32,
    #[serde(skip)]
    pub shake_offset: Vec2,
}

impl Bread {
    pub fn new(id: u32, lane: u32, tuning: &Tuning) -> Self {
        Self {
            id,
            lane,
            u: lane::lane_to_u(lane, tuning.num_lanes),
            z: 0.0,
            travel_time: 0.0,
            alive: true,
            collected: false,
            missed: false,
            collision_checked: false,
            anim_frame: 0,
            anim_time: 0.0,
            shake_time: 0.0,
            shake_offset: Vec2::ZERO,
        }
    }

    /// Advance one tick. Returns `true` exactly once, on the tick the
    /// bread first reaches the collision depth.
    pub fn update(
        &mut self,
        dt: f32,
        travel_duration: f32,
        anim_speed_mult: f32,
        tuning: &Tuning,
        rng: &mut Pcg32,
    ) -> bool {
        if !self.alive {
            return false;
        }

        self.travel_time += dt;
        let raw = (self.travel_time / travel_duration).min(1.0);
        self.z = ease_in(raw, tuning.z_ease_power);

        let fps = if self.missed {
            tuning.bread_miss_anim_fps
        } else {
            tuning.bread_anim_fps
        } * anim_speed_mult;
        self.anim_time += dt;
        let frame_time = 1.0 / fps;
        while self.anim_time >= frame_time {
            self.anim_time -= frame_time;
            self.anim_frame = (self.anim_frame + 1) % tuning.bread_frames;
        }

        if self.missed {
            self.shake_time += dt;
            if self.shake_time < tuning.shake_secs {
                // Jitter decays linearly to zero over the shake window
                let intensity =
                    tuning.shake_intensity * (1.0 - self.shake_time / tuning.shake_secs);
                self.shake_offset = Vec2::new(
                    (rng.random::<f32>() - 0.5) * 2.0 * intensity,
                    (rng.random::<f32>() - 0.5) * 2.0 * intensity,
                );
            } else {
                self.alive = false;
            }
        }

        if self.z >= tuning.collision_z
            && !self.collected
            && !self.missed
            && !self.collision_checked
        {
            self.collision_checked = true;
            return true;
        }

        false
    }

    /// Caught by the player. Terminal; purged on the same tick.
    pub fn collect(&mut self) {
        self.collected = true;
        self.alive = false;
    }

    /// Dropped. Enters the timed shake sub-state.
    pub fn miss(&mut self) {
        self.missed = true;
        self.shake_time = 0.0;
    }

    /// Screen position including shake jitter.
    pub fn screen_position(&self, viewport: Viewport, tuning: &Tuning) -> Vec2 {
        let x = lane::u_to_screen_x(self.u, self.z, viewport, tuning) + self.shake_offset.x;
        let y = lane::z_to_screen_y(self.z, viewport, tuning) + self.shake_offset.y;
        Vec2::new(x, y)
    }

    pub fn scale(&self, tuning: &Tuning) -> f32 {
        lane::scale_at(self.z, tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_z_bounded_and_monotone() {
        let t = Tuning::default();
        let mut rng = rng();
        let mut bread = Bread::new(1, 5, &t);
        let mut prev_z = bread.z;
        for _ in 0..600 {
            bread.update(1.0 / 60.0, 2.0, 1.0, &t, &mut rng);
            assert!(bread.z >= prev_z, "z decreased");
            assert!((0.0..=1.0).contains(&bread.z));
            prev_z = bread.z;
        }
    }

    #[test]
    fn test_collision_reported_exactly_once() {
        let t = Tuning::default();
        let mut rng = rng();
        let mut bread = Bread::new(1, 5, &t);
        let mut reports = 0;
        for _ in 0..300 {
            if bread.update(1.0 / 30.0, 1.0, 1.0, &t, &mut rng) {
                reports += 1;
            }
        }
        assert_eq!(reports, 1);
        // Still alive and still not re-reported after the edge trigger
        assert!(bread.alive);
    }

    #[test]
    fn test_collect_is_terminal() {
        let t = Tuning::default();
        let mut rng = rng();
        let mut bread = Bread::new(1, 3, &t);
        bread.collect();
        assert!(!bread.alive);
        assert!(!bread.update(0.016, 1.0, 1.0, &t, &mut rng));
    }

    #[test]
    fn test_miss_shakes_then_dies() {
        let t = Tuning::default();
        let mut rng = rng();
        let mut bread = Bread::new(1, 3, &t);
        // Drive to the collision line first
        for _ in 0..200 {
            bread.update(1.0 / 60.0, 1.0, 1.0, &t, &mut rng);
        }
        bread.miss();
        bread.update(0.01, 1.0, 1.0, &t, &mut rng);
        assert!(bread.alive);
        assert!(bread.shake_offset.length() > 0.0 || t.shake_intensity == 0.0);
        // No second collision report while shaking
        let mut secs = 0.0;
        while bread.alive {
            assert!(!bread.update(0.02, 1.0, 1.0, &t, &mut rng));
            secs += 0.02;
            assert!(secs < 2.0, "shake never ended");
        }
    }

    #[test]
    fn test_shake_decays() {
        let t = Tuning::default();
        let mut rng = rng();
        let mut bread = Bread::new(1, 3, &t);
        bread.miss();
        bread.update(0.02, 10.0, 1.0, &t, &mut rng);
        let early = bread.shake_offset.length();
        bread.update(t.shake_secs * 0.9 - 0.02, 10.0, 1.0, &t, &mut rng);
        let late = bread.shake_offset.length();
        // Bounds shrink linearly; late jitter fits within the late bound
        assert!(late <= t.shake_intensity * 0.1 * 2.0_f32.sqrt() + 1e-3);
        assert!(early <= t.shake_intensity * 2.0_f32.sqrt());
    }
}

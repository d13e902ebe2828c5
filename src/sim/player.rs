//! Runner state and animation
//!
//! The player follows the input's target position with exponential
//! smoothing and runs a small animation machine: running, a looped
//! damage flinch with a recovery, and a terminal defeat pose.

use serde::{Deserialize, Serialize};

use super::lane::{self, Viewport};
use crate::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAnim {
    Run,
    DamageHold,
    DamageRecover,
    Defeat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Current screen X
    pub x: f32,
    /// Where the input wants the player to be
    pub target_x: f32,
    pub anim: PlayerAnim,
    pub frame: u32,
    anim_time: f32,
    damage_loops_done: u32,
}

impl Player {
    pub fn new(screen_width: f32) -> Self {
        Self {
            x: screen_width / 2.0,
            target_x: screen_width / 2.0,
            anim: PlayerAnim::Run,
            frame: 0,
            anim_time: 0.0,
            damage_loops_done: 0,
        }
    }

    pub fn set_target(&mut self, x: f32) {
        self.target_x = x;
    }

    /// Lane under the player at the collision line.
    pub fn lane(&self, viewport: Viewport, num_lanes: u32) -> u32 {
        lane::screen_x_to_lane(self.x, viewport, num_lanes)
    }

    /// Whether the player stands in an unspawnable edge margin.
    pub fn in_margin(&self, viewport: Viewport, tuning: &Tuning) -> bool {
        lane::in_margin_zone(self.x, viewport, tuning)
    }

    pub fn update(&mut self, dt: f32, tuning: &Tuning) {
        self.x += (self.target_x - self.x) * tuning.player_smoothing;
        self.advance_animation(dt, tuning);
    }

    fn anim_params(&self, tuning: &Tuning) -> (f32, u32) {
        match self.anim {
            PlayerAnim::Run => (tuning.run_fps, tuning.run_frames),
            PlayerAnim::DamageHold => (tuning.damage_hold_fps, tuning.damage_hold_frames),
            PlayerAnim::DamageRecover => {
                (tuning.damage_recover_fps, tuning.damage_recover_frames)
            }
            PlayerAnim::Defeat => (tuning.defeat_fps, tuning.defeat_frames),
        }
    }

    fn advance_animation(&mut self, dt: f32, tuning: &Tuning) {
        let (fps, total) = self.anim_params(tuning);
        if fps <= 0.0 || total == 0 {
            return;
        }
        self.anim_time += dt;
        let frame_time = 1.0 / fps;
        while self.anim_time >= frame_time {
            self.anim_time -= frame_time;
            self.frame += 1;
            if self.frame < total {
                continue;
            }
            match self.anim {
                PlayerAnim::Run => self.frame = 0,
                PlayerAnim::DamageHold => {
                    self.damage_loops_done += 1;
                    if self.damage_loops_done >= tuning.damage_hold_loops {
                        self.transition(PlayerAnim::DamageRecover);
                        return;
                    }
                    self.frame = 0;
                }
                PlayerAnim::DamageRecover => {
                    self.transition(PlayerAnim::Run);
                    return;
                }
                // Hold the last defeat frame
                PlayerAnim::Defeat => self.frame = total - 1,
            }
        }
    }

    fn transition(&mut self, anim: PlayerAnim) {
        self.anim = anim;
        self.frame = 0;
        self.anim_time = 0.0;
        self.damage_loops_done = 0;
    }

    /// Flinch on a miss. Re-arms the loop counter if already flinching;
    /// ignored once defeated.
    pub fn trigger_damage(&mut self) {
        match self.anim {
            PlayerAnim::Defeat => {}
            PlayerAnim::DamageHold => self.damage_loops_done = 0,
            _ => self.transition(PlayerAnim::DamageHold),
        }
    }

    /// Terminal defeat pose for game over.
    pub fn trigger_defeat(&mut self) {
        self.transition(PlayerAnim::Defeat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_converges() {
        let t = Tuning::default();
        let mut player = Player::new(450.0);
        player.set_target(400.0);
        for _ in 0..200 {
            player.update(1.0 / 60.0, &t);
        }
        assert!((player.x - 400.0).abs() < 1.0);
    }

    #[test]
    fn test_damage_cycle_returns_to_run() {
        let t = Tuning::default();
        let mut player = Player::new(450.0);
        player.trigger_damage();
        assert_eq!(player.anim, PlayerAnim::DamageHold);
        // Hold loops + recover at 14 fps, 8 frames, 2 loops: under 3 seconds
        for _ in 0..300 {
            player.update(1.0 / 60.0, &t);
        }
        assert_eq!(player.anim, PlayerAnim::Run);
    }

    #[test]
    fn test_damage_rearm_extends_hold() {
        let t = Tuning::default();
        let mut player = Player::new(450.0);
        player.trigger_damage();
        // Run most of one loop, then re-trigger
        for _ in 0..30 {
            player.update(1.0 / 60.0, &t);
        }
        player.trigger_damage();
        assert_eq!(player.anim, PlayerAnim::DamageHold);
    }

    #[test]
    fn test_defeat_is_terminal_and_holds_last_frame() {
        let t = Tuning::default();
        let mut player = Player::new(450.0);
        player.trigger_defeat();
        player.trigger_damage();
        assert_eq!(player.anim, PlayerAnim::Defeat);
        for _ in 0..600 {
            player.update(1.0 / 60.0, &t);
        }
        assert_eq!(player.anim, PlayerAnim::Defeat);
        assert_eq!(player.frame, t.defeat_frames - 1);
    }
}

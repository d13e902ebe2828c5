//! Data-driven game balance
//!
//! Every gameplay constant lives here so a run can be re-balanced (or a
//! test can pin a scenario) without touching simulation code. Invariants
//! are checked once at startup; a bad table is a programming error, not
//! something the simulation recovers from mid-run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the score -> max lane distance table (High tier only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceStep {
    /// Score at which this limit starts applying
    pub score: u32,
    /// Maximum lane distance between consecutive spawns
    pub max_distance: u32,
}

/// Inclusive min/max pair for randomized lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

/// Tuning constant validation failures.
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("num_lanes must be at least 2 (got {0})")]
    TooFewLanes(u32),
    #[error("margin_lanes ({margin}) must be less than half of num_lanes ({lanes})")]
    MarginTooWide { margin: u32, lanes: u32 },
    #[error("tier interval thresholds must be strictly decreasing (mid {mid}, high {high})")]
    TierThresholdsNotDecreasing { mid: f32, high: f32 },
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    #[error("travel_secs_min ({min}) must not exceed travel_secs_start ({start})")]
    TravelRangeInverted { min: f32, start: f32 },
    #[error("spawn_interval_min ({min}) must not exceed spawn_interval_start ({start})")]
    SpawnRangeInverted { min: f32, start: f32 },
    #[error("distance table scores must be strictly ascending")]
    DistanceTableUnsorted,
    #[error("distance table limits must be non-increasing")]
    DistanceTableIncreasing,
    #[error("starting_health_frac must be in (0, 1] (got {0})")]
    BadStartingHealth(f32),
}

/// All gameplay balance constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    // === Lane field ===
    /// Number of discrete lanes across the screen
    pub num_lanes: u32,
    /// Lanes on each edge where bread never spawns
    pub margin_lanes: u32,

    // === Depth projection ===
    /// Width of the far (spawn) line as a fraction of screen width
    pub far_span_frac: f32,
    /// Far line Y as a fraction of screen height
    pub far_y_frac: f32,
    /// Near (collision) line Y as a fraction of screen height
    pub near_y_frac: f32,
    /// Sprite scale at z=0
    pub scale_far: f32,
    /// Sprite scale at z=1
    pub scale_near: f32,
    /// Power applied to z before scale interpolation
    pub scale_power: f32,
    /// Ease-in power for depth progress
    pub z_ease_power: f32,

    // === Collision ===
    /// Depth at which collision is evaluated
    pub collision_z: f32,
    /// Lane distance tolerance for a catch
    pub collision_margin: u32,
    /// Auto-collect edge breads while the player stands in a margin zone
    /// (behavior of an earlier game variant, kept as an option)
    pub edge_auto_collect: bool,
    /// How many edge lanes the auto-collect buffer covers
    pub edge_buffer_lanes: u32,

    // === Speed ramp ===
    /// Bread travel duration at game start (seconds)
    pub travel_secs_start: f32,
    /// Bread travel duration at full ramp
    pub travel_secs_min: f32,
    /// Seconds between spawns at game start
    pub spawn_interval_start: f32,
    /// Seconds between spawns at full ramp
    pub spawn_interval_min: f32,
    /// Seconds of play until the ramp saturates
    pub speed_ramp_secs: f32,
    /// Animation speed multiplier at game start
    pub anim_speed_start: f32,
    /// Animation speed multiplier at full ramp
    pub anim_speed_end: f32,

    // === Difficulty tiers (step function of spawn interval) ===
    /// Interval below which the generator leaves the Low tier
    pub tier_mid_interval: f32,
    /// Interval below which the generator enters the High tier
    pub tier_high_interval: f32,

    // === Health economy ===
    /// Health span of a single tier
    pub max_health: f32,
    /// Starting health as a fraction of max
    pub starting_health_frac: f32,
    /// Health gained per catch, indexed by tier (Low, Mid, High)
    pub hit_gain: [f32; 3],
    /// Health lost per miss, indexed by tier
    pub miss_loss: [f32; 3],

    // === Pattern generation ===
    pub low_pattern_len: Range,
    pub low_zigzag_step: u32,
    pub low_cluster_size: u32,
    pub low_burst_len: u32,
    pub mid_pattern_len: Range,
    pub mid_cluster_len: u32,
    pub mid_cluster_step: u32,
    pub high_pattern_len: Range,
    pub high_cluster_size: u32,
    pub wide_jump_size: u32,
    pub wide_jump_chance: f32,
    /// Max lane distance between consecutive High-tier spawns before the
    /// score table kicks in
    pub base_max_lane_distance: u32,
    /// Score thresholds shrinking the distance limit (ascending scores)
    pub distance_steps: Vec<DistanceStep>,

    // === Bread animation ===
    pub bread_frames: u32,
    pub bread_anim_fps: f32,
    pub bread_miss_anim_fps: f32,
    /// Shake duration after a miss (seconds)
    pub shake_secs: f32,
    /// Peak shake jitter in pixels
    pub shake_intensity: f32,

    // === Player ===
    /// Per-tick fraction of remaining distance covered toward the target
    pub player_smoothing: f32,
    pub run_frames: u32,
    pub run_fps: f32,
    pub damage_hold_frames: u32,
    pub damage_hold_fps: f32,
    pub damage_hold_loops: u32,
    pub damage_recover_frames: u32,
    pub damage_recover_fps: f32,
    pub defeat_frames: u32,
    pub defeat_fps: f32,

    // === Phase timing ===
    /// "Ready?" display time (seconds)
    pub ready_secs: f32,
    /// "GO!" display time
    pub go_secs: f32,
    /// Resume countdown length in whole seconds
    pub resume_countdown: u32,
    /// Delay before the game-over summary appears
    pub game_over_delay_secs: f32,

    // === Cosmetics ===
    pub particle_count: u32,
    pub particle_speed_min: f32,
    pub particle_speed_max: f32,
    pub particle_lifetime: f32,
    pub particle_size_min: f32,
    pub particle_size_max: f32,
    pub damage_flash_secs: f32,
    pub float_damage_rise: f32,
    pub float_damage_secs: f32,
    pub float_reward_rise: f32,
    pub float_reward_secs: f32,
    /// Hue rotation speed for rainbow text (degrees/second)
    pub rainbow_deg_per_sec: f32,
    /// Chance of a reward text per catch while in overdrive
    pub overdrive_text_chance: f32,
    pub speedline_base_speed: f32,
    pub speedline_spawn_spacing: f32,
    pub speedline_accel_power: f32,
    /// Speed line spawn Y as a fraction of screen height (from top)
    pub speedline_spawn_y_frac: f32,
    pub action_lines_count: u32,
    pub action_line_len_min: f32,
    pub action_line_len_max: f32,
    /// Action line rotation speed (degrees/second)
    pub action_lines_deg_per_sec: f32,
    /// Background crossfade on tier change (seconds)
    pub bg_crossfade_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            num_lanes: 14,
            margin_lanes: 2,

            far_span_frac: 0.35,
            far_y_frac: 0.0,
            near_y_frac: 0.82,
            scale_far: 0.4,
            scale_near: 1.6,
            scale_power: 1.8,
            z_ease_power: 2.2,

            collision_z: 1.0,
            collision_margin: 3,
            edge_auto_collect: false,
            edge_buffer_lanes: 3,

            travel_secs_start: 5.0,
            travel_secs_min: 0.8,
            spawn_interval_start: 1.2,
            spawn_interval_min: 0.2,
            speed_ramp_secs: 10.0,
            anim_speed_start: 1.0,
            anim_speed_end: 1.6,

            tier_mid_interval: 0.9,
            tier_high_interval: 0.5,

            max_health: 300.0,
            starting_health_frac: 0.5,
            hit_gain: [30.0, 20.0, 12.0],
            miss_loss: [60.0, 90.0, 120.0],

            low_pattern_len: Range { min: 8, max: 16 },
            low_zigzag_step: 2,
            low_cluster_size: 3,
            low_burst_len: 6,
            mid_pattern_len: Range { min: 10, max: 18 },
            mid_cluster_len: 4,
            mid_cluster_step: 2,
            high_pattern_len: Range { min: 12, max: 20 },
            high_cluster_size: 3,
            wide_jump_size: 5,
            wide_jump_chance: 0.35,
            base_max_lane_distance: 4,
            distance_steps: vec![
                DistanceStep { score: 40, max_distance: 3 },
                DistanceStep { score: 80, max_distance: 2 },
                DistanceStep { score: 120, max_distance: 1 },
            ],

            bread_frames: 13,
            bread_anim_fps: 14.0,
            bread_miss_anim_fps: 28.0,
            shake_secs: 0.25,
            shake_intensity: 8.0,

            player_smoothing: 0.15,
            run_frames: 8,
            run_fps: 12.0,
            damage_hold_frames: 8,
            damage_hold_fps: 14.0,
            damage_hold_loops: 2,
            damage_recover_frames: 8,
            damage_recover_fps: 14.0,
            defeat_frames: 11,
            defeat_fps: 10.0,

            ready_secs: 1.0,
            go_secs: 0.5,
            resume_countdown: 3,
            game_over_delay_secs: 2.5,

            particle_count: 12,
            particle_speed_min: 100.0,
            particle_speed_max: 250.0,
            particle_lifetime: 0.6,
            particle_size_min: 4.0,
            particle_size_max: 10.0,
            damage_flash_secs: 0.4,
            float_damage_rise: 80.0,
            float_damage_secs: 0.8,
            float_reward_rise: 100.0,
            float_reward_secs: 1.0,
            rainbow_deg_per_sec: 360.0,
            overdrive_text_chance: 0.25,
            speedline_base_speed: 800.0,
            speedline_spawn_spacing: 8.0,
            speedline_accel_power: 1.6,
            speedline_spawn_y_frac: 0.411,
            action_lines_count: 24,
            action_line_len_min: 0.08,
            action_line_len_max: 0.18,
            action_lines_deg_per_sec: 400.0,
            bg_crossfade_secs: 0.4,
        }
    }
}

impl Tuning {
    /// First spawnable lane index.
    pub fn min_spawn_lane(&self) -> u32 {
        self.margin_lanes
    }

    /// Last spawnable lane index (inclusive).
    pub fn max_spawn_lane(&self) -> u32 {
        self.num_lanes - self.margin_lanes - 1
    }

    /// Distance limit between consecutive High-tier spawns at a given
    /// score. Highest matching threshold wins; non-increasing by
    /// construction (validated).
    pub fn max_lane_distance(&self, score: u32) -> u32 {
        let mut limit = self.base_max_lane_distance;
        for step in self.distance_steps.iter().rev() {
            if score >= step.score {
                limit = step.max_distance;
                break;
            }
        }
        limit
    }

    /// Check startup invariants. Call once before constructing a session.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.num_lanes < 2 {
            return Err(TuningError::TooFewLanes(self.num_lanes));
        }
        if self.margin_lanes * 2 >= self.num_lanes {
            return Err(TuningError::MarginTooWide {
                margin: self.margin_lanes,
                lanes: self.num_lanes,
            });
        }
        if self.tier_high_interval >= self.tier_mid_interval {
            return Err(TuningError::TierThresholdsNotDecreasing {
                mid: self.tier_mid_interval,
                high: self.tier_high_interval,
            });
        }
        for (name, value) in [
            ("travel_secs_min", self.travel_secs_min),
            ("spawn_interval_min", self.spawn_interval_min),
            ("speed_ramp_secs", self.speed_ramp_secs),
            ("max_health", self.max_health),
            ("shake_secs", self.shake_secs),
            ("bread_anim_fps", self.bread_anim_fps),
            ("game_over_delay_secs", self.game_over_delay_secs),
        ] {
            if value <= 0.0 {
                return Err(TuningError::NonPositive { name, value });
            }
        }
        if self.travel_secs_min > self.travel_secs_start {
            return Err(TuningError::TravelRangeInverted {
                min: self.travel_secs_min,
                start: self.travel_secs_start,
            });
        }
        if self.spawn_interval_min > self.spawn_interval_start {
            return Err(TuningError::SpawnRangeInverted {
                min: self.spawn_interval_min,
                start: self.spawn_interval_start,
            });
        }
        if !self.distance_steps.windows(2).all(|w| w[0].score < w[1].score) {
            return Err(TuningError::DistanceTableUnsorted);
        }
        let mut prev = self.base_max_lane_distance;
        for step in &self.distance_steps {
            if step.max_distance > prev {
                return Err(TuningError::DistanceTableIncreasing);
            }
            prev = step.max_distance;
        }
        if self.starting_health_frac <= 0.0 || self.starting_health_frac > 1.0 {
            return Err(TuningError::BadStartingHealth(self.starting_health_frac));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        Tuning::default().validate().expect("default tuning is sound");
    }

    #[test]
    fn test_margin_too_wide_rejected() {
        let mut t = Tuning::default();
        t.margin_lanes = 7;
        assert!(matches!(
            t.validate(),
            Err(TuningError::MarginTooWide { .. })
        ));
    }

    #[test]
    fn test_thresholds_must_decrease() {
        let mut t = Tuning::default();
        t.tier_high_interval = t.tier_mid_interval;
        assert!(matches!(
            t.validate(),
            Err(TuningError::TierThresholdsNotDecreasing { .. })
        ));
    }

    #[test]
    fn test_distance_table_monotone() {
        let t = Tuning::default();
        let mut prev = t.max_lane_distance(0);
        for score in 0..300 {
            let limit = t.max_lane_distance(score);
            assert!(limit <= prev, "limit grew at score {score}");
            prev = limit;
        }
    }

    #[test]
    fn test_distance_table_highest_match() {
        let t = Tuning::default();
        assert_eq!(t.max_lane_distance(0), 4);
        assert_eq!(t.max_lane_distance(40), 3);
        assert_eq!(t.max_lane_distance(119), 2);
        assert_eq!(t.max_lane_distance(5000), 1);
    }

    #[test]
    fn test_increasing_distance_table_rejected() {
        let mut t = Tuning::default();
        t.distance_steps = vec![
            DistanceStep { score: 10, max_distance: 2 },
            DistanceStep { score: 20, max_distance: 3 },
        ];
        assert!(matches!(
            t.validate(),
            Err(TuningError::DistanceTableIncreasing)
        ));
    }

    #[test]
    fn test_spawnable_range() {
        let t = Tuning::default();
        assert_eq!(t.min_spawn_lane(), 2);
        assert_eq!(t.max_spawn_lane(), 11);
    }
}

//! Cosmetic systems: particles, floating text, speed lines, action
//! lines, damage flash, background crossfade.
//!
//! These are driven by state-machine events but make no gameplay
//! decisions, and they draw from their own RNG stream so visual flair
//! never perturbs the gameplay sequence.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::lane::Viewport;
use super::pattern::Tier;
use crate::{Tuning, ease_in, lerp};

/// Hard cap on live particles
pub const MAX_PARTICLES: usize = 256;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Index into the renderer's palette for the current tier
    pub color_index: u32,
    pub rainbow: bool,
    pub hue: f32,
    pub size: f32,
    base_size: f32,
    age: f32,
    lifetime: f32,
}

impl Particle {
    /// Remaining life in [0, 1], for alpha fade.
    pub fn life(&self) -> f32 {
        (1.0 - self.age / self.lifetime).max(0.0)
    }
}

/// What a floating text says; the renderer owns the actual word lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatKind {
    Damage,
    Reward,
}

#[derive(Debug, Clone)]
pub struct FloatingText {
    pub kind: FloatKind,
    /// Picks a word from the renderer's table for this kind
    pub word_index: u32,
    pub x: f32,
    pub y: f32,
    start_y: f32,
    pub hue: f32,
    age: f32,
    duration: f32,
    rise: f32,
}

impl FloatingText {
    /// Fade alpha, ease-in so the text lingers then vanishes.
    pub fn alpha(&self) -> f32 {
        1.0 - ease_in((self.age / self.duration).min(1.0), 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct SpeedLine {
    pub y: f32,
    start_y: f32,
}

impl SpeedLine {
    /// Progress from spawn line to screen bottom in [0, 1].
    pub fn progress(&self, screen_height: f32) -> f32 {
        let total = screen_height - self.start_y;
        if total <= 0.0 {
            return 1.0;
        }
        ((self.y - self.start_y) / total).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct ActionLine {
    pub angle: f32,
    /// Length as a fraction of screen height
    pub length: f32,
    pub hue: f32,
}

/// All cosmetic state for one session.
#[derive(Debug, Clone)]
pub struct Fx {
    rng: Pcg32,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub speed_lines: Vec<SpeedLine>,
    pub action_lines: Vec<ActionLine>,
    /// Global rotation applied on top of each action line's angle
    pub action_angle: f32,
    /// Damage flash progress; `None` when inactive
    damage_flash_age: Option<f32>,
    /// Background crossfade progress toward the current tier, in [0, 1]
    pub bg_fade: f32,
    pub bg_from: Tier,
    pub bg_to: Tier,
    /// Rainbow hue phase for overdrive visuals (degrees)
    pub rainbow_hue: f32,
}

impl Default for Fx {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Fx {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            particles: Vec::new(),
            texts: Vec::new(),
            speed_lines: Vec::new(),
            action_lines: Vec::new(),
            action_angle: 0.0,
            damage_flash_age: None,
            bg_fade: 1.0,
            bg_from: Tier::Mid,
            bg_to: Tier::Mid,
            rainbow_hue: 0.0,
        }
    }

    /// Reset to a fresh run.
    pub fn reset(&mut self, viewport: Viewport, tuning: &Tuning) {
        self.particles.clear();
        self.texts.clear();
        self.speed_lines.clear();
        self.action_angle = 0.0;
        self.damage_flash_age = None;
        self.bg_fade = 1.0;
        self.bg_from = Tier::Mid;
        self.bg_to = Tier::Mid;
        self.rainbow_hue = 0.0;
        self.speed_lines.push(SpeedLine {
            y: viewport.height * tuning.speedline_spawn_y_frac,
            start_y: viewport.height * tuning.speedline_spawn_y_frac,
        });
        self.action_lines.clear();
        for i in 0..tuning.action_lines_count {
            let frac = i as f32 / tuning.action_lines_count as f32;
            self.action_lines.push(ActionLine {
                angle: frac * std::f32::consts::TAU,
                length: self
                    .rng
                    .random_range(tuning.action_line_len_min..=tuning.action_line_len_max),
                hue: frac * 360.0,
            });
        }
    }

    /// Burst of reward particles at a catch position.
    pub fn spawn_burst(&mut self, pos: Vec2, rainbow: bool, tuning: &Tuning) {
        for _ in 0..tuning.particle_count {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self
                .rng
                .random_range(tuning.particle_speed_min..=tuning.particle_speed_max);
            let size = self
                .rng
                .random_range(tuning.particle_size_min..=tuning.particle_size_max);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color_index: self.rng.random_range(0..8),
                rainbow,
                hue: self.rng.random_range(0.0..360.0),
                size,
                base_size: size,
                age: 0.0,
                lifetime: tuning.particle_lifetime,
            });
        }
    }

    pub fn spawn_damage_text(&mut self, x: f32, y: f32, tuning: &Tuning) {
        self.texts.push(FloatingText {
            kind: FloatKind::Damage,
            word_index: self.rng.random_range(0..8),
            x,
            y,
            start_y: y,
            hue: 0.0,
            age: 0.0,
            duration: tuning.float_damage_secs,
            rise: tuning.float_damage_rise,
        });
    }

    pub fn spawn_reward_text(&mut self, x: f32, y: f32, tuning: &Tuning) {
        self.texts.push(FloatingText {
            kind: FloatKind::Reward,
            word_index: self.rng.random_range(0..8),
            x,
            y,
            start_y: y,
            hue: self.rng.random_range(0.0..360.0),
            age: 0.0,
            duration: tuning.float_reward_secs,
            rise: tuning.float_reward_rise,
        });
    }

    /// Roll the overdrive reward-text chance.
    pub fn roll_reward_text(&mut self, tuning: &Tuning) -> bool {
        self.rng.random::<f32>() < tuning.overdrive_text_chance
    }

    pub fn trigger_damage_flash(&mut self) {
        self.damage_flash_age = Some(0.0);
    }

    /// Damage flash opacity factor in [0, 1], zero when inactive.
    pub fn damage_flash_strength(&self, tuning: &Tuning) -> f32 {
        match self.damage_flash_age {
            Some(age) => (1.0 - age / tuning.damage_flash_secs).max(0.0),
            None => 0.0,
        }
    }

    /// Start a background crossfade toward the given tier.
    pub fn set_background_tier(&mut self, tier: Tier) {
        if tier == self.bg_to {
            return;
        }
        self.bg_from = self.bg_to;
        self.bg_to = tier;
        self.bg_fade = 0.0;
    }

    /// Advance every cosmetic system one tick.
    pub fn update(
        &mut self,
        dt: f32,
        viewport: Viewport,
        anim_speed_mult: f32,
        overdrive: bool,
        tuning: &Tuning,
    ) {
        // Particles: gravity, shrink, fade, rainbow hue spin
        for p in self.particles.iter_mut() {
            p.age += dt;
            p.pos += p.vel * dt;
            p.vel.y += 300.0 * dt;
            let progress = (p.age / p.lifetime).min(1.0);
            p.size = p.base_size * (1.0 - progress);
            if p.rainbow {
                p.hue = (p.hue + 720.0 * dt) % 360.0;
            }
        }
        self.particles.retain(|p| p.age < p.lifetime);

        // Floating text rises and fades
        for t in self.texts.iter_mut() {
            t.age += dt;
            let progress = (t.age / t.duration).min(1.0);
            t.y = t.start_y - t.rise * progress;
            if t.kind == FloatKind::Reward {
                t.hue = (t.hue + tuning.rainbow_deg_per_sec * dt) % 360.0;
            }
        }
        self.texts.retain(|t| t.age < t.duration);

        // Speed lines accelerate toward the bottom; a new one spawns
        // each time the newest has cleared the spacing distance
        let spawn_y = viewport.height * tuning.speedline_spawn_y_frac;
        for line in self.speed_lines.iter_mut() {
            let progress = line.progress(viewport.height);
            let accel = (progress + 0.1).powf(tuning.speedline_accel_power);
            line.y += tuning.speedline_base_speed * accel * dt * anim_speed_mult;
        }
        self.speed_lines.retain(|l| l.y <= viewport.height);
        // Newest line is the one still closest to the spawn Y
        let newest_y = self
            .speed_lines
            .iter()
            .map(|l| l.y)
            .fold(f32::INFINITY, f32::min);
        if self.speed_lines.is_empty()
            || newest_y - spawn_y >= tuning.speedline_spawn_spacing
        {
            self.speed_lines.push(SpeedLine {
                y: spawn_y,
                start_y: spawn_y,
            });
        }

        // Damage flash
        if let Some(age) = self.damage_flash_age.as_mut() {
            *age += dt;
            if *age >= tuning.damage_flash_secs {
                self.damage_flash_age = None;
            }
        }

        // Background crossfade
        if self.bg_fade < 1.0 {
            self.bg_fade = (self.bg_fade + dt / tuning.bg_crossfade_secs).min(1.0);
        }

        // Overdrive-only layers
        if overdrive {
            self.action_angle +=
                tuning.action_lines_deg_per_sec.to_radians() * dt;
            for line in self.action_lines.iter_mut() {
                line.hue = (line.hue + 180.0 * dt) % 360.0;
            }
            self.rainbow_hue =
                (self.rainbow_hue + tuning.rainbow_deg_per_sec * dt) % 360.0;
        }
    }
}

/// Interpolated speed-line thickness helper for the renderer.
pub fn speedline_thickness(progress: f32) -> f32 {
    lerp(1.5, 6.0, progress)
}

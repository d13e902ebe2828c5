//! Tiered pattern generation and timed spawning
//!
//! The spawner owns all live bread plus a lazily-extended buffer of
//! upcoming lane indices. The buffer's local statistics (step size,
//! clustering, jump distance) depend on the current difficulty tier,
//! which is a pure step function of the spawn interval. The RNG is a
//! seeded PCG so tests can pin exact sequences.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bread::Bread;
use crate::Tuning;

/// Difficulty / health-economy level. The generator's active tier also
/// selects the health deltas applied on hit and miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    /// Index into per-tier tuning tables.
    pub fn index(self) -> usize {
        match self {
            Tier::Low => 0,
            Tier::Mid => 1,
            Tier::High => 2,
        }
    }

    /// Step function of the current spawn interval. Thresholds are
    /// strictly decreasing (validated at startup).
    pub fn from_spawn_interval(interval: f32, tuning: &Tuning) -> Self {
        if interval >= tuning.tier_mid_interval {
            Tier::Low
        } else if interval >= tuning.tier_high_interval {
            Tier::Mid
        } else {
            Tier::High
        }
    }

    /// One level up, saturating at High.
    pub fn promoted(self) -> Tier {
        match self {
            Tier::Low => Tier::Mid,
            _ => Tier::High,
        }
    }

    /// One level down, saturating at Low.
    pub fn demoted(self) -> Tier {
        match self {
            Tier::High => Tier::Mid,
            _ => Tier::Low,
        }
    }
}

/// Spawns bread on a timer and advances every live entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    rng: Pcg32,
    pub breads: Vec<Bread>,
    spawn_timer: f32,
    pattern: Vec<u32>,
    cursor: usize,
    pub tier: Tier,
    last_lane: Option<u32>,
    next_id: u32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            breads: Vec::new(),
            spawn_timer: 0.0,
            pattern: Vec::new(),
            cursor: 0,
            tier: Tier::Low,
            last_lane: None,
            next_id: 1,
        }
    }

    /// Drop all bread and pending pattern state, keeping the RNG stream.
    pub fn clear(&mut self) {
        self.breads.clear();
        self.spawn_timer = 0.0;
        self.pattern.clear();
        self.cursor = 0;
        self.tier = Tier::Low;
        self.last_lane = None;
    }

    /// Remaining spawn-timer accumulation (exposed for tests).
    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    pub fn bread_by_id(&self, id: u32) -> Option<&Bread> {
        self.breads.iter().find(|b| b.id == id)
    }

    pub fn bread_by_id_mut(&mut self, id: u32) -> Option<&mut Bread> {
        self.breads.iter_mut().find(|b| b.id == id)
    }

    /// Advance one tick: spawn once per interval the timer has crossed
    /// (carrying the remainder), move every bread, purge the dead.
    /// Returns the ids of bread that became collision-eligible.
    pub fn update(
        &mut self,
        dt: f32,
        travel_duration: f32,
        spawn_interval: f32,
        anim_speed_mult: f32,
        score: u32,
        tuning: &Tuning,
    ) -> Vec<u32> {
        self.spawn_timer += dt;
        // Loop so a tick longer than the interval still emits every due
        // bread; the remainder carries, preserving long-run spawn rate
        while self.spawn_timer >= spawn_interval {
            self.spawn_timer -= spawn_interval;
            let lane = self.next_lane(spawn_interval, score, tuning);
            let id = self.next_id;
            self.next_id += 1;
            self.breads.push(Bread::new(id, lane, tuning));
        }

        let mut eligible = Vec::new();
        for bread in self.breads.iter_mut() {
            if bread.update(dt, travel_duration, anim_speed_mult, tuning, &mut self.rng) {
                eligible.push(bread.id);
            }
        }
        self.breads.retain(|b| b.alive);
        eligible
    }

    /// Next lane to spawn at. Recomputes the tier, regenerates the
    /// buffer on tier change or exhaustion, and applies the High-tier
    /// global distance clamp against the previously emitted lane.
    fn next_lane(&mut self, spawn_interval: f32, score: u32, tuning: &Tuning) -> u32 {
        let tier = Tier::from_spawn_interval(spawn_interval, tuning);
        if tier != self.tier {
            self.tier = tier;
            self.regenerate(tuning, score);
        }
        if self.cursor >= self.pattern.len() {
            self.regenerate(tuning, score);
        }

        let mut lane = self.pattern[self.cursor];
        self.cursor += 1;

        if tier == Tier::High {
            if let Some(last) = self.last_lane {
                let max_dist = tuning.max_lane_distance(score);
                let lo = last.saturating_sub(max_dist).max(tuning.min_spawn_lane());
                let hi = (last + max_dist).min(tuning.max_spawn_lane());
                lane = lane.clamp(lo, hi);
            }
        }

        lane = lane.clamp(tuning.min_spawn_lane(), tuning.max_spawn_lane());
        self.last_lane = Some(lane);
        lane
    }

    fn regenerate(&mut self, tuning: &Tuning, score: u32) {
        self.pattern.clear();
        self.cursor = 0;
        match self.tier {
            Tier::Low => {
                let len = self.rng.random_range(
                    tuning.low_pattern_len.min..=tuning.low_pattern_len.max,
                );
                match self.rng.random_range(0..4u32) {
                    0 => self.gen_sequential(len, 1, tuning),
                    1 => self.gen_zigzag(len, tuning.low_zigzag_step, tuning),
                    2 => self.gen_clusters(len, tuning.low_cluster_size, tuning),
                    _ => self.gen_random_burst(tuning.low_burst_len, tuning),
                }
            }
            Tier::Mid => {
                let len = self.rng.random_range(
                    tuning.mid_pattern_len.min..=tuning.mid_pattern_len.max,
                );
                match self.rng.random_range(0..2u32) {
                    0 => self.gen_sequential(len, 1, tuning),
                    _ => self.gen_stepping_clusters(
                        len,
                        tuning.mid_cluster_len,
                        tuning.mid_cluster_step,
                        tuning,
                    ),
                }
            }
            Tier::High => {
                let len = self.rng.random_range(
                    tuning.high_pattern_len.min..=tuning.high_pattern_len.max,
                );
                match self.rng.random_range(0..2u32) {
                    0 => self.gen_wide_jump_walk(len, score, tuning),
                    _ => self.gen_clusters(len, tuning.high_cluster_size, tuning),
                }
            }
        }
    }

    fn bounds(tuning: &Tuning) -> (i64, i64) {
        (tuning.min_spawn_lane() as i64, tuning.max_spawn_lane() as i64)
    }

    /// Uniform pick that tolerates a collapsed or inverted range
    /// (possible under extreme tunings).
    fn random_between(&mut self, a: i64, b: i64) -> i64 {
        if a < b {
            self.rng.random_range(a..=b)
        } else {
            (a + b) / 2
        }
    }

    fn push(&mut self, lane: i64, tuning: &Tuning) {
        let (lo, hi) = Self::bounds(tuning);
        self.pattern.push(lane.clamp(lo, hi) as u32);
    }

    /// Walk by a fixed step, bouncing off the spawnable edges.
    fn gen_sequential(&mut self, len: u32, step: i64, tuning: &Tuning) {
        let (lo, hi) = Self::bounds(tuning);
        let mut pos = self.random_between(lo + 1, hi - 1);
        let mut dir: i64 = if self.rng.random::<bool>() { 1 } else { -1 };
        for _ in 0..len {
            self.push(pos, tuning);
            pos += dir * step;
            if pos < lo || pos > hi {
                dir = -dir;
                pos += dir * step * 2;
            }
            pos = pos.clamp(lo, hi);
        }
    }

    /// Drift back and forth with a wider stride.
    fn gen_zigzag(&mut self, len: u32, step: u32, tuning: &Tuning) {
        let (lo, hi) = Self::bounds(tuning);
        let step = step as i64;
        let mut pos = self.random_between((lo + step).min(hi), (hi - step).max(lo));
        let mut dir: i64 = if self.rng.random::<bool>() { 1 } else { -1 };
        for _ in 0..len {
            self.push(pos, tuning);
            pos += dir * step;
            if pos <= lo {
                pos = lo;
                dir = 1;
            } else if pos >= hi {
                pos = hi;
                dir = -1;
            }
        }
    }

    /// Fixed-size clusters around random centers.
    fn gen_clusters(&mut self, total: u32, cluster_size: u32, tuning: &Tuning) {
        let (lo, hi) = Self::bounds(tuning);
        let half = (cluster_size / 2) as i64;
        let mut count = 0;
        while count < total {
            let center = self.random_between((lo + half).min(hi), (hi - half).max(lo));
            let mut offset = -half;
            while offset <= half && count < total {
                self.push(center + offset, tuning);
                offset += 1;
                count += 1;
            }
        }
    }

    /// Uniformly random lanes.
    fn gen_random_burst(&mut self, len: u32, tuning: &Tuning) {
        let (lo, hi) = Self::bounds(tuning);
        for _ in 0..len {
            let lane = self.random_between(lo, hi);
            self.push(lane, tuning);
        }
    }

    /// Short runs that drift by a fixed step, restarting at a random
    /// lane between runs.
    fn gen_stepping_clusters(
        &mut self,
        total: u32,
        cluster_len: u32,
        cluster_step: u32,
        tuning: &Tuning,
    ) {
        let (lo, hi) = Self::bounds(tuning);
        let step = cluster_step as i64;
        let mut count = 0;
        while count < total {
            let mut pos = self.random_between((lo + 2).min(hi), (hi - 2).max(lo));
            let mut dir: i64 = if self.rng.random::<bool>() { 1 } else { -1 };
            let mut i = 0;
            while i < cluster_len && count < total {
                if pos + dir * step < lo || pos + dir * step > hi {
                    dir = -dir;
                }
                self.push(pos, tuning);
                pos = (pos + dir * step).clamp(lo, hi);
                i += 1;
                count += 1;
            }
        }
    }

    /// Sequential walk that sometimes takes a wide jump when it
    /// reverses at an edge. Steps are pre-clamped to the current
    /// score-dependent distance limit.
    fn gen_wide_jump_walk(&mut self, len: u32, score: u32, tuning: &Tuning) {
        let (lo, hi) = Self::bounds(tuning);
        let max_dist = tuning.max_lane_distance(score) as i64;
        let mut pos = self.random_between((lo + 2).min(hi), (hi - 2).max(lo));
        let mut dir: i64 = if self.rng.random::<bool>() { 1 } else { -1 };
        let mut wide = false;
        for _ in 0..len {
            self.push(pos, tuning);

            let mut step = if wide { tuning.wide_jump_size as i64 } else { 1 };
            let mut next = pos + dir * step;
            if next < lo || next > hi {
                dir = -dir;
                wide = self.rng.random::<f32>() < tuning.wide_jump_chance;
                step = if wide { tuning.wide_jump_size as i64 } else { 1 };
                next = pos + dir * step;
            }
            if (next - pos).abs() > max_dist {
                next = pos + dir * max_dist;
            }
            pos = next.clamp(lo, hi);
        }
    }
}

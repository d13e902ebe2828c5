//! Game state and the health/tier machine
//!
//! One `GameState` is one session: no globals, so several sessions can
//! coexist and unit tests can drive a run deterministically. Health is
//! bounded to a single tier's span; crossing a bound moves the tier and
//! carries the remainder. Saturating the top tier enters overdrive,
//! exhausting the bottom tier ends the run.

use serde::{Deserialize, Serialize};

use super::fx::Fx;
use super::lane::Viewport;
use super::pattern::{Spawner, Tier};
use super::player::Player;
use crate::{Tuning, lerp};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle, waiting for a run to start
    MainMenu,
    /// "Ready?" then "GO!" announcement before the run
    ReadyGo,
    /// Active gameplay
    Running,
    /// Frozen; the last frame keeps rendering
    Paused,
    /// Numeric countdown on resume
    Countdown,
    /// Run ended; summary surfaces after a short delay
    GameOver,
}

/// One-way notifications for the presentation layer. Drained each frame;
/// the simulation never waits on them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ScoreChanged(u32),
    HealthChanged {
        health: f32,
        tier: Tier,
        overdrive: bool,
    },
    TierChanged(Tier),
    OverdriveChanged(bool),
    /// "Ready?" is on screen
    ReadyShown,
    /// "GO!" is on screen
    GoShown,
    /// Resume countdown second remaining
    CountdownTick(u32),
    BreadCollected,
    BreadMissed,
    GameOver {
        score: u32,
    },
    /// The post-delay summary may be shown now
    GameOverShown {
        score: u32,
        best: u32,
    },
    NewHighScore(u32),
}

/// Current speed-ramp outputs, a pure function of elapsed game time.
#[derive(Debug, Clone, Copy)]
pub struct SpeedRamp {
    pub travel_duration: f32,
    pub spawn_interval: f32,
    pub anim_speed_mult: f32,
}

/// Complete session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub seed: u64,
    pub phase: GamePhase,
    /// Time spent in the current timed phase
    pub(crate) phase_time: f32,
    /// ReadyGo has flipped from "Ready?" to "GO!"
    pub(crate) go_shown: bool,
    /// Seconds left on the resume countdown
    pub(crate) countdown_left: u32,
    /// Post-game-over summary already surfaced
    pub(crate) summary_shown: bool,
    pub game_time: f32,
    pub score: u32,
    pub health: f32,
    pub tier: Tier,
    pub overdrive: bool,
    pub player: Player,
    pub spawner: Spawner,
    #[serde(skip)]
    pub fx: Fx,
    #[serde(skip)]
    events: Vec<GameEvent>,
    /// Best score seen so far (loaded from persistence by the host)
    pub best_score: u32,
}

impl GameState {
    /// Create a session idling at the main menu. `tuning` must have been
    /// validated by the caller.
    pub fn new(seed: u64, viewport: Viewport, tuning: Tuning, best_score: u32) -> Self {
        let starting_health = tuning.max_health * tuning.starting_health_frac;
        let mut fx = Fx::new(seed ^ 0x5eed_f00d);
        fx.reset(viewport, &tuning);
        Self {
            viewport,
            seed,
            phase: GamePhase::MainMenu,
            phase_time: 0.0,
            go_shown: false,
            countdown_left: 0,
            summary_shown: false,
            game_time: 0.0,
            score: 0,
            health: starting_health,
            tier: Tier::Mid,
            overdrive: false,
            player: Player::new(viewport.width),
            spawner: Spawner::new(seed),
            fx,
            events: Vec::new(),
            best_score,
            tuning,
        }
    }

    /// Take all pending events, leaving the queue empty.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether the ReadyGo phase has flipped from "Ready?" to "GO!".
    pub fn go_shown(&self) -> bool {
        self.go_shown
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Serialize the session for a mid-run save. Cosmetic and event
    /// state stay out of the snapshot.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a saved session. Cosmetics are rebuilt from scratch, and
    /// a run saved mid-frame comes back paused so the player resumes
    /// deliberately through the countdown.
    pub fn from_snapshot(json: &str) -> Result<Self, serde_json::Error> {
        let mut state: Self = serde_json::from_str(json)?;
        state.fx = Fx::new(state.seed ^ 0x5eed_f00d);
        state.fx.reset(state.viewport, &state.tuning);
        state.fx.bg_from = state.tier;
        state.fx.bg_to = state.tier;
        if state.phase == GamePhase::Running {
            state.phase = GamePhase::Paused;
        }
        Ok(state)
    }

    /// Speed ramp at the current game time: travel shortens, spawns
    /// tighten, animation speeds up, all clamped at the ramp end.
    pub fn speed(&self) -> SpeedRamp {
        let progress = (self.game_time / self.tuning.speed_ramp_secs).min(1.0);
        SpeedRamp {
            travel_duration: lerp(
                self.tuning.travel_secs_start,
                self.tuning.travel_secs_min,
                progress,
            ),
            spawn_interval: lerp(
                self.tuning.spawn_interval_start,
                self.tuning.spawn_interval_min,
                progress,
            ),
            anim_speed_mult: lerp(
                self.tuning.anim_speed_start,
                self.tuning.anim_speed_end,
                progress,
            ),
        }
    }

    /// Reset every subsystem and begin the Ready/GO announcement.
    pub fn start(&mut self) {
        self.score = 0;
        self.tier = Tier::Mid;
        self.health = self.tuning.max_health * self.tuning.starting_health_frac;
        self.overdrive = false;
        self.game_time = 0.0;
        self.summary_shown = false;
        self.player = Player::new(self.viewport.width);
        self.spawner.clear();
        self.fx.reset(self.viewport, &self.tuning);
        self.phase = GamePhase::ReadyGo;
        self.phase_time = 0.0;
        self.go_shown = false;
        self.events.clear();
        self.push_event(GameEvent::ReadyShown);
        self.push_event(GameEvent::ScoreChanged(0));
        self.push_event(GameEvent::HealthChanged {
            health: self.health,
            tier: self.tier,
            overdrive: false,
        });
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Running {
            self.phase = GamePhase::Paused;
        }
    }

    /// Leave pause through a timed countdown.
    pub fn resume(&mut self) {
        if self.phase != GamePhase::Paused {
            return;
        }
        self.phase = GamePhase::Countdown;
        self.phase_time = 0.0;
        self.countdown_left = self.tuning.resume_countdown;
        self.push_event(GameEvent::CountdownTick(self.countdown_left));
    }

    /// Start over from game over (or anywhere).
    pub fn restart(&mut self) {
        self.start();
    }

    /// Back to the main menu, submitting the score first.
    pub fn quit(&mut self) {
        self.submit_score();
        self.phase = GamePhase::MainMenu;
    }

    fn submit_score(&mut self) {
        if self.score > self.best_score {
            self.best_score = self.score;
            self.push_event(GameEvent::NewHighScore(self.score));
        }
    }

    /// Resolve a collision-eligible bread against the player position.
    /// State mutation strictly precedes the visual cues so any observer
    /// reading after the call sees the final tier.
    pub fn handle_collision(&mut self, id: u32) {
        let Some(bread) = self.spawner.bread_by_id(id) else {
            return;
        };
        let lane = bread.lane;
        let pos = bread.screen_position(self.viewport, &self.tuning);
        let player_lane = self.player.lane(self.viewport, self.tuning.num_lanes);
        let hit = if self.tuning.edge_auto_collect
            && self.player.in_margin(self.viewport, &self.tuning)
        {
            // Variant behavior: standing in a margin sweeps the matching
            // edge lanes
            if player_lane < self.tuning.num_lanes / 2 {
                lane < self.tuning.edge_buffer_lanes
            } else {
                lane >= self.tuning.num_lanes - self.tuning.edge_buffer_lanes
            }
        } else {
            lane.abs_diff(player_lane) <= self.tuning.collision_margin
        };

        // Health economy follows the generator's active difficulty tier
        let tier = self.spawner.tier;
        let catch_y = self.viewport.height * self.tuning.near_y_frac;

        if hit {
            if let Some(bread) = self.spawner.bread_by_id_mut(id) {
                bread.collect();
            }
            self.score += 1;
            self.add_health(self.tuning.hit_gain[tier.index()]);

            self.fx.spawn_burst(pos, self.overdrive, &self.tuning);
            if self.overdrive && self.fx.roll_reward_text(&self.tuning) {
                self.fx
                    .spawn_reward_text(self.player.x, catch_y - 60.0, &self.tuning);
            }
            self.push_event(GameEvent::ScoreChanged(self.score));
            self.push_event(GameEvent::BreadCollected);
        } else {
            if let Some(bread) = self.spawner.bread_by_id_mut(id) {
                bread.miss();
            }
            self.remove_health(self.tuning.miss_loss[tier.index()]);

            self.player.trigger_damage();
            self.fx.trigger_damage_flash();
            self.fx
                .spawn_damage_text(self.player.x, catch_y - 50.0, &self.tuning);
            self.push_event(GameEvent::BreadMissed);
        }
    }

    /// Add health. No-op while overdrive is lit; overflow promotes the
    /// tier carrying the remainder; saturation at High sets overdrive.
    pub fn add_health(&mut self, amount: f32) {
        if self.overdrive {
            return;
        }
        let prev_tier = self.tier;
        let max = self.tuning.max_health;
        self.health += amount;
        while self.health >= max {
            if self.tier == Tier::High {
                self.health = max;
                self.overdrive = true;
                break;
            }
            self.tier = self.tier.promoted();
            self.health -= max;
        }
        self.after_health_change(prev_tier);
    }

    /// Remove health. Always exits overdrive; underflow demotes the tier
    /// carrying the deficit; exhausting the Low tier ends the run.
    pub fn remove_health(&mut self, amount: f32) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        let prev_tier = self.tier;
        let was_overdrive = self.overdrive;
        self.overdrive = false;
        let max = self.tuning.max_health;
        self.health -= amount;
        while self.health <= 0.0 {
            if self.tier == Tier::Low {
                self.health = 0.0;
                self.trigger_game_over();
                break;
            }
            self.tier = self.tier.demoted();
            self.health += max;
        }
        if was_overdrive {
            self.push_event(GameEvent::OverdriveChanged(false));
        }
        self.after_health_change(prev_tier);
    }

    fn after_health_change(&mut self, prev_tier: Tier) {
        if self.tier != prev_tier {
            self.fx.set_background_tier(self.tier);
            self.push_event(GameEvent::TierChanged(self.tier));
        }
        if self.overdrive {
            self.push_event(GameEvent::OverdriveChanged(true));
        }
        self.push_event(GameEvent::HealthChanged {
            health: self.health,
            tier: self.tier,
            overdrive: self.overdrive,
        });
    }

    fn trigger_game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.phase_time = 0.0;
        self.summary_shown = false;
        self.player.trigger_defeat();
        self.submit_score();
        self.push_event(GameEvent::GameOver { score: self.score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameState {
        let tuning = Tuning::default();
        tuning.validate().unwrap();
        let mut state = GameState::new(
            123,
            Viewport::new(450.0, 800.0),
            tuning,
            0,
        );
        state.start();
        state.phase = GamePhase::Running;
        state.drain_events();
        state
    }

    #[test]
    fn test_scenario_a_plain_hit() {
        // Tier-Low hit from mid health: gain, no tier change
        let mut state = session();
        assert_eq!(state.tier, Tier::Mid);
        let before = state.health;
        state.score += 1;
        state.add_health(state.tuning.hit_gain[Tier::Low.index()]);
        assert!(state.health > before);
        assert_eq!(state.tier, Tier::Mid);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_scenario_b_promotion_carries_remainder() {
        let mut state = session();
        let max = state.tuning.max_health;
        state.health = max - 1.0;
        state.add_health(5.0);
        assert_eq!(state.tier, Tier::High);
        assert!((state.health - 4.0).abs() < 1e-3);
        assert!(!state.overdrive);
    }

    #[test]
    fn test_promotion_to_overdrive_when_carry_saturates() {
        let mut state = session();
        let max = state.tuning.max_health;
        state.tier = Tier::Mid;
        state.health = max - 1.0;
        state.add_health(max + 2.0);
        assert_eq!(state.tier, Tier::High);
        assert!(state.overdrive);
        assert_eq!(state.health, max);
    }

    #[test]
    fn test_add_health_noop_in_overdrive() {
        let mut state = session();
        state.tier = Tier::High;
        state.health = state.tuning.max_health;
        state.overdrive = true;
        state.add_health(100.0);
        assert_eq!(state.health, state.tuning.max_health);
    }

    #[test]
    fn test_scenario_c_miss_clears_overdrive() {
        let mut state = session();
        state.tier = Tier::High;
        state.health = state.tuning.max_health;
        state.overdrive = true;
        state.remove_health(10.0);
        assert!(!state.overdrive);
        assert_eq!(state.tier, Tier::High);
        assert!(state.health < state.tuning.max_health);
    }

    #[test]
    fn test_demotion_carries_deficit() {
        let mut state = session();
        state.tier = Tier::Mid;
        state.health = 10.0;
        state.remove_health(30.0);
        assert_eq!(state.tier, Tier::Low);
        assert!((state.health - (state.tuning.max_health - 20.0)).abs() < 1e-3);
        assert_ne!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_scenario_d_game_over_once() {
        let mut state = session();
        state.tier = Tier::Low;
        state.health = 5.0;
        state.remove_health(50.0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.health, 0.0);
        let events = state.drain_events();
        let game_overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        // A second miss while game over must not re-trigger anything
        state.remove_health(50.0);
        let events = state.drain_events();
        assert!(events.is_empty());
        assert_eq!(state.health, 0.0);
    }

    #[test]
    fn test_add_remove_inverse_within_tier() {
        let mut state = session();
        let (tier0, health0) = (state.tier, state.health);
        state.add_health(40.0);
        state.remove_health(40.0);
        assert_eq!(state.tier, tier0);
        assert!((state.health - health0).abs() < 1e-3);
    }

    #[test]
    fn test_boundary_crossing_stays_within_one_tier() {
        let mut state = session();
        state.health = state.tuning.max_health - 1.0;
        state.add_health(10.0); // crosses into High
        state.remove_health(10.0); // drops back
        assert!(state.tier == Tier::Mid || state.tier == Tier::High);
    }

    #[test]
    fn test_health_always_bounded() {
        let mut state = session();
        let max = state.tuning.max_health;
        let deltas = [15.0, 200.0, 90.0, 320.0, 5.0, 170.0, 45.0, 260.0];
        for (i, delta) in deltas.iter().cycle().take(200).enumerate() {
            if i % 3 == 0 {
                state.remove_health(*delta);
            } else {
                state.add_health(*delta);
            }
            assert!(
                (0.0..=max).contains(&state.health),
                "health {} out of bounds",
                state.health
            );
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn test_mutation_precedes_cue_events() {
        // The HealthChanged payload must reflect the post-transition tier
        let mut state = session();
        state.health = state.tuning.max_health - 1.0;
        state.add_health(10.0);
        let events = state.drain_events();
        let health_event = events
            .iter()
            .find(|e| matches!(e, GameEvent::HealthChanged { .. }))
            .unwrap();
        if let GameEvent::HealthChanged { tier, .. } = health_event {
            assert_eq!(*tier, Tier::High);
        }
    }

    #[test]
    fn test_new_high_score_on_game_over() {
        let mut state = session();
        state.score = 42;
        state.tier = Tier::Low;
        state.health = 1.0;
        state.remove_health(10.0);
        assert_eq!(state.best_score, 42);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::NewHighScore(42)))
        );
    }

    #[test]
    fn test_snapshot_round_trip_resumes_identically() {
        use crate::sim::tick::{TickInput, tick};

        let input = TickInput {
            target_x: Some(225.0),
            pause: false,
        };
        let mut original = session();
        for _ in 0..600 {
            tick(&mut original, input, 0.016);
        }
        original.drain_events();

        let json = original.to_snapshot().unwrap();
        let mut restored = GameState::from_snapshot(&json).unwrap();
        assert_eq!(restored.phase, GamePhase::Paused);
        assert_eq!(restored.score, original.score);
        assert_eq!(restored.health.to_bits(), original.health.to_bits());
        assert_eq!(restored.tier, original.tier);
        assert_eq!(restored.game_time.to_bits(), original.game_time.to_bits());

        // Walk the restored run back to Running through the countdown
        restored.resume();
        while restored.phase == GamePhase::Countdown {
            tick(&mut restored, TickInput::default(), 0.1);
        }
        restored.drain_events();

        // From here both runs must emit the same spawn sequence and
        // resolve the same collisions; cosmetics are the only
        // difference and never touch the gameplay RNG stream
        let play = |state: &mut GameState| {
            let mut fingerprint: u64 = 0;
            for _ in 0..600 {
                tick(state, input, 0.016);
                for bread in &state.spawner.breads {
                    fingerprint = fingerprint
                        .wrapping_mul(31)
                        .wrapping_add(bread.lane as u64 + 1);
                }
            }
            (state.score, state.health.to_bits(), state.tier, fingerprint)
        };
        assert_eq!(play(&mut original), play(&mut restored));
    }

    #[test]
    fn test_pause_resume_countdown() {
        let mut state = session();
        state.pause();
        assert_eq!(state.phase, GamePhase::Paused);
        state.resume();
        assert_eq!(state.phase, GamePhase::Countdown);
        assert_eq!(state.countdown_left, state.tuning.resume_countdown);
    }

    #[test]
    fn test_speed_ramp_clamps() {
        let mut state = session();
        state.game_time = 0.0;
        let s0 = state.speed();
        assert_eq!(s0.spawn_interval, state.tuning.spawn_interval_start);
        state.game_time = state.tuning.speed_ramp_secs * 10.0;
        let s1 = state.speed();
        assert_eq!(s1.spawn_interval, state.tuning.spawn_interval_min);
        assert_eq!(s1.travel_duration, state.tuning.travel_secs_min);
    }
}

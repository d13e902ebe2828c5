//! Deterministic game simulation
//!
//! Everything in this module is platform-free: no canvas, no DOM, no
//! timers. Randomness comes from seeded PCG streams (one for gameplay,
//! one for cosmetics), so a seed plus a recorded input sequence replays
//! the same run bit for bit. The renderer and host shell live outside
//! and only read this state.

pub mod bread;
pub mod fx;
pub mod lane;
pub mod pattern;
pub mod player;
pub mod state;
pub mod tick;

pub use bread::Bread;
pub use fx::{ActionLine, FloatKind, FloatingText, Fx, Particle, SpeedLine};
pub use lane::Viewport;
pub use pattern::{Spawner, Tier};
pub use player::{Player, PlayerAnim};
pub use state::{GameEvent, GamePhase, GameState, SpeedRamp};
pub use tick::{TickInput, tick};

//! Sky Sprint - a pseudo-3D lane-runner arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collision, health machine)
//! - `renderer`: Canvas 2D rendering (wasm only)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `highscores`: Best-score persistence

pub mod highscores;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use settings::Settings;
pub use tuning::Tuning;

/// Fixed simulation limits
pub mod consts {
    /// Maximum delta time fed to a single update (seconds). Large frame
    /// gaps (tab backgrounding) are clamped so entities never teleport
    /// past the collision line.
    pub const MAX_TICK_DT: f32 = 0.1;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Power-law ease-in: slow start, explosive finish
#[inline]
pub fn ease_in(t: f32, power: f32) -> f32 {
    t.powf(power)
}

/// Power-law ease-out
#[inline]
pub fn ease_out(t: f32, power: f32) -> f32 {
    1.0 - (1.0 - t).powf(power)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(2.0, 10.0, 0.5), 6.0);
    }

    #[test]
    fn test_ease_in_bounds() {
        assert_eq!(ease_in(0.0, 2.2), 0.0);
        assert!((ease_in(1.0, 2.2) - 1.0).abs() < 1e-6);
        // Ease-in stays below linear in the interior
        assert!(ease_in(0.5, 2.2) < 0.5);
    }

    #[test]
    fn test_ease_out_bounds() {
        assert_eq!(ease_out(0.0, 2.0), 0.0);
        assert!((ease_out(1.0, 2.0) - 1.0).abs() < 1e-6);
        assert!(ease_out(0.5, 2.0) > 0.5);
    }
}

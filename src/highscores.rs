//! Personal best persistence
//!
//! A single best score in LocalStorage; no leaderboard.

use serde::{Deserialize, Serialize};

/// The stored personal best
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScore {
    pub score: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "skysprint_highscore";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished run. Returns `true` if this is a new best.
    pub fn submit(&mut self, score: u32, timestamp: f64) -> bool {
        if score <= self.score {
            return false;
        }
        self.score = score;
        self.timestamp = timestamp;
        true
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(best) = serde_json::from_str::<HighScore>(&json) {
                    log::info!("Loaded high score: {}", best.score);
                    return best;
                }
            }
        }

        log::info!("No high score found, starting fresh");
        Self::new()
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High score saved ({})", self.score);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_keeps_best() {
        let mut best = HighScore::new();
        assert!(best.submit(10, 1.0));
        assert!(!best.submit(5, 2.0));
        assert!(!best.submit(10, 3.0));
        assert!(best.submit(11, 4.0));
        assert_eq!(best.score, 11);
        assert_eq!(best.timestamp, 4.0);
    }
}

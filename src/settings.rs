//! Player preferences
//!
//! Persisted as JSON in the key-value store, separately from scores.

use serde::{Deserialize, Serialize};

use crate::error::ArcadeResult;
use crate::platform::KeyValueStore;

/// Who controls the right Pong paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PongMode {
    /// Right paddle follows the ball
    #[default]
    Single,
    /// Right paddle on I/K
    Multi,
}

impl PongMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PongMode::Single => "single",
            PongMode::Multi => "multi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "1p" => Some(PongMode::Single),
            "multi" | "2p" => Some(PongMode::Multi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub pong_mode: PongMode,
    /// Fixed RNG seed for every session (reproducible runs); `None` seeds from
    /// the clock
    pub fixed_seed: Option<u64>,
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "retro_arcade_settings";

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> ArcadeResult<()> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Seed for a new session
    pub fn session_seed(&self, clock_ms: f64) -> u64 {
        self.fixed_seed.unwrap_or(clock_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            pong_mode: PongMode::Multi,
            fixed_seed: Some(42),
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_unreadable_falls_back() {
        let store = MemoryStore::new().with_value(Settings::STORAGE_KEY, "{oops");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_pong_mode_parse() {
        assert_eq!(PongMode::parse("2P"), Some(PongMode::Multi));
        assert_eq!(PongMode::parse("single"), Some(PongMode::Single));
        assert_eq!(PongMode::parse("coop"), None);
        assert_eq!(PongMode::Multi.as_str(), "multi");
    }

    #[test]
    fn test_session_seed() {
        let fixed = Settings {
            fixed_seed: Some(7),
            ..Default::default()
        };
        assert_eq!(fixed.session_seed(123_456.0), 7);
        assert_eq!(Settings::default().session_seed(123_456.0), 123_456);
    }
}

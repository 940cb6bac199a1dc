//! Game settings and tuning
//!
//! Persisted separately from the high-score table. Every field has a default
//! so partial JSON documents are accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, FORMATION_SPACING, PLAYER_WIDTH};
use crate::persistence::{ScoreStore, read_json, write_json};

/// Settings parse/validation failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    /// Logical canvas width
    pub canvas_width: f32,
    /// Logical canvas height
    pub canvas_height: f32,

    // === Run ===
    /// Lives at the start of a run
    pub starting_lives: u8,
    /// Clearing this level wins the game
    pub max_level: u32,
    /// Formation columns (8 classic, 10 wide)
    pub formation_cols: usize,
    /// Enemies peel off the formation and dive at the player
    pub dive_attacks: bool,

    // === Timing (seconds of real time) ===
    /// "LEVEL n" pause before enemies move
    pub level_intro_secs: f32,
    /// Pause between clearing a level and the next intro
    pub level_clear_secs: f32,
    /// Delay before the ship respawns after losing a life
    pub respawn_delay_secs: f32,
    /// Death animation before game over (last life lost)
    pub game_over_delay_secs: f32,
    /// Death animation before game over (formation landed)
    pub invasion_delay_secs: f32,

    // === Firing ===
    /// Auto-fire cooldown while fire is held
    pub auto_fire_delay_secs: f32,
    /// Cap on manual (tap) shots per second
    pub manual_fire_max_hz: f32,
    /// Fire must be released this long before a new tap counts
    pub manual_fire_debounce_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            starting_lives: 3,
            max_level: 10,
            formation_cols: 8,
            dive_attacks: true,

            level_intro_secs: 3.0,
            level_clear_secs: 1.5,
            respawn_delay_secs: 2.0,
            game_over_delay_secs: 1.5,
            invasion_delay_secs: 1.0,

            auto_fire_delay_secs: 0.3,
            manual_fire_max_hz: 10.0,
            manual_fire_debounce_secs: 0.05,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "neon_invaders_settings";

    /// Classic settings without dive attackers
    pub fn classic() -> Self {
        Self {
            dive_attacks: false,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let formation_width = self.formation_cols as f32 * FORMATION_SPACING;
        if self.canvas_width < PLAYER_WIDTH || self.canvas_width < formation_width {
            return Err(SettingsError::Invalid(format!(
                "canvas_width {} too narrow for {} columns",
                self.canvas_width, self.formation_cols
            )));
        }
        if self.canvas_height < 300.0 {
            return Err(SettingsError::Invalid(format!(
                "canvas_height {} too short",
                self.canvas_height
            )));
        }
        if self.starting_lives == 0 {
            return Err(SettingsError::Invalid("starting_lives must be > 0".into()));
        }
        if self.max_level == 0 {
            return Err(SettingsError::Invalid("max_level must be > 0".into()));
        }
        if self.formation_cols == 0 {
            return Err(SettingsError::Invalid("formation_cols must be > 0".into()));
        }
        if self.manual_fire_max_hz <= 0.0 {
            return Err(SettingsError::Invalid(
                "manual_fire_max_hz must be positive".into(),
            ));
        }
        let delays = [
            self.level_intro_secs,
            self.level_clear_secs,
            self.respawn_delay_secs,
            self.game_over_delay_secs,
            self.invasion_delay_secs,
            self.auto_fire_delay_secs,
            self.manual_fire_debounce_secs,
        ];
        if delays.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(SettingsError::Invalid("delays must be >= 0".into()));
        }
        Ok(())
    }

    /// Minimum interval between manual shots
    pub fn manual_fire_interval(&self) -> f32 {
        1.0 / self.manual_fire_max_hz
    }

    /// Load settings from the store, falling back to defaults
    pub fn load<S: ScoreStore + ?Sized>(store: &S) -> Self {
        match read_json::<Settings, S>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => match settings.validate() {
                Ok(()) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Stored settings rejected ({e}), using defaults");
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unavailable ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Save settings to the store
    pub fn save<S: ScoreStore + ?Sized>(&self, store: &mut S) {
        match write_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{DisabledStore, MemoryStore};

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
        assert!(Settings::classic().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"formation_cols": 10}"#).unwrap();
        assert_eq!(settings.formation_cols, 10);
        assert_eq!(settings.starting_lives, 3);
        assert_eq!(settings.canvas_width, CANVAS_WIDTH);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            Settings::from_json(r#"{"starting_lives": 0}"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"formation_cols": 40}"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json("nope"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_manual_fire_interval() {
        let settings = Settings::default();
        assert!((settings.manual_fire_interval() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_load_save_roundtrip_and_fallback() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            max_level: 5,
            ..Settings::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
        assert_eq!(Settings::load(&DisabledStore), Settings::default());
    }
}

//! Game settings and difficulty tables
//!
//! Persisted as JSON next to the runner; the simulation only reads them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_ARENA_HEIGHT, DEFAULT_ARENA_WIDTH};

/// Per-difficulty scalars applied to enemy stats and incoming damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyModifier {
    pub hp: f32,
    pub damage: f32,
    pub bullet_density: f32,
    pub enemy_speed: f32,
}

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    /// Hard-level enemies, invulnerable player, autopilot enabled
    God,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::God => "god",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "god" => Some(Difficulty::God),
            _ => None,
        }
    }

    /// Parse a difficulty name, falling back to `Normal` for unknown names
    pub fn from_name_or_default(s: &str) -> Self {
        Self::from_name(s).unwrap_or_else(|| {
            log::warn!("Unknown difficulty '{}', using normal", s);
            Difficulty::Normal
        })
    }

    pub fn modifier(&self) -> DifficultyModifier {
        match self {
            Difficulty::Easy => DifficultyModifier {
                hp: 0.75,
                damage: 0.7,
                bullet_density: 0.6,
                enemy_speed: 0.7,
            },
            Difficulty::Normal => DifficultyModifier {
                hp: 1.0,
                damage: 1.0,
                bullet_density: 1.0,
                enemy_speed: 0.85,
            },
            Difficulty::Hard | Difficulty::God => DifficultyModifier {
                hp: 1.25,
                damage: 1.3,
                bullet_density: 1.2,
                enemy_speed: 1.0,
            },
        }
    }

    /// Player takes no damage at this level
    pub fn player_invulnerable(&self) -> bool {
        *self == Difficulty::God
    }

    /// Autopilot drives the ship at this level (and may only be toggled here)
    pub fn autopilot_available(&self) -> bool {
        *self == Difficulty::God
    }
}

/// Enemy roster selecting the wave table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    #[default]
    Low,
    Mid,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Low => "low",
            Faction::Mid => "mid",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Faction::Low),
            "mid" => Some(Faction::Mid),
            _ => None,
        }
    }

    /// Parse a faction name, falling back to `Low` for unknown names
    pub fn from_name_or_default(s: &str) -> Self {
        Self::from_name(s).unwrap_or_else(|| {
            log::warn!("Unknown faction '{}', using low", s);
            Faction::Low
        })
    }
}

/// Arena (canvas) dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: DEFAULT_ARENA_WIDTH,
            height: DEFAULT_ARENA_HEIGHT,
        }
    }
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Length that spans the arena from any point (used as beam range)
    pub fn beam_range(&self) -> f32 {
        self.width.hypot(self.height) * 2.0
    }
}

/// Errors from loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub faction: Faction,
    /// When false, hull damage can never reduce the ship below 1
    pub allow_death: bool,
    /// Seed for the simulation RNG
    pub seed: u64,
    pub arena: Arena,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            faction: Faction::Low,
            allow_death: true,
            seed: 0x5EC7_0A5E,
            arena: Arena::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from_path(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_names() {
        assert_eq!(Difficulty::from_name("Hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_name(" god "), Some(Difficulty::God));
        assert_eq!(Difficulty::from_name("nightmare"), None);
        assert_eq!(
            Difficulty::from_name_or_default("nightmare"),
            Difficulty::Normal
        );
        for d in [
            Difficulty::Easy,
            Difficulty::Normal,
            Difficulty::Hard,
            Difficulty::God,
        ] {
            assert_eq!(Difficulty::from_name(d.as_str()), Some(d));
        }
    }

    #[test]
    fn test_normal_modifier() {
        let m = Difficulty::Normal.modifier();
        assert_eq!(m.hp, 1.0);
        assert_eq!(m.enemy_speed, 0.85);
    }

    #[test]
    fn test_faction_fallback() {
        assert_eq!(Faction::from_name("MID"), Some(Faction::Mid));
        assert_eq!(Faction::from_name_or_default("high"), Faction::Low);
    }

    #[test]
    fn test_settings_partial_json_uses_defaults() {
        let s: Settings = serde_json::from_str(r#"{"difficulty":"hard"}"#).unwrap();
        assert_eq!(s.difficulty, Difficulty::Hard);
        assert_eq!(s.faction, Faction::Low);
        assert!(s.allow_death);
    }

    #[test]
    fn test_settings_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "sector_strike_settings_{}.json",
            std::process::id()
        ));
        let settings = Settings {
            difficulty: Difficulty::Easy,
            faction: Faction::Mid,
            allow_death: false,
            ..Default::default()
        };
        settings.save_to_path(&path).unwrap();
        let loaded = Settings::load_from_path(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = Settings::load_from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::LoopConfig;
use serde::Deserialize;
use thiserror::Error;

pub(crate) const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings json in {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables read from `assets/settings.json`. Every field is optional in the
/// file and falls back to the values below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    #[serde(rename = "loop")]
    pub(crate) loop_config: LoopConfig,
    pub(crate) player_speed: f64,
    pub(crate) enemy_speed: f64,
    pub(crate) animate_fps: f64,
    pub(crate) starting_ammo: u32,
    pub(crate) ammo_per_pickup: u32,
    pub(crate) projectile_speed: f64,
    pub(crate) tile_size: i32,
    pub(crate) map_file: PathBuf,
    pub(crate) ground_seed: u64,
    /// Seed for enemy wandering; a fresh one is drawn when absent.
    pub(crate) enemy_seed: Option<u64>,
    pub(crate) hud_title: String,
    pub(crate) hud_subtitle: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            loop_config: LoopConfig::default(),
            player_speed: 190.0,
            enemy_speed: 100.0,
            animate_fps: 7.0,
            starting_ammo: 8,
            ammo_per_pickup: 8,
            projectile_speed: 15.0,
            tile_size: 50,
            map_file: PathBuf::from("maps").join("map.txt"),
            ground_seed: 3,
            enemy_seed: None,
            hud_title: "Pyweek #21".to_string(),
            hud_subtitle: "Kill them ALL!".to_string(),
        }
    }
}

impl GameSettings {
    pub(crate) fn load(assets_dir: &Path) -> Result<Self, SettingsError> {
        let path = assets_dir.join(SETTINGS_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(SettingsError::Read { path, source }),
        };
        Self::parse(&raw, &path)
    }

    pub(crate) fn parse(raw: &str, path: &Path) -> Result<Self, SettingsError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let settings: Self =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let json_path = error.path().to_string();
                SettingsError::Parse {
                    path: path.to_path_buf(),
                    json_path,
                    source: error.into_inner(),
                }
            })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("player_speed", self.player_speed),
            ("enemy_speed", self.enemy_speed),
            ("projectile_speed", self.projectile_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be a finite value >= 0, got {value}")));
            }
        }
        if !self.animate_fps.is_finite() || self.animate_fps <= 0.0 {
            return Err(invalid(
                "animate_fps",
                format!("must be > 0, got {}", self.animate_fps),
            ));
        }
        if self.tile_size <= 0 {
            return Err(invalid(
                "tile_size",
                format!("must be > 0, got {}", self.tile_size),
            ));
        }
        if self.map_file.is_absolute() {
            return Err(invalid(
                "map_file",
                "must be relative to the assets directory".to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> SettingsError {
    SettingsError::Invalid { field, reason }
}

/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing file or missing keys fall back to defaults; a file that fails to
/// parse or validate is reported as a `ConfigError` and the caller decides.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub enemies: EnemyConfig,
    pub frame_ms: u64,
    pub music: bool,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

#[derive(Clone, Debug)]
pub struct PlayerConfig {
    pub speed: f32,
    pub size: f32,
}

/// Per-enemy values are rolled from these inclusive ranges at spawn.
#[derive(Clone, Debug)]
pub struct EnemyConfig {
    pub count: usize,
    pub speed_min: u32,
    pub speed_max: u32,
    pub detection_min: u32,
    pub detection_max: u32,
    pub lose_aggro_min: u32,
    pub lose_aggro_max: u32,
    pub size: f32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("tile size must be non-zero and fit in the world ({tile_width}x{tile_height} in {width}x{height})")]
    TileSize { width: u32, height: u32, tile_width: u32, tile_height: u32 },

    #[error("{field}: min {min} is greater than max {max}")]
    EmptyRange { field: &'static str, min: u32, max: u32 },

    #[error("enemies.lose_aggro_min ({lose_aggro_min}) must exceed enemies.detection_max ({detection_max})")]
    Hysteresis { detection_max: u32, lose_aggro_min: u32 },

    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("general.frame_ms must be at least 1")]
    ZeroFrame,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    enemies: TomlEnemies,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_world_width")]
    width: u32,
    #[serde(default = "default_world_height")]
    height: u32,
    #[serde(default = "default_tile")]
    tile_width: u32,
    #[serde(default = "default_tile")]
    tile_height: u32,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_player_speed")]
    speed: f32,
    #[serde(default = "default_actor_size")]
    size: f32,
}

#[derive(Deserialize, Debug)]
struct TomlEnemies {
    #[serde(default = "default_enemy_count")]
    count: usize,
    #[serde(default = "default_enemy_speed_min")]
    speed_min: u32,
    #[serde(default = "default_enemy_speed_max")]
    speed_max: u32,
    #[serde(default = "default_detection_min")]
    detection_min: u32,
    #[serde(default = "default_detection_max")]
    detection_max: u32,
    #[serde(default = "default_lose_aggro_min")]
    lose_aggro_min: u32,
    #[serde(default = "default_lose_aggro_max")]
    lose_aggro_max: u32,
    #[serde(default = "default_actor_size")]
    size: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_music")]
    music: bool,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_world_width() -> u32 { 1280 }
fn default_world_height() -> u32 { 720 }
fn default_tile() -> u32 { 16 }
fn default_player_speed() -> f32 { 200.0 }
fn default_actor_size() -> f32 { 14.0 }
fn default_enemy_count() -> usize { 5 }
fn default_enemy_speed_min() -> u32 { 70 }
fn default_enemy_speed_max() -> u32 { 110 }
fn default_detection_min() -> u32 { 150 }
fn default_detection_max() -> u32 { 220 }
fn default_lose_aggro_min() -> u32 { 250 }
fn default_lose_aggro_max() -> u32 { 350 }
fn default_frame_ms() -> u64 { 16 }
fn default_music() -> bool { true }
fn default_log_file() -> String { "kodlike.log".into() }

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            width: default_world_width(),
            height: default_world_height(),
            tile_width: default_tile(),
            tile_height: default_tile(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer {
            speed: default_player_speed(),
            size: default_actor_size(),
        }
    }
}

impl Default for TomlEnemies {
    fn default() -> Self {
        TomlEnemies {
            count: default_enemy_count(),
            speed_min: default_enemy_speed_min(),
            speed_max: default_enemy_speed_max(),
            detection_min: default_detection_min(),
            detection_max: default_detection_max(),
            lose_aggro_min: default_lose_aggro_min(),
            lose_aggro_max: default_lose_aggro_max(),
            size: default_actor_size(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            frame_ms: default_frame_ms(),
            music: default_music(),
            seed: None,
            log_file: default_log_file(),
        }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            world: WorldConfig {
                width: t.world.width,
                height: t.world.height,
                tile_width: t.world.tile_width,
                tile_height: t.world.tile_height,
            },
            player: PlayerConfig {
                speed: t.player.speed,
                size: t.player.size,
            },
            enemies: EnemyConfig {
                count: t.enemies.count,
                speed_min: t.enemies.speed_min,
                speed_max: t.enemies.speed_max,
                detection_min: t.enemies.detection_min,
                detection_max: t.enemies.detection_max,
                lose_aggro_min: t.enemies.lose_aggro_min,
                lose_aggro_max: t.enemies.lose_aggro_max,
                size: t.enemies.size,
            },
            frame_ms: t.general.frame_ms,
            music: t.general.music,
            seed: t.general.seed,
            log_file: PathBuf::from(t.general.log_file),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// No file anywhere is not an error: defaults are returned.
    pub fn load() -> Result<Self, ConfigError> {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }
            let text = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
            return Self::from_toml_str(&text);
        }
        Ok(Self::default())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: TomlConfig = toml::from_str(text)?;
        let cfg = GameConfig::from(raw);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the game cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        if w.tile_width == 0 || w.tile_height == 0
            || w.tile_width > w.width || w.tile_height > w.height
        {
            return Err(ConfigError::TileSize {
                width: w.width,
                height: w.height,
                tile_width: w.tile_width,
                tile_height: w.tile_height,
            });
        }

        let e = &self.enemies;
        check_range("enemies.speed", e.speed_min, e.speed_max)?;
        check_range("enemies.detection", e.detection_min, e.detection_max)?;
        check_range("enemies.lose_aggro", e.lose_aggro_min, e.lose_aggro_max)?;
        if e.lose_aggro_min <= e.detection_max {
            return Err(ConfigError::Hysteresis {
                detection_max: e.detection_max,
                lose_aggro_min: e.lose_aggro_min,
            });
        }

        check_positive("player.speed", self.player.speed)?;
        check_positive("player.size", self.player.size)?;
        check_positive("enemies.size", e.size)?;

        if self.frame_ms == 0 {
            return Err(ConfigError::ZeroFrame);
        }
        Ok(())
    }
}

fn check_range(field: &'static str, min: u32, max: u32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::EmptyRange { field, min, max });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

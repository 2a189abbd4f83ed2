use crate::color::{Color, Spectrum, SpectrumError};
use crate::power::PowerSettings;
use crate::sprite::{HerdSettings, NekoSettings};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything that can be tuned, loaded from YAML. Every field has a default, so an empty file is valid.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub display: DisplayConfig,
    pub sprite: SpriteConfig,
    pub herd: HerdConfig,
    pub spectrum: SpectrumConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Display width in pixels
    pub width: i32,
    /// Display height in pixels
    pub height: i32,
    /// Brightness while active, in `[0, 1]`
    pub brightness: f32,
    /// Brightness change per tick while dimming or restoring
    pub brightness_step: f32,
    /// Seconds without a touch before dimming
    pub active_time: f64,
    /// Seconds to stay dark before waking on its own
    pub sleep_time: f64,
    /// Fraction of the brightness applied to the indicator LED
    pub indicator_scale: f32,
    pub background_color: Color,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            brightness: 0.2,
            brightness_step: 0.01,
            active_time: 60.0,
            sleep_time: 120.0,
            indicator_scale: 0.2,
            background_color: Color::from_rgb24(0x007070),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    pub tile_size: i32,
    pub step_size: i32,
    /// Lower is more likely to stop and clean or sleep
    pub stop_chance: usize,
    /// Lower is more likely to start moving after scratching
    pub start_chance: usize,
    /// Seconds
    pub min_scratch_time: f64,
    /// Seconds between animation frames
    pub animation_time: f64,
    /// Seconds each Neko's animation time may be offset by
    pub animation_jitter: f64,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            step_size: 10,
            stop_chance: 30,
            start_chance: 10,
            min_scratch_time: 2.0,
            animation_time: 0.3,
            animation_jitter: 0.15,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HerdConfig {
    pub quantity: usize,
    pub colors: Vec<Color>,
    /// Seconds between accepted touches
    pub touch_cooldown: f64,
    pub laser_dot_color: Color,
}

impl Default for HerdConfig {
    fn default() -> Self {
        let herd = HerdSettings::default();
        Self {
            quantity: herd.quantity,
            colors: herd.colors,
            touch_cooldown: herd.touch_cooldown.as_secs_f64(),
            laser_dot_color: Color::from_rgb24(0xFF0000),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpectrumConfig {
    pub colors: Vec<Color>,
    /// `normal` or `light`
    pub mode: String,
    pub gamma: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            colors: [0xFF0000, 0xFFFF00, 0x00FF00, 0x00FFFF, 0x0000FF, 0xFF00FF]
                .into_iter()
                .map(Color::from_rgb24)
                .collect(),
            mode: "normal".to_string(),
            gamma: 0.55,
        }
    }
}

impl Config {
    /// Read and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Load `path` if given, otherwise the default config file if it exists, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // an empty document deserializes as unit, not as an empty map
        let config: Self = if contents.trim().is_empty() { Self::default() } else { serde_yaml::from_str(contents)? };
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/neko/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "neko").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sprite = &self.sprite;
        let display = &self.display;
        if sprite.tile_size <= 0 {
            return Err(ConfigError::Invalid("sprite.tile_size must be positive".into()));
        }
        if sprite.step_size <= 0 {
            return Err(ConfigError::Invalid("sprite.step_size must be positive".into()));
        }
        if sprite.stop_chance == 0 || sprite.start_chance == 0 {
            return Err(ConfigError::Invalid("sprite chances must be at least 1".into()));
        }
        // walls pin a tile one pixel in from each edge
        if display.width < sprite.tile_size + 2 || display.height < sprite.tile_size + 2 {
            return Err(ConfigError::Invalid(format!(
                "display {}x{} is too small for {} pixel tiles",
                display.width, display.height, sprite.tile_size
            )));
        }
        if !(0.0..=1.0).contains(&display.brightness) {
            return Err(ConfigError::Invalid("display.brightness must be within [0, 1]".into()));
        }
        if display.brightness_step <= 0.0 || display.brightness_step.is_nan() {
            return Err(ConfigError::Invalid("display.brightness_step must be positive".into()));
        }
        for (name, seconds) in [
            ("display.active_time", display.active_time),
            ("display.sleep_time", display.sleep_time),
            ("sprite.min_scratch_time", sprite.min_scratch_time),
            ("sprite.animation_time", sprite.animation_time),
            ("sprite.animation_jitter", sprite.animation_jitter),
            ("herd.touch_cooldown", self.herd.touch_cooldown),
        ] {
            if !(seconds.is_finite() && seconds >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be a non-negative number of seconds")));
            }
        }
        self.build_spectrum()?;
        Ok(())
    }

    pub fn display_size(&self) -> (i32, i32) {
        (self.display.width, self.display.height)
    }

    pub fn neko_settings(&self) -> NekoSettings {
        NekoSettings {
            tile_size: self.sprite.tile_size,
            step_size: self.sprite.step_size,
            stop_chance: self.sprite.stop_chance,
            start_chance: self.sprite.start_chance,
            min_scratch_time: seconds(self.sprite.min_scratch_time),
            animation_period: seconds(self.sprite.animation_time),
        }
    }

    pub fn herd_settings(&self) -> HerdSettings {
        HerdSettings {
            quantity: self.herd.quantity,
            colors: self.herd.colors.clone(),
            touch_cooldown: seconds(self.herd.touch_cooldown),
            animation_jitter: seconds(self.sprite.animation_jitter),
        }
    }

    pub fn power_settings(&self) -> PowerSettings {
        PowerSettings {
            max_brightness: self.display.brightness,
            brightness_step: self.display.brightness_step,
            active_time: seconds(self.display.active_time),
            sleep_time: seconds(self.display.sleep_time),
            indicator_scale: self.display.indicator_scale,
        }
    }

    pub fn build_spectrum(&self) -> Result<Spectrum, SpectrumError> {
        Spectrum::with_mode_name(&self.spectrum.colors, &self.spectrum.mode, self.spectrum.gamma)
    }
}

/// Values too large for a `Duration` saturate. Negative or NaN values are rejected by `validate`.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

/// Errors that can occur when loading the configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid spectrum: {0}")]
    Spectrum(#[from] SpectrumError),
}

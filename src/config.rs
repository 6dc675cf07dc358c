use dirs::home_dir;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::animation::machine::{DEFAULT_SPEED_MS, clamp_speed};
use crate::diagram_layout::LayoutDimensions;
use crate::errors::ConfigError;

/// Environment variable overriding the data directory (absolute paths only).
pub const DATA_DIR_ENV: &str = "SQLSCOPE_DATA_DIR";

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerPreferences {
    /// Tick interval of the animation, 500..=3000 ms.
    pub speed_ms: u64,
    pub canvas_width: f32,
    pub table_width: f32,
    pub table_height: f32,
    pub padding: f32,
}

impl Default for VisualizerPreferences {
    fn default() -> Self {
        let dims = LayoutDimensions::default();
        Self {
            speed_ms: DEFAULT_SPEED_MS,
            canvas_width: 960.0,
            table_width: dims.table_width,
            table_height: dims.table_height,
            padding: dims.padding,
        }
    }
}

impl VisualizerPreferences {
    pub fn layout_dimensions(&self) -> LayoutDimensions {
        LayoutDimensions {
            table_width: self.table_width,
            table_height: self.table_height,
            padding: self.padding,
        }
    }

    /// Pulls out-of-range values back to something usable.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.speed_ms = clamp_speed(self.speed_ms);
        if !(self.canvas_width.is_finite() && self.canvas_width > 0.0) {
            self.canvas_width = defaults.canvas_width;
        }
        if !(self.table_width.is_finite() && self.table_width > 0.0) {
            self.table_width = defaults.table_width;
        }
        if !(self.table_height.is_finite() && self.table_height > 0.0) {
            self.table_height = defaults.table_height;
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            self.padding = defaults.padding;
        }
        self
    }
}

pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at [`get_data_dir`].
    pub fn new() -> Self {
        Self {
            dir: get_data_dir(),
        }
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(PREFERENCES_FILE)
    }

    /// Missing or unreadable preferences fall back to defaults.
    pub fn load(&self) -> VisualizerPreferences {
        match self.try_load() {
            Ok(prefs) => {
                info!(
                    "Loaded prefs from {}: speed_ms={}, canvas_width={}, table={}x{}, padding={}",
                    self.path().display(),
                    prefs.speed_ms,
                    prefs.canvas_width,
                    prefs.table_width,
                    prefs.table_height,
                    prefs.padding
                );
                prefs
            }
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("No preferences at {}, using defaults", self.path().display());
                VisualizerPreferences::default()
            }
            Err(e) => {
                log::warn!("Ignoring preferences ({}), using defaults", e);
                VisualizerPreferences::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<VisualizerPreferences, ConfigError> {
        let path = self.path();
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
        let prefs: VisualizerPreferences = serde_json::from_str(&content)?;
        Ok(prefs.sanitized())
    }

    pub fn save(&self, prefs: &VisualizerPreferences) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir).map_err(|source| ConfigError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path();
        let content = serde_json::to_string_pretty(prefs)?;
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        info!(
            "Saved prefs to {}: speed_ms={}, canvas_width={}",
            path.display(),
            prefs.speed_ms,
            prefs.canvas_width
        );
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Default data directory in the home folder.
fn get_default_data_dir() -> PathBuf {
    if let Some(mut hd) = home_dir() {
        hd.push(".sqlscope");
        hd
    } else {
        PathBuf::from(".sqlscope")
    }
}

pub fn get_data_dir() -> PathBuf {
    // Custom data directory from the environment first
    if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
        let path = PathBuf::from(custom_dir);
        if path.is_absolute() {
            return path;
        }
        log::warn!("{} must be an absolute path, ignoring {}", DATA_DIR_ENV, path.display());
    }
    get_default_data_dir()
}

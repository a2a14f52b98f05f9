use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::dataset::loader::SessionType;
use crate::errors::ViewerError;
use crate::projection::{DEFAULT_SCENE_SCALE, ViewMode};

const CONFIG_DIR_NAME: &str = "raceplay";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TRACK_DECIMATION: usize = 5;
pub const DEFAULT_CANVAS_PADDING: f64 = 50.;
pub const DEFAULT_SCENE_ZOOM: f64 = 0.8;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub default_year: u32,
    pub default_round: u32,
    pub default_session: SessionType,
    /// Every Nth outline point is drawn, the first point is always kept
    pub track_decimation: usize,
    pub canvas_padding: f64,
    /// Raw units to scene units
    pub scene_scale: f64,
    /// Screen pixels per scene unit in the Scene view
    pub scene_zoom: f64,
    pub view_mode: ViewMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_year: 2024,
            default_round: 1,
            default_session: SessionType::Race,
            track_decimation: DEFAULT_TRACK_DECIMATION,
            canvas_padding: DEFAULT_CANVAS_PADDING,
            scene_scale: DEFAULT_SCENE_SCALE,
            scene_zoom: DEFAULT_SCENE_ZOOM,
            view_mode: ViewMode::Canvas,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, ViewerError> {
        Ok(dirs::config_dir()
            .ok_or(ViewerError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Reads the config from the user's config directory. `Ok(None)` when there is no config
    /// file yet.
    pub fn from_local_file() -> Result<Option<Self>, ViewerError> {
        Self::from_path(&Self::default_path()?)
    }

    pub fn from_path(config_path: &Path) -> Result<Option<Self>, ViewerError> {
        if !config_path.exists() {
            debug!("No config file at {}", config_path.display());
            return Ok(None);
        }

        let file =
            std::fs::File::open(config_path).map_err(|e| ViewerError::ConfigIO { source: e })?;
        let config: AppConfig =
            serde_json::from_reader(file).map_err(|e| ViewerError::ConfigParse { source: e })?;
        Ok(Some(config.sanitized()))
    }

    pub fn save(&self) -> Result<(), ViewerError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), ViewerError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ViewerError::ConfigIO { source: e })?;
        }

        let file =
            std::fs::File::create(config_path).map_err(|e| ViewerError::ConfigIO { source: e })?;
        serde_json::to_writer_pretty(file, self).map_err(|e| ViewerError::ConfigParse { source: e })
    }

    fn sanitized(mut self) -> Self {
        if self.track_decimation == 0 {
            warn!("track_decimation must be at least 1, using 1");
            self.track_decimation = 1;
        }
        if !self.canvas_padding.is_finite() || self.canvas_padding < 0. {
            warn!(
                "Invalid canvas_padding {}, using {}",
                self.canvas_padding, DEFAULT_CANVAS_PADDING
            );
            self.canvas_padding = DEFAULT_CANVAS_PADDING;
        }
        if !self.scene_scale.is_finite() || self.scene_scale <= 0. {
            warn!(
                "Invalid scene_scale {}, using {}",
                self.scene_scale, DEFAULT_SCENE_SCALE
            );
            self.scene_scale = DEFAULT_SCENE_SCALE;
        }
        if !self.scene_zoom.is_finite() || self.scene_zoom <= 0. {
            warn!(
                "Invalid scene_zoom {}, using {}",
                self.scene_zoom, DEFAULT_SCENE_ZOOM
            );
            self.scene_zoom = DEFAULT_SCENE_ZOOM;
        }
        self
    }
}

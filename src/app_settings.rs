use std::fs::File;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fc_config::settings::FeatureSet;
use fc_config::{Capabilities, SensorModel, Target};

/// Host side description of the board whose settings image is being edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// settings image used if none is given on the command line
    pub image_path: Option<PathBuf>,
    pub board_identifier: String,
    pub capabilities: Capabilities,
    pub default_rx_feature: FeatureSet,
    pub sensor: SensorModel,
}

impl Default for AppSettings {
    fn default() -> Self {
        let target = Target::default();
        Self {
            image_path: None,
            board_identifier: target.board_identifier.to_string(),
            capabilities: target.capabilities,
            default_rx_feature: target.default_rx_feature,
            sensor: SensorModel::default(),
        }
    }
}

impl AppSettings {
    fn config_dir() -> Result<PathBuf, Error> {
        let project_dirs = directories::ProjectDirs::from("org", "fcconf", "fcconf")
            .ok_or_else(|| Error::new(ErrorKind::NotFound, "No home directory found."))?;
        let config_dir = project_dirs.config_dir();
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
        }

        Ok(config_dir.to_path_buf())
    }

    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::config_dir()?.join("config.json"))
    }

    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let f = File::open(path)?;
        let config = serde_json::from_reader(f)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::config_dir()?.join("config.json"))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let f = File::create(path)?;
        serde_json::to_writer_pretty(f, self)?;
        Ok(())
    }

    /// Replaces the given values, leaving the others as they are.
    pub fn update(&mut self, image: Option<PathBuf>, sensor: Option<SensorModel>, board: Option<String>) {
        if image.is_some() {
            self.image_path = image;
        }
        if let Some(sensor) = sensor {
            self.sensor = sensor;
        }
        if let Some(board) = board {
            self.board_identifier = board;
        }
    }

    pub fn target(&self) -> Target {
        let mut target = Target::new(&self.board_identifier, self.capabilities);
        target.default_rx_feature = self.default_rx_feature;
        target
    }
}

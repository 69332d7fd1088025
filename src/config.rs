use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::InkReplayError;
use crate::codec::{DocumentStyle, SegmentationConfig};
use crate::kinematics::ChartConfig;

const CONFIG_DIR_NAME: &str = "inkreplay";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub segmentation: SegmentationConfig,
    pub style: DocumentStyle,
    pub charts: ChartConfig,
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, InkReplayError> {
        Ok(dirs::config_dir()
            .ok_or(InkReplayError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Config from the user's config directory, `None` when nothing was saved yet
    pub fn from_local_file() -> Result<Option<Self>, InkReplayError> {
        let Ok(config_path) = Self::default_path() else {
            return Ok(None);
        };

        if config_path.exists() {
            Self::from_file(&config_path).map(Some)
        } else {
            debug!("No config file at {:?}, using defaults", config_path);
            Ok(None)
        }
    }

    pub fn from_file(config_path: &Path) -> Result<Self, InkReplayError> {
        let file = std::fs::File::open(config_path)
            .map_err(|e| InkReplayError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| InkReplayError::ConfigSerializeError { source: e })
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), InkReplayError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InkReplayError::ConfigIOError { source: e })?;
            }
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| InkReplayError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| InkReplayError::ConfigSerializeError { source: e })
    }
}

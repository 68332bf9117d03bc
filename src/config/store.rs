use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Optional settings file looked up inside the data directory.
pub const CONFIG_FILE_NAME: &str = "gatehouse.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    /// Database file name, relative to `data_dir`.
    pub db_file: String,
}

impl StoreConfig {
    /// Loads `gatehouse.toml` from `data_dir` if present. The data directory
    /// always comes from the caller, whatever the file says.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let path = data_dir.join(CONFIG_FILE_NAME);

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str::<StoreConfig>(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?
        } else {
            Self::default()
        };

        if config.db_file.trim().is_empty() {
            return Err(Error::Config("db_file cannot be empty".to_string()));
        }

        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            db_file: "gatehouse.db".to_string(),
        }
    }
}

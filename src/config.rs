use anyhow::{Context, Result};
use std::path::PathBuf;

/// Where the wellness document lives on disk.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("bem")
        });

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        Ok(Config { data_dir })
    }

    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join("wellness.json")
    }
}

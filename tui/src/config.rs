use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use ud_core::{BatchConfig, DEFAULT_CSV_NAME, DictionaryConfig};

pub const DICTIONARY_ENV: &str = "DICTIONARY_CSV";
pub const LOG_ENV: &str = "DICTIONARY_LOG";

#[derive(Debug, Parser)]
#[command(name = "urdu-dictionary", version, about = "English to Urdu dictionary")]
pub struct Cli {
    /// CSV file with an `English,Urdu` header row
    #[arg(long, value_name = "PATH")]
    pub dictionary: Option<PathBuf>,

    /// Config file (defaults to config.toml in the data directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub no_sound: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub sound_enabled: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub dictionary: DictionaryConfig,
    pub batch: BatchConfig,
    pub feedback: FeedbackConfig,
}

/// Reads `path`, writing the defaults there first if it does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    } else {
        let cfg = ConfigFile::default();
        let content = toml::to_string_pretty(&cfg)?;
        fs::write(path, content).with_context(|| format!("writing config {}", path.display()))?;
        Ok(cfg)
    }
}

/// Flag, then environment, then config file, then the data directory.
pub fn resolve_dictionary_path(
    flag: Option<&Path>,
    env: Option<String>,
    config: &DictionaryConfig,
    data_dir: &Path,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = env.filter(|value| !value.trim().is_empty()) {
        return PathBuf::from(path);
    }
    config
        .path
        .clone()
        .unwrap_or_else(|| data_dir.join(DEFAULT_CSV_NAME))
}

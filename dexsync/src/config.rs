use dexsync_common::database::{DataFiles, FileNames};
use dexsync_common::utils::filter::ExclusionRules;
use dexsync_common::utils::sanitize::default_price_fields;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write config file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FileLog {
    pub enabled: bool,
    pub path: String,
}

impl Default for FileLog {
    fn default() -> FileLog {
        FileLog {
            enabled: false,
            path: "dexsync.log".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Log {
    pub level: String,
    pub file: FileLog,
}

impl Default for Log {
    fn default() -> Log {
        Log {
            level: "info".to_string(),
            file: FileLog::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Api {
    /// Includes the language, e.g. `https://api.tcgdex.net/v2/pt`.
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub request_delay_ms: u64,
    pub page_size: usize,
    pub max_pages: usize,
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for Api {
    fn default() -> Api {
        Api {
            base_url: "https://api.tcgdex.net/v2/pt".to_string(),
            user_agent: format!("dexsync/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
            request_delay_ms: 500,
            page_size: 100,
            max_pages: 200,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Data {
    pub dir: String,
    pub files: FileNames,
}

impl Default for Data {
    fn default() -> Data {
        Data {
            dir: "assets/data".to_string(),
            files: FileNames::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Sanitize {
    pub fields: Vec<String>,
}

impl Default for Sanitize {
    fn default() -> Sanitize {
        Sanitize {
            fields: default_price_fields(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log: Log,
    pub api: Api,
    pub data: Data,
    pub sanitize: Sanitize,
    pub exclude: ExclusionRules,
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

impl Config {
    pub fn new() -> Config {
        Config {
            log: Log::default(),
            api: Api::default(),
            data: Data::default(),
            sanitize: Sanitize::default(),
            exclude: ExclusionRules::mega_evolution(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string(&self)?;
        fs::write(path, toml).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, writing the defaults there first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
        if path.exists() {
            return Config::load(path);
        }
        let config = Config::new();
        config.save(path)?;
        Ok(config)
    }

    /// Dataset paths, with `dir_override` taking precedence over `data.dir`.
    pub fn data_files(&self, dir_override: Option<&Path>) -> DataFiles {
        let dir = match dir_override {
            Some(dir) => dir.to_path_buf(),
            None => Path::new(&self.data.dir).to_path_buf(),
        };
        DataFiles::new(&dir, &self.data.files)
    }
}

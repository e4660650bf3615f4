// src/config.rs
use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use toml;

const CONFIG_FILE_NAME: &str = "wifi_admin_config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Argon2Params {
    pub m_cost: u32, // KiB
    pub t_cost: u32, // iterations
    pub p_cost: u32, // parallelism
}

impl Default for Argon2Params {
    fn default() -> Self {
        Argon2Params {
            m_cost: 19456, // 19 MiB
            t_cost: 2,
            p_cost: 1,
        }
    }
}

/// The single admin account the session store accepts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdminConfig {
    pub username: String,
    pub display_name: String,
    /// Seeded secret; replaced in memory on the first password change.
    pub initial_password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        AdminConfig {
            username: "admin".to_string(),
            display_name: "Admin User".to_string(),
            initial_password: "admin123".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub admin: AdminConfig,
    pub argon2_params: Argon2Params,
    #[serde(default = "default_seed_demo_clients")]
    pub seed_demo_clients: bool,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_seed_demo_clients() -> bool {
    true
}

fn default_tick_rate_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Config {
            admin: AdminConfig::default(),
            argon2_params: Argon2Params::default(),
            seed_demo_clients: default_seed_demo_clients(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "WifiAdmin", "WifiAdmin")
        .map(|proj_dirs| proj_dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn save_default_config(config_path: &Path, config: &Config) -> Result<(), String> {
    info!("Attempting to save default config to {:?}", config_path);
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)
                .map_err(|e| format!("Failed to create config directory {:?}: {}", parent_dir, e))?;
            info!("Created config directory: {:?}", parent_dir);
        }
    }

    let toml_string = toml::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize default config to TOML: {}", e))?;

    let mut file = fs::File::create(config_path)
        .map_err(|e| format!("Failed to create default config file {:?}: {}", config_path, e))?;

    file.write_all(toml_string.as_bytes())
        .map_err(|e| format!("Failed to write default config to {:?}: {}", config_path, e))?;

    info!("Saved default configuration to {:?}", config_path);
    Ok(())
}

/// Loads an explicitly requested config file. Unlike [`load_config`],
/// a missing or broken file is an error rather than a silent fallback.
pub fn load_config_from(config_path: &Path) -> ConfigResult<Config> {
    info!("Loading configuration from {:?}", config_path);
    let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: config_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Loads the config from the platform config dir, creating it with defaults
/// on first run. Any read or parse problem falls back to defaults.
pub fn load_config() -> Config {
    let Some(config_path) = get_config_path() else {
        warn!("Could not determine config directory. Using default configuration.");
        return Config::default();
    };
    load_or_create(&config_path)
}

fn load_or_create(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(
            "Config file not found at {:?}. Creating and using default configuration.",
            config_path
        );
        let default_config = Config::default();
        if let Err(e) = save_default_config(config_path, &default_config) {
            warn!("Failed to save default configuration: {}", e);
        }
        return default_config;
    }

    match load_config_from(config_path) {
        Ok(loaded_config) => {
            info!("Configuration loaded successfully.");
            loaded_config
        }
        Err(e) => {
            warn!("{}. Using default configuration.", e);
            Config::default()
        }
    }
}

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

// Define the path for the settings file (relative to the working directory)
const SETTINGS_FILENAME: &str = "app_settings.json";

/// PancakeSwap V2 factory on BSC mainnet.
pub const PANCAKE_V2_FACTORY: &str = "0xcA143Ce32Fe78f1f7019d7d551a6402fC5350c73";
/// Wrapped BNB on BSC mainnet.
pub const WBNB_ADDRESS: &str = "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c";

/// Settings file location: the working directory when a settings file exists
/// there, otherwise `~/.bnb-snipe/`.
pub fn get_settings_path() -> PathBuf {
    let local = PathBuf::from(SETTINGS_FILENAME);
    if local.exists() {
        return local;
    }
    match dirs::home_dir() {
        Some(home) => home.join(".bnb-snipe").join(SETTINGS_FILENAME),
        None => local,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSettings {
    // Backend bot service
    pub bot_service_url: String,
    // Chain access
    pub bsc_rpc_url: String,
    #[serde(default = "default_pancake_factory")]
    pub pancake_factory: String,
    #[serde(default = "default_wbnb_address")]
    pub wbnb_address: String,

    // Wallet set file
    pub wallets_path: String,
    #[serde(default = "default_max_sub_wallets")]
    pub max_sub_wallets: usize,

    // Default behavior
    pub default_slippage_percent: f64,
    #[serde(default = "default_jitter_percent")]
    pub distribution_jitter_percent: f64,
    #[serde(default = "default_fee_reserve_bnb")]
    pub fee_reserve_bnb: f64,

    // Timing
    #[serde(default = "default_refresh_window_secs")]
    pub refresh_window_secs: u64,
    #[serde(default = "default_settlement_delay_secs")]
    pub settlement_delay_secs: u64,
    #[serde(default = "default_post_execution_delay_secs")]
    pub post_execution_delay_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_pancake_factory() -> String {
    PANCAKE_V2_FACTORY.to_string()
}

fn default_wbnb_address() -> String {
    WBNB_ADDRESS.to_string()
}

fn default_max_sub_wallets() -> usize {
    50
}

fn default_jitter_percent() -> f64 {
    15.0
}

fn default_fee_reserve_bnb() -> f64 {
    0.0005
}

fn default_refresh_window_secs() -> u64 {
    5
}

fn default_settlement_delay_secs() -> u64 {
    3
}

fn default_post_execution_delay_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            bot_service_url: "http://localhost:3001/api".to_string(),
            bsc_rpc_url: "https://bsc-dataseed.binance.org".to_string(),
            pancake_factory: default_pancake_factory(),
            wbnb_address: default_wbnb_address(),
            wallets_path: "./wallets.json".to_string(),
            max_sub_wallets: default_max_sub_wallets(),
            default_slippage_percent: 10.0,
            distribution_jitter_percent: default_jitter_percent(),
            fee_reserve_bnb: default_fee_reserve_bnb(),
            refresh_window_secs: default_refresh_window_secs(),
            settlement_delay_secs: default_settlement_delay_secs(),
            post_execution_delay_secs: default_post_execution_delay_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppSettings {
    /// Loads settings from the JSON file, or returns default if it doesn't exist or fails.
    pub fn load() -> Self {
        let path = get_settings_path();
        info!("Attempting to load settings from: {}", path.display());
        match File::open(&path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read settings file '{}': {}. Using default settings.", path.display(), e);
                    return AppSettings::default();
                }
                match serde_json::from_str(&contents) {
                    Ok(settings) => {
                        info!("Successfully loaded settings from {}", path.display());
                        settings
                    }
                    Err(e) => {
                        warn!("Failed to parse settings file '{}': {}. Using default settings.", path.display(), e);
                        AppSettings::default()
                    }
                }
            }
            Err(_) => {
                info!("Settings file '{}' not found. Using default settings.", path.display());
                AppSettings::default()
            }
        }
    }

    /// Saves the current settings to the JSON file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        info!("Attempting to save settings to: {}", path.display());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory: {}", parent.display()))?;
            }
        }
        let json_string = serde_json::to_string_pretty(self)
            .context("Failed to serialize settings to JSON")?;

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create or open settings file for writing: {}", path.display()))?;

        file.write_all(json_string.as_bytes())
            .with_context(|| format!("Failed to write settings to file: {}", path.display()))?;

        info!("Successfully saved settings to {}", path.display());
        Ok(())
    }
}

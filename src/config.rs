use crate::errors::{Result, SniperError};
use crate::models::settings::AppSettings;
use crate::utils::normalize_address;
use dotenv::dotenv;
use log::{debug, info};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_service_url: String,
    pub bsc_rpc_url: String,
    pub pancake_factory: String,
    pub wbnb_address: String,
    pub wallets_path: String,
    pub max_sub_wallets: usize,
    pub slippage_percent: f64,
    /// Per-wallet jitter applied to token distribution, as a fraction (0.15 = ±15%).
    pub distribution_jitter: f64,
    pub fee_reserve_bnb: f64,
    pub refresh_window: Duration,
    pub settlement_delay: Duration,
    pub post_execution_delay: Duration,
    pub request_timeout: Duration,
}

impl Config {
    /// Builds the runtime config from `app_settings.json`, letting environment
    /// variables (and `.env`) override the endpoints.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        info!("Loading configuration from settings file and environment.");
        let settings = AppSettings::load();
        let config = Self::from_settings(&settings)?.with_env_overrides();
        debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        if !(0.0..100.0).contains(&settings.distribution_jitter_percent) {
            return Err(SniperError::Config(format!(
                "distribution_jitter_percent must be within [0, 100): {}",
                settings.distribution_jitter_percent
            )));
        }
        if settings.max_sub_wallets == 0 {
            return Err(SniperError::Config("max_sub_wallets must be positive".to_string()));
        }
        Ok(Config {
            bot_service_url: settings.bot_service_url.trim_end_matches('/').to_string(),
            bsc_rpc_url: settings.bsc_rpc_url.clone(),
            pancake_factory: normalize_address(&settings.pancake_factory)?,
            wbnb_address: normalize_address(&settings.wbnb_address)?,
            wallets_path: settings.wallets_path.clone(),
            max_sub_wallets: settings.max_sub_wallets,
            slippage_percent: settings.default_slippage_percent,
            distribution_jitter: settings.distribution_jitter_percent / 100.0,
            fee_reserve_bnb: settings.fee_reserve_bnb,
            refresh_window: Duration::from_secs(settings.refresh_window_secs),
            settlement_delay: Duration::from_secs(settings.settlement_delay_secs),
            post_execution_delay: Duration::from_secs(settings.post_execution_delay_secs),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        })
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("BOT_SERVICE_URL") {
            self.bot_service_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = env::var("BSC_RPC_URL") {
            self.bsc_rpc_url = url;
        }
        if let Ok(path) = env::var("WALLETS_PATH") {
            self.wallets_path = path;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::from_settings(&AppSettings::default())
            .expect("Failed to build config from default settings")
    }
}

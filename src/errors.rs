use thiserror::Error;

use crate::models::fault::InsufficientFundsFault;

#[derive(Error, Debug)]
pub enum SniperError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    InsufficientFunds(InsufficientFundsFault),

    #[error("Insufficient liquidity in the pool. Try a smaller amount or wait for more liquidity to be added.")]
    InsufficientLiquidity,

    #[error("Price impact too high. Try a smaller amount or increase slippage tolerance.")]
    SlippageExceeded,

    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    #[error("{0}")]
    Backend(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl SniperError {
    /// The structured fault carried by this error, if any.
    pub fn fault(&self) -> Option<&InsufficientFundsFault> {
        match self {
            SniperError::InsufficientFunds(fault) => Some(fault),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SniperError>;

impl From<anyhow::Error> for SniperError {
    fn from(err: anyhow::Error) -> Self {
        SniperError::Generic(err.to_string())
    }
}

pub mod bot_service; // REST client for the backend bot service
pub mod chain; // JSON-RPC reads against a BSC node

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::api::{
    ActionResponse, AddLiquidityRequest, BatchResponse, BundleRequest, CollectBnbRequest,
    DistributeRequest, EstimateFeesResponse, LiquidityPercentageRequest, LiquidityResponse,
    MultiWalletTradeRequest, PoolInfo, SingleWalletBuyRequest, SingleWalletSellRequest,
};
use crate::models::wallet::WalletBalance;

pub use bot_service::HttpBotService;
pub use chain::RpcChainReader;

/// Backend that estimates, simulates and executes bundles and per-wallet trades.
///
/// Transport problems come back as `Err`. A request the backend processed but
/// rejected comes back as `Ok` with `success == false` and the raw error text,
/// which callers classify.
#[async_trait]
pub trait BotService: Send + Sync {
    async fn estimate_fees(&self, request: &BundleRequest) -> Result<EstimateFeesResponse>;
    async fn distribute_bnb(&self, request: &DistributeRequest) -> Result<ActionResponse>;
    async fn simulate_bundle(&self, request: &BundleRequest) -> Result<ActionResponse>;
    async fn execute_bundle(&self, request: &BundleRequest) -> Result<ActionResponse>;
    async fn single_wallet_buy(&self, request: &SingleWalletBuyRequest) -> Result<ActionResponse>;
    async fn single_wallet_sell(&self, request: &SingleWalletSellRequest) -> Result<ActionResponse>;
    async fn multi_wallet_buy(&self, request: &MultiWalletTradeRequest) -> Result<BatchResponse>;
    async fn multi_wallet_sell(&self, request: &MultiWalletTradeRequest) -> Result<BatchResponse>;
    async fn collect_bnb(&self, request: &CollectBnbRequest) -> Result<BatchResponse>;
}

/// Liquidity mutations signed by the backend on behalf of the main wallet.
#[async_trait]
pub trait LiquidityManager: Send + Sync {
    async fn add_liquidity(&self, request: &AddLiquidityRequest) -> Result<LiquidityResponse>;
    async fn remove_liquidity(&self, request: &LiquidityPercentageRequest) -> Result<LiquidityResponse>;
    async fn burn_liquidity(&self, request: &LiquidityPercentageRequest) -> Result<LiquidityResponse>;
}

/// Read-only chain access.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native and (when `token_address` is given) token balances, one entry per
    /// address that could be read.
    async fn fetch_balances(&self, addresses: &[String], token_address: Option<&str>) -> Result<Vec<WalletBalance>>;
    /// `None` when no token/WBNB pair exists yet.
    async fn pool_info(&self, token_address: &str) -> Result<Option<PoolInfo>>;
    async fn lp_balance(&self, token_address: &str, owner: &str) -> Result<f64>;
}

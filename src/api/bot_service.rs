use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::api::{BotService, LiquidityManager};
use crate::config::Config;
use crate::errors::{Result, SniperError};
use crate::models::api::{
    ActionResponse, AddLiquidityRequest, BatchResponse, BundleRequest, CollectBnbRequest,
    DistributeRequest, EstimateFeesResponse, LiquidityPercentageRequest, LiquidityResponse,
    MultiWalletTradeRequest, SingleWalletBuyRequest, SingleWalletSellRequest,
};

const ESTIMATE_FEES_PATH: &str = "/bot/estimate-fees";
const DISTRIBUTE_BNB_PATH: &str = "/bot/distribute-bnb";
const SIMULATE_PATH: &str = "/bot/simulate";
const EXECUTE_PATH: &str = "/bot/execute";
const SINGLE_BUY_PATH: &str = "/bot/single-wallet-buy";
const SINGLE_SELL_PATH: &str = "/bot/single-wallet-sell";
const MULTI_BUY_PATH: &str = "/bot/multi-wallet-buy";
const MULTI_SELL_PATH: &str = "/bot/multi-wallet-sell";
const COLLECT_BNB_PATH: &str = "/bot/collect-bnb";
const ADD_LIQUIDITY_PATH: &str = "/liquidity/add";
const REMOVE_LIQUIDITY_PATH: &str = "/liquidity/remove";
const BURN_LIQUIDITY_PATH: &str = "/liquidity/burn";

pub struct HttpBotService {
    client: Client,
    base_url: String,
}

impl HttpBotService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(HttpBotService { client, base_url: config.bot_service_url.clone() })
    }

    async fn post_json<Req, Resp>(&self, path: &str, payload: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Calling bot service: {}", url);

        let response = self.client.post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&url, e))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                SniperError::Api(format!("Unexpected response from {}: {} (body: {})", url, e, body))
            })
        } else {
            error!("Bot service error ({}) on {}: {}", status, url, body);
            Err(SniperError::Api(extract_error_message(&body).unwrap_or_else(|| {
                format!("Request to {} failed with status {}: {}", path, status, body)
            })))
        }
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> SniperError {
    if e.is_timeout() {
        SniperError::Timeout(format!("Request to {} timed out", url))
    } else {
        SniperError::Http(e)
    }
}

/// Pulls `error` / `message` out of a JSON error body so the raw backend text
/// reaches the failure classifier.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
}

#[async_trait]
impl BotService for HttpBotService {
    async fn estimate_fees(&self, request: &BundleRequest) -> Result<EstimateFeesResponse> {
        self.post_json(ESTIMATE_FEES_PATH, request).await
    }

    async fn distribute_bnb(&self, request: &DistributeRequest) -> Result<ActionResponse> {
        self.post_json(DISTRIBUTE_BNB_PATH, request).await
    }

    async fn simulate_bundle(&self, request: &BundleRequest) -> Result<ActionResponse> {
        self.post_json(SIMULATE_PATH, request).await
    }

    async fn execute_bundle(&self, request: &BundleRequest) -> Result<ActionResponse> {
        self.post_json(EXECUTE_PATH, request).await
    }

    async fn single_wallet_buy(&self, request: &SingleWalletBuyRequest) -> Result<ActionResponse> {
        self.post_json(SINGLE_BUY_PATH, request).await
    }

    async fn single_wallet_sell(&self, request: &SingleWalletSellRequest) -> Result<ActionResponse> {
        self.post_json(SINGLE_SELL_PATH, request).await
    }

    async fn multi_wallet_buy(&self, request: &MultiWalletTradeRequest) -> Result<BatchResponse> {
        self.post_json(MULTI_BUY_PATH, request).await
    }

    async fn multi_wallet_sell(&self, request: &MultiWalletTradeRequest) -> Result<BatchResponse> {
        self.post_json(MULTI_SELL_PATH, request).await
    }

    async fn collect_bnb(&self, request: &CollectBnbRequest) -> Result<BatchResponse> {
        self.post_json(COLLECT_BNB_PATH, request).await
    }
}

#[async_trait]
impl LiquidityManager for HttpBotService {
    async fn add_liquidity(&self, request: &AddLiquidityRequest) -> Result<LiquidityResponse> {
        self.post_json(ADD_LIQUIDITY_PATH, request).await
    }

    async fn remove_liquidity(&self, request: &LiquidityPercentageRequest) -> Result<LiquidityResponse> {
        self.post_json(REMOVE_LIQUIDITY_PATH, request).await
    }

    async fn burn_liquidity(&self, request: &LiquidityPercentageRequest) -> Result<LiquidityResponse> {
        self.post_json(BURN_LIQUIDITY_PATH, request).await
    }
}

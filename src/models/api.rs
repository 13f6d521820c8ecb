// Request/response shapes of the backend bot service.
use serde::{Deserialize, Serialize};

use crate::models::reconciliation::{PoolSimulationSnapshot, Reserves};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    pub deposit_wallet: String,
    pub sub_wallets: Vec<String>,
    pub token_amounts: Vec<u64>,
    pub token_address: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletFeeEstimate {
    pub address: String,
    #[serde(default)]
    pub bnb_to_spend: f64,
    #[serde(default)]
    pub bnb_needed: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolSimulationDto {
    pub reserve_bnb_before: f64,
    pub reserve_token_before: f64,
    pub reserve_bnb_after: f64,
    pub reserve_token_after: f64,
    #[serde(default)]
    pub price_impact: Option<f64>,
}

impl From<PoolSimulationDto> for PoolSimulationSnapshot {
    fn from(dto: PoolSimulationDto) -> Self {
        let before = Reserves { native: dto.reserve_bnb_before, token: dto.reserve_token_before };
        let after = Reserves { native: dto.reserve_bnb_after, token: dto.reserve_token_after };
        let mut snapshot = PoolSimulationSnapshot::from_reserves(before, after);
        if let Some(impact) = dto.price_impact {
            snapshot.price_impact_percent = impact;
        }
        snapshot
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimateFeesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub wallets: Vec<WalletFeeEstimate>,
    #[serde(default)]
    pub total_bnb_needed: f64,
    #[serde(default)]
    pub total_for_distribution: f64,
    #[serde(default)]
    pub gas_cost: f64,
    #[serde(default)]
    pub tip_amount: Option<f64>,
    #[serde(default)]
    pub liquidity_amount: Option<f64>,
    #[serde(default)]
    pub pool_simulation: Option<PoolSimulationDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributeRequest {
    pub deposit_wallet: String,
    pub sub_wallets: Vec<String>,
    pub amounts: Vec<f64>,
}

/// Generic success/error envelope used by most mutating endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        ActionResponse { success: true, ..Default::default() }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ActionResponse { success: false, error: Some(error.into()), ..Default::default() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SingleWalletBuyRequest {
    pub wallet_address: String,
    pub token_address: String,
    pub spend_rate_percentage: u8,
    pub slippage_tolerance: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SingleWalletSellRequest {
    pub wallet_address: String,
    pub token_address: String,
    pub sell_percentage: u8,
    pub slippage_tolerance: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletPercentage {
    pub address: String,
    pub percentage: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MultiWalletTradeRequest {
    pub wallets: Vec<WalletPercentage>,
    pub token_address: String,
    pub slippage_tolerance: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectBnbRequest {
    pub deposit_wallet: String,
    pub sub_wallets: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletOperationResult {
    pub address: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Vec<WalletOperationResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityRequest {
    pub token_address: String,
    pub signer: String,
    pub token_amount: f64,
    pub bnb_amount: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityPercentageRequest {
    pub token_address: String,
    pub signer: String,
    pub percentage: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub token_amount: Option<f64>,
    #[serde(default)]
    pub bnb_amount: Option<f64>,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// PancakeSwap V2 pool state for a token/WBNB pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub pair_address: String,
    pub reserves: Reserves,
    pub lp_total_supply: f64,
    pub token_decimals: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_response_tolerates_missing_optionals() {
        let raw = r#"{
            "success": true,
            "wallets": [{"address": "0x1", "bnbToSpend": 0.1, "bnbNeeded": 0.05}],
            "totalBnbNeeded": 0.2,
            "totalForDistribution": 0.05,
            "gasCost": 0.001
        }"#;
        let parsed: EstimateFeesResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.wallets[0].bnb_needed, 0.05);
        assert!(parsed.tip_amount.is_none());
        assert!(parsed.pool_simulation.is_none());
    }

    #[test]
    fn pool_dto_keeps_backend_price_impact() {
        let dto = PoolSimulationDto {
            reserve_bnb_before: 10.0,
            reserve_token_before: 100.0,
            reserve_bnb_after: 12.0,
            reserve_token_after: 80.0,
            price_impact: Some(4.2),
        };
        let snap: PoolSimulationSnapshot = dto.into();
        assert_eq!(snap.price_impact_percent, 4.2);
        assert_eq!(snap.before.native, 10.0);
    }
}

use serde::{Deserialize, Serialize};

/// Reserve pair of the token/WBNB pool (native side first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reserves {
    pub native: f64,
    pub token: f64,
}

impl Reserves {
    /// Native per token, `None` for an empty pool.
    pub fn price(&self) -> Option<f64> {
        if self.token > 0.0 {
            Some(self.native / self.token)
        } else {
            None
        }
    }
}

/// Informational before/after view of the pool for the planned buys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSimulationSnapshot {
    pub before: Reserves,
    pub after: Reserves,
    pub price_impact_percent: f64,
}

impl PoolSimulationSnapshot {
    /// Builds a snapshot, deriving price impact from the reserve prices.
    pub fn from_reserves(before: Reserves, after: Reserves) -> Self {
        let price_impact_percent = match (before.price(), after.price()) {
            (Some(p0), Some(p1)) if p0 > 0.0 => (p1 - p0) / p0 * 100.0,
            _ => 0.0,
        };
        PoolSimulationSnapshot { before, after, price_impact_percent }
    }
}

/// Where the required native currency goes. Replaced wholesale by every
/// estimation, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub total_native_needed: f64,
    pub total_for_distribution: f64,
    pub gas_cost: f64,
    pub tip_amount: Option<f64>,
    pub liquidity_amount: Option<f64>,
    pub sufficient_balance: bool,
    pub pool_simulation: Option<PoolSimulationSnapshot>,
}

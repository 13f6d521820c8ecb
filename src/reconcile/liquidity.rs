use log::info;

use super::{ActionContext, GenericAs, ReconciliationEngine};
use crate::errors::{Result, SniperError};
use crate::ledger::WalletLedger;
use crate::models::api::{AddLiquidityRequest, LiquidityPercentageRequest, LiquidityResponse, PoolInfo};
use crate::models::OperationStatus;

impl ReconciliationEngine {
    pub async fn pool_info(&self, token_address: &str) -> Result<Option<PoolInfo>> {
        self.reader.pool_info(token_address).await
    }

    /// LP tokens the main wallet holds for the token's pair.
    pub async fn main_lp_balance(&self, ledger: &WalletLedger, token_address: &str) -> Result<f64> {
        let main = ledger
            .main_wallet()
            .ok_or_else(|| SniperError::Wallet("No main wallet loaded".to_string()))?;
        self.reader.lp_balance(token_address, &main.address).await
    }

    fn main_signer(ctx: &mut ActionContext<'_>) -> Result<String> {
        *ctx.fault = None;
        ctx.ledger
            .main_wallet()
            .map(|w| w.address.clone())
            .ok_or_else(|| SniperError::Wallet("No main wallet loaded".to_string()))
    }

    pub async fn add_liquidity(
        &self,
        ctx: &mut ActionContext<'_>,
        token_address: &str,
        token_amount: f64,
        bnb_amount: f64,
    ) -> Result<LiquidityResponse> {
        if token_amount <= 0.0 || bnb_amount <= 0.0 {
            return Err(SniperError::InvalidInput("Token and BNB amounts must be positive".to_string()));
        }
        let signer = Self::main_signer(ctx)?;
        let request = AddLiquidityRequest { token_address: token_address.to_string(), signer: signer.clone(), token_amount, bnb_amount };
        self.notify(OperationStatus::Started(format!("Adding {} tokens + {} BNB liquidity", token_amount, bnb_amount)));
        let outcome = self.liquidity.add_liquidity(&request).await;
        self.finish_liquidity(ctx, &signer, outcome, "Add liquidity")
    }

    pub async fn remove_liquidity(&self, ctx: &mut ActionContext<'_>, token_address: &str, percentage: u8) -> Result<LiquidityResponse> {
        let request = self.percentage_request(ctx, token_address, percentage)?;
        self.notify(OperationStatus::Started(format!("Removing {}% of liquidity", percentage)));
        let outcome = self.liquidity.remove_liquidity(&request).await;
        self.finish_liquidity(ctx, &request.signer, outcome, "Remove liquidity")
    }

    /// Sends LP tokens to the dead address. Irreversible.
    pub async fn burn_liquidity(&self, ctx: &mut ActionContext<'_>, token_address: &str, percentage: u8) -> Result<LiquidityResponse> {
        let request = self.percentage_request(ctx, token_address, percentage)?;
        self.notify(OperationStatus::Started(format!("Burning {}% of LP tokens", percentage)));
        let outcome = self.liquidity.burn_liquidity(&request).await;
        self.finish_liquidity(ctx, &request.signer, outcome, "Burn liquidity")
    }

    fn percentage_request(&self, ctx: &mut ActionContext<'_>, token_address: &str, percentage: u8) -> Result<LiquidityPercentageRequest> {
        if !(1..=100).contains(&percentage) {
            return Err(SniperError::InvalidInput(format!("Percentage must be between 1 and 100, got {}", percentage)));
        }
        let signer = Self::main_signer(ctx)?;
        Ok(LiquidityPercentageRequest { token_address: token_address.to_string(), signer, percentage })
    }

    fn finish_liquidity(
        &self,
        ctx: &mut ActionContext<'_>,
        signer: &str,
        outcome: Result<LiquidityResponse>,
        label: &str,
    ) -> Result<LiquidityResponse> {
        match outcome {
            Ok(resp) if resp.success => {
                info!("{} confirmed: {:?}", label, resp.tx_hash);
                self.notify(OperationStatus::Success(format!("{} succeeded", label)));
                Ok(resp)
            }
            Ok(resp) => {
                let raw = resp.error.unwrap_or_else(|| format!("{} failed", label));
                Err(self.fail(ctx, &raw, Some(signer), GenericAs::Backend))
            }
            Err(e) => Err(self.fail_with(ctx, e, Some(signer), GenericAs::Backend)),
        }
    }
}

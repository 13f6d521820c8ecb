//! Per-wallet buys/sells and the batch variants over selected wallets.

use log::{info, warn};
use std::collections::HashMap;

use super::failures::{classify_failure, FailureKind};
use super::{ActionContext, GenericAs, ReconciliationEngine};
use crate::errors::{Result, SniperError};
use crate::models::api::{
    ActionResponse, BatchResponse, CollectBnbRequest, MultiWalletTradeRequest, SingleWalletBuyRequest,
    SingleWalletSellRequest, WalletOperationResult, WalletPercentage,
};
use crate::models::fault::InsufficientFundsFault;
use crate::models::OperationStatus;
use crate::utils::short_address;

#[derive(Debug, Clone, PartialEq)]
pub struct WalletFailure {
    pub address: String,
    pub kind: FailureKind,
    pub fault: Option<InsufficientFundsFault>,
}

impl WalletFailure {
    pub fn message(&self) -> String {
        match &self.fault {
            Some(fault) => fault.to_string(),
            None => self.kind.user_message(),
        }
    }
}

/// Tally of a batch operation; one wallet failing doesn't fail the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub successful: usize,
    pub failed: usize,
    pub failures: Vec<WalletFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Buy,
    Sell,
    CollectNative,
}

impl BatchAction {
    fn label(&self) -> &'static str {
        match self {
            BatchAction::Buy => "Multi-wallet buy",
            BatchAction::Sell => "Multi-wallet sell",
            BatchAction::CollectNative => "BNB collection",
        }
    }
}

impl ReconciliationEngine {
    fn prepare_single(&self, ctx: &mut ActionContext<'_>, address: &str) -> Result<String> {
        *ctx.fault = None;
        let wallet = ctx.ledger
            .get_mut(address)
            .ok_or_else(|| SniperError::Wallet(format!("Unknown wallet: {}", address)))?;
        wallet.clear_transient_needs();
        Ok(wallet.address.clone())
    }

    fn finish_single(&self, ctx: &mut ActionContext<'_>, address: &str, outcome: Result<ActionResponse>, label: &str) -> Result<ActionResponse> {
        match outcome {
            Ok(resp) if resp.success => {
                self.notify(OperationStatus::Success(format!("{} succeeded for {}", label, address)));
                Ok(resp)
            }
            Ok(resp) => {
                let raw = resp.error.unwrap_or_else(|| format!("{} failed", label));
                Err(self.fail(ctx, &raw, Some(address), GenericAs::Backend))
            }
            Err(e) => Err(self.fail_with(ctx, e, Some(address), GenericAs::Backend)),
        }
    }

    /// Buys with one wallet, spending its `spend_rate_percentage` of BNB.
    pub async fn single_wallet_buy(&self, ctx: &mut ActionContext<'_>, token_address: &str, address: &str) -> Result<ActionResponse> {
        let address = self.prepare_single(ctx, address)?;
        let spend_rate_percentage = ctx.ledger.get(&address).map(|w| w.spend_rate_percentage).unwrap_or(100);
        let request = SingleWalletBuyRequest {
            wallet_address: address.clone(),
            token_address: token_address.to_string(),
            spend_rate_percentage,
            slippage_tolerance: self.settings.slippage_percent,
        };
        self.notify(OperationStatus::Started(format!("Buying with {} ({}% of BNB)", address, spend_rate_percentage)));
        let outcome = self.service.single_wallet_buy(&request).await;
        self.finish_single(ctx, &address, outcome, "Buy")
    }

    /// Sells `sell_percentage` of one wallet's tokens.
    pub async fn single_wallet_sell(&self, ctx: &mut ActionContext<'_>, token_address: &str, address: &str) -> Result<ActionResponse> {
        let address = self.prepare_single(ctx, address)?;
        let sell_percentage = ctx.ledger.get(&address).map(|w| w.sell_percentage).unwrap_or(100);
        let request = SingleWalletSellRequest {
            wallet_address: address.clone(),
            token_address: token_address.to_string(),
            sell_percentage,
            slippage_tolerance: self.settings.slippage_percent,
        };
        self.notify(OperationStatus::Started(format!("Selling {}% from {}", sell_percentage, address)));
        let outcome = self.service.single_wallet_sell(&request).await;
        self.finish_single(ctx, &address, outcome, "Sell")
    }

    pub async fn multi_wallet_buy(&self, ctx: &mut ActionContext<'_>, token_address: &str) -> Result<BatchOutcome> {
        self.run_batch(ctx, token_address, BatchAction::Buy).await
    }

    pub async fn multi_wallet_sell(&self, ctx: &mut ActionContext<'_>, token_address: &str) -> Result<BatchOutcome> {
        self.run_batch(ctx, token_address, BatchAction::Sell).await
    }

    /// Sweeps BNB from the selected sniping wallets back to the main wallet.
    pub async fn collect_native(&self, ctx: &mut ActionContext<'_>) -> Result<BatchOutcome> {
        self.run_batch(ctx, "", BatchAction::CollectNative).await
    }

    async fn run_batch(&self, ctx: &mut ActionContext<'_>, token_address: &str, action: BatchAction) -> Result<BatchOutcome> {
        let selected: Vec<(String, u8, u8)> = ctx.ledger
            .selected_wallets()
            .into_iter()
            .map(|w| (w.address.clone(), w.spend_rate_percentage, w.sell_percentage))
            .collect();
        if selected.is_empty() {
            return Err(SniperError::InvalidInput("No wallets selected".to_string()));
        }

        *ctx.fault = None;
        let addresses: Vec<String> = selected.iter().map(|(a, _, _)| a.clone()).collect();
        ctx.ledger.clear_needs_for(&addresses);

        self.notify(OperationStatus::Started(format!("{} over {} wallets", action.label(), selected.len())));

        let outcome = match action {
            BatchAction::Buy | BatchAction::Sell => {
                let wallets = selected
                    .iter()
                    .map(|(address, spend, sell)| WalletPercentage {
                        address: address.clone(),
                        percentage: if action == BatchAction::Buy { *spend } else { *sell },
                    })
                    .collect();
                let request = MultiWalletTradeRequest {
                    wallets,
                    token_address: token_address.to_string(),
                    slippage_tolerance: self.settings.slippage_percent,
                };
                if action == BatchAction::Buy {
                    self.service.multi_wallet_buy(&request).await
                } else {
                    self.service.multi_wallet_sell(&request).await
                }
            }
            BatchAction::CollectNative => {
                let deposit_wallet = ctx.ledger
                    .main_wallet()
                    .map(|w| w.address.clone())
                    .ok_or_else(|| SniperError::Wallet("No main wallet loaded".to_string()))?;
                let request = CollectBnbRequest { deposit_wallet, sub_wallets: addresses.clone() };
                self.service.collect_bnb(&request).await
            }
        };

        let response = match outcome {
            Ok(resp) => resp,
            Err(e) => return Err(self.fail_with(ctx, e, None, GenericAs::Backend)),
        };
        if response.results.is_empty() && !response.success {
            let raw = response.error.unwrap_or_else(|| format!("{} failed", action.label()));
            return Err(self.fail(ctx, &raw, None, GenericAs::Backend));
        }

        let tally = self.tally_batch(ctx, &addresses, response);
        info!("{}: {} succeeded, {} failed", action.label(), tally.successful, tally.failed);
        self.notify(OperationStatus::BatchSummary {
            label: action.label().to_string(),
            successful: tally.successful,
            failed: tally.failed,
        });
        Ok(tally)
    }

    /// Re-classifies each per-wallet error and attaches shortfall faults to
    /// the wallets they belong to. The session fault ends up as the last one.
    /// Every selected wallet is counted once; a wallet the backend said nothing
    /// about counts as failed.
    fn tally_batch(&self, ctx: &mut ActionContext<'_>, selected: &[String], response: BatchResponse) -> BatchOutcome {
        let mut reported: HashMap<String, WalletOperationResult> = HashMap::new();
        for result in response.results {
            let key = result.address.trim().to_ascii_lowercase();
            if !selected.iter().any(|a| a.eq_ignore_ascii_case(&key)) {
                warn!("Ignoring result for unselected wallet {}", result.address);
                continue;
            }
            reported.entry(key).or_insert(result);
        }

        let mut tally = BatchOutcome::default();
        for address in selected {
            let kind = match reported.remove(&address.to_ascii_lowercase()) {
                Some(result) if result.success => {
                    tally.successful += 1;
                    continue;
                }
                Some(result) => classify_failure(&result.error.unwrap_or_else(|| "Unknown error".to_string())),
                None => FailureKind::Generic("No result returned".to_string()),
            };
            tally.failed += 1;
            let fault = if kind.is_funds_shortfall() {
                self.record_failure(ctx, &kind, Some(address.as_str()))
            } else {
                None
            };
            let failure = WalletFailure { address: address.clone(), kind, fault };
            match &failure.fault {
                Some(fault) => self.notify(OperationStatus::Fault(fault.clone())),
                None => self.notify(OperationStatus::Log(format!("{}: {}", short_address(address), failure.message()))),
            }
            tally.failures.push(failure);
        }
        tally
    }
}

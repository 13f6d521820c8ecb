//! One operator session: the wizard, the wallet ledger, the current estimate
//! and the engine that acts on them. Built when a dialog opens and dropped
//! when it closes.

use log::{info, warn};
use std::sync::Arc;

use crate::errors::{Result, SniperError};
use crate::ledger::{RefreshOutcome, WalletLedger};
use crate::models::api::{ActionResponse, LiquidityResponse, PoolInfo};
use crate::models::fault::InsufficientFundsFault;
use crate::models::reconciliation::ReconciliationResult;
use crate::models::wallet::WalletEntry;
use crate::reconcile::{
    ActionContext, BatchOutcome, DistributionAmounts, DistributionOutcome, ExecutionOutcome, ReconciliationEngine,
};
use crate::utils::normalize_address;
use crate::wizard::presets::SnipePreset;
use crate::wizard::{gates, WizardDialog, WizardLayout, WizardMode, WizardSession, WizardStep};

pub type SnipeDialog = WizardDialog<SnipeSession>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Last operator-facing message, kept for renderers that redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub struct SnipeSession {
    wizard: WizardSession,
    ledger: WalletLedger,
    reconciliation: Option<ReconciliationResult>,
    engine: Arc<ReconciliationEngine>,
    token_address: Option<String>,
    distribution_jitter: f64,
    last_notice: Option<Notice>,
}

impl SnipeSession {
    pub fn new(layout: WizardLayout, engine: Arc<ReconciliationEngine>, max_sub_wallets: usize, distribution_jitter: f64) -> Self {
        SnipeSession {
            wizard: WizardSession::new(layout),
            ledger: WalletLedger::new(max_sub_wallets),
            reconciliation: None,
            engine,
            token_address: None,
            distribution_jitter,
            last_notice: None,
        }
    }

    pub fn wizard(&self) -> &WizardSession {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut WizardSession {
        &mut self.wizard
    }

    pub fn ledger(&self) -> &WalletLedger {
        &self.ledger
    }

    pub fn reconciliation(&self) -> Option<&ReconciliationResult> {
        self.reconciliation.as_ref()
    }

    pub fn fault(&self) -> Option<&InsufficientFundsFault> {
        self.wizard.insufficient_funds_fault.as_ref()
    }

    pub fn token_address(&self) -> Option<&str> {
        self.token_address.as_deref()
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.last_notice.as_ref()
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    fn context(&mut self) -> ActionContext<'_> {
        ActionContext {
            ledger: &mut self.ledger,
            reconciliation: &mut self.reconciliation,
            fault: &mut self.wizard.insufficient_funds_fault,
        }
    }

    fn require_token(&self) -> Result<String> {
        self.token_address
            .clone()
            .ok_or_else(|| SniperError::InvalidInput("No token address set".to_string()))
    }

    /// Drops the estimate so simulate/execute need a fresh one.
    fn invalidate(&mut self) {
        if self.reconciliation.take().is_some() {
            info!("Inputs changed; previous fee estimate discarded");
        }
        self.wizard.simulation_passed = false;
    }

    fn note<T>(&mut self, outcome: &Result<T>, success: impl FnOnce(&T) -> String) {
        self.last_notice = Some(match outcome {
            Ok(value) => Notice { level: NoticeLevel::Success, message: success(value) },
            Err(e) => Notice { level: NoticeLevel::Error, message: e.to_string() },
        });
    }

    pub fn set_token_address(&mut self, token_address: &str) -> Result<()> {
        let normalized = normalize_address(token_address)?;
        if self.token_address.as_deref() != Some(normalized.as_str()) {
            self.token_address = Some(normalized);
            self.invalidate();
        }
        Ok(())
    }

    pub fn set_wallets(&mut self, entries: Vec<WalletEntry>) -> Result<()> {
        self.ledger.set_wallets(entries)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_planned_amount(&mut self, address: &str, amount: u64) -> Result<()> {
        self.ledger.set_planned_amount(address, amount)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_sell_percentage(&mut self, address: &str, percentage: u8) -> Result<()> {
        self.ledger.set_sell_percentage(address, percentage)
    }

    pub fn set_spend_rate_percentage(&mut self, address: &str, percentage: u8) -> Result<()> {
        self.ledger.set_spend_rate_percentage(address, percentage)
    }

    pub fn set_selected(&mut self, address: &str, selected: bool) -> Result<bool> {
        self.ledger.set_selected(address, selected)
    }

    pub fn select_all_eligible(&mut self) -> usize {
        self.ledger.select_all_eligible()
    }

    /// Jittered split of `total_tokens` over the first `wallet_count` sniping wallets.
    pub fn plan_distribution(&mut self, total_tokens: u64, wallet_count: usize) -> Result<Vec<u64>> {
        let plan = self.ledger.apply_token_distribution(total_tokens, wallet_count, self.distribution_jitter)?;
        self.invalidate();
        Ok(plan)
    }

    /// Applies a preset's plan and percentages, then jumps to wallet setup.
    pub fn apply_preset(&mut self, preset: &SnipePreset) -> Result<()> {
        let available = self.ledger.sub_count();
        if available == 0 {
            return Err(SniperError::Wallet("Load sniping wallets before applying a preset".to_string()));
        }
        let wallet_count = preset.wallet_count.min(available);
        if wallet_count < preset.wallet_count {
            warn!(
                "Preset '{}' wants {} wallets, using the {} loaded",
                preset.name, preset.wallet_count, available
            );
        }
        self.plan_distribution(preset.total_tokens, wallet_count)?;
        for wallet in self.ledger.sub_wallets_mut() {
            wallet.spend_rate_percentage = preset.spend_rate_percentage;
            wallet.sell_percentage = preset.sell_percentage;
        }
        self.wizard.set_mode(WizardMode::Preset);
        self.wizard.jump_to(WizardStep::WalletSetup);
        self.last_notice = Some(Notice {
            level: NoticeLevel::Info,
            message: format!("Preset '{}' applied to {} wallets", preset.name, wallet_count),
        });
        Ok(())
    }

    pub fn can_advance(&self) -> bool {
        gates::can_advance(&self.ledger, self.reconciliation.as_ref(), &self.wizard)
    }

    pub fn can_estimate(&self) -> bool {
        self.token_address.is_some() && gates::can_estimate(&self.ledger)
    }

    pub fn can_distribute(&self) -> bool {
        gates::can_distribute(&self.ledger, self.reconciliation.as_ref())
    }

    pub fn can_simulate(&self) -> bool {
        gates::can_simulate(&self.ledger, self.reconciliation.as_ref())
    }

    pub fn can_execute(&self) -> bool {
        gates::can_execute(&self.ledger, self.reconciliation.as_ref())
    }

    pub fn can_batch_operate(&self) -> bool {
        gates::can_batch_operate(&self.ledger)
    }

    pub async fn refresh_balances(&mut self) -> Result<RefreshOutcome> {
        let engine = Arc::clone(&self.engine);
        let token = self.token_address.clone();
        let mut ctx = self.context();
        engine.refresh_balances(&mut ctx, token.as_deref()).await
    }

    pub async fn estimate_fees(&mut self) -> Result<ReconciliationResult> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        self.wizard.simulation_passed = false;
        let outcome = {
            let mut ctx = self.context();
            engine.estimate_fees(&mut ctx, &token).await
        };
        self.note(&outcome, |r| {
            if r.sufficient_balance {
                format!("Estimate ready: {:.6} BNB needed", r.total_native_needed)
            } else {
                format!("Estimate ready but wallets hold less than the {:.6} BNB needed", r.total_native_needed)
            }
        });
        outcome
    }

    pub async fn distribute(&mut self, amounts: DistributionAmounts) -> Result<DistributionOutcome> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        self.wizard.simulation_passed = false;
        let outcome = {
            let mut ctx = self.context();
            engine.distribute_native(&mut ctx, &token, amounts).await
        };
        self.note(&outcome, |o| format!("Distributed {:.6} BNB", o.total_sent));
        outcome
    }

    pub async fn simulate(&mut self) -> Result<()> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.simulate(&mut ctx, &token).await
        };
        self.wizard.simulation_passed = outcome.is_ok();
        self.note(&outcome, |_| "Simulation passed".to_string());
        outcome
    }

    /// Executes the bundle. Refused unless the execute gate is open.
    pub async fn execute(&mut self) -> Result<ExecutionOutcome> {
        let token = self.require_token()?;
        if !self.can_execute() {
            return Err(SniperError::InvalidInput(
                "Execution not ready: estimate fees and fund every sniping wallet first".to_string(),
            ));
        }
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.execute(&mut ctx, &token).await
        };
        if outcome.is_ok() {
            self.wizard.executed = true;
        }
        self.note(&outcome, |o| match &o.tx_hash {
            Some(hash) => format!("Bundle executed: {}", hash),
            None => "Bundle executed".to_string(),
        });
        outcome
    }

    pub async fn single_wallet_buy(&mut self, address: &str) -> Result<ActionResponse> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.single_wallet_buy(&mut ctx, &token, address).await
        };
        self.note(&outcome, |_| format!("Buy submitted for {}", address));
        outcome
    }

    pub async fn single_wallet_sell(&mut self, address: &str) -> Result<ActionResponse> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.single_wallet_sell(&mut ctx, &token, address).await
        };
        self.note(&outcome, |_| format!("Sell submitted for {}", address));
        outcome
    }

    pub async fn multi_wallet_buy(&mut self) -> Result<BatchOutcome> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.multi_wallet_buy(&mut ctx, &token).await
        };
        self.note(&outcome, batch_summary);
        outcome
    }

    pub async fn multi_wallet_sell(&mut self) -> Result<BatchOutcome> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.multi_wallet_sell(&mut ctx, &token).await
        };
        self.note(&outcome, batch_summary);
        outcome
    }

    pub async fn collect_native(&mut self) -> Result<BatchOutcome> {
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.collect_native(&mut ctx).await
        };
        self.note(&outcome, batch_summary);
        outcome
    }

    pub async fn pool_info(&self) -> Result<Option<PoolInfo>> {
        let token = self.require_token()?;
        self.engine.pool_info(&token).await
    }

    pub async fn add_liquidity(&mut self, token_amount: f64, bnb_amount: f64) -> Result<LiquidityResponse> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.add_liquidity(&mut ctx, &token, token_amount, bnb_amount).await
        };
        self.note(&outcome, |_| "Liquidity added".to_string());
        outcome
    }

    pub async fn remove_liquidity(&mut self, percentage: u8) -> Result<LiquidityResponse> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.remove_liquidity(&mut ctx, &token, percentage).await
        };
        self.note(&outcome, |_| format!("Removed {}% of liquidity", percentage));
        outcome
    }

    pub async fn burn_liquidity(&mut self, percentage: u8) -> Result<LiquidityResponse> {
        let token = self.require_token()?;
        let engine = Arc::clone(&self.engine);
        let outcome = {
            let mut ctx = self.context();
            engine.burn_liquidity(&mut ctx, &token, percentage).await
        };
        self.note(&outcome, |_| format!("Burned {}% of LP tokens", percentage));
        outcome
    }
}

fn batch_summary(outcome: &BatchOutcome) -> String {
    format!("{} succeeded, {} failed", outcome.successful, outcome.failed)
}

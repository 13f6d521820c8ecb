//! Fee estimation, BNB distribution, bundle simulation/execution and the
//! per-wallet trade actions, all driven against the wallet ledger.
//!
//! Every action catches backend failures at its own boundary: the raw text is
//! classified, any wallet shortfall is written into the ledger as a fault, a
//! status is emitted for the operator, and a classified error is returned.

pub mod failures;
pub mod liquidity;
pub mod trade;

pub use trade::{BatchAction, BatchOutcome, WalletFailure};

use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;

use crate::api::{BotService, ChainReader, LiquidityManager};
use crate::config::Config;
use crate::errors::{Result, SniperError};
use crate::ledger::{BalanceRefresher, RefreshOutcome, WalletLedger};
use crate::models::api::{BundleRequest, DistributeRequest};
use crate::models::fault::InsufficientFundsFault;
use crate::models::reconciliation::{PoolSimulationSnapshot, ReconciliationResult};
use crate::models::wallet::WalletRole;
use crate::models::OperationStatus;

use failures::{classify_failure, FailureKind};

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub slippage_percent: f64,
    pub fee_reserve_bnb: f64,
    pub settlement_delay: Duration,
    pub post_execution_delay: Duration,
    pub refresh_window: Duration,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        EngineSettings {
            slippage_percent: config.slippage_percent,
            fee_reserve_bnb: config.fee_reserve_bnb,
            settlement_delay: config.settlement_delay,
            post_execution_delay: config.post_execution_delay,
            refresh_window: config.refresh_window,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings::from(&Config::default())
    }
}

/// Mutable state an action works on, borrowed out of the owning session.
pub struct ActionContext<'a> {
    pub ledger: &'a mut WalletLedger,
    pub reconciliation: &'a mut Option<ReconciliationResult>,
    pub fault: &'a mut Option<InsufficientFundsFault>,
}

/// Which amounts a distribution sends to each sniping wallet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistributionAmounts {
    /// Each wallet's estimated `native_needed`.
    Needed,
    /// The same flat amount to every sniping wallet.
    Flat(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionOutcome {
    pub total_sent: f64,
    pub amounts: Vec<f64>,
    /// Result of the post-settlement re-estimation, if it succeeded.
    pub reestimate: Option<ReconciliationResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub tx_hash: Option<String>,
    pub message: Option<String>,
}

/// How an unrecognised failure is reported.
#[derive(Debug, Clone, Copy)]
enum GenericAs {
    Backend,
    Simulation,
}

pub struct ReconciliationEngine {
    service: Arc<dyn BotService>,
    reader: Arc<dyn ChainReader>,
    liquidity: Arc<dyn LiquidityManager>,
    refresher: BalanceRefresher,
    settings: EngineSettings,
    status_sender: Option<UnboundedSender<OperationStatus>>,
}

impl ReconciliationEngine {
    pub fn new(
        service: Arc<dyn BotService>,
        reader: Arc<dyn ChainReader>,
        liquidity: Arc<dyn LiquidityManager>,
        settings: EngineSettings,
    ) -> Self {
        let refresher = BalanceRefresher::new(settings.refresh_window);
        ReconciliationEngine { service, reader, liquidity, refresher, settings, status_sender: None }
    }

    pub fn with_status_sender(mut self, sender: UnboundedSender<OperationStatus>) -> Self {
        self.status_sender = Some(sender);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn refresher(&self) -> &BalanceRefresher {
        &self.refresher
    }

    fn notify(&self, status: OperationStatus) {
        match &status {
            OperationStatus::Failure(msg) => error!("{}", msg),
            OperationStatus::Fault(fault) => warn!("{}", fault),
            OperationStatus::Log(line) => warn!("{}", line),
            other => info!("{:?}", other),
        }
        if let Some(sender) = &self.status_sender {
            if let Err(e) = sender.send(status) {
                warn!("Status receiver dropped: {}", e);
            }
        }
    }

    pub async fn refresh_balances(&self, ctx: &mut ActionContext<'_>, token_address: Option<&str>) -> Result<RefreshOutcome> {
        ctx.ledger.refresh_balances(&self.refresher, self.reader.as_ref(), token_address).await
    }

    fn bundle_request(ledger: &WalletLedger, token_address: &str) -> Result<BundleRequest> {
        let main = ledger.main_wallet()
            .ok_or_else(|| SniperError::Wallet("No main wallet loaded".to_string()))?;
        if ledger.sub_count() == 0 {
            return Err(SniperError::Wallet("No sniping wallets loaded".to_string()));
        }
        if !ledger.has_positive_plan() {
            return Err(SniperError::InvalidInput("No sniping wallet has a planned token amount".to_string()));
        }
        Ok(BundleRequest {
            deposit_wallet: main.address.clone(),
            sub_wallets: ledger.sub_addresses(),
            token_amounts: ledger.planned_amounts(),
            token_address: token_address.to_string(),
        })
    }

    /// Estimates what every sniping wallet needs for the current plan.
    ///
    /// Always starts from a clean slate: all need/shortfall fields, the fault
    /// and the previous result are cleared before the call.
    pub async fn estimate_fees(&self, ctx: &mut ActionContext<'_>, token_address: &str) -> Result<ReconciliationResult> {
        ctx.ledger.clear_transient_needs();
        *ctx.fault = None;
        *ctx.reconciliation = None;

        let request = Self::bundle_request(ctx.ledger, token_address)?;
        self.notify(OperationStatus::Started("Estimating fees".to_string()));

        let response = match self.service.estimate_fees(&request).await {
            Ok(resp) if resp.success => resp,
            Ok(resp) => {
                let raw = resp.error.unwrap_or_else(|| "Fee estimation failed".to_string());
                return Err(self.fail(ctx, &raw, None, GenericAs::Backend));
            }
            Err(e) => return Err(self.fail_with(ctx, e, None, GenericAs::Backend)),
        };

        for estimate in &response.wallets {
            match ctx.ledger.get_mut(&estimate.address) {
                Some(wallet) if wallet.is_sub() => {
                    wallet.native_to_spend = estimate.bnb_to_spend.max(0.0);
                    wallet.native_needed = estimate.bnb_needed.max(0.0);
                    wallet.native_shortfall = (wallet.native_needed - wallet.native_balance).max(0.0);
                }
                Some(_) => {}
                None => warn!("Estimate returned unknown wallet {}", estimate.address),
            }
        }

        let (main_address, main_balance) = match ctx.ledger.main_wallet() {
            Some(main) => (main.address.clone(), main.native_balance),
            None => return Err(SniperError::Wallet("No main wallet loaded".to_string())),
        };
        let covered = main_balance + ctx.ledger.total_sub_native_balance();
        let sufficient_balance = covered + EPSILON >= response.total_bnb_needed;

        let result = ReconciliationResult {
            total_native_needed: response.total_bnb_needed,
            total_for_distribution: response.total_for_distribution,
            gas_cost: response.gas_cost,
            tip_amount: response.tip_amount,
            liquidity_amount: response.liquidity_amount,
            sufficient_balance,
            pool_simulation: response.pool_simulation.map(PoolSimulationSnapshot::from),
        };

        if !sufficient_balance {
            let fault = InsufficientFundsFault::new(main_address.clone(), Some(WalletRole::Main), covered, response.total_bnb_needed);
            if let Some(main) = ctx.ledger.get_mut(&main_address) {
                main.fault = Some(fault.clone());
            }
            *ctx.fault = Some(fault.clone());
            self.notify(OperationStatus::Fault(fault));
        } else {
            self.notify(OperationStatus::Success(format!(
                "Fees estimated: {:.6} BNB needed in total, {:.6} BNB to distribute",
                result.total_native_needed, result.total_for_distribution
            )));
        }

        *ctx.reconciliation = Some(result.clone());
        Ok(result)
    }

    /// Sends BNB from the main wallet to the sniping wallets, waits for
    /// settlement, then refreshes balances and re-estimates.
    pub async fn distribute_native(
        &self,
        ctx: &mut ActionContext<'_>,
        token_address: &str,
        amounts: DistributionAmounts,
    ) -> Result<DistributionOutcome> {
        *ctx.fault = None;
        let main_address = match ctx.ledger.main_wallet() {
            Some(main) => main.address.clone(),
            None => return Err(SniperError::Wallet("No main wallet loaded".to_string())),
        };
        if let Some(main) = ctx.ledger.get_mut(&main_address) {
            main.fault = None;
        }

        let (sub_wallets, per_wallet): (Vec<String>, Vec<f64>) = ctx.ledger
            .sub_wallets()
            .map(|w| {
                let amount = match amounts {
                    DistributionAmounts::Needed => w.native_needed,
                    DistributionAmounts::Flat(extra) => extra,
                };
                (w.address.clone(), amount.max(0.0))
            })
            .unzip();
        let total_sent: f64 = per_wallet.iter().sum();
        if total_sent <= EPSILON {
            return Err(SniperError::InvalidInput("Nothing to distribute: no sniping wallet needs BNB".to_string()));
        }

        let request = DistributeRequest {
            deposit_wallet: main_address.clone(),
            sub_wallets,
            amounts: per_wallet.clone(),
        };
        self.notify(OperationStatus::Started(format!(
            "Distributing {:.6} BNB to {} wallets",
            total_sent,
            request.sub_wallets.len()
        )));

        match self.service.distribute_bnb(&request).await {
            Ok(resp) if resp.success => {}
            Ok(resp) => {
                let raw = resp.error.unwrap_or_else(|| "Distribution failed".to_string());
                return Err(self.fail(ctx, &raw, Some(&main_address), GenericAs::Backend));
            }
            Err(e) => return Err(self.fail_with(ctx, e, Some(&main_address), GenericAs::Backend)),
        }
        self.notify(OperationStatus::Success(format!("Distributed {:.6} BNB", total_sent)));

        // Balances aren't authoritative until the transfers settle.
        sleep(self.settings.settlement_delay).await;
        if let Err(e) = self.refresh_balances(ctx, Some(token_address)).await {
            warn!("Post-distribution balance refresh failed: {}", e);
        }
        let reestimate = match self.estimate_fees(ctx, token_address).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Re-estimation after distribution failed: {}", e);
                None
            }
        };

        Ok(DistributionOutcome { total_sent, amounts: per_wallet, reestimate })
    }

    /// Dry-runs the bundle. A node-level shortfall is layered on top of the
    /// last estimate instead of replacing it.
    pub async fn simulate(&self, ctx: &mut ActionContext<'_>, token_address: &str) -> Result<()> {
        let request = Self::bundle_request(ctx.ledger, token_address)?;
        self.notify(OperationStatus::Started("Simulating bundle".to_string()));

        match self.service.simulate_bundle(&request).await {
            Ok(resp) if resp.success => {
                self.notify(OperationStatus::Success("Simulation succeeded".to_string()));
                Ok(())
            }
            Ok(resp) => {
                let raw = resp.error.unwrap_or_else(|| "Simulation failed".to_string());
                Err(self.fail(ctx, &raw, None, GenericAs::Simulation))
            }
            Err(e) => Err(self.fail_with(ctx, e, None, GenericAs::Simulation)),
        }
    }

    /// Submits the bundle. Irreversible; the caller checks the execute gate first.
    pub async fn execute(&self, ctx: &mut ActionContext<'_>, token_address: &str) -> Result<ExecutionOutcome> {
        *ctx.fault = None;
        if let Some(main_address) = ctx.ledger.main_wallet().map(|w| w.address.clone()) {
            if let Some(main) = ctx.ledger.get_mut(&main_address) {
                main.fault = None;
            }
        }

        let request = Self::bundle_request(ctx.ledger, token_address)?;
        self.notify(OperationStatus::Started("Executing bundle".to_string()));

        let response = match self.service.execute_bundle(&request).await {
            Ok(resp) if resp.success => resp,
            Ok(resp) => {
                let raw = resp.error.unwrap_or_else(|| "Execution failed".to_string());
                return Err(self.fail(ctx, &raw, None, GenericAs::Backend));
            }
            Err(e) => return Err(self.fail_with(ctx, e, None, GenericAs::Backend)),
        };
        self.notify(OperationStatus::Success(match &response.tx_hash {
            Some(hash) => format!("Bundle executed: {}", hash),
            None => "Bundle executed".to_string(),
        }));

        sleep(self.settings.post_execution_delay).await;
        if let Err(e) = self.refresh_balances(ctx, Some(token_address)).await {
            warn!("Post-execution balance refresh failed: {}", e);
        }

        Ok(ExecutionOutcome { tx_hash: response.tx_hash, message: response.message })
    }

    /// Writes the ledger side effects of a classified failure and returns the
    /// fault, if the failure names a wallet shortfall.
    fn record_failure(
        &self,
        ctx: &mut ActionContext<'_>,
        kind: &FailureKind,
        context_wallet: Option<&str>,
    ) -> Option<InsufficientFundsFault> {
        let (address, available, required) = match kind {
            FailureKind::DistributionShortfall { required, found } => {
                let address = ctx.ledger.main_wallet().map(|w| w.address.clone())?;
                (address, *found, *required)
            }
            FailureKind::AddressShortfall { address, available, required } => (address.clone(), *available, *required),
            FailureKind::GasShortfall { required, available } => {
                let address = match context_wallet {
                    Some(address) => address.to_string(),
                    None => ctx.ledger.main_wallet().map(|w| w.address.clone())?,
                };
                let known_balance = ctx.ledger.get(&address).map(|w| w.native_balance).unwrap_or(0.0);
                let available = available.unwrap_or(known_balance);
                let required = required.unwrap_or(available + self.settings.fee_reserve_bnb);
                (address, available, required)
            }
            _ => return None,
        };

        let role = ctx.ledger.get(&address).map(|w| w.role);
        let fault = InsufficientFundsFault::new(address.clone(), role, available, required);

        if let Some(wallet) = ctx.ledger.get_mut(&address) {
            // Increment, never replace: this corrects the last estimate.
            if !wallet.is_main() {
                wallet.native_needed += fault.missing;
                wallet.native_shortfall += fault.missing;
            }
            wallet.fault = Some(fault.clone());
        }
        if let (FailureKind::AddressShortfall { .. }, Some(result)) = (kind, ctx.reconciliation.as_mut()) {
            result.sufficient_balance = false;
            result.total_native_needed += fault.missing;
        }
        *ctx.fault = Some(fault.clone());
        Some(fault)
    }

    fn fail(&self, ctx: &mut ActionContext<'_>, raw: &str, context_wallet: Option<&str>, generic: GenericAs) -> SniperError {
        let kind = classify_failure(raw);
        let err = match self.record_failure(ctx, &kind, context_wallet) {
            Some(fault) => {
                self.notify(OperationStatus::Fault(fault.clone()));
                SniperError::InsufficientFunds(fault)
            }
            None => match kind {
                FailureKind::InsufficientLiquidity => SniperError::InsufficientLiquidity,
                FailureKind::SlippageExceeded => SniperError::SlippageExceeded,
                FailureKind::Generic(raw) => match generic {
                    GenericAs::Backend => SniperError::Backend(raw),
                    GenericAs::Simulation => SniperError::SimulationFailed(raw),
                },
                other => SniperError::Backend(other.user_message()),
            },
        };
        if err.fault().is_none() {
            self.notify(OperationStatus::Failure(err.to_string()));
        }
        err
    }

    /// Like `fail`, for errors raised by the service client. Only backend
    /// rejections carry classifiable text; transport errors pass through.
    fn fail_with(&self, ctx: &mut ActionContext<'_>, err: SniperError, context_wallet: Option<&str>, generic: GenericAs) -> SniperError {
        match err {
            SniperError::Api(raw) | SniperError::Backend(raw) => self.fail(ctx, &raw, context_wallet, generic),
            other => {
                self.notify(OperationStatus::Failure(other.to_string()));
                other
            }
        }
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep, Instant};

use bnb_snipe_console::api::{BotService, ChainReader, LiquidityManager};
use bnb_snipe_console::errors::{Result, SniperError};
use bnb_snipe_console::models::api::{
    ActionResponse, AddLiquidityRequest, BatchResponse, BundleRequest, CollectBnbRequest, DistributeRequest,
    EstimateFeesResponse, LiquidityPercentageRequest, LiquidityResponse, MultiWalletTradeRequest, PoolInfo,
    SingleWalletBuyRequest, SingleWalletSellRequest, WalletFeeEstimate, WalletOperationResult,
};
use bnb_snipe_console::models::wallet::{WalletBalance, WalletEntry};
use bnb_snipe_console::models::OperationStatus;
use bnb_snipe_console::reconcile::{EngineSettings, ReconciliationEngine};
use bnb_snipe_console::session::SnipeSession;
use bnb_snipe_console::wizard::WizardLayout;

pub const MAIN: &str = "0x1111111111111111111111111111111111111111";
pub const SUB_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const SUB_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const SUB_C: &str = "0xcccccccccccccccccccccccccccccccccccccccc";
pub const TOKEN: &str = "0x9999999999999999999999999999999999999999";

/// Backend double: canned responses, recorded calls.
#[derive(Default)]
pub struct FakeBotService {
    pub estimates: Mutex<VecDeque<EstimateFeesResponse>>,
    pub distribute_response: Mutex<Option<ActionResponse>>,
    pub simulate_response: Mutex<Option<ActionResponse>>,
    pub execute_response: Mutex<Option<ActionResponse>>,
    pub single_response: Mutex<Option<ActionResponse>>,
    pub batch_response: Mutex<Option<BatchResponse>>,
    pub liquidity_response: Mutex<Option<LiquidityResponse>>,
    /// Transport failure returned by `estimate_fees` instead of a response.
    pub estimate_transport_error: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
    pub distributions: Mutex<Vec<DistributeRequest>>,
    pub trades: Mutex<Vec<MultiWalletTradeRequest>>,
    pub sells: Mutex<Vec<SingleWalletSellRequest>>,
}

impl FakeBotService {
    pub fn push_estimate(&self, response: EstimateFeesResponse) {
        self.estimates.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn action(slot: &Mutex<Option<ActionResponse>>) -> ActionResponse {
        slot.lock().unwrap().clone().unwrap_or_else(ActionResponse::ok)
    }
}

#[async_trait]
impl BotService for FakeBotService {
    async fn estimate_fees(&self, _request: &BundleRequest) -> Result<EstimateFeesResponse> {
        self.record("estimate_fees");
        if let Some(raw) = self.estimate_transport_error.lock().unwrap().clone() {
            return Err(SniperError::Api(raw));
        }
        Ok(self.estimates.lock().unwrap().pop_front().unwrap_or_else(|| EstimateFeesResponse {
            success: true,
            ..Default::default()
        }))
    }

    async fn distribute_bnb(&self, request: &DistributeRequest) -> Result<ActionResponse> {
        self.record("distribute_bnb");
        self.distributions.lock().unwrap().push(request.clone());
        Ok(Self::action(&self.distribute_response))
    }

    async fn simulate_bundle(&self, _request: &BundleRequest) -> Result<ActionResponse> {
        self.record("simulate_bundle");
        Ok(Self::action(&self.simulate_response))
    }

    async fn execute_bundle(&self, _request: &BundleRequest) -> Result<ActionResponse> {
        self.record("execute_bundle");
        Ok(Self::action(&self.execute_response))
    }

    async fn single_wallet_buy(&self, _request: &SingleWalletBuyRequest) -> Result<ActionResponse> {
        self.record("single_wallet_buy");
        Ok(Self::action(&self.single_response))
    }

    async fn single_wallet_sell(&self, request: &SingleWalletSellRequest) -> Result<ActionResponse> {
        self.record("single_wallet_sell");
        self.sells.lock().unwrap().push(request.clone());
        Ok(Self::action(&self.single_response))
    }

    async fn multi_wallet_buy(&self, request: &MultiWalletTradeRequest) -> Result<BatchResponse> {
        self.record("multi_wallet_buy");
        self.trades.lock().unwrap().push(request.clone());
        Ok(self.batch_response.lock().unwrap().clone().unwrap_or_default())
    }

    async fn multi_wallet_sell(&self, request: &MultiWalletTradeRequest) -> Result<BatchResponse> {
        self.record("multi_wallet_sell");
        self.trades.lock().unwrap().push(request.clone());
        Ok(self.batch_response.lock().unwrap().clone().unwrap_or_default())
    }

    async fn collect_bnb(&self, _request: &CollectBnbRequest) -> Result<BatchResponse> {
        self.record("collect_bnb");
        Ok(self.batch_response.lock().unwrap().clone().unwrap_or_default())
    }
}

#[async_trait]
impl LiquidityManager for FakeBotService {
    async fn add_liquidity(&self, _request: &AddLiquidityRequest) -> Result<LiquidityResponse> {
        self.record("add_liquidity");
        Ok(self.liquidity_response.lock().unwrap().clone().unwrap_or(LiquidityResponse { success: true, ..Default::default() }))
    }

    async fn remove_liquidity(&self, _request: &LiquidityPercentageRequest) -> Result<LiquidityResponse> {
        self.record("remove_liquidity");
        Ok(self.liquidity_response.lock().unwrap().clone().unwrap_or(LiquidityResponse { success: true, ..Default::default() }))
    }

    async fn burn_liquidity(&self, _request: &LiquidityPercentageRequest) -> Result<LiquidityResponse> {
        self.record("burn_liquidity");
        Ok(self.liquidity_response.lock().unwrap().clone().unwrap_or(LiquidityResponse { success: true, ..Default::default() }))
    }
}

/// Chain double: fixed balances, counts and timestamps every fetch.
#[derive(Default)]
pub struct FakeChainReader {
    pub balances: Mutex<HashMap<String, (f64, f64)>>,
    pub fetches: AtomicUsize,
    pub fetch_times: Mutex<Vec<Instant>>,
    pub delay: Duration,
}

impl FakeChainReader {
    pub fn with_delay(delay: Duration) -> Self {
        FakeChainReader { delay, ..Default::default() }
    }

    pub fn set_balance(&self, address: &str, native: f64, token: f64) {
        self.balances.lock().unwrap().insert(address.to_ascii_lowercase(), (native, token));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fetch_times(&self) -> Vec<Instant> {
        self.fetch_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainReader for FakeChainReader {
    async fn fetch_balances(&self, addresses: &[String], _token_address: Option<&str>) -> Result<Vec<WalletBalance>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.fetch_times.lock().unwrap().push(Instant::now());
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        let balances = self.balances.lock().unwrap();
        Ok(addresses
            .iter()
            .map(|address| {
                let (native, token) = balances.get(&address.to_ascii_lowercase()).copied().unwrap_or((0.0, 0.0));
                WalletBalance { address: address.clone(), native_balance: native, token_amount: token }
            })
            .collect())
    }

    async fn pool_info(&self, _token_address: &str) -> Result<Option<PoolInfo>> {
        Ok(None)
    }

    async fn lp_balance(&self, _token_address: &str, _owner: &str) -> Result<f64> {
        Ok(0.0)
    }
}

pub fn settings() -> EngineSettings {
    EngineSettings {
        slippage_percent: 10.0,
        fee_reserve_bnb: 0.0005,
        settlement_delay: Duration::from_secs(3),
        post_execution_delay: Duration::from_secs(5),
        refresh_window: Duration::from_secs(5),
    }
}

pub struct Harness {
    pub service: Arc<FakeBotService>,
    pub reader: Arc<FakeChainReader>,
    pub session: SnipeSession,
}

/// Session over one main wallet and the given sniping wallets, bound to `TOKEN`.
pub fn harness(layout: WizardLayout, subs: &[&str]) -> Harness {
    build_harness(layout, subs, None)
}

/// Like `harness`, also returning every status the engine emits.
pub fn harness_with_status(layout: WizardLayout, subs: &[&str]) -> (Harness, UnboundedReceiver<OperationStatus>) {
    let (tx, rx) = unbounded_channel();
    (build_harness(layout, subs, Some(tx)), rx)
}

fn build_harness(layout: WizardLayout, subs: &[&str], status: Option<UnboundedSender<OperationStatus>>) -> Harness {
    let service = Arc::new(FakeBotService::default());
    let reader = Arc::new(FakeChainReader::default());
    let mut engine = ReconciliationEngine::new(service.clone(), reader.clone(), service.clone(), settings());
    if let Some(tx) = status {
        engine = engine.with_status_sender(tx);
    }
    let mut session = SnipeSession::new(layout, Arc::new(engine), 50, 0.15);
    let mut entries = vec![WalletEntry::main(MAIN)];
    entries.extend(subs.iter().map(|s| WalletEntry::sub(*s)));
    session.set_wallets(entries).unwrap();
    session.set_token_address(TOKEN).unwrap();
    Harness { service, reader, session }
}

/// Everything emitted so far, without waiting.
pub fn drain(rx: &mut UnboundedReceiver<OperationStatus>) -> Vec<OperationStatus> {
    let mut out = Vec::new();
    while let Ok(status) = rx.try_recv() {
        out.push(status);
    }
    out
}

pub fn estimate(wallets: &[(&str, f64, f64)], total_needed: f64) -> EstimateFeesResponse {
    EstimateFeesResponse {
        success: true,
        wallets: wallets
            .iter()
            .map(|(address, to_spend, needed)| WalletFeeEstimate {
                address: address.to_string(),
                bnb_to_spend: *to_spend,
                bnb_needed: *needed,
            })
            .collect(),
        total_bnb_needed: total_needed,
        total_for_distribution: wallets.iter().map(|(_, _, needed)| needed).sum(),
        gas_cost: 0.001,
        ..Default::default()
    }
}

pub fn wallet_result(address: &str, error: Option<&str>) -> WalletOperationResult {
    WalletOperationResult {
        address: address.to_string(),
        success: error.is_none(),
        error: error.map(str::to_string),
        tx_hash: None,
    }
}

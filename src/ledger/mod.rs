//! In-memory wallet set for one operation: one main (deposit) wallet plus up
//! to `max_sub_wallets` sniping wallets.

pub mod distribution;
pub mod export;
pub mod refresh;

use chrono::Utc;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

use crate::api::ChainReader;
use crate::errors::{Result, SniperError};
use crate::models::wallet::{WalletBalance, WalletEntry, WalletRecord, WalletRole};
use crate::utils::normalize_address;

pub use distribution::plan_token_distribution;
pub use refresh::{BalanceRefresher, RefreshOutcome};

pub struct WalletLedger {
    wallets: Vec<WalletRecord>,
    max_sub_wallets: usize,
}

impl WalletLedger {
    pub fn new(max_sub_wallets: usize) -> Self {
        WalletLedger { wallets: Vec::new(), max_sub_wallets }
    }

    /// Replaces the wallet set. Records whose address survives the replacement
    /// keep their balances, plan and flags; new addresses start from zero.
    pub fn set_wallets(&mut self, entries: Vec<WalletEntry>) -> Result<()> {
        let mut seen = HashSet::new();
        let mut main_count = 0;
        let mut sub_count = 0;
        for entry in &entries {
            let key = normalize_address(&entry.address)?;
            if !seen.insert(key) {
                return Err(SniperError::Wallet(format!("Duplicate wallet address: {}", entry.address)));
            }
            match entry.role {
                WalletRole::Main => main_count += 1,
                WalletRole::Sub => sub_count += 1,
            }
        }
        if !entries.is_empty() && main_count != 1 {
            return Err(SniperError::Wallet(format!(
                "Exactly one main wallet is required, found {}",
                main_count
            )));
        }
        if sub_count > self.max_sub_wallets {
            return Err(SniperError::Wallet(format!(
                "Too many sniping wallets: {} (max {})",
                sub_count, self.max_sub_wallets
            )));
        }

        let mut previous: HashMap<String, WalletRecord> = self.wallets
            .drain(..)
            .map(|w| (w.address.to_ascii_lowercase(), w))
            .collect();

        self.wallets = entries
            .into_iter()
            .map(|entry| match previous.remove(&entry.address.trim().to_ascii_lowercase()) {
                Some(mut kept) => {
                    kept.address = entry.address.trim().to_string();
                    kept.role = entry.role;
                    if entry.name.is_some() {
                        kept.name = entry.name;
                    }
                    if kept.is_main() {
                        kept.planned_token_amount = 0;
                        kept.selected_for_batch_op = false;
                    }
                    kept
                }
                None => WalletRecord::new(WalletEntry { address: entry.address.trim().to_string(), ..entry }),
            })
            .collect();

        info!("Wallet set replaced: {} main, {} sniping", main_count, sub_count);
        Ok(())
    }

    pub fn wallets(&self) -> &[WalletRecord] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn main_wallet(&self) -> Option<&WalletRecord> {
        self.wallets.iter().find(|w| w.is_main())
    }

    pub fn sub_wallets(&self) -> impl Iterator<Item = &WalletRecord> {
        self.wallets.iter().filter(|w| w.is_sub())
    }

    pub fn sub_wallets_mut(&mut self) -> impl Iterator<Item = &mut WalletRecord> {
        self.wallets.iter_mut().filter(|w| w.is_sub())
    }

    pub fn sub_count(&self) -> usize {
        self.sub_wallets().count()
    }

    pub fn sub_addresses(&self) -> Vec<String> {
        self.sub_wallets().map(|w| w.address.clone()).collect()
    }

    /// Every address including the main wallet, as sent to balance reads.
    pub fn all_addresses(&self) -> Vec<String> {
        self.wallets.iter().map(|w| w.address.clone()).collect()
    }

    pub fn get(&self, address: &str) -> Option<&WalletRecord> {
        self.wallets.iter().find(|w| w.matches(address))
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut WalletRecord> {
        self.wallets.iter_mut().find(|w| w.matches(address))
    }

    fn require_mut(&mut self, address: &str) -> Result<&mut WalletRecord> {
        self.get_mut(address)
            .ok_or_else(|| SniperError::Wallet(format!("Unknown wallet: {}", address)))
    }

    /// Merges fetched balances by address and re-applies the selection rule.
    /// Returns how many records were updated.
    pub fn merge_balances(&mut self, balances: &[WalletBalance]) -> usize {
        let now = Utc::now();
        let mut updated = 0;
        for balance in balances {
            match self.get_mut(&balance.address) {
                Some(wallet) => {
                    wallet.native_balance = balance.native_balance.max(0.0);
                    wallet.token_balance = balance.token_amount.max(0.0);
                    wallet.last_refreshed = Some(now);
                    if !wallet.is_selectable() {
                        wallet.selected_for_batch_op = false;
                    }
                    updated += 1;
                }
                None => debug!("Ignoring balance for unknown address {}", balance.address),
            }
        }
        updated
    }

    /// Fetches balances for every wallet through `refresher` and merges them.
    pub async fn refresh_balances(
        &mut self,
        refresher: &BalanceRefresher,
        reader: &dyn ChainReader,
        token_address: Option<&str>,
    ) -> Result<RefreshOutcome> {
        let addresses = self.all_addresses();
        if addresses.is_empty() {
            warn!("No wallets loaded to fetch balances for.");
            return Ok(RefreshOutcome::Refreshed(Vec::new()));
        }
        let outcome = refresher.fetch(reader, &addresses, token_address).await?;
        if let RefreshOutcome::Refreshed(balances) = &outcome {
            let updated = self.merge_balances(balances);
            info!("Balances refreshed for {}/{} wallets", updated, addresses.len());
        }
        Ok(outcome)
    }

    /// Selects or deselects a wallet for batch operations. Zero-balance wallets
    /// always end up deselected; the return value is the effective state.
    pub fn set_selected(&mut self, address: &str, selected: bool) -> Result<bool> {
        let wallet = self.require_mut(address)?;
        wallet.selected_for_batch_op = selected && wallet.is_sub() && wallet.is_selectable();
        Ok(wallet.selected_for_batch_op)
    }

    /// Selects every sniping wallet that holds something. Returns the count.
    pub fn select_all_eligible(&mut self) -> usize {
        let mut count = 0;
        for wallet in self.sub_wallets_mut() {
            wallet.selected_for_batch_op = wallet.is_selectable();
            if wallet.selected_for_batch_op {
                count += 1;
            }
        }
        count
    }

    pub fn selected_wallets(&self) -> Vec<&WalletRecord> {
        self.sub_wallets().filter(|w| w.selected_for_batch_op).collect()
    }

    pub fn set_planned_amount(&mut self, address: &str, amount: u64) -> Result<()> {
        let wallet = self.require_mut(address)?;
        wallet.planned_token_amount = if wallet.is_main() { 0 } else { amount };
        Ok(())
    }

    /// Assigns `amounts` to the sniping wallets in order; wallets beyond the
    /// list get zero and the main wallet always gets zero.
    pub fn apply_planned_amounts(&mut self, amounts: &[u64]) {
        let mut iter = amounts.iter();
        for wallet in self.wallets.iter_mut() {
            wallet.planned_token_amount = if wallet.is_sub() { iter.next().copied().unwrap_or(0) } else { 0 };
        }
    }

    /// Plans a jittered split of `total_tokens` over the first `wallet_count`
    /// sniping wallets and applies it.
    pub fn apply_token_distribution(&mut self, total_tokens: u64, wallet_count: usize, jitter: f64) -> Result<Vec<u64>> {
        let available = self.sub_count();
        if wallet_count > available {
            return Err(SniperError::InvalidInput(format!(
                "Requested {} sniping wallets but only {} are loaded",
                wallet_count, available
            )));
        }
        let plan = plan_token_distribution(total_tokens, wallet_count, jitter);
        self.apply_planned_amounts(&plan);
        Ok(plan)
    }

    pub fn set_sell_percentage(&mut self, address: &str, percentage: u8) -> Result<()> {
        validate_percentage(percentage)?;
        self.require_mut(address)?.sell_percentage = percentage;
        Ok(())
    }

    pub fn set_spend_rate_percentage(&mut self, address: &str, percentage: u8) -> Result<()> {
        validate_percentage(percentage)?;
        self.require_mut(address)?.spend_rate_percentage = percentage;
        Ok(())
    }

    /// Planned token amounts of the sniping wallets, in wallet order.
    pub fn planned_amounts(&self) -> Vec<u64> {
        self.sub_wallets().map(|w| w.planned_token_amount).collect()
    }

    pub fn total_planned_tokens(&self) -> u64 {
        self.sub_wallets().map(|w| w.planned_token_amount).sum()
    }

    pub fn has_positive_plan(&self) -> bool {
        self.sub_wallets().any(|w| w.planned_token_amount > 0)
    }

    pub fn total_sub_native_needed(&self) -> f64 {
        self.sub_wallets().map(|w| w.native_needed).sum()
    }

    pub fn total_sub_native_balance(&self) -> f64 {
        self.sub_wallets().map(|w| w.native_balance).sum()
    }

    pub fn any_sub_needs_native(&self) -> bool {
        self.sub_wallets().any(|w| w.has_outstanding_need())
    }

    pub fn clear_transient_needs(&mut self) {
        for wallet in self.wallets.iter_mut() {
            wallet.clear_transient_needs();
        }
    }

    pub fn clear_needs_for(&mut self, addresses: &[String]) {
        for address in addresses {
            if let Some(wallet) = self.get_mut(address) {
                wallet.clear_transient_needs();
            }
        }
    }
}

fn validate_percentage(percentage: u8) -> Result<()> {
    if (1..=100).contains(&percentage) {
        Ok(())
    } else {
        Err(SniperError::InvalidInput(format!("Percentage must be between 1 and 100, got {}", percentage)))
    }
}

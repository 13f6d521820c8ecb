use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::fault::InsufficientFundsFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletRole {
    /// Deposit wallet that funds the sniping wallets.
    Main,
    /// Operational sniping wallet.
    Sub,
}

impl fmt::Display for WalletRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletRole::Main => write!(f, "Main"),
            WalletRole::Sub => write!(f, "Sub"),
        }
    }
}

/// Wallet as stored in the wallets file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletEntry {
    pub address: String,
    pub role: WalletRole,
    #[serde(default)]
    pub name: Option<String>,
}

impl WalletEntry {
    pub fn main(address: impl Into<String>) -> Self {
        WalletEntry { address: address.into(), role: WalletRole::Main, name: None }
    }

    pub fn sub(address: impl Into<String>) -> Self {
        WalletEntry { address: address.into(), role: WalletRole::Sub, name: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletKeys {
    pub wallets: Vec<WalletEntry>,
}

/// Native and token balance of one address as read from chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub address: String,
    pub native_balance: f64,
    pub token_amount: f64,
}

impl fmt::Display for WalletBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} BNB, {} tokens", self.address, self.native_balance, self.token_amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub id: Uuid,
    pub address: String,
    pub role: WalletRole,
    pub name: Option<String>,
    pub native_balance: f64,
    pub token_balance: f64,
    pub planned_token_amount: u64,
    /// BNB the wallet will spend on its buy, as last estimated.
    pub native_to_spend: f64,
    pub native_needed: f64,
    pub native_shortfall: f64,
    pub sell_percentage: u8,
    pub spend_rate_percentage: u8,
    pub selected_for_batch_op: bool,
    pub fault: Option<InsufficientFundsFault>,
    pub last_refreshed: Option<DateTime<Utc>>,
}

pub const DEFAULT_SELL_PERCENTAGE: u8 = 100;
pub const DEFAULT_SPEND_RATE_PERCENTAGE: u8 = 100;

impl WalletRecord {
    pub fn new(entry: WalletEntry) -> Self {
        WalletRecord {
            id: Uuid::new_v4(),
            address: entry.address,
            role: entry.role,
            name: entry.name,
            native_balance: 0.0,
            token_balance: 0.0,
            planned_token_amount: 0,
            native_to_spend: 0.0,
            native_needed: 0.0,
            native_shortfall: 0.0,
            sell_percentage: DEFAULT_SELL_PERCENTAGE,
            spend_rate_percentage: DEFAULT_SPEND_RATE_PERCENTAGE,
            selected_for_batch_op: false,
            fault: None,
            last_refreshed: None,
        }
    }

    pub fn is_main(&self) -> bool {
        self.role == WalletRole::Main
    }

    pub fn is_sub(&self) -> bool {
        self.role == WalletRole::Sub
    }

    /// Zero-balance wallets can't take part in batch operations.
    pub fn is_selectable(&self) -> bool {
        self.native_balance > 0.0 || self.token_balance > 0.0
    }

    pub fn has_outstanding_need(&self) -> bool {
        self.native_needed > f64::EPSILON
    }

    /// Clears the outputs of the last reconciliation pass.
    pub fn clear_transient_needs(&mut self) {
        self.native_needed = 0.0;
        self.native_shortfall = 0.0;
        self.fault = None;
    }

    pub fn matches(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address.trim())
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::wallet::WalletRole;

/// One wallet's funding shortfall, shown to the operator until the next
/// successful funds-moving action clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientFundsFault {
    pub wallet_address: String,
    /// `None` when the implicated address is not part of the current wallet set.
    pub wallet_role: Option<WalletRole>,
    pub available: f64,
    pub required: f64,
    pub missing: f64,
}

impl InsufficientFundsFault {
    pub fn new(
        wallet_address: impl Into<String>,
        wallet_role: Option<WalletRole>,
        available: f64,
        required: f64,
    ) -> Self {
        InsufficientFundsFault {
            wallet_address: wallet_address.into(),
            wallet_role,
            available,
            required,
            missing: (required - available).max(0.0),
        }
    }

    pub fn remediation(&self) -> String {
        match self.wallet_role {
            Some(WalletRole::Main) => format!(
                "Deposit at least {:.6} BNB into the main wallet {} and retry.",
                self.missing, self.wallet_address
            ),
            Some(WalletRole::Sub) => format!(
                "Distribute at least {:.6} BNB to sniping wallet {} and retry.",
                self.missing, self.wallet_address
            ),
            None => format!(
                "Fund wallet {} with at least {:.6} BNB and retry.",
                self.wallet_address, self.missing
            ),
        }
    }
}

impl fmt::Display for InsufficientFundsFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self.wallet_role {
            Some(role) => role.to_string(),
            None => "Unknown".to_string(),
        };
        write!(
            f,
            "Insufficient BNB in {} wallet {}: available {:.6} BNB, required {:.6} BNB, missing {:.6} BNB",
            role, self.wallet_address, self.available, self.required, self.missing
        )
    }
}

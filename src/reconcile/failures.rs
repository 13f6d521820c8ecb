//! Classification of raw backend error text.
//!
//! The backend only reports failures as free-form strings, so recognised
//! shapes are matched by an ordered list of rules; the first rule whose
//! pattern matches and whose extractor succeeds wins. Anything else is passed
//! through verbatim.

use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Regex};

use crate::utils::parse_wei_to_native;

#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// Pool can't fill the requested amount.
    InsufficientLiquidity,
    /// Router rejected the swap for too little output.
    SlippageExceeded,
    /// Deposit wallet can't cover a distribution (`Required: ~X BNB, Found: Y BNB`).
    DistributionShortfall { required: f64, found: f64 },
    /// Node-level `insufficient funds ... address A have X want Y` (wei).
    AddressShortfall { address: String, available: f64, required: f64 },
    /// Wallet can't pay gas. Amounts are present only when the message carries them.
    GasShortfall { required: Option<f64>, available: Option<f64> },
    Generic(String),
}

impl FailureKind {
    pub fn user_message(&self) -> String {
        match self {
            FailureKind::InsufficientLiquidity => {
                "Insufficient liquidity in the pool. Try a smaller amount or wait for more liquidity to be added.".to_string()
            }
            FailureKind::SlippageExceeded => {
                "Price impact too high. Try a smaller amount or increase slippage tolerance.".to_string()
            }
            FailureKind::DistributionShortfall { required, found } => format!(
                "Insufficient BNB in the main wallet: required ~{:.6} BNB, found {:.6} BNB. Deposit at least {:.6} BNB and retry.",
                required,
                found,
                (required - found).max(0.0)
            ),
            FailureKind::AddressShortfall { address, available, required } => format!(
                "Wallet {} has {:.6} BNB but needs {:.6} BNB. Fund it with at least {:.6} BNB and retry.",
                address,
                available,
                required,
                (required - available).max(0.0)
            ),
            FailureKind::GasShortfall { .. } => {
                "Insufficient BNB for gas fees. Send a small amount of BNB to the wallet and retry.".to_string()
            }
            FailureKind::Generic(raw) => raw.clone(),
        }
    }

    pub fn is_funds_shortfall(&self) -> bool {
        matches!(
            self,
            FailureKind::DistributionShortfall { .. }
                | FailureKind::AddressShortfall { .. }
                | FailureKind::GasShortfall { .. }
        )
    }
}

type Extractor = fn(&Captures) -> Option<FailureKind>;

struct FailureRule {
    name: &'static str,
    pattern: Regex,
    extract: Extractor,
}

fn number(caps: &Captures, group: &str) -> Option<f64> {
    caps.name(group).and_then(|m| m.as_str().parse::<f64>().ok())
}

fn rule(name: &'static str, pattern: &str, extract: Extractor) -> FailureRule {
    FailureRule {
        name,
        pattern: Regex::new(pattern).expect("failure rule pattern must compile"),
        extract,
    }
}

lazy_static! {
    static ref RULES: Vec<FailureRule> = vec![
        rule("insufficient-liquidity", r"INSUFFICIENT_LIQUIDITY", |_| Some(FailureKind::InsufficientLiquidity)),
        rule("slippage", r"INSUFFICIENT_OUTPUT_AMOUNT", |_| Some(FailureKind::SlippageExceeded)),
        rule(
            "distribution-shortfall",
            r"(?is)insufficient wallet balance.*?required:\s*~?\s*(?P<required>\d+(?:\.\d+)?)\s*BNB.*?found:\s*(?P<found>\d+(?:\.\d+)?)\s*BNB",
            |caps| Some(FailureKind::DistributionShortfall {
                required: number(caps, "required")?,
                found: number(caps, "found")?,
            }),
        ),
        rule(
            "address-shortfall",
            r"(?is)insufficient funds.*?address\s+(?P<address>0x[0-9a-f]+).*?have\s+(?P<have>\d+)\s+want\s+(?P<want>\d+)",
            |caps| Some(FailureKind::AddressShortfall {
                address: caps.name("address")?.as_str().to_string(),
                available: parse_wei_to_native(caps.name("have")?.as_str()).ok()?,
                required: parse_wei_to_native(caps.name("want")?.as_str()).ok()?,
            }),
        ),
        rule(
            "gas-shortfall",
            r"(?i)insufficient (?:bnb balance for fees|gas funds|funds for (?:transaction|gas))(?:.*?required:?\s*~?\s*(?P<required>\d+(?:\.\d+)?))?(?:.*?(?:available|found|have):?\s*(?P<available>\d+(?:\.\d+)?))?",
            |caps| Some(FailureKind::GasShortfall {
                required: number(caps, "required"),
                available: number(caps, "available"),
            }),
        ),
    ];
}

/// Runs the rule list over `raw`.
pub fn classify_failure(raw: &str) -> FailureKind {
    for rule in RULES.iter() {
        if let Some(caps) = rule.pattern.captures(raw) {
            if let Some(kind) = (rule.extract)(&caps) {
                debug!("Failure matched rule '{}'", rule.name);
                return kind;
            }
        }
    }
    FailureKind::Generic(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liquidity_marker() {
        assert_eq!(
            classify_failure("execution reverted: PancakeLibrary: INSUFFICIENT_LIQUIDITY"),
            FailureKind::InsufficientLiquidity
        );
    }

    #[test]
    fn router_output_amount() {
        assert_eq!(
            classify_failure("PancakeRouter: INSUFFICIENT_OUTPUT_AMOUNT"),
            FailureKind::SlippageExceeded
        );
    }

    #[test]
    fn distribution_shortfall_amounts() {
        let kind = classify_failure("Insufficient wallet balance for distribution. Required: ~1.25 BNB, Found: 0.5 BNB");
        assert_eq!(kind, FailureKind::DistributionShortfall { required: 1.25, found: 0.5 });
        assert!(kind.user_message().contains("0.750000"));
    }

    #[test]
    fn node_insufficient_funds_with_wei() {
        let kind = classify_failure(
            "Insufficient funds for address 0xABC have 1000000000000000000 want 2000000000000000000",
        );
        assert_eq!(
            kind,
            FailureKind::AddressShortfall { address: "0xABC".to_string(), available: 1.0, required: 2.0 }
        );
    }

    #[test]
    fn geth_style_message() {
        let kind = classify_failure(
            "insufficient funds for gas * price + value: address 0x00000000000000000000000000000000000000aa have 500000000000000000 want 750000000000000000",
        );
        match kind {
            FailureKind::AddressShortfall { available, required, .. } => {
                assert_eq!(available, 0.5);
                assert_eq!(required, 0.75);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn gas_fee_message_without_numbers() {
        assert_eq!(
            classify_failure("Insufficient BNB balance for fees on wallet 0x12"),
            FailureKind::GasShortfall { required: None, available: None }
        );
        assert_eq!(
            classify_failure("Insufficient gas funds"),
            FailureKind::GasShortfall { required: None, available: None }
        );
    }

    #[test]
    fn gas_fee_message_with_numbers() {
        assert_eq!(
            classify_failure("Insufficient BNB balance for fees. Required: 0.002, Available: 0.0005"),
            FailureKind::GasShortfall { required: Some(0.002), available: Some(0.0005) }
        );
    }

    #[test]
    fn transaction_funds_without_address() {
        assert!(matches!(
            classify_failure("Insufficient funds for transaction"),
            FailureKind::GasShortfall { .. }
        ));
    }

    #[test]
    fn unknown_text_is_verbatim() {
        let kind = classify_failure("nonce too low");
        assert_eq!(kind, FailureKind::Generic("nonce too low".to_string()));
        assert_eq!(kind.user_message(), "nonce too low");
    }

    #[test]
    fn only_shortfalls_carry_faults() {
        assert!(classify_failure("Insufficient BNB balance for fees").is_funds_shortfall());
        assert!(classify_failure("Insufficient wallet balance. Required: ~1.5 BNB, Found: 0.5 BNB").is_funds_shortfall());
        assert!(!classify_failure("PancakeRouter: INSUFFICIENT_OUTPUT_AMOUNT").is_funds_shortfall());
        assert!(!FailureKind::Generic("No result returned".to_string()).is_funds_shortfall());
    }
}

// src/lib.rs

pub mod api;
pub mod commands;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod reconcile;
pub mod session;
pub mod utils;
pub mod wallet;
pub mod wizard;

pub use errors::{Result, SniperError};
pub use ledger::WalletLedger;
pub use reconcile::ReconciliationEngine;
pub use session::SnipeSession;

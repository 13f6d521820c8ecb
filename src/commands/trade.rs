use console::style;
use log::warn;

use crate::commands::{build_engine, open_session, spawn_status_printer, wallet_table};
use crate::config::Config;
use crate::errors::{Result, SniperError};
use crate::reconcile::BatchOutcome;
use crate::session::SnipeSession;
use crate::wizard::WizardLayout;

#[derive(Debug, Clone, PartialEq)]
pub enum TradeAction {
    Buy { address: String, spend_rate: Option<u8> },
    Sell { address: String, percentage: Option<u8> },
    /// Buy with every selected (or, with no explicit list, every eligible) wallet.
    BuyAll { addresses: Vec<String>, spend_rate: Option<u8> },
    SellAll { addresses: Vec<String>, percentage: Option<u8> },
    Collect { addresses: Vec<String> },
}

/// Single-wallet and batch buys, sells and BNB collection.
pub async fn run_trade(
    config: &Config,
    wallets_path_arg: Option<&str>,
    token_address: Option<&str>,
    action: TradeAction,
) -> Result<()> {
    let (status_tx, printer) = spawn_status_printer();
    let engine = build_engine(config, Some(status_tx))?;
    let mut session = open_session(config, WizardLayout::snipe(), engine, wallets_path_arg, token_address)?;

    let outcome = dispatch(&mut session, action).await;
    if outcome.is_ok() {
        if let Err(e) = session.refresh_balances().await {
            warn!("Balance refresh after trade failed: {}", e);
        }
        wallet_table(session.ledger()).printstd();
    }
    drop(session);
    if let Err(e) = printer.await {
        warn!("Status printer ended abnormally: {}", e);
    }
    outcome
}

async fn dispatch(session: &mut SnipeSession, action: TradeAction) -> Result<()> {
    match action {
        TradeAction::Buy { address, spend_rate } => {
            if let Some(rate) = spend_rate {
                session.set_spend_rate_percentage(&address, rate)?;
            }
            session.single_wallet_buy(&address).await?;
        }
        TradeAction::Sell { address, percentage } => {
            if let Some(percentage) = percentage {
                session.set_sell_percentage(&address, percentage)?;
            }
            session.single_wallet_sell(&address).await?;
        }
        TradeAction::BuyAll { addresses, spend_rate } => {
            select(session, &addresses).await?;
            if let Some(rate) = spend_rate {
                for address in selected(session) {
                    session.set_spend_rate_percentage(&address, rate)?;
                }
            }
            report(&session.multi_wallet_buy().await?);
        }
        TradeAction::SellAll { addresses, percentage } => {
            select(session, &addresses).await?;
            if let Some(percentage) = percentage {
                for address in selected(session) {
                    session.set_sell_percentage(&address, percentage)?;
                }
            }
            report(&session.multi_wallet_sell().await?);
        }
        TradeAction::Collect { addresses } => {
            select(session, &addresses).await?;
            report(&session.collect_native().await?);
        }
    }
    Ok(())
}

fn selected(session: &SnipeSession) -> Vec<String> {
    session.ledger().selected_wallets().iter().map(|w| w.address.clone()).collect()
}

/// Balances decide eligibility, so they are read before selecting.
async fn select(session: &mut SnipeSession, addresses: &[String]) -> Result<()> {
    session.refresh_balances().await?;
    let count = if addresses.is_empty() {
        session.select_all_eligible()
    } else {
        let mut count = 0;
        for address in addresses {
            if session.set_selected(address, true)? {
                count += 1;
            } else {
                warn!("{} holds nothing and was not selected", address);
            }
        }
        count
    };
    if count == 0 {
        return Err(SniperError::InvalidInput("No wallet with a balance to operate on".to_string()));
    }
    Ok(())
}

fn report(outcome: &BatchOutcome) {
    for failure in &outcome.failures {
        println!("  {} {}: {}", style("✗").red(), failure.address, failure.message());
        if let Some(fault) = &failure.fault {
            println!("    {}", fault.remediation());
        }
    }
}

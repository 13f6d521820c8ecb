use console::{style, Style};
use log::warn;

use crate::commands::{build_engine, open_session, spawn_status_printer};
use crate::config::Config;
use crate::errors::Result;
use crate::session::SnipeSession;
use crate::utils::format_native;
use crate::wizard::WizardLayout;

#[derive(Debug, Clone, PartialEq)]
pub enum LiquidityAction {
    Info,
    Add { token_amount: f64, bnb_amount: f64 },
    Remove { percentage: u8 },
    Burn { percentage: u8 },
}

pub async fn manage_liquidity(
    config: &Config,
    wallets_path_arg: Option<&str>,
    token_address: &str,
    action: LiquidityAction,
) -> Result<()> {
    let (status_tx, printer) = spawn_status_printer();
    let engine = build_engine(config, Some(status_tx))?;
    let mut session = open_session(config, WizardLayout::snipe(), engine, wallets_path_arg, Some(token_address))?;

    let outcome = match action {
        LiquidityAction::Info => print_pool(&session).await,
        LiquidityAction::Add { token_amount, bnb_amount } => session.add_liquidity(token_amount, bnb_amount).await.map(|_| ()),
        LiquidityAction::Remove { percentage } => session.remove_liquidity(percentage).await.map(|_| ()),
        LiquidityAction::Burn { percentage } => session.burn_liquidity(percentage).await.map(|_| ()),
    };
    drop(session);
    if let Err(e) = printer.await {
        warn!("Status printer ended abnormally: {}", e);
    }
    outcome
}

pub(crate) async fn print_pool(session: &SnipeSession) -> Result<()> {
    let info_style = Style::new().cyan();
    let Some(pool) = session.pool_info().await? else {
        println!("{} No PancakeSwap V2 pair exists for this token yet.", style("ℹ️").cyan());
        return Ok(());
    };
    println!("{} {}", info_style.apply_to("Pair:"), pool.pair_address);
    println!(
        "{} {} BNB / {} tokens",
        info_style.apply_to("Reserves:"),
        format_native(pool.reserves.native),
        pool.reserves.token
    );
    if let Some(price) = pool.reserves.price() {
        println!("{} {:.12} BNB per token", info_style.apply_to("Price:"), price);
    }
    println!("{} {}", info_style.apply_to("LP supply:"), pool.lp_total_supply);

    if let Some(main) = session.ledger().main_wallet() {
        let token = session.token_address().unwrap_or_default();
        match session.engine().main_lp_balance(session.ledger(), token).await {
            Ok(balance) => println!("{} {} ({})", info_style.apply_to("Main wallet LP:"), balance, main.address),
            Err(e) => warn!("Could not read LP balance: {}", e),
        }
    }
    Ok(())
}

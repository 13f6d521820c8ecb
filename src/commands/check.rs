use console::{style, Style};
use log::info;
use prettytable::{row, Table};

use crate::commands::{build_engine, open_session};
use crate::config::Config;
use crate::errors::Result;
use crate::ledger::RefreshOutcome;
use crate::utils::format_native;
use crate::wizard::WizardLayout;

/// Check wallet balances
pub async fn check_wallets(config: &Config, wallets_path_arg: Option<&str>, token_address: Option<&str>) -> Result<()> {
    let info_style = Style::new().cyan();
    println!("\n{}", info_style.apply_to("🔍 Checking Wallet Balances...").bold());

    let engine = build_engine(config, None)?;
    let mut session = open_session(config, WizardLayout::snipe(), engine, wallets_path_arg, token_address)?;
    if session.ledger().is_empty() {
        println!("{} No wallets configured. Use the 'wallets add' command first.", style("⚠️").yellow());
        return Ok(());
    }
    match session.token_address() {
        Some(token) => println!("{} {}", info_style.apply_to("Using token:"), token),
        None => println!("{} No --token given; token balances will read 0.", style("⚠️").yellow()),
    }

    if let RefreshOutcome::Skipped = session.refresh_balances().await? {
        info!("Balance refresh already in flight; showing cached balances");
    }

    let ledger = session.ledger();
    let mut table = Table::new();
    table.add_row(row!["Role", "Address", "BNB Balance", "Token Balance"]);
    let mut total_native = 0.0;
    let mut total_tokens = 0.0;
    for wallet in ledger.main_wallet().into_iter().chain(ledger.sub_wallets()) {
        total_native += wallet.native_balance;
        total_tokens += wallet.token_balance;
        table.add_row(row![
            wallet.role,
            wallet.address,
            format!("{} BNB", format_native(wallet.native_balance)),
            wallet.token_balance
        ]);
    }
    table.add_row(row!["TOTAL", "", format!("{} BNB", format_native(total_native)), total_tokens]);
    table.printstd();

    println!(
        "\n{} {} sniping wallet(s), main wallet {}",
        info_style.apply_to("ℹ️"),
        ledger.sub_count(),
        ledger.main_wallet().map(|w| w.address.as_str()).unwrap_or("not set")
    );
    Ok(())
}

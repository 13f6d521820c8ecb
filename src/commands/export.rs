use console::{style, Style};
use std::path::Path;

use crate::commands::{build_engine, open_session};
use crate::config::Config;
use crate::errors::Result;
use crate::wizard::WizardLayout;

/// Refreshes balances and writes the wallet table to `output` as CSV.
pub async fn export_wallets(
    config: &Config,
    wallets_path_arg: Option<&str>,
    token_address: Option<&str>,
    output: &Path,
) -> Result<()> {
    let engine = build_engine(config, None)?;
    let mut session = open_session(config, WizardLayout::snipe(), engine, wallets_path_arg, token_address)?;
    if session.ledger().is_empty() {
        println!("{} No wallets to export.", style("⚠️").yellow());
        return Ok(());
    }
    session.refresh_balances().await?;
    session.ledger().export_csv(output)?;
    println!(
        "{} Exported {} wallets to {}",
        Style::new().green().apply_to("✓"),
        session.ledger().len(),
        output.display()
    );
    Ok(())
}

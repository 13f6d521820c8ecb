use console::Style;

use crate::commands::wallet_table;
use crate::config::Config;
use crate::errors::Result;
use crate::ledger::WalletLedger;
use crate::wallet::{get_wallets_path, load_wallets_from_file};

/// Previews a jittered token split over the first `wallet_count` sniping wallets.
/// Offline: nothing is sent and nothing is saved.
pub fn plan_distribution(
    config: &Config,
    wallets_path_arg: Option<&str>,
    total_tokens: u64,
    wallet_count: Option<usize>,
) -> Result<()> {
    let path = get_wallets_path(wallets_path_arg, &config.wallets_path);
    let keys = load_wallets_from_file(&path)?;
    let mut ledger = WalletLedger::new(config.max_sub_wallets);
    ledger.set_wallets(keys.wallets)?;

    let count = wallet_count.unwrap_or_else(|| ledger.sub_count());
    let plan = ledger.apply_token_distribution(total_tokens, count, config.distribution_jitter)?;
    let planned: u64 = plan.iter().sum();

    wallet_table(&ledger).printstd();
    println!(
        "\n{} {} tokens requested, {} planned over {} wallets (±{:.0}% jitter)",
        Style::new().cyan().apply_to("ℹ️"),
        total_tokens,
        planned,
        plan.len(),
        config.distribution_jitter * 100.0
    );
    Ok(())
}

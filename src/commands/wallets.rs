use console::{style, Style};
use prettytable::{row, Table};

use crate::config::Config;
use crate::errors::Result;
use crate::models::wallet::WalletRole;
use crate::wallet::{get_wallets_path, load_wallets_from_file, save_wallets_to_file};

#[derive(Debug, Clone, PartialEq)]
pub enum WalletsAction {
    List,
    Add { address: String, main: bool, name: Option<String> },
    Remove { address: String },
    SetMain { address: String },
}

/// Manage the wallets file
pub fn manage_wallets(config: &Config, wallets_path_arg: Option<&str>, action: WalletsAction) -> Result<()> {
    let info_style = Style::new().cyan();
    let path = get_wallets_path(wallets_path_arg, &config.wallets_path);
    let mut keys = load_wallets_from_file(&path)?;

    let changed = match action {
        WalletsAction::List => false,
        WalletsAction::Add { address, main, name } => {
            let role = if main { WalletRole::Main } else { WalletRole::Sub };
            let subs = keys.wallets.iter().filter(|w| w.role == WalletRole::Sub).count();
            if role == WalletRole::Sub && subs >= config.max_sub_wallets {
                println!("{} Already at the limit of {} sniping wallets.", style("⚠️").yellow(), config.max_sub_wallets);
                return Ok(());
            }
            keys.add_wallet(&address, role, name)?;
            println!("{} Added {} wallet {}", style("✓").green(), role, address);
            true
        }
        WalletsAction::Remove { address } => {
            let removed = keys.remove_wallet(&address)?;
            println!("{} Removed {} wallet {}", style("✓").green(), removed.role, removed.address);
            true
        }
        WalletsAction::SetMain { address } => {
            keys.set_main_wallet(&address)?;
            println!("{} {} is now the main wallet", style("✓").green(), address);
            true
        }
    };
    if changed {
        save_wallets_to_file(&keys, &path)?;
    }

    if keys.wallets.is_empty() {
        println!("{} No wallets in {}", info_style.apply_to("ℹ️"), path.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["Index", "Role", "Address", "Name"]);
    for (index, wallet) in keys.wallets.iter().enumerate() {
        table.add_row(row![index, wallet.role, wallet.address, wallet.name.as_deref().unwrap_or("")]);
    }
    table.printstd();
    println!("\n{} {} wallet(s) in {}", info_style.apply_to("ℹ️"), keys.wallets.len(), path.display());
    if keys.main_wallet().is_none() {
        println!("{}", Style::new().yellow().apply_to("⚠️ No main wallet set. Use 'wallets set-main <address>'."));
    }
    Ok(())
}

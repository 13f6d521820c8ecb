use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use bnb_snipe_console::commands::{
    check_wallets, export_wallets, init_settings, manage_liquidity, manage_wallets, plan_distribution, run_snipe, run_trade,
    run_wizard, LiquidityAction, SnipeOptions, TradeAction, WalletsAction,
};
use bnb_snipe_console::config::Config;
use bnb_snipe_console::wizard::WizardLayout;

#[derive(Parser, Debug)]
#[command(
    name = "bnb-snipe-console",
    author = "Your Name <your.email@example.com>",
    version,
    about = "Coordinate multi-wallet token sniping on BNB Smart Chain through a backend bot service",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional: Path to the JSON file listing the main and sniping wallets.
    #[arg(long, global = true, env = "WALLETS_PATH")]
    wallets_path: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliWizard {
    /// Nine steps with Preset/Advanced modes
    Bundle,
    /// Eight steps, no modes
    Snipe,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write app_settings.json with every setting filled in
    Init {
        /// Where to write (default: ./app_settings.json if present, else ~/.bnb-snipe/)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Manage the wallets file
    Wallets {
        #[command(subcommand)]
        action: Option<WalletsCommand>,
    },
    /// Check BNB and token balances of all wallets
    Check {
        /// Token address to read balances for
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Export the wallet table (Role, Address, BNB Balance, Token Balance) to CSV
    Export {
        #[arg(short, long)]
        token: Option<String>,
        /// Output CSV path
        #[arg(short, long, default_value = "./wallets.csv")]
        output: PathBuf,
    },
    /// Preview a jittered token split over the sniping wallets (offline)
    Plan {
        /// Total token amount to split
        #[arg(long)]
        total: u64,
        /// Number of sniping wallets to use (default: all)
        #[arg(long)]
        wallet_count: Option<usize>,
    },
    /// Plan, estimate fees, fund, simulate and optionally execute a bundle snipe
    Snipe {
        #[arg(short, long)]
        token: String,
        #[arg(long)]
        total: u64,
        #[arg(long)]
        wallet_count: Option<usize>,
        /// Distribute BNB from the main wallet to wallets that need it
        #[arg(long)]
        distribute: bool,
        /// Send this flat BNB amount to every sniping wallet instead of the estimated need
        #[arg(long, requires = "distribute")]
        flat_bnb: Option<f64>,
        /// Submit the bundle after a passing simulation
        #[arg(long)]
        execute: bool,
    },
    /// Buy with one wallet
    Buy {
        #[arg(short, long)]
        token: String,
        /// Wallet address; omit together with --all
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        wallet: Option<String>,
        /// Use every wallet with a balance (or the ones given with --wallets)
        #[arg(long)]
        all: bool,
        /// Comma separated wallet addresses for --all
        #[arg(long, value_delimiter = ',')]
        wallets: Vec<String>,
        /// Percentage of each wallet's BNB to spend (1-100)
        #[arg(long)]
        spend_rate: Option<u8>,
    },
    /// Sell from one wallet or from many
    Sell {
        #[arg(short, long)]
        token: String,
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        wallet: Option<String>,
        #[arg(long)]
        all: bool,
        #[arg(long, value_delimiter = ',')]
        wallets: Vec<String>,
        /// Percentage of tokens to sell (1-100)
        #[arg(short, long)]
        percentage: Option<u8>,
    },
    /// Sweep BNB from sniping wallets back to the main wallet
    Collect {
        #[arg(long, value_delimiter = ',')]
        wallets: Vec<String>,
    },
    /// PancakeSwap pool info and liquidity management
    Liquidity {
        #[arg(short, long)]
        token: String,
        #[command(subcommand)]
        action: Option<LiquidityCommand>,
    },
    /// Interactive step-by-step wizard
    Wizard {
        #[arg(short, long)]
        token: Option<String>,
        #[arg(long, value_enum, default_value_t = CliWizard::Bundle)]
        variant: CliWizard,
    },
}

#[derive(Subcommand, Debug)]
enum WalletsCommand {
    /// List wallets (default)
    List,
    /// Add a wallet
    Add {
        address: String,
        /// Make this the main (deposit) wallet
        #[arg(long)]
        main: bool,
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a wallet
    Remove { address: String },
    /// Make an existing wallet the main wallet
    SetMain { address: String },
}

#[derive(Subcommand, Debug)]
enum LiquidityCommand {
    /// Show pair, reserves and the main wallet's LP balance (default)
    Info,
    /// Add liquidity from the main wallet
    Add {
        #[arg(long)]
        tokens: f64,
        #[arg(long)]
        bnb: f64,
    },
    /// Remove a percentage of the main wallet's liquidity
    Remove {
        #[arg(short, long)]
        percentage: u8,
    },
    /// Burn a percentage of the main wallet's LP tokens
    Burn {
        #[arg(short, long)]
        percentage: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Commands::Init { output, force } = &cli.command {
        // Runs before config load so a broken settings file can be replaced.
        init_settings(output.as_deref(), *force).context("Failed to write settings")?;
        return Ok(());
    }
    let config = Config::load().context("Failed to load configuration")?;
    let wallets_path = cli.wallets_path.as_deref();

    info!("Starting bnb-snipe-console");
    info!("Bot service: {}, RPC: {}", config.bot_service_url, config.bsc_rpc_url);

    match cli.command {
        Commands::Init { .. } => {}

        Commands::Wallets { action } => {
            let action = match action.unwrap_or(WalletsCommand::List) {
                WalletsCommand::List => WalletsAction::List,
                WalletsCommand::Add { address, main, name } => WalletsAction::Add { address, main, name },
                WalletsCommand::Remove { address } => WalletsAction::Remove { address },
                WalletsCommand::SetMain { address } => WalletsAction::SetMain { address },
            };
            manage_wallets(&config, wallets_path, action).context("Failed to manage wallets")?;
        }

        Commands::Check { token } => {
            check_wallets(&config, wallets_path, token.as_deref()).await.context("Failed to check wallets")?;
        }

        Commands::Export { token, output } => {
            export_wallets(&config, wallets_path, token.as_deref(), &output)
                .await
                .context("Failed to export wallets")?;
        }

        Commands::Plan { total, wallet_count } => {
            plan_distribution(&config, wallets_path, total, wallet_count).context("Failed to plan distribution")?;
        }

        Commands::Snipe { token, total, wallet_count, distribute, flat_bnb, execute } => {
            let options = SnipeOptions {
                token_address: token,
                total_tokens: total,
                wallet_count,
                distribute,
                flat_amount: flat_bnb,
                execute,
            };
            run_snipe(&config, wallets_path, options).await.context("Snipe failed")?;
        }

        Commands::Buy { token, wallet, wallets, spend_rate, .. } => {
            let action = match wallet {
                Some(address) => TradeAction::Buy { address, spend_rate },
                None => TradeAction::BuyAll { addresses: wallets, spend_rate },
            };
            run_trade(&config, wallets_path, Some(&token), action).await.context("Failed to buy")?;
        }

        Commands::Sell { token, wallet, wallets, percentage, .. } => {
            let action = match wallet {
                Some(address) => TradeAction::Sell { address, percentage },
                None => TradeAction::SellAll { addresses: wallets, percentage },
            };
            run_trade(&config, wallets_path, Some(&token), action).await.context("Failed to sell")?;
        }

        Commands::Collect { wallets } => {
            run_trade(&config, wallets_path, None, TradeAction::Collect { addresses: wallets })
                .await
                .context("Failed to collect BNB")?;
        }

        Commands::Liquidity { token, action } => {
            let action = match action.unwrap_or(LiquidityCommand::Info) {
                LiquidityCommand::Info => LiquidityAction::Info,
                LiquidityCommand::Add { tokens, bnb } => LiquidityAction::Add { token_amount: tokens, bnb_amount: bnb },
                LiquidityCommand::Remove { percentage } => LiquidityAction::Remove { percentage },
                LiquidityCommand::Burn { percentage } => LiquidityAction::Burn { percentage },
            };
            manage_liquidity(&config, wallets_path, &token, action)
                .await
                .context("Liquidity operation failed")?;
        }

        Commands::Wizard { token, variant } => {
            let layout = match variant {
                CliWizard::Bundle => WizardLayout::bundle_sniping(),
                CliWizard::Snipe => WizardLayout::snipe(),
            };
            run_wizard(&config, wallets_path, token.as_deref(), layout).await.context("Wizard failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x9999999999999999999999999999999999999999";
    const WALLET: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[test]
    fn single_wallet_and_all_are_exclusive() {
        for verb in ["buy", "sell"] {
            assert!(Cli::try_parse_from(["bnb-snipe-console", verb, "--token", TOKEN, "--wallet", WALLET, "--all"]).is_err());
            assert!(Cli::try_parse_from(["bnb-snipe-console", verb, "--token", TOKEN]).is_err());
            assert!(Cli::try_parse_from(["bnb-snipe-console", verb, "--token", TOKEN, "--wallet", WALLET]).is_ok());
            assert!(Cli::try_parse_from(["bnb-snipe-console", verb, "--token", TOKEN, "--all"]).is_ok());
        }
    }

    #[test]
    fn init_takes_output_and_force() {
        let cli = Cli::try_parse_from(["bnb-snipe-console", "init", "--output", "/tmp/s.json", "--force"]).unwrap();
        match cli.command {
            Commands::Init { output, force } => {
                assert_eq!(output, Some(PathBuf::from("/tmp/s.json")));
                assert!(force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

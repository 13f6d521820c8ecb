pub mod check;
pub mod export;
pub mod init;
pub mod liquidity;
pub mod plan;
pub mod snipe;
pub mod trade;
pub mod wallets;
pub mod wizard;

use console::{style, Style};
use prettytable::{row, Table};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;

use crate::api::{HttpBotService, RpcChainReader};
use crate::config::Config;
use crate::errors::Result;
use crate::ledger::WalletLedger;
use crate::models::OperationStatus;
use crate::reconcile::{EngineSettings, ReconciliationEngine};
use crate::session::SnipeSession;
use crate::utils::format_native;
use crate::wallet::{get_wallets_path, load_wallets_from_file};
use crate::wizard::WizardLayout;

pub use check::check_wallets;
pub use export::export_wallets;
pub use init::init_settings;
pub use liquidity::{manage_liquidity, LiquidityAction};
pub use plan::plan_distribution;
pub use snipe::{run_snipe, SnipeOptions};
pub use trade::{run_trade, TradeAction};
pub use wallets::{manage_wallets, WalletsAction};
pub use wizard::run_wizard;

/// Terminal lines for one status.
pub fn render_status(status: &OperationStatus) -> Vec<String> {
    match status {
        OperationStatus::Started(label) => vec![format!("{} {}", Style::new().cyan().apply_to("⏳"), label)],
        OperationStatus::Log(message) => vec![format!("   {}", message)],
        OperationStatus::Success(message) => vec![format!("{} {}", style("✓").green(), message)],
        OperationStatus::Failure(message) => vec![format!("{} {}", style("✗").red(), message)],
        OperationStatus::Fault(fault) => vec![
            format!("{} {}", style("⚠️").yellow(), fault),
            format!("   {}", fault.remediation()),
        ],
        OperationStatus::BatchSummary { label, successful, failed } => {
            let counts = format!("{} succeeded, {} failed", successful, failed);
            if *failed > 0 {
                vec![format!("{} {}: {}", style("⚠️").yellow(), label, style(counts).yellow())]
            } else {
                vec![format!("{} {}: {}", style("✓").green(), label, counts)]
            }
        }
    }
}

/// Prints engine statuses as they arrive, failures on stderr. Ends when every
/// sender is dropped.
pub fn spawn_status_printer() -> (UnboundedSender<OperationStatus>, JoinHandle<()>) {
    let (sender, mut receiver) = unbounded_channel::<OperationStatus>();
    let handle = tokio::spawn(async move {
        while let Some(status) = receiver.recv().await {
            for line in render_status(&status) {
                if status.is_failure() {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            }
        }
    });
    (sender, handle)
}

/// Wires the HTTP backend and RPC reader into an engine.
pub fn build_engine(config: &Config, status: Option<UnboundedSender<OperationStatus>>) -> Result<Arc<ReconciliationEngine>> {
    let service = Arc::new(HttpBotService::new(config)?);
    let reader = Arc::new(RpcChainReader::new(config)?);
    let mut engine = ReconciliationEngine::new(service.clone(), reader, service, EngineSettings::from(config));
    if let Some(sender) = status {
        engine = engine.with_status_sender(sender);
    }
    Ok(Arc::new(engine))
}

/// Builds a session over the wallets file, optionally bound to a token.
pub fn open_session(
    config: &Config,
    layout: WizardLayout,
    engine: Arc<ReconciliationEngine>,
    wallets_path_arg: Option<&str>,
    token_address: Option<&str>,
) -> Result<SnipeSession> {
    let path = get_wallets_path(wallets_path_arg, &config.wallets_path);
    let keys = load_wallets_from_file(&path)?;
    let mut session = SnipeSession::new(layout, engine, config.max_sub_wallets, config.distribution_jitter);
    session.set_wallets(keys.wallets)?;
    if let Some(token) = token_address {
        session.set_token_address(token)?;
    }
    Ok(session)
}

/// Role / address / balances / plan / need table shared by several commands.
pub fn wallet_table(ledger: &WalletLedger) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Role", "Address", "BNB Balance", "Token Balance", "Planned", "BNB Needed", "Selected"]);
    for wallet in ledger.main_wallet().into_iter().chain(ledger.sub_wallets()) {
        let needed = if wallet.has_outstanding_need() {
            style(format_native(wallet.native_needed)).red().to_string()
        } else {
            "-".to_string()
        };
        table.add_row(row![
            wallet.role,
            wallet.address,
            format_native(wallet.native_balance),
            wallet.token_balance,
            wallet.planned_token_amount,
            needed,
            if wallet.selected_for_batch_op { "yes" } else { "" }
        ]);
    }
    table
}

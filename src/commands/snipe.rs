use console::{style, Style};
use log::{info, warn};

use crate::commands::{build_engine, open_session, spawn_status_printer, wallet_table};
use crate::config::Config;
use crate::errors::{Result, SniperError};
use crate::models::reconciliation::ReconciliationResult;
use crate::reconcile::DistributionAmounts;
use crate::session::SnipeSession;
use crate::utils::format_native;
use crate::wizard::WizardLayout;

#[derive(Debug, Clone, PartialEq)]
pub struct SnipeOptions {
    pub token_address: String,
    pub total_tokens: u64,
    pub wallet_count: Option<usize>,
    /// Fund short wallets from the main wallet when the estimate asks for it.
    pub distribute: bool,
    /// Flat BNB amount per wallet instead of each wallet's estimated need.
    pub flat_amount: Option<f64>,
    /// Actually submit the bundle after a passing simulation.
    pub execute: bool,
}

/// Non-interactive pass over the bundle flow: plan, estimate, fund,
/// simulate and (with `execute`) submit.
pub async fn run_snipe(config: &Config, wallets_path_arg: Option<&str>, options: SnipeOptions) -> Result<()> {
    let header = Style::new().cyan().bold();
    let (status_tx, printer) = spawn_status_printer();
    let engine = build_engine(config, Some(status_tx))?;
    let mut session = open_session(
        config,
        WizardLayout::bundle_sniping(),
        engine,
        wallets_path_arg,
        Some(&options.token_address),
    )?;

    let outcome = drive(&mut session, &options, &header).await;
    drop(session);
    if let Err(e) = printer.await {
        warn!("Status printer ended abnormally: {}", e);
    }
    outcome
}

async fn drive(session: &mut SnipeSession, options: &SnipeOptions, header: &Style) -> Result<()> {
    if session.ledger().main_wallet().is_none() {
        return Err(SniperError::Wallet("No main wallet configured".to_string()));
    }

    println!("\n{}", header.apply_to("1. Balances"));
    session.refresh_balances().await?;

    println!("\n{}", header.apply_to("2. Token plan"));
    let count = options.wallet_count.unwrap_or_else(|| session.ledger().sub_count());
    let plan = session.plan_distribution(options.total_tokens, count)?;
    info!("Planned {} tokens over {} wallets", plan.iter().sum::<u64>(), plan.len());

    println!("\n{}", header.apply_to("3. Fee estimate"));
    let mut result = session.estimate_fees().await?;
    wallet_table(session.ledger()).printstd();
    print_estimate(&result);

    if session.can_distribute() {
        if !options.distribute {
            println!(
                "{} Sniping wallets need {} BNB. Re-run with --distribute to fund them.",
                style("⚠️").yellow(),
                format_native(session.ledger().total_sub_native_needed())
            );
            return Ok(());
        }
        println!("\n{}", header.apply_to("4. Distribution"));
        let amounts = match options.flat_amount {
            Some(amount) => DistributionAmounts::Flat(amount),
            None => DistributionAmounts::Needed,
        };
        let distribution = session.distribute(amounts).await?;
        match distribution.reestimate {
            Some(fresh) => result = fresh,
            None => return Err(SniperError::Backend("Re-estimation after distribution failed".to_string())),
        }
        wallet_table(session.ledger()).printstd();
        print_estimate(&result);
    }

    if !result.sufficient_balance {
        println!("{} Main wallet can't cover the operation; stopping.", style("✗").red());
        return Ok(());
    }

    println!("\n{}", header.apply_to("5. Simulation"));
    session.simulate().await?;

    if !options.execute {
        println!("{} Simulation passed. Re-run with --execute to submit the bundle.", style("✓").green());
        return Ok(());
    }
    if !session.can_execute() {
        println!("{} Execution gate closed: some wallets still need BNB.", style("✗").red());
        return Ok(());
    }

    println!("\n{}", header.apply_to("6. Execution"));
    let executed = session.execute().await?;
    if let Some(hash) = executed.tx_hash {
        println!("{} Bundle submitted: {}", style("✓").green(), hash);
    }
    wallet_table(session.ledger()).printstd();
    Ok(())
}

pub(crate) fn print_estimate(result: &ReconciliationResult) {
    println!("  Total BNB needed:     {}", format_native(result.total_native_needed));
    println!("  To distribute:        {}", format_native(result.total_for_distribution));
    println!("  Gas cost:             {}", format_native(result.gas_cost));
    if let Some(tip) = result.tip_amount {
        println!("  Tip:                  {}", format_native(tip));
    }
    if let Some(liquidity) = result.liquidity_amount {
        println!("  Liquidity:            {}", format_native(liquidity));
    }
    if let Some(pool) = &result.pool_simulation {
        println!(
            "  Pool: {} / {} -> {} / {} (impact {:.2}%)",
            format_native(pool.before.native),
            pool.before.token,
            format_native(pool.after.native),
            pool.after.token,
            pool.price_impact_percent
        );
    }
    let verdict = if result.sufficient_balance { style("sufficient").green() } else { style("insufficient").red() };
    println!("  Balance:              {}", verdict);
}

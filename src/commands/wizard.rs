use console::{style, Style};
use log::warn;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::liquidity::print_pool;
use crate::commands::snipe::print_estimate;
use crate::commands::{build_engine, open_session, spawn_status_printer, wallet_table};
use crate::config::Config;
use crate::errors::{Result, SniperError};
use crate::reconcile::DistributionAmounts;
use crate::session::{NoticeLevel, SnipeDialog, SnipeSession};
use crate::wizard::presets::{find_preset, PRESETS};
use crate::wizard::{WizardLayout, WizardMode};

const HELP: &str = "next | back | mode <preset|advanced> | preset <name> | token <address> | plan <total> [count] | \
estimate | distribute [flat_bnb] | simulate | execute | sell [address] | refresh | pool | wallets | restart | quit";

enum Flow {
    Continue,
    Restart,
    Quit,
}

/// Interactive terminal wizard over one session at a time.
pub async fn run_wizard(
    config: &Config,
    wallets_path_arg: Option<&str>,
    token_address: Option<&str>,
    layout: WizardLayout,
) -> Result<()> {
    let (status_tx, printer) = spawn_status_printer();
    let engine = build_engine(config, Some(status_tx))?;
    let mut dialog = SnipeDialog::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    'dialog: loop {
        if !dialog.is_open() {
            let fresh = open_session(config, layout, engine.clone(), wallets_path_arg, token_address)?;
            dialog.open_with(|| fresh);
        }
        println!("\n{} {}", Style::new().cyan().bold().apply_to(layout.name), style("wizard").dim());
        println!("{}", style(HELP).dim());

        loop {
            let Some(session) = dialog.session_mut() else { break 'dialog };
            render(session);
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else { break 'dialog };
            match handle(session, line.trim()).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Restart) => {
                    dialog.close();
                    continue 'dialog;
                }
                Ok(Flow::Quit) => break 'dialog,
                Err(e) => println!("{} {}", style("✗").red(), e),
            }
        }
    }

    dialog.close();
    drop(engine);
    if let Err(e) = printer.await {
        warn!("Status printer ended abnormally: {}", e);
    }
    Ok(())
}

fn render(session: &SnipeSession) {
    let wizard = session.wizard();
    let (index, total) = wizard.progress();
    let mode = if wizard.layout().offers_modes {
        match wizard.mode() {
            WizardMode::Preset => " [Preset]",
            WizardMode::Advanced => " [Advanced]",
        }
    } else {
        ""
    };
    println!(
        "\n{} {}{}",
        style(format!("Step {}/{}:", index, total)).bold(),
        Style::new().cyan().apply_to(wizard.current_step()),
        mode
    );
    println!(
        "  token: {}  next: {}  estimate: {}  distribute: {}  simulate: {}  execute: {}",
        session.token_address().unwrap_or("-"),
        flag(session.can_advance()),
        flag(session.can_estimate()),
        flag(session.can_distribute()),
        flag(session.can_simulate()),
        flag(session.can_execute())
    );
    if let Some(fault) = session.fault() {
        println!("  {} {}", style("Insufficient BNB:").yellow().bold(), fault);
        println!("  {}", fault.remediation());
    }
    if let Some(notice) = session.last_notice() {
        let styled = match notice.level {
            NoticeLevel::Info => style(notice.message.clone()).cyan(),
            NoticeLevel::Success => style(notice.message.clone()).green(),
            NoticeLevel::Error => style(notice.message.clone()).red(),
        };
        println!("  {}", styled);
    }
}

fn flag(open: bool) -> console::StyledObject<&'static str> {
    if open {
        style("yes").green()
    } else {
        style("no").dim()
    }
}

fn parse_arg<T: std::str::FromStr>(raw: Option<&str>, what: &str) -> Result<T> {
    let raw = raw.ok_or_else(|| SniperError::InvalidInput(format!("Missing {}", what)))?;
    raw.parse::<T>()
        .map_err(|_| SniperError::InvalidInput(format!("Invalid {}: {}", what, raw)))
}

async fn handle(session: &mut SnipeSession, line: &str) -> Result<Flow> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else { return Ok(Flow::Continue) };

    match command.to_ascii_lowercase().as_str() {
        "next" => {
            if session.can_advance() {
                session.wizard_mut().advance();
            } else {
                println!("{} This step isn't complete yet.", style("⚠️").yellow());
            }
        }
        "back" => {
            session.wizard_mut().retreat();
        }
        "mode" => {
            let mode = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                Some("preset") => WizardMode::Preset,
                Some("advanced") => WizardMode::Advanced,
                _ => return Err(SniperError::InvalidInput("Usage: mode <preset|advanced>".to_string())),
            };
            if !session.wizard().layout().offers_modes {
                println!("{} This wizard has no modes.", style("ℹ️").cyan());
            }
            session.wizard_mut().set_mode(mode);
        }
        "preset" => {
            if !session.wizard().layout().offers_modes || session.wizard().mode() != WizardMode::Preset {
                return Err(SniperError::InvalidInput("Presets are only available in Preset mode".to_string()));
            }
            let Some(name) = parts.next() else {
                for preset in PRESETS {
                    println!("  {:<14} {}", preset.name, preset.description);
                }
                return Ok(Flow::Continue);
            };
            let preset = find_preset(name)
                .ok_or_else(|| SniperError::InvalidInput(format!("Unknown preset: {}", name)))?;
            session.apply_preset(preset)?;
        }
        "token" => {
            let address = parts.next().ok_or_else(|| SniperError::InvalidInput("Usage: token <address>".to_string()))?;
            session.set_token_address(address)?;
        }
        "plan" => {
            let total: u64 = parse_arg(parts.next(), "total token amount")?;
            let count = match parts.next() {
                Some(raw) => parse_arg(Some(raw), "wallet count")?,
                None => session.ledger().sub_count(),
            };
            session.plan_distribution(total, count)?;
            wallet_table(session.ledger()).printstd();
        }
        "estimate" => {
            let result = session.estimate_fees().await?;
            wallet_table(session.ledger()).printstd();
            print_estimate(&result);
        }
        "distribute" => {
            let amounts = match parts.next() {
                Some(raw) => DistributionAmounts::Flat(parse_arg(Some(raw), "BNB amount")?),
                None => DistributionAmounts::Needed,
            };
            if !session.can_distribute() && amounts == DistributionAmounts::Needed {
                println!("{} No sniping wallet needs BNB right now.", style("ℹ️").cyan());
                return Ok(Flow::Continue);
            }
            let outcome = session.distribute(amounts).await?;
            if let Some(result) = &outcome.reestimate {
                print_estimate(result);
            }
        }
        "simulate" => session.simulate().await?,
        "execute" => {
            let outcome = session.execute().await?;
            if let Some(hash) = outcome.tx_hash {
                println!("{} {}", style("Bundle:").green(), hash);
            }
        }
        "sell" => match parts.next() {
            Some(address) => {
                session.single_wallet_sell(address).await?;
            }
            None => {
                session.refresh_balances().await?;
                session.select_all_eligible();
                session.multi_wallet_sell().await?;
            }
        },
        "refresh" => {
            session.refresh_balances().await?;
            wallet_table(session.ledger()).printstd();
        }
        "pool" => print_pool(session).await?,
        "wallets" => {
            wallet_table(session.ledger()).printstd();
        }
        "restart" => return Ok(Flow::Restart),
        "quit" | "exit" | "close" => return Ok(Flow::Quit),
        "help" | "?" => println!("{}", HELP),
        other => println!("Unknown command '{}'. {}", other, HELP),
    }
    Ok(Flow::Continue)
}

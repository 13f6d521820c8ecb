//! Readiness predicates for wizard steps and action buttons.
//!
//! Pure functions over the ledger, the current estimate and the wizard
//! session. The state machine never calls these; renderers do.

use crate::ledger::WalletLedger;
use crate::models::reconciliation::ReconciliationResult;
use crate::wizard::{WizardSession, WizardStep};

pub fn wallets_ready(ledger: &WalletLedger) -> bool {
    ledger.main_wallet().is_some() && ledger.sub_count() > 0
}

pub fn can_estimate(ledger: &WalletLedger) -> bool {
    wallets_ready(ledger) && ledger.has_positive_plan()
}

/// Distribution only makes sense once an estimate says some wallet is short.
pub fn can_distribute(ledger: &WalletLedger, result: Option<&ReconciliationResult>) -> bool {
    result.is_some() && ledger.main_wallet().is_some() && ledger.any_sub_needs_native()
}

pub fn can_simulate(ledger: &WalletLedger, result: Option<&ReconciliationResult>) -> bool {
    result.is_some() && can_estimate(ledger)
}

/// Per-wallet needs block execution even when the aggregate says sufficient.
pub fn can_execute(ledger: &WalletLedger, result: Option<&ReconciliationResult>) -> bool {
    match result {
        Some(result) => result.sufficient_balance && ledger.has_positive_plan() && !ledger.any_sub_needs_native(),
        None => false,
    }
}

pub fn can_batch_operate(ledger: &WalletLedger) -> bool {
    !ledger.selected_wallets().is_empty()
}

pub fn can_advance(ledger: &WalletLedger, result: Option<&ReconciliationResult>, session: &WizardSession) -> bool {
    match session.current_step() {
        WizardStep::Introduction | WizardStep::ModeSelection | WizardStep::LiquidityManagement => true,
        WizardStep::PresetConfiguration => ledger.has_positive_plan(),
        WizardStep::WalletSetup => {
            // Without a configuration step the plan must already be in place here.
            let plan_elsewhere = session.layout().contains(WizardStep::SnipeConfiguration);
            wallets_ready(ledger) && (plan_elsewhere || ledger.has_positive_plan())
        }
        WizardStep::SnipeConfiguration => can_estimate(ledger),
        WizardStep::FeeDistribution => can_execute(ledger, result),
        WizardStep::Simulation => session.simulation_passed && can_execute(ledger, result),
        WizardStep::Execution => session.executed,
        WizardStep::PostOperation => false,
    }
}

pub fn can_retreat(session: &WizardSession) -> bool {
    !session.is_first_step() && !session.executed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wallet::{WalletBalance, WalletEntry};
    use crate::wizard::WizardLayout;

    const MAIN: &str = "0x1111111111111111111111111111111111111111";
    const SUB_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const SUB_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn planned_ledger() -> WalletLedger {
        let mut ledger = WalletLedger::new(50);
        ledger
            .set_wallets(vec![WalletEntry::main(MAIN), WalletEntry::sub(SUB_A), WalletEntry::sub(SUB_B)])
            .unwrap();
        ledger.apply_planned_amounts(&[1_000, 2_000]);
        ledger
    }

    fn sufficient() -> ReconciliationResult {
        ReconciliationResult {
            total_native_needed: 1.0,
            total_for_distribution: 0.0,
            gas_cost: 0.01,
            tip_amount: None,
            liquidity_amount: None,
            sufficient_balance: true,
            pool_simulation: None,
        }
    }

    #[test]
    fn execute_blocked_by_any_sub_need() {
        let mut ledger = planned_ledger();
        let result = sufficient();
        assert!(can_execute(&ledger, Some(&result)));

        ledger.get_mut(SUB_B).unwrap().native_needed = 0.02;
        assert!(!can_execute(&ledger, Some(&result)));
        assert!(can_distribute(&ledger, Some(&result)));
    }

    #[test]
    fn execute_requires_estimate_and_plan() {
        let mut ledger = planned_ledger();
        assert!(!can_execute(&ledger, None));
        let mut result = sufficient();
        result.sufficient_balance = false;
        assert!(!can_execute(&ledger, Some(&result)));
        ledger.apply_planned_amounts(&[0, 0]);
        assert!(!can_execute(&ledger, Some(&sufficient())));
    }

    #[test]
    fn batch_needs_a_selection() {
        let mut ledger = planned_ledger();
        assert!(!can_batch_operate(&ledger));
        ledger.merge_balances(&[WalletBalance { address: SUB_A.to_string(), native_balance: 0.1, token_amount: 0.0 }]);
        ledger.set_selected(SUB_A, true).unwrap();
        assert!(can_batch_operate(&ledger));
    }

    #[test]
    fn wallet_setup_gate_depends_on_layout() {
        let mut ledger = planned_ledger();
        ledger.apply_planned_amounts(&[]);
        let mut bundle = WizardSession::new(WizardLayout::bundle_sniping());
        bundle.jump_to(WizardStep::WalletSetup);
        assert!(!can_advance(&ledger, None, &bundle));

        let mut snipe = WizardSession::new(WizardLayout::snipe());
        snipe.jump_to(WizardStep::WalletSetup);
        assert!(can_advance(&ledger, None, &snipe));
    }

    #[test]
    fn simulation_step_needs_a_pass() {
        let ledger = planned_ledger();
        let result = sufficient();
        let mut session = WizardSession::new(WizardLayout::snipe());
        session.jump_to(WizardStep::Simulation);
        assert!(!can_advance(&ledger, Some(&result), &session));
        session.simulation_passed = true;
        assert!(can_advance(&ledger, Some(&result), &session));
    }
}

mod common;

use std::time::Duration;
use tokio::time::Instant;

use bnb_snipe_console::errors::SniperError;
use bnb_snipe_console::models::api::{ActionResponse, BatchResponse, EstimateFeesResponse, LiquidityResponse};
use bnb_snipe_console::models::wallet::WalletRole;
use bnb_snipe_console::models::OperationStatus;
use bnb_snipe_console::reconcile::failures::FailureKind;
use bnb_snipe_console::reconcile::DistributionAmounts;
use bnb_snipe_console::wizard::WizardLayout;
use common::{drain, estimate, harness, harness_with_status, wallet_result, Harness, MAIN, SUB_A, SUB_B, SUB_C};

/// Two sniping wallets with a plan and a funded main wallet.
async fn planned(main_balance: f64) -> Harness {
    let mut h = harness(WizardLayout::bundle_sniping(), &[SUB_A, SUB_B]);
    h.reader.set_balance(MAIN, main_balance, 0.0);
    h.session.refresh_balances().await.unwrap();
    h.session.plan_distribution(1_000_000, 2).unwrap();
    h
}

#[tokio::test(start_paused = true)]
async fn estimate_never_keeps_values_from_previous_call() {
    let mut h = planned(10.0).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.1, 0.5), (SUB_B, 0.1, 0.3)], 1.0));
    h.service.push_estimate(estimate(&[(SUB_A, 0.1, 0.2)], 0.5));

    h.session.estimate_fees().await.unwrap();
    assert_eq!(h.session.ledger().get(SUB_B).unwrap().native_needed, 0.3);
    assert_eq!(h.session.ledger().get(SUB_B).unwrap().native_shortfall, 0.3);

    let second = h.session.estimate_fees().await.unwrap();
    let a = h.session.ledger().get(SUB_A).unwrap();
    let b = h.session.ledger().get(SUB_B).unwrap();
    assert_eq!(a.native_needed, 0.2);
    assert_eq!(b.native_needed, 0.0);
    assert_eq!(b.native_shortfall, 0.0);
    assert_eq!(second.total_native_needed, 0.5);
    assert_eq!(h.session.reconciliation(), Some(&second));
}

#[tokio::test(start_paused = true)]
async fn short_main_wallet_raises_main_fault() {
    let mut h = planned(0.1).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.4, 0.5), (SUB_B, 0.4, 0.5)], 1.0));

    let result = h.session.estimate_fees().await.unwrap();
    assert!(!result.sufficient_balance);
    let fault = h.session.fault().unwrap();
    assert_eq!(fault.wallet_role, Some(WalletRole::Main));
    assert!((fault.missing - 0.9).abs() < 1e-9);
    assert!(!h.session.can_execute());
}

#[tokio::test(start_paused = true)]
async fn liquidity_marker_maps_to_distinct_error() {
    let mut h = planned(10.0).await;
    *h.service.estimate_transport_error.lock().unwrap() =
        Some("execution reverted: PancakeLibrary: INSUFFICIENT_LIQUIDITY".to_string());

    let err = h.session.estimate_fees().await.unwrap_err();
    assert!(matches!(err, SniperError::InsufficientLiquidity));
    assert!(h.session.reconciliation().is_none());
    assert!(h.session.fault().is_none());
}

#[tokio::test(start_paused = true)]
async fn unknown_estimate_failure_is_verbatim() {
    let mut h = planned(10.0).await;
    h.service.push_estimate(EstimateFeesResponse {
        success: false,
        error: Some("token not tradable".to_string()),
        ..Default::default()
    });

    match h.session.estimate_fees().await.unwrap_err() {
        SniperError::Backend(raw) => assert_eq!(raw, "token not tradable"),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn simulate_shortfall_corrects_last_estimate() {
    let mut h = planned(10.0).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.2, 0.25), (SUB_B, 0.2, 0.0)], 0.5));
    h.session.estimate_fees().await.unwrap();
    *h.service.simulate_response.lock().unwrap() = Some(ActionResponse::failed(format!(
        "Insufficient funds for address {} have 1000000000000000000 want 2000000000000000000",
        SUB_A
    )));

    let err = h.session.simulate().await.unwrap_err();
    let fault = err.fault().cloned().unwrap();
    assert_eq!(fault.available, 1.0);
    assert_eq!(fault.required, 2.0);
    assert_eq!(fault.missing, 1.0);
    assert_eq!(fault.wallet_role, Some(WalletRole::Sub));

    let wallet = h.session.ledger().get(SUB_A).unwrap();
    assert!((wallet.native_needed - 1.25).abs() < 1e-9);
    assert_eq!(wallet.fault.as_ref(), Some(&fault));
    let result = h.session.reconciliation().unwrap();
    assert!(!result.sufficient_balance);
    assert!((result.total_native_needed - 1.5).abs() < 1e-9);
    assert!(!h.session.wizard().simulation_passed);
}

#[tokio::test(start_paused = true)]
async fn simulate_unknown_failure_is_generic() {
    let mut h = planned(10.0).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.2, 0.0), (SUB_B, 0.2, 0.0)], 0.5));
    h.session.estimate_fees().await.unwrap();
    *h.service.simulate_response.lock().unwrap() = Some(ActionResponse::failed("bundle reverted"));

    match h.session.simulate().await.unwrap_err() {
        SniperError::SimulationFailed(raw) => assert_eq!(raw, "bundle reverted"),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn execute_gate_blocks_on_any_sub_need() {
    let mut h = planned(10.0).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.2, 0.0), (SUB_B, 0.2, 0.02)], 0.5));

    let result = h.session.estimate_fees().await.unwrap();
    assert!(result.sufficient_balance);
    assert!(!h.session.can_execute());
    assert!(h.session.can_distribute());

    let err = h.session.execute().await.unwrap_err();
    assert!(matches!(err, SniperError::InvalidInput(_)));
    assert!(!h.service.calls().contains(&"execute_bundle".to_string()));
}

#[tokio::test(start_paused = true)]
async fn distribution_waits_for_settlement_then_reestimates() {
    let mut h = planned(10.0).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.2, 0.5), (SUB_B, 0.2, 0.3)], 1.0));
    h.service.push_estimate(estimate(&[(SUB_A, 0.2, 0.0), (SUB_B, 0.2, 0.0)], 1.0));
    h.session.estimate_fees().await.unwrap();
    let fetches_before = h.reader.fetch_count();
    let start = Instant::now();

    let outcome = h.session.distribute(DistributionAmounts::Needed).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(3));
    assert_eq!(outcome.amounts, vec![0.5, 0.3]);
    assert!((outcome.total_sent - 0.8).abs() < 1e-9);
    let distributed = h.service.distributions.lock().unwrap()[0].clone();
    assert_eq!(distributed.deposit_wallet, MAIN);
    assert_eq!(distributed.sub_wallets, vec![SUB_A.to_string(), SUB_B.to_string()]);
    assert_eq!(h.reader.fetch_count(), fetches_before + 1);
    assert_eq!(
        h.service.calls(),
        vec!["estimate_fees", "distribute_bnb", "estimate_fees"]
    );
    assert!(outcome.reestimate.is_some());
    assert!(h.session.can_execute());
}

#[tokio::test(start_paused = true)]
async fn flat_distribution_ignores_estimated_need() {
    let mut h = planned(10.0).await;
    h.session.distribute(DistributionAmounts::Flat(0.05)).await.unwrap();
    let distributed = h.service.distributions.lock().unwrap()[0].clone();
    assert_eq!(distributed.amounts, vec![0.05, 0.05]);
}

#[tokio::test(start_paused = true)]
async fn nothing_to_distribute_is_rejected() {
    let mut h = planned(10.0).await;
    let err = h.session.distribute(DistributionAmounts::Needed).await.unwrap_err();
    assert!(matches!(err, SniperError::InvalidInput(_)));
    assert!(h.service.distributions.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn distribution_shortfall_reports_missing_amount() {
    let mut h = planned(0.5).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.2, 0.75), (SUB_B, 0.2, 0.5)], 1.25));
    h.session.estimate_fees().await.unwrap();
    *h.service.distribute_response.lock().unwrap() = Some(ActionResponse::failed(
        "Insufficient wallet balance for distribution. Required: ~1.25 BNB, Found: 0.5 BNB",
    ));

    let err = h.session.distribute(DistributionAmounts::Needed).await.unwrap_err();
    let fault = err.fault().unwrap();
    assert_eq!(fault.wallet_address, MAIN);
    assert_eq!(fault.wallet_role, Some(WalletRole::Main));
    assert!((fault.missing - 0.75).abs() < 1e-9);
    assert_eq!(h.session.fault(), Some(fault));
}

#[tokio::test(start_paused = true)]
async fn execution_refreshes_after_settlement() {
    let mut h = planned(10.0).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.2, 0.0), (SUB_B, 0.2, 0.0)], 0.5));
    h.session.estimate_fees().await.unwrap();
    h.session.simulate().await.unwrap();
    assert!(h.session.wizard().simulation_passed);
    *h.service.execute_response.lock().unwrap() = Some(ActionResponse {
        success: true,
        tx_hash: Some("0xbundle".to_string()),
        ..Default::default()
    });
    let fetches_before = h.reader.fetch_count();
    let start = Instant::now();

    let outcome = h.session.execute().await.unwrap();

    assert_eq!(outcome.tx_hash.as_deref(), Some("0xbundle"));
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(h.reader.fetch_count(), fetches_before + 1);
    assert!(h.session.wizard().executed);
}

#[tokio::test(start_paused = true)]
async fn execution_clears_fault_left_by_liquidity_failure() {
    let mut h = planned(10.0).await;
    h.service.push_estimate(estimate(&[(SUB_A, 0.2, 0.0), (SUB_B, 0.2, 0.0)], 0.5));
    h.session.estimate_fees().await.unwrap();
    *h.service.liquidity_response.lock().unwrap() = Some(LiquidityResponse {
        success: false,
        error: Some("Insufficient BNB balance for fees".to_string()),
        ..Default::default()
    });
    assert!(h.session.add_liquidity(1_000.0, 0.5).await.is_err());
    assert_eq!(h.session.fault().unwrap().wallet_role, Some(WalletRole::Main));
    assert!(h.session.ledger().get(MAIN).unwrap().fault.is_some());
    assert!(h.session.can_execute());

    h.session.execute().await.unwrap();

    assert!(h.session.fault().is_none());
    assert!(h.session.ledger().get(MAIN).unwrap().fault.is_none());
}

#[tokio::test(start_paused = true)]
async fn batch_sell_reports_partial_failure() {
    let mut h = harness(WizardLayout::snipe(), &[SUB_A, SUB_B, SUB_C]);
    for sub in [SUB_A, SUB_B, SUB_C] {
        h.reader.set_balance(sub, 0.0001, 500.0);
    }
    h.session.refresh_balances().await.unwrap();
    assert_eq!(h.session.select_all_eligible(), 3);
    *h.service.batch_response.lock().unwrap() = Some(BatchResponse {
        success: true,
        error: None,
        results: vec![
            wallet_result(SUB_A, None),
            wallet_result(SUB_B, Some("Insufficient gas funds")),
            wallet_result(SUB_C, None),
        ],
    });

    let outcome = h.session.multi_wallet_sell().await.unwrap();

    assert_eq!(outcome.successful, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].address, SUB_B);

    let ledger = h.session.ledger();
    let fault = ledger.get(SUB_B).unwrap().fault.clone().unwrap();
    assert_eq!(fault.available, 0.0001);
    assert!((fault.missing - 0.0005).abs() < 1e-12);
    assert!(ledger.get(SUB_A).unwrap().fault.is_none());
    assert!(ledger.get(SUB_C).unwrap().fault.is_none());
    assert_eq!(h.session.fault(), Some(&fault));

    let trade = h.service.trades.lock().unwrap()[0].clone();
    assert_eq!(trade.wallets.len(), 3);
    assert!(trade.wallets.iter().all(|w| w.percentage == 100));
}

#[tokio::test(start_paused = true)]
async fn batch_without_selection_is_rejected() {
    let mut h = harness(WizardLayout::snipe(), &[SUB_A]);
    let err = h.session.multi_wallet_buy().await.unwrap_err();
    assert!(matches!(err, SniperError::InvalidInput(_)));
    assert!(h.service.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn single_sell_slippage_has_no_fault() {
    let mut h = harness(WizardLayout::snipe(), &[SUB_A]);
    h.session.set_sell_percentage(SUB_A, 40).unwrap();
    *h.service.single_response.lock().unwrap() =
        Some(ActionResponse::failed("PancakeRouter: INSUFFICIENT_OUTPUT_AMOUNT"));

    let err = h.session.single_wallet_sell(SUB_A).await.unwrap_err();
    assert!(matches!(err, SniperError::SlippageExceeded));
    assert!(h.session.fault().is_none());
    assert_eq!(h.service.sells.lock().unwrap()[0].sell_percentage, 40);
}

#[tokio::test(start_paused = true)]
async fn successful_action_clears_previous_fault() {
    let mut h = harness(WizardLayout::snipe(), &[SUB_A]);
    *h.service.single_response.lock().unwrap() = Some(ActionResponse::failed("Insufficient BNB balance for fees"));
    assert!(h.session.single_wallet_sell(SUB_A).await.is_err());
    assert!(h.session.fault().is_some());

    *h.service.single_response.lock().unwrap() = Some(ActionResponse::ok());
    h.session.single_wallet_sell(SUB_A).await.unwrap();
    assert!(h.session.fault().is_none());
    assert!(h.session.ledger().get(SUB_A).unwrap().fault.is_none());
}

#[tokio::test(start_paused = true)]
async fn liquidity_percentage_out_of_range_is_rejected() {
    let mut h = harness(WizardLayout::snipe(), &[SUB_A]);
    let err = h.session.burn_liquidity(0).await.unwrap_err();
    assert!(matches!(err, SniperError::InvalidInput(_)));
    assert!(h.service.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn liquidity_gas_failure_faults_main_wallet() {
    let mut h = harness(WizardLayout::snipe(), &[SUB_A]);
    h.reader.set_balance(MAIN, 0.001, 0.0);
    h.session.refresh_balances().await.unwrap();
    *h.service.liquidity_response.lock().unwrap() = Some(LiquidityResponse {
        success: false,
        error: Some("Insufficient BNB balance for fees".to_string()),
        ..Default::default()
    });

    let err = h.session.add_liquidity(1_000.0, 0.5).await.unwrap_err();

    let fault = err.fault().unwrap();
    assert_eq!(fault.wallet_address, MAIN);
    assert_eq!(fault.wallet_role, Some(WalletRole::Main));
    assert_eq!(fault.available, 0.001);
    assert_eq!(h.service.calls(), vec!["add_liquidity"]);
}

#[tokio::test(start_paused = true)]
async fn batch_counts_wallets_without_result_as_failed() {
    let (mut h, mut status) = harness_with_status(WizardLayout::snipe(), &[SUB_A, SUB_B]);
    for sub in [SUB_A, SUB_B] {
        h.reader.set_balance(sub, 0.5, 0.0);
    }
    h.session.refresh_balances().await.unwrap();
    assert_eq!(h.session.select_all_eligible(), 2);
    *h.service.batch_response.lock().unwrap() = Some(BatchResponse { success: true, error: None, results: vec![] });

    let outcome = h.session.multi_wallet_buy().await.unwrap();

    assert_eq!(outcome.successful, 0);
    assert_eq!(outcome.failed, 2);
    assert_eq!(outcome.failures.len(), 2);
    assert!(outcome.failures.iter().all(|f| f.kind == FailureKind::Generic("No result returned".to_string())));
    assert!(h.session.fault().is_none());

    let emitted = drain(&mut status);
    let detail: Vec<&String> = emitted
        .iter()
        .filter_map(|s| match s {
            OperationStatus::Log(line) => Some(line),
            _ => None,
        })
        .collect();
    assert_eq!(detail.len(), 2);
    assert!(detail.iter().all(|line| line.ends_with("No result returned")));
    assert!(emitted.contains(&OperationStatus::BatchSummary {
        label: "Multi-wallet buy".to_string(),
        successful: 0,
        failed: 2,
    }));
}

#[tokio::test(start_paused = true)]
async fn batch_tally_covers_selection_despite_partial_results() {
    let mut h = harness(WizardLayout::snipe(), &[SUB_A, SUB_B, SUB_C]);
    for sub in [SUB_A, SUB_B, SUB_C] {
        h.reader.set_balance(sub, 0.5, 10.0);
    }
    h.session.refresh_balances().await.unwrap();
    assert_eq!(h.session.select_all_eligible(), 3);
    *h.service.batch_response.lock().unwrap() = Some(BatchResponse {
        success: true,
        error: None,
        results: vec![
            wallet_result(&SUB_A.to_uppercase().replacen("0X", "0x", 1), None),
            wallet_result(SUB_A, Some("duplicate entry")),
            wallet_result("0xdddddddddddddddddddddddddddddddddddddddd", None),
        ],
    });

    let outcome = h.session.multi_wallet_sell().await.unwrap();

    assert_eq!(outcome.successful + outcome.failed, 3);
    assert_eq!(outcome.successful, 1);
    let failed: Vec<&str> = outcome.failures.iter().map(|f| f.address.as_str()).collect();
    assert_eq!(failed, vec![SUB_B, SUB_C]);
}

use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::api::ChainReader;
use crate::errors::Result;
use crate::models::wallet::WalletBalance;

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Refreshed(Vec<WalletBalance>),
    /// Another refresh was already running; nothing was fetched.
    Skipped,
}

/// Serializes balance reads: one in flight at a time, and effective reads at
/// least `window` apart. A read that arrives too early waits for the window
/// instead of being dropped.
pub struct BalanceRefresher {
    window: Duration,
    in_flight: AtomicBool,
    last_started: Mutex<Option<Instant>>,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BalanceRefresher {
    pub fn new(window: Duration) -> Self {
        BalanceRefresher {
            window,
            in_flight: AtomicBool::new(false),
            last_started: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn fetch(
        &self,
        reader: &dyn ChainReader,
        addresses: &[String],
        token_address: Option<&str>,
    ) -> Result<RefreshOutcome> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Balance refresh already in progress, skipping.");
            return Ok(RefreshOutcome::Skipped);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let wait = {
            let last = self.last_started.lock().await;
            match *last {
                Some(started) => self.window.saturating_sub(started.elapsed()),
                None => Duration::ZERO,
            }
        };
        if !wait.is_zero() {
            debug!("Balance refresh throttled, waiting {:?}", wait);
            sleep(wait).await;
        }

        *self.last_started.lock().await = Some(Instant::now());
        info!("Fetching balances for {} wallets...", addresses.len());
        let balances = reader.fetch_balances(addresses, token_address).await?;
        Ok(RefreshOutcome::Refreshed(balances))
    }
}

//! Application wiring and per-account scheduling.
//!
//! Each configured account gets an owned bundle (session client, state
//! store, coordinator) driven by its own timer task, plus a shared status
//! cell the diagnostics surface reads. The registry maps account name to
//! bundle; it is built at startup and torn down on shutdown, with no
//! ambient global lookup anywhere.

use crate::config::{AccountConfig, AppConfig};
use crate::diagnostics::{DiagnosticsSnapshot, REDACTED};
use crate::error::AppResult;
use ergmeter_client::{Credentials, LogbookClient, LogbookEndpoints};
use ergmeter_core::{MeterState, MeterTotals, PollInterval};
use ergmeter_engine::UpdateCoordinator;
use ergmeter_store::StateStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Latest observed state of one account's poller, written after every cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountStatus {
    pub attempts: u64,
    pub last_update_success: bool,
    pub data: Option<MeterTotals>,
    pub storage_state: Option<MeterState>,
}

/// Owned per-account bundle: configuration, poll task, shared status.
struct AccountEntry {
    config: AccountConfig,
    interval: PollInterval,
    status: Arc<RwLock<AccountStatus>>,
    handle: JoinHandle<()>,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    registry: HashMap<String, AccountEntry>,
}

impl Application {
    /// Create the application. Pollers start in [`Self::run`].
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: HashMap::new(),
        })
    }

    /// Start one poll task per configured account.
    fn spawn_accounts(&mut self) -> AppResult<()> {
        for account in self.config.accounts.clone() {
            let interval = account.poll_interval();
            let client = LogbookClient::new(
                LogbookEndpoints::new(&self.config.base_url),
                Credentials::new(&account.username, &account.password),
            )?;
            let store = StateStore::new(
                Path::new(&self.config.state_dir).join(format!("{}.json", account.name)),
            );
            let coordinator = UpdateCoordinator::new(client, store, interval);
            let status = Arc::new(RwLock::new(AccountStatus::default()));

            info!(
                account = %account.name,
                interval_min = interval.minutes(),
                "starting account poller"
            );
            let handle = tokio::spawn(poll_account(
                account.name.clone(),
                coordinator,
                Arc::clone(&status),
            ));

            self.registry.insert(
                account.name.clone(),
                AccountEntry {
                    config: account,
                    interval,
                    status,
                    handle,
                },
            );
        }
        Ok(())
    }

    /// Run until a shutdown signal arrives, then tear the registry down.
    pub async fn run(mut self) -> AppResult<()> {
        self.spawn_accounts()?;
        if self.registry.is_empty() {
            warn!("no accounts configured; idling until shutdown");
        } else {
            info!(accounts = self.registry.len(), "account pollers running");
        }

        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");

        self.shutdown();
        Ok(())
    }

    /// Snapshot every account for the diagnostics surface.
    /// Credential fields are redacted here, at the boundary.
    pub fn diagnostics(&self) -> Vec<DiagnosticsSnapshot> {
        let mut snapshots: Vec<_> = self
            .registry
            .values()
            .map(|entry| {
                let status = entry.status.read();
                DiagnosticsSnapshot {
                    account: entry.config.name.clone(),
                    username: REDACTED.to_string(),
                    password: REDACTED.to_string(),
                    update_interval_sec: entry.interval.seconds(),
                    attempts: status.attempts,
                    last_update_success: status.last_update_success,
                    data: status.data,
                    storage_state: status.storage_state,
                }
            })
            .collect();
        snapshots.sort_by(|a, b| a.account.cmp(&b.account));
        snapshots
    }

    /// Dump final diagnostics and stop every poll task.
    fn shutdown(&mut self) {
        for snapshot in self.diagnostics() {
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    info!(account = %snapshot.account, diagnostics = %json, "final diagnostics")
                }
                Err(err) => warn!(account = %snapshot.account, error = %err, "diagnostics serialization failed"),
            }
        }
        for (name, entry) in self.registry.drain() {
            entry.handle.abort();
            debug!(account = %name, "poller stopped");
        }
    }
}

/// Poll loop for one account. The single timer guarantees at most one
/// in-flight cycle; a slow cycle delays the next tick instead of stacking.
async fn poll_account(
    name: String,
    mut coordinator: UpdateCoordinator<LogbookClient>,
    status: Arc<RwLock<AccountStatus>>,
) {
    let mut ticker = tokio::time::interval(coordinator.interval().as_duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match coordinator.run_cycle().await {
            Ok(totals) => info!(
                account = %name,
                lifetime = totals.lifetime_meters,
                day = totals.day_meters,
                season = totals.season_meters,
                "update cycle finished"
            ),
            // Store failures are the one class a cycle does not swallow.
            Err(err) => error!(account = %name, error = %err, "update cycle failed"),
        }

        let mut snapshot = status.write();
        snapshot.attempts = coordinator.attempts();
        snapshot.last_update_success = coordinator.last_success();
        snapshot.data = coordinator.last_totals();
        snapshot.storage_state = coordinator.last_state();
    }
}

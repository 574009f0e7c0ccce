use crate::config::GatewayConfig;
use crate::error::AppError;
use contracts::rail::LocalRail;
use contracts::snapshot::{Snapshot, SnapshotError};
use contracts::{ContractError, LedgerConfig, SharedSupplyChain, SupplyChain};
use jsonwebtoken::DecodingKey;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What to do when a committed call cannot be persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnSaveFailure {
    /// Restore the pre-call state and fail the request
    RollBack,
    /// Keep the committed state; the call moved value off-ledger
    Keep,
}

#[derive(Clone)]
pub struct AppState {
    pub chain: SharedSupplyChain<LocalRail>,
    pub decoding_key: Arc<DecodingKey>,
    pub state_path: Option<Arc<PathBuf>>,
}

impl AppState {
    pub fn new(chain: SupplyChain<LocalRail>, jwt_secret: &str, state_path: Option<PathBuf>) -> Self {
        Self {
            chain: SharedSupplyChain::new(chain),
            decoding_key: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
            state_path: state_path.map(Arc::new),
        }
    }

    /// Resume from the configured snapshot, or deploy a fresh contract
    /// owned by the configured owner.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, SnapshotError> {
        let chain = match config.state_path.as_deref().filter(|p| p.exists()) {
            Some(path) => {
                let snapshot = Snapshot::load(path)?;
                tracing::info!(path = %path.display(), sequence = snapshot.sequence, "Resuming from snapshot");
                SupplyChain::restore(snapshot.state, LocalRail::new())
            }
            None => {
                let ledger_config = LedgerConfig {
                    bootstrap_name: config.owner_name.clone(),
                    ..LedgerConfig::default()
                };
                SupplyChain::deploy(config.owner, ledger_config, LocalRail::new())
            }
        };
        Ok(Self::new(chain, &config.jwt_secret, config.state_path.clone()))
    }

    /// Run a mutating call on the blocking pool and persist the new state
    /// while still holding the contract lock.
    ///
    /// If the snapshot cannot be written the call is rolled back, so a
    /// failed request never leaves committed effects behind.
    pub async fn execute<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut SupplyChain<LocalRail>) -> Result<T, ContractError> + Send + 'static,
        T: Send + 'static,
    {
        self.spawn_execute(f, OnSaveFailure::RollBack).await
    }

    /// Like `execute`, for calls that pay out through the rail.
    ///
    /// A paid transfer cannot be rolled back, so a failed save is logged
    /// and the call still succeeds.
    pub async fn execute_payout<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut SupplyChain<LocalRail>) -> Result<T, ContractError> + Send + 'static,
        T: Send + 'static,
    {
        self.spawn_execute(f, OnSaveFailure::Keep).await
    }

    pub fn read<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&SupplyChain<LocalRail>) -> T,
    {
        Ok(self.chain.read(f)?)
    }

    async fn spawn_execute<T, F>(&self, f: F, on_failure: OnSaveFailure) -> Result<T, AppError>
    where
        F: FnOnce(&mut SupplyChain<LocalRail>) -> Result<T, ContractError> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.execute_blocking(f, on_failure))
            .await
            .map_err(anyhow::Error::from)?
    }

    fn execute_blocking<T, F>(&self, f: F, on_failure: OnSaveFailure) -> Result<T, AppError>
    where
        F: FnOnce(&mut SupplyChain<LocalRail>) -> Result<T, ContractError>,
    {
        let path = self.state_path.clone();
        let mut persisted: Result<(), SnapshotError> = Ok(());
        let value = self.chain.execute(|chain| {
            let Some(path) = path.as_deref() else {
                return f(chain);
            };
            let before = (on_failure == OnSaveFailure::RollBack).then(|| chain.capture());
            let value = f(chain)?;
            if let Err(e) = persist(chain, path) {
                match before {
                    Some(before) => {
                        tracing::warn!(error = %e, "Snapshot failed, rolling back call");
                        chain.reset_state(before);
                        persisted = Err(e);
                    }
                    None => {
                        tracing::error!(error = %e, "Snapshot failed after payout, state kept in memory");
                    }
                }
            }
            Ok(value)
        })?;
        persisted?;
        Ok(value)
    }
}

fn persist(chain: &SupplyChain<LocalRail>, path: &Path) -> Result<(), SnapshotError> {
    Snapshot::new(chain.capture())?.save(path)
}

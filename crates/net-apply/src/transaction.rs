//! Transactional application of interface settings
//!
//! A batch is applied element by element. Each element walks
//! `Resolving -> BackingUp -> Translating -> Replacing -> ReconcilingGateway
//! -> Done`; the first failure moves the transaction to `RollingBack`, every
//! collected backup is restored in collection order and the original error
//! is returned.

use std::sync::Arc;

use log::{error, info};
use uuid::Uuid;

use edge_network_config::LabelStore;
use edge_network_core::devices::{device_with_interface, device_with_mac};
use edge_network_core::error::{SystemError, ValidationError};
use edge_network_core::{ConnectionSettings, Device, NetworkError, NetworkManager, Result};
use edge_shared_types::{Interface, NetworkSettings, Target};

use crate::backup;
use crate::gateway::GatewayCoordinator;
use crate::replace::{add_and_activate, delete_profiles};
use crate::translate::{to_profile, unix_timestamp};

/// Transaction states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Finding the device an element targets
    Resolving,
    /// Capturing the device's current profile
    BackingUp,
    /// Building the new profile
    Translating,
    /// Deleting stale profiles, adding and activating the new one
    Replacing,
    /// Demoting other devices when the element is the gateway
    ReconcilingGateway,
    /// Element applied
    Done,
    /// Restoring backups after a failure
    RollingBack,
    /// Transaction failed
    Failed,
}

/// Bookkeeping for one `apply` call.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Unique transaction ID
    pub id: String,
    /// Timestamp when transaction was created
    pub timestamp: u64,
    /// Current state of the element being applied
    pub state: TransactionState,
    /// Number of fully applied elements
    pub applied: usize,
    /// Backups in collection order; `None` for devices without a profile
    pub backups: Vec<Option<ConnectionSettings>>,
}

impl Transaction {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: unix_timestamp(),
            state: TransactionState::Resolving,
            applied: 0,
            backups: Vec::new(),
        }
    }

    fn enter(&mut self, state: TransactionState) {
        info!("Transaction {}: {:?} -> {:?}", self.id, self.state, state);
        self.state = state;
    }
}

/// Summary of a successful apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub transaction_id: String,
    pub applied: usize,
    pub backups: usize,
}

/// Settings transaction engine
pub struct NetworkApplier {
    nm: Arc<dyn NetworkManager>,
    labels: Arc<dyn LabelStore>,
    gateway: Arc<GatewayCoordinator>,
}

impl NetworkApplier {
    pub fn new(
        nm: Arc<dyn NetworkManager>,
        labels: Arc<dyn LabelStore>,
        gateway: Arc<GatewayCoordinator>,
    ) -> Self {
        Self { nm, labels, gateway }
    }

    /// Applies the batch in order. On the first failure every backup taken
    /// so far is restored (best effort) and that failure is returned.
    pub async fn apply(&self, settings: &NetworkSettings) -> Result<ApplyResult> {
        let mut transaction = Transaction::new();
        info!(
            "Transaction {} started for {} interface(s)",
            transaction.id,
            settings.interfaces.len()
        );

        for element in &settings.interfaces {
            if let Err(e) = self.apply_element(&mut transaction, element).await {
                error!(
                    "Transaction {} failed in {:?}: {}",
                    transaction.id, transaction.state, e
                );
                self.rollback(&mut transaction).await;
                return Err(e);
            }
        }

        info!(
            "Transaction {} applied {} interface(s)",
            transaction.id, transaction.applied
        );
        Ok(ApplyResult {
            transaction_id: transaction.id,
            applied: transaction.applied,
            backups: transaction.backups.iter().flatten().count(),
        })
    }

    async fn apply_element(&self, transaction: &mut Transaction, element: &Interface) -> Result<()> {
        transaction.enter(TransactionState::Resolving);
        let device = self.resolve_device(element).await?;
        let interface_name = device.interface().await?;

        // Collected before replacing; restored even if this element fails.
        transaction.enter(TransactionState::BackingUp);
        let backup = backup::capture(self.nm.as_ref(), device.as_ref(), &interface_name).await?;
        transaction.backups.push(backup);

        transaction.enter(TransactionState::Translating);
        let profile = to_profile(element, &interface_name);

        transaction.enter(TransactionState::Replacing);
        delete_profiles(self.nm.as_ref(), &interface_name).await?;
        add_and_activate(self.nm.as_ref(), &profile, Some(device.as_ref())).await?;

        transaction.enter(TransactionState::ReconcilingGateway);
        self.gateway.demote_others_except(element).await?;

        transaction.enter(TransactionState::Done);
        transaction.applied += 1;
        info!("Applied {} to {}", profile, interface_name);
        Ok(())
    }

    async fn rollback(&self, transaction: &mut Transaction) {
        transaction.enter(TransactionState::RollingBack);
        info!(
            "Rolling back transaction {} ({} backup(s))",
            transaction.id,
            transaction.backups.iter().flatten().count()
        );

        for backup in transaction.backups.iter().flatten() {
            if let Err(e) = backup::restore(self.nm.as_ref(), backup).await {
                error!("Rare: restoration failed for {}: {}", backup, e);
            }
        }
        transaction.enter(TransactionState::Failed);
    }

    /// MAC first, then label.
    async fn resolve_device(&self, element: &Interface) -> Result<Arc<dyn Device>> {
        let found = match element.target() {
            None => return Err(ValidationError::MissingTarget.into()),
            Some(Target::Mac(mac)) => device_with_mac(self.nm.as_ref(), &mac.to_uppercase()).await?,
            Some(Target::Label(label)) => match self.labels.resolve(label).await {
                Some(interface_name) => {
                    device_with_interface(self.nm.as_ref(), &interface_name).await?
                }
                None => None,
            },
        };

        found.ok_or_else(|| {
            NetworkError::System(SystemError::DeviceNotFound {
                target: element.target().map(|t| t.to_string()).unwrap_or_default(),
            })
        })
    }
}

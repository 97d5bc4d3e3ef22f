//! # Connection Controller
//!
//! Sequences "wallet detected → authorized → provider attached → network and
//! balance fetched → contract bound" and exposes the two contract actions once
//! the contract is bound.
//!
//! Every input arrives as a [`Trigger`] through [`ConnectionController::dispatch`].
//! A trigger may commit state directly (wallet events) and may force stages to
//! run. After that the dispatcher drains scheduled [`Stage`]s in declaration
//! order. Each stage commits its results through [`reduce`], and the fields that
//! changed schedule the stages depending on them. Dispatch returns once nothing
//! is left to run.
//!
//! Stage failures never escape `dispatch`: they are logged and turned into a
//! reset of that stage's derived fields.
//!
//! A stage whose answer arrives after an environment change ends the current
//! dispatch. The stage and everything still scheduled behind it are deferred
//! to the next dispatch that runs with no environment change queued, which is
//! normally the queued change itself, so they rerun against the new state.
//!
//! ```rust,no_run
//! # async fn run(
//! #     wallet: std::rc::Rc<dyn lib_core::capability::WalletProvider>,
//! #     client: std::rc::Rc<dyn lib_core::capability::ChainClient>,
//! # ) -> lib_core::Result<()> {
//! use lib_core::{ConnectionController, ConnectionHandle, DeploymentConfig, Phase, Trigger};
//!
//! let controller = ConnectionController::new(DeploymentConfig::default(), wallet, client);
//! let handle = ConnectionHandle::new(controller);
//!
//! if handle.dispatch(Trigger::Load).await == Phase::ContractBound {
//!     let value = handle.read_value().await?;
//!     let pending = handle.write_value("42").await?;
//!     println!("{} -> 42 in {}", value, pending.hash);
//! }
//! # Ok(())
//! # }
//! ```

mod handle;
mod stage;

pub use handle::{ConnectionHandle, Epoch, QueuedChange};
pub use stage::{Stage, StageSet};

use std::mem;
use std::rc::Rc;

use alloy_primitives::Address;
use shared::dto::network::NetworkInfo;

use crate::capability::{
    ChainClient, ContractBinding, PendingTransaction, ProviderHandle, SignerHandle, WalletProvider,
};
use crate::config::DeploymentConfig;
use crate::contract::parse_storage_value;
use crate::error::{ConnectError, Result};
use crate::format::{format_balance, DEFAULT_BALANCE};
use crate::state::{reduce, Action, ConnectionSnapshot, ConnectionState, FieldSet, Phase};

/// Inputs to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Page load: look for the injected wallet.
    Load,
    /// User asked to (re)connect: retry the authorization request.
    Connect,
    /// Re-fetch network and balance.
    Refresh,
    /// Wallet `accountsChanged` event.
    AccountsChanged(Vec<Address>),
    /// Wallet `chainChanged` event.
    ChainChanged(u64),
}

impl Trigger {
    /// Triggers that invalidate results of requests already in flight.
    pub fn is_environment_change(&self) -> bool {
        matches!(self, Trigger::AccountsChanged(_) | Trigger::ChainChanged(_))
    }
}

enum StageOutcome {
    Committed(FieldSet),
    /// The environment changed, or a change is queued; the stage must rerun
    /// once that change has been applied.
    Stale,
}

struct Attachment {
    provider: Rc<dyn ProviderHandle>,
    signer: Rc<dyn SignerHandle>,
    network: NetworkInfo,
    balance: String,
}

type Subscriber = Box<dyn Fn(&ConnectionSnapshot)>;

pub struct ConnectionController {
    config: DeploymentConfig,
    wallet: Rc<dyn WalletProvider>,
    client: Rc<dyn ChainClient>,
    state: ConnectionState,
    epoch: Epoch,
    deferred: StageSet,
    bound_signer: Option<Rc<dyn SignerHandle>>,
    published: ConnectionSnapshot,
    subscribers: Vec<Subscriber>,
}

impl ConnectionController {
    pub fn new(
        config: DeploymentConfig,
        wallet: Rc<dyn WalletProvider>,
        client: Rc<dyn ChainClient>,
    ) -> Self {
        let state = ConnectionState::new(config.expected_chain_id);
        let published = state.snapshot();
        Self {
            config,
            wallet,
            client,
            state,
            epoch: Epoch::default(),
            deferred: StageSet::EMPTY,
            bound_signer: None,
            published,
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.state.snapshot()
    }

    /// Environment-change counter used to discard stale results.
    pub fn epoch(&self) -> &Epoch {
        &self.epoch
    }

    /// Register `subscriber` and call it with the current snapshot. It is then
    /// called again whenever the snapshot changes.
    pub fn subscribe(&mut self, subscriber: impl Fn(&ConnectionSnapshot) + 'static) {
        subscriber(&self.published);
        self.subscribers.push(Box::new(subscriber));
    }

    /// Apply `trigger` and run every stage it schedules, in order.
    pub async fn dispatch(&mut self, trigger: Trigger) -> Phase {
        tracing::debug!(?trigger, phase = ?self.state.phase(), "dispatch");

        let (changed, mut forced) = self.apply_trigger(trigger);
        if !self.deferred.is_empty() && !self.epoch.has_queued() {
            tracing::debug!(deferred = ?self.deferred, "resuming deferred stages");
            forced |= mem::take(&mut self.deferred);
        }
        self.publish();
        self.settle(changed, forced).await;

        self.state.phase()
    }

    /// The bound contract, or [`ConnectError::ContractNotBound`].
    pub fn contract(&self) -> Result<Rc<dyn ContractBinding>> {
        self.state.contract.clone().ok_or(ConnectError::ContractNotBound)
    }

    pub async fn read_value(&self) -> Result<String> {
        read_value(self.contract()?.as_ref()).await
    }

    pub async fn write_value(&self, input: &str) -> Result<PendingTransaction> {
        write_value(self.contract()?.as_ref(), input).await
    }

    fn apply_trigger(&mut self, trigger: Trigger) -> (FieldSet, StageSet) {
        match trigger {
            Trigger::Load => (FieldSet::EMPTY, Stage::Detect.into()),
            Trigger::Connect => (FieldSet::EMPTY, Stage::RequestAuthorization.into()),
            Trigger::Refresh => (FieldSet::EMPTY, Stage::AttachProvider.into()),
            Trigger::AccountsChanged(_) | Trigger::ChainChanged(_)
                if !self.state.wallet_available =>
            {
                tracing::debug!("ignoring wallet event before a wallet was detected");
                (FieldSet::EMPTY, StageSet::EMPTY)
            }
            Trigger::AccountsChanged(accounts) => {
                let changed = match first_account(&accounts) {
                    Some(account) => {
                        tracing::info!(%account, "wallet switched account");
                        self.commit(Action::Authorize(account))
                    }
                    None => {
                        tracing::info!("wallet disconnected every account");
                        self.commit(Action::Revoke)
                    }
                };
                (changed, StageSet::EMPTY)
            }
            Trigger::ChainChanged(chain_id) => {
                tracing::info!(chain_id, expected = self.config.expected_chain_id, "wallet switched network");
                let mut changed = self.commit(Action::SetNetwork(None));
                changed |= self.commit(Action::SetAttachedAccount(None));
                (changed, Stage::AttachProvider.into())
            }
        }
    }

    async fn settle(&mut self, changed: FieldSet, mut forced: StageSet) {
        let mut scheduled = forced | StageSet::triggered_by(changed);

        while let Some(stage) = scheduled.pop_first() {
            let force = forced.remove(stage);

            match self.run_stage(stage, force).await {
                StageOutcome::Committed(changed) => {
                    scheduled |= StageSet::triggered_by(changed);
                }
                StageOutcome::Stale => {
                    let retry = stage.retry_after_stale();
                    tracing::debug!(%stage, %retry, epoch = self.epoch.current(), "deferring until the environment change applies");
                    self.deferred |= scheduled | StageSet::from(retry);
                    self.publish();
                    return;
                }
            }

            self.publish();
        }
    }

    async fn run_stage(&mut self, stage: Stage, force: bool) -> StageOutcome {
        match stage {
            Stage::Detect => self.detect(),
            Stage::CheckAuthorization => self.check_authorization().await,
            Stage::RequestAuthorization => self.request_authorization().await,
            Stage::AttachProvider => self.attach_provider(force).await,
            Stage::BindContract => self.bind_contract(),
        }
    }

    fn detect(&mut self) -> StageOutcome {
        let present = self.wallet.is_present();
        if present {
            tracing::info!("injected wallet detected");
        } else {
            tracing::info!("{}", ConnectError::NoWalletDetected);
        }
        StageOutcome::Committed(self.commit(Action::WalletProbed(present)))
    }

    async fn check_authorization(&mut self) -> StageOutcome {
        if !self.state.wallet_available || self.state.authorized {
            return StageOutcome::Committed(FieldSet::EMPTY);
        }

        if self.epoch.has_queued() {
            return StageOutcome::Stale;
        }
        let issued = self.epoch.current();
        let result = self.wallet.authorized_accounts().await;
        if self.epoch.is_stale(issued) {
            return StageOutcome::Stale;
        }

        let mut changed = FieldSet::EMPTY;
        match result {
            Ok(accounts) => match first_account(&accounts) {
                Some(account) => {
                    tracing::info!(%account, "wallet already authorized");
                    changed |= self.commit(Action::Authorize(account));
                }
                None => tracing::debug!("no previously authorized account"),
            },
            Err(err) => tracing::debug!(%err, "authorization check failed, treating as not authorized"),
        }
        self.commit(Action::AuthorizationChecked);

        StageOutcome::Committed(changed)
    }

    async fn request_authorization(&mut self) -> StageOutcome {
        let state = &self.state;
        if !state.wallet_available || state.authorized || !state.authorization_checked {
            return StageOutcome::Committed(FieldSet::EMPTY);
        }

        if self.epoch.has_queued() {
            return StageOutcome::Stale;
        }
        let issued = self.epoch.current();
        tracing::info!("requesting account access");
        let result = self.wallet.request_accounts().await;

        let granted = result.and_then(|accounts| {
            first_account(&accounts).ok_or_else(|| ConnectError::Rpc("wallet returned no accounts".to_string()))
        });

        // A refusal holds whatever changed meanwhile; only a grant can be outdated.
        if self.epoch.is_stale(issued) {
            if let Err(err) = granted {
                self.reject_authorization(err);
            }
            return StageOutcome::Stale;
        }

        let changed = match granted {
            Ok(account) => {
                tracing::info!(%account, "account access granted");
                self.commit(Action::Authorize(account))
            }
            Err(err) => self.reject_authorization(err),
        };

        StageOutcome::Committed(changed)
    }

    fn reject_authorization(&mut self, err: ConnectError) -> FieldSet {
        let err = ConnectError::AuthorizationRejected(err.to_string());
        tracing::warn!(%err, "resetting to unauthorized");
        let changed = self.commit(Action::Revoke);
        self.commit(Action::AuthorizationRejected);
        changed
    }

    async fn attach_provider(&mut self, force: bool) -> StageOutcome {
        let account = self.state.account;
        if !self.state.authorized || account == Address::ZERO {
            return StageOutcome::Committed(FieldSet::EMPTY);
        }
        if !force && self.state.attached_account == Some(account) && self.state.network.is_some() {
            tracing::trace!(%account, "provider already attached");
            return StageOutcome::Committed(FieldSet::EMPTY);
        }

        if self.epoch.has_queued() {
            return StageOutcome::Stale;
        }
        let issued = self.epoch.current();
        let result = self.fetch_attachment(account).await;
        if self.epoch.is_stale(issued) {
            return StageOutcome::Stale;
        }

        let mut changed = FieldSet::EMPTY;
        match result {
            Ok(attachment) => {
                tracing::info!(
                    %account,
                    network = %attachment.network,
                    balance = %attachment.balance,
                    "provider attached"
                );
                changed |= self.commit(Action::SetProvider(Some(attachment.provider)));
                changed |= self.commit(Action::SetSigner(Some(attachment.signer)));
                changed |= self.commit(Action::SetNetwork(Some(attachment.network)));
                changed |= self.commit(Action::SetBalance(attachment.balance));
                self.commit(Action::SetAttachedAccount(Some(account)));
            }
            Err(err) => {
                let err = ConnectError::ProviderAttach(err.to_string());
                tracing::warn!(%err, %account, "resetting network and balance");
                changed |= self.commit(Action::SetNetwork(None));
                changed |= self.commit(Action::SetBalance(DEFAULT_BALANCE.to_string()));
                self.commit(Action::SetAttachedAccount(None));
            }
        }

        StageOutcome::Committed(changed)
    }

    async fn fetch_attachment(&self, account: Address) -> Result<Attachment> {
        let provider = self.client.attach().await?;
        let signer = provider.signer()?;
        let network = provider.network().await?;
        let balance = provider.balance(account).await?;

        Ok(Attachment {
            provider,
            signer,
            network,
            balance: format_balance(balance),
        })
    }

    fn bind_contract(&mut self) -> StageOutcome {
        let chain_id = self.state.network.as_ref().map(|n| n.chain_id);
        let (Some(signer), Some(chain_id)) = (self.state.signer.clone(), chain_id) else {
            return StageOutcome::Committed(FieldSet::EMPTY);
        };
        if !self.state.authorized {
            return StageOutcome::Committed(FieldSet::EMPTY);
        }

        if chain_id != self.config.expected_chain_id {
            tracing::info!(
                chain_id,
                expected = self.config.expected_chain_id,
                "not on the deployment network, contract stays unbound"
            );
            return StageOutcome::Committed(self.commit(Action::SetContract(None)));
        }

        let already_bound = self.state.contract.is_some()
            && self
                .bound_signer
                .as_ref()
                .is_some_and(|bound| Rc::ptr_eq(bound, &signer));
        if already_bound {
            return StageOutcome::Committed(FieldSet::EMPTY);
        }

        match self.client.bind_contract(self.config.contract_address, signer.clone()) {
            Ok(contract) => {
                tracing::info!(contract = %self.config.contract_address, "contract bound");
                self.bound_signer = Some(signer);
                StageOutcome::Committed(self.commit(Action::SetContract(Some(contract))))
            }
            Err(err) => {
                tracing::warn!(%err, "contract binding failed");
                StageOutcome::Committed(FieldSet::EMPTY)
            }
        }
    }

    fn commit(&mut self, action: Action) -> FieldSet {
        tracing::trace!(?action, "commit");
        reduce(&mut self.state, action)
    }

    fn publish(&mut self) {
        let snapshot = self.state.snapshot();
        if snapshot == self.published {
            return;
        }
        for subscriber in &self.subscribers {
            subscriber(&snapshot);
        }
        self.published = snapshot;
    }
}

/// Invoke the contract's read accessor and render the stored value.
pub async fn read_value(contract: &dyn ContractBinding) -> Result<String> {
    let value = contract.get().await.map_err(ConnectError::into_contract_call)?;
    Ok(value.to_string())
}

/// Validate `input` and submit it through the contract's mutator.
pub async fn write_value(contract: &dyn ContractBinding, input: &str) -> Result<PendingTransaction> {
    let value = parse_storage_value(input)?;
    contract.set(value).await.map_err(ConnectError::into_contract_call)
}

/// First returned account, unless the wallet reported the zero address.
fn first_account(accounts: &[Address]) -> Option<Address> {
    accounts.first().copied().filter(|a| *a != Address::ZERO)
}

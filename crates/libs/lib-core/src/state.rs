//! # Connection State
//!
//! The single record the controller owns, the [`Action`]s that replace its
//! fields, and the [`reduce`] function that applies them.
//!
//! Every action is a whole-field replacement. `reduce` reports which tracked
//! [`Field`]s actually changed value; the dispatcher uses that set to decide
//! which stages to re-run, so writing a field with the value it already holds
//! never triggers anything.
//!
//! Two invariants are enforced here rather than by callers:
//! - `authorized` implies `account != Address::ZERO`
//! - a bound contract implies signer, network and the expected chain id

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::rc::Rc;

use alloy_primitives::Address;
use serde::Serialize;
use shared::dto::network::NetworkInfo;

use crate::capability::{ContractBinding, ProviderHandle, SignerHandle};
use crate::format::DEFAULT_BALANCE;

/// Tracked fields of [`ConnectionState`]. Stages declare dependencies on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    WalletAvailable,
    Authorized,
    Account,
    Provider,
    Signer,
    Network,
    Balance,
    Contract,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::WalletAvailable,
        Field::Authorized,
        Field::Account,
        Field::Provider,
        Field::Signer,
        Field::Network,
        Field::Balance,
        Field::Contract,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Small bit set of [`Field`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSet(u8);

impl FieldSet {
    pub const EMPTY: FieldSet = FieldSet(0);

    pub const fn of(fields: &[Field]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < fields.len() {
            bits |= fields[i].bit();
            i += 1;
        }
        FieldSet(bits)
    }

    pub fn insert(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    pub fn contains(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn intersects(self, other: FieldSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl From<Field> for FieldSet {
    fn from(field: Field) -> Self {
        FieldSet(field.bit())
    }
}

impl BitOr for FieldSet {
    type Output = FieldSet;

    fn bitor(self, rhs: FieldSet) -> FieldSet {
        FieldSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for FieldSet {
    fn bitor_assign(&mut self, rhs: FieldSet) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Where the connection stands, derived from [`ConnectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Unknown,
    NoWallet,
    WalletDetected,
    PendingAuthorization,
    Unauthorized,
    Authorized,
    ProviderReady,
    ContractBound,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Unknown => "Detecting wallet",
            Phase::NoWallet => "No wallet",
            Phase::WalletDetected => "Wallet detected",
            Phase::PendingAuthorization => "Waiting for authorization",
            Phase::Unauthorized => "Not authorized",
            Phase::Authorized => "Authorized",
            Phase::ProviderReady => "Connected",
            Phase::ContractBound => "Ready",
        }
    }
}

#[derive(Clone)]
pub struct ConnectionState {
    pub expected_chain_id: u64,

    pub probed: bool,
    pub wallet_available: bool,

    pub authorization_checked: bool,
    pub authorization_rejected: bool,
    pub authorized: bool,
    pub account: Address,

    pub provider: Option<Rc<dyn ProviderHandle>>,
    pub signer: Option<Rc<dyn SignerHandle>>,
    pub network: Option<NetworkInfo>,
    pub balance: String,
    /// Account the provider-derived fields were fetched for.
    pub attached_account: Option<Address>,

    pub contract: Option<Rc<dyn ContractBinding>>,
}

impl ConnectionState {
    pub fn new(expected_chain_id: u64) -> Self {
        Self {
            expected_chain_id,
            probed: false,
            wallet_available: false,
            authorization_checked: false,
            authorization_rejected: false,
            authorized: false,
            account: Address::ZERO,
            provider: None,
            signer: None,
            network: None,
            balance: DEFAULT_BALANCE.to_string(),
            attached_account: None,
            contract: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.probed {
            Phase::Unknown
        } else if !self.wallet_available {
            Phase::NoWallet
        } else if !self.authorized {
            if self.authorization_rejected {
                Phase::Unauthorized
            } else if self.authorization_checked {
                Phase::PendingAuthorization
            } else {
                Phase::WalletDetected
            }
        } else if self.contract.is_some() {
            Phase::ContractBound
        } else if self.signer.is_some() && self.network.is_some() {
            Phase::ProviderReady
        } else {
            Phase::Authorized
        }
    }

    /// Whether the connected network is the one the contract is deployed on.
    pub fn on_expected_network(&self) -> bool {
        self.network
            .as_ref()
            .is_some_and(|n| n.chain_id == self.expected_chain_id)
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            phase: self.phase(),
            wallet_available: self.wallet_available,
            authorized: self.authorized,
            account: self.account,
            network: self.network.clone(),
            balance: self.balance.clone(),
            contract_bound: self.contract.is_some(),
            expected_chain_id: self.expected_chain_id,
        }
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionState")
            .field("phase", &self.phase())
            .field("account", &self.account)
            .field("provider", &self.provider.is_some())
            .field("signer", &self.signer.is_some())
            .field("network", &self.network)
            .field("balance", &self.balance)
            .field("contract", &self.contract.is_some())
            .finish()
    }
}

/// Plain projection of [`ConnectionState`] for UI bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSnapshot {
    pub phase: Phase,
    pub wallet_available: bool,
    pub authorized: bool,
    pub account: Address,
    pub network: Option<NetworkInfo>,
    pub balance: String,
    pub contract_bound: bool,
    pub expected_chain_id: u64,
}

impl Default for ConnectionSnapshot {
    fn default() -> Self {
        ConnectionState::new(0).snapshot()
    }
}

/// Whole-field replacements applied by [`reduce`].
#[derive(Clone)]
pub enum Action {
    /// Result of probing for a wallet interface.
    WalletProbed(bool),
    /// The non-intrusive authorization check resolved.
    AuthorizationChecked,
    /// Grant authorization for an account. The zero address revokes instead.
    Authorize(Address),
    /// Drop authorization and everything derived from it.
    Revoke,
    /// The last authorization request was rejected.
    AuthorizationRejected,
    SetProvider(Option<Rc<dyn ProviderHandle>>),
    SetSigner(Option<Rc<dyn SignerHandle>>),
    SetNetwork(Option<NetworkInfo>),
    SetBalance(String),
    SetAttachedAccount(Option<Address>),
    SetContract(Option<Rc<dyn ContractBinding>>),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::WalletProbed(present) => f.debug_tuple("WalletProbed").field(present).finish(),
            Action::AuthorizationChecked => f.write_str("AuthorizationChecked"),
            Action::Authorize(account) => f.debug_tuple("Authorize").field(account).finish(),
            Action::Revoke => f.write_str("Revoke"),
            Action::AuthorizationRejected => f.write_str("AuthorizationRejected"),
            Action::SetProvider(p) => f.debug_tuple("SetProvider").field(&p.is_some()).finish(),
            Action::SetSigner(s) => f.debug_tuple("SetSigner").field(&s.is_some()).finish(),
            Action::SetNetwork(n) => f.debug_tuple("SetNetwork").field(n).finish(),
            Action::SetBalance(b) => f.debug_tuple("SetBalance").field(b).finish(),
            Action::SetAttachedAccount(a) => f.debug_tuple("SetAttachedAccount").field(a).finish(),
            Action::SetContract(c) => f.debug_tuple("SetContract").field(&c.is_some()).finish(),
        }
    }
}

/// Apply `action` to `state`, returning the tracked fields whose value changed.
pub fn reduce(state: &mut ConnectionState, action: Action) -> FieldSet {
    let mut changed = FieldSet::EMPTY;

    match action {
        Action::WalletProbed(present) => {
            state.probed = true;
            if replace(&mut state.wallet_available, present) {
                changed.insert(Field::WalletAvailable);
            }
        }
        Action::AuthorizationChecked => {
            state.authorization_checked = true;
        }
        Action::Authorize(account) if account == Address::ZERO => {
            changed |= reduce(state, Action::Revoke);
        }
        Action::Authorize(account) => {
            state.authorization_rejected = false;
            if replace(&mut state.authorized, true) {
                changed.insert(Field::Authorized);
            }
            if replace(&mut state.account, account) {
                changed.insert(Field::Account);
                // The balance belongs to the previous account until reattached.
                changed |= reduce(state, Action::SetBalance(DEFAULT_BALANCE.to_string()));
                state.attached_account = None;
            }
        }
        Action::Revoke => {
            if replace(&mut state.authorized, false) {
                changed.insert(Field::Authorized);
            }
            if replace(&mut state.account, Address::ZERO) {
                changed.insert(Field::Account);
            }
            changed |= reduce(state, Action::SetContract(None));
            changed |= reduce(state, Action::SetProvider(None));
            changed |= reduce(state, Action::SetSigner(None));
            changed |= reduce(state, Action::SetNetwork(None));
            changed |= reduce(state, Action::SetBalance(DEFAULT_BALANCE.to_string()));
            state.attached_account = None;
        }
        Action::AuthorizationRejected => {
            state.authorization_rejected = true;
        }
        Action::SetProvider(provider) => {
            if replace_rc(&mut state.provider, provider) {
                changed.insert(Field::Provider);
            }
        }
        Action::SetSigner(signer) => {
            if replace_rc(&mut state.signer, signer) {
                changed.insert(Field::Signer);
            }
            if state.signer.is_none() {
                changed |= reduce(state, Action::SetContract(None));
            }
        }
        Action::SetNetwork(network) => {
            if replace(&mut state.network, network) {
                changed.insert(Field::Network);
            }
            if !state.on_expected_network() {
                changed |= reduce(state, Action::SetContract(None));
            }
        }
        Action::SetBalance(balance) => {
            if replace(&mut state.balance, balance) {
                changed.insert(Field::Balance);
            }
        }
        Action::SetAttachedAccount(account) => {
            state.attached_account = account;
        }
        Action::SetContract(Some(_))
            if !(state.authorized && state.signer.is_some() && state.on_expected_network()) =>
        {
            tracing::warn!(state = ?state, "refusing to bind contract outside its network");
        }
        Action::SetContract(contract) => {
            if replace_rc(&mut state.contract, contract) {
                changed.insert(Field::Contract);
            }
        }
    }

    changed
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn replace_rc<T: ?Sized>(slot: &mut Option<Rc<T>>, value: Option<Rc<T>>) -> bool {
    let same = match (slot.as_ref(), value.as_ref()) {
        (None, None) => true,
        (Some(current), Some(new)) => Rc::ptr_eq(current, new),
        _ => false,
    };
    *slot = value;
    !same
}

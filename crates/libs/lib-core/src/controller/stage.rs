//! Connection stages and their declared dependencies.

use std::fmt;

use crate::state::{Field, FieldSet};

/// One step of the connection sequence. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Detect,
    CheckAuthorization,
    RequestAuthorization,
    AttachProvider,
    BindContract,
}

impl Stage {
    pub const ORDER: [Stage; 5] = [
        Stage::Detect,
        Stage::CheckAuthorization,
        Stage::RequestAuthorization,
        Stage::AttachProvider,
        Stage::BindContract,
    ];

    /// Fields whose change schedules this stage.
    pub const fn depends_on(self) -> FieldSet {
        match self {
            Stage::Detect => FieldSet::EMPTY,
            Stage::CheckAuthorization => FieldSet::of(&[Field::WalletAvailable]),
            Stage::RequestAuthorization => {
                FieldSet::of(&[Field::WalletAvailable, Field::Authorized])
            }
            Stage::AttachProvider => FieldSet::of(&[Field::Authorized, Field::Account]),
            Stage::BindContract => {
                FieldSet::of(&[Field::Signer, Field::Network, Field::Authorized])
            }
        }
    }

    /// Stage to schedule when this stage's result arrived stale.
    ///
    /// A stale authorization request falls back to the non-intrusive check so
    /// the user is not prompted twice for the same grant.
    pub fn retry_after_stale(self) -> Stage {
        match self {
            Stage::RequestAuthorization => Stage::CheckAuthorization,
            other => other,
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Detect => "detect",
            Stage::CheckAuthorization => "check-authorization",
            Stage::RequestAuthorization => "request-authorization",
            Stage::AttachProvider => "attach-provider",
            Stage::BindContract => "bind-contract",
        };
        f.write_str(name)
    }
}

/// Set of pending [`Stage`]s, drained in declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSet(u8);

impl StageSet {
    pub const EMPTY: StageSet = StageSet(0);

    /// Stages that depend on any field in `changed`.
    pub fn triggered_by(changed: FieldSet) -> Self {
        let mut set = StageSet::EMPTY;
        for stage in Stage::ORDER {
            if stage.depends_on().intersects(changed) {
                set.insert(stage);
            }
        }
        set
    }

    pub fn insert(&mut self, stage: Stage) {
        self.0 |= stage.bit();
    }

    /// Remove `stage`, returning whether it was present.
    pub fn remove(&mut self, stage: Stage) -> bool {
        let present = self.contains(stage);
        self.0 &= !stage.bit();
        present
    }

    pub fn contains(self, stage: Stage) -> bool {
        self.0 & stage.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Remove and return the earliest pending stage.
    pub fn pop_first(&mut self) -> Option<Stage> {
        let stage = Stage::ORDER.into_iter().find(|s| self.contains(*s))?;
        self.remove(stage);
        Some(stage)
    }
}

impl From<Stage> for StageSet {
    fn from(stage: Stage) -> Self {
        StageSet(stage.bit())
    }
}

impl std::ops::BitOr for StageSet {
    type Output = StageSet;

    fn bitor(self, rhs: StageSet) -> StageSet {
        StageSet(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for StageSet {
    fn bitor_assign(&mut self, rhs: StageSet) {
        self.0 |= rhs.0;
    }
}

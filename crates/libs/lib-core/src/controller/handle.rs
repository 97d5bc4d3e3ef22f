//! Shared handle over one controller: the single dispatch point.

use std::cell::Cell;
use std::rc::Rc;

use futures::lock::Mutex;

use super::{read_value, write_value, ConnectionController, Trigger};
use crate::capability::PendingTransaction;
use crate::error::Result;
use crate::state::{ConnectionSnapshot, Phase};

#[derive(Debug, Default)]
struct EpochState {
    generation: Cell<u64>,
    queued: Cell<usize>,
}

/// Counter of environment changes, plus the number still waiting to be applied.
///
/// Async stages record the generation before calling out and discard their
/// result if it moved by the time the call resolves. While a change is queued
/// the controller's state is known to be outdated, so stages do not call out
/// at all.
#[derive(Debug, Clone, Default)]
pub struct Epoch(Rc<EpochState>);

impl Epoch {
    pub fn current(&self) -> u64 {
        self.0.generation.get()
    }

    pub fn advance(&self) -> u64 {
        let next = self.0.generation.get().wrapping_add(1);
        self.0.generation.set(next);
        next
    }

    pub fn is_stale(&self, issued: u64) -> bool {
        self.0.generation.get() != issued
    }

    /// Advance and mark a change as queued until the returned guard drops.
    pub fn announce(&self) -> QueuedChange {
        self.advance();
        self.0.queued.set(self.0.queued.get() + 1);
        QueuedChange(self.clone())
    }

    /// Whether an announced change has not reached the controller yet.
    pub fn has_queued(&self) -> bool {
        self.0.queued.get() > 0
    }
}

/// An environment change waiting for the controller lock.
#[must_use]
pub struct QueuedChange(Epoch);

impl Drop for QueuedChange {
    fn drop(&mut self) {
        let queued = &self.0 .0.queued;
        queued.set(queued.get().saturating_sub(1));
    }
}

/// Cloneable handle that serializes every access to a [`ConnectionController`].
///
/// Triggers queue on an async mutex, so stage runs never overlap. Environment
/// changes are announced on the [`Epoch`] before queueing, which lets a stage
/// that is already waiting on the wallet notice that its answer is out of date.
/// The announcement is withdrawn once the change holds the lock, or when its
/// dispatch is dropped while still waiting.
#[derive(Clone)]
pub struct ConnectionHandle {
    controller: Rc<Mutex<ConnectionController>>,
    epoch: Epoch,
}

impl ConnectionHandle {
    pub fn new(controller: ConnectionController) -> Self {
        let epoch = controller.epoch().clone();
        Self {
            controller: Rc::new(Mutex::new(controller)),
            epoch,
        }
    }

    pub fn epoch(&self) -> &Epoch {
        &self.epoch
    }

    pub async fn dispatch(&self, trigger: Trigger) -> Phase {
        let queued = trigger.is_environment_change().then(|| {
            let change = self.epoch.announce();
            tracing::debug!(epoch = self.epoch.current(), ?trigger, "environment changed");
            change
        });

        let mut controller = self.controller.lock().await;
        drop(queued);
        controller.dispatch(trigger).await
    }

    pub async fn subscribe(&self, subscriber: impl Fn(&ConnectionSnapshot) + 'static) {
        self.controller.lock().await.subscribe(subscriber);
    }

    pub async fn snapshot(&self) -> ConnectionSnapshot {
        self.controller.lock().await.snapshot()
    }

    /// Read the stored value. The lock is released before the call goes out.
    pub async fn read_value(&self) -> Result<String> {
        let contract = self.controller.lock().await.contract()?;
        read_value(contract.as_ref()).await
    }

    /// Submit `input` as the new stored value. Returns once the wallet accepted
    /// the transaction; confirmation is not awaited.
    pub async fn write_value(&self, input: &str) -> Result<PendingTransaction> {
        let contract = self.controller.lock().await.contract()?;
        write_value(contract.as_ref(), input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch() {
        let epoch = Epoch::default();
        let issued = epoch.current();
        assert!(!epoch.is_stale(issued));

        let shared = epoch.clone();
        assert_eq!(shared.advance(), issued + 1);
        assert!(epoch.is_stale(issued));
        assert!(!epoch.is_stale(epoch.current()));
    }

    #[test]
    fn test_queued_change_is_withdrawn_on_drop() {
        let epoch = Epoch::default();
        let first = epoch.announce();
        let second = epoch.announce();
        assert_eq!(epoch.current(), 2);
        assert!(epoch.has_queued());

        drop(first);
        assert!(epoch.has_queued());
        drop(second);
        assert!(!epoch.has_queued());
        assert_eq!(epoch.current(), 2);
    }
}

//! Concurrency Gate Module
//!
//! Shared/exclusive coordination of every access to the persistent store.

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

// == Gate Mode ==
/// The mode a token was acquired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    Shared,
    UpgradeableShared,
    Exclusive,
}

/// A held gate token. Dropping a token releases it.
pub trait GateToken {
    fn mode(&self) -> GateMode;
}

// == Concurrency Gate ==
/// A single process-wide reader/writer gate guarding the whole store.
///
/// Any number of shared and upgradeable-shared holders may coexist; an
/// exclusive holder excludes everyone. Upgrading is never done in place: an
/// [`UpgradeableToken`] is released into an [`UpgradeTicket`] that holds no
/// lock, and the ticket later re-enters the gate in exclusive mode. Nothing
/// is held in between, so slow work (a download) never blocks readers.
#[derive(Debug, Default)]
pub struct ConcurrencyGate {
    lock: RwLock<()>,
}

impl ConcurrencyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for shared access.
    pub async fn acquire_shared(&self) -> SharedToken<'_> {
        let guard = self.lock.read().await;
        trace!("gate acquired (shared)");
        SharedToken { _guard: guard }
    }

    /// Waits for shared access that can later be exchanged for exclusive access.
    pub async fn acquire_upgradeable(&self) -> UpgradeableToken<'_> {
        let guard = self.lock.read().await;
        trace!("gate acquired (upgradeable)");
        UpgradeableToken {
            gate: self,
            _guard: guard,
        }
    }

    /// Waits for exclusive access.
    pub async fn acquire_exclusive(&self) -> ExclusiveToken<'_> {
        let guard = self.lock.write().await;
        trace!("gate acquired (exclusive)");
        ExclusiveToken { _guard: guard }
    }

    /// Releases a token of any mode.
    pub fn release<T: GateToken>(&self, token: T) {
        trace!(mode = ?token.mode(), "gate released");
        drop(token);
    }
}

// == Tokens ==
/// Shared access to the store.
#[derive(Debug)]
pub struct SharedToken<'a> {
    _guard: RwLockReadGuard<'a, ()>,
}

impl GateToken for SharedToken<'_> {
    fn mode(&self) -> GateMode {
        GateMode::Shared
    }
}

/// Shared access with a path to exclusive access.
#[derive(Debug)]
pub struct UpgradeableToken<'a> {
    gate: &'a ConcurrencyGate,
    _guard: RwLockReadGuard<'a, ()>,
}

impl<'a> UpgradeableToken<'a> {
    /// Releases the shared hold, keeping the right to come back exclusively.
    pub fn release_for_upgrade(self) -> UpgradeTicket<'a> {
        let gate = self.gate;
        gate.release(self);
        UpgradeTicket { gate }
    }
}

impl GateToken for UpgradeableToken<'_> {
    fn mode(&self) -> GateMode {
        GateMode::UpgradeableShared
    }
}

/// Exclusive access to the store.
#[derive(Debug)]
pub struct ExclusiveToken<'a> {
    _guard: RwLockWriteGuard<'a, ()>,
}

impl GateToken for ExclusiveToken<'_> {
    fn mode(&self) -> GateMode {
        GateMode::Exclusive
    }
}

// == Upgrade Ticket ==
/// Holds no lock. Re-enters the gate exclusively for the same operation.
#[derive(Debug)]
#[must_use = "an upgrade ticket does nothing until it is exchanged for exclusive access"]
pub struct UpgradeTicket<'a> {
    gate: &'a ConcurrencyGate,
}

impl<'a> UpgradeTicket<'a> {
    pub async fn acquire_exclusive(self) -> ExclusiveToken<'a> {
        self.gate.acquire_exclusive().await
    }
}

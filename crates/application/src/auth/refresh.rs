//! Single-flight coordination of token refresh cycles.
//!
//! Every caller that hits an authorization failure joins the current cycle.
//! The first caller of a cycle becomes its leader and performs the refresh;
//! everyone joining while the leader is busy gets a waiter that resolves
//! when the leader settles. Settling drains all waiters in enqueue order and
//! returns the coordinator to idle, so it can run any number of cycles.
//!
//! A leader that goes away without settling abandons the cycle: its waiters
//! receive no outcome and are expected to join the next cycle.
//!
//! The state lock is only held for the synchronous transitions, never
//! across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use netadmin_domain::ResetReason;
use tokio::sync::oneshot;

/// Outcome broadcast to the waiters of a cycle: the new access token, or
/// the reason the session was reset.
pub type RefreshOutcome = Result<String, ResetReason>;

enum RefreshState {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

/// Refresh-cycle state machine: `Idle -> Refreshing -> Idle`.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Role handed to a caller joining a refresh cycle.
pub enum Ticket<'a> {
    /// The caller must perform the refresh and settle the cycle.
    Leader(LeaderGuard<'a>),
    /// A refresh is in flight; await its outcome.
    Waiter(Waiter),
}

impl RefreshCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
        }
    }

    /// Joins the current cycle, starting one if idle.
    pub fn join(&self) -> Ticket<'_> {
        let mut state = self.lock();
        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            return Ticket::Waiter(Waiter { rx });
        }
        *state = RefreshState::Refreshing {
            waiters: Vec::new(),
        };
        Ticket::Leader(LeaderGuard {
            coordinator: self,
            settled: false,
        })
    }

    /// True while a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), RefreshState::Refreshing { .. })
    }

    fn take_waiters(&self) -> Vec<oneshot::Sender<RefreshOutcome>> {
        match std::mem::replace(&mut *self.lock(), RefreshState::Idle) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => Vec::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by the leader of a cycle until it settles.
///
/// Dropping the guard without settling (the leader's future was cancelled)
/// abandons the cycle: waiters are released without an outcome and the
/// coordinator returns to idle.
pub struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl LeaderGuard<'_> {
    /// Ends the cycle, handing `outcome` to every waiter in enqueue order.
    ///
    /// Returns the number of waiters released.
    pub fn settle(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        let waiters = self.coordinator.take_waiters();
        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose caller went away has nothing to resume.
            let _ = waiter.send(outcome.clone());
        }
        released
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            drop(self.coordinator.take_waiters());
        }
    }
}

/// Pending outcome of somebody else's refresh.
pub struct Waiter {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl Waiter {
    /// Waits for the leader to settle.
    ///
    /// Returns `None` if the cycle was abandoned.
    pub async fn outcome(self) -> Option<RefreshOutcome> {
        self.rx.await.ok()
    }
}

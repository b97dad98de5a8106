//! Single-flight coordination of token refreshes
//!
//! When several requests hit 401 at once, exactly one of them (the leader)
//! calls the refresh endpoint. The rest park on a oneshot channel and are
//! handed the leader's outcome. A monotonically increasing epoch records
//! completed refreshes, so a request whose 401 arrives after a refresh has
//! already settled replays with the new token instead of refreshing again.
//!
//! The state lock is a `parking_lot::Mutex` and is never held across an
//! `.await`.

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use super::errors::ApiError;

/// What a refresh produced: the new access token or the terminal error
pub type RefreshOutcome = Result<String, ApiError>;

#[derive(Debug, Default)]
struct RefreshState {
    in_progress: bool,
    epoch: u64,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Role a caller plays after seeing a 401
#[derive(Debug)]
pub enum RefreshTurn<'a> {
    /// No refresh running: perform it and settle the lease
    Lead(RefreshLease<'a>),
    /// A refresh is running: await its outcome
    Wait(oneshot::Receiver<RefreshOutcome>),
    /// A refresh settled after the request was sent: replay with the
    /// current token
    Replay,
}

/// Per-client refresh state
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current epoch; record it before sending a request.
    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        self.state.lock().in_progress
    }

    /// Number of callers parked on the running refresh.
    #[cfg(test)]
    fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Decide how a request sent at `sent_epoch` recovers from a 401.
    pub fn claim(&self, sent_epoch: u64) -> RefreshTurn<'_> {
        let mut state = self.state.lock();
        if state.in_progress {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            debug!(waiting = state.waiters.len(), "Queued behind in-flight refresh");
            return RefreshTurn::Wait(rx);
        }
        if state.epoch != sent_epoch {
            return RefreshTurn::Replay;
        }
        state.in_progress = true;
        RefreshTurn::Lead(RefreshLease { coordinator: self, settled: false })
    }

    /// Mark credentials as replaced outside of a refresh (login, logout).
    ///
    /// Requests already in flight then replay with whatever token is stored
    /// instead of refreshing on a 401.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        state.epoch = state.epoch.wrapping_add(1);
    }

    /// Clears the flag, bumps the epoch and drains the queue in one critical
    /// section, then notifies outside the lock.
    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.in_progress = false;
            state.epoch = state.epoch.wrapping_add(1);
            std::mem::take(&mut state.waiters)
        };

        let count = waiters.len();
        for waiter in waiters {
            // A dropped receiver means the caller gave up; nothing to do.
            let _ = waiter.send(outcome.clone());
        }
        count
    }
}

/// Exclusive right to run the current refresh
///
/// Dropping an unsettled lease settles it with [`ApiError::Cancelled`].
#[derive(Debug)]
#[must_use = "an unsettled lease cancels every queued request when dropped"]
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Publish the outcome to every queued request.
    ///
    /// Returns the number of waiters that were notified.
    pub fn settle(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome)
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Refresh abandoned before completion");
            self.coordinator.settle(&Err(ApiError::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(coordinator: &RefreshCoordinator) -> RefreshLease<'_> {
        match coordinator.claim(coordinator.epoch()) {
            RefreshTurn::Lead(lease) => lease,
            other => panic!("expected to lead, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_claim_leads_and_later_claims_wait() {
        let coordinator = RefreshCoordinator::new();
        let epoch = coordinator.epoch();
        let lease = lead(&coordinator);

        let rx1 = match coordinator.claim(epoch) {
            RefreshTurn::Wait(rx) => rx,
            other => panic!("expected to wait, got {other:?}"),
        };
        let rx2 = match coordinator.claim(epoch) {
            RefreshTurn::Wait(rx) => rx,
            other => panic!("expected to wait, got {other:?}"),
        };
        assert!(coordinator.is_refreshing());
        assert_eq!(coordinator.waiting(), 2);

        assert_eq!(lease.settle(&Ok("fresh".into())), 2);

        assert_eq!(rx1.await.unwrap(), Ok("fresh".to_string()));
        assert_eq!(rx2.await.unwrap(), Ok("fresh".to_string()));
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiting(), 0);
    }

    #[test]
    fn stale_epoch_replays_instead_of_refreshing() {
        let coordinator = RefreshCoordinator::new();
        let sent_at = coordinator.epoch();
        lead(&coordinator).settle(&Ok("fresh".into()));

        assert!(matches!(coordinator.claim(sent_at), RefreshTurn::Replay));
        assert!(!coordinator.is_refreshing());
    }

    #[test]
    fn invalidate_moves_the_epoch() {
        let coordinator = RefreshCoordinator::new();
        let sent_at = coordinator.epoch();
        coordinator.invalidate();
        assert!(matches!(coordinator.claim(sent_at), RefreshTurn::Replay));
    }

    #[tokio::test]
    async fn failure_is_fanned_out_to_waiters() {
        let coordinator = RefreshCoordinator::new();
        let epoch = coordinator.epoch();
        let lease = lead(&coordinator);
        let RefreshTurn::Wait(rx) = coordinator.claim(epoch) else {
            panic!("expected to wait");
        };

        lease.settle(&Err(ApiError::SessionExpired("refresh rejected".into())));

        assert_eq!(rx.await.unwrap(), Err(ApiError::SessionExpired("refresh rejected".into())));
    }

    #[tokio::test]
    async fn dropped_lease_cancels_waiters_and_frees_the_slot() {
        let coordinator = RefreshCoordinator::new();
        let epoch = coordinator.epoch();
        let lease = lead(&coordinator);
        let RefreshTurn::Wait(rx) = coordinator.claim(epoch) else {
            panic!("expected to wait");
        };

        drop(lease);

        assert_eq!(rx.await.unwrap(), Err(ApiError::Cancelled));
        assert!(!coordinator.is_refreshing());
        // The next 401 from a fresh request can lead again.
        assert!(matches!(coordinator.claim(coordinator.epoch()), RefreshTurn::Lead(_)));
    }

    #[test]
    fn settle_tolerates_dropped_receivers() {
        let coordinator = RefreshCoordinator::new();
        let epoch = coordinator.epoch();
        let lease = lead(&coordinator);
        drop(coordinator.claim(epoch));

        assert_eq!(lease.settle(&Ok("fresh".into())), 1);
    }
}

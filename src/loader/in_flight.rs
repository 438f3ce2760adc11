use super::handle::*;

use {
    std::{sync::atomic::*, time::*},
    tokio::sync::oneshot,
};

//
// WaiterId
//

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct WaiterId(u64);

impl WaiterId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

//
// Waiter
//

pub(crate) struct Waiter<AssetT> {
    pub id: WaiterId,
    pub consumer: ConsumerId,
    sender: oneshot::Sender<AssetOutcome<AssetT>>,
}

impl<AssetT> Waiter<AssetT> {
    pub fn new(consumer: ConsumerId, sender: oneshot::Sender<AssetOutcome<AssetT>>) -> Self {
        Self {
            id: WaiterId::next(),
            consumer,
            sender,
        }
    }

    pub fn send(self, outcome: AssetOutcome<AssetT>) {
        if self.sender.send(outcome).is_err() {
            // The handle was dropped after we took the waiter out of the table
            tracing::trace!("gone: {}", self.consumer);
        }
    }
}

//
// InFlight
//

/// A fetch in progress and the consumers waiting for it.
///
/// Exists from the first miss until its outcome is delivered. Its waiters only shrink after
/// that, by cancellation or by delivery.
pub(crate) struct InFlight<AssetT> {
    pub waiters: Vec<Waiter<AssetT>>,
    pub started: Instant,
}

impl<AssetT> InFlight<AssetT> {
    pub fn new() -> Self {
        Self {
            waiters: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Registers a waiter, returning the one it supersedes, if any.
    pub fn register(&mut self, waiter: Waiter<AssetT>) -> Option<Waiter<AssetT>> {
        let superseded = self
            .waiters
            .iter()
            .position(|existing| existing.consumer == waiter.consumer)
            .map(|index| self.waiters.swap_remove(index));
        self.waiters.push(waiter);
        superseded
    }

    /// Removes a waiter.
    pub fn remove(&mut self, id: WaiterId) -> Option<Waiter<AssetT>> {
        self.waiters
            .iter()
            .position(|waiter| waiter.id == id)
            .map(|index| self.waiters.swap_remove(index))
    }
}

impl<AssetT> InFlight<AssetT>
where
    AssetT: Clone,
{
    /// Delivers the outcome to all waiters.
    pub fn deliver(self, outcome: AssetOutcome<AssetT>) {
        tracing::trace!(
            "deliver to {} waiters after {:?}",
            self.waiters.len(),
            self.started.elapsed()
        );
        for waiter in self.waiters {
            waiter.send(outcome.clone());
        }
    }
}

use super::super::error::*;

use {
    std::{
        fmt,
        pin::*,
        sync::atomic::*,
        task::{Context, Poll},
    },
    tokio::sync::oneshot,
};

//
// ConsumerId
//

/// Identifies a consumer of assets, e.g. one slot of a grid.
///
/// A consumer has at most one live registration per key: requesting a key that is already
/// pending for the same consumer supersedes the earlier handle.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConsumerId(u64);

impl ConsumerId {
    /// Create a new process-unique consumer ID.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "consumer-{}", self.0)
    }
}

//
// AssetOutcome
//

/// What an [AssetHandle] resolves to.
#[derive(Clone, Debug)]
pub enum AssetOutcome<AssetT> {
    /// Asset.
    Asset(AssetT),

    /// Error.
    Error(LoadError),

    /// Cancelled by the consumer.
    Cancelled,
}

impl<AssetT> AssetOutcome<AssetT> {
    /// The asset, if any.
    pub fn asset(&self) -> Option<&AssetT> {
        match self {
            Self::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    /// Into the asset, if any.
    pub fn into_asset(self) -> Option<AssetT> {
        match self {
            Self::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    /// The error, if any.
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Whether cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Removes a pending registration. Returns true if it was still registered.
pub(crate) type Canceller = Box<dyn FnOnce() -> bool + Send + Sync>;

//
// AssetHandle
//

/// Cancellable handle to an asset requested from an [AssetLoader](super::AssetLoader).
///
/// Resolves exactly once to an [AssetOutcome]. Awaiting it again, or calling
/// [try_outcome](Self::try_outcome) after resolution, returns the same outcome.
///
/// Dropping an unresolved handle cancels it.
pub struct AssetHandle<AssetT> {
    consumer: ConsumerId,
    state: HandleState<AssetT>,
}

enum HandleState<AssetT> {
    Pending {
        receiver: oneshot::Receiver<AssetOutcome<AssetT>>,
        canceller: Option<Canceller>,
    },

    Resolved(AssetOutcome<AssetT>),
}

impl<AssetT> AssetHandle<AssetT> {
    pub(crate) fn resolved(consumer: ConsumerId, outcome: AssetOutcome<AssetT>) -> Self {
        Self {
            consumer,
            state: HandleState::Resolved(outcome),
        }
    }

    pub(crate) fn pending(
        consumer: ConsumerId,
        receiver: oneshot::Receiver<AssetOutcome<AssetT>>,
        canceller: Canceller,
    ) -> Self {
        Self {
            consumer,
            state: HandleState::Pending {
                receiver,
                canceller: Some(canceller),
            },
        }
    }

    /// Consumer.
    pub fn consumer(&self) -> ConsumerId {
        self.consumer
    }

    /// Whether the outcome is known without waiting.
    ///
    /// True right away for cache hits.
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, HandleState::Resolved(_))
    }

    /// Cancel.
    ///
    /// The handle will resolve to [AssetOutcome::Cancelled] from now on, even if the asset had
    /// already arrived. Other consumers waiting for the same key are not affected and the
    /// underlying fetch keeps running; its result is still cached.
    ///
    /// Returns true if a pending registration was removed.
    pub fn cancel(&mut self) -> bool {
        let removed = match &mut self.state {
            HandleState::Pending { canceller, .. } => {
                canceller.take().map(|cancel| cancel()).unwrap_or_default()
            }

            HandleState::Resolved(_) => false,
        };

        self.state = HandleState::Resolved(AssetOutcome::Cancelled);
        removed
    }

    fn resolve(&mut self, outcome: AssetOutcome<AssetT>) {
        // The registration is gone once an outcome was sent, so there is nothing to cancel
        self.state = HandleState::Resolved(outcome);
    }
}

impl<AssetT> AssetHandle<AssetT>
where
    AssetT: Clone,
{
    /// The outcome, if it has arrived.
    pub fn try_outcome(&mut self) -> Option<AssetOutcome<AssetT>> {
        let outcome = match &mut self.state {
            HandleState::Pending { receiver, .. } => match receiver.try_recv() {
                Ok(outcome) => outcome,
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => AssetOutcome::Error(LoadError::Abandoned),
            },

            HandleState::Resolved(outcome) => return Some(outcome.clone()),
        };

        self.resolve(outcome.clone());
        Some(outcome)
    }
}

impl<AssetT> Future for AssetHandle<AssetT>
where
    AssetT: Clone,
{
    type Output = AssetOutcome<AssetT>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let outcome = match &mut this.state {
            HandleState::Pending { receiver, .. } => match Pin::new(receiver).poll(context) {
                Poll::Ready(Ok(outcome)) => outcome,
                Poll::Ready(Err(_)) => AssetOutcome::Error(LoadError::Abandoned),
                Poll::Pending => return Poll::Pending,
            },

            HandleState::Resolved(outcome) => return Poll::Ready(outcome.clone()),
        };

        this.resolve(outcome.clone());
        Poll::Ready(outcome)
    }
}

// We never pin-project into the asset
impl<AssetT> Unpin for AssetHandle<AssetT> {}

impl<AssetT> Drop for AssetHandle<AssetT> {
    fn drop(&mut self) {
        if let HandleState::Pending { canceller, .. } = &mut self.state
            && let Some(cancel) = canceller.take()
        {
            cancel();
        }
    }
}

impl<AssetT> fmt::Debug for AssetHandle<AssetT>
where
    AssetT: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = formatter.debug_struct("AssetHandle");
        debug.field("consumer", &self.consumer);
        match &self.state {
            HandleState::Pending { .. } => debug.field("state", &"pending"),
            HandleState::Resolved(outcome) => debug.field("state", outcome),
        };
        debug.finish()
    }
}

//! Injectable logging capability.
//!
//! Components log through `tracing` macros. A [`Diagnostics`] handle decides
//! which subscriber receives those events: an injected [`Dispatch`] scoped to
//! the component's work, or, when none is injected, whatever subscriber the
//! host application installed.

use std::fmt;
use std::future::Future;

use tracing::Dispatch;
use tracing::instrument::WithSubscriber;

/// Routes a component's log events to a specific subscriber.
///
/// # Example
///
/// ```rust,ignore
/// use quant_rag::{Diagnostics, InMemoryVectorStore};
///
/// let subscriber = tracing_subscriber::fmt().finish();
/// let store = InMemoryVectorStore::new(1536)?.with_diagnostics(Diagnostics::new(subscriber));
/// ```
#[derive(Clone, Default)]
pub struct Diagnostics {
    dispatch: Option<Dispatch>,
}

impl Diagnostics {
    /// Route events to the given subscriber.
    pub fn new(subscriber: impl Into<Dispatch>) -> Self {
        Self { dispatch: Some(subscriber.into()) }
    }

    /// Use the host's default subscriber.
    pub fn inherit() -> Self {
        Self::default()
    }

    /// Whether a subscriber was injected.
    pub fn is_injected(&self) -> bool {
        self.dispatch.is_some()
    }

    /// Run a synchronous closure with this handle's subscriber as the default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    /// Drive a future with this handle's subscriber as the default on every poll.
    pub async fn instrument<F: Future>(&self, future: F) -> F::Output {
        match &self.dispatch {
            Some(dispatch) => future.with_subscriber(dispatch.clone()).await,
            None => future.await,
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").field("injected", &self.is_injected()).finish()
    }
}

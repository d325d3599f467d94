//! Run-wide cancellation.
//!
//! A [`CancelSignal`] is created once per report run and cloned into every
//! task. When the outer deadline expires the supervisor calls
//! [`CancelSignal::cancel`]; every network future wrapped in
//! [`CancelSignal::guard`] is then dropped and resolves to a
//! `Cancelled` provider error.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Cloneable cancellation flag backed by a watch channel.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Fires the signal. Idempotent.
    pub fn cancel(&self) {
        if !self.is_cancelled() {
            debug!("cancelling in-flight requests");
        }
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once the signal has fired.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Every clone holds the sender, so this only happens on teardown.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Runs `fut` unless the signal fires first.
    ///
    /// On cancellation `fut` is dropped, which aborts any in-flight HTTP
    /// request it owns.
    pub async fn guard<F, T>(&self, fut: F) -> ProviderResult<T>
    where
        F: Future<Output = ProviderResult<T>>,
    {
        if self.is_cancelled() {
            return Err(ProviderError::cancelled());
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ProviderError::cancelled()),
            result = fut => result,
        }
    }
}

//! Caller-driven cancellation for in-flight verification polls.
//!
//! A [`CancelSignal`] is held by whoever may abandon the work; each poll
//! receives a [`CancelToken`] and `select!`s on [`CancelToken::cancelled`]
//! alongside its sleep. Built on a `watch` channel so a token created after
//! the signal fired still observes it.

use tokio::sync::watch;

/// The sending half: trigger cancellation for every token it handed out.
#[derive(Debug)]
pub struct CancelSignal {
    tx: watch::Sender<bool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Get a token that resolves once [`cancel`](Self::cancel) is called.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Cancel every outstanding and future token.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait for SIGINT (Ctrl-C), then cancel.
    pub async fn cancel_on_ctrl_c(&self) {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received SIGINT, cancelling in-flight verifications");
            self.cancel();
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The receiving half, passed by reference into poll loops.
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that is never cancelled; polls end only by verdict or deadline.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancelled. Never resolves for [`CancelToken::never`] or
    /// when the signal was dropped without firing.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

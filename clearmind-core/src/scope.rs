//! View lifetimes and in-flight flags.
//!
//! A [`ViewScope`] is owned by whatever renders a page. Requests started on
//! behalf of that page run through it: once the scope is closed (or dropped),
//! pending requests resolve to [`ClearMindError::Cancelled`] instead of
//! writing into a view that no longer exists. `run_latest` additionally drops
//! results that were overtaken by a newer request from the same scope.
//!
//! [`ActionGate`] is the per-control idle/sending flag. Holding its guard is
//! what "the button is disabled" means.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{ClearMindError, Result};

#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
    generation: Arc<AtomicU64>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle for cancelling this scope from elsewhere (e.g. a Ctrl-C listener).
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Start a new request generation; earlier tickets stop being current.
    pub fn ticket(&self) -> Ticket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation,
            latest: Arc::clone(&self.generation),
        }
    }

    /// Race `fut` against the scope closing.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if self.is_closed() {
            return Err(ClearMindError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!("View closed, dropping in-flight request");
                Err(ClearMindError::Cancelled)
            }
            out = fut => Ok(out),
        }
    }

    /// Like [`run`](Self::run), but also discards the result if another
    /// request was started from this scope while `fut` was pending.
    pub async fn run_latest<F: Future>(&self, fut: F) -> Result<F::Output> {
        let ticket = self.ticket();
        let out = self.run(fut).await?;
        if ticket.is_current() {
            Ok(out)
        } else {
            tracing::debug!(generation = ticket.generation, "Discarding superseded response");
            Err(ClearMindError::Cancelled)
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Sending,
}

#[derive(Debug, Clone, Default)]
pub struct ActionGate {
    busy: Arc<AtomicBool>,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate; `None` while another action still holds it.
    pub fn try_begin(&self) -> Option<ActionGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ActionGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn state(&self) -> ActionState {
        if self.busy.load(Ordering::Acquire) {
            ActionState::Sending
        } else {
            ActionState::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == ActionState::Idle
    }
}

/// Returns its gate to idle on drop.
#[derive(Debug)]
pub struct ActionGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

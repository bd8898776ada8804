// crates/apisanity-core/src/runtime/abort.rs
// ============================================================================
// Module: Run Abort Handle
// Description: Explicit cancellation channel for a run.
// Purpose: Let providers or callers stop a run without process-wide state.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! A [`RunAbort`] is a cloneable handle over a `tokio::sync::watch` channel.
//! Triggering it interrupts the in-flight case and stops the run before the
//! next case. The first reason recorded wins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::pending;
use std::sync::Arc;

use tokio::sync::watch;

// ============================================================================
// SECTION: Abort Handle
// ============================================================================

/// Cloneable run cancellation handle.
///
/// # Invariants
/// - Once triggered, the handle stays triggered.
/// - The recorded reason never changes after the first trigger.
#[derive(Debug, Clone)]
pub struct RunAbort {
    /// Shared abort state; `Some` carries the abort reason.
    sender: Arc<watch::Sender<Option<String>>>,
}

impl Default for RunAbort {
    fn default() -> Self {
        Self::new()
    }
}

impl RunAbort {
    /// Creates an untriggered handle.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Requests the run to stop. Later reasons are ignored.
    pub fn trigger(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.sender.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
    }

    /// Returns true once the handle has been triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Returns the abort reason, if triggered.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.sender.borrow().clone()
    }

    /// Waits until the handle is triggered and returns the reason.
    pub async fn triggered(&self) -> String {
        let mut receiver = self.sender.subscribe();
        let outcome = receiver
            .wait_for(Option::is_some)
            .await
            .map(|reason| (*reason).clone().unwrap_or_default());
        match outcome {
            Ok(reason) => reason,
            // The sender lives as long as `self`, so the channel cannot close.
            Err(_) => pending().await,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

//! Subscription handles.
//!
//! [`Subscription`] is what `observe` returns: dropping it, or calling
//! [`Subscription::unsubscribe`], removes the listener. [`Cleanup`] is what a
//! start-subscription callback hands back to its facet, to be run when the
//! last listener leaves.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for one `observe` registration.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A subscription that runs `teardown` once when released.
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription with nothing to tear down.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Whether the teardown has yet to run.
    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Teardown returned by a start-subscription callback.
#[must_use]
pub struct Cleanup {
    run: Option<Box<dyn FnOnce()>>,
}

impl Cleanup {
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            run: Some(Box::new(run)),
        }
    }

    /// Nothing to clean up.
    pub fn none() -> Self {
        Self { run: None }
    }

    pub(crate) fn run(mut self) {
        if let Some(run) = self.run.take() {
            run();
        }
    }
}

impl From<Subscription> for Cleanup {
    fn from(subscription: Subscription) -> Self {
        Cleanup::new(move || subscription.unsubscribe())
    }
}

impl From<Vec<Subscription>> for Cleanup {
    fn from(subscriptions: Vec<Subscription>) -> Self {
        Cleanup::new(move || {
            for subscription in subscriptions {
                subscription.unsubscribe();
            }
        })
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleanup")
            .field("pending", &self.run.is_some())
            .finish()
    }
}

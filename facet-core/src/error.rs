//! Errors surfaced by the scheduler.
//!
//! Absence of a value is never an error in this crate: it is `None`. The only
//! failures are flush failures, which unwind out of [`Scheduler::batch`] as
//! panics and can be captured as a [`FlushError`] with
//! [`Scheduler::try_batch`].
//!
//! [`Scheduler::batch`]: crate::schedule::Scheduler::batch
//! [`Scheduler::try_batch`]: crate::schedule::Scheduler::try_batch

use std::any::Any;

use thiserror::Error;

/// A batch or one of the tasks it flushed did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlushError {
    /// The batch body or a scheduled task panicked. Remaining queued tasks
    /// were unscheduled and dropped.
    #[error("batch aborted by panic: {message}")]
    Panicked {
        /// The panic message, when the payload was a string.
        message: String,
    },

    /// Tasks kept scheduling each other and the queue never drained.
    #[error("flush did not settle after {limit} passes")]
    PassLimitExceeded {
        /// The configured pass limit.
        limit: usize,
    },
}

impl FlushError {
    /// Convert a panic payload caught by `catch_unwind`.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<FlushError>() {
            Ok(error) => return *error,
            Err(payload) => payload,
        };

        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };

        FlushError::Panicked { message }
    }
}

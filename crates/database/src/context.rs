//! Request-scoped context.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use time::OffsetDateTime;

/// Per-request handle: a cancellation flag shared with the caller and the
/// instant the request started.
#[derive(Clone, Debug)]
pub struct RequestContext {
    cancelled: Arc<AtomicBool>,
    now: OffsetDateTime,
}

impl RequestContext {
    /// Creates a context stamped with the current UTC time.
    pub fn new() -> Self {
        Self::at(OffsetDateTime::now_utc())
    }

    /// Creates a context stamped with a fixed instant.
    pub fn at(now: OffsetDateTime) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            now,
        }
    }

    /// Returns the request instant.
    pub fn now(&self) -> OffsetDateTime {
        self.now
    }

    /// Returns the calendar year of the request instant, in UTC.
    pub fn current_year(&self) -> i32 {
        self.now.to_offset(time::UtcOffset::UTC).year()
    }

    /// Requests cancellation. Every clone of the context observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fails with [`Error::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_current_year_is_utc() {
        let ctx = RequestContext::at(datetime!(2025-01-01 01:00 +03:00));
        assert_eq!(ctx.current_year(), 2024);
    }

    #[test]
    fn test_cancel_is_shared() {
        let ctx = RequestContext::new();
        let handle = ctx.clone();
        assert!(ctx.check().is_ok());
        handle.cancel();
        assert!(matches!(ctx.check(), Err(Error::Cancelled)));
    }
}

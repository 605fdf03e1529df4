//! Worker dispatch.
//!
//! Effects, concurrent event handlers and background work all leave the
//! calling thread through [`dispatch`]. Jobs run on the rayon global pool.
//! A job that panics is logged and dropped; it never takes down the pool or
//! reaches the caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run `job` on a worker thread without waiting for it.
pub fn dispatch<F>(job: F)
where
    F: FnOnce() + Send + 'static,
{
    rayon::spawn(move || {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            tracing::warn!(reason = panic_message(&*payload), "worker job panicked");
        }
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

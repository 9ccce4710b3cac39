//! Fail-fast boundary.
//!
//! The plain (non-`try_`) API treats every `StatsError` as caller misuse:
//! it is logged and the current thread panics with the error's message.

use scopestat_core::Result;

#[track_caller]
pub(crate) fn fail_fast<T>(res: Result<T>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(class = e.class().as_str(), error = %e, "metric misuse");
            panic!("{}: {e}", e.class().as_str())
        }
    }
}

//! Admission control - per-rule window evaluation and the request guard.

mod guard;
mod sliding_window;

pub use guard::{
    AdmissionDecision, HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET, HEADER_RETRY_AFTER,
    RateLimitHeaders, RequestEvaluator, denial_message,
};
pub use sliding_window::{DEFAULT_STORE_TIMEOUT, SlidingWindowEvaluator};

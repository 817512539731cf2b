//! # Hirewire Core
//!
//! The admission-control layer every inbound API request passes through
//! before reaching business logic. This crate holds the pure logic; the
//! counter store and the web framework are reached only through ports.

pub mod admission;
pub mod clock;
pub mod domain;
pub mod error;
pub mod ports;

pub use admission::{AdmissionDecision, RateLimitHeaders, RequestEvaluator, SlidingWindowEvaluator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::DomainError;

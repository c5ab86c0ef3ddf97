//! Budget-vs-actual-vs-projected series construction.
//!
//! - calendar-month helpers (`calendar`)
//! - the merge itself (`merger`)
//! - run-rate estimate of the period-end value (`forecast`)

pub mod calendar;
pub mod forecast;
pub mod merger;

pub use calendar::*;
pub use forecast::*;
pub use merger::*;

//! Concurrency primitives shared by import commands.
//!
//! - [`CancellationToken`] / [`Cancelled`] - Cooperative cancellation signal
//! - [`AdmissionGate`] / [`AdmissionPermit`] - Bounded admission with
//!   non-polling waits and cancellation

mod cancellation;
mod gate;

pub use cancellation::{CancellationToken, Cancelled};
pub use gate::{AdmissionGate, AdmissionPermit};

//! hoist-health — health probing for the supervised service.
//!
//! A probe is a single bounded-timeout HTTP GET against the service's
//! health endpoint, collapsed to a [`HealthSnapshot`]. The poll module
//! layers a fixed-interval, fixed-attempt retry policy on top for
//! post-promotion verification.

mod poll;
mod prober;

pub use poll::{PollOutcome, PollPolicy, poll_until_reachable};
pub use prober::{BoxFuture, HealthProber, Probe};

//! Bounded verification poll.
//!
//! Fixed interval, fixed attempt count, first-success-wins, explicit
//! exhausted terminal state. Each round sleeps first, then probes —
//! the restart needs a beat before the service can possibly answer.

use std::time::Duration;

use tracing::{debug, info};

use crate::prober::Probe;
use hoist_core::HealthSnapshot;

/// Retry parameters for the post-promotion verification poll.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Wait between probes.
    pub interval: Duration,
    /// Probes before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 15,
        }
    }
}

/// Terminal state of a verification poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The service answered on probe number `attempt` (1-based).
    Reachable {
        attempt: u32,
        snapshot: HealthSnapshot,
    },
    /// All attempts failed; the service never answered.
    Exhausted { attempts: u32 },
}

/// Probe until the first reachable snapshot or the attempt bound.
pub async fn poll_until_reachable(probe: &dyn Probe, policy: PollPolicy) -> PollOutcome {
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        let snapshot = probe.probe().await;
        if snapshot.reachable {
            info!(attempt, uptime_secs = snapshot.uptime_secs, "service reachable");
            return PollOutcome::Reachable { attempt, snapshot };
        }
        debug!(attempt, max = policy.max_attempts, "service not yet reachable");
    }
    PollOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}

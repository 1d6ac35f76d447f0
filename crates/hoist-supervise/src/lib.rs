//! hoist-supervise — the process-supervisor boundary.
//!
//! hoist never manages the service process itself; it asks the
//! external supervisor to restart it and reads the supervisor's status
//! table. The restart is deliberately tri-state (restarted, failed,
//! timed out) — the health poll, not the supervisor exit code, is the
//! real confirmation that a promotion took.

mod restart;
mod status;

pub use restart::{BoxFuture, RestartOutcome, Supervisor, SupervisorCtl};
pub use status::{ServiceInfo, parse_status};

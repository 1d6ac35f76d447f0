//! hoist-promote — the supervised promotion workflow and deletion guard.
//!
//! Promotion is one strictly ordered sequence: verify the build
//! exists, stage it into the live binary path, commit the active
//! pointer, ask the supervisor for a restart, then poll health up to a
//! fixed bound. The pointer commit is the point of no return — after
//! it, restart and health failures only degrade the report, they never
//! fail the promotion.
//!
//! The deletion guard enforces the one safety invariant of the whole
//! system: the active build is never removable.

mod controller;
mod guard;

pub use controller::{PromoteError, PromotionController, PromotionReport};
pub use guard::{DeleteError, DeletionGuard};

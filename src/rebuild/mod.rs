//! Rebuild subsystem.
//!
//! # Data Flow
//! ```text
//! timer tick ─────────────┐
//! POST /api/controllers/  ├──▶ coordinator.rs (one serialized loop)
//!   rebuild → trigger.rs ─┘        │
//!                                  ▼
//!                    catalog query (timeout-bounded)
//!                                  │ version set changed?
//!                                  ▼
//!                    route table build → SwapHandle::install
//! ```
//!
//! # Design Decisions
//! - Two event sources, one mutation path: the timer and the external
//!   trigger feed the same loop, so rebuilds never race each other
//! - The trigger queue holds one slot; further signals are dropped,
//!   bounding work to one rebuild in flight plus one pending
//! - Any failure keeps the previously installed table serving

pub mod coordinator;
pub mod trigger;

pub use coordinator::{RebuildCoordinator, RebuildError, RebuildOutcome};
pub use trigger::RebuildTrigger;

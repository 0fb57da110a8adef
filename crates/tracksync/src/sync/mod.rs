//! Paginated continuation sync.
//!
//! A logical sync is a chain of independent [`sync_step`] calls linked only
//! by the continuation token each one returns. [`sync_to_end`] is a ready-made
//! driver for hosts that simply want every row.

pub mod drain;
pub mod progress;
pub mod step;

pub use drain::sync_to_end;
pub(crate) use drain::CycleGuard;
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use step::{StepOutput, SyncParams, sync_step};

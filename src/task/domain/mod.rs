//! Domain model for task lifecycle management.
//!
//! A task is a single to-do item keyed by a database-assigned integer id. The
//! domain types validate caller input and describe the outcomes of store
//! operations while keeping all infrastructure concerns outside of the domain
//! boundary.

mod error;
mod ids;
mod outcome;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskDescription, TaskId};
pub use outcome::{DeleteOutcome, TaskListing, UpdateOutcome};
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Task};

//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{StatusChange, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService};

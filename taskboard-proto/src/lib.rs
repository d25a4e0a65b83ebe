//! Shared data model and wire records for `Taskboard`.
//!
//! Both the server and the client depend on this crate so that the JSON
//! shapes, the default-on-receipt rules, and the patch semantics are defined
//! exactly once. The in-memory [`TaskRepository`] backs both the server
//! and the client's local-only mode.

pub mod catalog;
pub mod dashboard;
pub mod repo;
pub mod task;
pub mod wire;

pub use catalog::{Tag, TagCatalog};
pub use dashboard::Dashboard;
pub use repo::{RepoError, TaskRepository};
pub use task::{Comment, StatusModel, Task, TaskId, TaskStatus, ValidationError};
pub use wire::{ErrorBody, NewComment, NewTask, TaskPatch};

//! `Taskboard` REST server library.
//!
//! Exposes the server for use in tests and embedding. The server keeps every
//! owner's tasks in memory and serves them over a small JSON API.

pub mod api;
pub mod config;
pub mod store;

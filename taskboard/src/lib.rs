//! `Taskboard`: personal task tracker client library.
//!
//! The [`store::TaskStore`] mirrors one owner's tasks and keeps them in step
//! with a [`service::TaskService`], either the REST server or an in-process
//! repository. [`filter`] narrows the mirror for display and [`app`] wires
//! both to the command-line front end.

pub mod app;
pub mod cli;
pub mod config;
pub mod filter;
pub mod logging;
pub mod service;
pub mod store;
pub mod view;

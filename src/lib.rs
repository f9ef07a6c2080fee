//! # Tako Dashboard
//!
//! Client and terminal dashboard for the Tako Tasks service.
//!
//! This library provides:
//! - A typed client for the task service HTTP API
//! - Session, filter and task-list state for the dashboard view
//! - The early-access and unlock-key workflows
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────┐   ┌─────────────┐
//!   │ Session  │   │ FilterState │
//!   └────┬─────┘   └──────┬──────┘
//!        │ credential     │ filters        (watch channels)
//!        ▼                ▼
//!   ┌──────────────────────────────┐
//!   │          TaskLoader          │
//!   │  generation counter, aborts  │
//!   │  superseded fetches          │
//!   └──────────────┬───────────────┘
//!                  │ fetch_tasks
//!                  ▼
//!          ┌───────────────┐
//!          │  TaskService  │ ──► GET /tasks
//!          └───────────────┘
//! ```
//!
//! ## Modules
//! - `api`: `TaskService` trait, HTTP implementation, wire types and errors
//! - `session` / `filters` / `loader`: dashboard state and reactive reload
//! - `access`: request-access and unlock flows
//! - `render`: plain-text presentation

pub mod access;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod filters;
pub mod loader;
pub mod render;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpTaskService, TaskService};
pub use config::Config;
pub use dashboard::Dashboard;
pub use filters::{FilterField, FilterSet};
pub use loader::TaskView;

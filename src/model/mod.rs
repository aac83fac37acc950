//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - `DomainState` - Remote-backed data (template query, delete mutation)
//! - `OverlayHost` - Single-flight modal/confirm hosts
//! - Table projection and manifest handling for templates

pub mod domain;
pub mod manifest;
pub mod overlay;
pub mod query;
pub mod table;
pub mod template;
pub mod ui;

// Re-export commonly used types
pub use domain::DomainState;
pub use manifest::TemplateManifest;
pub use overlay::{ConfirmOutcome, ConfirmRequest, OverlayHost};
pub use query::{MutationState, QueryKey, QueryState, RequestId};
pub use table::{build_rows, Pagination, RowAction, TemplateRow, TimeDisplay};
pub use template::{ClusterAnalysisTemplate, ObjectMeta, Time};
pub use ui::Notification;

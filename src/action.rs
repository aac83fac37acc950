//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state. Confirm dialogs also carry Actions as their
//! callbacks.

use crate::model::QueryKey;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick: drains finished requests, ages notifications
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Table Navigation
    // ─────────────────────────────────────────────────────────────────────────
    NextRow,
    PrevRow,
    FirstRow,
    LastRow,
    NextPage,
    PrevPage,
    /// Show/hide the description of the selected row
    ToggleExpand,

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────
    /// Re-issue the list query
    Refetch,
    /// Refetch the live query with this key; cached data stays until it settles
    Invalidate(QueryKey),
    /// Load one template (issued by the edit modal on mount)
    FetchTemplate(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Row Actions
    // ─────────────────────────────────────────────────────────────────────────
    /// Edit the selected row
    EditSelected,
    /// Delete the selected row
    DeleteSelected,
    /// Ask for confirmation before deleting the named template
    RequestDelete(String),
    /// Fire the delete mutation
    DeleteTemplate(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Confirm Dialog
    // ─────────────────────────────────────────────────────────────────────────
    ConfirmAccept,
    ConfirmCancel,

    // ─────────────────────────────────────────────────────────────────────────
    // Create / Edit Modal
    // ─────────────────────────────────────────────────────────────────────────
    OpenCreateModal,
    /// Open the edit modal for the named template
    OpenEditModal(String),
    CloseModal,
    /// Validate and send the modal's manifest
    SubmitModal,
    /// Open the modal's manifest in $EDITOR
    OpenEditor,
    /// Edited manifest text returned from $EDITOR
    ManifestEdited(String),
    /// The external editor could not be run
    EditorFailed(String),
    ModalScrollUp,
    ModalScrollDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Misc
    // ─────────────────────────────────────────────────────────────────────────
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    CloseHelp,
    DismissNotification,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextRow => write!(f, "NextRow"),
            Action::PrevRow => write!(f, "PrevRow"),
            Action::FirstRow => write!(f, "FirstRow"),
            Action::LastRow => write!(f, "LastRow"),
            Action::NextPage => write!(f, "NextPage"),
            Action::PrevPage => write!(f, "PrevPage"),
            Action::ToggleExpand => write!(f, "ToggleExpand"),
            Action::Refetch => write!(f, "Refetch"),
            Action::Invalidate(key) => write!(f, "Invalidate({})", key),
            Action::FetchTemplate(name) => write!(f, "FetchTemplate({})", name),
            Action::EditSelected => write!(f, "EditSelected"),
            Action::DeleteSelected => write!(f, "DeleteSelected"),
            Action::RequestDelete(name) => write!(f, "RequestDelete({})", name),
            Action::DeleteTemplate(name) => write!(f, "DeleteTemplate({})", name),
            Action::ConfirmAccept => write!(f, "ConfirmAccept"),
            Action::ConfirmCancel => write!(f, "ConfirmCancel"),
            Action::OpenCreateModal => write!(f, "OpenCreateModal"),
            Action::OpenEditModal(name) => write!(f, "OpenEditModal({})", name),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::SubmitModal => write!(f, "SubmitModal"),
            Action::OpenEditor => write!(f, "OpenEditor"),
            Action::ManifestEdited(text) => write!(f, "ManifestEdited({} bytes)", text.len()),
            Action::EditorFailed(err) => write!(f, "EditorFailed({})", err),
            Action::ModalScrollUp => write!(f, "ModalScrollUp"),
            Action::ModalScrollDown => write!(f, "ModalScrollDown"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseHelp => write!(f, "CloseHelp"),
            Action::DismissNotification => write!(f, "DismissNotification"),
        }
    }
}

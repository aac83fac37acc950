//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod confirm_dialog;
pub mod help_dialog;
pub mod layout;
pub mod template_modal;
pub mod templates;

pub use confirm_dialog::ConfirmDialog;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_screen_layout, centered_popup, centered_popup_percent};
pub use template_modal::TemplateModal;
pub use templates::{draw_templates_screen, ScreenContext, TemplatesScreen};

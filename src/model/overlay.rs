//! Single-flight overlay hosts
//!
//! Each host owns at most one open overlay. Opening while something is
//! already shown is rejected rather than stacked, so the screen always knows
//! exactly which overlay receives input.

use crate::action::Action;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("an overlay is already open")]
pub struct OverlayBusy;

/// Host holding zero or one overlay of type `T`
#[derive(Debug)]
pub struct OverlayHost<T> {
    slot: Option<T>,
}

impl<T> Default for OverlayHost<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> OverlayHost<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an overlay; fails if one is already open
    pub fn open(&mut self, overlay: T) -> Result<(), OverlayBusy> {
        if self.slot.is_some() {
            return Err(OverlayBusy);
        }
        self.slot = Some(overlay);
        Ok(())
    }

    /// Hide and return the current overlay
    pub fn close(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn current(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.slot.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }
}

/// Body of a confirmation: `{prefix}{subject}{suffix}` with the subject emphasized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmBody {
    pub prefix: String,
    pub subject: String,
    pub suffix: String,
}

/// An open confirmation dialog
///
/// The callbacks are plain actions: confirming yields `on_confirm`,
/// cancelling yields `on_cancel` (if any). Either way the dialog closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub body: ConfirmBody,
    pub on_confirm: Action,
    pub on_cancel: Option<Action>,
    pub destructive: bool,
}

impl ConfirmRequest {
    pub fn delete_template(name: &str) -> Self {
        Self {
            title: "Delete Cluster Analysis Template".to_string(),
            body: ConfirmBody {
                prefix: "Are you sure you want to delete ClusterAnalysisTemplate ".to_string(),
                subject: name.to_string(),
                suffix: "?".to_string(),
            },
            on_confirm: Action::DeleteTemplate(name.to_string()),
            on_cancel: None,
            destructive: true,
        }
    }

    pub fn quit() -> Self {
        Self {
            title: "Quit?".to_string(),
            body: ConfirmBody {
                prefix: "Are you sure you want to quit?".to_string(),
                subject: String::new(),
                suffix: String::new(),
            },
            on_confirm: Action::ForceQuit,
            on_cancel: None,
            destructive: false,
        }
    }
}

/// Outcome of resolving an open confirm dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed(Action),
    Cancelled(Option<Action>),
}

impl OverlayHost<ConfirmRequest> {
    /// Resolve the open dialog and return to idle
    pub fn resolve(&mut self, confirmed: bool) -> Option<ConfirmOutcome> {
        let request = self.close()?;
        Some(if confirmed {
            ConfirmOutcome::Confirmed(request.on_confirm)
        } else {
            ConfirmOutcome::Cancelled(request.on_cancel)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_is_single_flight() {
        let mut host = OverlayHost::new();
        assert!(!host.is_open());

        host.open(ConfirmRequest::delete_template("a")).unwrap();
        assert_eq!(host.open(ConfirmRequest::delete_template("b")), Err(OverlayBusy));
        assert_eq!(host.current().unwrap().body.subject, "a");

        host.close();
        assert!(host.open(ConfirmRequest::delete_template("b")).is_ok());
    }

    #[test]
    fn test_confirm_yields_captured_delete() {
        let mut host = OverlayHost::new();
        host.open(ConfirmRequest::delete_template("tmpl-a")).unwrap();

        let outcome = host.resolve(true);
        assert_eq!(
            outcome,
            Some(ConfirmOutcome::Confirmed(Action::DeleteTemplate("tmpl-a".to_string())))
        );
        assert!(!host.is_open());
    }

    #[test]
    fn test_cancel_discards_target() {
        let mut host = OverlayHost::new();
        host.open(ConfirmRequest::delete_template("tmpl-a")).unwrap();

        assert_eq!(host.resolve(false), Some(ConfirmOutcome::Cancelled(None)));
        assert!(!host.is_open());
        assert_eq!(host.resolve(true), None);
    }

    #[test]
    fn test_current_mut_updates_overlay() {
        let mut host: OverlayHost<usize> = OverlayHost::new();
        host.open(1).unwrap();
        if let Some(value) = host.current_mut() {
            *value = 2;
        }
        assert_eq!(host.current(), Some(&2));
    }
}

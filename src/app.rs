//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! It owns the remote-backed state and turns request completions into
//! state changes; the components only ever see Actions.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    confirm_dialog, draw_templates_screen, ConfirmDialog, HelpDialog, ScreenContext,
    TemplateModal, TemplatesScreen,
};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::{
    build_rows, ConfirmOutcome, ConfirmRequest, DomainState, Notification, OverlayHost, QueryKey,
    RowAction, TemplateRow,
};
use crate::services::{ApiRequest, ApiResponse, Completion, RequestRunner, TemplateService};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Domain state (list query, delete mutation)
    pub domain: DomainState,

    /// Rows projected from the last successful list
    pub rows: Vec<TemplateRow>,

    /// Background request runner
    pub runner: RequestRunner,

    /// Create/edit modal host
    pub modal: OverlayHost<TemplateModal>,

    /// Confirmation host
    pub confirm: OverlayHost<ConfirmRequest>,

    /// Status bar message
    pub notification: Option<Notification>,

    /// Manifest text to open in $EDITOR (handled by the main loop)
    pub pending_editor: Option<String>,

    pub show_help: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub screen: TemplatesScreen,
    pub confirm_dialog: ConfirmDialog,
    pub help_dialog: HelpDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    pub fn new(service: Arc<dyn TemplateService>, config: &Config) -> App {
        App {
            should_quit: false,
            domain: DomainState::new(),
            rows: Vec::new(),
            runner: RequestRunner::new(service),
            modal: OverlayHost::new(),
            confirm: OverlayHost::new(),
            notification: None,
            pending_editor: None,
            show_help: false,
            screen: TemplatesScreen::new(config.page_size, config.time_display),
            confirm_dialog: ConfirmDialog,
            help_dialog: HelpDialog::default(),
        }
    }

    /// Run an action and every follow-up it produces
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let mut current = Some(action);
        while let Some(action) = current {
            tracing::trace!(%action, "dispatch");
            current = self.update(action)?;
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        if notification.is_error() {
            tracing::warn!(message = %notification.message, "notification");
        }
        self.notification = Some(notification);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    fn fetch_templates(&mut self) {
        let id = self.runner.submit(ApiRequest::ListTemplates);
        self.domain.templates.begin(id);
    }

    /// Refetch whichever live query is registered under `key`
    ///
    /// Cached data stays visible until the new response arrives. Keys with
    /// no live query (e.g. a template whose modal is closed) are ignored.
    fn invalidate(&mut self, key: QueryKey) -> Option<Action> {
        if self.domain.templates.key == key {
            tracing::debug!(%key, "invalidating query");
            self.fetch_templates();
            return None;
        }

        let detail_key = self
            .modal
            .current()
            .and_then(|modal| modal.detail.as_ref())
            .map(|detail| &detail.key);
        if detail_key != Some(&key) {
            tracing::trace!(%key, "no live query to invalidate");
            return None;
        }
        tracing::debug!(%key, "invalidating query");
        match key {
            QueryKey::ClusterAnalysisTemplate(name) => Some(Action::FetchTemplate(name)),
            QueryKey::ClusterAnalysisTemplates => None,
        }
    }

    fn fetch_template(&mut self, name: String) {
        let Some(modal) = self.modal.current_mut() else {
            return;
        };
        if modal.target_name() != Some(name.as_str()) {
            return;
        }
        let id = self.runner.submit(ApiRequest::GetTemplate { name });
        modal.begin_fetch(id);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Overlays
    // ─────────────────────────────────────────────────────────────────────────

    fn open_confirm(&mut self, request: ConfirmRequest) {
        if self.confirm.open(request).is_err() {
            tracing::warn!("confirmation already open, request rejected");
        }
    }

    fn open_modal(&mut self, modal: TemplateModal) -> Option<Action> {
        let mount = modal.mount();
        match self.modal.open(modal) {
            Ok(()) => mount,
            Err(err) => {
                tracing::warn!(%err, "template modal rejected");
                None
            }
        }
    }

    fn request_delete(&mut self, name: String) {
        if name.is_empty() {
            self.notify(Notification::error("Template has no name and cannot be deleted"));
            return;
        }
        if self.domain.delete.is_pending() {
            tracing::debug!(%name, "delete already pending, ignoring request");
            return;
        }
        self.open_confirm(ConfirmRequest::delete_template(&name));
    }

    fn delete_template(&mut self, name: String) {
        if self.domain.delete.is_pending() {
            return;
        }
        tracing::info!(%name, "deleting template");
        let id = self.runner.submit(ApiRequest::DeleteTemplate { name });
        self.domain.delete.begin(id);
    }

    fn submit_modal(&mut self) {
        let Some(modal) = self.modal.current_mut() else {
            return;
        };
        if let Some(request) = modal.prepare_submit() {
            let id = self.runner.submit(request);
            modal.begin_submit(id);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Completions
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply every finished request, then run the actions they trigger
    pub fn drain_completions(&mut self) -> Result<()> {
        if self.runner.in_flight() == 0 {
            return Ok(());
        }
        for completion in self.runner.poll() {
            for action in self.handle_completion(completion)? {
                self.dispatch(action)?;
            }
        }
        Ok(())
    }

    /// Apply a settled request to the state it belongs to
    ///
    /// Returns the follow-up actions (query invalidations) to dispatch.
    pub fn handle_completion(&mut self, completion: Completion) -> Result<Vec<Action>> {
        let Completion {
            id,
            request,
            result,
            elapsed,
        } = completion;
        tracing::debug!(
            id,
            request = request.label(),
            elapsed_ms = elapsed.as_millis() as u64,
            ok = result.is_ok(),
            "request settled"
        );

        let mut follow_up = Vec::new();
        match request {
            ApiRequest::ListTemplates => {
                let result = result.and_then(|response| match response {
                    ApiResponse::Templates(items) => Ok(items),
                    other => Err(unexpected_response(&other)),
                });
                if let Err(ref err) = result {
                    tracing::warn!(%err, kind = err.kind(), "listing templates failed");
                }
                if self.domain.templates.settle(id, result) {
                    self.rows = build_rows(self.domain.items(), self.screen.time_display);
                    self.screen.sync(&self.rows);
                } else {
                    tracing::debug!(id, "ignoring stale list response");
                }
            }

            ApiRequest::DeleteTemplate { name } => {
                if !self.domain.delete.settle(id, &result) {
                    tracing::debug!(%name, id, "ignoring stale delete response");
                    return Ok(Vec::new());
                }
                match result {
                    Ok(_) => {
                        tracing::info!(%name, "template deleted");
                        self.notify(Notification::info(format!(
                            "Deleted ClusterAnalysisTemplate {}",
                            name
                        )));
                        follow_up.push(Action::Invalidate(QueryKey::ClusterAnalysisTemplates));
                    }
                    Err(err) => {
                        tracing::warn!(%name, kind = err.kind(), "delete failed");
                        self.notify(Notification::error(format!(
                            "Failed to delete {}: {}",
                            name, err
                        )));
                    }
                }
            }

            ApiRequest::GetTemplate { name } => {
                let result = result.and_then(|response| match response {
                    ApiResponse::Template(template) => Ok(template),
                    other => Err(unexpected_response(&other)),
                });
                let applied = match self.modal.current_mut() {
                    Some(modal) if modal.awaits_fetch(id) => modal.apply_detail(id, result),
                    _ => false,
                };
                if !applied {
                    tracing::debug!(%name, id, "ignoring stale template response");
                }
            }

            ApiRequest::CreateTemplate { .. } | ApiRequest::UpdateTemplate { .. } => {
                let awaited = match self.modal.current_mut() {
                    Some(modal) if modal.awaits_submit(id) => modal.settle_submit(id, &result),
                    _ => false,
                };
                match result {
                    Ok(response) => {
                        follow_up.push(Action::Invalidate(QueryKey::ClusterAnalysisTemplates));
                        let message = match response {
                            ApiResponse::Created(name) => format!("Created ClusterAnalysisTemplate {}", name),
                            ApiResponse::Updated(name) => {
                                let message = format!("Updated ClusterAnalysisTemplate {}", name);
                                // A reopened edit modal may hold the old version
                                follow_up.push(Action::Invalidate(QueryKey::ClusterAnalysisTemplate(name)));
                                message
                            }
                            _ => "Saved ClusterAnalysisTemplate".to_string(),
                        };
                        if awaited {
                            self.modal.close();
                        }
                        tracing::info!("{}", message);
                        self.notify(Notification::info(message));
                    }
                    // An open modal shows its own error
                    Err(err) if !awaited => {
                        self.notify(Notification::error(format!("Save failed: {}", err)));
                    }
                    Err(_) => {}
                }
            }
        }
        Ok(follow_up)
    }
}

fn unexpected_response(response: &ApiResponse) -> ApiError {
    ApiError::Unexpected(format!("mismatched response {:?}", response))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<Option<Action>> {
        Ok(Some(Action::Refetch))
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::ForceQuit));
        }

        if self.confirm.is_open() {
            self.confirm_dialog.handle_key_event(key)
        } else if let Some(modal) = self.modal.current_mut() {
            modal.handle_key_event(key)
        } else if self.show_help {
            self.help_dialog.handle_key_event(key)
        } else {
            self.screen.handle_key_event(key)
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                self.drain_completions()?;
                if self.notification.as_mut().is_some_and(|n| n.tick()) {
                    self.notification = None;
                }
            }
            Action::Resize(_, _) => {}
            Action::OpenQuitDialog => self.open_confirm(ConfirmRequest::quit()),
            Action::ForceQuit => self.should_quit = true,

            // ─────────────────────────────────────────────────────────────────
            // Navigation (delegate to TemplatesScreen)
            // ─────────────────────────────────────────────────────────────────
            Action::NextRow => self.screen.next(self.rows.len()),
            Action::PrevRow => self.screen.previous(self.rows.len()),
            Action::FirstRow => self.screen.select_first(self.rows.len()),
            Action::LastRow => self.screen.select_last(self.rows.len()),
            Action::NextPage => self.screen.next_page(self.rows.len()),
            Action::PrevPage => self.screen.prev_page(self.rows.len()),
            Action::ToggleExpand => self.screen.toggle_expand(&self.rows),

            // ─────────────────────────────────────────────────────────────────
            // Queries
            // ─────────────────────────────────────────────────────────────────
            Action::Refetch => self.fetch_templates(),
            Action::Invalidate(key) => return Ok(self.invalidate(key)),
            Action::FetchTemplate(name) => self.fetch_template(name),

            // ─────────────────────────────────────────────────────────────────
            // Row Actions
            // ─────────────────────────────────────────────────────────────────
            Action::EditSelected => {
                return Ok(self
                    .screen
                    .selected_row(&self.rows)
                    .map(|row| RowAction::Edit.dispatch(row)));
            }
            Action::DeleteSelected => {
                return Ok(self
                    .screen
                    .selected_row(&self.rows)
                    .map(|row| RowAction::Delete.dispatch(row)));
            }
            Action::RequestDelete(name) => self.request_delete(name),
            Action::DeleteTemplate(name) => self.delete_template(name),

            // ─────────────────────────────────────────────────────────────────
            // Confirm Dialog
            // ─────────────────────────────────────────────────────────────────
            Action::ConfirmAccept => {
                if let Some(ConfirmOutcome::Confirmed(next)) = self.confirm.resolve(true) {
                    return Ok(Some(next));
                }
            }
            Action::ConfirmCancel => {
                if let Some(ConfirmOutcome::Cancelled(next)) = self.confirm.resolve(false) {
                    return Ok(next);
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Create / Edit Modal
            // ─────────────────────────────────────────────────────────────────
            Action::OpenCreateModal => return Ok(self.open_modal(TemplateModal::create())),
            Action::OpenEditModal(name) => {
                if name.is_empty() {
                    self.notify(Notification::error("Template has no name and cannot be edited"));
                    return Ok(None);
                }
                return Ok(self.open_modal(TemplateModal::edit(name)));
            }
            Action::CloseModal => {
                if let Some(mut modal) = self.modal.close() {
                    modal.abandon();
                }
            }
            Action::SubmitModal => self.submit_modal(),
            Action::OpenEditor => {
                self.pending_editor = self.modal.current().map(|modal| modal.manifest.clone());
            }
            Action::ManifestEdited(_)
            | Action::EditorFailed(_)
            | Action::ModalScrollUp
            | Action::ModalScrollDown => {
                if let Some(modal) = self.modal.current_mut() {
                    return modal.update(action);
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Misc
            // ─────────────────────────────────────────────────────────────────
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.show_help = true;
            }
            Action::CloseHelp => self.show_help = false,
            Action::DismissNotification => self.notification = None,
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let ctx = ScreenContext {
            rows: &self.rows,
            is_loading: self.domain.templates.is_loading(),
            has_data: self.domain.templates.data.is_some(),
            load_error: self.domain.templates.error.as_ref(),
            is_deleting: self.domain.delete.is_pending(),
            notification: self.notification.as_ref(),
        };
        draw_templates_screen(frame, area, &mut self.screen, &ctx)?;

        if let Some(modal) = self.modal.current_mut() {
            modal.draw(frame, area)?;
        }
        if self.show_help {
            self.help_dialog.draw(frame, area)?;
        }
        if let Some(request) = self.confirm.current() {
            confirm_dialog::draw_request(frame, area, request);
        }
        Ok(())
    }
}

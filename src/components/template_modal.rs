//! Create/Edit template modal
//!
//! Shows the YAML manifest of a template. Editing happens in `$EDITOR`;
//! the modal validates the result locally before sending it. The edit
//! variant only knows the template name and loads the rest itself.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup_percent;
use crate::error::ApiError;
use crate::model::{
    ClusterAnalysisTemplate, MutationState, QueryKey, QueryState, RequestId, TemplateManifest,
};
use crate::services::{ApiRequest, ApiResponse};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalVariant {
    Create,
    Edit { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    /// Edit variant waiting for the template
    Loading,
    /// Edit variant could not load the template
    LoadFailed,
    Ready,
    /// Create/update request in flight
    Submitting,
}

pub struct TemplateModal {
    pub variant: ModalVariant,
    /// Manifest text being edited
    pub manifest: String,
    /// Last validation or server error
    pub error: Option<ApiError>,
    pub scroll: u16,
    /// Template fetch, edit variant only
    pub detail: Option<QueryState<ClusterAnalysisTemplate>>,
    pub submit: MutationState,
}

impl TemplateModal {
    pub fn create() -> Self {
        Self {
            variant: ModalVariant::Create,
            manifest: TemplateManifest::skeleton().to_yaml().unwrap_or_default(),
            error: None,
            scroll: 0,
            detail: None,
            submit: MutationState::new(),
        }
    }

    pub fn edit(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            detail: Some(QueryState::new(QueryKey::ClusterAnalysisTemplate(name.clone()))),
            variant: ModalVariant::Edit { name },
            manifest: String::new(),
            error: None,
            scroll: 0,
            submit: MutationState::new(),
        }
    }

    /// Name of the template being edited
    pub fn target_name(&self) -> Option<&str> {
        match self.variant {
            ModalVariant::Create => None,
            ModalVariant::Edit { ref name } => Some(name),
        }
    }

    pub fn title(&self) -> String {
        match self.variant {
            ModalVariant::Create => "Create Cluster Analysis Template".to_string(),
            ModalVariant::Edit { ref name } => format!("Edit Cluster Analysis Template {}", name),
        }
    }

    /// Action to run once the modal is shown
    pub fn mount(&self) -> Option<Action> {
        self.target_name()
            .map(|name| Action::FetchTemplate(name.to_string()))
    }

    pub fn phase(&self) -> ModalPhase {
        if self.submit.is_pending() {
            return ModalPhase::Submitting;
        }
        match self.detail {
            None => ModalPhase::Ready,
            Some(ref detail) if detail.data.is_some() => ModalPhase::Ready,
            Some(ref detail) if detail.is_loading() => ModalPhase::Loading,
            Some(ref detail) if detail.error.is_some() => ModalPhase::LoadFailed,
            Some(_) => ModalPhase::Loading,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Template fetch
    // ─────────────────────────────────────────────────────────────────────────

    pub fn begin_fetch(&mut self, id: RequestId) {
        if let Some(ref mut detail) = self.detail {
            detail.begin(id);
        }
    }

    pub fn awaits_fetch(&self, id: RequestId) -> bool {
        self.detail.as_ref().is_some_and(|detail| detail.awaits(id))
    }

    /// Apply a fetched template; returns `false` if the response was stale
    pub fn apply_detail(&mut self, id: RequestId, result: Result<ClusterAnalysisTemplate, ApiError>) -> bool {
        let Some(ref mut detail) = self.detail else {
            return false;
        };
        if !detail.settle(id, result) {
            return false;
        }

        match (&detail.data, &detail.error) {
            (Some(template), _) => match TemplateManifest::from_template(template).to_yaml() {
                Ok(text) => {
                    self.manifest = text;
                    self.error = None;
                    self.scroll = 0;
                }
                Err(e) => self.error = Some(ApiError::Unexpected(e.to_string())),
            },
            (None, Some(err)) => self.error = Some(err.clone()),
            (None, None) => {}
        }
        true
    }

    /// Stop caring about an outstanding fetch, e.g. on close
    pub fn abandon(&mut self) {
        if let Some(ref mut detail) = self.detail {
            detail.abandon();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submit
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate the manifest and build the request to send
    ///
    /// Returns `None` when nothing should be sent; a validation failure is
    /// kept in `error` for display.
    pub fn prepare_submit(&mut self) -> Option<ApiRequest> {
        if self.phase() != ModalPhase::Ready {
            return None;
        }
        if let Err(err) = TemplateManifest::parse(&self.manifest, self.target_name()) {
            self.error = Some(err);
            return None;
        }

        let manifest = self.manifest.clone();
        Some(match self.variant {
            ModalVariant::Create => ApiRequest::CreateTemplate { manifest },
            ModalVariant::Edit { .. } => ApiRequest::UpdateTemplate { manifest },
        })
    }

    pub fn begin_submit(&mut self, id: RequestId) {
        self.submit.begin(id);
        self.error = None;
    }

    pub fn awaits_submit(&self, id: RequestId) -> bool {
        self.submit.awaits(id)
    }

    /// Settle the submit request; returns `false` if it was stale
    pub fn settle_submit(&mut self, id: RequestId, result: &Result<ApiResponse, ApiError>) -> bool {
        if !self.submit.settle(id, result) {
            return false;
        }
        self.error = self.submit.error.clone();
        true
    }

    /// Replace the manifest with text from the editor
    pub fn set_manifest(&mut self, text: String) {
        self.manifest = text;
        self.error = None;
        self.scroll = 0;
    }

    fn line_count(&self) -> usize {
        self.manifest.lines().count()
    }
}

impl Component for TemplateModal {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let phase = self.phase();
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ModalScrollDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ModalScrollUp),
            KeyCode::Char('e') if phase == ModalPhase::Ready => Some(Action::OpenEditor),
            KeyCode::Char('s') | KeyCode::Enter if phase == ModalPhase::Ready => {
                Some(Action::SubmitModal)
            }
            KeyCode::Char('r') if phase == ModalPhase::LoadFailed => {
                self.target_name().map(|name| Action::FetchTemplate(name.to_string()))
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::ModalScrollDown => {
                let max = self.line_count().saturating_sub(1) as u16;
                self.scroll = self.scroll.saturating_add(1).min(max);
            }
            Action::ModalScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::ManifestEdited(text) => self.set_manifest(text),
            Action::EditorFailed(err) => {
                self.error = Some(ApiError::Unexpected(format!("editor failed: {}", err)));
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup_percent(area, 80, 80);
        frame.render_widget(Clear, popup_area);

        let phase = self.phase();
        let border_color = if self.error.is_some() {
            Color::Red
        } else {
            Color::Cyan
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(format!(" {} ", self.title()))
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(2),
                Constraint::Length(1),
            ])
            .split(inner);

        match phase {
            ModalPhase::Loading => {
                let text = Paragraph::new(Span::styled(
                    "Loading template...",
                    Style::default().fg(Color::Yellow),
                ));
                frame.render_widget(text, chunks[0]);
            }
            ModalPhase::LoadFailed => {
                let text = Paragraph::new(vec![
                    Line::from(Span::styled(
                        "Could not load the template.",
                        Style::default().fg(Color::Red),
                    )),
                    Line::from(Span::styled(
                        "Press r to retry",
                        Style::default().fg(Color::DarkGray),
                    )),
                ]);
                frame.render_widget(text, chunks[0]);
            }
            ModalPhase::Ready | ModalPhase::Submitting => self.render_manifest(frame, chunks[0]),
        }

        if let Some(ref err) = self.error {
            let error = Paragraph::new(Span::styled(
                err.to_string(),
                Style::default().fg(Color::Red),
            ))
            .wrap(Wrap { trim: true });
            frame.render_widget(error, chunks[1]);
        }

        frame.render_widget(Paragraph::new(help_line(phase)), chunks[2]);
        Ok(())
    }
}

impl TemplateModal {
    fn render_manifest(&mut self, frame: &mut Frame, area: Rect) {
        let total = self.line_count();
        let gutter = total.max(1).to_string().len();

        let lines: Vec<Line> = self
            .manifest
            .lines()
            .enumerate()
            .map(|(i, line)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>width$} ", i + 1, width = gutter),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(line.to_string()),
                ])
            })
            .collect();

        let visible = area.height as usize;
        let max_scroll = total.saturating_sub(visible) as u16;
        if self.scroll > max_scroll {
            self.scroll = max_scroll;
        }

        frame.render_widget(Paragraph::new(lines).scroll((self.scroll, 0)), area);

        if total > visible {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible)).position(self.scroll as usize);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area,
                &mut scrollbar_state,
            );
        }
    }
}

fn help_line(phase: ModalPhase) -> Line<'static> {
    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    match phase {
        ModalPhase::Submitting => Line::from(Span::styled(
            " ⏳ Saving...",
            Style::default().fg(Color::Yellow),
        )),
        ModalPhase::Ready => Line::from(vec![
            key(" e ", Color::Cyan),
            Span::raw("Edit in $EDITOR "),
            key(" Enter/s ", Color::Green),
            Span::raw("Save "),
            key(" j/k ", Color::Cyan),
            Span::raw("Scroll "),
            key(" Esc ", Color::Red),
            Span::raw("Close"),
        ]),
        ModalPhase::LoadFailed => Line::from(vec![
            key(" r ", Color::Magenta),
            Span::raw("Retry "),
            key(" Esc ", Color::Red),
            Span::raw("Close"),
        ]),
        ModalPhase::Loading => Line::from(vec![key(" Esc ", Color::Red), Span::raw("Close")]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectMeta, Time};
    use crossterm::event::KeyModifiers;

    fn template(name: &str) -> ClusterAnalysisTemplate {
        ClusterAnalysisTemplate {
            metadata: Some(ObjectMeta {
                name: Some(name.to_string()),
                creation_timestamp: Some(Time {
                    seconds: 1_704_164_645,
                    nanos: 0,
                }),
                ..ObjectMeta::default()
            }),
            spec: serde_json::json!({ "metrics": [{ "name": "m" }] }),
        }
    }

    #[test]
    fn test_create_starts_ready_with_skeleton() {
        let modal = TemplateModal::create();
        assert_eq!(modal.phase(), ModalPhase::Ready);
        assert!(modal.manifest.contains("kind: ClusterAnalysisTemplate"));
        assert_eq!(modal.mount(), None);
    }

    #[test]
    fn test_edit_loads_by_name_only() {
        let mut modal = TemplateModal::edit("tmpl-a");
        assert_eq!(modal.mount(), Some(Action::FetchTemplate("tmpl-a".to_string())));
        assert_eq!(modal.phase(), ModalPhase::Loading);

        modal.begin_fetch(3);
        assert!(modal.awaits_fetch(3));
        assert!(modal.apply_detail(3, Ok(template("tmpl-a"))));
        assert_eq!(modal.phase(), ModalPhase::Ready);
        assert!(modal.manifest.contains("name: tmpl-a"));
        assert!(!modal.manifest.contains("creationTimestamp"));
    }

    #[test]
    fn test_edit_load_failure_offers_retry() {
        let mut modal = TemplateModal::edit("gone");
        modal.begin_fetch(1);
        modal.apply_detail(1, Err(ApiError::NotFound("gone".to_string())));
        assert_eq!(modal.phase(), ModalPhase::LoadFailed);

        let retry = modal
            .handle_key_event(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(retry, Some(Action::FetchTemplate("gone".to_string())));
    }

    #[test]
    fn test_abandoned_fetch_is_ignored() {
        let mut modal = TemplateModal::edit("tmpl-a");
        modal.begin_fetch(9);
        modal.abandon();
        assert!(!modal.apply_detail(9, Ok(template("tmpl-a"))));
        assert!(modal.manifest.is_empty());
    }

    #[test]
    fn test_invalid_manifest_is_not_submitted() {
        let mut modal = TemplateModal::create();
        modal.set_manifest("kind: [unclosed".to_string());
        assert_eq!(modal.prepare_submit(), None);
        assert!(matches!(modal.error, Some(ApiError::Validation(_))));
    }

    #[test]
    fn test_edit_cannot_rename() {
        let mut modal = TemplateModal::edit("tmpl-a");
        modal.begin_fetch(1);
        modal.apply_detail(1, Ok(template("tmpl-a")));
        let renamed = modal.manifest.replace("tmpl-a", "tmpl-b");
        modal.set_manifest(renamed);

        assert_eq!(modal.prepare_submit(), None);
        assert!(modal.error.is_some());
    }

    #[test]
    fn test_submit_lifecycle() {
        let mut modal = TemplateModal::edit("tmpl-a");
        modal.begin_fetch(1);
        modal.apply_detail(1, Ok(template("tmpl-a")));

        let request = modal.prepare_submit().unwrap();
        assert!(matches!(request, ApiRequest::UpdateTemplate { .. }));

        modal.begin_submit(2);
        assert_eq!(modal.phase(), ModalPhase::Submitting);
        assert_eq!(modal.prepare_submit(), None);

        let failed = Err(ApiError::Permission("denied".to_string()));
        assert!(modal.settle_submit(2, &failed));
        assert_eq!(modal.phase(), ModalPhase::Ready);
        assert!(matches!(modal.error, Some(ApiError::Permission(_))));
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut modal = TemplateModal::create();
        modal.set_manifest("a: 1\nb: 2".to_string());
        for _ in 0..5 {
            modal.update(Action::ModalScrollDown).unwrap();
        }
        assert_eq!(modal.scroll, 1);
        modal.update(Action::ModalScrollUp).unwrap();
        modal.update(Action::ModalScrollUp).unwrap();
        assert_eq!(modal.scroll, 0);
    }
}

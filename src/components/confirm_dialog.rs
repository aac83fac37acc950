//! Confirmation dialog component
//!
//! Renders whatever `ConfirmRequest` is open in the App's confirm host.
//! The dialog itself is stateless; it only maps keys to accept/cancel.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::ConfirmRequest;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Default)]
pub struct ConfirmDialog;

impl Component for ConfirmDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Action::ConfirmAccept),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::ConfirmCancel),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // The request lives in the App, see draw_request
        Ok(())
    }
}

pub fn draw_request(frame: &mut Frame, area: Rect, request: &ConfirmRequest) {
    let accent = if request.destructive {
        Color::Red
    } else {
        Color::Yellow
    };
    let (confirm_label, cancel_label) = if request.destructive {
        ("Yes, delete  ", "Cancel")
    } else {
        ("Yes  ", "No, cancel")
    };

    let body = Line::from(vec![
        Span::raw(request.body.prefix.clone()),
        Span::styled(
            request.body.subject.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(request.body.suffix.clone()),
    ]);

    let body_width = (body.width() as u16).saturating_add(6);
    let width = body_width.clamp(40, area.width.saturating_sub(4).max(40));
    let popup_area = centered_popup(area, width, 8);

    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        body,
        Line::from(""),
        Line::from(vec![
            Span::styled(
                " y ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(confirm_label),
            Span::styled(
                " n/Esc ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(cancel_label),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(format!(" {} ", request.title))
                .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_keys_map_to_accept_and_cancel() {
        let mut dialog = ConfirmDialog;
        let press = |dialog: &mut ConfirmDialog, code| {
            dialog
                .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
                .unwrap()
        };

        assert_eq!(press(&mut dialog, KeyCode::Char('y')), Some(Action::ConfirmAccept));
        assert_eq!(press(&mut dialog, KeyCode::Enter), Some(Action::ConfirmAccept));
        assert_eq!(press(&mut dialog, KeyCode::Esc), Some(Action::ConfirmCancel));
        assert_eq!(press(&mut dialog, KeyCode::Char('d')), None);
    }
}

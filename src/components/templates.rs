//! Templates screen - the cluster analysis template list
//!
//! Card title with the "Add Template" action, the template table with
//! per-row Edit/Delete buttons and expandable descriptions, client-side
//! pagination, a status line and the help bar. Owns selection, page and
//! expansion state; the data itself comes from the App.

use crate::action::Action;
use crate::component::Component;
use crate::components::calculate_screen_layout;
use crate::error::ApiError;
use crate::model::{Notification, Pagination, RowAction, TemplateRow, TimeDisplay};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use std::collections::HashSet;
use unicode_width::UnicodeWidthStr;

const TITLE: &str = "Cluster Analysis Templates";
const ADD_BUTTON: &str = "[a] Add Template";

// ═══════════════════════════════════════════════════════════════════════════════
// Screen Component
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TemplatesScreen {
    /// Highlight state of the rendered page
    pub table_state: TableState,

    /// Selected row, as an index into the full collection
    pub selected: Option<usize>,

    pub pagination: Pagination,

    /// Keys of rows whose description is expanded
    pub expanded: HashSet<String>,

    pub time_display: TimeDisplay,
}

impl TemplatesScreen {
    pub fn new(page_size: usize, time_display: TimeDisplay) -> Self {
        Self {
            table_state: TableState::default(),
            selected: None,
            pagination: Pagination::new(page_size),
            expanded: HashSet::new(),
            time_display,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-anchor selection, page and expansion after new data arrived
    pub fn sync(&mut self, rows: &[TemplateRow]) {
        let total = rows.len();
        self.selected = if total == 0 {
            None
        } else {
            Some(self.selected.unwrap_or(0).min(total - 1))
        };
        match self.selected {
            Some(index) => self.select(index),
            None => self.pagination.clamp(total),
        }
        self.expanded
            .retain(|key| rows.iter().any(|row| &row.key == key && row.is_expandable()));
    }

    fn select(&mut self, index: usize) {
        self.selected = Some(index);
        self.pagination.page = index / self.pagination.page_size;
    }

    pub fn next(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        let next = match self.selected {
            Some(i) => (i + 1) % total,
            None => 0,
        };
        self.select(next);
    }

    pub fn previous(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        let prev = match self.selected {
            Some(0) | None => total - 1,
            Some(i) => i - 1,
        };
        self.select(prev);
    }

    pub fn select_first(&mut self, total: usize) {
        if total > 0 {
            self.select(0);
        }
    }

    pub fn select_last(&mut self, total: usize) {
        if total > 0 {
            self.select(total - 1);
        }
    }

    pub fn next_page(&mut self, total: usize) {
        self.pagination.next(total);
        let start = self.pagination.range(total).start;
        if start < total {
            self.select(start);
        }
    }

    pub fn prev_page(&mut self, total: usize) {
        self.pagination.prev();
        let start = self.pagination.range(total).start;
        if start < total {
            self.select(start);
        }
    }

    pub fn selected_row<'a>(&self, rows: &'a [TemplateRow]) -> Option<&'a TemplateRow> {
        rows.get(self.selected?)
    }

    /// Rows on the current page
    pub fn visible_rows<'a>(&self, rows: &'a [TemplateRow]) -> &'a [TemplateRow] {
        &rows[self.pagination.range(rows.len())]
    }

    pub fn toggle_expand(&mut self, rows: &[TemplateRow]) {
        let Some(row) = self.selected_row(rows) else {
            return;
        };
        if !row.is_expandable() {
            return;
        }
        if !self.expanded.remove(&row.key) {
            self.expanded.insert(row.key.clone());
        }
    }

    pub fn is_expanded(&self, row: &TemplateRow) -> bool {
        row.is_expandable() && self.expanded.contains(&row.key)
    }
}

impl Component for TemplatesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextRow),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevRow),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstRow),
            KeyCode::Char('G') | KeyCode::End => Some(Action::LastRow),
            KeyCode::Char(']') | KeyCode::PageDown => Some(Action::NextPage),
            KeyCode::Char('[') | KeyCode::PageUp => Some(Action::PrevPage),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::ToggleExpand),

            // Actions
            KeyCode::Char('a') => Some(Action::OpenCreateModal),
            KeyCode::Char('e') => Some(Action::EditSelected),
            KeyCode::Char('d') | KeyCode::Delete => Some(Action::DeleteSelected),
            KeyCode::Char('r') => Some(Action::Refetch),

            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            KeyCode::Esc => Some(Action::DismissNotification),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Drawing needs the App's data, see draw_templates_screen
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Data needed for rendering the screen
pub struct ScreenContext<'a> {
    pub rows: &'a [TemplateRow],
    /// A list fetch is in flight
    pub is_loading: bool,
    /// At least one fetch has succeeded
    pub has_data: bool,
    pub load_error: Option<&'a ApiError>,
    /// The delete mutation is pending
    pub is_deleting: bool,
    pub notification: Option<&'a Notification>,
}

pub fn draw_templates_screen(
    frame: &mut Frame,
    area: Rect,
    screen: &mut TemplatesScreen,
    ctx: &ScreenContext,
) -> Result<()> {
    let show_pagination = !screen.pagination.is_hidden(ctx.rows.len());
    let layout = calculate_screen_layout(area, show_pagination);

    render_title(frame, layout.title, ctx);
    render_table(frame, layout.table, screen, ctx);
    if let Some(pagination_area) = layout.pagination {
        render_pagination(frame, pagination_area, screen, ctx.rows.len());
    }
    render_status_bar(frame, layout.status, ctx);
    render_help_bar(frame, layout.help);

    Ok(())
}

fn render_title(frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
    let left = format!(" {} ", TITLE);
    let right = format!("{} ", ADD_BUTTON);
    let indicator = if ctx.is_loading { " ⟳" } else { "" };
    let used = left.width() + indicator.width() + right.width();
    let padding = (area.width as usize).saturating_sub(used);

    let line = Line::from(vec![
        Span::styled(
            left,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(indicator, Style::default().fg(Color::Yellow)),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(Color::Green)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_table(frame: &mut Frame, area: Rect, screen: &mut TemplatesScreen, ctx: &ScreenContext) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Templates ({}) ", ctx.rows.len()));

    // Nothing to show yet: loading, failed, or empty
    if ctx.rows.is_empty() {
        let message = if let Some(err) = ctx.load_error {
            Text::from(vec![
                Line::from(Span::styled(
                    format!("Failed to load templates: {}", err),
                    Style::default().fg(Color::Red),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        } else if ctx.is_loading || !ctx.has_data {
            Text::from(Span::styled(
                "Loading templates...",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Text::from(Span::styled(
                "No cluster analysis templates",
                Style::default().fg(Color::DarkGray),
            ))
        };

        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Creation Date"),
        Cell::from("Name"),
        Cell::from(""),
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(1);

    let rows: Vec<Row> = screen
        .visible_rows(ctx.rows)
        .iter()
        .map(|row| build_table_row(row, screen.is_expanded(row), ctx.is_deleting))
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Length(24),
        Constraint::Min(16),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    let page_start = screen.pagination.range(ctx.rows.len()).start;
    let highlighted = screen
        .selected
        .and_then(|index| index.checked_sub(page_start));
    screen.table_state.select(highlighted);

    frame.render_stateful_widget(table, area, &mut screen.table_state);
}

fn build_table_row(row: &TemplateRow, expanded: bool, is_deleting: bool) -> Row<'static> {
    let marker = match (row.is_expandable(), expanded) {
        (false, _) => " ",
        (true, false) => "▸",
        (true, true) => "▾",
    };

    let mut name_lines = vec![Line::from(row.name.clone())];
    if expanded {
        if let Some(ref description) = row.description {
            for line in description.lines() {
                name_lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default()
                        .fg(Color::Gray)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }
    let height = name_lines.len() as u16;

    let delete_label = if is_deleting {
        format!("⏳{}", RowAction::Delete.label())
    } else {
        RowAction::Delete.label().to_string()
    };
    let delete_style = if is_deleting {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Red)
    };

    let actions = Line::from(vec![
        Span::styled(
            format!("[e] {}", RowAction::Edit.label()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(format!("[d] {}", delete_label), delete_style),
    ]);

    Row::new(vec![
        Cell::from(Span::styled(marker, Style::default().fg(Color::Yellow))),
        Cell::from(row.creation_date.clone()),
        Cell::from(Text::from(name_lines)),
        Cell::from(actions),
    ])
    .height(height)
}

fn render_pagination(frame: &mut Frame, area: Rect, screen: &TemplatesScreen, total: usize) {
    let range = screen.pagination.range(total);
    let line = Line::from(vec![
        Span::styled(" [ ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("Prev  "),
        Span::styled(
            format!(
                "Page {}/{}",
                screen.pagination.page + 1,
                screen.pagination.page_count(total)
            ),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({}-{} of {})", range.start + 1, range.end, total),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  Next"),
        Span::styled(" ] ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
    let mut spans = vec![];

    if let Some(note) = ctx.notification {
        let style = if note.is_error() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        spans.push(Span::styled(format!(" {} ", note.message), style));
    } else if let (Some(err), false) = (ctx.load_error, ctx.rows.is_empty()) {
        // Stale data is still shown; say so
        spans.push(Span::styled(
            format!(" Refresh failed: {} ", err),
            Style::default().fg(Color::Red),
        ));
    } else if ctx.is_deleting {
        spans.push(Span::styled(" Deleting... ", Style::default().fg(Color::Yellow)));
    } else if ctx.is_loading && ctx.has_data {
        spans.push(Span::styled(" Refreshing... ", Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_bar(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    let help_spans = vec![
        key(" q ", Color::Yellow),
        Span::raw("Quit "),
        key(" a ", Color::Green),
        Span::raw("Add "),
        key(" e ", Color::Cyan),
        Span::raw("Edit "),
        key(" d ", Color::Red),
        Span::raw("Delete "),
        key(" Enter ", Color::Cyan),
        Span::raw("Expand "),
        key(" r ", Color::Magenta),
        Span::raw("Refresh "),
        key(" ? ", Color::White),
        Span::raw("Help"),
    ];

    frame.render_widget(Paragraph::new(Line::from(help_spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, description: Option<&str>) -> TemplateRow {
        TemplateRow {
            key: key.to_string(),
            creation_date: String::new(),
            name: key.to_string(),
            description: description.map(str::to_string),
        }
    }

    fn rows(n: usize) -> Vec<TemplateRow> {
        (0..n).map(|i| row(&format!("t{}", i), None)).collect()
    }

    #[test]
    fn test_sync_selects_first_and_clears_on_empty() {
        let mut screen = TemplatesScreen::new(10, TimeDisplay::Utc);
        screen.sync(&rows(3));
        assert_eq!(screen.selected, Some(0));

        screen.select_last(3);
        screen.sync(&rows(2));
        assert_eq!(screen.selected, Some(1));

        screen.sync(&[]);
        assert_eq!(screen.selected, None);
    }

    #[test]
    fn test_navigation_wraps_and_follows_pages() {
        let mut screen = TemplatesScreen::new(2, TimeDisplay::Utc);
        let data = rows(5);
        screen.sync(&data);

        screen.next(5);
        screen.next(5);
        assert_eq!(screen.selected, Some(2));
        assert_eq!(screen.pagination.page, 1);
        assert_eq!(screen.visible_rows(&data)[0].key, "t2");

        screen.previous(5);
        screen.previous(5);
        screen.previous(5);
        assert_eq!(screen.selected, Some(4));
        assert_eq!(screen.pagination.page, 2);
    }

    #[test]
    fn test_page_keys_move_selection() {
        let mut screen = TemplatesScreen::new(2, TimeDisplay::Utc);
        screen.sync(&rows(3));

        screen.next_page(3);
        assert_eq!(screen.selected, Some(2));
        screen.next_page(3);
        assert_eq!(screen.selected, Some(2));
        screen.prev_page(3);
        assert_eq!(screen.selected, Some(0));
    }

    #[test]
    fn test_expand_only_rows_with_description() {
        let mut screen = TemplatesScreen::new(10, TimeDisplay::Utc);
        let data = vec![row("plain", None), row("doc", Some("explains things"))];
        screen.sync(&data);

        screen.toggle_expand(&data);
        assert!(screen.expanded.is_empty());

        screen.next(2);
        screen.toggle_expand(&data);
        assert!(screen.is_expanded(&data[1]));
        screen.toggle_expand(&data);
        assert!(!screen.is_expanded(&data[1]));
    }

    #[test]
    fn test_sync_forgets_vanished_expansions() {
        let mut screen = TemplatesScreen::new(10, TimeDisplay::Utc);
        let data = vec![row("doc", Some("d"))];
        screen.sync(&data);
        screen.toggle_expand(&data);
        assert_eq!(screen.expanded.len(), 1);

        screen.sync(&[]);
        assert!(screen.expanded.is_empty());
    }

    #[test]
    fn test_key_bindings() {
        use crossterm::event::KeyModifiers;
        let mut screen = TemplatesScreen::new(10, TimeDisplay::Utc);
        let press = |screen: &mut TemplatesScreen, code| {
            screen
                .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
                .unwrap()
        };

        assert_eq!(press(&mut screen, KeyCode::Char('a')), Some(Action::OpenCreateModal));
        assert_eq!(press(&mut screen, KeyCode::Char('e')), Some(Action::EditSelected));
        assert_eq!(press(&mut screen, KeyCode::Delete), Some(Action::DeleteSelected));
        assert_eq!(press(&mut screen, KeyCode::Char('r')), Some(Action::Refetch));
        assert_eq!(press(&mut screen, KeyCode::Char('x')), None);
    }
}

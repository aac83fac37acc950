//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen layout areas
pub struct ScreenLayout {
    pub title: Rect,
    pub table: Rect,
    pub pagination: Option<Rect>,
    pub status: Rect,
    pub help: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Popup sized as a percentage of the available area
pub fn centered_popup_percent(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width.saturating_mul(percent_x.min(100)) / 100;
    let height = area.height.saturating_mul(percent_y.min(100)) / 100;
    centered_popup(area, width, height)
}

/// Calculate the list screen layout
///
/// The pagination row only exists when pagination controls are shown.
pub fn calculate_screen_layout(area: Rect, show_pagination: bool) -> ScreenLayout {
    let mut constraints = vec![Constraint::Length(1), Constraint::Min(3)];
    if show_pagination {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let (pagination, status, help) = if show_pagination {
        (Some(chunks[2]), chunks[3], chunks[4])
    } else {
        (None, chunks[2], chunks[3])
    };

    ScreenLayout {
        title: chunks[0],
        table: chunks[1],
        pagination,
        status,
        help,
    }
}

//! Table projection for the template list
//!
//! Rows are a pure function of the fetched collection. Each column is a
//! projection of a single template; the actions column is resolved from the
//! row itself so the dispatched action always targets the row it was drawn for.

use super::template::{ClusterAnalysisTemplate, Time};
use crate::action::Action;
use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

/// Timezone used for the creation date column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeDisplay {
    #[default]
    Utc,
    Local,
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRow {
    pub key: String,
    pub creation_date: String,
    pub name: String,
    pub description: Option<String>,
}

impl TemplateRow {
    pub fn is_expandable(&self) -> bool {
        self.description.is_some()
    }
}

/// Per-row buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
        }
    }

    /// Action dispatched when the button is pressed on `row`
    pub fn dispatch(&self, row: &TemplateRow) -> Action {
        match self {
            RowAction::Edit => Action::OpenEditModal(row.key.clone()),
            RowAction::Delete => Action::RequestDelete(row.key.clone()),
        }
    }
}

/// Row key: the template name, or an empty string when absent
pub fn row_key(template: &ClusterAnalysisTemplate) -> String {
    template.name().unwrap_or_default().to_string()
}

pub fn name_column(template: &ClusterAnalysisTemplate) -> String {
    template.name().unwrap_or_default().to_string()
}

pub fn creation_date_column(template: &ClusterAnalysisTemplate, display: TimeDisplay) -> String {
    template
        .creation_timestamp()
        .and_then(|t| format_timestamp(t, display))
        .unwrap_or_default()
}

/// Format as `MMM do yyyy HH:mm:ss`, e.g. `Jan 02nd 2024 03:04:05`
pub fn format_timestamp(time: Time, display: TimeDisplay) -> Option<String> {
    let utc = time.to_datetime()?;
    Some(match display {
        TimeDisplay::Utc => format_datetime(&utc),
        TimeDisplay::Local => format_datetime(&utc.with_timezone(&Local)),
    })
}

fn format_datetime<Tz: chrono::TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let day = dt.day();
    format!(
        "{} {:02}{} {}",
        dt.format("%b"),
        day,
        ordinal_suffix(day),
        dt.format("%Y %H:%M:%S")
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Project the collection into rows, preserving server order
pub fn build_rows(items: &[ClusterAnalysisTemplate], display: TimeDisplay) -> Vec<TemplateRow> {
    let rows: Vec<TemplateRow> = items
        .iter()
        .map(|template| TemplateRow {
            key: row_key(template),
            creation_date: creation_date_column(template, display),
            name: name_column(template),
            description: template.description().map(str::to_string),
        })
        .collect();

    let mut seen = HashSet::new();
    for row in &rows {
        if !seen.insert(row.key.as_str()) {
            tracing::warn!(key = %row.key, "duplicate row key in template list");
        }
    }

    rows
}

/// Client-side pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Controls are hidden when everything fits on one page
    pub fn is_hidden(&self, total: usize) -> bool {
        total <= self.page_size
    }

    /// Keep the current page inside the collection after it changed size
    pub fn clamp(&mut self, total: usize) {
        self.page = self.page.min(self.page_count(total) - 1);
    }

    pub fn next(&mut self, total: usize) {
        if self.page + 1 < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Index range of rows on the current page
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::{ObjectMeta, DESCRIPTION_ANNOTATION};
    use chrono::{TimeZone, Utc};

    fn template(name: Option<&str>, created: Option<DateTime<Utc>>) -> ClusterAnalysisTemplate {
        ClusterAnalysisTemplate {
            metadata: Some(ObjectMeta {
                name: name.map(str::to_string),
                creation_timestamp: created.map(Time::from_datetime),
                ..Default::default()
            }),
            spec: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_single_row_scenario() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let rows = build_rows(&[template(Some("tmpl-a"), Some(created))], TimeDisplay::Utc);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].creation_date, "Jan 02nd 2024 03:04:05");
        assert_eq!(rows[0].name, "tmpl-a");
        assert_eq!(rows[0].key, "tmpl-a");
    }

    #[test]
    fn test_row_count_and_keys_follow_collection() {
        let items = vec![
            template(Some("b"), None),
            template(None, None),
            template(Some("a"), None),
        ];
        let rows = build_rows(&items, TimeDisplay::Utc);

        assert_eq!(rows.len(), items.len());
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "", "a"]);
        assert_eq!(rows[1].creation_date, "");
    }

    #[test]
    fn test_empty_collection() {
        assert!(build_rows(&[], TimeDisplay::Utc).is_empty());
        assert!(Pagination::new(10).is_hidden(0));
    }

    #[test]
    fn test_ordinal_suffixes() {
        let cases = [
            (1, "01st"),
            (3, "03rd"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
            (31, "31st"),
        ];
        for (day, expected) in cases {
            let dt = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
            let formatted = format_timestamp(Time::from_datetime(dt), TimeDisplay::Utc).unwrap();
            assert_eq!(formatted, format!("Jan {} 2024 00:00:00", expected));
        }
    }

    #[test]
    fn test_description_makes_row_expandable() {
        let mut item = template(Some("a"), None);
        item.metadata
            .as_mut()
            .unwrap()
            .annotations
            .insert(DESCRIPTION_ANNOTATION.to_string(), "checks latency".to_string());

        let rows = build_rows(&[item, template(Some("b"), None)], TimeDisplay::Utc);
        assert!(rows[0].is_expandable());
        assert_eq!(rows[0].description.as_deref(), Some("checks latency"));
        assert!(!rows[1].is_expandable());
    }

    #[test]
    fn test_row_actions_capture_row_identity() {
        let rows = build_rows(
            &[template(Some("x"), None), template(Some("y"), None)],
            TimeDisplay::Utc,
        );
        assert_eq!(
            RowAction::Edit.dispatch(&rows[1]),
            Action::OpenEditModal("y".to_string())
        );
        assert_eq!(
            RowAction::Delete.dispatch(&rows[0]),
            Action::RequestDelete("x".to_string())
        );
    }

    #[test]
    fn test_pagination() {
        let mut pagination = Pagination::new(10);
        assert!(pagination.is_hidden(10));
        assert!(!pagination.is_hidden(11));
        assert_eq!(pagination.page_count(11), 2);
        assert_eq!(pagination.range(11), 0..10);

        pagination.next(11);
        assert_eq!(pagination.range(11), 10..11);
        pagination.next(11);
        assert_eq!(pagination.page, 1);

        pagination.clamp(5);
        assert_eq!(pagination.page, 0);
        pagination.prev();
        assert_eq!(pagination.page, 0);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let pagination = Pagination::new(0);
        assert_eq!(pagination.page_size, 1);
    }
}

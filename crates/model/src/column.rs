//! Column descriptors
//!
//! A column names a flattened field to read (`accessor`), how to render
//! it, and optionally the field to sort by when its header is clicked.

use crate::row::FlatRow;
use chrono::{DateTime, NaiveDateTime, Utc};
use heck::ToTitleCase;

// ============================================================================
// CellRenderer
// ============================================================================

/// How a column turns a cell into display text
#[derive(Debug, Clone, Copy, Default)]
pub enum CellRenderer {
    /// The cell's text form
    #[default]
    Text,
    /// `Active` / `Inactive`
    Status,
    /// `Yes` / `No`
    Boolean,
    /// Timestamps as `YYYY-MM-DD HH:MM` (UTC); unparsable text is shown raw
    DateTime,
    /// Arbitrary rendering from the whole row
    Custom(fn(&FlatRow) -> String),
}

impl CellRenderer {
    /// Render the cell at `accessor`
    pub fn render(&self, row: &FlatRow, accessor: &str) -> String {
        match self {
            CellRenderer::Text => row.text(accessor),
            CellRenderer::Status => {
                if row.get(accessor).as_bool().unwrap_or(false) {
                    "Active".to_string()
                } else {
                    "Inactive".to_string()
                }
            }
            CellRenderer::Boolean => {
                if row.get(accessor).as_bool().unwrap_or(false) {
                    "Yes".to_string()
                } else {
                    "No".to_string()
                }
            }
            CellRenderer::DateTime => format_timestamp(&row.text(accessor)),
            CellRenderer::Custom(render) => render(row),
        }
    }
}

/// Reformat a backend timestamp for display
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M")
            .to_string();
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return parsed.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    raw.to_string()
}

// ============================================================================
// ColumnDescriptor
// ============================================================================

/// One column of a screen's grid
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Stable id, used by the visible-column preference
    pub id: String,

    /// Header text
    pub title: String,

    /// Flattened field read for display
    pub accessor: String,

    /// Display renderer
    pub renderer: CellRenderer,

    /// Flattened field sorted on when the header is clicked
    pub sort_key: Option<String>,
}

impl ColumnDescriptor {
    /// Create a text column; the title is the title-cased id
    pub fn new(id: impl Into<String>, accessor: impl Into<String>) -> Self {
        let id = id.into();
        let title = id.to_title_case();
        Self {
            id,
            title,
            accessor: accessor.into(),
            renderer: CellRenderer::Text,
            sort_key: None,
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the header text
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the renderer
    pub fn with_renderer(mut self, renderer: CellRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Make the column sortable on its own accessor
    pub fn sortable(mut self) -> Self {
        self.sort_key = Some(self.accessor.clone());
        self
    }

    /// Make the column sortable on a different flattened field
    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self
    }

    /// Whether clicking the header sorts
    pub fn is_sortable(&self) -> bool {
        self.sort_key.is_some()
    }

    /// Render this column's cell for a row
    pub fn render(&self, row: &FlatRow) -> String {
        self.renderer.render(row, &self.accessor)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FlatRow {
        FlatRow::new(Some("1".to_string()), 0)
            .with("name_flat", "Ann")
            .with("is_active_flat", true)
            .with("created_at_flat", "2024-03-05T14:30:00Z")
            .with("state_name_flat", "Texas")
            .with("city_name_flat", "Austin")
    }

    #[test]
    fn test_title_from_id() {
        let col = ColumnDescriptor::new("created_at", "created_at_flat");
        assert_eq!(col.title, "Created At");
        assert!(!col.is_sortable());
        assert_eq!(col.with_title("Joined").title, "Joined");
    }

    #[test]
    fn test_sortable_builders() {
        let col = ColumnDescriptor::new("name", "name_flat").sortable();
        assert_eq!(col.sort_key.as_deref(), Some("name_flat"));

        let col = ColumnDescriptor::new("state", "state_name_flat").sort_by("state_id_flat");
        assert_eq!(col.sort_key.as_deref(), Some("state_id_flat"));
    }

    #[test]
    fn test_renderers() {
        let row = row();
        let status = ColumnDescriptor::new("status", "is_active_flat").with_renderer(CellRenderer::Status);
        assert_eq!(status.render(&row), "Active");

        let missing = ColumnDescriptor::new("flag", "missing_flat").with_renderer(CellRenderer::Boolean);
        assert_eq!(missing.render(&row), "No");

        let created = ColumnDescriptor::new("created_at", "created_at_flat").with_renderer(CellRenderer::DateTime);
        assert_eq!(created.render(&row), "2024-03-05 14:30");

        let location = ColumnDescriptor::new("location", "city_name_flat").with_renderer(
            CellRenderer::Custom(|r| format!("{}, {}", r.text("city_name_flat"), r.text("state_name_flat"))),
        );
        assert_eq!(location.render(&row), "Austin, Texas");
    }

    #[test]
    fn test_format_timestamp_fallbacks() {
        assert_eq!(format_timestamp("2024-03-05 14:30:59"), "2024-03-05 14:30");
        assert_eq!(format_timestamp("2024-03-05T16:30:00+02:00"), "2024-03-05 14:30");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(format_timestamp(""), "");
    }
}

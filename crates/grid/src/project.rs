//! Column projection stage
//!
//! A screen's [`ColumnSet`] is narrowed to the user's visible-column set
//! when one is loaded and non-empty. Projection happens after row
//! selection and never affects which rows are shown.

use crate::sort::SortSpec;
use roster_core::{RosterError, RosterResult, SortDirection};
use roster_model::{ColumnDescriptor, FlatRow};
use serde::Serialize;

/// The ordered columns a screen can show
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    pub fn all(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns to render, in descriptor order
    ///
    /// `None` or an empty set shows every column.
    pub fn visible(&self, visible_ids: Option<&[String]>) -> Vec<&ColumnDescriptor> {
        match visible_ids {
            Some(ids) if !ids.is_empty() => self
                .columns
                .iter()
                .filter(|c| ids.iter().any(|id| id == &c.id))
                .collect(),
            _ => self.columns.iter().collect(),
        }
    }

    /// Check that every id names a column of this set
    pub fn check_ids(&self, screen: &str, ids: &[String]) -> RosterResult<()> {
        match ids.iter().find(|id| self.get(id).is_none()) {
            Some(unknown) => Err(RosterError::ColumnNotFound {
                screen: screen.to_string(),
                column: unknown.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// A rendered column header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub id: String,
    pub title: String,
    /// Flattened field sorted on when clicked
    pub sort_key: Option<String>,
    /// Direction shown when this column is the active sort
    pub sorted: Option<SortDirection>,
}

impl HeaderCell {
    /// Title followed by the sort indicator, if any
    pub fn label(&self) -> String {
        match self.sorted {
            Some(direction) => format!("{} {}", self.title, direction.indicator()),
            None => self.title.clone(),
        }
    }
}

/// A rendered row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    pub id: Option<String>,
    pub cells: Vec<String>,
}

/// Build the headers for the projected columns
pub fn headers(columns: &[&ColumnDescriptor], sort: Option<&SortSpec>) -> Vec<HeaderCell> {
    columns
        .iter()
        .map(|column| HeaderCell {
            id: column.id.clone(),
            title: column.title.clone(),
            sort_key: column.sort_key.clone(),
            sorted: match (sort, column.sort_key.as_deref()) {
                (Some(spec), Some(key)) => spec.indicator_for(key),
                _ => None,
            },
        })
        .collect()
}

/// Render rows through the projected columns
pub fn render_rows<'a, I>(columns: &[&ColumnDescriptor], rows: I) -> Vec<RenderedRow>
where
    I: IntoIterator<Item = &'a FlatRow>,
{
    rows.into_iter()
        .map(|row| RenderedRow {
            id: row.id.clone(),
            cells: columns.iter().map(|c| c.render(row)).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten;
    use roster_model::CellRenderer;

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDescriptor::new("name", flatten::NAME).sortable(),
            ColumnDescriptor::new("email", flatten::EMAIL).sortable(),
            ColumnDescriptor::new("status", flatten::IS_ACTIVE).with_renderer(CellRenderer::Status),
        ])
    }

    #[test]
    fn test_visible_none_or_empty_shows_all() {
        let set = columns();
        assert_eq!(set.visible(None).len(), 3);
        assert_eq!(set.visible(Some(&[][..])).len(), 3);
    }

    #[test]
    fn test_visible_keeps_descriptor_order() {
        let set = columns();
        let ids = vec!["status".to_string(), "name".to_string()];
        let visible: Vec<_> = set.visible(Some(ids.as_slice())).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["name", "status"]);
    }

    #[test]
    fn test_check_ids() {
        let set = columns();
        assert!(set.check_ids("users", &["email".to_string()]).is_ok());
        let err = set.check_ids("users", &["salary".to_string()]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_headers_carry_sort_indicator() {
        let set = columns();
        let visible = set.visible(None);
        let sort = SortSpec::descending(flatten::EMAIL);
        let headers = headers(&visible, Some(&sort));
        assert_eq!(headers[0].sorted, None);
        assert_eq!(headers[1].sorted, Some(SortDirection::Descending));
        assert_eq!(headers[1].label(), "Email ▼");
        assert_eq!(headers[2].sort_key, None);
    }

    #[test]
    fn test_render_rows() {
        let set = columns();
        let ids = vec!["name".to_string(), "status".to_string()];
        let visible = set.visible(Some(ids.as_slice()));
        let rows = vec![
            FlatRow::new(Some("1".to_string()), 0)
                .with(flatten::NAME, "Ann")
                .with(flatten::IS_ACTIVE, false),
        ];
        let rendered = render_rows(&visible, &rows);
        assert_eq!(rendered[0].id.as_deref(), Some("1"));
        assert_eq!(rendered[0].cells, vec!["Ann", "Inactive"]);
    }
}

//! CSV export and bulk import
//!
//! Export renders the filtered, sorted list through the visible columns.
//! Import reads a header line plus data lines, checks each row and turns
//! the good ones into create payloads for the backend.

use chrono::NaiveDate;
use regex::Regex;
use roster_core::{Named, RosterError, RosterResult, UserType};
use roster_model::{ColumnDescriptor, FlatRow, ReferenceData};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

// ============================================================================
// Export
// ============================================================================

/// Quote a field when it contains a comma, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render rows as CSV: a header of column titles, then one line per row
pub fn export_csv(columns: &[&ColumnDescriptor], rows: &[&FlatRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|c| escape_field(&c.title))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            columns
                .iter()
                .map(|c| escape_field(&c.render(row)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// `<screen>_export_<YYYY-MM-DD>.csv`
pub fn export_file_name(screen: &str, date: NaiveDate) -> String {
    format!("{}_export_{}.csv", screen, date.format("%Y-%m-%d"))
}

// ============================================================================
// Parsing
// ============================================================================

/// Split one CSV line, honoring quotes
///
/// Commas inside quotes are kept, `""` inside quotes is a literal quote,
/// and every cell is trimmed.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Header names are trimmed, lower-cased and use `_` for spaces
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// One data line of an import file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRow {
    /// 1-based line number in the file
    pub line: usize,
    pub values: BTreeMap<String, String>,
}

impl ImportRow {
    /// A cell by normalized header; missing cells are empty
    pub fn value(&self, header: &str) -> &str {
        self.values.get(header).map(String::as_str).unwrap_or("")
    }
}

/// Split text into CSV records, each with the line it starts on
///
/// Line breaks inside quotes belong to the cell. A `\r` before a record
/// break is dropped.
pub fn split_records(text: &str) -> Vec<(usize, String)> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start = 1;

    for c in text.chars() {
        match c {
            '\n' if !in_quotes => {
                if current.ends_with('\r') {
                    current.pop();
                }
                records.push((start, std::mem::take(&mut current)));
                line += 1;
                start = line;
            }
            '\n' => {
                current.push(c);
                line += 1;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        if current.ends_with('\r') {
            current.pop();
        }
        records.push((start, current));
    }
    records
}

/// Parse an import file into rows keyed by header
///
/// The first non-blank record is the header. Blank records are skipped.
/// Cells beyond the header are dropped; missing cells read as empty. A
/// leading byte-order mark is ignored.
pub fn parse_import(text: &str) -> RosterResult<Vec<ImportRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = split_records(text)
        .into_iter()
        .filter(|(_, record)| !record.trim().is_empty());

    let (_, header_line) = lines
        .next()
        .ok_or_else(|| RosterError::InvalidCsv("file has no header line".to_string()))?;
    let headers: Vec<String> = split_csv_line(&header_line)
        .iter()
        .map(|h| normalize_header(h))
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(RosterError::InvalidCsv("header line is empty".to_string()));
    }

    let rows: Vec<ImportRow> = lines
        .map(|(line, record)| {
            let cells = split_csv_line(&record);
            let values = headers
                .iter()
                .enumerate()
                .filter(|(_, h)| !h.is_empty())
                .map(|(i, h)| (h.clone(), cells.get(i).cloned().unwrap_or_default()))
                .collect();
            ImportRow { line, values }
        })
        .collect();

    tracing::debug!("Parsed {} import rows with headers {:?}", rows.len(), headers);
    Ok(rows)
}

// ============================================================================
// Validation
// ============================================================================

/// A row ready to send as a create request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedRow {
    pub line: usize,
    pub payload: Value,
}

/// A row that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: String,
}

/// Outcome of validating an import file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub accepted: Vec<AcceptedRow>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Rejections as errors, for callers that want `RosterError`
    pub fn errors(&self) -> Vec<RosterError> {
        self.rejected
            .iter()
            .map(|r| RosterError::import_row(r.line, r.reason.clone()))
            .collect()
    }
}

/// Checks import rows for one screen
#[derive(Debug, Clone)]
pub struct ImportValidator<'a> {
    user_type: UserType,
    reference: &'a ReferenceData,
    email: Regex,
}

impl<'a> ImportValidator<'a> {
    pub fn new(user_type: UserType, reference: &'a ReferenceData) -> RosterResult<Self> {
        let email = Regex::new(EMAIL_PATTERN)
            .map_err(|e| RosterError::internal(format!("invalid email pattern: {e}")))?;
        Ok(Self {
            user_type,
            reference,
            email,
        })
    }

    /// Split rows into accepted payloads and rejections
    pub fn validate(&self, rows: &[ImportRow]) -> ImportReport {
        let mut report = ImportReport::default();
        for row in rows {
            match self.payload(row) {
                Ok(payload) => report.accepted.push(AcceptedRow {
                    line: row.line,
                    payload,
                }),
                Err(reason) => report.rejected.push(RejectedRow {
                    line: row.line,
                    reason,
                }),
            }
        }
        if !report.is_clean() {
            tracing::warn!(
                "{} of {} import rows rejected",
                report.rejected.len(),
                report.total()
            );
        }
        report
    }

    fn payload(&self, row: &ImportRow) -> Result<Value, String> {
        let name = row.value("name");
        if name.is_empty() {
            return Err("name is required".to_string());
        }
        let email = row.value("email");
        if email.is_empty() {
            return Err("email is required".to_string());
        }
        if !self.email.is_match(email) {
            return Err(format!("invalid email '{email}'"));
        }

        let state_id = self.resolve_state(row)?;
        let city_id = self.resolve_city(row, state_id.as_deref())?;

        let mut payload = Map::new();
        payload.insert("name".into(), json!(name));
        payload.insert("email".into(), json!(email));
        for field in ["phone", "address", "zip"] {
            let value = row.value(field);
            if !value.is_empty() {
                payload.insert(field.into(), json!(value));
            }
        }
        if let Some(id) = state_id {
            payload.insert("state_id".into(), json!(id));
        }
        if let Some(id) = city_id {
            payload.insert("city_id".into(), json!(id));
        }
        if self.user_type.has_roles() {
            if let Some(id) = self.resolve_role(row)? {
                payload.insert("role_id".into(), json!(id));
            }
        }
        payload.insert("user_type".into(), json!(self.user_type.query_name()));
        payload.insert("is_active".into(), json!(parse_active(row.value("status"))));
        Ok(Value::Object(payload))
    }

    fn resolve_state(&self, row: &ImportRow) -> Result<Option<String>, String> {
        let id = row.value("state_id");
        if !id.is_empty() {
            return match self.reference.state(id) {
                Some(state) => Ok(Some(state.id.clone())),
                None if self.reference.states().is_empty() => Ok(Some(id.to_string())),
                None => Err(format!("unknown state id '{id}'")),
            };
        }
        let name = row.value("state");
        if name.is_empty() {
            return Ok(None);
        }
        self.reference
            .find_state_by_name(name)
            .map(|s| Some(s.id.clone()))
            .ok_or_else(|| format!("unknown state '{name}'"))
    }

    fn resolve_city(&self, row: &ImportRow, state_id: Option<&str>) -> Result<Option<String>, String> {
        let id = row.value("city_id");
        let city = if !id.is_empty() {
            match self.reference.city(id) {
                Some(city) => city,
                None if self.reference.cities().is_empty() => return Ok(Some(id.to_string())),
                None => return Err(format!("unknown city id '{id}'")),
            }
        } else {
            let name = row.value("city");
            if name.is_empty() {
                return Ok(None);
            }
            self.reference
                .find_city_by_name(name)
                .ok_or_else(|| format!("unknown city '{name}'"))?
        };

        if let (Some(state), Some(city_state)) = (state_id, city.state_id.as_deref()) {
            if state != city_state {
                return Err(format!("city '{}' is not in the given state", city.name));
            }
        }
        Ok(Some(city.id.clone()))
    }

    fn resolve_role(&self, row: &ImportRow) -> Result<Option<String>, String> {
        let id = row.value("role_id");
        if !id.is_empty() {
            return Ok(Some(id.to_string()));
        }
        let name = row.value("role");
        if name.is_empty() {
            return Ok(None);
        }
        self.reference
            .roles_for(self.user_type)
            .into_iter()
            .find(|r| r.name_matches(name))
            .map(|r| Some(r.id.clone()))
            .ok_or_else(|| format!("unknown role '{name}'"))
    }
}

/// Blank means active
fn parse_active(status: &str) -> bool {
    !matches!(
        status.trim().to_ascii_lowercase().as_str(),
        "inactive" | "false" | "0" | "no"
    )
}

/// Validate rows for a screen
pub fn validate_import(
    rows: &[ImportRow],
    user_type: UserType,
    reference: &ReferenceData,
) -> RosterResult<ImportReport> {
    Ok(ImportValidator::new(user_type, reference)?.validate(rows))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten;
    use pretty_assertions::assert_eq;
    use roster_model::{CellRenderer, City, Role, State};

    #[test]
    fn test_export_quotes_special_fields() {
        let columns = [
            ColumnDescriptor::new("name", flatten::NAME),
            ColumnDescriptor::new("address", flatten::ADDRESS),
            ColumnDescriptor::new("status", flatten::IS_ACTIVE).with_renderer(CellRenderer::Status),
        ];
        let columns: Vec<&ColumnDescriptor> = columns.iter().collect();
        let rows = [
            FlatRow::new(None, 0)
                .with(flatten::NAME, "Ann \"Nan\" Lee")
                .with(flatten::ADDRESS, "1 Main St, Apt 2")
                .with(flatten::IS_ACTIVE, true),
            FlatRow::new(None, 1).with(flatten::NAME, "Bob"),
        ];
        let rows: Vec<&FlatRow> = rows.iter().collect();

        let csv = export_csv(&columns, &rows);
        assert_eq!(
            csv,
            "Name,Address,Status\n\"Ann \"\"Nan\"\" Lee\",\"1 Main St, Apt 2\",Active\nBob,,Inactive"
        );
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name("nurses", date), "nurses_export_2024-03-09.csv");
    }

    #[test]
    fn test_split_csv_line() {
        assert_eq!(split_csv_line(" a , b ,c"), vec!["a", "b", "c"]);
        assert_eq!(
            split_csv_line(r#""Lee, Ann","say ""hi""",x"#),
            vec!["Lee, Ann", "say \"hi\"", "x"]
        );
        assert_eq!(split_csv_line("a,,"), vec!["a", "", ""]);
        assert_eq!(split_csv_line(""), vec![""]);
    }

    #[test]
    fn test_export_then_split_recovers_cells() {
        let original = ["Lee, Ann", "say \"hi\"", "plain"];
        let line = original.iter().map(|f| escape_field(f)).collect::<Vec<_>>().join(",");
        assert_eq!(split_csv_line(&line), original);
    }

    #[test]
    fn test_parse_import() {
        let text = "\n Name , Email,Zip Code\r\nAnn,ann@a.test,12345\n\n  \nBob,bob@b.test\n";
        let rows = parse_import(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 3);
        assert_eq!(rows[0].value("zip_code"), "12345");
        assert_eq!(rows[1].line, 6);
        assert_eq!(rows[1].value("zip_code"), "");
        assert_eq!(rows[1].value("missing"), "");
    }

    #[test]
    fn test_split_records_keeps_quoted_line_breaks() {
        let text = "a,b\r\n\"x\ny\",z\n\nlast";
        assert_eq!(
            split_records(text),
            vec![
                (1, "a,b".to_string()),
                (2, "\"x\ny\",z".to_string()),
                (4, String::new()),
                (5, "last".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_cell_survives_export_and_import() {
        let columns = [
            ColumnDescriptor::new("name", flatten::NAME),
            ColumnDescriptor::new("email", flatten::EMAIL),
            ColumnDescriptor::new("address", flatten::ADDRESS),
        ];
        let columns: Vec<&ColumnDescriptor> = columns.iter().collect();
        let rows = [
            FlatRow::new(None, 0)
                .with(flatten::NAME, "Ann")
                .with(flatten::EMAIL, "ann@a.test")
                .with(flatten::ADDRESS, "1 Main St\nApt 2"),
            FlatRow::new(None, 1)
                .with(flatten::NAME, "Bob")
                .with(flatten::EMAIL, "bob@b.test"),
        ];
        let rows: Vec<&FlatRow> = rows.iter().collect();

        let csv = export_csv(&columns, &rows);
        let imported = parse_import(&csv).unwrap();

        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].line, 2);
        assert_eq!(imported[0].value("address"), "1 Main St\nApt 2");
        assert_eq!(imported[1].line, 4);
        assert_eq!(imported[1].value("name"), "Bob");
    }

    #[test]
    fn test_parse_import_ignores_byte_order_mark() {
        let rows = parse_import("\u{feff}name,email\nAnn,ann@a.test\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("name"), "Ann");

        let report = validate_import(&rows, UserType::Patient, &ReferenceData::default()).unwrap();
        assert_eq!(report.accepted.len(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_parse_import_requires_header() {
        assert!(parse_import("  \n\n").unwrap_err().is_format());
        assert!(parse_import(" , \nAnn").unwrap_err().is_format());
    }

    fn reference() -> ReferenceData {
        ReferenceData::new(
            vec![State::new("1", "Texas"), State::new("2", "Ohio")],
            vec![City::new("10", "Austin", Some("1")), City::new("20", "Columbus", Some("2"))],
            vec![Role::new("7", "Charge Nurse", Some("nurse"))],
        )
    }

    #[test]
    fn test_validate_import() {
        let text = "name,email,state,city,role,status\n\
                    Ann,ann@a.test,texas,Austin,charge nurse,\n\
                    ,nobody@a.test,,,,\n\
                    Bob,not-an-email,,,,\n\
                    Cid,cid@a.test,Ohio,Austin,,\n\
                    Dee,dee@a.test,Mars,,,\n\
                    Eve,eve@a.test,,,Janitor,inactive\n\
                    Fay,fay@a.test,,,,inactive";
        let rows = parse_import(text).unwrap();
        let report = validate_import(&rows, UserType::Nurse, &reference()).unwrap();

        assert_eq!(report.total(), 7);
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(
            report.accepted[0].payload,
            json!({
                "name": "Ann",
                "email": "ann@a.test",
                "state_id": "1",
                "city_id": "10",
                "role_id": "7",
                "user_type": "Nurse",
                "is_active": true
            })
        );
        assert_eq!(report.accepted[1].payload["is_active"], json!(false));

        let reasons: Vec<(usize, &str)> = report
            .rejected
            .iter()
            .map(|r| (r.line, r.reason.as_str()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (3, "name is required"),
                (4, "invalid email 'not-an-email'"),
                (5, "city 'Austin' is not in the given state"),
                (6, "unknown state 'Mars'"),
                (7, "unknown role 'Janitor'"),
            ]
        );
        assert!(report.errors().iter().all(|e| e.is_validation()));
    }

    #[test]
    fn test_patient_import_ignores_roles() {
        let rows = parse_import("name,email,role\nPat,pat@a.test,Anything").unwrap();
        let report = validate_import(&rows, UserType::Patient, &reference()).unwrap();
        assert!(report.is_clean());
        assert!(report.accepted[0].payload.get("role_id").is_none());
    }

    #[test]
    fn test_ids_pass_through_without_reference_data() {
        let rows = parse_import("name,email,state_id,city_id\nAnn,ann@a.test,5,50").unwrap();
        let report = validate_import(&rows, UserType::Admin, &ReferenceData::empty()).unwrap();
        assert_eq!(report.accepted[0].payload["state_id"], json!("5"));
        assert_eq!(report.accepted[0].payload["city_id"], json!("50"));
    }
}

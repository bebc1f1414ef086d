//! Spreadsheet transfer helpers
//!
//! Export produces CSV bytes with a fixed column header per entity and
//! returns them as a download; import parses the raw CSV body and maps
//! each row 1:1 to a new record, trusting row data — duplicate handling
//! is whatever the store's constraints enforce.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::utils::{AppError, AppResult};

/// Query string for export endpoints: `?type=csv`
#[derive(Debug, serde::Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    pub format: Option<String>,
}

impl ExportQuery {
    /// The original service offered xlsx and csv; the xlsx codec is out
    /// of scope here, so only `csv` passes validation.
    pub fn require_csv(&self) -> AppResult<()> {
        match self.format.as_deref() {
            Some("csv") => Ok(()),
            Some(other) => Err(AppError::validation(format!(
                "Unsupported export type '{other}', only csv is available"
            ))),
            None => Err(AppError::validation("type is required")),
        }
    }
}

/// Serialize rows into CSV bytes. The header row comes from the row
/// struct's field names, which pins the fixed per-entity column set.
pub fn export_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::internal(format!("CSV encode failed: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("CSV encode failed: {e}")))
}

/// Parse a CSV body into typed rows; a malformed body or row is the
/// caller's fault and reported as a validation error.
pub fn import_csv<T: DeserializeOwned>(bytes: &[u8]) -> AppResult<Vec<T>> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| AppError::validation(format!("Invalid CSV: {e}")))
}

/// Wrap CSV bytes as a file download response
pub fn csv_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Row {
        id: i64,
        name: String,
    }

    #[test]
    fn export_then_import_roundtrip() {
        let rows = vec![
            Row {
                id: 1,
                name: "Nasi Goreng".to_string(),
            },
            Row {
                id: 2,
                name: "Es Teh".to_string(),
            },
        ];

        let bytes = export_csv(&rows).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("id,name\n"));

        let parsed: Vec<Row> = import_csv(&bytes).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn import_rejects_malformed_body() {
        let result: AppResult<Vec<Row>> = import_csv(b"id,name\nnot-a-number,x");
        assert!(result.is_err());
    }

    #[test]
    fn export_type_must_be_csv() {
        let query = ExportQuery {
            format: Some("xlsx".to_string()),
        };
        assert!(query.require_csv().is_err());

        let query = ExportQuery { format: None };
        assert!(query.require_csv().is_err());

        let query = ExportQuery {
            format: Some("csv".to_string()),
        };
        assert!(query.require_csv().is_ok());
    }
}

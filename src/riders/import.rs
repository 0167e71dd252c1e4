//! Bulk rider import from a CSV export with a header row, or from a `.json`
//! file holding an array of row objects.
//!
//! Column names vary between exports, so a few aliases are accepted. Rows that
//! fail validation or collide on email are skipped and counted; the import
//! never stops on a bad row.

use std::{collections::HashMap, path::Path};

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    riders::{
        dto::RiderRequest,
        repo::{RiderStore, StoreError},
        services::validate_rider,
    },
};

#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(default, alias = "Name", alias = "rider_name", deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    email: Option<String>,
    #[serde(default, alias = "Phone", alias = "mobile", deserialize_with = "lenient_string")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<OffsetDateTime>,
}

/// Spreadsheet exports turn phone numbers into JSON numbers.
fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// RFC 3339, or the `YYYY-MM-DD HH:MM:SS` (UTC) form older exports use.
fn lenient_timestamp<'de, D>(de: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(de)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| {
            PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
                .map(PrimitiveDateTime::assume_utc)
        })
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("created_at {raw:?}: {e}")))
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
}

pub async fn import_riders(store: &dyn RiderStore, rows: Vec<Value>) -> ImportSummary {
    let mut summary = ImportSummary {
        total: rows.len(),
        ..Default::default()
    };

    for (index, raw) in rows.into_iter().enumerate() {
        let row_no = index + 1;
        let row: ImportRow = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                warn!(row = row_no, error = %e, "unreadable row, skipping");
                summary.failed += 1;
                continue;
            }
        };

        let mut rider = match validate_rider(RiderRequest {
            name: row.name,
            email: row.email,
            phone: row.phone,
        }) {
            Ok(r) => r,
            Err(AppError::Validation { message, fields }) => {
                warn!(row = row_no, %message, ?fields, "invalid row, skipping");
                summary.skipped_invalid += 1;
                continue;
            }
            Err(e) => {
                warn!(row = row_no, error = %e, "row rejected");
                summary.failed += 1;
                continue;
            }
        };
        rider.created_at = row.created_at;

        match store.create(&rider).await {
            Ok(created) => {
                info!(row = row_no, rider_id = created.rider_id, email = %created.email, "imported");
                summary.imported += 1;
            }
            Err(StoreError::DuplicateEmail) => {
                warn!(row = row_no, email = %rider.email, "email already exists, skipping");
                summary.skipped_duplicate += 1;
            }
            Err(e) => {
                warn!(row = row_no, error = %e, "import failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Every data record becomes one row object. Empty cells are left out so they
/// read as missing; a record the reader cannot split becomes `null` and is
/// counted as failed.
fn csv_rows(raw: &[u8]) -> anyhow::Result<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw);
    reader.headers().context("read CSV header row")?;

    let rows = reader
        .deserialize::<HashMap<String, String>>()
        .enumerate()
        .map(|(index, record)| match record {
            Ok(cells) => Value::Object(
                cells
                    .into_iter()
                    .filter(|(_, v)| !v.is_empty())
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ),
            Err(e) => {
                warn!(row = index + 1, error = %e, "unreadable CSV record");
                Value::Null
            }
        })
        .collect();
    Ok(rows)
}

#[instrument(skip(store))]
pub async fn import_file(store: &dyn RiderStore, path: &Path) -> anyhow::Result<ImportSummary> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rows: Vec<Value> = if is_json {
        serde_json::from_slice(&raw)
            .with_context(|| format!("parse {} as a JSON array of rows", path.display()))?
    } else {
        csv_rows(&raw).with_context(|| format!("parse {} as CSV", path.display()))?
    };

    if rows.is_empty() {
        warn!(path = %path.display(), "no rows found");
    }

    let summary = import_riders(store, rows).await;
    info!(
        total = summary.total,
        imported = summary.imported,
        skipped_invalid = summary.skipped_invalid,
        skipped_duplicate = summary.skipped_duplicate,
        failed = summary.failed,
        "import completed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::fakes::InMemoryRiderStore;
    use serde_json::json;

    #[tokio::test]
    async fn imports_with_aliases_and_counts_skips() {
        let store = InMemoryRiderStore::default();
        let rows = vec![
            json!({"Name": "John Doe", "email": "john@example.com", "Phone": 1234567890}),
            json!({"rider_name": "Jane", "email": "JANE@example.com", "mobile": "+1987",
                   "created_at": "2025-11-06T09:31:45Z"}),
            json!({"name": "No Phone", "email": "np@example.com"}),
            json!({"name": "Dup", "email": "john@example.com", "phone": "1"}),
            json!("not an object"),
        ];

        let summary = import_riders(&store, rows).await;

        assert_eq!(
            summary,
            ImportSummary {
                total: 5,
                imported: 2,
                skipped_invalid: 1,
                skipped_duplicate: 1,
                failed: 1,
            }
        );
        let riders = store.snapshot();
        assert_eq!(riders[0].phone, "1234567890");
        assert_eq!(riders[1].email, "jane@example.com");
        assert_eq!(riders[1].created_at.year(), 2025);
    }

    fn fixture(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("rider-import-")
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn imports_csv_export_keeping_phone_text() {
        let file = fixture(
            ".csv",
            "Name,email,Phone,created_at\n\
             John Doe,john@example.com,01234567890,2025-11-06 09:31:45\n\
             Jane, JANE@example.com ,+1987,2025-11-06T09:31:45Z\n\
             No Phone,np@example.com,,\n\
             Dup,john@example.com,1,\n\
             Broken,row\n",
        );

        let store = InMemoryRiderStore::default();
        let summary = import_file(&store, file.path()).await.unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                total: 5,
                imported: 2,
                skipped_invalid: 1,
                skipped_duplicate: 1,
                failed: 1,
            }
        );
        let riders = store.snapshot();
        assert_eq!(riders[0].phone, "01234567890");
        assert_eq!(riders[0].created_at.hour(), 9);
        assert_eq!(riders[1].phone, "+1987");
        assert_eq!(riders[1].email, "jane@example.com");
    }

    #[tokio::test]
    async fn csv_accepts_alternate_column_names() {
        let file = fixture(".csv", "rider_name,email,mobile\nAda,ada@example.com,555 0101\n");

        let store = InMemoryRiderStore::default();
        let summary = import_file(&store, file.path()).await.unwrap();

        assert_eq!(summary.imported, 1);
        let riders = store.snapshot();
        assert_eq!(riders[0].name, "Ada");
        assert_eq!(riders[0].phone, "555 0101");
    }

    #[tokio::test]
    async fn unparseable_created_at_fails_the_row_only() {
        let file = fixture(
            ".csv",
            "name,email,phone,created_at\n\
             Old,old@example.com,1,last tuesday\n\
             New,new@example.com,2,\n",
        );

        let store = InMemoryRiderStore::default();
        let summary = import_file(&store, file.path()).await.unwrap();

        assert_eq!((summary.imported, summary.failed), (1, 1));
        assert_eq!(store.snapshot()[0].email, "new@example.com");
    }

    #[tokio::test]
    async fn json_file_must_hold_an_array() {
        let file = fixture(".json", r#"{"name": "x"}"#);

        let store = InMemoryRiderStore::default();
        let err = import_file(&store, file.path()).await.unwrap_err();
        assert!(format!("{err:#}").contains("JSON array"));
        assert!(store.snapshot().is_empty());
    }
}

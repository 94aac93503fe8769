use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::core::error::{AppError, Result};
use crate::features::incidents::dtos::{ExportFormat, ExportQuery};
use crate::features::incidents::models::{ExportComment, ExportRow};
use crate::features::incidents::repositories::IncidentRepository;
use crate::shared::constants::DELETED_COMMENT_PLACEHOLDER;

const HEADERS: [&str; 13] = [
    "ID",
    "Description",
    "Category",
    "Address",
    "Status",
    "Latitude",
    "Longitude",
    "Reported By",
    "Reporter Email",
    "Created Date",
    "Updated Date",
    "Comments",
    "Photos Count",
];

/// Rendered export ready to be served as an attachment
#[derive(Debug)]
pub struct ExportFile {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One export line with every cell already formatted
#[derive(Debug, Clone, PartialEq)]
struct ExportRecord {
    id: String,
    description: String,
    category: String,
    address: String,
    status: String,
    latitude: f64,
    longitude: f64,
    reported_by: String,
    reporter_email: String,
    created_date: String,
    updated_date: String,
    comments: String,
    photos_count: i64,
}

fn day(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

fn format_comment(c: &ExportComment) -> String {
    let content = if c.deleted_at.is_some() {
        DELETED_COMMENT_PLACEHOLDER
    } else {
        c.content.as_str()
    };
    format!(
        "[{}] {} {}: {}",
        day(&c.created_at),
        c.author_first_name,
        c.author_last_name,
        content
    )
}

impl From<&ExportRow> for ExportRecord {
    fn from(row: &ExportRow) -> Self {
        let comments = if row.comments.is_empty() {
            "-".to_string()
        } else {
            row.comments
                .iter()
                .map(format_comment)
                .collect::<Vec<_>>()
                .join(" | ")
        };

        Self {
            id: row.id.to_string(),
            description: row.description.clone(),
            category: row.category.to_string(),
            address: row
                .address
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "-".to_string()),
            status: row.status.to_string(),
            latitude: row.latitude,
            longitude: row.longitude,
            reported_by: format!("{} {}", row.reporter_first_name, row.reporter_last_name),
            reporter_email: row.reporter_email.clone(),
            created_date: day(&row.created_at),
            updated_date: day(&row.updated_at),
            comments,
            photos_count: row.photo_count,
        }
    }
}

fn write_csv(records: &[ExportRecord]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for r in records {
        writer.write_record([
            r.id.clone(),
            r.description.clone(),
            r.category.clone(),
            r.address.clone(),
            r.status.clone(),
            r.latitude.to_string(),
            r.longitude.to_string(),
            r.reported_by.clone(),
            r.reporter_email.clone(),
            r.created_date.clone(),
            r.updated_date.clone(),
            r.comments.clone(),
            r.photos_count.to_string(),
        ])?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

fn write_xlsx(records: &[ExportRecord]) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Incidents")?;

    for (col, title) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, r) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, r.id.as_str())?;
        sheet.write_string(row, 1, r.description.as_str())?;
        sheet.write_string(row, 2, r.category.as_str())?;
        sheet.write_string(row, 3, r.address.as_str())?;
        sheet.write_string(row, 4, r.status.as_str())?;
        sheet.write_number(row, 5, r.latitude)?;
        sheet.write_number(row, 6, r.longitude)?;
        sheet.write_string(row, 7, r.reported_by.as_str())?;
        sheet.write_string(row, 8, r.reporter_email.as_str())?;
        sheet.write_string(row, 9, r.created_date.as_str())?;
        sheet.write_string(row, 10, r.updated_date.as_str())?;
        sheet.write_string(row, 11, r.comments.as_str())?;
        sheet.write_number(row, 12, r.photos_count as f64)?;
    }

    sheet.set_column_width(1, 50)?;
    sheet.set_column_width(11, 80)?;

    workbook.save_to_buffer()
}

/// Admin export of incidents as CSV or XLSX
pub struct ExportService {
    incidents: Arc<dyn IncidentRepository>,
}

impl ExportService {
    pub fn new(incidents: Arc<dyn IncidentRepository>) -> Self {
        Self { incidents }
    }

    pub async fn export(&self, query: &ExportQuery, today: NaiveDate) -> Result<ExportFile> {
        let filter = query.filter()?;
        let rows = self.incidents.export_rows(&filter).await?;
        let records: Vec<ExportRecord> = rows.iter().map(ExportRecord::from).collect();

        let bytes = match query.format {
            ExportFormat::Csv => write_csv(&records).map_err(|e| {
                tracing::error!("Failed to write CSV export: {:?}", e);
                AppError::Internal(format!("Failed to write CSV export: {}", e))
            })?,
            ExportFormat::Xlsx => write_xlsx(&records).map_err(|e| {
                tracing::error!("Failed to write XLSX export: {:?}", e);
                AppError::Internal(format!("Failed to write XLSX export: {}", e))
            })?,
        };

        tracing::info!(
            "Exported {} incidents as {}",
            records.len(),
            query.format.extension()
        );

        Ok(ExportFile {
            format: query.format,
            file_name: format!(
                "incidents_export_{}.{}",
                today.format("%Y-%m-%d"),
                query.format.extension()
            ),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::incidents::models::{IncidentCategory, IncidentStatus};
    use crate::features::users::models::Role;
    use crate::shared::test_helpers::{authenticated, InMemoryStore};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn export_row(comments: Vec<ExportComment>) -> ExportRow {
        ExportRow {
            id: Uuid::nil(),
            description: "Pothole, \"deep\"".to_string(),
            category: IncidentCategory::Potholes,
            address: None,
            status: IncidentStatus::InProgress,
            latitude: 45.5,
            longitude: 15.25,
            reporter_first_name: "Ivo".to_string(),
            reporter_last_name: "Horvat".to_string(),
            reporter_email: "ivo@example.com".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 5, 3, 8, 30, 0).unwrap(),
            photo_count: 2,
            comments,
        }
    }

    fn comment(first: &str, content: &str, deleted: bool) -> ExportComment {
        ExportComment {
            incident_id: Uuid::nil(),
            author_first_name: first.to_string(),
            author_last_name: "Kos".to_string(),
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 5, 2, 9, 0, 0).unwrap(),
            deleted_at: deleted.then(Utc::now),
        }
    }

    #[test]
    fn test_record_formatting() {
        let record = ExportRecord::from(&export_row(vec![
            comment("Eva", "Still there", false),
            comment("Ana", "rude words", true),
        ]));

        assert_eq!(record.address, "-");
        assert_eq!(record.status, "IN_PROGRESS");
        assert_eq!(record.category, "Potholes");
        assert_eq!(record.reported_by, "Ivo Horvat");
        assert_eq!(record.created_date, "2025-05-01");
        assert_eq!(record.updated_date, "2025-05-03");
        assert_eq!(
            record.comments,
            "[2025-05-02] Eva Kos: Still there | [2025-05-02] Ana Kos: [deleted]"
        );
        assert_eq!(record.photos_count, 2);
    }

    #[test]
    fn test_no_comments_renders_dash() {
        let record = ExportRecord::from(&export_row(vec![]));
        assert_eq!(record.comments, "-");
    }

    #[test]
    fn test_csv_has_header_and_quotes_fields() {
        let records = vec![ExportRecord::from(&export_row(vec![]))];
        let csv = String::from_utf8(write_csv(&records).unwrap()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next().unwrap(), HEADERS.join(","));
        let line = lines.next().unwrap();
        assert!(line.contains("\"Pothole, \"\"deep\"\"\""));
        assert!(line.ends_with(",2"));
    }

    #[test]
    fn test_xlsx_is_a_zip_container() {
        let records = vec![ExportRecord::from(&export_row(vec![]))];
        let bytes = write_xlsx(&records).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    async fn seeded() -> (Arc<InMemoryStore>, AuthenticatedUser) {
        let store = Arc::new(InMemoryStore::new());
        let user = authenticated(&store.add_user("Ivo", "Horvat", Role::Citizen).await);
        (store, user)
    }

    #[tokio::test]
    async fn test_export_csv_file_name_and_rows() {
        let (store, user) = seeded().await;
        store.add_incident(user.id, "Pothole by the bakery").await;
        store.add_incident(user.id, "Garbage near the bus stop").await;

        let service = ExportService::new(store.clone());
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let file = service.export(&ExportQuery::default(), today).await.unwrap();

        assert_eq!(file.format, ExportFormat::Csv);
        assert_eq!(file.file_name, "incidents_export_2025-06-01.csv");
        let csv = String::from_utf8(file.bytes).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_export_rejects_inverted_dates() {
        let (store, _) = seeded().await;
        let service = ExportService::new(store.clone());
        let query = ExportQuery {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 2),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        };

        let err = service
            .export(&query, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }
}

//! Excel import/export for the service catalog.
//!
//! Workbooks carry one `Services` sheet with a header row:
//! `ID | Name | Description | Image URL | Icon | Price | Category | Status | Created By`.
//! Import ignores the ID and Created By columns; rows without a name or
//! description are skipped and reported instead of aborting the whole upload.

use std::io::Cursor;

use calamine::{Reader, Xlsx};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};
use serde::Serialize;

use crate::errors::ServiceError;
use models::service;

const SHEET_NAME: &str = "Services";
const HEADERS: [&str; 9] = [
    "ID", "Name", "Description", "Image URL", "Icon", "Price", "Category", "Status", "Created By",
];

/// One parsed catalog row from an uploaded workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceImportRow {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub icon: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub is_active: bool,
}

/// Result of parsing an uploaded workbook.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    #[serde(skip)]
    pub rows: Vec<ServiceImportRow>,
    pub imported: usize,
    pub skipped: Vec<String>,
}

fn xlsx_err(e: XlsxError) -> ServiceError {
    ServiceError::Spreadsheet(e.to_string())
}

/// Render the catalog into a downloadable workbook.
pub fn export_services(items: &[(service::Model, Option<String>)]) -> Result<Vec<u8>, ServiceError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_err)?;

    let header_fmt = Format::new().set_bold().set_background_color(Color::RGB(0xD9E2F3));
    for (col, title) in HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *title, &header_fmt)
            .map_err(xlsx_err)?;
    }
    sheet.set_column_width(0, 38).map_err(xlsx_err)?;
    sheet.set_column_width(1, 28).map_err(xlsx_err)?;
    sheet.set_column_width(2, 48).map_err(xlsx_err)?;

    for (i, (svc, creator)) in items.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, svc.id.to_string()).map_err(xlsx_err)?;
        sheet.write_string(row, 1, &svc.name).map_err(xlsx_err)?;
        sheet.write_string(row, 2, &svc.description).map_err(xlsx_err)?;
        sheet
            .write_string(row, 3, svc.image_url.as_deref().unwrap_or(""))
            .map_err(xlsx_err)?;
        sheet
            .write_string(row, 4, svc.icon.as_deref().unwrap_or(""))
            .map_err(xlsx_err)?;
        sheet
            .write_number(row, 5, svc.price.to_f64().unwrap_or(0.0))
            .map_err(xlsx_err)?;
        sheet
            .write_string(row, 6, svc.category.as_deref().unwrap_or(""))
            .map_err(xlsx_err)?;
        sheet
            .write_string(row, 7, if svc.is_active { "Active" } else { "Inactive" })
            .map_err(xlsx_err)?;
        sheet
            .write_string(row, 8, creator.as_deref().unwrap_or(""))
            .map_err(xlsx_err)?;
    }

    let buf = workbook.save_to_buffer().map_err(xlsx_err)?;
    Ok(buf)
}

/// A workbook with headers and two sample rows, for download as an import
/// template.
pub fn template() -> Result<Vec<u8>, ServiceError> {
    let now = chrono::Utc::now();
    let sample = |name: &str, description: &str, icon: Option<&str>, price, category: &str, active| {
        service::Model {
            id: uuid::Uuid::nil(),
            name: name.into(),
            description: description.into(),
            image_url: None,
            icon: icon.map(str::to_string),
            price,
            category: Some(category.into()),
            is_active: active,
            created_by: uuid::Uuid::nil(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    };
    export_services(&[
        (
            sample(
                "Sample service",
                "Describe the service here",
                Some("ri-hotel-line"),
                Decimal::new(5000, 2),
                "Rooms",
                true,
            ),
            None,
        ),
        (
            sample(
                "Spa day pass",
                "Full-day access to the spa area",
                None,
                Decimal::new(12000, 2),
                "Wellness",
                false,
            ),
            None,
        ),
    ])
}

/// Parse an uploaded workbook into catalog rows.
pub fn import_services(bytes: &[u8]) -> Result<ImportOutcome, ServiceError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ServiceError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ServiceError::Spreadsheet("workbook has no sheets".into()))?
        .map_err(|e| ServiceError::Spreadsheet(e.to_string()))?;

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    for (idx, row) in range.rows().enumerate().skip(1) {
        let line = idx + 1; // 1-based, header is line 1
        let name = cell_text(row, 1);
        let description = cell_text(row, 2);
        if name.is_empty() || description.is_empty() {
            if !row_is_blank(row) {
                skipped.push(format!("row {}: missing name or description", line));
            }
            continue;
        }
        rows.push(ServiceImportRow {
            name,
            description,
            image_url: optional(cell_text(row, 3)),
            icon: optional(cell_text(row, 4)),
            price: parse_price(&cell_text(row, 5)),
            category: optional(cell_text(row, 6)),
            is_active: parse_status(&cell_text(row, 7)),
        });
    }
    let imported = rows.len();
    Ok(ImportOutcome { rows, imported, skipped })
}

fn cell_text(row: &[calamine::Data], col: usize) -> String {
    row.get(col).map(|c| c.to_string().trim().to_string()).unwrap_or_default()
}

fn row_is_blank(row: &[calamine::Data]) -> bool {
    (0..HEADERS.len()).all(|col| cell_text(row, col).is_empty())
}

fn optional(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Unparseable and negative prices import as zero rather than failing the row.
fn parse_price(raw: &str) -> Decimal {
    match raw.trim().parse::<Decimal>() {
        Ok(d) if d >= Decimal::ZERO => d,
        _ => Decimal::ZERO,
    }
}

/// Anything except an explicit "inactive" imports as active.
fn parse_status(raw: &str) -> bool {
    !raw.trim().eq_ignore_ascii_case("inactive")
}

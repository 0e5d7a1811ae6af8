//! Download the user's transaction history as a CSV, Excel or PDF file.
//!
//! The export always covers the full history with a fixed set of columns,
//! regardless of any filters applied on the report pages.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use rusqlite::Connection;
use rust_xlsxwriter::{Format, Workbook};
use time::Date;

use crate::{
    AppState, Error,
    auth::UserId,
    category::{CategoryId, get_all_categories},
    timezone::local_now,
    transaction::{Transaction, TransactionFilter, get_transactions},
};

const EXPORT_COLUMNS: [&str; 5] = ["Date", "Time", "Category", "Description", "Amount"];

/// The state needed for exporting the transaction history.
#[derive(Debug, Clone)]
pub struct ExportReportState {
    /// The database connection for reading the user's transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for ExportReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A single row of an exported report.
struct ExportRow {
    date: String,
    time: String,
    category: String,
    description: String,
    amount: f64,
}

/// Download the user's transactions as a file.
///
/// The route parameters select the report type and the file format. Only the
/// `current` report type exists, and the format must be one of `csv`, `excel`
/// or `pdf`. Anything else is a 404.
pub async fn export_report_endpoint(
    State(state): State<ExportReportState>,
    Extension(user_id): Extension<UserId>,
    Path((report_type, format)): Path<(String, String)>,
) -> Result<Response, Error> {
    if report_type != "current" {
        return Err(Error::NotFound);
    }

    let today = local_now(&state.local_timezone)?.date();

    let (transactions, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        let transactions = get_transactions(&user_id, &TransactionFilter::default(), &connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
        let categories = get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

        (transactions, categories)
    };

    let category_names: HashMap<CategoryId, String> = categories
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();
    let rows = export_rows(transactions, &category_names);

    let (content_type, extension, body) = match format.as_str() {
        "csv" => ("text/csv", "csv", write_csv(&rows)?),
        "excel" => (
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "xlsx",
            write_excel(&rows)?,
        ),
        "pdf" => ("application/pdf", "pdf", write_pdf(&rows)?),
        _ => return Err(Error::NotFound),
    };

    let filename = format!(
        "expense_report_{}{:02}{:02}.{extension}",
        today.year(),
        u8::from(today.month()),
        today.day(),
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Project transactions into the fixed export columns.
fn export_rows(
    transactions: Vec<Transaction>,
    category_names: &HashMap<CategoryId, String>,
) -> Vec<ExportRow> {
    transactions
        .into_iter()
        .map(|transaction| {
            let category = category_names
                .get(&transaction.category_id)
                .cloned()
                .unwrap_or_else(|| transaction.category_id.to_string());

            ExportRow {
                date: format_export_date(transaction.date),
                time: transaction.time.to_string(),
                category,
                description: transaction.description,
                amount: transaction.amount,
            }
        })
        .collect()
}

/// Format a date as `DD-MM-YYYY` for the export columns.
fn format_export_date(date: Date) -> String {
    format!(
        "{:02}-{:02}-{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

fn write_csv(rows: &[ExportRow]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for row in rows {
        writer
            .write_record([
                row.date.as_str(),
                &row.time,
                &row.category,
                &row.description,
                &format!("{:.2}", row.amount),
            ])
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))
}

fn write_excel(rows: &[ExportRow]) -> Result<Vec<u8>, Error> {
    let header_format = Format::new().set_bold();
    let amount_format = Format::new().set_num_format("0.00");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Expenses")
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for (column, header) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, column as u16, *header, &header_format)
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_number = index as u32 + 1;
        worksheet
            .write_string(row_number, 0, &row.date)
            .and_then(|worksheet| worksheet.write_string(row_number, 1, &row.time))
            .and_then(|worksheet| worksheet.write_string(row_number, 2, &row.category))
            .and_then(|worksheet| worksheet.write_string(row_number, 3, &row.description))
            .and_then(|worksheet| {
                worksheet.write_number_with_format(row_number, 4, row.amount, &amount_format)
            })
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    // Widen each column to fit its longest value, like a spreadsheet's
    // auto-fit.
    for (column, header) in EXPORT_COLUMNS.iter().enumerate() {
        let content_width = rows
            .iter()
            .map(|row| column_text_length(row, column))
            .max()
            .unwrap_or(0)
            .max(header.len());
        worksheet
            .set_column_width(column as u16, (content_width + 2) as f64)
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|error| Error::ExportError(error.to_string()))
}

fn column_text_length(row: &ExportRow, column: usize) -> usize {
    match column {
        0 => row.date.len(),
        1 => row.time.len(),
        2 => row.category.len(),
        3 => row.description.len(),
        _ => format!("{:.2}", row.amount).len(),
    }
}

// US Letter page layout, with y measured from the bottom of the page.
const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const TITLE_Y: f32 = 265.0;
const HEADER_Y: f32 = 252.0;
const FIRST_ROW_Y: f32 = 244.0;
const ROW_HEIGHT: f32 = 8.0;
const BOTTOM_MARGIN_Y: f32 = 15.0;
const COLUMN_X: [f32; 5] = [12.0, 44.0, 66.0, 110.0, 180.0];
const TABLE_LEFT_X: f32 = 10.0;
const TABLE_RIGHT_X: f32 = 205.9;
const TITLE_FONT_SIZE: f32 = 16.0;
const BODY_FONT_SIZE: f32 = 10.0;
const DESCRIPTION_MAX_CHARS: usize = 40;

fn write_pdf(rows: &[ExportRow]) -> Result<Vec<u8>, Error> {
    let (document, first_page, first_layer) =
        PdfDocument::new("Expense Report", PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = document
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|error| Error::ExportError(error.to_string()))?;
    let bold_font = document
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    let mut layer = document.get_page(first_page).get_layer(first_layer);
    layer.use_text(
        "Expense Report",
        TITLE_FONT_SIZE,
        Mm(COLUMN_X[0]),
        Mm(TITLE_Y),
        &bold_font,
    );
    write_column_headers(&layer, &bold_font);

    let mut y = FIRST_ROW_Y;
    for row in rows {
        if y < BOTTOM_MARGIN_Y {
            let (page, layer_index) = document.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layer = document.get_page(page).get_layer(layer_index);
            write_column_headers(&layer, &bold_font);
            y = FIRST_ROW_Y;
        }

        let amount = format!("{:.2}", row.amount);
        let description = fit_cell(&row.description, DESCRIPTION_MAX_CHARS);
        let cells = [
            row.date.as_str(),
            &row.time,
            &row.category,
            &description,
            &amount,
        ];
        for (text, x) in cells.iter().zip(COLUMN_X) {
            layer.use_text(*text, BODY_FONT_SIZE, Mm(x), Mm(y), &font);
        }
        draw_row_line(&layer, y - 2.0);

        y -= ROW_HEIGHT;
    }

    document
        .save_to_bytes()
        .map_err(|error| Error::ExportError(error.to_string()))
}

/// Writes the bold column headers and their underline at the top of a page.
fn write_column_headers(layer: &PdfLayerReference, font: &IndirectFontRef) {
    layer.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
    layer.set_outline_thickness(0.5);

    for (header, x) in EXPORT_COLUMNS.iter().zip(COLUMN_X) {
        layer.use_text(*header, BODY_FONT_SIZE, Mm(x), Mm(HEADER_Y), font);
    }

    draw_row_line(layer, HEADER_Y - 2.0);
}

/// Draws a horizontal separator line across the table width.
fn draw_row_line(layer: &PdfLayerReference, y: f32) {
    let line = Line {
        points: vec![
            (Point::new(Mm(TABLE_LEFT_X), Mm(y)), false),
            (Point::new(Mm(TABLE_RIGHT_X), Mm(y)), false),
        ],
        is_closed: false,
    };

    layer.add_line(line);
}

/// Truncate `text` to `max_chars` characters so it stays inside its column.
fn fit_cell(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars - 3).collect();

    format!("{truncated}...")
}

//! Excel import/export
//!
//! - Import: first worksheet of an .xlsx / .xls upload → [`Table`](crate::types::Table)
//! - Export: named tables → .xlsx workbook (bytes or file), with optional column charts

mod exporter;
mod importer;

pub use exporter::{
    export_results, export_top_performers, results_file_name, top_file_name, WorkbookExporter,
    DEFAULT_TITLE, RESULTS_SHEET, SUMMARY_SHEET, TOP_PERFORMERS_SHEET,
};
pub use importer::SheetImporter;

/// MIME type served with .xlsx downloads
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

//! Spreadsheet importer - Excel (.xlsx / .xls) → Table

use crate::error::{ResultsError, ResultsResult};
use crate::types::{CellValue, Table};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

enum Source {
    Path(PathBuf),
    Bytes { name: String, bytes: Vec<u8> },
}

/// Reads the first worksheet of an uploaded workbook into a [`Table`]
pub struct SheetImporter {
    source: Source,
}

impl SheetImporter {
    /// Importer for a workbook on disk (format detected by calamine)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source: Source::Path(path.as_ref().to_path_buf()),
        }
    }

    /// Importer for uploaded bytes; `name` becomes the table name
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: Source::Bytes {
                name: name.into(),
                bytes,
            },
        }
    }

    /// Import the first worksheet
    pub fn import(&self) -> ResultsResult<Table> {
        let (name, range) = match &self.source {
            Source::Path(path) => {
                let mut workbook = open_workbook_auto(path).map_err(|e| {
                    ResultsError::Import(format!(
                        "Failed to open Excel file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "sheet".to_string());
                (name, Self::first_sheet(&mut workbook)?)
            }
            Source::Bytes { name, bytes } => {
                let mut workbook =
                    open_workbook_auto_from_rs(Cursor::new(bytes.as_slice())).map_err(|e| {
                        ResultsError::Import(format!("Failed to open Excel file {}: {}", name, e))
                    })?;
                (name.clone(), Self::first_sheet(&mut workbook)?)
            }
        };

        let table = Self::range_to_table(&name, &range);
        debug!(
            table = %table.name,
            columns = table.width(),
            rows = table.row_count(),
            "imported worksheet"
        );
        Ok(table)
    }

    fn first_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> ResultsResult<Range<Data>> {
        match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => Ok(range),
            Some(Err(e)) => Err(ResultsError::Import(format!(
                "Failed to read worksheet: {}",
                e
            ))),
            None => Err(ResultsError::Import("Workbook has no worksheets".to_string())),
        }
    }

    /// Row 0 is the header; blank rows are skipped
    fn range_to_table(name: &str, range: &Range<Data>) -> Table {
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Table::new(name);
        };

        let mut table = Table::with_columns(name, &Self::header_names(header));
        for row in rows {
            if row.iter().all(|cell| matches!(Self::convert_cell(cell), CellValue::Empty)) {
                continue;
            }
            let mut cells: Vec<CellValue> = row.iter().map(Self::convert_cell).collect();
            cells.resize(table.width(), CellValue::Empty);
            table.rows.push(cells);
        }
        table
    }

    /// Header cells as unique column names
    fn header_names(header: &[Data]) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        header
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let base = match Self::convert_cell(cell) {
                    CellValue::Empty => format!("Unnamed: {}", idx),
                    other => other.to_string(),
                };
                let count = seen.entry(base.clone()).or_insert(0);
                let name = if *count == 0 {
                    base
                } else {
                    format!("{}.{}", base, count)
                };
                *count += 1;
                name
            })
            .collect()
    }

    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) if s.trim().is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => {
                let secs = (dt.as_f64() * 86_400.0).round() as i64;
                CellValue::Text(format!(
                    "{}:{:02}:{:02}",
                    secs / 3600,
                    secs % 3600 / 60,
                    secs % 60
                ))
            }
            Data::DateTime(dt) => {
                let (y, mo, d, h, mi, s, ms) = dt.to_ymd_hms_milli();
                if h == 0 && mi == 0 && s == 0 && ms == 0 {
                    CellValue::Text(format!("{:04}-{:02}-{:02}", y, mo, d))
                } else {
                    CellValue::Text(format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                        y, mo, d, h, mi, s
                    ))
                }
            }
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) | Data::Empty => CellValue::Empty,
        }
    }
}

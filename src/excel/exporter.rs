//! Excel exporter implementation

use crate::core::chart::BarChart;
use crate::error::{ResultsError, ResultsResult};
use crate::types::{CellValue, Category, SummaryStats, Table};
use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

pub const RESULTS_SHEET: &str = "Results";
pub const TOP_PERFORMERS_SHEET: &str = "Top Performers";
pub const SUMMARY_SHEET: &str = "Summary Statistics";
pub const DEFAULT_TITLE: &str = "Competition Results";

struct Sheet {
    name: String,
    table: Table,
    chart: Option<BarChart>,
}

/// Writes one or more tables as named worksheets of a single .xlsx workbook
#[derive(Default)]
pub struct WorkbookExporter {
    sheets: Vec<Sheet>,
}

impl WorkbookExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worksheet holding `table`
    pub fn add_table(mut self, sheet_name: impl Into<String>, table: &Table) -> Self {
        self.sheets.push(Sheet {
            name: sheet_name.into(),
            table: table.clone(),
            chart: None,
        });
        self
    }

    /// Add a worksheet holding `table` with a column chart beside the data
    pub fn add_table_with_chart(
        mut self,
        sheet_name: impl Into<String>,
        table: &Table,
        chart: &BarChart,
    ) -> Self {
        self.sheets.push(Sheet {
            name: sheet_name.into(),
            table: table.clone(),
            chart: Some(chart.clone()),
        });
        self
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Encode the workbook in memory
    pub fn to_bytes(&self) -> ResultsResult<Vec<u8>> {
        let mut workbook = self.build()?;
        workbook
            .save_to_buffer()
            .map_err(|e| ResultsError::Export(format!("Failed to encode Excel file: {}", e)))
    }

    /// Save the workbook to an .xlsx file
    pub fn save(&self, output_path: &Path) -> ResultsResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(output_path, bytes)?;
        debug!(path = %output_path.display(), "saved workbook");
        Ok(())
    }

    fn build(&self) -> ResultsResult<Workbook> {
        let mut workbook = Workbook::new();
        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name).map_err(|e| {
                ResultsError::Export(format!(
                    "Failed to set worksheet name '{}': {}",
                    sheet.name, e
                ))
            })?;
            Self::write_table(worksheet, &sheet.table)?;
            if let Some(chart) = &sheet.chart {
                Self::insert_chart(worksheet, &sheet.name, &sheet.table, chart)?;
            }
        }
        Ok(workbook)
    }

    fn write_table(worksheet: &mut Worksheet, table: &Table) -> ResultsResult<()> {
        for (col_idx, name) in table.columns.iter().enumerate() {
            worksheet
                .write_string(0, col_idx as u16, name)
                .map_err(|e| ResultsError::Export(format!("Failed to write header: {}", e)))?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                Self::write_cell(worksheet, excel_row, col_idx as u16, cell)?;
            }
        }
        Ok(())
    }

    fn write_cell(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &CellValue,
    ) -> ResultsResult<()> {
        let written = match cell {
            CellValue::Empty => return Ok(()),
            CellValue::Number(n) => worksheet.write_number(row, col, *n).map(|_| ()),
            CellValue::Text(s) => worksheet.write_string(row, col, s).map(|_| ()),
            CellValue::Bool(b) => worksheet.write_boolean(row, col, *b).map(|_| ()),
        };
        written.map_err(|e| {
            ResultsError::Export(format!("Failed to write cell ({}, {}): {}", row, col, e))
        })
    }

    fn insert_chart(
        worksheet: &mut Worksheet,
        sheet_name: &str,
        table: &Table,
        bar_chart: &BarChart,
    ) -> ResultsResult<()> {
        if table.is_empty() {
            return Ok(());
        }
        let label_col = table.require_column(&bar_chart.label_column)? as u16;
        let value_col = table.require_column(&bar_chart.value_column)? as u16;
        let last_row = table.row_count() as u32;

        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_name(bar_chart.value_column.as_str())
            .set_categories((sheet_name, 1, label_col, last_row, label_col))
            .set_values((sheet_name, 1, value_col, last_row, value_col));
        chart.title().set_name(bar_chart.title.as_str());
        chart.legend().set_hidden();

        worksheet
            .insert_chart(1, (table.width() + 1) as u16, &chart)
            .map_err(|e| ResultsError::Export(format!("Failed to insert chart: {}", e)))?;
        Ok(())
    }
}

/// Single-sheet workbook of computed results
pub fn export_results(table: &Table) -> ResultsResult<Vec<u8>> {
    WorkbookExporter::new()
        .add_table(RESULTS_SHEET, table)
        .to_bytes()
}

/// Top performers (with chart) and summary statistics sheets
pub fn export_top_performers(
    top: &Table,
    chart: &BarChart,
    summary: &SummaryStats,
) -> ResultsResult<Vec<u8>> {
    WorkbookExporter::new()
        .add_table_with_chart(TOP_PERFORMERS_SHEET, top, chart)
        .add_table(SUMMARY_SHEET, &summary.to_table())
        .to_bytes()
}

/// `{event}_results.xlsx`; the event name is required
pub fn results_file_name(event_name: &str) -> ResultsResult<String> {
    let event_name = event_name.trim();
    if event_name.is_empty() {
        return Err(ResultsError::EmptyEventName);
    }
    Ok(format!("{}_results.xlsx", event_name))
}

/// `{title}_{Category}_results.xlsx` with spaces in the title replaced by `_`
pub fn top_file_name(title: &str, category: Category) -> String {
    let title = title.trim();
    let title = if title.is_empty() { DEFAULT_TITLE } else { title };
    format!("{}_{}_results.xlsx", title.replace(' ', "_"), category)
}

use crate::error::{ResultsError, ResultsResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

//==============================================================================
// Well-known column names
//==============================================================================

/// Header names the result sheets are built around.
pub mod columns {
    pub const CHEST_NO: &str = "Chest No";
    pub const MARK1: &str = "mark1";
    pub const MARK2: &str = "mark2";
    pub const MARK3: &str = "mark3";
    pub const MARKS: [&str; 3] = [MARK1, MARK2, MARK3];
    pub const TOTAL_MARKS: &str = "total marks";
    pub const RANK: &str = "Rank";
    pub const POINTS: &str = "Points";
    pub const TIE_STATUS: &str = "Tie Status";

    pub const ID_NO: &str = "ID No";
    pub const STUDENT_NAME: &str = "Student Name";
    pub const CHURCH: &str = "Church";
    pub const SECTION: &str = "Section";
    pub const REGION: &str = "Region";
}

//==============================================================================
// Cells
//==============================================================================

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

/// Hashable form of a non-empty cell, used for joins and grouping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Number(u64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric value of the cell.
    ///
    /// `Ok(None)` for blank cells, `Err(())` for anything that is not a finite number
    /// or numeric text.
    #[allow(clippy::result_unit_err)]
    pub fn to_number(&self) -> Result<Option<f64>, ()> {
        match self {
            CellValue::Empty => Ok(None),
            CellValue::Number(n) if n.is_finite() => Ok(Some(*n)),
            CellValue::Text(s) if s.trim().is_empty() => Ok(None),
            CellValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(()),
            },
            _ => Err(()),
        }
    }

    /// Key used to match cells across tables. Numbers compare by value
    /// (`101` == `101.0`), text compares trimmed. Blank cells have no key.
    pub fn key(&self) -> Option<CellKey> {
        match self {
            CellValue::Empty => None,
            // + 0.0 folds -0.0 into 0.0
            CellValue::Number(n) => Some(CellKey::Number((n + 0.0).to_bits())),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(CellKey::Text(trimmed.to_string()))
                }
            }
            CellValue::Bool(b) => Some(CellKey::Bool(*b)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(n: Option<f64>) -> Self {
        n.map_or(CellValue::Empty, CellValue::Number)
    }
}

/// Format a number for display, removing unnecessary decimal places
pub fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

//==============================================================================
// Tables
//==============================================================================

/// An in-memory sheet: ordered, uniquely named columns and rows of cells.
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_columns<S: AsRef<str>>(name: impl Into<String>, columns: &[S]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of a column that must be present
    pub fn require_column(&self, name: &str) -> ResultsResult<usize> {
        self.column_index(name)
            .ok_or_else(|| ResultsError::missing_column(name, &self.name))
    }

    /// Index of `name`, appending it as a blank column first if absent
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(CellValue::Empty);
        }
        self.columns.len() - 1
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> ResultsResult<()> {
        if row.len() != self.columns.len() {
            return Err(ResultsError::InvalidInput(format!(
                "Row has {} cells, table '{}' has {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn set(&mut self, row: usize, column: usize, value: CellValue) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value;
        }
    }

    /// Numeric values of a column; blank cells are `None`.
    ///
    /// Errors name the spreadsheet row (header is row 1).
    pub fn numeric_column(&self, name: &str) -> ResultsResult<Vec<Option<f64>>> {
        let idx = self.require_column(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                row[idx]
                    .to_number()
                    .map_err(|_| ResultsError::InvalidNumber {
                        column: name.to_string(),
                        row: row_idx + 2,
                        value: row[idx].to_string(),
                    })
            })
            .collect()
    }

    /// Rearrange rows so that row `i` of the result is row `order[i]` of `self`
    pub fn reorder(&mut self, order: &[usize]) {
        let mut rows = std::mem::take(&mut self.rows);
        self.rows = order
            .iter()
            .map(|&idx| std::mem::take(&mut rows[idx]))
            .collect();
    }

    /// First `n` rows, keeping all columns
    pub fn head(&self, n: usize) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

//==============================================================================
// Scoring configuration and results
//==============================================================================

/// Points awarded for the top three ranks; every other rank earns 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointValues {
    pub first: u32,
    pub second: u32,
    pub third: u32,
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            first: 5,
            second: 3,
            third: 1,
        }
    }
}

impl PointValues {
    pub fn for_rank(&self, rank: u32) -> u32 {
        match rank {
            1 => self.first,
            2 => self.second,
            3 => self.third,
            _ => 0,
        }
    }
}

/// Participants sharing the same non-zero total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TieGroup {
    pub total: f64,
    pub chest_numbers: Vec<CellValue>,
}

//==============================================================================
// Leaderboards
//==============================================================================

/// Grouping used for top-performer leaderboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Student,
    Church,
    Section,
    Region,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Student,
        Category::Church,
        Category::Section,
        Category::Region,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Student => "Student",
            Category::Church => "Church",
            Category::Section => "Section",
            Category::Region => "Region",
        }
    }

    /// Plural used in summary labels
    pub fn plural(&self) -> &'static str {
        match self {
            Category::Student => "Students",
            Category::Church => "Churches",
            Category::Section => "Sections",
            Category::Region => "Regions",
        }
    }

    /// Columns that identify one group
    pub fn group_columns(&self) -> &'static [&'static str] {
        use columns::*;
        match self {
            Category::Student => &[ID_NO, STUDENT_NAME, CHURCH, SECTION, REGION],
            Category::Church => &[CHURCH],
            Category::Section => &[SECTION],
            Category::Region => &[REGION],
        }
    }

    /// Column used to label a group in charts
    pub fn label_column(&self) -> &'static str {
        match self {
            Category::Student => columns::STUDENT_NAME,
            Category::Church => columns::CHURCH,
            Category::Section => columns::SECTION,
            Category::Region => columns::REGION,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ResultsError::UnknownCategory(s.to_string()))
    }
}

/// One labelled summary figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    pub label: String,
    pub value: f64,
}

/// Ordered summary figures for a leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub entries: Vec<Statistic>,
}

impl SummaryStats {
    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.entries.push(Statistic {
            label: label.into(),
            value,
        });
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.value)
    }

    /// Single-row table: one column per figure
    pub fn to_table(&self) -> Table {
        let labels: Vec<&str> = self.entries.iter().map(|s| s.label.as_str()).collect();
        let mut table = Table::with_columns("Summary Statistics", &labels);
        table
            .rows
            .push(self.entries.iter().map(|s| CellValue::Number(s.value)).collect());
        table
    }
}

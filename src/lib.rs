//! Talent Results - event results and competition analysis from Excel sheets
//!
//! This library loads uploaded score sheets, computes totals, competition
//! ranks, podium points and grouped leaderboards, and writes the results back
//! to Excel workbooks.
//!
//! # Features
//!
//! - Total marks and competition ("min") ranking with tie detection
//! - Configurable podium points for ranks 1-3
//! - Right join of results onto a participant roster by `Chest No`
//! - Top-N leaderboards by student, church, section or region
//! - Excel import (.xlsx, .xls) and multi-sheet export with charts
//!
//! # Example
//!
//! ```no_run
//! use talent_results::core::{calculate_total_and_rank, merge_with_master_data};
//! use talent_results::excel::{export_results, SheetImporter};
//! use talent_results::types::PointValues;
//!
//! let marks = SheetImporter::from_path("marks.xlsx").import()?;
//! let master = SheetImporter::from_path("roster.xlsx").import()?;
//!
//! let ranked = calculate_total_and_rank(&marks, Some(&PointValues::default()))?;
//! println!("Ties: {}", ranked.tie_groups.len());
//!
//! let merged = merge_with_master_data(&ranked.table, &master)?;
//! let bytes = export_results(&merged)?;
//! std::fs::write("Solo Song_results.xlsx", bytes)?;
//! # Ok::<(), talent_results::error::ResultsError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use error::{ResultsError, ResultsResult};
pub use types::{CellValue, Category, PointValues, SummaryStats, Table, TieGroup};

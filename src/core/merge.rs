//! Enrich computed marks with participant details from the master roster

use crate::error::{ResultsError, ResultsResult};
use crate::types::columns::{CHEST_NO, MARKS, POINTS, RANK, TIE_STATUS, TOTAL_MARKS};
use crate::types::{CellKey, CellValue, Table};
use std::collections::HashMap;
use tracing::debug;

/// Suffixes for non-key columns present in both tables
pub const MASTER_SUFFIX: &str = "_x";
pub const MARKS_SUFFIX: &str = "_y";

/// Marks columns carried into the merged sheet, in output order
fn result_columns(marks: &Table) -> ResultsResult<Vec<&'static str>> {
    let mut selected = Vec::new();
    for column in MARKS.into_iter().chain([TOTAL_MARKS, RANK]) {
        marks.require_column(column)?;
        selected.push(column);
    }
    selected.extend([POINTS, TIE_STATUS].into_iter().filter(|c| marks.has_column(c)));
    Ok(selected)
}

/// Right join of `marks` onto `master` by `Chest No`.
///
/// Every marks row appears in the output (once per matching roster row);
/// unmatched rows get blank roster fields. The result is sorted by
/// `total marks`, highest first.
pub fn merge_with_master_data(marks: &Table, master: &Table) -> ResultsResult<Table> {
    let (Some(marks_key), Some(master_key)) =
        (marks.column_index(CHEST_NO), master.column_index(CHEST_NO))
    else {
        return Err(ResultsError::missing_column(CHEST_NO, "one or both files"));
    };

    let selected = result_columns(marks)?;
    let selected_idx: Vec<usize> = selected
        .iter()
        .map(|c| marks.require_column(c))
        .collect::<ResultsResult<_>>()?;

    let mut columns: Vec<String> = master
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if idx != master_key && selected.contains(&name.as_str()) {
                format!("{}{}", name, MASTER_SUFFIX)
            } else {
                name.clone()
            }
        })
        .collect();
    columns.extend(selected.iter().map(|&name| {
        if master.has_column(name) {
            format!("{}{}", name, MARKS_SUFFIX)
        } else {
            name.to_string()
        }
    }));

    let mut roster: HashMap<CellKey, Vec<usize>> = HashMap::new();
    for (idx, row) in master.rows.iter().enumerate() {
        if let Some(key) = row[master_key].key() {
            roster.entry(key).or_default().push(idx);
        }
    }

    let mut merged = Table::with_columns(master.name.clone(), &columns);
    let mut unmatched = 0usize;
    for row in &marks.rows {
        let result_cells = selected_idx.iter().map(|&idx| row[idx].clone());
        let matches = row[marks_key].key().and_then(|key| roster.get(&key));
        match matches {
            Some(master_rows) => {
                for &master_idx in master_rows {
                    let mut cells = master.rows[master_idx].clone();
                    cells.extend(result_cells.clone());
                    merged.rows.push(cells);
                }
            }
            None => {
                unmatched += 1;
                let mut cells = vec![CellValue::Empty; master.width()];
                cells[master_key] = row[marks_key].clone();
                cells.extend(result_cells);
                merged.rows.push(cells);
            }
        }
    }

    let total_idx = master.width()
        + selected
            .iter()
            .position(|&c| c == TOTAL_MARKS)
            .unwrap_or_default();
    let totals = merged.numeric_column(&merged.columns[total_idx].clone())?;
    let mut order: Vec<usize> = (0..merged.row_count()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (totals[a].unwrap_or(0.0), totals[b].unwrap_or(0.0));
        b.total_cmp(&a)
    });
    merged.reorder(&order);

    debug!(
        rows = merged.row_count(),
        unmatched, "merged marks with master data"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::marks::calculate_total_and_rank;
    use crate::types::PointValues;
    use pretty_assertions::assert_eq;

    fn ranked_marks() -> Table {
        let mut marks = Table::with_columns("marks", &["Chest No", "mark1", "mark2", "mark3"]);
        marks
            .push_row(vec![101.0.into(), 60.0.into(), 70.0.into(), 80.0.into()])
            .unwrap();
        marks
            .push_row(vec![102.0.into(), 90.0.into(), CellValue::Empty, CellValue::Empty])
            .unwrap();
        marks
            .push_row(vec![103.0.into(), 95.0.into(), 20.0.into(), CellValue::Empty])
            .unwrap();
        calculate_total_and_rank(&marks, None).unwrap().table
    }

    fn roster() -> Table {
        let mut master = Table::with_columns("master", &["Chest No", "Name", "Church"]);
        master
            .push_row(vec![102.0.into(), "Anna".into(), "St. Mary".into()])
            .unwrap();
        master
            .push_row(vec![101.0.into(), "Ben".into(), "St. Paul".into()])
            .unwrap();
        master
            .push_row(vec![999.0.into(), "Not scored".into(), "St. Luke".into()])
            .unwrap();
        master
    }

    #[test]
    fn test_merge_columns_and_order() {
        let merged = merge_with_master_data(&ranked_marks(), &roster()).unwrap();
        assert_eq!(
            merged.columns,
            vec!["Chest No", "Name", "Church", "mark1", "mark2", "mark3", "total marks", "Rank"]
        );
        let chest: Vec<String> = merged.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(chest, vec!["101", "103", "102"]);
    }

    #[test]
    fn test_unmatched_marks_rows_are_kept_with_blank_details() {
        let merged = merge_with_master_data(&ranked_marks(), &roster()).unwrap();
        let row = merged.rows.iter().find(|r| r[0] == CellValue::Number(103.0)).unwrap();
        assert_eq!(row[1], CellValue::Empty);
        assert_eq!(row[2], CellValue::Empty);
        assert_eq!(row[6], CellValue::Number(115.0));
    }

    #[test]
    fn test_roster_only_rows_are_dropped() {
        let merged = merge_with_master_data(&ranked_marks(), &roster()).unwrap();
        assert_eq!(merged.row_count(), 3);
        assert!(merged.rows.iter().all(|r| r[1] != CellValue::from("Not scored")));
    }

    #[test]
    fn test_merge_matches_text_and_number_keys_by_value() {
        let mut master = Table::with_columns("master", &["Chest No", "Name"]);
        master.push_row(vec![101.0.into(), "Ben".into()]).unwrap();
        master.push_row(vec![" 102 ".into(), "Text key".into()]).unwrap();
        let merged = merge_with_master_data(&ranked_marks(), &master).unwrap();
        let ben = merged.rows.iter().find(|r| r[0] == CellValue::Number(101.0)).unwrap();
        assert_eq!(ben[1], CellValue::from("Ben"));
        // Text "102" does not match the numeric chest number 102
        let row = merged.rows.iter().find(|r| r[0] == CellValue::Number(102.0)).unwrap();
        assert_eq!(row[1], CellValue::Empty);
    }

    #[test]
    fn test_missing_key_in_master_is_rejected() {
        let master = Table::with_columns("master", &["ID", "Name"]);
        let err = merge_with_master_data(&ranked_marks(), &master).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Chest No column not found in one or both files"
        );
    }

    #[test]
    fn test_missing_key_in_marks_is_rejected() {
        let marks = Table::with_columns("marks", &["mark1"]);
        assert!(merge_with_master_data(&marks, &roster()).is_err());
    }

    #[test]
    fn test_duplicate_roster_keys_repeat_marks_row() {
        let mut master = roster();
        master
            .push_row(vec![101.0.into(), "Ben again".into(), "St. Paul".into()])
            .unwrap();
        let merged = merge_with_master_data(&ranked_marks(), &master).unwrap();
        assert_eq!(merged.row_count(), 4);
        let names: Vec<String> = merged
            .rows
            .iter()
            .filter(|r| r[0] == CellValue::Number(101.0))
            .map(|r| r[1].to_string())
            .collect();
        assert_eq!(names, vec!["Ben", "Ben again"]);
    }

    #[test]
    fn test_overlapping_columns_are_suffixed() {
        let mut master = Table::with_columns("master", &["Chest No", "Name", "Rank"]);
        master
            .push_row(vec![101.0.into(), "Ben".into(), "Senior".into()])
            .unwrap();
        let merged = merge_with_master_data(&ranked_marks(), &master).unwrap();
        assert_eq!(
            merged.columns,
            vec!["Chest No", "Name", "Rank_x", "mark1", "mark2", "mark3", "total marks", "Rank_y"]
        );
    }

    #[test]
    fn test_points_and_tie_status_are_carried() {
        let mut marks = Table::with_columns("marks", &["Chest No", "mark1"]);
        marks.push_row(vec![101.0.into(), 50.0.into()]).unwrap();
        marks.push_row(vec![102.0.into(), 50.0.into()]).unwrap();
        let ranked = calculate_total_and_rank(&marks, Some(&PointValues::default()))
            .unwrap()
            .table;
        let merged = merge_with_master_data(&ranked, &roster()).unwrap();
        assert!(merged.has_column("Points"));
        assert!(merged.has_column("Tie Status"));
        assert_eq!(merged.get(0, "Tie Status"), Some(&"Tied".into()));
    }
}

//! Totals, competition ranks, podium points and tie detection for a marks sheet

use crate::error::ResultsResult;
use crate::types::columns::{CHEST_NO, MARKS, POINTS, RANK, TIE_STATUS, TOTAL_MARKS};
use crate::types::{CellValue, PointValues, Table, TieGroup};
use serde::Serialize;
use tracing::{debug, warn};

/// Range a single mark is expected to fall in
pub const MIN_MARK: f64 = 0.0;
pub const MAX_MARK: f64 = 100.0;

pub const TIED: &str = "Tied";

/// A computed marks table together with the ties found in it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResults {
    pub table: Table,
    pub tie_groups: Vec<TieGroup>,
}

/// A mark outside [`MIN_MARK`]..=[`MAX_MARK`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkWarning {
    pub chest_no: CellValue,
    pub column: String,
    pub value: f64,
}

/// Columns a marks sheet must carry before results can be computed
pub fn required_columns(with_points: bool) -> Vec<&'static str> {
    let mut required = vec![CHEST_NO];
    required.extend(MARKS);
    required.extend([TOTAL_MARKS, RANK]);
    if with_points {
        required.extend([POINTS, TIE_STATUS]);
    }
    required
}

/// Append every missing required column as a blank column
pub fn prepare_marks_table(table: &mut Table, with_points: bool) {
    for column in required_columns(with_points) {
        table.ensure_column(column);
    }
}

/// Competition ("min") ranking: 1 + number of strictly greater totals
pub fn competition_ranks(totals: &[f64]) -> Vec<u32> {
    let mut descending = totals.to_vec();
    descending.sort_by(|a, b| b.total_cmp(a));
    totals
        .iter()
        .map(|&t| descending.partition_point(|&x| x > t) as u32 + 1)
        .collect()
}

/// Compute `total marks` and `Rank` (plus `Points` and `Tie Status` when
/// `points` is given) and sort the table by total, highest first.
///
/// Missing marks count as 0. Rows with equal totals keep their sheet order.
pub fn calculate_total_and_rank(
    table: &Table,
    points: Option<&PointValues>,
) -> ResultsResult<RankedResults> {
    let mut table = table.clone();
    prepare_marks_table(&mut table, points.is_some());

    let mut totals = vec![0.0; table.row_count()];
    for column in MARKS {
        for (total, mark) in totals.iter_mut().zip(table.numeric_column(column)?) {
            *total += mark.unwrap_or(0.0);
        }
    }
    let ranks = competition_ranks(&totals);

    let total_idx = table.require_column(TOTAL_MARKS)?;
    let rank_idx = table.require_column(RANK)?;
    for (row, (&total, &rank)) in totals.iter().zip(&ranks).enumerate() {
        table.set(row, total_idx, CellValue::Number(total));
        table.set(row, rank_idx, CellValue::Number(f64::from(rank)));
    }

    if let Some(points) = points {
        let points_idx = table.require_column(POINTS)?;
        for (row, &rank) in ranks.iter().enumerate() {
            table.set(row, points_idx, CellValue::Number(f64::from(points.for_rank(rank))));
        }
    }

    let mut order: Vec<usize> = (0..table.row_count()).collect();
    order.sort_by(|&a, &b| totals[b].total_cmp(&totals[a]));
    table.reorder(&order);

    let tie_groups = identify_ties(&table)?;
    if points.is_some() {
        mark_tied_rows(&mut table, &tie_groups)?;
    }

    debug!(
        rows = table.row_count(),
        ties = tie_groups.len(),
        "calculated totals and ranks"
    );

    Ok(RankedResults { table, tie_groups })
}

/// Totals shared by two or more participants, ignoring zero totals.
///
/// Groups are ordered by total, highest first; chest numbers keep table order.
pub fn identify_ties(table: &Table) -> ResultsResult<Vec<TieGroup>> {
    let chest_idx = table.require_column(CHEST_NO)?;
    let totals = table.numeric_column(TOTAL_MARKS)?;

    let mut groups: Vec<TieGroup> = Vec::new();
    for (row, total) in totals.iter().enumerate() {
        let Some(total) = total.filter(|t| *t > 0.0) else {
            continue;
        };
        let chest_no = table.rows[row][chest_idx].clone();
        match groups.iter_mut().find(|g| g.total == total) {
            Some(group) => group.chest_numbers.push(chest_no),
            None => groups.push(TieGroup {
                total,
                chest_numbers: vec![chest_no],
            }),
        }
    }

    groups.retain(|g| g.chest_numbers.len() > 1);
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    Ok(groups)
}

fn mark_tied_rows(table: &mut Table, tie_groups: &[TieGroup]) -> ResultsResult<()> {
    let status_idx = table.require_column(TIE_STATUS)?;
    let totals = table.numeric_column(TOTAL_MARKS)?;
    for (row, total) in totals.into_iter().enumerate() {
        let tied = total.is_some_and(|t| tie_groups.iter().any(|g| g.total == t));
        let status = if tied { TIED } else { "" };
        table.set(row, status_idx, CellValue::Text(status.to_string()));
    }
    Ok(())
}

/// Marks outside the accepted range; these are reported, never rejected
pub fn out_of_range_marks(table: &Table) -> ResultsResult<Vec<MarkWarning>> {
    let chest_idx = table.column_index(CHEST_NO);
    let mut warnings = Vec::new();
    for column in MARKS {
        if !table.has_column(column) {
            continue;
        }
        for (row, mark) in table.numeric_column(column)?.into_iter().enumerate() {
            let Some(value) = mark.filter(|m| !(MIN_MARK..=MAX_MARK).contains(m)) else {
                continue;
            };
            let chest_no = chest_idx
                .map(|idx| table.rows[row][idx].clone())
                .unwrap_or_default();
            warn!(chest_no = %chest_no, column, value, "mark out of range");
            warnings.push(MarkWarning {
                chest_no,
                column: column.to_string(),
                value,
            });
        }
    }
    Ok(warnings)
}

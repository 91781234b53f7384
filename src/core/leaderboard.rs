//! Grouped top-N leaderboards and summary statistics

use crate::error::ResultsResult;
use crate::types::columns::{CHURCH, ID_NO, POINTS};
use crate::types::{CellKey, CellValue, Category, SummaryStats, Table};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const DEFAULT_TOP_N: usize = 5;

struct Group {
    cells: Vec<CellValue>,
    points: Vec<Option<f64>>,
}

/// Group rows by the category's key columns, in order of first appearance.
/// Rows with a blank cell in any key column are dropped.
fn group_rows(table: &Table, category: Category) -> ResultsResult<Vec<Group>> {
    let key_idx: Vec<usize> = category
        .group_columns()
        .iter()
        .map(|c| table.require_column(c))
        .collect::<ResultsResult<_>>()?;
    let points = table.numeric_column(POINTS)?;

    let mut index: HashMap<Vec<Option<CellKey>>, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    for (row, row_points) in table.rows.iter().zip(points) {
        let key: Vec<Option<CellKey>> = key_idx.iter().map(|&i| row[i].key()).collect();
        if key.iter().any(Option::is_none) {
            continue;
        }
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                cells: key_idx.iter().map(|&i| row[i].clone()).collect(),
                points: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].points.push(row_points);
    }
    Ok(groups)
}

/// Top `n` groups by summed `Points`, highest first.
///
/// Missing points count as 0; groups with equal sums keep first-appearance order.
pub fn get_top_performers(table: &Table, category: Category, n: usize) -> ResultsResult<Table> {
    let groups = group_rows(table, category)?;

    let mut ranked: Vec<(Vec<CellValue>, f64)> = groups
        .into_iter()
        .map(|g| {
            let sum: f64 = g.points.iter().flatten().sum();
            (g.cells, sum)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);

    let mut columns: Vec<&str> = category.group_columns().to_vec();
    columns.push(POINTS);
    let mut top = Table::with_columns("Top Performers", &columns);
    top.rows = ranked
        .into_iter()
        .map(|(mut cells, sum)| {
            cells.push(CellValue::Number(sum));
            cells
        })
        .collect();

    debug!(category = %category, rows = top.row_count(), "computed top performers");
    Ok(top)
}

fn distinct_count(table: &Table, column: &str) -> ResultsResult<usize> {
    let idx = table.require_column(column)?;
    Ok(table
        .rows
        .iter()
        .filter_map(|row| row[idx].key())
        .collect::<HashSet<_>>()
        .len())
}

/// Mean over groups of each group's mean points; groups without points are skipped
fn average_points_per_group(table: &Table, category: Category) -> ResultsResult<f64> {
    let means: Vec<f64> = group_rows(table, category)?
        .iter()
        .filter_map(|g| {
            let present: Vec<f64> = g.points.iter().flatten().copied().collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            }
        })
        .collect();
    if means.is_empty() {
        return Ok(0.0);
    }
    Ok(means.iter().sum::<f64>() / means.len() as f64)
}

/// Two decimals, halves to even
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Headline figures for the selected category
pub fn summary_statistics(table: &Table, category: Category) -> ResultsResult<SummaryStats> {
    let mut stats = SummaryStats::default();
    match category {
        Category::Student => {
            stats.push(
                format!("Total {}", Category::Student.plural()),
                distinct_count(table, ID_NO)? as f64,
            );
            stats.push(
                format!("Total {}", Category::Church.plural()),
                distinct_count(table, CHURCH)? as f64,
            );
        }
        other => {
            let column = other.label_column();
            stats.push(
                format!("Total {}", other.plural()),
                distinct_count(table, column)? as f64,
            );
            stats.push(
                format!("Average Points per {}", other),
                round2(average_points_per_group(table, other)?),
            );
        }
    }
    Ok(stats)
}

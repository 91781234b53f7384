//! End-to-end tests: marks sheet → ranked results → roster merge → workbook → leaderboard

use pretty_assertions::assert_eq;
use talent_results::core::{
    calculate_total_and_rank, get_top_performers, identify_ties, merge_with_master_data,
    summary_statistics,
};
use talent_results::excel::{export_results, SheetImporter, WorkbookExporter};
use talent_results::types::{CellValue, Category, PointValues, Table};
use tempfile::TempDir;

/// 40 participants with a deterministic spread of marks, gaps and repeats
fn generated_marks() -> Table {
    let mut marks = Table::with_columns("marks", &["Chest No", "mark1", "mark2", "mark3"]);
    for i in 0..40u32 {
        let mark = |seed: u32| -> CellValue {
            match (i * 7 + seed * 13) % 11 {
                0 => CellValue::Empty,
                v => CellValue::Number(f64::from(v * 9 % 100)),
            }
        };
        marks
            .push_row(vec![f64::from(200 + i).into(), mark(1), mark(2), mark(3)])
            .unwrap();
    }
    marks
}

fn column(table: &Table, name: &str) -> Vec<f64> {
    table
        .numeric_column(name)
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// RANKING PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_rank_is_one_plus_strictly_greater_totals() {
    let ranked = calculate_total_and_rank(&generated_marks(), None).unwrap();
    let totals = column(&ranked.table, "total marks");
    let ranks = column(&ranked.table, "Rank");

    for (total, rank) in totals.iter().zip(&ranks) {
        let greater = totals.iter().filter(|t| *t > total).count();
        assert_eq!(*rank, (greater + 1) as f64);
    }
    // Sorted highest total first
    assert!(totals.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(ranks[0], 1.0);
}

#[test]
fn test_total_is_sum_of_present_marks() {
    let marks = generated_marks();
    let ranked = calculate_total_and_rank(&marks, None).unwrap();

    for row in 0..ranked.table.row_count() {
        let sum: f64 = ["mark1", "mark2", "mark3"]
            .iter()
            .filter_map(|c| ranked.table.get(row, c).and_then(|v| v.to_number().unwrap()))
            .sum();
        let total = ranked.table.get(row, "total marks").unwrap();
        assert_eq!(total, &CellValue::Number(sum));
    }
}

#[test]
fn test_points_follow_rank() {
    let points = PointValues {
        first: 10,
        second: 7,
        third: 4,
    };
    let ranked = calculate_total_and_rank(&generated_marks(), Some(&points)).unwrap();
    let ranks = column(&ranked.table, "Rank");
    let awarded = column(&ranked.table, "Points");

    for (rank, award) in ranks.iter().zip(&awarded) {
        let expected = match *rank as u32 {
            1 => 10.0,
            2 => 7.0,
            3 => 4.0,
            _ => 0.0,
        };
        assert_eq!(*award, expected);
    }
}

#[test]
fn test_tie_groups_cover_every_shared_positive_total() {
    let ranked = calculate_total_and_rank(&generated_marks(), Some(&PointValues::default()))
        .unwrap();
    let totals = column(&ranked.table, "total marks");

    for group in &ranked.tie_groups {
        assert!(group.total > 0.0);
        let count = totals.iter().filter(|t| **t == group.total).count();
        assert_eq!(group.chest_numbers.len(), count);
    }
    for (row, total) in totals.iter().enumerate() {
        let shared = *total > 0.0 && totals.iter().filter(|t| *t == total).count() > 1;
        let status = ranked.table.get(row, "Tie Status").unwrap();
        let expected: CellValue = if shared { "Tied".into() } else { "".into() };
        assert_eq!(status, &expected);
    }
    assert_eq!(identify_ties(&ranked.table).unwrap(), ranked.tie_groups);
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKFLOWS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_two_participant_event() {
    let mut marks = Table::with_columns("marks", &["Chest No", "mark1", "mark2", "mark3"]);
    marks
        .push_row(vec![1.0.into(), 60.0.into(), 70.0.into(), 80.0.into()])
        .unwrap();
    marks
        .push_row(vec![2.0.into(), 90.0.into(), 0.0.into(), 0.0.into()])
        .unwrap();

    let ranked = calculate_total_and_rank(&marks, None).unwrap();
    assert_eq!(column(&ranked.table, "total marks"), vec![210.0, 90.0]);
    assert_eq!(column(&ranked.table, "Rank"), vec![1.0, 2.0]);
    assert!(ranked.tie_groups.is_empty());
}

#[test]
fn test_marks_to_merged_workbook() {
    let dir = TempDir::new().unwrap();
    let marks_path = dir.path().join("marks.xlsx");
    let roster_path = dir.path().join("roster.xlsx");

    WorkbookExporter::new()
        .add_table("Sheet1", &generated_marks())
        .save(&marks_path)
        .unwrap();

    let mut roster = Table::with_columns("roster", &["Chest No", "Student Name", "Church"]);
    for i in 0..40u32 {
        roster
            .push_row(vec![
                f64::from(200 + i).into(),
                format!("Student {}", i).into(),
                format!("Church {}", i % 4).into(),
            ])
            .unwrap();
    }
    WorkbookExporter::new()
        .add_table("Sheet1", &roster)
        .save(&roster_path)
        .unwrap();

    let marks = SheetImporter::from_path(&marks_path).import().unwrap();
    let master = SheetImporter::from_path(&roster_path).import().unwrap();
    let ranked = calculate_total_and_rank(&marks, Some(&PointValues::default())).unwrap();
    let merged = merge_with_master_data(&ranked.table, &master).unwrap();

    assert_eq!(merged.row_count(), 40);
    assert_eq!(&merged.columns[..3], &["Chest No", "Student Name", "Church"]);
    assert!(merged.rows.iter().all(|r| !r[1].is_empty()));
    assert_eq!(
        column(&merged, "total marks"),
        column(&ranked.table, "total marks")
    );

    let output = dir.path().join("Solo_results.xlsx");
    std::fs::write(&output, export_results(&merged).unwrap()).unwrap();
    let reloaded = SheetImporter::from_path(&output).import().unwrap();
    assert_eq!(reloaded.columns, merged.columns);
    assert_eq!(column(&reloaded, "Rank"), column(&merged, "Rank"));
}

#[test]
fn test_results_feed_church_leaderboard() {
    let ranked = calculate_total_and_rank(&generated_marks(), Some(&PointValues::default()))
        .unwrap();
    let mut roster = Table::with_columns("roster", &["Chest No", "Church"]);
    for i in 0..40u32 {
        roster
            .push_row(vec![
                f64::from(200 + i).into(),
                format!("Church {}", i % 4).into(),
            ])
            .unwrap();
    }
    let merged = merge_with_master_data(&ranked.table, &roster).unwrap();

    let top = get_top_performers(&merged, Category::Church, 3).unwrap();
    assert_eq!(top.columns, vec!["Church", "Points"]);
    assert_eq!(top.row_count(), 3);
    let sums = column(&top, "Points");
    assert!(sums.windows(2).all(|w| w[0] >= w[1]));

    let all_points: f64 = column(&merged, "Points").iter().sum();
    let every_church = get_top_performers(&merged, Category::Church, 10).unwrap();
    assert_eq!(every_church.row_count(), 4);
    assert_eq!(column(&every_church, "Points").iter().sum::<f64>(), all_points);

    let summary = summary_statistics(&merged, Category::Church).unwrap();
    assert_eq!(summary.get("Total Churches"), Some(4.0));
}

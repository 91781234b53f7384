use crate::core::{
    calculate_total_and_rank, get_top_performers, merge_with_master_data, out_of_range_marks,
    summary_statistics, BarChart,
};
use crate::error::ResultsResult;
use crate::excel::{
    export_top_performers, results_file_name, top_file_name, SheetImporter, WorkbookExporter,
    RESULTS_SHEET,
};
use crate::types::{format_number, Category, PointValues, SummaryStats, Table, TieGroup};
use colored::Colorize;
use std::path::PathBuf;

/// Rows of the roster shown as a preview in verbose mode
const MASTER_PREVIEW_ROWS: usize = 5;
const CHART_WIDTH: usize = 40;

/// Options for the `results` command
#[derive(Debug, Clone)]
pub struct ResultsOptions {
    pub marks: PathBuf,
    pub master: Option<PathBuf>,
    pub event_name: Option<String>,
    /// `None` disables the Points and Tie Status columns
    pub points: Option<PointValues>,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Options for the `top` command
#[derive(Debug, Clone)]
pub struct TopOptions {
    pub file: PathBuf,
    pub category: Category,
    pub title: String,
    pub count: usize,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Render a table as aligned text columns
pub fn format_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            cells
                .iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, &w)| format!("{:<w$}", name))
        .collect();
    let mut out = format!("   {}\n", header.join("  ").bold());
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<w$}", cell))
            .collect();
        out.push_str(&format!("   {}\n", line.join("  ").trim_end()));
    }
    out
}

fn print_tie_information(tie_groups: &[TieGroup]) {
    if tie_groups.is_empty() {
        println!(
            "{}",
            "✅ No ties detected in the results (excluding entries with 0 marks).".green()
        );
        return;
    }
    println!("{}", "⚠️  Ties Detected!".bold().yellow());
    println!("   The following participants have tied scores:");
    for group in tie_groups {
        let chest_numbers: Vec<String> = group.chest_numbers.iter().map(|c| c.to_string()).collect();
        println!("   Total Mark: {}", format_number(group.total).bold());
        println!("   Tied Chest Numbers: {}", chest_numbers.join(", "));
        println!("   ---");
    }
}

fn print_points_summary(points: &PointValues) {
    println!("{}", "🏅 Points Distribution:".bold().cyan());
    println!("   Rank 1: {} points", points.first);
    println!("   Rank 2: {} points", points.second);
    println!("   Rank 3: {} points", points.third);
    println!("   Other ranks: 0 points");
}

fn print_summary(summary: &SummaryStats) {
    println!("{}", "📐 Summary Statistics:".bold().cyan());
    for stat in &summary.entries {
        println!("   {}: {}", stat.label, format_number(stat.value).bold());
    }
}

/// Execute the results command
pub fn results(options: ResultsOptions) -> ResultsResult<()> {
    println!("{}", "🏆 Event Results Calculator".bold().green());
    println!("   Marks:  {}", options.marks.display());
    if let Some(master) = &options.master {
        println!("   Master: {}", master.display());
    }
    println!();

    // The file name is needed up front so a missing event name fails before any work
    let file_name = if options.dry_run {
        None
    } else {
        Some(results_file_name(
            options.event_name.as_deref().unwrap_or_default(),
        )?)
    };

    if options.verbose {
        println!("{}", "📖 Reading marks sheet...".cyan());
    }
    let marks = SheetImporter::from_path(&options.marks).import()?;
    if options.verbose {
        println!(
            "   Found {} participants, {} columns\n",
            marks.row_count(),
            marks.width()
        );
    }

    for warning in out_of_range_marks(&marks)? {
        println!(
            "{}",
            format!(
                "⚠️  Chest No {}: {} = {} is outside 0-100",
                warning.chest_no,
                warning.column,
                format_number(warning.value)
            )
            .yellow()
        );
    }

    let ranked = calculate_total_and_rank(&marks, options.points.as_ref())?;
    print_tie_information(&ranked.tie_groups);
    println!();

    println!("{}", "✅ Results calculated!".bold().green());
    print!("{}", format_table(&ranked.table));
    println!();

    if let Some(points) = &options.points {
        print_points_summary(points);
        println!();
    }

    let final_table = match &options.master {
        Some(master_path) => {
            let master = SheetImporter::from_path(master_path).import()?;
            if options.verbose {
                println!("{}", "📋 Preview of Master Data:".cyan());
                print!("{}", format_table(&master.head(MASTER_PREVIEW_ROWS)));
                println!();
            }
            merge_with_master_data(&ranked.table, &master)?
        }
        None => ranked.table,
    };

    match file_name {
        Some(file_name) => {
            let output = options.output_dir.join(file_name);
            WorkbookExporter::new()
                .add_table(RESULTS_SHEET, &final_table)
                .save(&output)?;
            println!("{}", "💾 Results saved!".bold().green());
            println!("   Excel file: {}", output.display());
        }
        None => println!("{}", "📋 Dry run complete - no file written".yellow()),
    }

    Ok(())
}

/// Execute the ties command
pub fn ties(marks: PathBuf) -> ResultsResult<()> {
    println!("{}", "🔍 Tie Check".bold().green());
    println!("   Marks: {}\n", marks.display());

    let table = SheetImporter::from_path(&marks).import()?;
    let ranked = calculate_total_and_rank(&table, None)?;
    print_tie_information(&ranked.tie_groups);
    Ok(())
}

/// Execute the top command
pub fn top(options: TopOptions) -> ResultsResult<()> {
    println!("{}", "📊 Competition Analysis Dashboard".bold().green());
    println!("   Title:    {}", options.title);
    println!("   File:     {}", options.file.display());
    println!("   Category: {}\n", options.category.to_string().bright_blue());

    let table = SheetImporter::from_path(&options.file).import()?;
    if options.verbose {
        println!("   Found {} rows\n", table.row_count());
    }

    let top = get_top_performers(&table, options.category, options.count)?;
    println!(
        "{}",
        format!("🏆 Top {} {}s", options.count, options.category)
            .bold()
            .green()
    );
    print!("{}", format_table(&top));
    println!();

    let chart = BarChart::from_top_performers(&top, options.category)?;
    print!("{}", chart.render_text(CHART_WIDTH));
    println!();

    let summary = summary_statistics(&table, options.category)?;
    print_summary(&summary);
    println!();

    if options.dry_run {
        println!("{}", "📋 Dry run complete - no file written".yellow());
        return Ok(());
    }

    let output = options
        .output_dir
        .join(top_file_name(&options.title, options.category));
    let bytes = export_top_performers(&top, &chart, &summary)?;
    std::fs::write(&output, bytes)?;
    println!("{}", "💾 Results saved!".bold().green());
    println!("   Excel file: {}", output.display());

    Ok(())
}

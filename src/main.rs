use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use talent_results::cli::{self, ResultsOptions, TopOptions};
use talent_results::core::DEFAULT_TOP_N;
use talent_results::error::ResultsResult;
use talent_results::excel::DEFAULT_TITLE;
use talent_results::types::{Category, PointValues};

#[derive(Parser)]
#[command(name = "talent")]
#[command(about = "Event results calculator: totals, ranks, points and top performers from Excel sheets.")]
#[command(long_about = "talent - Event results from Excel score sheets

COMMANDS:
  results  - Total marks, competition ranks and podium points, merged with a roster
  ties     - List participants sharing the same non-zero total
  top      - Top 5 students, churches, sections or regions by points

EXAMPLES:
  talent results marks.xlsx --event \"Solo Song\"
  talent results marks.xlsx --master roster.xlsx --event \"Solo Song\" --first 10
  talent top results.xlsx --category church --title \"Talent Fest 2024\"

Set RUST_LOG=debug for diagnostic logging.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Calculate event results from a marks entry sheet.

The marks sheet needs a 'Chest No' column and up to three mark columns
('mark1', 'mark2', 'mark3'). Missing columns are added, missing marks count as 0.

  total marks = mark1 + mark2 + mark3
  Rank        = 1 + number of participants with a higher total (ties share a rank)
  Points      = podium points for ranks 1-3 (disable with --no-points)
  Tie Status  = 'Tied' when the total is shared with another participant

With --master the results are merged onto the participant roster by 'Chest No'.
The workbook is written as '<EVENT>_results.xlsx' in the output directory.")]
    /// Calculate totals, ranks and points for an event
    Results {
        /// Marks entry sheet (.xlsx or .xls)
        marks: PathBuf,

        /// Master data sheet with participant details (.xlsx or .xls)
        #[arg(short, long)]
        master: Option<PathBuf>,

        /// Event name, used for the output file name
        #[arg(short, long)]
        event: Option<String>,

        /// Points for 1st place
        #[arg(long, default_value = "5")]
        first: u32,

        /// Points for 2nd place
        #[arg(long, default_value = "3")]
        second: u32,

        /// Points for 3rd place
        #[arg(long, default_value = "1")]
        third: u32,

        /// Omit the Points and Tie Status columns
        #[arg(long)]
        no_points: bool,

        /// Directory the workbook is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Calculate and display without writing a file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show verbose steps (including a roster preview)
        #[arg(short, long)]
        verbose: bool,
    },

    /// List tied totals in a marks sheet
    Ties {
        /// Marks entry sheet (.xlsx or .xls)
        marks: PathBuf,
    },

    #[command(long_about = "Rank groups of a competition sheet by total points.

The sheet needs 'Points' plus the grouping columns:
  student  - 'ID No', 'Student Name', 'Church', 'Section', 'Region'
  church   - 'Church'
  section  - 'Section'
  region   - 'Region'

Prints the top performers, a bar chart and summary statistics, and writes
'<TITLE>_<Category>_results.xlsx' with 'Top Performers' and 'Summary Statistics' sheets.")]
    /// Show top performers by category
    Top {
        /// Competition sheet (.xlsx or .xls)
        file: PathBuf,

        /// student, church, section or region
        #[arg(short, long, default_value = "student")]
        category: Category,

        /// Competition title, used for the output file name
        #[arg(short, long, default_value = DEFAULT_TITLE)]
        title: String,

        /// Number of groups to show
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        count: usize,

        /// Directory the workbook is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Display without writing a file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,
    },
}

fn run(cli: Cli) -> ResultsResult<()> {
    match cli.command {
        Commands::Results {
            marks,
            master,
            event,
            first,
            second,
            third,
            no_points,
            output_dir,
            dry_run,
            verbose,
        } => cli::results(ResultsOptions {
            marks,
            master,
            event_name: event,
            points: (!no_points).then_some(PointValues {
                first,
                second,
                third,
            }),
            output_dir,
            dry_run,
            verbose,
        }),

        Commands::Ties { marks } => cli::ties(marks),

        Commands::Top {
            file,
            category,
            title,
            count,
            output_dir,
            dry_run,
            verbose,
        } => cli::top(TopOptions {
            file,
            category,
            title,
            count,
            output_dir,
            dry_run,
            verbose,
        }),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "error".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {}", "❌ An error occurred:".bold().red(), e);
        eprintln!("   Please make sure your Excel files have the correct format");
        std::process::exit(1);
    }
}

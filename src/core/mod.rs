//! Results engine: totals and ranks, roster merge, leaderboards and charts

pub mod chart;
pub mod leaderboard;
pub mod marks;
pub mod merge;

pub use chart::BarChart;
pub use leaderboard::{get_top_performers, summary_statistics, DEFAULT_TOP_N};
pub use marks::{calculate_total_and_rank, identify_ties, out_of_range_marks, RankedResults};
pub use merge::merge_with_master_data;

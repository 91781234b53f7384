//! Bar chart model for top performers

use crate::error::ResultsResult;
use crate::types::columns::{CHURCH, POINTS, REGION, SECTION};
use crate::types::{Category, Table};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Extra (column, value) pairs shown alongside the bar
    pub details: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub label_column: String,
    pub value_column: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Chart of a top-performers table; students are labelled by name and
    /// carry church, section and region as details
    pub fn from_top_performers(top: &Table, category: Category) -> ResultsResult<Self> {
        let label_column = category.label_column();
        let values = top.numeric_column(POINTS)?;
        let label_idx = top.require_column(label_column)?;
        let detail_columns: &[&str] = match category {
            Category::Student => &[CHURCH, SECTION, REGION],
            _ => &[],
        };
        let detail_idx: Vec<(&str, usize)> = detail_columns
            .iter()
            .map(|&c| top.require_column(c).map(|idx| (c, idx)))
            .collect::<ResultsResult<_>>()?;

        let bars = top
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| Bar {
                label: row[label_idx].to_string(),
                value: value.unwrap_or(0.0),
                details: detail_idx
                    .iter()
                    .map(|&(name, idx)| (name.to_string(), row[idx].to_string()))
                    .collect(),
            })
            .collect();

        Ok(Self {
            title: format!("Top 5 {}s by Points", category),
            label_column: label_column.to_string(),
            value_column: POINTS.to_string(),
            bars,
        })
    }

    /// Horizontal text rendering, bars scaled so the largest value spans `width`
    pub fn render_text(&self, width: usize) -> String {
        let mut out = format!("{}\n", self.title);
        if self.bars.is_empty() {
            out.push_str("  (no data)\n");
            return out;
        }

        let label_width = self
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0);
        let max = self.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);

        for bar in &self.bars {
            let len = if max > 0.0 && bar.value > 0.0 {
                ((bar.value / max) * width as f64).round().max(1.0) as usize
            } else {
                0
            };
            out.push_str(&format!(
                "  {:<label_width$} │{} {:.1}",
                bar.label,
                "█".repeat(len),
                bar.value,
            ));
            if !bar.details.is_empty() {
                let details: Vec<String> = bar
                    .details
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect();
                out.push_str(&format!("  ({})", details.join(", ")));
            }
            out.push('\n');
        }
        out
    }
}

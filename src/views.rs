//! Chart views over the analysis table
//!
//! Five independent, read-only views:
//! - Views by time of day
//! - Views by season
//! - Weekend vs weekday views
//! - Monthly views
//! - Hourly views
//!
//! Records whose time-derived fields are empty are left out of every view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{AnalysisTable, Season, TimeOfDay};

/// How a view is meant to be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Count,
    Bar,
    Line,
}

/// One labelled count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub count: usize,
}

/// A finished view, ready to be drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartView {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub bars: Vec<Bar>,
}

impl ChartView {
    fn new(title: &str, x_label: &str, y_label: &str, kind: ChartKind, bars: Vec<Bar>) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            kind,
            bars,
        }
    }

    pub fn total(&self) -> usize {
        self.bars.iter().map(|b| b.count).sum()
    }
}

fn bar(label: impl Into<String>, count: usize) -> Bar {
    Bar {
        label: label.into(),
        count,
    }
}

/// Distribution of views by time of day
pub fn time_of_day_view(table: &AnalysisTable) -> ChartView {
    let bars = TimeOfDay::ALL
        .iter()
        .map(|bucket| {
            let count = table
                .records
                .iter()
                .filter(|r| r.time_of_day == Some(*bucket))
                .count();
            bar(bucket.as_str(), count)
        })
        .collect();

    ChartView::new(
        "Distribution of Views by Time of Day",
        "Time of Day",
        "Count of Views",
        ChartKind::Count,
        bars,
    )
}

/// Views by season
pub fn season_view(table: &AnalysisTable) -> ChartView {
    let bars = Season::ALL
        .iter()
        .map(|season| {
            let count = table
                .records
                .iter()
                .filter(|r| r.season == Some(*season))
                .count();
            bar(season.as_str(), count)
        })
        .collect();

    ChartView::new("Views by Season", "Season", "Count of Views", ChartKind::Count, bars)
}

/// Views on weekends vs weekdays
pub fn weekend_view(table: &AnalysisTable) -> ChartView {
    let weekend = table.records.iter().filter(|r| r.weekend == Some(true)).count();
    let weekday = table.records.iter().filter(|r| r.weekend == Some(false)).count();

    ChartView::new(
        "Views on Weekends vs Weekdays",
        "Is Weekend?",
        "Count of Views",
        ChartKind::Count,
        vec![bar("Weekday", weekday), bar("Weekend", weekend)],
    )
}

/// Views per month number, months without views omitted
pub fn monthly_view(table: &AnalysisTable) -> ChartView {
    let bars = grouped_counts(table.records.iter().filter_map(|r| r.month));
    ChartView::new("Monthly Views", "Month", "Number of Views", ChartKind::Bar, bars)
}

/// Views per hour of day, hours without views omitted
pub fn hourly_view(table: &AnalysisTable) -> ChartView {
    let bars = grouped_counts(table.records.iter().filter_map(|r| r.hour));
    ChartView::new("Hourly Views", "Hour of Day", "Number of Views", ChartKind::Line, bars)
}

fn grouped_counts(keys: impl Iterator<Item = u32>) -> Vec<Bar> {
    let mut groups: BTreeMap<u32, usize> = BTreeMap::new();
    for key in keys {
        *groups.entry(key).or_insert(0) += 1;
    }
    groups
        .into_iter()
        .map(|(key, count)| bar(key.to_string(), count))
        .collect()
}

/// All five views in display order
pub fn all_views(table: &AnalysisTable) -> Vec<ChartView> {
    vec![
        time_of_day_view(table),
        season_view(table),
        weekend_view(table),
        monthly_view(table),
        hourly_view(table),
    ]
}

/// Draw a view as a horizontal bar chart, bars scaled to at most `width` cells
pub fn render_text(view: &ChartView, width: usize) -> String {
    let mut out = String::new();
    out.push_str(&view.title);
    out.push('\n');
    out.push_str(&"=".repeat(view.title.chars().count()));
    out.push('\n');
    out.push_str(&format!("{} / {}\n", view.x_label, view.y_label));

    if view.bars.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let label_width = view
        .bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0);
    let max_count = view.bars.iter().map(|b| b.count).max().unwrap_or(0);

    for b in &view.bars {
        let cells = if max_count == 0 {
            0
        } else {
            // Round so that any non-zero count is visible
            (b.count * width).div_ceil(max_count)
        };
        out.push_str(&format!(
            "  {:>label_width$} | {} {}\n",
            b.label,
            "#".repeat(cells),
            b.count
        ));
    }

    out
}

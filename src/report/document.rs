use chrono::NaiveDateTime;

use crate::storage::entities::LogEntry;

use super::{
    charts::{
        bar_rows, distribution_rows, heatmap_rows, trend_rows, ChartWindow, DistributionStyle,
        TREND_WINDOW,
    },
    labels::{productivity_label, sleep_label},
    normalize::{normalize, EveningPart, MorningPart, NormalizedLogEntry},
    statistics::{aggregate, format_tenth, AggregateStatistics},
};

/// Number of days listed under recent entries.
pub const RECENT_ENTRIES: usize = 30;

const NO_DATA_PLACEHOLDER: &str = "*There is no data yet. Start logging to see statistics!*";

const SECTION_RULE: &str = "\n---\n\n";

/// Builds the overview document. Output only depends on `logs` and `generated_at`.
pub fn build_document(logs: &[LogEntry], generated_at: NaiveDateTime) -> String {
    OverviewBuilder::new(logs, generated_at).build()
}

/// Renders the overview section by section. Every section method returns finished Markdown ending
/// with a blank line.
pub struct OverviewBuilder {
    /// Input order, which decides ties between equally rated days.
    entries: Vec<NormalizedLogEntry>,
    statistics: Option<AggregateStatistics>,
    generated_at: NaiveDateTime,
}

impl OverviewBuilder {
    pub fn new(logs: &[LogEntry], generated_at: NaiveDateTime) -> Self {
        let entries = normalize(logs);
        let statistics = aggregate(&entries);
        Self {
            entries,
            statistics,
            generated_at,
        }
    }

    pub fn header(&self) -> String {
        format!(
            "# 📊 Life Log Overview\n\n*Last updated: {}*\n\n",
            self.generated_at.format("%B %-d, %Y %-I:%M %p")
        )
    }

    pub fn statistics_section(&self) -> String {
        let mut content = String::from("## 📈 Statistics\n\n");
        let Some(statistics) = &self.statistics else {
            content.push_str(NO_DATA_PLACEHOLDER);
            content.push('\n');
            return content;
        };

        let mut rows = vec![
            (
                "📅 Total Logged Days",
                statistics.total_logged_days.to_string(),
            ),
            (
                "⭐ Average Day Rating",
                format!("{}/10", format_tenth(statistics.avg_day_rating)),
            ),
            (
                "🎯 Average Productivity",
                out_of_five(statistics.avg_productivity),
            ),
            (
                "😴 Average Sleep Quality",
                out_of_five(statistics.avg_sleep_quality),
            ),
            (
                "✅ Total Tasks Completed",
                statistics.total_tasks_completed.to_string(),
            ),
            ("📊 Tasks Per Day", format_tenth(statistics.tasks_per_day)),
            (
                "🌟 Best Day",
                format!(
                    "{} ({}/10)",
                    statistics.best_day.date.format("%b %-d, %Y"),
                    statistics.best_day.day_rating
                ),
            ),
        ];
        if let Some(worst) = statistics.worst_day {
            rows.push((
                "😔 Worst Day",
                format!(
                    "{} ({}/10)",
                    worst.date.format("%b %-d, %Y"),
                    worst.day_rating
                ),
            ));
        }

        content.push_str("| Metric | Value |\n|--------|-------|\n");
        for (metric, value) in rows {
            content.push_str(&format!("| {metric} | {value} |\n"));
        }
        content
    }

    /// `None` when there is no rated day to chart.
    pub fn charts_section(&self) -> Option<String> {
        let window = ChartWindow::new(&self.entries, TREND_WINDOW);
        if window.is_empty() {
            return None;
        }

        let day_ratings = window.day_ratings();
        let rating_values = day_ratings
            .points
            .iter()
            .map(|v| v.value as u8)
            .collect::<Vec<_>>();
        let sleep_values = newest_first_sleep(&self.entries);

        let charts = [
            (
                "⭐ Day Rating Trend (Last 30 Days)",
                trend_rows(&day_ratings),
            ),
            (
                "🎯 Productivity Levels (Last 30 Days)",
                bar_rows(&window.productivity()),
            ),
            (
                "😴 Sleep Quality Distribution",
                distribution_rows(&sleep_values, &DistributionStyle::SLEEP),
            ),
            (
                "✅ Task Completion (Last 7 Days)",
                heatmap_rows(&window.recent_tasks()),
            ),
            (
                "📊 Day Rating Distribution",
                distribution_rows(&rating_values, &DistributionStyle::DAY_RATING),
            ),
        ];

        let mut content = String::from("## 📊 Visual Charts\n\n");
        for (title, rows) in charts.iter().filter(|(_, rows)| !rows.is_empty()) {
            content.push_str(&format!("### {title}\n\n```\n{}\n```\n\n", rows.join("\n")));
        }
        Some(content)
    }

    pub fn recent_entries_section(&self) -> String {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        let mut content = String::from("## 📝 Recent Entries\n\n");
        for entry in entries.iter().take(RECENT_ENTRIES) {
            content.push_str(&format!("### {}\n\n", entry.date.format("%A, %B %-d, %Y")));
            if let Some(morning) = &entry.morning {
                content.push_str(&morning_block(morning));
            }
            if let Some(evening) = &entry.evening {
                content.push_str(&evening_block(evening));
            }
            content.push_str("---\n\n");
        }
        content
    }

    pub fn build(&self) -> String {
        let mut content = self.header();
        content.push_str(&self.statistics_section());
        content.push_str(SECTION_RULE);
        if self.statistics.is_some() {
            if let Some(charts) = self.charts_section() {
                content.push_str(&charts);
                content.push_str(SECTION_RULE);
            }
        }
        content.push_str(&self.recent_entries_section());
        content
    }
}

fn out_of_five(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{}/5", format_tenth(v)))
}

/// Sleep values of the most recent entries that have one.
fn newest_first_sleep(entries: &[NormalizedLogEntry]) -> Vec<u8> {
    let mut sleep = entries
        .iter()
        .filter_map(|v| v.sleep_quality().map(|sleep| (v.date, sleep)))
        .collect::<Vec<_>>();
    sleep.sort_by(|a, b| b.0.cmp(&a.0));
    sleep.into_iter().take(TREND_WINDOW).map(|v| v.1).collect()
}

fn morning_block(morning: &MorningPart) -> String {
    let mut content = String::from("**Morning Entry:**\n");
    if let Some(sleep) = morning.sleep_quality {
        content.push_str(&format!("- Sleep Quality: {}\n", sleep_label(sleep)));
    }
    if let Some(grateful_for) = &morning.grateful_for {
        content.push_str(&format!("- Grateful For: {grateful_for}\n"));
    }
    if !morning.goals.is_empty() {
        content.push_str("- Goals for today:\n");
        for goal in &morning.goals {
            content.push_str(&format!("  - {goal}\n"));
        }
    }
    content.push('\n');
    content
}

fn evening_block(evening: &EveningPart) -> String {
    let mut content = String::from("**Evening Entry:**\n");
    if let Some(rating) = evening.day_rating {
        content.push_str(&format!("- Day Rating: {rating}/10\n"));
    }
    if let Some(productivity) = evening.productivity {
        content.push_str(&format!(
            "- Productivity: {}\n",
            productivity_label(productivity)
        ));
    }
    content.push_str(&format!("- Tasks Completed: {}\n", evening.tasks_completed));
    if let Some(overview) = &evening.overview {
        content.push_str(&format!("\n**Day Overview:**\n{overview}\n"));
    }
    content.push('\n');
    content
}

use std::fmt::Display;

use ansi_term::Colour;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{Parser, ValueEnum};
use now::DateTimeNow;
use tracing::debug;

use crate::{
    report::{
        compute_statistics,
        labels::{productivity_label, sleep_label},
        normalize::newest_first,
        statistics::format_tenth,
    },
    storage::{entities::LogEntry, JournalStorage},
    utils::{clock::Clock, time::DateRange},
};

use super::validation_error;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Timeframe {
    Today,
    Yesterday,
    /// Monday to Sunday
    Week,
    Month,
    #[value(name = "last7")]
    Last7,
    #[value(name = "last30")]
    Last30,
    All,
}

impl Timeframe {
    fn title(&self) -> &'static str {
        match self {
            Timeframe::Today => "Today",
            Timeframe::Yesterday => "Yesterday",
            Timeframe::Week => "This Week",
            Timeframe::Month => "This Month",
            Timeframe::Last7 => "Last 7 Days",
            Timeframe::Last30 => "Last 30 Days",
            Timeframe::All => "All Time",
        }
    }

    /// Days covered when looking from `now`. `None` means every entry.
    pub fn range(&self, now: DateTime<Local>) -> Option<DateRange> {
        let today = now.date_naive();
        match self {
            Timeframe::Today => Some(DateRange::day(today)),
            Timeframe::Yesterday => today.pred_opt().map(DateRange::day),
            Timeframe::Week => Some(DateRange::iso_week(today)),
            Timeframe::Month => Some(DateRange::new(
                now.beginning_of_month().date_naive(),
                now.end_of_month().date_naive(),
            )),
            Timeframe::Last7 => Some(DateRange::ending_at(today, 7)),
            Timeframe::Last30 => Some(DateRange::ending_at(today, 30)),
            Timeframe::All => None,
        }
    }
}

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(value_enum, default_value_t = Timeframe::Last7, help = "Time frame to summarize")]
    timeframe: Timeframe,
    #[arg(
        long = "start",
        short,
        help = "Start of a custom range, replaces the time frame. Examples are \"yesterday\", \"2 weeks ago\", \"15/03/2025\""
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "End of a custom range. Defaults to today when only the start is given"
    )]
    end_date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(short, long, help = "Also list every entry of the range")]
    details: bool,
}

/// Range picked by the command together with its title.
#[derive(Debug, PartialEq, Eq)]
struct Selection {
    title: String,
    range: Option<DateRange>,
}

fn select_range(command: &HistoryCommand, now: DateTime<Local>) -> Result<Selection> {
    if command.start_date.is_none() && command.end_date.is_none() {
        return Ok(Selection {
            title: command.timeframe.title().to_owned(),
            range: command.timeframe.range(now),
        });
    }

    let dialect: chrono_english::Dialect = command.date_style.into();
    let parse = |value: &Option<String>, name: &str| -> Result<Option<NaiveDate>> {
        match value.as_deref().map(|s| parse_date_string(s, now, dialect)) {
            Some(Ok(v)) => Ok(Some(v.date_naive())),
            Some(Err(e)) => Err(validation_error(format!(
                "Failed to validate {name} date {e}"
            ))),
            None => Ok(None),
        }
    };
    let start = parse(&command.start_date, "start")?.unwrap_or(NaiveDate::MIN);
    let end = parse(&command.end_date, "end")?.unwrap_or_else(|| now.date_naive());
    if start > end {
        return Err(validation_error(format!(
            "Start date {start} is after end date {end}"
        )));
    }

    let range = DateRange::new(start, end);
    Ok(Selection {
        title: format!("{} to {}", describe(range.start), describe(range.end)),
        range: Some(range),
    })
}

fn describe(date: NaiveDate) -> String {
    if date == NaiveDate::MIN {
        "the beginning".to_owned()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

/// Totals, averages and best and worst day of `logs`.
pub fn summary_lines(logs: &[LogEntry]) -> Vec<String> {
    let mut lines = vec![format!("📊 Total Entries: {}", logs.len())];
    let Some(statistics) = compute_statistics(logs) else {
        lines.push("No rated days in this range yet".to_owned());
        return lines;
    };

    let out_of_five = |value: Option<f64>| {
        value.map_or_else(|| "N/A".to_owned(), |v| format!("{}/5", format_tenth(v)))
    };
    lines.extend([
        format!("📅 Rated Days: {}", statistics.total_logged_days),
        format!(
            "⭐ Average Day Rating: {}/10",
            format_tenth(statistics.avg_day_rating)
        ),
        format!(
            "😴 Average Sleep Quality: {}",
            out_of_five(statistics.avg_sleep_quality)
        ),
        format!(
            "🎯 Average Productivity: {}",
            out_of_five(statistics.avg_productivity)
        ),
        format!(
            "✅ Total Tasks Completed: {}",
            statistics.total_tasks_completed
        ),
        format!(
            "🌟 Best Day: {} ({}/10)",
            statistics.best_day.date.format("%b %-d, %Y"),
            statistics.best_day.day_rating
        ),
    ]);
    if let Some(worst) = statistics.worst_day {
        lines.push(format!(
            "😔 Worst Day: {} ({}/10)",
            worst.date.format("%b %-d, %Y"),
            worst.day_rating
        ));
    }
    lines
}

/// Every entry, most recent first.
pub fn detail_lines(logs: &[LogEntry]) -> Vec<String> {
    let mut lines = vec![];
    for entry in newest_first(logs) {
        lines.push(format!("═══ {} ═══", entry.date.format("%b %-d, %Y (%a)")));
        if let Some(rating) = entry.day_rating() {
            lines.push(format!("⭐ Day Rating: {rating}/10"));
        }
        if let Some(sleep) = entry.sleep_quality() {
            lines.push(format!("😴 Sleep: {}", sleep_label(sleep)));
        }
        if let Some(evening) = &entry.evening {
            if let Some(productivity) = evening.productivity {
                lines.push(format!("🎯 Productivity: {}", productivity_label(productivity)));
            }
            lines.push(format!("✅ Tasks: {}", evening.tasks_completed));
            if let Some(overview) = &evening.overview {
                lines.push(format!("📝 {overview}"));
            }
        }
        if let Some(goals) = entry.morning.as_ref().map(|v| &v.goals).filter(|v| !v.is_empty()) {
            lines.push(format!("🎯 Goals: {}", goals.join(", ")));
        }
    }
    lines
}

/// Command to process `history` command. Summarizes entries of a time frame or a custom range.
pub async fn process_history_command(
    command: HistoryCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<()> {
    let Selection { title, range } = select_range(&command, clock.time())?;
    debug!("Showing history for {range:?}");
    let logs = match range {
        Some(range) => storage.logs_between(range).await?,
        None => storage.list_logs().await?,
    };

    if logs.is_empty() {
        println!(
            "{}",
            Colour::Yellow.paint(format!("📭 No logs found for {title}"))
        );
        return Ok(());
    }

    println!(
        "{}",
        Colour::Blue.bold().paint(format!("📊 Overview for {title}"))
    );
    for line in summary_lines(&logs) {
        println!("{}", Colour::Cyan.paint(line));
    }

    if command.details {
        println!();
        println!("{}", Colour::Blue.bold().paint("📝 Detailed Entries"));
        for line in detail_lines(&logs) {
            if line.starts_with('═') {
                println!();
                println!("{}", Colour::Yellow.paint(line));
            } else {
                println!("{line}");
            }
        }
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};
    use serde_json::json;

    use crate::{storage::entities::LogEntry, utils::time::DateRange};

    use super::{
        detail_lines, select_range, summary_lines, DateStyle, HistoryCommand,
        Timeframe,
    };

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn command(timeframe: Timeframe, start: Option<&str>, end: Option<&str>) -> HistoryCommand {
        HistoryCommand {
            timeframe,
            start_date: start.map(str::to_owned),
            end_date: end.map(str::to_owned),
            date_style: DateStyle::Uk,
            details: false,
        }
    }

    #[test]
    fn timeframes_are_calendar_ranges() {
        // Thursday
        let now = Local.with_ymd_and_hms(2024, 2, 15, 18, 0, 0).unwrap();

        assert_eq!(Timeframe::Today.range(now), Some(DateRange::day(date(2, 15))));
        assert_eq!(
            Timeframe::Yesterday.range(now),
            Some(DateRange::day(date(2, 14)))
        );
        assert_eq!(
            Timeframe::Week.range(now),
            Some(DateRange::new(date(2, 12), date(2, 18)))
        );
        assert_eq!(
            Timeframe::Month.range(now),
            Some(DateRange::new(date(2, 1), date(2, 29)))
        );
        assert_eq!(
            Timeframe::Last7.range(now),
            Some(DateRange::new(date(2, 9), date(2, 15)))
        );
        assert_eq!(
            Timeframe::Last30.range(now),
            Some(DateRange::new(date(1, 17), date(2, 15)))
        );
        assert_eq!(Timeframe::All.range(now), None);
    }

    #[test]
    fn custom_range_overrides_timeframe() {
        let now = Local.with_ymd_and_hms(2024, 2, 15, 18, 0, 0).unwrap();

        let selection =
            select_range(&command(Timeframe::All, Some("01/02/2024"), None), now).unwrap();
        assert_eq!(selection.range, Some(DateRange::new(date(2, 1), date(2, 15))));
        assert_eq!(selection.title, "Feb 1, 2024 to Feb 15, 2024");

        let open_start = select_range(&command(Timeframe::All, None, Some("10/02/2024")), now)
            .unwrap();
        assert_eq!(
            open_start.range,
            Some(DateRange::new(NaiveDate::MIN, date(2, 10)))
        );

        assert!(select_range(&command(Timeframe::All, Some("not a date"), None), now).is_err());
        assert!(select_range(
            &command(Timeframe::All, Some("10/02/2024"), Some("01/02/2024")),
            now
        )
        .is_err());
    }

    #[test]
    fn summary_uses_statistics() {
        let logs: Vec<LogEntry> = serde_json::from_value(json!([
            {"date": "2024-02-01", "morningEntry": {"sleepQuality": 4}, "eveningEntry": {"dayRating": 9, "productivity": 5, "tasksCompleted": 3}},
            {"date": "2024-02-02", "dayRating": 4, "productivity": 2},
            {"date": "2024-02-03", "morningEntry": {"sleepQuality": 2}}
        ]))
        .unwrap();

        assert_eq!(
            summary_lines(&logs),
            vec![
                "📊 Total Entries: 3",
                "📅 Rated Days: 2",
                "⭐ Average Day Rating: 6.5/10",
                "😴 Average Sleep Quality: 3.0/5",
                "🎯 Average Productivity: 3.5/5",
                "✅ Total Tasks Completed: 3",
                "🌟 Best Day: Feb 1, 2024 (9/10)",
                "😔 Worst Day: Feb 2, 2024 (4/10)",
            ]
        );
    }

    #[test]
    fn summary_without_ratings() {
        let logs: Vec<LogEntry> = serde_json::from_value(json!([
            {"date": "2024-02-03", "morningEntry": {"sleepQuality": 2}}
        ]))
        .unwrap();

        assert_eq!(
            summary_lines(&logs),
            vec!["📊 Total Entries: 1", "No rated days in this range yet"]
        );
    }

    #[test]
    fn details_are_newest_first() {
        let logs: Vec<LogEntry> = serde_json::from_value(json!([
            {"date": "2024-02-01", "dayRating": 5, "notes": "meh"},
            {"date": "2024-02-03", "morningEntry": {"sleepQuality": 5, "goals": ["a", "b"]}}
        ]))
        .unwrap();

        assert_eq!(
            detail_lines(&logs),
            vec![
                "═══ Feb 3, 2024 (Sat) ═══",
                "😴 Sleep: Excellent",
                "🎯 Goals: a, b",
                "═══ Feb 1, 2024 (Thu) ═══",
                "⭐ Day Rating: 5/10",
                "✅ Tasks: 0",
                "📝 meh",
            ]
        );
    }
}

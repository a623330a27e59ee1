use chrono::NaiveDate;

use crate::storage::entities::LogEntry;

use super::normalize::{normalize, NormalizedLogEntry};

/// Day picked out by its rating, used for best and worst day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHighlight {
    pub date: NaiveDate,
    pub day_rating: u8,
}

/// Summary over rating-complete entries. Averages are already rounded to one decimal.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStatistics {
    pub total_logged_days: usize,
    pub avg_day_rating: f64,
    /// `None` when none of the complete entries has a productivity value.
    pub avg_productivity: Option<f64>,
    /// Taken over every entry with a sleep value, which isn't necessarily a complete one.
    pub avg_sleep_quality: Option<f64>,
    pub total_tasks_completed: u64,
    pub tasks_per_day: f64,
    pub best_day: DayHighlight,
    /// Missing when there is only one complete entry.
    pub worst_day: Option<DayHighlight>,
}

/// Computes statistics over raw entries. Returns `None` when there is nothing to summarize, either
/// because `logs` is empty or because no entry has a day rating.
pub fn compute_statistics(logs: &[LogEntry]) -> Option<AggregateStatistics> {
    aggregate(&normalize(logs))
}

/// Same as [compute_statistics] for already normalized entries. Ties for best and worst day go to
/// the entry that comes first in `entries`.
pub fn aggregate(entries: &[NormalizedLogEntry]) -> Option<AggregateStatistics> {
    let rated = entries
        .iter()
        .filter_map(|v| v.day_rating().map(|rating| (v, rating)))
        .collect::<Vec<_>>();

    let (first, _) = rated.split_first()?;

    let mut best = *first;
    let mut worst = *first;
    for candidate in rated.iter().skip(1) {
        if candidate.1 > best.1 {
            best = *candidate;
        }
        if candidate.1 < worst.1 {
            worst = *candidate;
        }
    }

    let total_logged_days = rated.len();
    let total_tasks_completed = rated
        .iter()
        .map(|(entry, _)| entry.tasks_completed() as u64)
        .sum::<u64>();

    Some(AggregateStatistics {
        total_logged_days,
        avg_day_rating: mean(rated.iter().map(|(_, rating)| *rating as u64))?,
        avg_productivity: mean(rated.iter().filter_map(|(v, _)| v.productivity()).map(u64::from)),
        avg_sleep_quality: mean(entries.iter().filter_map(|v| v.sleep_quality()).map(u64::from)),
        total_tasks_completed,
        tasks_per_day: round_to_tenth(total_tasks_completed as f64 / total_logged_days as f64),
        best_day: highlight(best),
        worst_day: (total_logged_days > 1).then(|| highlight(worst)),
    })
}

fn highlight((entry, day_rating): (&NormalizedLogEntry, u8)) -> DayHighlight {
    DayHighlight {
        date: entry.date,
        day_rating,
    }
}

fn mean(values: impl Iterator<Item = u64>) -> Option<f64> {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(round_to_tenth(sum as f64 / count as f64))
    }
}

/// Rounds half away from zero, so 2.25 becomes 2.3.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.).round() / 10.
}

/// One decimal, the only number format reports use.
pub fn format_tenth(value: f64) -> String {
    format!("{value:.1}")
}

use chrono::NaiveDate;

use crate::storage::entities::LogEntry;

/// Single shape every report works with. Produced from both the nested morning/evening layout and
/// the older flat layout, nested values win when a record carries both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLogEntry {
    pub date: NaiveDate,
    pub morning: Option<MorningPart>,
    pub evening: Option<EveningPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MorningPart {
    pub sleep_quality: Option<u8>,
    pub grateful_for: Option<String>,
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EveningPart {
    pub day_rating: Option<u8>,
    pub productivity: Option<u8>,
    pub tasks_completed: u32,
    pub overview: Option<String>,
}

impl NormalizedLogEntry {
    pub fn day_rating(&self) -> Option<u8> {
        self.evening.as_ref().and_then(|v| v.day_rating)
    }

    pub fn productivity(&self) -> Option<u8> {
        self.evening.as_ref().and_then(|v| v.productivity)
    }

    pub fn sleep_quality(&self) -> Option<u8> {
        self.morning.as_ref().and_then(|v| v.sleep_quality)
    }

    pub fn tasks_completed(&self) -> u32 {
        self.evening.as_ref().map_or(0, |v| v.tasks_completed)
    }

    /// Entry with a resolvable day rating. Only these take part in statistics and trend charts.
    pub fn is_rating_complete(&self) -> bool {
        self.day_rating().is_some()
    }
}

impl From<&LogEntry> for NormalizedLogEntry {
    fn from(entry: &LogEntry) -> Self {
        let nested_morning = entry.morning_entry.as_ref();
        let morning = if nested_morning.is_some() || entry.sleep_quality.is_some() {
            Some(MorningPart {
                sleep_quality: nested_morning
                    .and_then(|v| v.sleep_quality)
                    .or(entry.sleep_quality),
                grateful_for: nested_morning.and_then(|v| v.grateful_for.clone()),
                goals: nested_morning.map(|v| v.goals.clone()).unwrap_or_default(),
            })
        } else {
            None
        };

        let nested_evening = entry.evening_entry.as_ref();
        let has_flat_evening = entry.day_rating.is_some()
            || entry.productivity.is_some()
            || entry.tasks_completed.is_some()
            || entry.notes.is_some();
        let evening = if nested_evening.is_some() || has_flat_evening {
            Some(EveningPart {
                day_rating: nested_evening
                    .and_then(|v| v.day_rating)
                    .or(entry.day_rating),
                productivity: nested_evening
                    .and_then(|v| v.productivity)
                    .or(entry.productivity),
                tasks_completed: nested_evening
                    .and_then(|v| v.tasks_completed)
                    .or(entry.tasks_completed)
                    .unwrap_or(0),
                overview: nested_evening
                    .and_then(|v| v.day_overview.clone())
                    .or_else(|| entry.notes.clone()),
            })
        } else {
            None
        };

        Self {
            date: entry.date,
            morning,
            evening,
        }
    }
}

/// Normalizes entries keeping their order.
pub fn normalize(logs: &[LogEntry]) -> Vec<NormalizedLogEntry> {
    logs.iter().map(NormalizedLogEntry::from).collect()
}

/// Normalizes entries and orders them from the most recent date to the oldest one. Entries
/// sharing a date keep their relative order.
pub fn newest_first(logs: &[LogEntry]) -> Vec<NormalizedLogEntry> {
    let mut entries = normalize(logs);
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// One journal record per calendar date. Entries written before the morning/evening split carry
/// their values directly on the record (`sleepQuality`, `dayRating`, ...), newer ones nest them.
/// Both shapes are kept as-is on disk and resolved later by
/// [normalize](crate::report::normalize).
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub date: NaiveDate,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::integer_id"
    )]
    pub id: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::morning"
    )]
    pub morning_entry: Option<MorningEntry>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::evening"
    )]
    pub evening_entry: Option<EveningEntry>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::one_to_five"
    )]
    pub sleep_quality: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::one_to_ten"
    )]
    pub day_rating: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::one_to_five"
    )]
    pub productivity: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::count"
    )]
    pub tasks_completed: Option<u32>,

    /// Keys this version doesn't know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    /// Creates an empty record for `date`, the way the store creates one on first update.
    pub fn new(date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            date,
            id: Some(now.timestamp_millis()),
            created_at: Some(now),
            morning_entry: None,
            evening_entry: None,
            sleep_quality: None,
            day_rating: None,
            productivity: None,
            notes: None,
            tasks_completed: None,
            extra: Map::new(),
        }
    }

    #[cfg(test)]
    pub fn with_morning(self, morning_entry: MorningEntry) -> Self {
        Self {
            morning_entry: Some(morning_entry),
            ..self
        }
    }

    #[cfg(test)]
    pub fn with_evening(self, evening_entry: EveningEntry) -> Self {
        Self {
            evening_entry: Some(evening_entry),
            ..self
        }
    }
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MorningEntry {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::one_to_five"
    )]
    pub sleep_quality: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub grateful_for: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub goals: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EveningEntry {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::one_to_ten"
    )]
    pub day_rating: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::one_to_five"
    )]
    pub productivity: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub day_overview: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::count"
    )]
    pub tasks_completed: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Part of a day that gets replaced as a whole when the user records it again.
#[derive(Debug, Clone)]
pub enum LogUpdate {
    Morning(MorningEntry),
    Evening(EveningEntry),
    /// Both parts at once, written by the quick log.
    Day {
        morning: MorningEntry,
        evening: EveningEntry,
    },
}

impl LogUpdate {
    /// Top level fields of the stored record this update replaces. Every other field of the
    /// record stays as it is on disk.
    pub fn into_fields(self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut fields = Map::new();
        match self {
            LogUpdate::Morning(morning) => {
                fields.insert("morningEntry".into(), serde_json::to_value(morning)?);
            }
            LogUpdate::Evening(evening) => {
                fields.insert("eveningEntry".into(), serde_json::to_value(evening)?);
            }
            LogUpdate::Day { morning, evening } => {
                fields.insert("morningEntry".into(), serde_json::to_value(morning)?);
                fields.insert("eveningEntry".into(), serde_json::to_value(evening)?);
            }
        }
        Ok(fields)
    }
}

/// A task always belongs to exactly one day. Unfinished tasks are moved forward by
/// [rollover_tasks](super::journal_storage::JournalStorage::rollover_tasks).
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Field deserializers that turn anything unusable into "absent" instead of failing the whole
/// record. Values outside of their range are treated the same way as missing ones.
mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{EveningEntry, MorningEntry};

    fn integer(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|v| v.fract() == 0.).map(|v| v as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn bounded<'de, D>(deserializer: D, min: i64, max: i64) -> Result<Option<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(integer(&value)
            .filter(|v| (min..=max).contains(v))
            .map(|v| v as u8))
    }

    pub fn one_to_five<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        bounded(deserializer, 1, 5)
    }

    pub fn one_to_ten<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        bounded(deserializer, 1, 10)
    }

    pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(integer(&value).and_then(|v| u32::try_from(v).ok()))
    }

    pub fn integer_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(integer(&value))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    pub fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(values) => Ok(values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect()),
            Value::String(s) => Ok(vec![s]),
            _ => Ok(vec![]),
        }
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|v| v.with_timezone(&Utc))),
            _ => Ok(None),
        }
    }

    pub fn morning<'de, D>(deserializer: D) -> Result<Option<MorningEntry>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
            _ => Ok(None),
        }
    }

    pub fn evening<'de, D>(deserializer: D) -> Result<Option<EveningEntry>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
            _ => Ok(None),
        }
    }
}

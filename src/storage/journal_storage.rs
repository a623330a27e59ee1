use std::{
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    fs::operations::{read_locked, rewrite_locked},
    utils::time::DateRange,
};

use super::{
    config::StorageConfig,
    entities::{LogEntry, LogUpdate, TaskEntry},
    StorageError,
};

/// Interface for abstracting storage of journal records and tasks. The report code never talks
/// to it directly, it only receives what [list_logs](JournalStorage::list_logs) returned.
pub trait JournalStorage {
    /// Every stored log entry, in file order.
    fn list_logs(&self) -> impl Future<Output = Result<Vec<LogEntry>>>;

    fn log_for_date(&self, date: NaiveDate) -> impl Future<Output = Result<Option<LogEntry>>>;

    /// Entries whose date falls into `range`. Both ends are inclusive.
    fn logs_between(&self, range: DateRange) -> impl Future<Output = Result<Vec<LogEntry>>>;

    /// Replaces the morning or evening part of the entry for `date`, creating the entry if there
    /// is none yet.
    fn update_log(
        &self,
        date: NaiveDate,
        update: LogUpdate,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<LogEntry>>;

    fn list_tasks(&self) -> impl Future<Output = Result<Vec<TaskEntry>>>;

    fn tasks_for_date(&self, date: NaiveDate) -> impl Future<Output = Result<Vec<TaskEntry>>>;

    fn add_task(
        &self,
        name: &str,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<TaskEntry>>;

    /// Marks a task as done. Returns `None` if there is no task with this id.
    fn complete_task(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<TaskEntry>>>;

    /// Returns the number of removed tasks.
    fn delete_tasks(&self, ids: &[i64]) -> impl Future<Output = Result<usize>>;

    /// Moves every unfinished task from an earlier day to `today`. Returns the number of moved
    /// tasks.
    fn rollover_tasks(&self, today: NaiveDate) -> impl Future<Output = Result<usize>>;
}

/// The main realization of [JournalStorage].
///
/// Reads go through the typed entities and skip records that can't be understood. Writes work on
/// the stored JSON records instead, so that a record this version can't read is written back
/// exactly as it was found.
pub struct JsonStorage {
    logs_file: PathBuf,
    tasks_file: PathBuf,
}

impl JsonStorage {
    pub fn new(config: &StorageConfig) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&config.data_dir)?;

        Ok(Self {
            logs_file: config.logs_file(),
            tasks_file: config.tasks_file(),
        })
    }

    async fn read_logs(&self) -> Result<Vec<LogEntry>> {
        match read_locked(&self.logs_file).await? {
            Some(contents) => Ok(parse_logs(&contents)?),
            None => Ok(vec![]),
        }
    }

    async fn read_tasks(&self) -> Result<Vec<TaskEntry>> {
        match read_locked(&self.tasks_file).await? {
            Some(contents) => Ok(parse_tasks(&contents)?),
            None => Ok(vec![]),
        }
    }

    async fn rewrite_logs<T>(
        &self,
        update: impl FnOnce(&mut Vec<Value>) -> Result<T, StorageError>,
    ) -> Result<T> {
        rewrite_records(&self.logs_file, LOGS, update).await
    }

    async fn rewrite_tasks<T>(
        &self,
        update: impl FnOnce(&mut Vec<Value>) -> Result<T, StorageError>,
    ) -> Result<T> {
        rewrite_records(&self.tasks_file, TASKS, update).await
    }
}

impl JournalStorage for JsonStorage {
    async fn list_logs(&self) -> Result<Vec<LogEntry>> {
        self.read_logs().await
    }

    async fn log_for_date(&self, date: NaiveDate) -> Result<Option<LogEntry>> {
        Ok(self.read_logs().await?.into_iter().find(|v| v.date == date))
    }

    async fn logs_between(&self, range: DateRange) -> Result<Vec<LogEntry>> {
        let logs = self.read_logs().await?;
        Ok(logs.into_iter().filter(|v| range.contains(v.date)).collect())
    }

    async fn update_log(
        &self,
        date: NaiveDate,
        update: LogUpdate,
        now: DateTime<Utc>,
    ) -> Result<LogEntry> {
        self.rewrite_logs(|records| {
            let index = match records.iter().position(|v| record_date(v) == Some(date)) {
                Some(index) => index,
                None => {
                    debug!("Creating log entry for {date}");
                    records.push(serde_json::to_value(LogEntry::new(date, now))?);
                    records.len() - 1
                }
            };
            let record = &mut records[index];
            if let Some(fields) = record.as_object_mut() {
                fields.extend(update.into_fields()?);
            }
            Ok(serde_json::from_value(record.clone())?)
        })
        .await
    }

    async fn list_tasks(&self) -> Result<Vec<TaskEntry>> {
        self.read_tasks().await
    }

    async fn tasks_for_date(&self, date: NaiveDate) -> Result<Vec<TaskEntry>> {
        let tasks = self.read_tasks().await?;
        Ok(tasks.into_iter().filter(|v| v.date == date).collect())
    }

    async fn add_task(&self, name: &str, date: NaiveDate, now: DateTime<Utc>) -> Result<TaskEntry> {
        self.rewrite_tasks(|records| {
            // Ids are creation timestamps. Several tasks created within the same millisecond
            // still need distinct ids.
            let next_free = records
                .iter()
                .filter_map(record_id)
                .map(|v| v.saturating_add(1))
                .max()
                .unwrap_or(i64::MIN);
            let task = TaskEntry {
                id: now.timestamp_millis().max(next_free),
                name: name.to_owned(),
                completed: false,
                date,
                created_at: now,
                completed_at: None,
            };
            records.push(serde_json::to_value(&task)?);
            Ok(task)
        })
        .await
    }

    async fn complete_task(&self, id: i64, now: DateTime<Utc>) -> Result<Option<TaskEntry>> {
        self.rewrite_tasks(|records| {
            let Some(record) = records.iter_mut().find(|v| record_id(v) == Some(id)) else {
                return Ok(None);
            };
            let task = serde_json::from_value::<TaskEntry>(record.clone())?;
            if task.completed {
                return Ok(Some(task));
            }
            if let Some(fields) = record.as_object_mut() {
                fields.insert("completed".into(), Value::Bool(true));
                fields.insert("completedAt".into(), serde_json::to_value(now)?);
            }
            Ok(Some(serde_json::from_value(record.clone())?))
        })
        .await
    }

    async fn delete_tasks(&self, ids: &[i64]) -> Result<usize> {
        self.rewrite_tasks(|records| {
            let before = records.len();
            records.retain(|v| !record_id(v).is_some_and(|id| ids.contains(&id)));
            Ok(before - records.len())
        })
        .await
    }

    async fn rollover_tasks(&self, today: NaiveDate) -> Result<usize> {
        self.rewrite_tasks(|records| {
            let mut moved = 0;
            for record in records.iter_mut() {
                let Ok(task) = serde_json::from_value::<TaskEntry>(record.clone()) else {
                    continue;
                };
                if task.completed || task.date >= today {
                    continue;
                }
                if let Some(fields) = record.as_object_mut() {
                    fields.insert("date".into(), Value::String(today.to_string()));
                    moved += 1;
                }
            }
            Ok(moved)
        })
        .await
    }
}

const LOGS: &str = "log entries";
const TASKS: &str = "tasks";

/// Reads the contents of `logs.json`. An empty document counts as an empty list. A document that
/// isn't a JSON array is rejected, single unreadable entries are skipped.
pub fn parse_logs(contents: &str) -> Result<Vec<LogEntry>, StorageError> {
    parse_sequence(contents, LOGS)
}

/// Same rules as [parse_logs], for `tasks.json`.
pub fn parse_tasks(contents: &str) -> Result<Vec<TaskEntry>, StorageError> {
    parse_sequence(contents, TASKS)
}

fn parse_sequence<T: DeserializeOwned>(
    contents: &str,
    what: &'static str,
) -> Result<Vec<T>, StorageError> {
    Ok(parse_records(contents, what)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(v) => Some(v),
            Err(e) => {
                // ignore illegal values, the rest of the file is still usable
                warn!("Skipping unreadable {what} at index {index}: {e}");
                None
            }
        })
        .collect())
}

/// The stored records without interpreting them.
fn parse_records(contents: &str, what: &'static str) -> Result<Vec<Value>, StorageError> {
    if contents.trim().is_empty() {
        return Ok(vec![]);
    }

    match serde_json::from_str::<Value>(contents)? {
        Value::Array(values) => Ok(values),
        other => Err(StorageError::NotASequence(what, json_kind(&other))),
    }
}

/// Read-modify-write of a whole file of records. Nothing is written when `update` fails.
async fn rewrite_records<T>(
    path: &Path,
    what: &'static str,
    update: impl FnOnce(&mut Vec<Value>) -> Result<T, StorageError>,
) -> Result<T> {
    let value = rewrite_locked(path, |previous| {
        let mut records = parse_records(previous, what)?;
        let value = update(&mut records)?;
        Ok::<_, StorageError>((serde_json::to_string_pretty(&records)?, value))
    })
    .await?;
    Ok(value)
}

fn record_date(record: &Value) -> Option<NaiveDate> {
    record
        .get("date")
        .and_then(Value::as_str)
        .and_then(|v| v.parse().ok())
}

fn record_id(record: &Value) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

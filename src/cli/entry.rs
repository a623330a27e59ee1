use ansi_term::Colour;
use anyhow::Result;
use chrono::NaiveDate;
use clap::{value_parser, Parser};
use tracing::info;

use crate::{
    report::{
        labels::{productivity_label, sleep_label},
        normalize::NormalizedLogEntry,
    },
    storage::{
        entities::{EveningEntry, LogEntry, LogUpdate, MorningEntry},
        JournalStorage, StorageConfig,
    },
    utils::clock::{Clock, ClockExt},
};

use super::{overview::refresh_overview, validation_error};

#[derive(Debug, Parser)]
pub struct StartCommand {
    #[arg(
        long,
        value_parser = value_parser!(u8).range(1..=5),
        help = "How well you slept, from 1 (terrible) to 5 (excellent)"
    )]
    sleep: u8,
    #[arg(long, help = "Something you are grateful for today")]
    grateful: String,
    #[arg(
        long,
        help = "What you want to accomplish today, separated by commas. E.g. \"write report, go running\""
    )]
    goals: String,
    #[arg(long, help = "Overwrite the morning entry if today already has one")]
    force: bool,
}

#[derive(Debug, Parser)]
pub struct FinishCommand {
    #[arg(
        long,
        value_parser = value_parser!(u8).range(1..=10),
        help = "Rating of the day from 1 to 10"
    )]
    rating: u8,
    #[arg(
        long,
        value_parser = value_parser!(u8).range(1..=5),
        help = "How productive you were, from 1 (not productive) to 5 (very productive)"
    )]
    productivity: u8,
    #[arg(long, help = "A paragraph or two about the day")]
    overview: String,
    #[arg(long, help = "Overwrite the evening entry if today already has one")]
    force: bool,
}

#[derive(Debug, Parser)]
pub struct QuickCommand {
    #[arg(
        long,
        value_parser = value_parser!(u8).range(1..=5),
        help = "How well you slept, from 1 (terrible) to 5 (excellent)"
    )]
    sleep: u8,
    #[arg(
        long,
        value_parser = value_parser!(u8).range(1..=10),
        help = "Rating of the day from 1 to 10"
    )]
    rating: u8,
    #[arg(
        long,
        value_parser = value_parser!(u8).range(1..=5),
        help = "How productive you were, from 1 (not productive) to 5 (very productive)"
    )]
    productivity: u8,
    #[arg(long, help = "Optional notes about the day")]
    notes: Option<String>,
    #[arg(long, help = "Overwrite today's entry if there already is one")]
    force: bool,
}

/// Result of recording a part of today's entry.
#[derive(Debug, PartialEq)]
pub enum EntryOutcome {
    Saved(LogEntry),
    /// Nothing was written because the part already exists and overwriting wasn't asked for.
    AlreadyRecorded(LogEntry),
}

/// Moves unfinished tasks to today and records the morning part. Returns the number of tasks that
/// were moved.
pub async fn start_day(
    command: StartCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<(usize, EntryOutcome)> {
    let grateful_for = command.grateful.trim();
    if grateful_for.is_empty() {
        return Err(validation_error("Please enter something you're grateful for"));
    }
    let goals = parse_goals(&command.goals);
    if goals.is_empty() {
        return Err(validation_error("Please enter at least one goal"));
    }

    let today = clock.today();
    let rolled_over = storage.rollover_tasks(today).await?;

    if let Some(existing) = storage.log_for_date(today).await? {
        if existing.morning_entry.is_some() && !command.force {
            return Ok((rolled_over, EntryOutcome::AlreadyRecorded(existing)));
        }
    }

    let now = clock.utc();
    let morning = MorningEntry {
        sleep_quality: Some(command.sleep),
        grateful_for: Some(grateful_for.to_owned()),
        goals,
        timestamp: Some(now),
    };
    let saved = storage
        .update_log(today, LogUpdate::Morning(morning), now)
        .await?;
    info!("Recorded morning entry for {today}");
    Ok((rolled_over, EntryOutcome::Saved(saved)))
}

/// Records the evening part. The number of completed tasks is taken from today's task list.
pub async fn finish_day(
    command: FinishCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<EntryOutcome> {
    let overview = command.overview.trim();
    if overview.is_empty() {
        return Err(validation_error(
            "Please write at least a brief overview of your day",
        ));
    }

    let today = clock.today();
    if let Some(existing) = storage.log_for_date(today).await? {
        if existing.evening_entry.is_some() && !command.force {
            return Ok(EntryOutcome::AlreadyRecorded(existing));
        }
    }

    let now = clock.utc();
    let evening = EveningEntry {
        day_rating: Some(command.rating),
        productivity: Some(command.productivity),
        day_overview: Some(overview.to_owned()),
        tasks_completed: Some(completed_tasks(storage, today).await?),
        timestamp: Some(now),
    };
    let saved = storage
        .update_log(today, LogUpdate::Evening(evening), now)
        .await?;
    info!("Recorded evening entry for {today}");
    Ok(EntryOutcome::Saved(saved))
}

/// Records the whole day at once. Any existing entry for today blocks it unless forced.
pub async fn quick_log(
    command: QuickCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<EntryOutcome> {
    let today = clock.today();
    if let Some(existing) = storage.log_for_date(today).await? {
        if !command.force {
            return Ok(EntryOutcome::AlreadyRecorded(existing));
        }
    }

    let now = clock.utc();
    let notes = command
        .notes
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty());
    let update = LogUpdate::Day {
        morning: MorningEntry {
            sleep_quality: Some(command.sleep),
            timestamp: Some(now),
            ..Default::default()
        },
        evening: EveningEntry {
            day_rating: Some(command.rating),
            productivity: Some(command.productivity),
            day_overview: notes,
            tasks_completed: Some(completed_tasks(storage, today).await?),
            timestamp: Some(now),
        },
    };
    let saved = storage.update_log(today, update, now).await?;
    info!("Recorded quick entry for {today}");
    Ok(EntryOutcome::Saved(saved))
}

async fn completed_tasks(storage: &impl JournalStorage, date: NaiveDate) -> Result<u32> {
    let tasks = storage.tasks_for_date(date).await?;
    Ok(tasks.iter().filter(|v| v.completed).count() as u32)
}

/// Splits a comma separated list, dropping blank items.
pub fn parse_goals(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

pub async fn process_start_command(
    command: StartCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
    config: &StorageConfig,
) -> Result<()> {
    let (rolled_over, outcome) = start_day(command, storage, clock).await?;
    if rolled_over > 0 {
        println!(
            "{}",
            Colour::Yellow.paint(format!(
                "🔄 {rolled_over} uncompleted task(s) rolled over to today"
            ))
        );
    }
    match outcome {
        EntryOutcome::AlreadyRecorded(existing) => {
            println!(
                "{}",
                Colour::Yellow.paint("You already started today! Pass --force to overwrite it.")
            );
            print_morning(&existing);
        }
        EntryOutcome::Saved(saved) => {
            refresh_overview(storage, clock, config).await;
            println!("{}", Colour::Green.bold().paint("✅ Morning entry saved!"));
            print_morning(&saved);
            println!(
                "{}",
                Colour::Blue.paint("💪 Have a great day! Use \"lifelog create <task>\" to add tasks.")
            );
        }
    }
    Ok(())
}

pub async fn process_finish_command(
    command: FinishCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
    config: &StorageConfig,
) -> Result<()> {
    match finish_day(command, storage, clock).await? {
        EntryOutcome::AlreadyRecorded(existing) => {
            println!(
                "{}",
                Colour::Yellow.paint("You already finished today! Pass --force to overwrite it.")
            );
            print_evening(&existing);
        }
        EntryOutcome::Saved(saved) => {
            refresh_overview(storage, clock, config).await;
            println!("{}", Colour::Green.bold().paint("✅ Evening entry saved!"));
            print_evening(&saved);
            println!(
                "{}",
                Colour::Blue.paint("😴 Good night! Rest well for tomorrow.")
            );
        }
    }
    Ok(())
}

pub async fn process_quick_command(
    command: QuickCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
    config: &StorageConfig,
) -> Result<()> {
    match quick_log(command, storage, clock).await? {
        EntryOutcome::AlreadyRecorded(existing) => {
            println!(
                "{}",
                Colour::Yellow.paint("You already logged today! Pass --force to overwrite it.")
            );
            print_morning(&existing);
            print_evening(&existing);
        }
        EntryOutcome::Saved(saved) => {
            refresh_overview(storage, clock, config).await;
            println!("{}", Colour::Green.bold().paint("✅ Log entry saved!"));
            print_morning(&saved);
            print_evening(&saved);
        }
    }
    Ok(())
}

fn print_morning(entry: &LogEntry) {
    for line in morning_lines(&NormalizedLogEntry::from(entry)) {
        println!("{}", Colour::Cyan.paint(line));
    }
    println!();
}

fn print_evening(entry: &LogEntry) {
    for line in evening_lines(&NormalizedLogEntry::from(entry)) {
        println!("{}", Colour::Cyan.paint(line));
    }
    println!();
}

fn day_heading(entry: &NormalizedLogEntry) -> String {
    format!("📅 {}", entry.date.format("%A, %B %-d, %Y"))
}

/// Morning part as shown after saving it. Missing values get no line.
fn morning_lines(entry: &NormalizedLogEntry) -> Vec<String> {
    let Some(morning) = &entry.morning else {
        return vec![];
    };
    let mut lines = vec![day_heading(entry)];
    if let Some(sleep) = morning.sleep_quality {
        lines.push(format!("😴 Sleep: {}", sleep_label(sleep)));
    }
    if let Some(grateful_for) = &morning.grateful_for {
        lines.push(format!("🙏 Grateful For: {grateful_for}"));
    }
    if !morning.goals.is_empty() {
        lines.push("🎯 Today's Goals:".to_owned());
        for (i, goal) in morning.goals.iter().enumerate() {
            lines.push(format!("  {}. {goal}", i + 1));
        }
    }
    lines
}

fn evening_lines(entry: &NormalizedLogEntry) -> Vec<String> {
    let Some(evening) = &entry.evening else {
        return vec![];
    };
    let mut lines = vec![day_heading(entry)];
    if let Some(rating) = evening.day_rating {
        lines.push(format!("⭐ Day Rating: {rating}/10"));
    }
    if let Some(productivity) = evening.productivity {
        lines.push(format!("🎯 Productivity: {}", productivity_label(productivity)));
    }
    lines.push(format!("✅ Tasks Completed: {}", evening.tasks_completed));
    if let Some(overview) = &evening.overview {
        lines.push("📝 Day Overview:".to_owned());
        lines.push(overview.clone());
    }
    lines
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Local, NaiveDate, TimeZone};
    use serde_json::json;
    use tempfile::tempdir;

    use crate::{
        report::normalize::NormalizedLogEntry,
        storage::{entities::LogEntry, JournalStorage, JsonStorage, StorageConfig},
        utils::clock::{fixed_clock, MockClock},
    };

    use super::{
        evening_lines, finish_day, morning_lines, parse_goals, quick_log, start_day,
        EntryOutcome, FinishCommand, QuickCommand, StartCommand,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn clock() -> MockClock {
        fixed_clock(Local.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap())
    }

    fn start(force: bool) -> StartCommand {
        StartCommand {
            sleep: 4,
            grateful: " good coffee ".into(),
            goals: "write, , run ".into(),
            force,
        }
    }

    fn finish(rating: u8) -> FinishCommand {
        FinishCommand {
            rating,
            productivity: 3,
            overview: "Busy but fine.\n".into(),
            force: false,
        }
    }

    #[test]
    fn goals_are_trimmed() {
        assert_eq!(parse_goals("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(parse_goals(" , ").is_empty());
    }

    #[tokio::test]
    async fn start_rolls_over_and_saves_morning() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonStorage::new(&StorageConfig::new(dir.path().to_owned()))?;
        let clock = clock();
        let yesterday = today().pred_opt().unwrap();
        let utc = Local.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap().to_utc();
        storage.add_task("left over", yesterday, utc).await?;

        let (rolled_over, outcome) = start_day(start(false), &storage, &clock).await?;

        assert_eq!(rolled_over, 1);
        let EntryOutcome::Saved(saved) = outcome else {
            panic!("expected a saved entry");
        };
        let morning = saved.morning_entry.unwrap();
        assert_eq!(morning.sleep_quality, Some(4));
        assert_eq!(morning.grateful_for.as_deref(), Some("good coffee"));
        assert_eq!(morning.goals, vec!["write", "run"]);
        assert_eq!(storage.tasks_for_date(today()).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn start_keeps_existing_morning_unless_forced() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonStorage::new(&StorageConfig::new(dir.path().to_owned()))?;
        let clock = clock();

        start_day(start(false), &storage, &clock).await?;
        let mut second = start(false);
        second.sleep = 1;
        let (_, outcome) = start_day(second, &storage, &clock).await?;
        assert!(matches!(outcome, EntryOutcome::AlreadyRecorded(_)));

        let mut forced = start(true);
        forced.sleep = 1;
        let (_, outcome) = start_day(forced, &storage, &clock).await?;
        assert!(matches!(outcome, EntryOutcome::Saved(_)));
        let stored = storage.log_for_date(today()).await?.unwrap();
        assert_eq!(stored.morning_entry.unwrap().sleep_quality, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn start_requires_goals() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonStorage::new(&StorageConfig::new(dir.path().to_owned()))?;
        let mut command = start(false);
        command.goals = " ,".into();

        assert!(start_day(command, &storage, &clock()).await.is_err());
        assert!(storage.list_logs().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn finish_counts_completed_tasks() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonStorage::new(&StorageConfig::new(dir.path().to_owned()))?;
        let clock = clock();
        let utc = Local.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap().to_utc();
        let done = storage.add_task("done", today(), utc).await?;
        storage.add_task("open", today(), utc).await?;
        storage.complete_task(done.id, utc).await?;

        let EntryOutcome::Saved(saved) = finish_day(finish(8), &storage, &clock).await? else {
            panic!("expected a saved entry");
        };

        let evening = saved.evening_entry.unwrap();
        assert_eq!(evening.day_rating, Some(8));
        assert_eq!(evening.tasks_completed, Some(1));
        assert_eq!(evening.day_overview.as_deref(), Some("Busy but fine."));

        let outcome = finish_day(finish(2), &storage, &clock).await?;
        assert!(matches!(outcome, EntryOutcome::AlreadyRecorded(_)));
        Ok(())
    }

    #[tokio::test]
    async fn quick_writes_both_parts() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonStorage::new(&StorageConfig::new(dir.path().to_owned()))?;
        let command = QuickCommand {
            sleep: 2,
            rating: 6,
            productivity: 4,
            notes: Some("  ".into()),
            force: false,
        };

        let EntryOutcome::Saved(saved) = quick_log(command, &storage, &clock()).await? else {
            panic!("expected a saved entry");
        };

        assert_eq!(saved.morning_entry.unwrap().sleep_quality, Some(2));
        let evening = saved.evening_entry.unwrap();
        assert_eq!(evening.day_rating, Some(6));
        assert_eq!(evening.day_overview, None);
        assert_eq!(evening.tasks_completed, Some(0));
        Ok(())
    }

    #[test]
    fn flat_entry_is_shown_like_a_nested_one() {
        let entry: LogEntry = serde_json::from_value(json!({
            "date": "2024-03-10",
            "sleepQuality": 2,
            "dayRating": 7,
            "tasksCompleted": 3,
            "notes": "Rainy"
        }))
        .unwrap();
        let entry = NormalizedLogEntry::from(&entry);

        assert_eq!(
            morning_lines(&entry),
            vec!["📅 Sunday, March 10, 2024", "😴 Sleep: Poor"]
        );
        assert_eq!(
            evening_lines(&entry),
            vec![
                "📅 Sunday, March 10, 2024",
                "⭐ Day Rating: 7/10",
                "✅ Tasks Completed: 3",
                "📝 Day Overview:",
                "Rainy",
            ]
        );
    }
}

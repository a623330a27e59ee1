use std::collections::BTreeSet;

use ansi_term::{Colour, Style};
use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info};

use crate::{
    storage::{entities::TaskEntry, JournalStorage},
    utils::clock::{Clock, ClockExt},
};

use super::validation_error;

#[derive(Debug, Parser)]
pub struct BulkDeleteCommand {
    #[arg(
        value_delimiter = ',',
        required_unless_present = "all",
        conflicts_with = "all",
        help = "Task numbers separated by commas, e.g. 1,3,5"
    )]
    numbers: Vec<usize>,
    #[arg(long, help = "Delete every task of today")]
    all: bool,
}

#[derive(Debug, PartialEq)]
pub enum TaskCompletion {
    Completed(TaskEntry),
    AlreadyCompleted(TaskEntry),
}

/// A line of a task listing. Numbers start with 1 and are what `complete` and `delete` accept.
pub fn task_line(number: usize, task: &TaskEntry) -> String {
    if task.completed {
        format!(
            "{} {number}. {}",
            Colour::Green.paint("✅"),
            Style::new().dimmed().strikethrough().paint(task.name.as_str())
        )
    } else {
        format!("⬜ {number}. {}", task.name)
    }
}

fn print_task_list(tasks: &[TaskEntry]) {
    for (i, task) in tasks.iter().enumerate() {
        println!("{}", task_line(i + 1, task));
    }
}

/// Task of today's list by its 1-based number.
fn pick_task(tasks: &[TaskEntry], number: usize) -> Result<&TaskEntry> {
    if tasks.is_empty() {
        return Err(validation_error(
            "There are no tasks for today. Create one with: lifelog create \"task name\"",
        ));
    }
    number
        .checked_sub(1)
        .and_then(|index| tasks.get(index))
        .ok_or_else(|| {
            validation_error(format!(
                "Invalid task number {number}. Please choose 1-{}",
                tasks.len()
            ))
        })
}

pub async fn create_task(
    name: &str,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<TaskEntry> {
    let name = name.trim();
    if name.is_empty() {
        return Err(validation_error("Please provide a task name"));
    }
    let task = storage.add_task(name, clock.today(), clock.utc()).await?;
    info!("Created task {}", task.id);
    Ok(task)
}

/// Creates a task for every non-blank line of `input`.
pub async fn create_tasks_from_lines(
    input: impl AsyncRead + Unpin,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<Vec<TaskEntry>> {
    let mut lines = BufReader::new(input).lines();
    let mut created = vec![];
    while let Some(line) = lines.next_line().await? {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        let task = storage.add_task(name, clock.today(), clock.utc()).await?;
        println!("{}", Colour::Green.paint(format!("  ✅ Added: {}", task.name)));
        created.push(task);
    }
    debug!("Created {} tasks from input", created.len());
    Ok(created)
}

pub async fn complete_task_number(
    number: usize,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<TaskCompletion> {
    let tasks = storage.tasks_for_date(clock.today()).await?;
    let task = pick_task(&tasks, number)?;
    if task.completed {
        return Ok(TaskCompletion::AlreadyCompleted(task.clone()));
    }
    match storage.complete_task(task.id, clock.utc()).await? {
        Some(completed) => Ok(TaskCompletion::Completed(completed)),
        // Removed by another invocation in between
        None => Err(validation_error(format!("Task {number} no longer exists"))),
    }
}

pub async fn delete_task_number(
    number: usize,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<TaskEntry> {
    let tasks = storage.tasks_for_date(clock.today()).await?;
    let task = pick_task(&tasks, number)?.clone();
    storage.delete_tasks(&[task.id]).await?;
    Ok(task)
}

/// Deletes the numbered tasks of today, or all of them. Nothing is deleted when any of the numbers
/// is invalid. Returns the number of deleted tasks.
pub async fn delete_task_numbers(
    command: BulkDeleteCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<usize> {
    let tasks = storage.tasks_for_date(clock.today()).await?;
    let ids = if command.all {
        tasks.iter().map(|v| v.id).collect::<Vec<_>>()
    } else {
        let numbers = command.numbers.into_iter().collect::<BTreeSet<_>>();
        numbers
            .into_iter()
            .map(|number| pick_task(&tasks, number).map(|v| v.id))
            .collect::<Result<Vec<_>>>()?
    };
    if ids.is_empty() {
        return Ok(0);
    }
    storage.delete_tasks(&ids).await
}

pub async fn process_create_command(
    name: &str,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<()> {
    let task = create_task(name, storage, clock).await?;
    println!("{}", Colour::Green.paint("✅ Task created successfully!"));
    println!("{}", Colour::Cyan.paint(format!("📝 {}", task.name)));
    Ok(())
}

pub async fn process_bulk_command(
    input: impl AsyncRead + Unpin,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<()> {
    println!(
        "{}",
        Style::new()
            .dimmed()
            .paint("Enter tasks one per line. Press Ctrl+D when done.")
    );
    let created = create_tasks_from_lines(input, storage, clock).await?;
    let count = created.len();
    println!(
        "{}",
        Colour::Green
            .bold()
            .paint(format!("✅ Created {count} task{}!", plural(count)))
    );
    Ok(())
}

pub async fn process_complete_command(
    number: usize,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<()> {
    match complete_task_number(number, storage, clock).await? {
        TaskCompletion::AlreadyCompleted(_) => {
            println!(
                "{}",
                Colour::Yellow.paint(format!("⚠️  Task #{number} is already completed!"))
            );
        }
        TaskCompletion::Completed(task) => {
            println!(
                "{}",
                Colour::Green.paint(format!("✅ Completed task #{number}: {}", task.name))
            );
            let tasks = storage.tasks_for_date(clock.today()).await?;
            let completed = tasks.iter().filter(|v| v.completed).count();
            let remaining = tasks.len() - completed;
            println!(
                "{}",
                Colour::Cyan.paint(format!(
                    "Progress: {completed}/{} tasks completed",
                    tasks.len()
                ))
            );
            if remaining > 0 {
                println!("{remaining} task{} remaining", plural(remaining));
            } else {
                println!(
                    "{}",
                    Colour::Green.bold().paint("🎉 All tasks completed! Great job!")
                );
            }
        }
    }
    Ok(())
}

pub async fn process_delete_command(
    number: usize,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<()> {
    let task = delete_task_number(number, storage, clock).await?;
    println!(
        "{}",
        Colour::Green.paint(format!("✅ Task deleted: \"{}\"", task.name))
    );
    Ok(())
}

pub async fn process_bulk_delete_command(
    command: BulkDeleteCommand,
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<()> {
    let deleted = delete_task_numbers(command, storage, clock).await?;
    println!(
        "{}",
        Colour::Green.paint(format!("✅ Deleted {deleted} task{}", plural(deleted)))
    );

    let remaining = storage.tasks_for_date(clock.today()).await?;
    if remaining.is_empty() {
        println!("{}", Style::new().dimmed().paint("No tasks remaining."));
    } else {
        println!("{}", Colour::Cyan.paint("Remaining tasks:"));
        print_task_list(&remaining);
    }
    Ok(())
}

pub async fn process_tasks_command(storage: &impl JournalStorage, clock: &impl Clock) -> Result<()> {
    let today = clock.today();
    let tasks = storage.tasks_for_date(today).await?;
    if tasks.is_empty() {
        println!("{}", Colour::Yellow.paint("📋 No tasks for today yet!"));
        println!(
            "{}",
            Style::new()
                .dimmed()
                .paint("Create a task with: lifelog create \"task name\"")
        );
        return Ok(());
    }

    println!(
        "{}",
        Colour::Blue
            .bold()
            .paint(format!("📋 Tasks for {}", today.format("%b %-d, %Y")))
    );
    print_task_list(&tasks);
    let completed = tasks.iter().filter(|v| v.completed).count();
    println!(
        "{}",
        Colour::Cyan.paint(format!("Completed: {completed}/{}", tasks.len()))
    );
    Ok(())
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Local, NaiveDate, TimeZone};
    use tempfile::tempdir;

    use crate::{
        storage::{JournalStorage, JsonStorage, StorageConfig},
        utils::clock::{fixed_clock, MockClock},
    };

    use super::{
        complete_task_number, create_task, create_tasks_from_lines, delete_task_number,
        delete_task_numbers, task_line, BulkDeleteCommand, TaskCompletion,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn clock() -> MockClock {
        fixed_clock(Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())
    }

    async fn storage_with(names: &[&str]) -> Result<(tempfile::TempDir, JsonStorage)> {
        let dir = tempdir()?;
        let storage = JsonStorage::new(&StorageConfig::new(dir.path().to_owned()))?;
        for name in names {
            create_task(name, &storage, &clock()).await?;
        }
        Ok((dir, storage))
    }

    #[tokio::test]
    async fn blank_names_are_rejected() -> Result<()> {
        let (_dir, storage) = storage_with(&[]).await?;
        assert!(create_task("   ", &storage, &clock()).await.is_err());
        assert!(storage.list_tasks().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn bulk_skips_blank_lines() -> Result<()> {
        let (_dir, storage) = storage_with(&[]).await?;
        let input: &[u8] = b"write report\n\n  call mom  \n";

        let created = create_tasks_from_lines(input, &storage, &clock()).await?;

        assert_eq!(
            created.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["write report", "call mom"]
        );
        assert_ne!(created[0].id, created[1].id);
        assert!(created.iter().all(|v| v.date == today()));
        Ok(())
    }

    #[tokio::test]
    async fn complete_by_number() -> Result<()> {
        let (_dir, storage) = storage_with(&["a", "b"]).await?;

        let result = complete_task_number(2, &storage, &clock()).await?;
        let TaskCompletion::Completed(task) = result else {
            panic!("expected a completed task");
        };
        assert_eq!(task.name, "b");
        assert!(task.completed_at.is_some());

        assert!(matches!(
            complete_task_number(2, &storage, &clock()).await?,
            TaskCompletion::AlreadyCompleted(_)
        ));
        assert!(complete_task_number(0, &storage, &clock()).await.is_err());
        assert!(complete_task_number(3, &storage, &clock()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn delete_by_number() -> Result<()> {
        let (_dir, storage) = storage_with(&["a", "b", "c"]).await?;

        let deleted = delete_task_number(1, &storage, &clock()).await?;

        assert_eq!(deleted.name, "a");
        let left = storage.tasks_for_date(today()).await?;
        assert_eq!(
            left.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["b", "c"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn bulk_delete_is_all_or_nothing() -> Result<()> {
        let (_dir, storage) = storage_with(&["a", "b", "c"]).await?;

        let invalid = BulkDeleteCommand {
            numbers: vec![1, 4],
            all: false,
        };
        assert!(delete_task_numbers(invalid, &storage, &clock()).await.is_err());
        assert_eq!(storage.list_tasks().await?.len(), 3);

        let repeated = BulkDeleteCommand {
            numbers: vec![3, 1, 3],
            all: false,
        };
        assert_eq!(delete_task_numbers(repeated, &storage, &clock()).await?, 2);

        let all = BulkDeleteCommand {
            numbers: vec![],
            all: true,
        };
        assert_eq!(delete_task_numbers(all, &storage, &clock()).await?, 1);
        assert!(storage.list_tasks().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn listing_marks_completed_tasks() -> Result<()> {
        let (_dir, storage) = storage_with(&["open", "done"]).await?;
        complete_task_number(2, &storage, &clock()).await?;
        let tasks = storage.tasks_for_date(today()).await?;

        assert_eq!(task_line(1, &tasks[0]), "⬜ 1. open");
        let done = task_line(2, &tasks[1]);
        assert!(done.contains("✅"));
        assert!(done.contains(" 2. "));
        assert!(done.contains("done"));
        Ok(())
    }
}

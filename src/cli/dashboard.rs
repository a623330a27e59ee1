use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    report::{
        compute_statistics,
        labels::{productivity_label, sleep_label},
        normalize::NormalizedLogEntry,
        statistics::format_tenth,
    },
    storage::{
        entities::{LogEntry, TaskEntry},
        JournalStorage,
    },
    utils::clock::{Clock, ClockExt},
};

use super::tasks::task_line;

const SHOWN_TASKS: usize = 5;
const TREND_DAYS: usize = 7;

/// Everything the dashboard shows, already loaded.
pub struct DashboardData<'a> {
    pub today: NaiveDate,
    pub today_log: Option<&'a LogEntry>,
    pub tasks: &'a [TaskEntry],
    pub logs: &'a [LogEntry],
}

pub fn render_dashboard(data: &DashboardData) -> Vec<String> {
    let heading = Colour::Blue.bold();
    let hint = Style::new().dimmed();
    let mut lines = vec![
        heading
            .paint("╔════════════════════════════════════════╗")
            .to_string(),
        heading
            .paint("║          LIFELOG DASHBOARD             ║")
            .to_string(),
        heading
            .paint("╚════════════════════════════════════════╝")
            .to_string(),
        String::new(),
        Colour::Cyan
            .paint(format!("📅 {}", data.today.format("%A, %B %-d, %Y")))
            .to_string(),
        String::new(),
    ];

    match data.today_log.map(NormalizedLogEntry::from) {
        Some(log) => {
            lines.push(Colour::Green.paint("✅ Today's Log").to_string());
            if let Some(morning) = &log.morning {
                if let Some(sleep) = morning.sleep_quality {
                    lines.push(format!("  😴 Sleep: {}", sleep_label(sleep)));
                }
                if let Some(grateful_for) = &morning.grateful_for {
                    lines.push(format!("  🙏 Grateful: {grateful_for}"));
                }
            }
            match &log.evening {
                Some(evening) => {
                    if let Some(rating) = evening.day_rating {
                        lines.push(format!("  ⭐ Day Rating: {rating}/10"));
                    }
                    if let Some(productivity) = evening.productivity {
                        lines.push(format!(
                            "  🎯 Productivity: {}",
                            productivity_label(productivity)
                        ));
                    }
                }
                None => {
                    lines.push(Colour::Yellow.paint("  Evening entry pending").to_string());
                    lines.push(hint.paint("  Run: lifelog finish").to_string());
                }
            }
        }
        None => {
            lines.push(
                Colour::Yellow
                    .paint("📝 No log entry for today yet")
                    .to_string(),
            );
            lines.push(hint.paint("  Run: lifelog start").to_string());
        }
    }
    lines.push(String::new());

    lines.push(Colour::Cyan.paint("📋 Today's Tasks").to_string());
    if data.tasks.is_empty() {
        lines.push(hint.paint("  No tasks yet").to_string());
        lines.push(hint.paint("  Run: lifelog create \"task name\"").to_string());
    } else {
        let completed = data.tasks.iter().filter(|v| v.completed).count();
        lines.push(format!(
            "  Total: {} | Completed: {completed}",
            data.tasks.len()
        ));
        for (i, task) in data.tasks.iter().take(SHOWN_TASKS).enumerate() {
            lines.push(format!("  {}", task_line(i + 1, task)));
        }
        if data.tasks.len() > SHOWN_TASKS {
            lines.push(
                hint.paint(format!("  ... and {} more", data.tasks.len() - SHOWN_TASKS))
                    .to_string(),
            );
        }
        lines.push(hint.paint("  Run: lifelog tasks (to view all)").to_string());
        if completed < data.tasks.len() {
            lines.push(hint.paint("  Run: lifelog complete <number>").to_string());
        }
    }
    lines.push(String::new());

    if data.logs.len() > 1 {
        let mut recent = data.logs.to_vec();
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        recent.truncate(TREND_DAYS);
        if let Some(statistics) = compute_statistics(&recent) {
            lines.push(Colour::Cyan.paint("📊 7-Day Trend").to_string());
            lines.push(format!(
                "  Average Rating: {}/10",
                format_tenth(statistics.avg_day_rating)
            ));
            if let Some(productivity) = statistics.avg_productivity {
                lines.push(format!(
                    "  Average Productivity: {}/5",
                    format_tenth(productivity)
                ));
            }
            lines.push(format!(
                "  Logged Days: {}/{TREND_DAYS}",
                statistics.total_logged_days
            ));
            lines.push(hint.paint("  Run: lifelog history (for more details)").to_string());
            lines.push(String::new());
        }
    }

    lines.push(Colour::Cyan.paint("⚡ Quick Actions").to_string());
    for action in [
        "  lifelog start        - Start your day",
        "  lifelog finish       - Finish your day",
        "  lifelog create \"...\" - Create a task",
        "  lifelog tasks        - View tasks",
        "  lifelog history      - View history",
    ] {
        lines.push(hint.paint(action).to_string());
    }
    lines
}

pub async fn process_dashboard_command(
    storage: &impl JournalStorage,
    clock: &impl Clock,
) -> Result<()> {
    let today = clock.today();
    let logs = storage.list_logs().await?;
    let tasks = storage.tasks_for_date(today).await?;

    let data = DashboardData {
        today,
        today_log: logs.iter().find(|v| v.date == today),
        tasks: &tasks,
        logs: &logs,
    };
    for line in render_dashboard(&data) {
        println!("{line}");
    }
    Ok(())
}

pub mod dashboard;
pub mod entry;
pub mod history;
pub mod overview;
pub mod tasks;

use std::{fmt::Display, path::PathBuf};

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use dashboard::process_dashboard_command;
use entry::{
    process_finish_command, process_quick_command, process_start_command, FinishCommand,
    QuickCommand, StartCommand,
};
use history::{process_history_command, HistoryCommand};
use overview::process_overview_command;
use tasks::{
    process_bulk_command, process_bulk_delete_command, process_complete_command,
    process_create_command, process_delete_command, process_tasks_command, BulkDeleteCommand,
};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    storage::{JsonStorage, StorageConfig},
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_dir},
        logging::{enable_logging, LoggingOptions},
    },
};

#[derive(Parser, Debug)]
#[command(name = "lifelog", version, long_about = None)]
#[command(about = "Daily journal for sleep, mood, productivity and tasks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Data directory. By default $HOME/.lifelog is used"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long = "overview-file",
        global = true,
        help = "Where the overview document is written. By default OVERVIEW.md inside the data directory"
    )]
    overview_file: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Log level, e.g. \"debug\". Falls back to RUST_LOG and then to \"info\""
    )]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Show today's entry, tasks and the recent trend. This is the default")]
    Dashboard,
    #[command(about = "Record the morning part of today's entry")]
    Start {
        #[command(flatten)]
        command: StartCommand,
    },
    #[command(about = "Record the evening part of today's entry")]
    Finish {
        #[command(flatten)]
        command: FinishCommand,
    },
    #[command(about = "Record a whole day at once")]
    Quick {
        #[command(flatten)]
        command: QuickCommand,
    },
    #[command(about = "Create a task for today")]
    Create {
        #[arg(required = true, help = "Task name, multiple words are joined")]
        name: Vec<String>,
    },
    #[command(about = "Create one task per line read from standard input")]
    Bulk,
    #[command(about = "Mark a task of today as completed")]
    Complete {
        #[arg(help = "Number of the task as shown by `tasks`")]
        number: usize,
    },
    #[command(about = "Delete a task of today")]
    Delete {
        #[arg(help = "Number of the task as shown by `tasks`")]
        number: usize,
    },
    #[command(about = "Delete several tasks of today")]
    BulkDelete {
        #[command(flatten)]
        command: BulkDeleteCommand,
    },
    #[command(about = "List today's tasks")]
    Tasks,
    #[command(about = "Summarize entries of a time frame")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
    #[command(about = "Regenerate the overview document")]
    Overview {
        #[arg(long, help = "Print the document instead of writing it")]
        stdout: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let data_dir = match args.dir {
        Some(dir) => create_dir(dir)?,
        None => create_application_default_path()?,
    };
    let mut config = StorageConfig::new(data_dir);
    if let Some(path) = args.overview_file {
        config = config.with_overview_path(path);
    }

    enable_logging(
        &config.log_dir(),
        LoggingOptions::from_flags(args.log_filter, args.log),
    )?;
    debug!("Using data directory {:?}", config.data_dir);

    let storage = JsonStorage::new(&config)?;
    let clock = DefaultClock;

    match args.commands.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => process_dashboard_command(&storage, &clock).await,
        Commands::Start { command } => {
            process_start_command(command, &storage, &clock, &config).await
        }
        Commands::Finish { command } => {
            process_finish_command(command, &storage, &clock, &config).await
        }
        Commands::Quick { command } => {
            process_quick_command(command, &storage, &clock, &config).await
        }
        Commands::Create { name } => process_create_command(&name.join(" "), &storage, &clock).await,
        Commands::Bulk => process_bulk_command(tokio::io::stdin(), &storage, &clock).await,
        Commands::Complete { number } => process_complete_command(number, &storage, &clock).await,
        Commands::Delete { number } => process_delete_command(number, &storage, &clock).await,
        Commands::BulkDelete { command } => {
            process_bulk_delete_command(command, &storage, &clock).await
        }
        Commands::Tasks => process_tasks_command(&storage, &clock).await,
        Commands::History { command } => process_history_command(command, &storage, &clock).await,
        Commands::Overview { stdout } => {
            process_overview_command(stdout, &storage, &clock, &config).await
        }
    }
}

/// Error reported the same way clap reports invalid arguments.
fn validation_error(message: impl Display) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message)
        .into()
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Args, Commands};

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn dashboard_is_default() {
        let args = Args::try_parse_from(["lifelog", "--dir", "/tmp/journal"]).unwrap();
        assert!(args.commands.is_none());
        assert_eq!(args.dir.unwrap().to_str(), Some("/tmp/journal"));
    }

    #[test]
    fn ratings_are_range_checked() {
        assert!(Args::try_parse_from([
            "lifelog", "quick", "--sleep", "6", "--rating", "5", "--productivity", "3"
        ])
        .is_err());
        let args = Args::try_parse_from([
            "lifelog",
            "finish",
            "--rating",
            "10",
            "--productivity",
            "1",
            "--overview",
            "Long day",
        ])
        .unwrap();
        assert!(matches!(args.commands, Some(Commands::Finish { .. })));
    }
}

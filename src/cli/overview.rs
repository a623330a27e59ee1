use std::path::Path;

use ansi_term::Colour;
use anyhow::Result;
use tracing::{info, warn};

use crate::{
    fs::operations::write_locked,
    report::generate_overview,
    storage::{JournalStorage, StorageConfig},
    utils::clock::Clock,
};

/// Regenerates the overview document from every stored entry and replaces the file at `path`.
pub async fn write_overview(
    storage: &impl JournalStorage,
    clock: &impl Clock,
    path: &Path,
) -> Result<()> {
    let logs = storage.list_logs().await?;
    let document = generate_overview(&logs, clock.time().naive_local());
    write_locked(path, &document).await?;
    info!("Overview written to {path:?}");
    Ok(())
}

/// Used after an entry was saved. The entry is already persisted at this point, so a failure only
/// gets reported.
pub async fn refresh_overview(
    storage: &impl JournalStorage,
    clock: &impl Clock,
    config: &StorageConfig,
) {
    if let Err(e) = write_overview(storage, clock, config.overview_path()).await {
        warn!("Failed to update overview {e:?}");
        println!(
            "{}",
            Colour::Yellow.paint(format!("⚠️  Could not update the overview: {e}"))
        );
    }
}

pub async fn process_overview_command(
    stdout: bool,
    storage: &impl JournalStorage,
    clock: &impl Clock,
    config: &StorageConfig,
) -> Result<()> {
    if stdout {
        let logs = storage.list_logs().await?;
        print!("{}", generate_overview(&logs, clock.time().naive_local()));
        return Ok(());
    }

    write_overview(storage, clock, config.overview_path()).await?;
    println!(
        "{}",
        Colour::Green.paint(format!(
            "✅ Overview updated: {}",
            config.overview_path().display()
        ))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    use crate::{
        fs::operations::{read_locked, write_locked},
        storage::{JsonStorage, StorageConfig},
        utils::clock::fixed_clock,
    };

    use super::{refresh_overview, write_overview};

    #[tokio::test]
    async fn overview_is_rewritten_in_full() -> Result<()> {
        let dir = tempdir()?;
        let config = StorageConfig::new(dir.path().to_owned())
            .with_overview_path(dir.path().join("docs").join("OVERVIEW.md"));
        write_locked(
            &config.logs_file(),
            r#"[{"date": "2024-03-09", "eveningEntry": {"dayRating": 7, "productivity": 4}}]"#,
        )
        .await?;
        write_locked(config.overview_path(), &"stale ".repeat(1000)).await?;
        let storage = JsonStorage::new(&config)?;
        let clock = fixed_clock(Local.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap());

        write_overview(&storage, &clock, config.overview_path()).await?;

        let written = read_locked(config.overview_path()).await?.unwrap();
        assert!(written.starts_with("# 📊 Life Log Overview\n\n*Last updated: March 10, 2024 8:30 AM*"));
        assert!(written.contains("| ⭐ Average Day Rating | 7.0/10 |"));
        assert!(!written.contains("stale"));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_survives_unreadable_logs() -> Result<()> {
        let dir = tempdir()?;
        let config = StorageConfig::new(dir.path().to_owned());
        write_locked(&config.logs_file(), "{}").await?;
        let storage = JsonStorage::new(&config)?;
        let clock = fixed_clock(Local.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap());

        refresh_overview(&storage, &clock, &config).await;

        assert_eq!(read_locked(config.overview_path()).await?, None);
        Ok(())
    }
}

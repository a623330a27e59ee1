use std::{io::ErrorKind, path::Path};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{self, AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::debug;

/// Reads the whole file under a shared lock. A missing file is reported as `None`.
pub async fn read_locked(path: &Path) -> Result<Option<String>, io::Error> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    debug!("Reading {path:?}");
    file.lock_shared()?;
    let mut contents = String::new();
    let result = file.read_to_string(&mut contents).await;
    file.unlock_async().await?;
    result?;
    Ok(Some(contents))
}

/// Replaces the contents of a file under an exclusive lock. Parent directories are created when
/// needed.
pub async fn write_locked(path: &Path, contents: &str) -> Result<(), io::Error> {
    rewrite_locked(path, |_| Ok::<_, io::Error>((contents.to_owned(), ()))).await
}

/// Read-modify-write cycle for a file. The exclusive lock is held from reading the previous
/// contents until the new contents are flushed, so that concurrent invocations can't interleave.
///
/// `update` receives the previous contents (empty for a new file) and returns the new contents
/// together with a value passed back to the caller. When `update` fails the file is left untouched.
pub async fn rewrite_locked<T, E>(
    path: &Path,
    update: impl FnOnce(&str) -> Result<(String, T), E>,
) -> Result<T, E>
where
    E: From<io::Error>,
{
    if let Some(parent) = path.parent().filter(|v| !v.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await?;

    // Semi-safe acquire-release for a file
    file.lock_exclusive()?;
    let result = rewrite_with_file(&mut file, update).await;
    file.unlock_async().await?;
    result
}

async fn rewrite_with_file<T, E>(
    file: &mut File,
    update: impl FnOnce(&str) -> Result<(String, T), E>,
) -> Result<T, E>
where
    E: From<io::Error>,
{
    let mut previous = String::new();
    file.read_to_string(&mut previous).await?;

    let (next, value) = update(&previous)?;

    file.rewind().await?;
    file.set_len(0).await?;
    file.write_all(next.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use tempfile::tempdir;

    use crate::fs::operations::{read_locked, rewrite_locked, write_locked};

    #[tokio::test]
    async fn test_read_missing_file() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(read_locked(&dir.path().join("missing.json")).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("OVERVIEW.md");

        write_locked(&path, "first version, quite long").await?;
        write_locked(&path, "second").await?;

        assert_eq!(read_locked(&path).await?.as_deref(), Some("second"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rewrite_sees_previous_contents() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("counter");

        for _ in 0..3 {
            rewrite_locked(&path, |previous| {
                let count = previous.parse::<u32>().unwrap_or(0) + 1;
                Ok::<_, anyhow::Error>((count.to_string(), ()))
            })
            .await?;
        }

        assert_eq!(read_locked(&path).await?.as_deref(), Some("3"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_rewrite_keeps_contents() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");
        write_locked(&path, "[]").await?;

        let result = rewrite_locked(&path, |_| {
            Err::<(String, ()), _>(anyhow!("refusing to write"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(read_locked(&path).await?.as_deref(), Some("[]"));
        Ok(())
    }
}

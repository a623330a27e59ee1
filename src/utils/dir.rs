use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

/// `~/.lifelog`, created if missing.
pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path = env::var("USERPROFILE")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("USERPROFILE should be present on Windows"))?;
            path.push(".lifelog");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("HOME")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("Couldn't find HOME, pass --dir explicitly"))?;
            path.push(".lifelog");
            path
        }
    };

    create_dir(path)
}

pub fn create_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

use std::path::{Path, PathBuf};

pub const LOGS_FILE_NAME: &str = "logs.json";
pub const TASKS_FILE_NAME: &str = "tasks.json";
pub const OVERVIEW_FILE_NAME: &str = "OVERVIEW.md";

/// Locations used by [JsonStorage](super::journal_storage::JsonStorage) and by the overview
/// writer. Built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub overview_path: PathBuf,
}

impl StorageConfig {
    /// Everything lives in `data_dir`, the overview included.
    pub fn new(data_dir: PathBuf) -> Self {
        let overview_path = data_dir.join(OVERVIEW_FILE_NAME);
        Self {
            data_dir,
            overview_path,
        }
    }

    pub fn with_overview_path(self, overview_path: PathBuf) -> Self {
        Self {
            overview_path,
            ..self
        }
    }

    pub fn logs_file(&self) -> PathBuf {
        self.data_dir.join(LOGS_FILE_NAME)
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn overview_path(&self) -> &Path {
        &self.overview_path
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::StorageConfig;

    #[test]
    fn overview_defaults_to_data_dir() {
        let config = StorageConfig::new(PathBuf::from("/data/lifelog"));
        assert_eq!(config.logs_file(), PathBuf::from("/data/lifelog/logs.json"));
        assert_eq!(config.tasks_file(), PathBuf::from("/data/lifelog/tasks.json"));
        assert_eq!(
            config.overview_path(),
            PathBuf::from("/data/lifelog/OVERVIEW.md").as_path()
        );

        let config = config.with_overview_path(PathBuf::from("/repo/OVERVIEW.md"));
        assert_eq!(config.overview_path(), PathBuf::from("/repo/OVERVIEW.md").as_path());
    }
}

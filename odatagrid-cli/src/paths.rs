//! Log file locations and rotation.
//!
//! Each run writes `latest.log` into the log directory. At startup the
//! previous `latest.log` is archived as `odatagrid-<timestamp>.log` and the
//! oldest archives beyond [`MAX_ARCHIVED_LOGS`] are removed.

use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

/// Environment variable overriding the log directory.
pub const LOG_DIR_ENV: &str = "ODATAGRID_LOG_DIR";

const LATEST_LOG: &str = "latest.log";
const ARCHIVE_PREFIX: &str = "odatagrid-";
const ARCHIVE_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Archived logs kept after rotation.
pub const MAX_ARCHIVED_LOGS: usize = 25;

/// Picks the log directory: an explicit `--log-dir`, then
/// [`LOG_DIR_ENV`], then the platform cache directory.
///
/// The cache directory is `~/.cache/odatagrid/logs` on Linux,
/// `~/Library/Caches/dev.odatagrid.odatagrid/logs` on macOS and
/// `%LOCALAPPDATA%\odatagrid\odatagrid\cache\logs` on Windows.
pub fn resolve_log_dir(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .or_else(|| env::var_os(LOG_DIR_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(|| {
            ProjectDirs::from("dev", "odatagrid", "odatagrid").map(|dirs| dirs.cache_dir().join("logs"))
        })
}

/// The log files of one directory.
#[derive(Debug, Clone)]
pub struct LogDir {
    dir: PathBuf,
}

impl LogDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the log written by this run.
    pub fn latest(&self) -> PathBuf {
        self.dir.join(LATEST_LOG)
    }

    /// Creates the directory, archives the previous `latest.log` and prunes
    /// old archives down to `keep`.
    ///
    /// Returns the archive path, if a previous log existed.
    pub fn rotate(&self, keep: usize) -> io::Result<Option<PathBuf>> {
        fs::create_dir_all(&self.dir)?;

        let latest = self.latest();
        let archived = if latest.exists() {
            let stamp = chrono::Local::now().format(ARCHIVE_TIMESTAMP).to_string();
            let target = self.free_archive_path(&stamp);
            fs::rename(&latest, &target)?;
            Some(target)
        } else {
            None
        };

        self.prune(keep)?;
        Ok(archived)
    }

    /// Archived logs, oldest first. Archive names sort by timestamp.
    pub fn archives(&self) -> io::Result<Vec<PathBuf>> {
        let mut archives: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_archive(path))
            .collect();
        archives.sort();
        Ok(archives)
    }

    /// Removes the oldest archives beyond `keep`. Returns how many were removed.
    pub fn prune(&self, keep: usize) -> io::Result<usize> {
        let archives = self.archives()?;
        let excess = archives.len().saturating_sub(keep);
        for path in &archives[..excess] {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }

    /// Two runs in the same second get `_1`, `_2`, ... suffixes.
    fn free_archive_path(&self, stamp: &str) -> PathBuf {
        let mut candidate = self.dir.join(format!("{}{}.log", ARCHIVE_PREFIX, stamp));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("{}{}_{}.log", ARCHIVE_PREFIX, stamp, n));
            n += 1;
        }
        candidate
    }
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("odatagrid-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_explicit_dir_wins() {
        let dir = PathBuf::from("/tmp/explicit-logs");
        assert_eq!(resolve_log_dir(Some(dir.clone())), Some(dir));
    }

    #[test]
    fn test_rotate_archives_previous_log() {
        let dir = temp_dir("rotate");
        let logs = LogDir::new(&dir);

        assert_eq!(logs.rotate(5).unwrap(), None);
        fs::write(logs.latest(), "first run").unwrap();

        let archived = logs.rotate(5).unwrap().unwrap();
        assert!(!logs.latest().exists());
        assert_eq!(fs::read_to_string(&archived).unwrap(), "first run");

        fs::write(logs.latest(), "second run").unwrap();
        let second = logs.rotate(5).unwrap().unwrap();
        assert_ne!(archived, second);
        assert_eq!(logs.archives().unwrap().len(), 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_prune_keeps_newest_archives_only() {
        let dir = temp_dir("prune");
        fs::create_dir_all(&dir).unwrap();
        for name in [
            "odatagrid-20260101_000000.log",
            "odatagrid-20260102_000000.log",
            "odatagrid-20260103_000000.log",
            LATEST_LOG,
            "other.log",
            "notes.txt",
        ] {
            fs::write(dir.join(name), name).unwrap();
        }

        assert_eq!(LogDir::new(&dir).prune(1).unwrap(), 2);
        assert_eq!(
            file_names(&dir),
            ["latest.log", "notes.txt", "odatagrid-20260103_000000.log", "other.log"]
        );

        let _ = fs::remove_dir_all(&dir);
    }
}

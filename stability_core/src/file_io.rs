//! # Project Files
//!
//! Loading-computer projects live on shared bridge and office drives, so
//! saving is careful about partial writes and concurrent editors:
//! - **Atomic saves**: write `.stab.tmp`, fsync, rename over the target
//! - **Locking**: an OS lock via fs2 plus a `.stab.lock` sidecar naming the holder
//! - **Version check**: refuse files written by an incompatible schema
//!
//! ## Example
//!
//! ```rust,no_run
//! use stability_core::file_io::{load_project, save_project, FileLock};
//! use stability_core::model::Ship;
//! use stability_core::project::Project;
//! use std::path::Path;
//!
//! let path = Path::new("mv_example.stab");
//! let project = Project::new(Ship::new("MV Example", 150.0, 25.0, 15.0, 10.0), "Chief Officer");
//!
//! let lock = FileLock::acquire(path, "chief.officer")?;
//! save_project(&project, path)?;
//! drop(lock);
//!
//! let loaded = load_project(path)?;
//! assert_eq!(loaded.ship.name, "MV Example");
//! # Ok::<(), stability_core::StabilityError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{StabResult, StabilityError};
use crate::project::{Project, SCHEMA_VERSION};

/// Project file extension
pub const PROJECT_EXTENSION: &str = "stab";

/// Locks older than this are treated as abandoned
const LOCK_MAX_AGE_HOURS: i64 = 24;

/// Contents of a `.stab.lock` sidecar file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock (user name or e-mail)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process.
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// True when the holding process is gone or the lock has expired.
    pub fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > chrono::Duration::hours(LOCK_MAX_AGE_HOURS) {
            return true;
        }
        match hostname() {
            Some(machine) if machine == self.machine => !process_alive(self.pid),
            _ => false,
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    std::process::Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains(&pid.to_string()))
        .unwrap_or(true)
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

fn io_error(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> StabilityError {
    let path = path.display().to_string();
    move |e| StabilityError::file_error(operation, path, e.to_string())
}

/// Exclusive lock on a project file, released on drop.
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    // Holds the OS lock
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for a project file.
    ///
    /// A sidecar left behind by a dead process or older than a day is taken
    /// over.
    ///
    /// # Errors
    ///
    /// * `FileLocked` - Another live process holds the lock
    /// * `FileError` - The sidecar cannot be written
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> StabResult<Self> {
        let lock_path = lock_path_for(path);
        if let Some(holder) = read_lock_info(&lock_path) {
            if !holder.is_stale() {
                return Err(StabilityError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", holder.user_id, holder.machine),
                    holder.locked_at.to_rfc3339(),
                ));
            }
            warn!(path = %path.display(), holder = %holder.user_id, "taking over stale lock");
        }

        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;
        handle
            .try_lock_exclusive()
            .map_err(|_| StabilityError::file_locked(path.display().to_string(), "another process", "unknown"))?;

        let info = LockInfo::new(user_id);
        handle
            .write_all(serde_json::to_string_pretty(&info)?.as_bytes())
            .map_err(io_error("write lock", &lock_path))?;
        handle.sync_all().map_err(io_error("sync lock", &lock_path))?;
        debug!(path = %path.display(), user = %info.user_id, "lock acquired");

        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current live holder of a project file's lock, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `project.stab` → `project.stab.lock`
fn lock_path_for(project_path: &Path) -> PathBuf {
    let extension = project_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    project_path.with_extension(extension)
}

/// Unreadable or malformed sidecars count as no lock.
fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a project with atomic write semantics.
///
/// The JSON goes to a `.tmp` sibling, is synced to disk, then renamed over
/// `path`, so an interrupted save leaves the previous file intact.
pub fn save_project(project: &Project, path: &Path) -> StabResult<()> {
    let json = serde_json::to_string_pretty(project)?;
    let tmp_path = path.with_extension(format!("{}.tmp", PROJECT_EXTENSION));

    let mut tmp = File::create(&tmp_path).map_err(io_error("create temp file", &tmp_path))?;
    tmp.write_all(json.as_bytes()).map_err(io_error("write temp file", &tmp_path))?;
    tmp.sync_all().map_err(io_error("sync temp file", &tmp_path))?;
    drop(tmp);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error("rename to final", path)(e));
    }

    info!(
        path = %path.display(),
        ship = %project.ship.name,
        conditions = project.conditions.len(),
        "project saved"
    );
    Ok(())
}

/// Load a project file and check its schema version.
///
/// # Errors
///
/// * `FileError` - The file cannot be read
/// * `SerializationError` - The file is not a valid project
/// * `VersionMismatch` - The file was written by an incompatible schema
pub fn load_project(path: &Path) -> StabResult<Project> {
    let contents = fs::read_to_string(path).map_err(io_error("read", path))?;
    let project: Project = serde_json::from_str(&contents).map_err(|e| StabilityError::SerializationError {
        reason: format!("Invalid project file {}: {}", path.display(), e),
    })?;
    validate_version(&project.meta.version)?;

    info!(path = %path.display(), ship = %project.ship.name, version = %project.meta.version, "project loaded");
    Ok(project)
}

/// Load a project and report another user's lock, if one is held.
///
/// A locked project still loads; callers should open it read-only.
pub fn load_project_with_lock_check(path: &Path) -> StabResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, FileLock::check(path)))
}

fn parse_version(version: &str) -> Vec<u32> {
    version.split('.').map_while(|part| part.trim().parse().ok()).collect()
}

/// Major versions must match; within 0.x a newer minor is also refused.
fn validate_version(file_version: &str) -> StabResult<()> {
    let mismatch = || StabilityError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let file = parse_version(file_version);
    let current = parse_version(SCHEMA_VERSION);

    match (file.as_slice(), current.as_slice()) {
        ([file_major, ..], [major, ..]) if file_major != major => Err(mismatch()),
        ([0, file_minor, ..], [0, minor, ..]) if file_minor > minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LoadingCondition, Ship, Tank};
    use tempfile::TempDir;

    fn project() -> Project {
        let mut project = Project::new(Ship::new("MV Test", 150.0, 25.0, 15.0, 10.0), "Chief Officer");
        project.tanks.push(Tank::new(1, "DB1", 500.0, 0.4, 1.0));
        project.save_condition(&LoadingCondition::new("Ballast").with_tank_volume(1, 250.0));
        project
    }

    #[test]
    fn test_lock_path_generation() {
        assert_eq!(lock_path_for(Path::new("/ships/mv.stab")), Path::new("/ships/mv.stab.lock"));
        assert_eq!(lock_path_for(Path::new("/ships/mv")), Path::new("/ships/mv.lock"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mv.stab");
        save_project(&project(), &path).unwrap();

        assert!(!path.with_extension("stab.tmp").exists());
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.prepared_by, "Chief Officer");
        assert_eq!(loaded.tanks.len(), 1);
        assert_eq!(loaded.condition("Ballast").unwrap().tank_volumes_m3[&1], 250.0);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let missing = load_project(&dir.path().join("none.stab")).unwrap_err();
        assert_eq!(missing.error_code(), "FILE_ERROR");

        let garbage = dir.path().join("bad.stab");
        fs::write(&garbage, "not a project").unwrap();
        assert_eq!(load_project(&garbage).unwrap_err().error_code(), "SERIALIZATION_ERROR");

        let mut future = project();
        future.meta.version = "0.9.0".to_string();
        let newer = dir.path().join("newer.stab");
        save_project(&future, &newer).unwrap();
        assert_eq!(load_project(&newer).unwrap_err().error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mv.stab");
        save_project(&project(), &path).unwrap();

        let lock = FileLock::acquire(&path, "master").unwrap();
        assert_eq!(lock.info.user_id, "master");
        assert_eq!(lock.project_path(), path.as_path());
        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_expired_lock_is_taken_over() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mv.stab");
        let old = LockInfo {
            user_id: "night.watch".to_string(),
            machine: "elsewhere".to_string(),
            pid: 1,
            locked_at: Utc::now() - chrono::Duration::hours(48),
        };
        fs::write(lock_path_for(&path), serde_json::to_string(&old).unwrap()).unwrap();
        assert!(old.is_stale());
        assert!(FileLock::check(&path).is_none());

        let lock = FileLock::acquire(&path, "day.watch").unwrap();
        assert_eq!(lock.info.user_id, "day.watch");
    }

    #[test]
    fn test_live_lock_from_other_machine_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mv.stab");
        save_project(&project(), &path).unwrap();
        let holder = LockInfo {
            user_id: "office".to_string(),
            machine: "shore-office-pc-without-this-name".to_string(),
            pid: 1,
            locked_at: Utc::now(),
        };
        fs::write(lock_path_for(&path), serde_json::to_string(&holder).unwrap()).unwrap();

        let err = FileLock::acquire(&path, "bridge").err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.is_recoverable());

        let (loaded, lock) = load_project_with_lock_check(&path).unwrap();
        assert_eq!(loaded.ship.name, "MV Test");
        assert_eq!(lock.unwrap().user_id, "office");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}

//! Where `dashsync` keeps its files: `<OS config dir>/.dashsync`, holding
//! `config.toml` and a `logs/` folder.
//!
//! `DASHSYNC_CONFIG_HOME` stands in for the OS config dir, so tests and
//! portable installs can keep everything under one folder.

use std::ffi::OsString;
use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the config base.
pub const APP_DIR_NAME: &str = ".dashsync";
/// Environment variable that replaces the OS config dir as the base.
pub const CONFIG_HOME_ENV: &str = "DASHSYNC_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

#[cfg(test)]
thread_local! {
    static BASE_OVERRIDE: std::cell::RefCell<Option<PathBuf>> =
        const { std::cell::RefCell::new(None) };
}

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No config directory found; set {CONFIG_HOME_ENV}")]
    NoBaseDir,
    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.dashsync` folder, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = base_dir().ok_or(AppDirError::NoBaseDir)?;
    create(base.join(APP_DIR_NAME))
}

/// `logs/` inside the app root, created on first use.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    create(app_root_dir()?.join(LOGS_DIR_NAME))
}

fn create(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn base_dir() -> Option<PathBuf> {
    test_override().or_else(|| {
        resolve_base(std::env::var_os(CONFIG_HOME_ENV), || {
            BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
        })
    })
}

/// A non-empty `env_value` wins over the OS default.
fn resolve_base(
    env_value: Option<OsString>,
    os_default: impl FnOnce() -> Option<PathBuf>,
) -> Option<PathBuf> {
    match env_value {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => os_default(),
    }
}

#[cfg(test)]
fn test_override() -> Option<PathBuf> {
    BASE_OVERRIDE.with(|slot| slot.borrow().clone())
}

#[cfg(not(test))]
fn test_override() -> Option<PathBuf> {
    None
}

/// Points the app root of the current test thread at `path` until dropped.
#[cfg(test)]
pub(crate) struct OverrideGuard {
    previous: Option<PathBuf>,
}

#[cfg(test)]
impl OverrideGuard {
    pub(crate) fn set(path: PathBuf) -> Self {
        let previous = BASE_OVERRIDE.with(|slot| slot.replace(Some(path)));
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for OverrideGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        BASE_OVERRIDE.with(|slot| *slot.borrow_mut() = previous);
    }
}

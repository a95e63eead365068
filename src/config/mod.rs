//! Client configuration stored as TOML under the `.dashsync` app root.

mod defaults;
mod io;
mod types;

pub use io::{CONFIG_FILE_NAME, config_path, load_from, load_or_default, save, save_to_path};
pub use types::{
    API_URL_ENV, ApiSettings, ConfigError, DashboardConfig, LogSettings, SyncSettings,
};

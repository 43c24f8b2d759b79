//! Default location of the app-data root.

use std::path::PathBuf;

/// Directory under the platform data dir that holds everything this application owns.
pub const APP_DIR_NAME: &str = "appdata_files";
/// Name of the browsable root inside [`APP_DIR_NAME`].
pub const APP_DATA_DIR_NAME: &str = "AppData";

/// Returns `<platform data dir>/appdata_files/AppData`, or `None` when the platform has no data
/// directory.
pub fn default_app_data_root() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME).join(APP_DATA_DIR_NAME))
}

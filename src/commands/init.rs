use console::style;
use std::path::{Path, PathBuf};

use crate::errors::{Result, SniperError};
use crate::models::settings::{get_settings_path, AppSettings};

/// Writes the effective settings (file values plus defaults for anything
/// missing) to `app_settings.json`, or to `output` when given.
pub fn init_settings(output: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = output.map(Path::to_path_buf).unwrap_or_else(get_settings_path);
    if path.exists() && !force {
        return Err(SniperError::InvalidInput(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )));
    }

    let settings = AppSettings::load();
    match output {
        Some(path) => settings.save_to(path)?,
        None => settings.save()?,
    }
    println!("{} Settings written to {}", style("✓").green(), path.display());
    Ok(path)
}

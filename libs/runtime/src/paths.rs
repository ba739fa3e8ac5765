//! Home directory resolution for the application's on-disk state (log files,
//! per-module YAML).

use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Platform base directory: `%APPDATA%` on Windows, `$HOME` elsewhere.
fn platform_base() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    match env::var_os(var) {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => bail!("environment variable {} is not set", var),
    }
}

/// Expand a leading `~` against the platform base directory.
fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_base();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_base()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Resolve the application home directory.
///
/// `None` selects `<platform base>/<default_subdir>`. A user value may start
/// with `~`; relative values are anchored at the current working directory.
/// With `create`, the directory is created if it does not exist.
pub fn resolve_home_dir(
    user: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match user {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_base()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        ensure_dir(&path)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        bail!("home_dir '{}' exists and is not a directory", path.display());
    }
    std::fs::create_dir_all(path)
        .with_context(|| format!("cannot create home_dir '{}'", path.display()))
}

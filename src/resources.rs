//! Location of the installation-wide stylesheets and scripts.
//!
//! Packages install them to a fixed directory. When that directory is
//! missing or incomplete, the copies compiled into the binary are written to
//! the per-user data directory and used instead.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::project_dirs;
use crate::error::{Error, Result};

/// Files making up the base resource directory.
pub const EMBEDDED: [(&str, &str); 5] = [
    ("style.css", include_str!("assets/style.css")),
    ("toc.css", include_str!("assets/toc.css")),
    ("dom.js", include_str!("assets/dom.js")),
    ("toc.js", include_str!("assets/toc.js")),
    ("viewer.js", include_str!("assets/viewer.js")),
];

/// Where packages install the resources on this platform.
#[cfg(not(windows))]
pub fn platform_default() -> PathBuf {
    PathBuf::from("/usr/share/mdzview")
}

#[cfg(windows)]
pub fn platform_default() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("res")))
        .unwrap_or_else(|| PathBuf::from("res"))
}

pub fn is_complete(dir: &Path) -> bool {
    EMBEDDED.iter().all(|(name, _)| dir.join(name).is_file())
}

/// Writes the embedded resources into `dir`, replacing older copies.
pub fn install(dir: &Path) -> Result<()> {
    let err = |source| Error::Resources {
        path: dir.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(err)?;
    for (name, contents) in EMBEDDED {
        fs::write(dir.join(name), contents).map_err(err)?;
    }
    Ok(())
}

fn user_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("res"))
        .unwrap_or_else(|| std::env::temp_dir().join("mdzview-res"))
}

/// Picks the resource directory: `configured`, else the platform default,
/// else a freshly installed per-user copy.
pub fn resolve(configured: Option<&Path>) -> Result<PathBuf> {
    let preferred = configured
        .map(Path::to_path_buf)
        .unwrap_or_else(platform_default);
    resolve_with_fallback(&preferred, &user_dir())
}

fn resolve_with_fallback(preferred: &Path, fallback: &Path) -> Result<PathBuf> {
    if is_complete(preferred) {
        tracing::debug!("Using resources from {:?}", preferred);
        return Ok(preferred.to_path_buf());
    }

    tracing::info!(
        "Resources missing from {:?}, installing bundled copies to {:?}",
        preferred,
        fallback
    );
    install(fallback)?;
    Ok(fallback.to_path_buf())
}

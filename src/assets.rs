//! Discovery of per-document stylesheets and scripts.
//!
//! Every `.css` and `.js` file sitting next to a markdown document is pulled
//! into the rendered page. The scan is flat, case-sensitive and sorted by
//! name so documents can control load order through file naming.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Stylesheet linked explicitly after all discovered ones.
pub const RESERVED_STYLESHEET: &str = "style.css";

/// Stylesheets beside `document`, sorted, without [`RESERVED_STYLESHEET`].
pub fn discover_stylesheets(document: &Path) -> Result<Vec<String>> {
    let mut names = sibling_names(document, ".css")?;
    names.retain(|name| name != RESERVED_STYLESHEET);
    Ok(names)
}

/// Scripts beside `document`, sorted.
pub fn discover_scripts(document: &Path) -> Result<Vec<String>> {
    sibling_names(document, ".js")
}

fn sibling_names(document: &Path, suffix: &str) -> Result<Vec<String>> {
    let dir = match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let entries = fs::read_dir(dir).map_err(|source| Error::ListDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::ListDir {
            path: dir.to_path_buf(),
            source,
        })?;
        // Names that aren't UTF-8 can't be written into the page anyway.
        if let Ok(name) = entry.file_name().into_string() {
            if name.ends_with(suffix) {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}

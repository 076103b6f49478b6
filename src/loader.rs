//! Turns a markdown file into the page handed to the webview.

use std::fs;
use std::path::{Path, PathBuf};

use crate::assemble::DocumentTemplate;
use crate::assets::{discover_scripts, discover_stylesheets};
use crate::error::{Error, Result};
use crate::markdown::{self, MarkdownOptions};
use crate::uri;

/// Everything a load needs besides the path.
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub template: DocumentTemplate,
    pub markdown: MarkdownOptions,
    /// Diagnostic dump of every assembled page. Off unless configured.
    pub debug_html: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    /// File name, used as the window title.
    pub title: String,
    /// URI the page is served under; relative references resolve against it.
    pub uri: String,
    pub html: String,
}

pub fn load_document(path: &Path, settings: &LoaderSettings) -> Result<LoadedDocument> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let body = markdown::to_html(&text, &settings.markdown);
    let stylesheets = discover_stylesheets(path)?;
    let scripts = discover_scripts(path)?;
    let html = settings.template.assemble(&stylesheets, &scripts, &body);

    if let Some(dump) = &settings.debug_html {
        match fs::write(dump, &html) {
            Ok(()) => tracing::debug!("Wrote assembled page to {:?}", dump),
            Err(e) => tracing::warn!("Could not write debug page {:?}: {}", dump, e),
        }
    }

    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string());

    tracing::info!(
        "Loaded {:?} ({} stylesheets, {} scripts)",
        path,
        stylesheets.len(),
        scripts.len()
    );

    Ok(LoadedDocument {
        path: path.to_path_buf(),
        title,
        uri: uri::for_path(path),
        html,
    })
}

/// A page with no document behind it: the welcome screen or a load error.
pub fn message_page(text: &str, settings: &LoaderSettings) -> String {
    let body = markdown::to_html(text, &settings.markdown);
    settings.template.assemble(&[], &[], &body)
}

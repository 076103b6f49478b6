//! What the viewer currently has open.

use std::path::{Path, PathBuf};

use crate::archive::{self, ExtractionSession};
use crate::error::Result;
use crate::loader::{load_document, LoadedDocument, LoaderSettings};

/// Which document-dependent actions are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actions {
    pub reload: bool,
    pub toggle_toc: bool,
}

/// Last loaded document plus the directory of the unpacked bundle, if any.
///
/// Only one bundle is unpacked at a time: opening another removes the
/// previous directory first. The directory is also removed on drop.
#[derive(Debug)]
pub struct Session {
    settings: LoaderSettings,
    last_loaded: Option<PathBuf>,
    extraction: Option<ExtractionSession>,
}

impl Session {
    pub fn new(settings: LoaderSettings) -> Self {
        Self {
            settings,
            last_loaded: None,
            extraction: None,
        }
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    pub fn last_loaded(&self) -> Option<&Path> {
        self.last_loaded.as_deref()
    }

    pub fn extraction_dir(&self) -> Option<&Path> {
        self.extraction.as_ref().map(ExtractionSession::dir)
    }

    pub fn actions(&self) -> Actions {
        let loaded = self.last_loaded.is_some();
        Actions {
            reload: loaded,
            toggle_toc: loaded,
        }
    }

    /// Opens a markdown file or, for `.mdz` paths, a bundle.
    pub fn open(&mut self, path: &Path) -> Result<LoadedDocument> {
        if archive::is_bundle(path) {
            self.load_zipped(path)
        } else {
            self.load_file(path)
        }
    }

    pub fn load_zipped(&mut self, path: &Path) -> Result<LoadedDocument> {
        self.cleanup();
        let extraction = archive::extract(path)?;
        let document = extraction.document().to_path_buf();
        self.extraction = Some(extraction);
        self.load_file(&document)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<LoadedDocument> {
        let document = load_document(path, &self.settings)?;
        self.last_loaded = Some(path.to_path_buf());
        Ok(document)
    }

    /// Loads the last document again. `Ok(None)` if nothing was ever loaded.
    pub fn reload(&mut self) -> Result<Option<LoadedDocument>> {
        match self.last_loaded.clone() {
            Some(path) => self.load_file(&path).map(Some),
            None => {
                tracing::debug!("Reload requested with no document loaded");
                Ok(None)
            }
        }
    }

    /// Removes the unpacked bundle directory. Failures are logged only.
    pub fn cleanup(&mut self) {
        let Some(extraction) = self.extraction.take() else {
            return;
        };
        let dir = extraction.dir().to_path_buf();
        match extraction.close() {
            Ok(()) => tracing::debug!("Removed extraction directory {:?}", dir),
            Err(e) => tracing::warn!("Could not remove extraction directory {:?}: {}", dir, e),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::DocumentTemplate;
    use crate::markdown::MarkdownOptions;
    use std::fs;

    fn session() -> Session {
        Session::new(LoaderSettings {
            template: DocumentTemplate::new("res"),
            markdown: MarkdownOptions::default(),
            debug_html: None,
        })
    }

    #[test]
    fn starts_empty_with_actions_disabled() {
        let session = session();
        assert!(session.last_loaded().is_none());
        assert!(session.extraction_dir().is_none());
        assert_eq!(session.actions(), Actions::default());
    }

    #[test]
    fn reload_without_document_is_noop() {
        let mut session = session();
        assert!(session.reload().unwrap().is_none());
        assert_eq!(session.actions(), Actions::default());
    }

    #[test]
    fn reload_picks_up_changes() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("a.md");
        fs::write(&doc, "first").unwrap();

        let mut session = session();
        session.open(&doc).unwrap();
        assert!(session.actions().reload && session.actions().toggle_toc);

        fs::write(&doc, "second").unwrap();
        let reloaded = session.reload().unwrap().unwrap();
        assert!(reloaded.html.contains("second"));
    }

    #[test]
    fn failed_load_keeps_previous_document() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("a.md");
        fs::write(&doc, "ok").unwrap();

        let mut session = session();
        session.open(&doc).unwrap();
        assert!(session.open(&tmp.path().join("missing.md")).is_err());
        assert_eq!(session.last_loaded(), Some(doc.as_path()));
    }

    #[test]
    fn cleanup_twice_is_harmless() {
        let mut session = session();
        session.cleanup();
        session.cleanup();
    }
}

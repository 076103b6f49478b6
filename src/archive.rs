//! Extraction of compressed markdown bundles (`.mdz`).
//!
//! A bundle is a plain ZIP archive whose root holds a markdown file named
//! after the archive (`notes.mdz` → `notes.md`) plus whatever images,
//! stylesheets and scripts it references by relative path.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};

/// Extension of compressed markdown bundles.
pub const BUNDLE_EXTENSION: &str = "mdz";

/// Whether `path` names a bundle. The extension check ignores case.
pub fn is_bundle(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(BUNDLE_EXTENSION))
}

/// A bundle unpacked into its own temporary directory.
#[derive(Debug)]
pub struct ExtractionSession {
    dir: TempDir,
    document: PathBuf,
}

impl ExtractionSession {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// The markdown file inside [`Self::dir`].
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Removes the directory, reporting what went wrong.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

/// Unpacks `archive` into a fresh temporary directory.
///
/// Entries whose names would land outside the directory fail the whole
/// extraction, and so does a bundle without its `<stem>.md` document.
pub fn extract(archive: &Path) -> Result<ExtractionSession> {
    let dir = tempfile::Builder::new()
        .prefix("mdzview-")
        .tempdir()
        .map_err(Error::TempDir)?;

    let file = File::open(archive).map_err(|source| Error::Read {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|source| Error::Archive {
        path: archive.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        "Extracting {} entries from {:?} into {:?}",
        zip.len(),
        archive,
        dir.path()
    );
    zip.extract(dir.path()).map_err(|source| Error::Archive {
        path: archive.to_path_buf(),
        source,
    })?;

    let expected = document_name(archive);
    let document = dir.path().join(&expected);
    if !document.is_file() {
        return Err(Error::MissingDocument {
            archive: archive.to_path_buf(),
            expected,
        });
    }

    tracing::info!("Extracted {:?} to {:?}", archive, dir.path());
    Ok(ExtractionSession { dir, document })
}

fn document_name(archive: &Path) -> String {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.md", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_bundle(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn detects_bundles_case_insensitively() {
        assert!(is_bundle(Path::new("/tmp/test.mdz")));
        assert!(is_bundle(Path::new("TEST.MDZ")));
        assert!(!is_bundle(Path::new("test.md")));
        assert!(!is_bundle(Path::new("mdz")));
    }

    #[test]
    fn extracts_document_and_assets() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("test.mdz");
        write_bundle(
            &bundle,
            &[("test.md", "# Test\n"), ("img/logo.png", "png bytes")],
        );

        let session = extract(&bundle).unwrap();
        assert!(session.document().ends_with("test.md"));
        assert_eq!(session.document().parent(), Some(session.dir()));
        assert!(session.dir().join("img/logo.png").is_file());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("broken.mdz");
        std::fs::write(&bundle, b"this is not a zip file").unwrap();

        assert!(matches!(extract(&bundle), Err(Error::Archive { .. })));
    }

    #[test]
    fn missing_document_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("notes.mdz");
        write_bundle(&bundle, &[("other.md", "# Other\n")]);

        match extract(&bundle) {
            Err(Error::MissingDocument { expected, .. }) => assert_eq!(expected, "notes.md"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn entries_escaping_the_directory_fail_extraction() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("doc.mdz");
        let escaped = format!(
            "{}-escaped.txt",
            tmp.path().file_name().unwrap().to_string_lossy()
        );
        let entry = format!("../{}", escaped);
        write_bundle(&bundle, &[("doc.md", "# Doc\n"), (entry.as_str(), "gotcha")]);

        assert!(matches!(extract(&bundle), Err(Error::Archive { .. })));
        // extraction dirs live directly under the system temp dir
        assert!(!std::env::temp_dir().join(&escaped).exists());
    }

    #[test]
    fn close_removes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("test.mdz");
        write_bundle(&bundle, &[("test.md", "x")]);

        let session = extract(&bundle).unwrap();
        let dir = session.dir().to_path_buf();
        session.close().unwrap();
        assert!(!dir.exists());
    }
}

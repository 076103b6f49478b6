//! Mapping between file-system paths and the URIs the webview sees.
//!
//! Documents and their sibling assets are served through the `mdzview`
//! custom protocol so that relative references (`style.css`, `img/a.png`)
//! resolve against the document's own directory.

use std::path::{Path, PathBuf};

/// Name of the custom protocol registered with the webview.
pub const SCHEME: &str = "mdzview";

/// Origin under which custom-protocol requests arrive. WebView2 only routes
/// custom schemes through `http://<scheme>.localhost`.
#[cfg(not(windows))]
pub const ORIGIN: &str = "mdzview://localhost";
#[cfg(windows)]
pub const ORIGIN: &str = "http://mdzview.localhost";

/// URI of the page shown when no document is loaded.
pub fn root() -> String {
    format!("{}/", ORIGIN)
}

/// Percent-encoded absolute URL path for `path`, always starting with `/`.
pub fn encode_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    #[cfg(windows)]
    let raw = raw.replace('\\', "/");

    let encoded = raw
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    if encoded.starts_with('/') {
        encoded
    } else {
        format!("/{}", encoded)
    }
}

/// Inverse of [`encode_path`] for the path part of a request.
pub fn decode_path(url_path: &str) -> Option<PathBuf> {
    let decoded: String = urlencoding::decode(url_path).ok()?.into_owned();
    #[cfg(windows)]
    let decoded = decoded.trim_start_matches('/').replace('/', "\\");
    Some(PathBuf::from(decoded))
}

/// Custom-protocol URI for a local file or directory.
pub fn for_path(path: &Path) -> String {
    format!("{}{}", ORIGIN, encode_path(path))
}

/// `file://` URI for handing a local path to other programs.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", encode_path(path))
}

/// Local path behind a custom-protocol URI, ignoring query and fragment.
pub fn to_local_path(uri: &str) -> Option<PathBuf> {
    let rest = uri.strip_prefix(ORIGIN)?;
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let url_path = &rest[..end];
    if url_path.is_empty() || url_path == "/" {
        return None;
    }
    decode_path(url_path)
}

/// Whether a navigation stays on the loaded document: the same URI, or the
/// same URI with a fragment or query attached.
pub fn targets_document(uri: &str, document_uri: &str) -> bool {
    match uri.strip_prefix(document_uri) {
        Some(rest) => rest.is_empty() || rest.starts_with(['#', '?']),
        None => false,
    }
}

/// What to hand to the system browser for a navigation we refuse: local
/// files become `file://` URIs, everything else passes through.
pub fn external_target(uri: &str) -> String {
    match to_local_path(uri) {
        Some(path) => {
            let fragment = uri.find('#').map(|i| &uri[i..]).unwrap_or("");
            format!("{}{}", file_uri(&path), fragment)
        }
        None => uri.to_string(),
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn encodes_spaces_but_keeps_tilde() {
        let path = Path::new("/home/me/~notes/my doc.md");
        assert_eq!(encode_path(path), "/home/me/~notes/my%20doc.md");
        assert_eq!(
            for_path(path),
            "mdzview://localhost/home/me/~notes/my%20doc.md"
        );
    }

    #[test]
    fn decodes_request_paths() {
        assert_eq!(
            decode_path("/tmp/a%20b/c.css"),
            Some(PathBuf::from("/tmp/a b/c.css"))
        );
    }

    #[test]
    fn relative_paths_get_leading_slash() {
        assert_eq!(encode_path(Path::new("docs/a.md")), "/docs/a.md");
    }

    #[test]
    fn local_path_ignores_fragment_and_query() {
        assert_eq!(
            to_local_path("mdzview://localhost/tmp/a%20b.md#intro"),
            Some(PathBuf::from("/tmp/a b.md"))
        );
        assert_eq!(
            to_local_path("mdzview://localhost/tmp/x.md?v=2"),
            Some(PathBuf::from("/tmp/x.md"))
        );
        assert_eq!(to_local_path("mdzview://localhost/"), None);
        assert_eq!(to_local_path("https://example.com/x"), None);
    }

    #[test]
    fn anchors_stay_on_document() {
        let doc = for_path(Path::new("/tmp/readme.md"));
        assert!(targets_document(&format!("{}#install", doc), &doc));
        assert!(targets_document(&doc, &doc));
        assert!(!targets_document(
            "mdzview://localhost/tmp/other.md",
            &doc
        ));
        assert!(!targets_document(&format!("{}.bak", doc), &doc));
    }

    #[test]
    fn local_links_leave_the_welcome_page() {
        assert!(targets_document(&format!("{}#top", root()), &root()));
        assert!(!targets_document(
            "mdzview://localhost/tmp/readme.md",
            &root()
        ));
    }

    #[test]
    fn external_target_converts_local_files() {
        assert_eq!(
            external_target("mdzview://localhost/tmp/other%20doc.md#top"),
            "file:///tmp/other%20doc.md#top"
        );
        assert_eq!(
            external_target("https://example.com/?q=1"),
            "https://example.com/?q=1"
        );
    }

    #[test]
    fn external_target_keeps_remote_urls_verbatim() {
        let url = "https://example.com/?a=1&calc";
        assert_eq!(external_target(url), url);
        assert_eq!(external_target("mailto:me@example.com"), "mailto:me@example.com");
    }
}

//! Responder for the `mdzview` custom protocol.
//!
//! The displayed page lives in memory; every other request is a file read
//! from disk, which is how sibling stylesheets, scripts and images of a
//! document (and the bundled resources) reach the webview.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use wry::http::{header::CONTENT_TYPE, Request, Response, StatusCode};

use crate::uri;

/// The page currently shown in the webview.
#[derive(Debug, Clone)]
pub struct ServedPage {
    pub uri: String,
    /// `None` for pages without a backing file (welcome, errors); those are
    /// served at the protocol root.
    pub path: Option<PathBuf>,
    pub html: String,
}

impl ServedPage {
    pub fn at_root(html: String) -> Self {
        Self {
            uri: uri::root(),
            path: None,
            html,
        }
    }
}

/// Shared between the event loop, which swaps pages, and the webview's
/// protocol and navigation handlers.
#[derive(Debug, Clone)]
pub struct PageSlot(Arc<Mutex<ServedPage>>);

impl PageSlot {
    pub fn new(page: ServedPage) -> Self {
        Self(Arc::new(Mutex::new(page)))
    }

    fn lock(&self) -> MutexGuard<'_, ServedPage> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn replace(&self, page: ServedPage) {
        *self.lock() = page;
    }

    pub fn uri(&self) -> String {
        self.lock().uri.clone()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub mime: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn not_found() -> Self {
        Self {
            status: 404,
            mime: "text/plain",
            body: b"not found".to_vec(),
        }
    }
}

/// Answers a request for the URL path `url_path`.
pub fn respond(slot: &PageSlot, url_path: &str) -> Reply {
    let requested = if url_path.is_empty() || url_path == "/" {
        None
    } else {
        match uri::decode_path(url_path) {
            Some(path) => Some(path),
            None => return Reply::not_found(),
        }
    };

    {
        let page = slot.lock();
        if page.path == requested {
            return Reply {
                status: 200,
                mime: "text/html",
                body: page.html.clone().into_bytes(),
            };
        }
    }

    let Some(path) = requested else {
        return Reply::not_found();
    };
    match fs::read(&path) {
        Ok(body) => Reply {
            status: 200,
            mime: mime_for(&path),
            body,
        },
        Err(e) => {
            tracing::debug!("Cannot serve {:?}: {}", path, e);
            Reply::not_found()
        }
    }
}

/// Adapter for `WebViewBuilder::with_custom_protocol`.
pub fn handle(slot: &PageSlot, request: &Request<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    let reply = respond(slot, request.uri().path());
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, reply.mime)
        .body(Cow::Owned(reply.body))
        .unwrap_or_else(|e| {
            tracing::error!("Could not build protocol response: {}", e);
            Response::new(Cow::Borrowed(&[][..]))
        })
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "md" | "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn root_serves_message_page() {
        let slot = PageSlot::new(ServedPage::at_root("<p>welcome</p>".into()));
        let reply = respond(&slot, "/");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.mime, "text/html");
        assert_eq!(reply.body, b"<p>welcome</p>");
    }

    #[test]
    fn document_path_serves_page_from_memory() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("my doc.md");
        fs::write(&doc, "# raw markdown").unwrap();

        let slot = PageSlot::new(ServedPage::at_root(String::new()));
        slot.replace(ServedPage {
            uri: uri::for_path(&doc),
            path: Some(doc.clone()),
            html: "<h1>rendered</h1>".into(),
        });

        let reply = respond(&slot, &uri::encode_path(&doc));
        assert_eq!(reply.mime, "text/html");
        assert_eq!(reply.body, b"<h1>rendered</h1>");
        assert_eq!(slot.uri(), uri::for_path(&doc));
    }

    #[test]
    fn sibling_files_come_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let css = tmp.path().join("theme.css");
        fs::write(&css, "body {}").unwrap();
        let slot = PageSlot::new(ServedPage::at_root(String::new()));

        let reply = respond(&slot, &uri::encode_path(&css));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.mime, "text/css");
        assert_eq!(reply.body, b"body {}");

        let missing = respond(&slot, &uri::encode_path(&tmp.path().join("gone.png")));
        assert_eq!(missing.status, 404);
    }

    #[test]
    fn root_without_message_page_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("a.md");
        let slot = PageSlot::new(ServedPage {
            uri: uri::for_path(&doc),
            path: Some(doc),
            html: String::new(),
        });

        assert_eq!(respond(&slot, "/").status, 404);
    }
}

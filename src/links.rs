//! Hand-off of links to the system browser.

use crate::uri;

/// Opens `uri` outside the viewer. Local files are passed as `file://` URIs.
pub fn open_external(uri: &str) {
    let target = uri::external_target(uri);
    tracing::info!("Opening {} in the system browser", target);
    if let Err(e) = open::that(&target) {
        tracing::warn!("Could not open {}: {}", target, e);
    }
}

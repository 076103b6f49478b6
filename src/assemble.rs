//! Assembly of the complete HTML page around a converted markdown fragment.

/// Scripts bundled with the viewer, loaded before any document script.
pub const BUNDLED_SCRIPTS: [&str; 3] = ["dom.js", "toc.js", "viewer.js"];

/// Stylesheets bundled with the viewer, linked first.
pub const BUNDLED_STYLESHEETS: [&str; 2] = ["style.css", "toc.css"];

/// Fixed parts of the page. `resource_base` is the URL of the directory
/// holding the bundled stylesheets and scripts, without a trailing slash.
#[derive(Debug, Clone)]
pub struct DocumentTemplate {
    resource_base: String,
}

impl DocumentTemplate {
    pub fn new(resource_base: impl Into<String>) -> Self {
        let resource_base = resource_base.into().trim_end_matches('/').to_string();
        Self { resource_base }
    }

    pub fn resource_base(&self) -> &str {
        &self.resource_base
    }

    /// Builds the page. `body` is inserted verbatim.
    pub fn assemble(&self, stylesheets: &[String], scripts: &[String], body: &str) -> String {
        let base = html_escape(&self.resource_base);

        let bundled_links: String = BUNDLED_STYLESHEETS
            .iter()
            .map(|name| {
                format!(
                    "    <link rel=\"stylesheet\" type=\"text/css\" href=\"{}/{}\" />\n",
                    base, name
                )
            })
            .collect();

        let document_links: String = stylesheets
            .iter()
            .map(|name| {
                format!(
                    "    <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\" />\n",
                    html_escape(name)
                )
            })
            .collect();

        let bundled_scripts: String = BUNDLED_SCRIPTS
            .iter()
            .map(|name| format!("    <script src=\"{}/{}\"></script>\n", base, name))
            .collect();

        let document_scripts: String = scripts
            .iter()
            .map(|name| format!("    <script src=\"{}\"></script>\n", html_escape(name)))
            .collect();

        format!(
            r##"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>Untitled</title>
{}{}    <link rel="stylesheet" type="text/css" href="style.css" />
{}{}  </head>
  <body>
    <div id="markdown_content">
{}
    </div>
  </body>
</html>
"##,
            bundled_links, document_links, bundled_scripts, document_scripts, body
        )
    }
}

pub(crate) fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

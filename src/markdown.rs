//! Markdown to HTML conversion.
//!
//! pulldown-cmark does the parsing; this module only adjusts the event
//! stream: headings get stable `id`s and code blocks are replaced by
//! syntect-highlighted HTML.

use std::collections::HashSet;
use std::sync::OnceLock;

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::assemble::html_escape;

/// Converter switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Give every heading an `id` derived from its text.
    pub generate_header_ids: bool,
    /// Class of the `<div>` wrapping highlighted code. Empty disables highlighting.
    pub code_highlight_css_class: String,
    /// Tables, footnotes, strikethrough, task lists and `{#id .class}` heading attributes.
    pub enable_extended_syntax: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            generate_header_ids: true,
            code_highlight_css_class: "code".to_string(),
            enable_extended_syntax: true,
        }
    }
}

fn parser_options(options: &MarkdownOptions) -> Options {
    if options.enable_extended_syntax {
        Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
    } else {
        Options::empty()
    }
}

pub fn to_html(markdown: &str, options: &MarkdownOptions) -> String {
    let mut events: Vec<Event> = Parser::new_ext(markdown, parser_options(options)).collect();

    if options.generate_header_ids {
        assign_heading_ids(&mut events);
    }
    if !options.code_highlight_css_class.is_empty() {
        events = highlight_code_blocks(events, &options.code_highlight_css_class);
    }

    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Fills in missing heading ids. Repeats get `_1`, `_2`, ... appended.
fn assign_heading_ids(events: &mut [Event]) {
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();

    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let mut base = slugify(&heading_text(&events[i + 1..]));
        if base.is_empty() {
            base = "section".to_string();
        }
        let mut slug = base.clone();
        let mut n = 1;
        while used.contains(&slug) {
            slug = format!("{}_{}", base, n);
            n += 1;
        }
        used.insert(slug.clone());

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(slug.into());
        }
    }
}

fn highlight_code_blocks<'a>(events: Vec<Event<'a>>, css_class: &str) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    // (language token, collected source)
    let mut block: Option<(String, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                block = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, code)) = block.take() {
                    out.push(Event::Html(render_code_block(&lang, &code, css_class).into()));
                }
            }
            Event::Text(text) if block.is_some() => {
                if let Some((_, code)) = &mut block {
                    code.push_str(&text);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Picks a syntax from the fence language, falling back to a first-line guess.
fn find_syntax<'s>(syntaxes: &'s SyntaxSet, lang: &str, code: &str) -> &'s SyntaxReference {
    Some(lang)
        .filter(|lang| !lang.is_empty())
        .and_then(|lang| syntaxes.find_syntax_by_token(lang))
        .or_else(|| {
            code.lines()
                .next()
                .and_then(|first| syntaxes.find_syntax_by_first_line(first))
        })
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
}

fn render_code_block(lang: &str, code: &str, css_class: &str) -> String {
    let syntaxes = syntax_set();
    let syntax = find_syntax(syntaxes, lang, code);

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntaxes, ClassStyle::Spaced);
    let parsed = LinesWithEndings::from(code)
        .try_for_each(|line| generator.parse_html_for_line_which_includes_newline(line));

    let inner = match parsed {
        Ok(()) => generator.finalize(),
        Err(e) => {
            tracing::debug!("highlighting {} block failed: {}", syntax.name, e);
            html_escape(code)
        }
    };

    format!(
        "<div class=\"{}\"><pre>{}</pre></div>\n",
        html_escape(css_class),
        inner
    )
}

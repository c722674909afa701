//! Markdown rendering with syntax highlighting and heading anchors

use anyhow::Result;
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

lazy_static! {
    static ref HEADING_WITH_ID: Regex = Regex::new(r#"<h(\d) id="(.*?)">"#).unwrap();
}

/// Link anchor injected into rendered headings
#[derive(Debug, Clone)]
pub struct HeadingAnchor {
    /// Icon shown inside the anchor
    pub icon: String,
    /// Cache-busting stamp appended to the icon URL
    pub stamp: i64,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
    anchor: Option<HeadingAnchor>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "base16-ocean.dark".to_string(),
            line_numbers: true,
            anchor: None,
        }
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
            anchor: None,
        }
    }

    /// Inject `anchor` into every heading after rendering
    pub fn with_heading_anchor(mut self, anchor: HeadingAnchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Enable most options but NOT YAML metadata blocks
        // We handle front-matter separately in FrontMatter::parse()
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a code block
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            // ```rust title="x" -> rust
                            lang.split_whitespace().next().map(String::from)
                        }
                        _ => None,
                    };
                    code_block = Some(lang);
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let highlighted = self.highlight_code(&code_block_content, lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                event => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, assign_heading_ids(events).into_iter());

        if let Some(anchor) = &self.anchor {
            html_output = inject_heading_anchors(&html_output, anchor);
        }

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => {
                format!(r#"<figure class="highlight {}">{}</figure>"#, lang, highlighted)
            }
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();
        let line_count = lines.len();

        let mut gutter = String::new();
        let mut code_lines = String::new();

        for (i, line) in lines.iter().enumerate() {
            gutter.push_str(&format!(r#"<span class="line-number">{}</span>"#, i + 1));
            if i < line_count - 1 {
                gutter.push('\n');
            }

            code_lines.push_str(line);
            if i < line_count - 1 {
                code_lines.push('\n');
            }
        }

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            lang, gutter, code_lines
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Give every heading without an explicit `{#id}` an id slugified from its text.
/// Repeated ids get `-1`, `-2`, ... suffixes; explicit ids are reserved up front.
fn assign_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut output = Vec::with_capacity(events.len());
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|e| match e {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut heading: Option<(Tag, Vec<Event>, String)> = None;

    for event in events {
        match event {
            Event::Start(tag @ Tag::Heading { .. }) => {
                heading = Some((tag, Vec::new(), String::new()));
            }
            Event::End(TagEnd::Heading(level)) => {
                let Some((tag, inner, text)) = heading.take() else {
                    output.push(Event::End(TagEnd::Heading(level)));
                    continue;
                };
                let tag = match tag {
                    Tag::Heading {
                        level,
                        id: None,
                        classes,
                        attrs,
                    } => {
                        let base = slug::slugify(&text);
                        let mut id = base.clone();
                        if used.contains(&id) {
                            let n = suffixes.entry(base.clone()).or_insert(0);
                            loop {
                                *n += 1;
                                id = format!("{}-{}", base, n);
                                if !used.contains(&id) {
                                    break;
                                }
                            }
                        }
                        used.insert(id.clone());
                        Tag::Heading {
                            level,
                            id: Some(CowStr::from(id)),
                            classes,
                            attrs,
                        }
                    }
                    other => other,
                };
                output.push(Event::Start(tag));
                output.extend(inner);
                output.push(Event::End(TagEnd::Heading(level)));
            }
            event => match heading.as_mut() {
                Some((_, inner, text)) => {
                    if let Event::Text(t) | Event::Code(t) = &event {
                        text.push_str(t);
                    }
                    inner.push(event);
                }
                None => output.push(event),
            },
        }
    }

    output
}

/// Insert a link anchor right after the opening tag of every heading with an id
pub fn inject_heading_anchors(html: &str, anchor: &HeadingAnchor) -> String {
    let replacement = format!(
        r##"<h${{1}} id="${{2}}"><a class="heading-anchor" aria-hidden="true" href="#${{2}}"><img src="{}?{}"></a>"##,
        anchor.icon.replace('$', "$$"),
        anchor.stamp
    );
    HEADING_WITH_ID
        .replace_all(html, replacement.as_str())
        .into_owned()
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight"));
    }

    #[test]
    fn test_text_after_code_block() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", false);
        let html = renderer.render("```\nlet x = 1;\n```\n\nAfter").unwrap();
        assert!(html.contains(r#"<figure class="highlight text">"#));
        assert!(html.contains("<p>After</p>"));
    }

    #[test]
    fn test_heading_ids() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("## Getting Started\n\n## Getting Started\n\n### Custom {#own}")
            .unwrap();
        assert!(html.contains(r#"<h2 id="getting-started">Getting Started</h2>"#));
        assert!(html.contains(r#"<h2 id="getting-started-1">"#));
        assert!(html.contains(r#"<h3 id="own">Custom</h3>"#));
    }

    #[test]
    fn test_heading_ids_stay_unique() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("## Setup {#intro}\n\n## Intro\n\n## A\n\n## A\n\n## A 1")
            .unwrap();
        assert!(html.contains(r#"<h2 id="intro">Setup</h2>"#));
        assert!(html.contains(r#"<h2 id="intro-1">Intro</h2>"#));
        assert!(html.contains(r#"<h2 id="a">A</h2>"#));
        assert!(html.contains(r#"<h2 id="a-1">A</h2>"#));
        assert!(html.contains(r#"<h2 id="a-1-1">A 1</h2>"#));
    }

    #[test]
    fn test_explicit_id_reserved_before_earlier_heading() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("## Usage\n\n## Details {#usage}").unwrap();
        assert!(html.contains(r#"<h2 id="usage-1">Usage</h2>"#));
        assert!(html.contains(r#"<h2 id="usage">Details</h2>"#));
    }

    #[test]
    fn test_heading_anchor_injected() {
        let renderer = MarkdownRenderer::new().with_heading_anchor(HeadingAnchor {
            icon: "/assets/icons/link.svg".to_string(),
            stamp: 1400000000,
        });
        let html = renderer.render("## Why `Rust`").unwrap();
        assert!(html.starts_with(
            r##"<h2 id="why-rust"><a class="heading-anchor" aria-hidden="true" href="#why-rust"><img src="/assets/icons/link.svg?1400000000"></a>Why <code>Rust</code></h2>"##
        ));
    }

    #[test]
    fn test_inject_leaves_plain_headings() {
        let anchor = HeadingAnchor {
            icon: "/i.svg".to_string(),
            stamp: 1,
        };
        let html = "<h1>No id</h1><h4 id=\"a-b\">A b</h4>";
        let out = inject_heading_anchors(html, &anchor);
        assert!(out.starts_with("<h1>No id</h1>"));
        assert!(out.contains(r##"<h4 id="a-b"><a class="heading-anchor" aria-hidden="true" href="#a-b"><img src="/i.svg?1"></a>A b</h4>"##));
    }
}

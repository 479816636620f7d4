//! Minimal Markdown to HTML for blog posts.
//!
//! This is an ordered list of regex substitutions, not a parser. Rules run in
//! sequence over the whole text, then blank-line separated blocks that do not
//! already start with a block tag are wrapped in `<p>`, with single newlines
//! turned into `<br />`.
//!
//! Post content is authored by the admin and is not escaped. If the rule set
//! cannot be built, the input comes back HTML-escaped instead.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Block-level tags that keep a block out of paragraph wrapping.
const BLOCK_PREFIXES: [&str; 7] = ["<h", "<pre", "<ul", "<ol", "<blockquote", "<hr", "<li"];

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

pub struct MarkdownRenderer {
    rules: Vec<Rule>,
    list_run: Regex,
}

impl MarkdownRenderer {
    pub fn new() -> Result<Self, regex::Error> {
        let specs: [(&str, &'static str); 13] = [
            // Fenced code goes first so later rules see the tags
            (r"(?s)```(\w*)\n(.*?)```", r#"<pre><code class="language-${1}">${2}</code></pre>"#),
            (r"`([^`]+)`", "<code>${1}</code>"),
            (r"(?m)^### (.+)$", "<h3>${1}</h3>"),
            (r"(?m)^## (.+)$", "<h2>${1}</h2>"),
            (r"(?m)^# (.+)$", "<h1>${1}</h1>"),
            (r"\*\*\*(.+?)\*\*\*", "<strong><em>${1}</em></strong>"),
            (r"\*\*(.+?)\*\*", "<strong>${1}</strong>"),
            (r"\*(.+?)\*", "<em>${1}</em>"),
            // Images before links, or `![alt](src)` would become a link
            (r"!\[([^\]]*)\]\(([^)]+)\)", r#"<img src="${2}" alt="${1}" />"#),
            (r"\[([^\]]+)\]\(([^)]+)\)", r#"<a href="${2}" target="_blank" rel="noopener">${1}</a>"#),
            (r"(?m)^> (.+)$", "<blockquote>${1}</blockquote>"),
            (r"(?m)^---$", "<hr />"),
            (r"(?m)^- (.+)$", "<li>${1}</li>"),
        ];

        let mut rules = Vec::with_capacity(specs.len());
        for (pattern, replacement) in specs {
            rules.push(Rule {
                pattern: Regex::new(pattern)?,
                replacement,
            });
        }

        Ok(Self {
            rules,
            list_run: Regex::new(r"(?m)(?:^<li>.*</li>(?:\n|$))+")?,
        })
    }

    pub fn render(&self, md: &str) -> String {
        let mut html = md.replace("\r\n", "\n");
        for rule in &self.rules {
            html = rule.pattern.replace_all(&html, rule.replacement).into_owned();
        }

        // Each run of consecutive items becomes its own list
        let html = self.list_run.replace_all(&html, |caps: &Captures| {
            let run = &caps[0];
            let body = run.trim_end_matches('\n');
            let tail = &run[body.len()..];
            format!("<ul>{}</ul>{}", body, tail)
        });

        html.split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                if BLOCK_PREFIXES.iter().any(|p| block.starts_with(p)) {
                    block.to_string()
                } else {
                    format!("<p>{}</p>", block.replace('\n', "<br />"))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

static RENDERER: Lazy<Option<MarkdownRenderer>> = Lazy::new(|| MarkdownRenderer::new().ok());

pub fn markdown_to_html(md: &str) -> String {
    match RENDERER.as_ref() {
        Some(renderer) => renderer.render(md),
        None => escape_html(md),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

//! State structs tracking context during event processing.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{Alignment, HeadingLevel};

/// State for tracking code blocks rendered by the backend.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    pub fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    pub fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Alignment attribute for the current cell.
    pub fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Alt text capture for images. Nested images contribute their alt text.
#[derive(Default)]
pub(crate) struct ImageState {
    depth: usize,
    alt_text: String,
    pending: Vec<(String, String)>,
}

impl ImageState {
    pub fn start(&mut self, src: String, title: String) {
        if self.depth == 0 {
            self.alt_text.clear();
        }
        self.depth += 1;
        self.pending.push((src, title));
    }

    /// End the innermost image. Returns `(src, title, alt)` for the outermost one.
    pub fn end(&mut self) -> Option<(String, String, String)> {
        let (src, title) = self.pending.pop()?;
        self.depth -= 1;
        (self.depth == 0).then(|| (src, title, std::mem::take(&mut self.alt_text)))
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// State for heading capture and id generation.
///
/// Generated ids are pairwise distinct within one document, including when a
/// literal heading text matches a generated suffix (`intro`, `intro-1`).
#[derive(Default)]
pub(crate) struct HeadingState {
    current_level: Option<u8>,
    /// Plain text of the heading, for the slug.
    text: String,
    /// Inline HTML of the heading.
    html: String,
    used: HashSet<String>,
    /// Next suffix to try per base slug.
    next_suffix: HashMap<String, usize>,
}

impl HeadingState {
    pub fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub fn start_heading(&mut self, level: HeadingLevel) {
        self.current_level = Some(heading_level_to_num(level));
        self.text.clear();
        self.html.clear();
    }

    /// Complete the heading and return (level, id, html).
    pub fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        Some((level, self.generate_id(&text), html))
    }

    fn generate_id(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "heading".to_owned();
        }

        let id = if self.used.contains(&base) {
            let suffix = self.next_suffix.entry(base.clone()).or_insert(1);
            loop {
                let candidate = format!("{base}-{suffix}");
                *suffix += 1;
                if !self.used.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            base
        };

        self.used.insert(id.clone());
        id
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Convert text to URL-safe slug.
///
/// Keeps ASCII alphanumerics (lowercased), turns each whitespace, dash or
/// underscore into a dash, and drops everything else. Dashes are not
/// collapsed, so `A - B` becomes `a---b`.
///
/// ```
/// use mamd_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("¿Qué?"), "qu");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    text.trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            c if c.is_ascii_whitespace() || c == '-' || c == '_' => Some('-'),
            _ => None,
        })
        .collect()
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

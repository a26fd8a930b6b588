//! Grammar selection by language tag or content inference.

use std::sync::LazyLock;

use regex::Regex;
use syntect::parsing::{SyntaxReference, SyntaxSet};

pub(crate) static SYNTAX_SET: LazyLock<SyntaxSet> =
    LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Language tags that select the plain-text grammar.
const PLAIN_TAGS: &[&str] = &["text", "txt", "plain", "plaintext"];

/// Tag aliases resolved before lookup in the bundled grammar set.
const ALIASES: &[(&str, &str)] = &[
    ("golang", "go"),
    ("py3", "py"),
    ("python3", "py"),
    ("shell", "bash"),
    ("sh", "bash"),
    ("zsh", "bash"),
    ("console", "bash"),
    ("c++", "cpp"),
    ("cplusplus", "cpp"),
    ("node", "js"),
    ("javascript", "js"),
    ("rust", "rs"),
    ("yml", "yaml"),
    ("jsonc", "json"),
    ("postgres", "sql"),
    ("postgresql", "sql"),
    ("mysql", "sql"),
    ("xhtml", "html"),
    ("html5", "html"),
];

/// Content inference only looks at this many bytes.
const SAMPLE_BYTES: usize = 4096;
/// Content inference only looks at this many lines.
const SAMPLE_LINES: usize = 64;
/// Minimum analyser score for a grammar to be selected.
const SCORE_THRESHOLD: f32 = 0.5;

/// Lexical grammar used to tokenize a code block.
#[derive(Clone, Copy, Debug)]
pub enum Grammar {
    /// A grammar from the bundled syntax set.
    Syntax(&'static SyntaxReference),
    /// Passthrough grammar emitting the whole input as one unstyled token.
    PlainText,
}

impl Grammar {
    /// Select a grammar for `text`.
    ///
    /// The language tag wins when it is known; otherwise the grammar is
    /// inferred from the content, falling back to plain text.
    #[must_use]
    pub fn select(text: &str, language: Option<&str>) -> Self {
        if let Some(tag) = language.map(str::trim).filter(|tag| !tag.is_empty()) {
            if let Some(grammar) = Self::by_tag(tag) {
                tracing::debug!(language = tag, grammar = grammar.name(), "Grammar selected by tag");
                return grammar;
            }
            tracing::debug!(language = tag, "Unknown language tag, inferring from content");
        }

        match Self::analyse(text) {
            Some(grammar) => {
                tracing::debug!(grammar = grammar.name(), "Grammar inferred from content");
                grammar
            }
            None => Self::PlainText,
        }
    }

    /// Resolve a language tag through the alias table and the syntax set.
    #[must_use]
    pub fn by_tag(tag: &str) -> Option<Self> {
        let tag = tag.to_ascii_lowercase();
        if PLAIN_TAGS.contains(&tag.as_str()) {
            return Some(Self::PlainText);
        }
        let token = ALIASES
            .iter()
            .find(|(alias, _)| *alias == tag)
            .map_or(tag.as_str(), |&(_, token)| token);
        SYNTAX_SET.find_syntax_by_token(token).map(Self::Syntax)
    }

    /// Infer a grammar from the first lines of `text`.
    ///
    /// Tries first-line detection (shebangs, `<?xml`, modelines), then the
    /// scored analysers. Returns `None` when inference is inconclusive.
    #[must_use]
    pub fn analyse(text: &str) -> Option<Self> {
        let sample = sample(text);
        let first_line = sample.lines().find(|line| !line.trim().is_empty())?;

        if let Some(syntax) = SYNTAX_SET.find_syntax_by_first_line(first_line) {
            return Some(Self::Syntax(syntax));
        }

        let (token, score) = ANALYSERS
            .iter()
            .map(|analyser| (analyser.token, analyser.score(sample)))
            .fold(None, |best: Option<(&str, f32)>, candidate| match best {
                Some(best) if best.1 >= candidate.1 => Some(best),
                _ => Some(candidate),
            })?;

        if score < SCORE_THRESHOLD {
            return None;
        }
        SYNTAX_SET.find_syntax_by_token(token).map(Self::Syntax)
    }

    /// Display name of the grammar.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match *self {
            Self::Syntax(syntax) => &syntax.name,
            Self::PlainText => "Plain Text",
        }
    }
}

/// Leading part of `text` bounded by [`SAMPLE_BYTES`] and [`SAMPLE_LINES`].
fn sample(text: &str) -> &str {
    let mut end = text.len().min(SAMPLE_BYTES);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let head = &text[..end];
    match head.match_indices('\n').nth(SAMPLE_LINES - 1) {
        Some((index, _)) => &head[..=index],
        None => head,
    }
}

/// Weighted pattern set scoring how likely a sample is in one language.
struct Analyser {
    /// Lookup token in the syntax set.
    token: &'static str,
    patterns: Vec<(Regex, f32)>,
}

impl Analyser {
    fn new(token: &'static str, patterns: &[(&str, f32)]) -> Self {
        Self {
            token,
            patterns: patterns
                .iter()
                .map(|&(pattern, weight)| (Regex::new(pattern).unwrap(), weight))
                .collect(),
        }
    }

    fn score(&self, sample: &str) -> f32 {
        self.patterns
            .iter()
            .filter(|(pattern, _)| pattern.is_match(sample))
            .map(|(_, weight)| weight)
            .sum::<f32>()
            .min(1.0)
    }
}

static ANALYSERS: LazyLock<Vec<Analyser>> = LazyLock::new(|| {
    vec![
        Analyser::new(
            "py",
            &[
                (r"(?m)^\s*def \w+\(.*\)\s*(->\s*[^:]+)?:\s*$", 0.4),
                // header followed by an indented body
                (r"(?m)^[ \t]*def \w+\(.*\)[ \t]*(->[^:\n]+)?:[ \t]*\n[ \t]+\S", 0.3),
                (r"(?m)^\s*class \w+(\(.*\))?:\s*$", 0.3),
                (r"(?m)^\s*(from [\w.]+ )?import \w+", 0.2),
                (r#"(?m)^if __name__ == ['"]__main__['"]:"#, 0.5),
                (r"(?m)^\s*(elif|except|finally|with)\b.*:\s*$", 0.3),
                (r"\bprint\(", 0.1),
                (r"\bself\.", 0.2),
                (r"\b(None|True|False)\b", 0.1),
            ],
        ),
        Analyser::new(
            "go",
            &[
                (r"(?m)^package \w+\s*$", 0.5),
                (r"(?m)^func (\(\w+ \*?\w+\) )?\w+\(", 0.3),
                (r"(?m)^func (\(\w+ \*?\w+\) )?\w+\([^)\n]*\)[^{\n]*\{", 0.3),
                (r#"(?m)^import (\(|")"#, 0.3),
                (r":=", 0.1),
                (r"\bfmt\.\w+\(", 0.2),
                (r"\b(chan|defer|go func)\b", 0.1),
            ],
        ),
        Analyser::new(
            "rs",
            &[
                (r"\bfn \w+(<[^>]*>)?\(", 0.3),
                (
                    r"(?m)^\s*(pub(\([\w:]+\))? )?(async )?fn \w+(<[^>]*>)?\([^)\n]*\)[^{;\n]*\{",
                    0.3,
                ),
                (r"\blet (mut )?\w+", 0.2),
                (
                    r"(?m)^\s*(pub(\([\w:]+\))? )?(struct|enum|trait|impl|mod)\b",
                    0.3,
                ),
                (r"(?m)^\s*use [\w:]+(::\{.*\})?;", 0.3),
                (r"#\[(derive|cfg|test)", 0.4),
                (r"->\s*(Self|Result|Option|&)", 0.2),
                (r"\w+!\(", 0.1),
            ],
        ),
        Analyser::new(
            "c",
            &[
                (r#"(?m)^#include\s*[<"]"#, 0.5),
                (r"(?m)^#define\s+\w+", 0.3),
                (r"\bint main\s*\(", 0.3),
                (r"\bprintf\s*\(", 0.2),
                (r"\b(unsigned|typedef|struct)\b", 0.1),
            ],
        ),
        Analyser::new(
            "js",
            &[
                (r"\bconsole\.log\(", 0.4),
                (r#"\brequire\(['"]"#, 0.3),
                (r"(?m)^\s*(import .* from |export (default )?)", 0.3),
                (r"\b(const|let|var) \w+\s*=", 0.2),
                (r"\bfunction\s*\w*\s*\(", 0.2),
                (r"===|!==", 0.2),
                (r"\b(document|window)\.", 0.2),
                (r"=>", 0.1),
            ],
        ),
        Analyser::new(
            "html",
            &[
                (r"(?i)<!DOCTYPE html", 0.6),
                (r"(?i)<html[\s>]", 0.5),
                (r"(?i)</?(div|span|body|head|p|a|ul|li|table)[\s>]", 0.3),
                (r"(?i)<(meta|link|script)\b", 0.2),
            ],
        ),
        Analyser::new(
            "json",
            &[
                (r"\A\s*[\{\[]", 0.2),
                (r#""[^"\n]+"\s*:"#, 0.3),
                (r"\A\s*[\{\[][\s\S]*[\}\]]\s*\z", 0.2),
            ],
        ),
        Analyser::new(
            "bash",
            &[
                (
                    r"(?m)^\s*(echo|export|cd|sudo|apt-get|curl|mkdir|rm|cp|mv) ",
                    0.3,
                ),
                (r"(?m)^\s*(if \[|fi$|then$|done$|esac$)", 0.4),
                (r"\|\s*(grep|awk|sed|xargs)\b", 0.2),
                (r"(?m)^\$ ", 0.2),
                (r"\$\{?\w+\}?", 0.1),
            ],
        ),
        Analyser::new(
            "sql",
            &[
                (r"(?i)\bSELECT\b[\s\S]+\bFROM\b", 0.5),
                (
                    r"(?im)^\s*(INSERT INTO|UPDATE \w+ SET|DELETE FROM|CREATE (TABLE|INDEX|VIEW))\b",
                    0.5,
                ),
                (r"(?i)\b(JOIN|GROUP BY|ORDER BY)\b", 0.2),
                (r"(?i)\bWHERE\b", 0.1),
            ],
        ),
        Analyser::new(
            "yaml",
            &[
                (r"(?m)^---\s*$", 0.2),
                (r"(?m)^[\w-]+:\s*$", 0.2),
                (r"(?m)^[\w-]+: [^{;]+$", 0.2),
                (r#"(?m)^\s*- [\w"']"#, 0.1),
            ],
        ),
    ]
});

//! Lazy token stream over a code block.

use std::collections::VecDeque;
use std::ops::Range;

use syntect::parsing::{ParseState, ScopeStack, ScopeStackOp};

use crate::category::TokenCategory;
use crate::grammar::{Grammar, SYNTAX_SET};

/// A categorized slice of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub category: TokenCategory,
}

/// Lazy, finite token stream.
///
/// Tokens cover the input exactly: concatenating their texts yields the input.
/// If the grammar engine fails on a line, the remaining input is emitted as a
/// single [`TokenCategory::Error`] token and the stream ends.
pub struct TokenStream<'a> {
    source: &'a str,
    engine: Engine,
    /// Start of the next line to tokenize.
    offset: usize,
    pending: VecDeque<(Range<usize>, TokenCategory)>,
    done: bool,
}

enum Engine {
    Plain,
    Syntax {
        state: Box<ParseState>,
        stack: ScopeStack,
    },
}

impl Grammar {
    /// Tokenize `source` with this grammar.
    #[must_use]
    pub fn tokenize(self, source: &str) -> TokenStream<'_> {
        let engine = match self {
            Self::Syntax(syntax) => Engine::Syntax {
                state: Box::new(ParseState::new(syntax)),
                stack: ScopeStack::new(),
            },
            Self::PlainText => Engine::Plain,
        };
        TokenStream {
            source,
            engine,
            offset: 0,
            pending: VecDeque::new(),
            done: false,
        }
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((range, category)) = self.pending.pop_front() {
                return Some(Token {
                    text: &self.source[range],
                    category,
                });
            }
            if self.done {
                return None;
            }
            self.advance();
        }
    }
}

impl TokenStream<'_> {
    /// Tokenize the next line into `pending`.
    fn advance(&mut self) {
        let source = self.source;
        let rest = &source[self.offset..];
        if rest.is_empty() {
            self.done = true;
            return;
        }

        match &mut self.engine {
            Engine::Plain => {
                self.pending
                    .push_back((self.offset..self.source.len(), TokenCategory::Text));
                self.offset = self.source.len();
                self.done = true;
            }
            Engine::Syntax { state, stack } => {
                let line_start = self.offset;
                let line = rest.find('\n').map_or(rest, |index| &rest[..=index]);
                let shift = |spans: Vec<(Range<usize>, TokenCategory)>| {
                    spans.into_iter().map(move |(range, category)| {
                        (range.start + line_start..range.end + line_start, category)
                    })
                };

                let result = match state.parse_line(line, &SYNTAX_SET) {
                    Ok(ops) => line_spans(line, &ops, stack),
                    Err(err) => Err(LineFailure {
                        spans: Vec::new(),
                        covered: 0,
                        reason: err.to_string(),
                    }),
                };

                match result {
                    Ok(spans) => {
                        self.pending.extend(shift(spans));
                        self.offset += line.len();
                    }
                    Err(failure) => {
                        let residue = line_start + failure.covered;
                        tracing::warn!(
                            offset = residue,
                            reason = %failure.reason,
                            "Tokenizer failed, emitting remaining input as error"
                        );
                        self.pending.extend(shift(failure.spans));
                        if residue < source.len() {
                            self.pending
                                .push_back((residue..source.len(), TokenCategory::Error));
                        }
                        self.offset = self.source.len();
                        self.done = true;
                    }
                }
            }
        }
    }
}

/// Tokenizer failure within one line.
struct LineFailure {
    /// Spans tokenized before the failure.
    spans: Vec<(Range<usize>, TokenCategory)>,
    /// Bytes of the line covered by `spans`.
    covered: usize,
    reason: String,
}

/// Turn the scope operations of one line into categorized spans.
fn line_spans(
    line: &str,
    ops: &[(usize, ScopeStackOp)],
    stack: &mut ScopeStack,
) -> Result<Vec<(Range<usize>, TokenCategory)>, LineFailure> {
    let mut spans = Vec::new();
    let mut prev = 0;

    for (offset, op) in ops {
        let offset = *offset;
        if offset < prev || offset > line.len() || !line.is_char_boundary(offset) {
            return Err(LineFailure {
                spans,
                covered: prev,
                reason: format!("scope change at invalid offset {offset}"),
            });
        }
        push_span(&mut spans, prev..offset, TokenCategory::of_scopes(stack));
        prev = offset;
        if let Err(err) = stack.apply(op) {
            return Err(LineFailure {
                spans,
                covered: prev,
                reason: format!("{err:?}"),
            });
        }
    }
    push_span(&mut spans, prev..line.len(), TokenCategory::of_scopes(stack));

    Ok(spans)
}

/// Append a span, merging it into the previous one when the category matches.
fn push_span(
    spans: &mut Vec<(Range<usize>, TokenCategory)>,
    range: Range<usize>,
    category: TokenCategory,
) {
    if range.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some((last, last_category)) if *last_category == category && last.end == range.start => {
            last.end = range.end;
        }
        _ => spans.push((range, category)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GO: &str = "package main\n\nimport \"fmt\"\n\n// main prints.\nfunc main() {\n\tx := 42\n\tfmt.Println(\"hi\", x)\n}\n";

    fn joined(tokens: &[Token<'_>]) -> String {
        tokens.iter().map(|token| token.text).collect()
    }

    #[test]
    fn test_plain_text_single_token() {
        let tokens: Vec<_> = Grammar::PlainText.tokenize("a <b>\nc\n").collect();
        assert_eq!(
            tokens,
            [Token {
                text: "a <b>\nc\n",
                category: TokenCategory::Text
            }]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Grammar::PlainText.tokenize("").count(), 0);
        assert_eq!(Grammar::by_tag("go").unwrap().tokenize("").count(), 0);
    }

    #[test]
    fn test_go_tokens() {
        let tokens: Vec<_> = Grammar::by_tag("go").unwrap().tokenize(GO).collect();
        assert_eq!(joined(&tokens), GO);

        let category_of = |text: &str| {
            tokens
                .iter()
                .find(|token| token.text.trim() == text)
                .map(|token| token.category)
        };
        assert_eq!(category_of("// main prints."), Some(TokenCategory::Comment));
        assert_eq!(category_of("42"), Some(TokenCategory::LiteralNumber));
        assert!(
            tokens
                .iter()
                .any(|token| token.category == TokenCategory::LiteralString
                    && token.text.contains("hi"))
        );
        assert!(
            tokens
                .iter()
                .filter(|token| token.category != TokenCategory::Text)
                .count()
                >= 5
        );
    }

    #[test]
    fn test_coverage_for_every_grammar() {
        let samples = [
            ("go", GO),
            ("python", "def f(x):\n    return x * 2  # double\n"),
            ("rust", "fn main() {\n    let s = \"é\";\n}\n"),
            ("c", "#include <stdio.h>\nint main(void) { return 0; }\n"),
            ("js", "const x = `tpl ${1 + 2}`;\n"),
            ("html", "<p class=\"x\">&amp; text</p>\n"),
            ("json", "{\"a\": [1, 2.5, null]}"),
            ("bash", "echo \"$HOME\" | grep -v x\n"),
            ("sql", "SELECT * FROM t WHERE a = 'b';\n"),
            ("yaml", "key: value\nlist:\n  - 1\n"),
            ("text", "anything\r\nat all"),
        ];
        for (tag, source) in samples {
            let grammar = Grammar::by_tag(tag).unwrap();
            let tokens: Vec<_> = grammar.tokenize(source).collect();
            assert_eq!(joined(&tokens), source, "coverage for {tag}");
            assert!(tokens.iter().all(|token| !token.text.is_empty()));
        }
    }

    #[test]
    fn test_no_trailing_newline() {
        let source = "x := 1";
        let tokens: Vec<_> = Grammar::by_tag("go").unwrap().tokenize(source).collect();
        assert_eq!(joined(&tokens), source);
    }

    #[test]
    fn test_invalid_offset_fails_line() {
        let mut stack = ScopeStack::new();
        let ops = [(2, ScopeStackOp::Noop), (100, ScopeStackOp::Noop)];
        let Err(failure) = line_spans("abc\n", &ops, &mut stack) else {
            panic!("expected failure");
        };
        assert_eq!(failure.covered, 2);
        assert_eq!(failure.spans, [(0..2, TokenCategory::Text)]);
    }

    #[test]
    fn test_scope_error_fails_line() {
        let mut stack = ScopeStack::new();
        let ops = [(1, ScopeStackOp::Restore)];
        let Err(failure) = line_spans("ab\n", &ops, &mut stack) else {
            panic!("expected failure");
        };
        assert_eq!(failure.covered, 1);
        assert_eq!(failure.spans, [(0..1, TokenCategory::Text)]);
    }

    #[test]
    fn test_adjacent_spans_merge() {
        let mut spans = Vec::new();
        push_span(&mut spans, 0..2, TokenCategory::Text);
        push_span(&mut spans, 2..4, TokenCategory::Text);
        push_span(&mut spans, 4..4, TokenCategory::Keyword);
        push_span(&mut spans, 4..5, TokenCategory::Keyword);
        assert_eq!(
            spans,
            [(0..4, TokenCategory::Text), (4..5, TokenCategory::Keyword)]
        );
    }
}

//! Linkification of bare URLs and email addresses in text.
//!
//! Matches `http://`, `https://`, `ftp://` and `www.` URLs plus bare email
//! addresses. Trailing punctuation and unbalanced closing parentheses are
//! left out of URL links.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::state::escape_html;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<url>\b(?:https?://|ftp://|www\.)[^\s<>]+)|(?P<email>[a-z0-9._+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)+)",
    )
    .unwrap()
});

/// Append escaped `text` to `out`, wrapping bare URLs and emails in anchors.
pub(crate) fn push_linkified(text: &str, out: &mut String) {
    let mut last = 0;
    for caps in LINK_RE.captures_iter(text) {
        let (start, label, href) = if let Some(email) = caps.name("email") {
            (email.start(), email.as_str(), format!("mailto:{}", email.as_str()))
        } else if let Some(found) = caps.name("url") {
            let url = trim_trailing(found.as_str());
            if url.len() <= scheme_len(url) {
                continue;
            }
            let href = if scheme_len(url) == 4 {
                format!("http://{url}")
            } else {
                url.to_owned()
            };
            (found.start(), url, href)
        } else {
            continue;
        };

        out.push_str(&escape_html(&text[last..start]));
        write!(
            out,
            r#"<a href="{}">{}</a>"#,
            escape_html(&href),
            escape_html(label)
        )
        .unwrap();
        last = start + label.len();
    }
    out.push_str(&escape_html(&text[last..]));
}

fn scheme_len(url: &str) -> usize {
    ["www.", "ftp://", "http://", "https://"]
        .iter()
        .find(|prefix| {
            url.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .map_or(0, |prefix| prefix.len())
}

fn trim_trailing(candidate: &str) -> &str {
    let mut end = candidate.len();
    while let Some(last) = candidate[..end].chars().next_back() {
        let current = &candidate[..end];
        let strip = match last {
            '?' | '!' | '.' | ',' | ':' | ';' | '*' | '_' | '~' | '\'' | '"' => true,
            ')' => current.matches('(').count() < current.matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= 1;
    }
    &candidate[..end]
}

//! Named style tables.

use crate::category::TokenCategory;

/// Visual attributes of a token category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attrs {
    pub color: Option<&'static str>,
    pub background: Option<&'static str>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Attrs {
    const fn color(color: &'static str) -> Self {
        Self {
            color: Some(color),
            background: None,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    const fn on(mut self, background: &'static str) -> Self {
        self.background = Some(background);
        self
    }

    const PLAIN: Self = Self {
        color: None,
        background: None,
        bold: false,
        italic: false,
        underline: false,
    };

    /// Inline CSS declarations, e.g. `color:#00a8c8;font-weight:bold`.
    #[must_use]
    pub fn css(&self) -> String {
        let mut css = String::new();
        let mut push = |declaration: &str| {
            if !css.is_empty() {
                css.push(';');
            }
            css.push_str(declaration);
        };
        if let Some(color) = self.color {
            push(&format!("color:{color}"));
        }
        if let Some(background) = self.background {
            push(&format!("background-color:{background}"));
        }
        if self.bold {
            push("font-weight:bold");
        }
        if self.italic {
            push("font-style:italic");
        }
        if self.underline {
            push("text-decoration:underline");
        }
        css
    }
}

/// Immutable style table mapping token categories to visual attributes.
#[derive(Debug)]
pub struct Style {
    pub name: &'static str,
    /// Base text color.
    pub color: &'static str,
    /// Base background color.
    pub background: &'static str,
    entries: &'static [(TokenCategory, Attrs)],
}

/// Name of the default style.
pub const DEFAULT_STYLE: &str = "monokailight";

/// Style used when a requested name is unknown.
pub static FALLBACK: Style = Style {
    name: "bw",
    color: "#000000",
    background: "#ffffff",
    entries: &[
        (TokenCategory::Error, Attrs::PLAIN.underline()),
        (TokenCategory::Comment, Attrs::PLAIN.italic()),
        (TokenCategory::CommentPreproc, Attrs::PLAIN),
        (TokenCategory::Keyword, Attrs::PLAIN.bold()),
        (TokenCategory::KeywordType, Attrs::PLAIN),
        (TokenCategory::NameClass, Attrs::PLAIN.bold()),
        (TokenCategory::NameNamespace, Attrs::PLAIN.bold()),
        (TokenCategory::NameTag, Attrs::PLAIN.bold()),
        (TokenCategory::LiteralString, Attrs::PLAIN.italic()),
        (TokenCategory::LiteralStringEscape, Attrs::PLAIN.bold()),
        (TokenCategory::GenericEmph, Attrs::PLAIN.italic()),
        (TokenCategory::GenericHeading, Attrs::PLAIN.bold()),
        (TokenCategory::GenericStrong, Attrs::PLAIN.bold()),
    ],
};

static MONOKAI_LIGHT: Style = Style {
    name: "monokailight",
    color: "#272822",
    background: "#fafafa",
    entries: &[
        (TokenCategory::Error, Attrs::color("#960050").on("#1e0010")),
        (TokenCategory::Comment, Attrs::color("#75715e")),
        (TokenCategory::Keyword, Attrs::color("#00a8c8")),
        (TokenCategory::KeywordNamespace, Attrs::color("#f92672")),
        (TokenCategory::Name, Attrs::color("#111111")),
        (TokenCategory::NameAttribute, Attrs::color("#75af00")),
        (TokenCategory::NameClass, Attrs::color("#75af00")),
        (TokenCategory::NameConstant, Attrs::color("#00a8c8")),
        (TokenCategory::NameFunction, Attrs::color("#75af00")),
        (TokenCategory::NameTag, Attrs::color("#f92672")),
        (TokenCategory::Literal, Attrs::color("#ae81ff")),
        (TokenCategory::LiteralString, Attrs::color("#d88200")),
        (TokenCategory::LiteralStringEscape, Attrs::color("#8045ff")),
        (TokenCategory::LiteralNumber, Attrs::color("#ae81ff")),
        (TokenCategory::Operator, Attrs::color("#f92672")),
        (TokenCategory::Punctuation, Attrs::color("#111111")),
        (TokenCategory::GenericEmph, Attrs::PLAIN.italic()),
        (TokenCategory::GenericStrong, Attrs::PLAIN.bold()),
    ],
};

static MONOKAI: Style = Style {
    name: "monokai",
    color: "#f8f8f2",
    background: "#272822",
    entries: &[
        (TokenCategory::Error, Attrs::color("#960050").on("#1e0010")),
        (TokenCategory::Comment, Attrs::color("#75715e")),
        (TokenCategory::Keyword, Attrs::color("#66d9ef")),
        (TokenCategory::KeywordNamespace, Attrs::color("#f92672")),
        (TokenCategory::Name, Attrs::color("#f8f8f2")),
        (TokenCategory::NameAttribute, Attrs::color("#a6e22e")),
        (TokenCategory::NameClass, Attrs::color("#a6e22e")),
        (TokenCategory::NameConstant, Attrs::color("#66d9ef")),
        (TokenCategory::NameFunction, Attrs::color("#a6e22e")),
        (TokenCategory::NameTag, Attrs::color("#f92672")),
        (TokenCategory::Literal, Attrs::color("#ae81ff")),
        (TokenCategory::LiteralString, Attrs::color("#e6db74")),
        (TokenCategory::LiteralStringEscape, Attrs::color("#ae81ff")),
        (TokenCategory::LiteralNumber, Attrs::color("#ae81ff")),
        (TokenCategory::Operator, Attrs::color("#f92672")),
        (TokenCategory::Punctuation, Attrs::color("#f8f8f2")),
        (TokenCategory::GenericDeleted, Attrs::color("#f92672")),
        (TokenCategory::GenericInserted, Attrs::color("#a6e22e")),
        (TokenCategory::GenericEmph, Attrs::PLAIN.italic()),
        (TokenCategory::GenericStrong, Attrs::PLAIN.bold()),
    ],
};

static GITHUB: Style = Style {
    name: "github",
    color: "#24292e",
    background: "#ffffff",
    entries: &[
        (TokenCategory::Error, Attrs::color("#a61717").on("#e3d2d2")),
        (TokenCategory::Comment, Attrs::color("#999988").italic()),
        (TokenCategory::CommentPreproc, Attrs::color("#999999").bold()),
        (TokenCategory::Keyword, Attrs::color("#000000").bold()),
        (TokenCategory::KeywordType, Attrs::color("#445588").bold()),
        (TokenCategory::NameAttribute, Attrs::color("#008080")),
        (TokenCategory::NameBuiltin, Attrs::color("#0086b3")),
        (TokenCategory::NameClass, Attrs::color("#445588").bold()),
        (TokenCategory::NameConstant, Attrs::color("#008080")),
        (TokenCategory::NameFunction, Attrs::color("#990000").bold()),
        (TokenCategory::NameNamespace, Attrs::color("#555555")),
        (TokenCategory::NameTag, Attrs::color("#000080")),
        (TokenCategory::NameVariable, Attrs::color("#008080")),
        (TokenCategory::LiteralString, Attrs::color("#dd1144")),
        (TokenCategory::LiteralStringRegex, Attrs::color("#009926")),
        (TokenCategory::LiteralNumber, Attrs::color("#009999")),
        (TokenCategory::Operator, Attrs::color("#000000").bold()),
        (TokenCategory::GenericDeleted, Attrs::color("#000000").on("#ffdddd")),
        (TokenCategory::GenericInserted, Attrs::color("#000000").on("#ddffdd")),
        (TokenCategory::GenericEmph, Attrs::PLAIN.italic()),
        (TokenCategory::GenericHeading, Attrs::color("#999999")),
        (TokenCategory::GenericStrong, Attrs::PLAIN.bold()),
    ],
};

static STYLES: [&Style; 4] = [&MONOKAI_LIGHT, &MONOKAI, &GITHUB, &FALLBACK];

impl Style {
    /// Look up a style by name (case-insensitive).
    #[must_use]
    pub fn get(name: &str) -> Option<&'static Style> {
        STYLES
            .iter()
            .copied()
            .find(|style| style.name.eq_ignore_ascii_case(name))
    }

    /// Look up a style by name, falling back to [`FALLBACK`] for unknown names.
    #[must_use]
    pub fn get_or_fallback(name: &str) -> &'static Style {
        Self::get(name).unwrap_or_else(|| {
            tracing::warn!(style = name, fallback = FALLBACK.name, "Unknown highlight style");
            &FALLBACK
        })
    }

    /// Attributes for a category, walking up the category hierarchy.
    ///
    /// Returns `None` when neither the category nor any ancestor has an entry.
    #[must_use]
    pub fn lookup(&self, category: TokenCategory) -> Option<&Attrs> {
        category.lineage().find_map(|candidate| {
            self.entries
                .iter()
                .find(|(entry, _)| *entry == candidate)
                .map(|(_, attrs)| attrs)
        })
    }

    /// Inline CSS of the code container.
    #[must_use]
    pub fn container_css(&self) -> String {
        format!(
            "color:{};background-color:{};",
            self.color, self.background
        )
    }
}

//! Token categories and their mapping from grammar scopes.

use syntect::parsing::ScopeStack;

/// Category of a highlighted token.
///
/// Categories form a hierarchy: every category except [`Text`](Self::Text)
/// has a parent, and style lookup walks up until an entry is found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Text,
    Error,
    Comment,
    CommentPreproc,
    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordNamespace,
    KeywordType,
    Name,
    NameAttribute,
    NameBuiltin,
    NameBuiltinPseudo,
    NameClass,
    NameConstant,
    NameFunction,
    NameNamespace,
    NameTag,
    NameVariable,
    Literal,
    LiteralString,
    LiteralStringChar,
    LiteralStringEscape,
    LiteralStringRegex,
    LiteralNumber,
    Operator,
    Punctuation,
    Generic,
    GenericDeleted,
    GenericEmph,
    GenericHeading,
    GenericInserted,
    GenericStrong,
}

impl TokenCategory {
    /// Parent category, `None` for [`Text`](Self::Text).
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        use TokenCategory::{
            Comment, CommentPreproc, Error, Generic, GenericDeleted, GenericEmph, GenericHeading,
            GenericInserted, GenericStrong, Keyword, KeywordConstant, KeywordDeclaration,
            KeywordNamespace, KeywordType, Literal, LiteralNumber, LiteralString,
            LiteralStringChar, LiteralStringEscape, LiteralStringRegex, Name, NameAttribute,
            NameBuiltin, NameBuiltinPseudo, NameClass, NameConstant, NameFunction, NameNamespace,
            NameTag, NameVariable, Operator, Punctuation, Text,
        };

        match self {
            Text => None,
            Error | Comment | Keyword | Name | Literal | Operator | Punctuation | Generic => {
                Some(Text)
            }
            CommentPreproc => Some(Comment),
            KeywordConstant | KeywordDeclaration | KeywordNamespace | KeywordType => Some(Keyword),
            NameAttribute | NameBuiltin | NameClass | NameConstant | NameFunction
            | NameNamespace | NameTag | NameVariable => Some(Name),
            NameBuiltinPseudo => Some(NameBuiltin),
            LiteralString | LiteralNumber => Some(Literal),
            LiteralStringChar | LiteralStringEscape | LiteralStringRegex => Some(LiteralString),
            GenericDeleted | GenericEmph | GenericHeading | GenericInserted | GenericStrong => {
                Some(Generic)
            }
        }
    }

    /// This category followed by its ancestors, ending with [`Text`](Self::Text).
    pub fn lineage(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |category| category.parent())
    }

    /// Category of a token under the given scope stack.
    ///
    /// The innermost scope with a known mapping decides.
    #[must_use]
    pub fn of_scopes(stack: &ScopeStack) -> Self {
        stack
            .as_slice()
            .iter()
            .rev()
            .find_map(|scope| Self::of_scope(&scope.build_string()))
            .unwrap_or(Self::Text)
    }

    /// Category of a single dotted scope name such as `keyword.control.go`.
    #[must_use]
    pub fn of_scope(scope: &str) -> Option<Self> {
        SCOPE_PREFIXES
            .iter()
            .find(|(prefix, _)| has_scope_prefix(scope, prefix))
            .map(|&(_, category)| category)
    }
}

fn has_scope_prefix(scope: &str, prefix: &str) -> bool {
    scope
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Scope prefixes, most specific first.
const SCOPE_PREFIXES: &[(&str, TokenCategory)] = &[
    ("invalid", TokenCategory::Error),
    ("comment", TokenCategory::Comment),
    ("punctuation.definition.comment", TokenCategory::Comment),
    ("meta.preprocessor", TokenCategory::CommentPreproc),
    ("keyword.control.import.include", TokenCategory::CommentPreproc),
    ("punctuation.definition.string", TokenCategory::LiteralString),
    ("punctuation.definition.tag", TokenCategory::NameTag),
    ("constant.character.escape", TokenCategory::LiteralStringEscape),
    ("string.regexp", TokenCategory::LiteralStringRegex),
    ("string", TokenCategory::LiteralString),
    ("constant.numeric", TokenCategory::LiteralNumber),
    ("constant.language", TokenCategory::KeywordConstant),
    ("constant.character", TokenCategory::LiteralStringChar),
    ("constant", TokenCategory::NameConstant),
    ("keyword.operator", TokenCategory::Operator),
    ("keyword.control.import", TokenCategory::KeywordNamespace),
    ("keyword.other.import", TokenCategory::KeywordNamespace),
    ("keyword.other.package", TokenCategory::KeywordNamespace),
    ("keyword.declaration", TokenCategory::KeywordDeclaration),
    ("keyword", TokenCategory::Keyword),
    ("storage.type.function", TokenCategory::KeywordDeclaration),
    ("storage.type", TokenCategory::KeywordType),
    ("storage.modifier", TokenCategory::Keyword),
    ("storage", TokenCategory::KeywordDeclaration),
    ("support.type", TokenCategory::KeywordType),
    ("support.function.builtin", TokenCategory::NameBuiltin),
    ("support.function", TokenCategory::NameFunction),
    ("support.class", TokenCategory::NameClass),
    ("support.constant", TokenCategory::NameConstant),
    ("support", TokenCategory::NameBuiltin),
    ("entity.name.function", TokenCategory::NameFunction),
    ("entity.name.tag", TokenCategory::NameTag),
    ("entity.name.namespace", TokenCategory::NameNamespace),
    ("entity.name.module", TokenCategory::NameNamespace),
    ("entity.name", TokenCategory::NameClass),
    ("entity.other.attribute-name", TokenCategory::NameAttribute),
    ("entity.other.inherited-class", TokenCategory::NameClass),
    ("variable.language", TokenCategory::NameBuiltinPseudo),
    ("variable.function", TokenCategory::NameFunction),
    ("variable", TokenCategory::NameVariable),
    ("punctuation", TokenCategory::Punctuation),
    ("markup.heading", TokenCategory::GenericHeading),
    ("markup.bold", TokenCategory::GenericStrong),
    ("markup.italic", TokenCategory::GenericEmph),
    ("markup.inserted", TokenCategory::GenericInserted),
    ("markup.deleted", TokenCategory::GenericDeleted),
];

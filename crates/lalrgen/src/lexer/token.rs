use crate::grammar::EOF;
use crate::syntax::{TextRange, TextSize};
use compact_str::CompactString;
use std::fmt;

/// A token produced by the lexer.
///
/// `name` is the terminal the token stands for, `text` the source text it
/// covers (including any text accumulated by `more` rules) and `value` the
/// result of the rule's value transform, if it has one.
///
/// # Example
///
/// ```rust
/// use lalrgen::lexer::Token;
/// use lalrgen::syntax::{TextRange, TextSize};
///
/// let token = Token::new(
///     "NUMBER",
///     "42",
///     TextRange::at(TextSize::new(0), TextSize::new(2)),
/// );
/// assert_eq!(token.to_string(), "NUMBER \"42\"");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub name: CompactString,
    pub text: CompactString,
    pub range: TextRange,
    pub value: TokenValue,
}

/// The parsed value of a token, if applicable.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TokenValue {
    /// No parsed value (e.g., keywords, operators)
    #[default]
    None,
    Integer(i64),
    Float(f64),
    String(CompactString),
    Char(char),
    Bool(bool),
}

impl TokenValue {
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl Token {
    /// Create a token without a parsed value.
    #[must_use]
    pub fn new(
        name: impl Into<CompactString>,
        text: impl Into<CompactString>,
        range: TextRange,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            range,
            value: TokenValue::None,
        }
    }

    /// The synthetic end-of-input token at `offset`
    #[must_use]
    pub fn eof(offset: TextSize) -> Self {
        Self::new(EOF, "", TextRange::empty(offset))
    }

    #[must_use]
    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.name == EOF
    }

    #[must_use]
    pub const fn position(&self) -> TextSize {
        self.range.start()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {:?}", self.name, self.text.as_str())
        }
    }
}

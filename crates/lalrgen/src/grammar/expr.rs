//! Combinator expressions for rule bodies.
//!
//! Rule bodies are plain data: references to other rules are by name and are
//! resolved by [`GrammarBuilder`](super::GrammarBuilder) once every rule
//! name is known, so recursive and forward references need no special care.

use compact_str::CompactString;

/// Grammar expression representing one rule body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Match nothing
    Empty,
    /// Match this exact text; the text doubles as the terminal's name
    Literal(CompactString),
    /// Match a declared token by name
    Token(CompactString),
    /// Reference a rule by name
    Rule(CompactString),
    /// Sequence: match all expressions in order
    Seq(Vec<Expr>),
    /// Choice: match exactly one alternative
    Choice(Vec<Expr>),
    /// Optional: match the expression or nothing
    Opt(Box<Expr>),
    /// Match the expression between `min` and `max` times (`None` = unbounded)
    Repeat {
        expr: Box<Expr>,
        min: usize,
        max: Option<usize>,
    },
}

impl Expr {
    #[must_use]
    pub const fn empty() -> Self {
        Self::Empty
    }

    #[must_use]
    pub fn lit(text: impl Into<CompactString>) -> Self {
        Self::Literal(text.into())
    }

    #[must_use]
    pub fn token(name: impl Into<CompactString>) -> Self {
        Self::Token(name.into())
    }

    #[must_use]
    pub fn rule(name: impl Into<CompactString>) -> Self {
        Self::Rule(name.into())
    }

    /// A single-element sequence collapses to its element.
    #[must_use]
    pub fn seq<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut exprs: Vec<Self> = exprs.into_iter().collect();
        if exprs.len() == 1 {
            return exprs.remove(0);
        }
        Self::Seq(exprs)
    }

    #[must_use]
    pub fn choice<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::Choice(exprs.into_iter().collect())
    }

    #[must_use]
    pub fn opt(expr: Self) -> Self {
        Self::Opt(Box::new(expr))
    }

    /// Zero or more
    #[must_use]
    pub fn star(expr: Self) -> Self {
        Self::repeat(expr, 0, None)
    }

    /// One or more
    #[must_use]
    pub fn plus(expr: Self) -> Self {
        Self::repeat(expr, 1, None)
    }

    #[must_use]
    pub fn repeat(expr: Self, min: usize, max: Option<usize>) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min,
            max,
        }
    }

    /// `item (sep item)*`
    #[must_use]
    pub fn separated(item: Self, sep: Self) -> Self {
        Self::seq([item.clone(), Self::star(Self::seq([sep, item]))])
    }

    /// `open content close`
    #[must_use]
    pub fn delimited(open: Self, content: Self, close: Self) -> Self {
        Self::seq([open, content, close])
    }
}

impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Self::lit(text)
    }
}

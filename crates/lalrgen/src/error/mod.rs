//! # Error Types
//!
//! Errors and diagnostics for grammar construction, lexing and parsing.
//!
//! - [`GrammarError`]: malformed grammar or token definitions, fatal when the
//!   grammar, lexer or parser is built
//! - [`LexerError`]: no token rule matches at the current position
//! - [`ParseError`]: the table has no action for the current state and lookahead
//! - [`ParseWarning`]: non-fatal notes attached to a [`ParseResult`]
//!
//! Table conflicts are not errors; they are recorded on the table as
//! [`Conflict`](crate::lr::Conflict) values unless strict mode is requested.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich error reporting with source code snippets.

use crate::syntax::{LineCol, TextRange};
use crate::tree::ParseTree;
use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Problems found while assembling a grammar, its lexer or its tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("no start symbol has been set")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::missing_start)))]
    MissingStart,

    #[error("start symbol is already `{current}', cannot change it to `{requested}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::start_already_set)))]
    StartAlreadySet {
        current: CompactString,
        requested: CompactString,
    },

    #[error("grammar has no accept production; call `augment' first")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::not_augmented)))]
    NotAugmented,

    #[error("start symbol `{name}' has no productions")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined_start)))]
    UndefinedStart { name: CompactString },

    #[error("`{name}' is a reserved symbol name")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::reserved_name)))]
    ReservedName { name: CompactString },

    #[error("`{name}' cannot be both a terminal and a nonterminal")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::name_conflict)))]
    NameConflict { name: CompactString },

    #[error("token `{name}' is declared more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate_token)))]
    DuplicateToken { name: CompactString },

    #[error("rule `{name}' is defined more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate_rule)))]
    DuplicateRule { name: CompactString },

    #[error("`{name}' used in rule `{rule}' is not defined")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined_symbol)))]
    UndefinedSymbol {
        name: CompactString,
        rule: CompactString,
    },

    #[error("token `{token}' has an invalid pattern: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::invalid_pattern)))]
    InvalidPattern {
        token: CompactString,
        message: String,
    },

    #[error("token `{token}' has an empty pattern")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty_pattern)))]
    EmptyPattern { token: CompactString },

    #[error("token `{token}' switches to mode `{mode}', which has no rules")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unknown_mode)))]
    UnknownMode {
        token: CompactString,
        mode: CompactString,
    },

    #[error("repeat in rule `{rule}' has max {max} below min {min}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::invalid_repeat)))]
    InvalidRepeat {
        rule: CompactString,
        min: usize,
        max: usize,
    },

    #[error("{count} table conflict(s): {summary}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::conflicts)))]
    Conflicts { count: usize, summary: String },
}

/// Lexer error with location information
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("{line_col}: {kind}")]
pub struct LexerError {
    #[cfg_attr(feature = "diagnostics", label("no token starts here"))]
    pub span: TextRange,
    pub line_col: LineCol,
    #[source]
    pub kind: LexerErrorKind,
}

/// Types of lexer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerErrorKind {
    #[error(
        "couldn't match any tokens with string \"{preview}\"{}",
        .mode.as_ref().map(|m| format!(" in mode `{m}'")).unwrap_or_default()
    )]
    NoMatch {
        /// Escaped start of the unmatched input, truncated with `...`
        preview: String,
        /// Active mode, unless it is the default one
        mode: Option<CompactString>,
    },
}

impl LexerError {
    #[must_use]
    pub const fn new(span: TextRange, line_col: LineCol, kind: LexerErrorKind) -> Self {
        Self {
            span,
            line_col,
            kind,
        }
    }

    #[must_use]
    pub const fn span(&self) -> TextRange {
        self.span
    }

    #[must_use]
    pub const fn kind(&self) -> &LexerErrorKind {
        &self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    #[error("{line_col}: unexpected `{found}', expected {}", format_expected_list(.expected))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::unexpected_token)))]
    UnexpectedToken {
        #[cfg_attr(feature = "diagnostics", label("unexpected token"))]
        span: TextRange,
        line_col: LineCol,
        found: CompactString,
        expected: Vec<String>,
    },

    #[error("{line_col}: unexpected end of input, expected {}", format_expected_list(.expected))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::unexpected_eof)))]
    UnexpectedEof {
        #[cfg_attr(feature = "diagnostics", label("input ends here"))]
        span: TextRange,
        line_col: LineCol,
        expected: Vec<String>,
    },

    /// A reduction landed in a state without a goto entry. Only a corrupted
    /// table can produce this.
    #[error("no goto entry for `{symbol}' in state {state}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::missing_goto)))]
    MissingGoto { state: usize, symbol: CompactString },

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Lexer(#[from] LexerError),
}

impl ParseError {
    /// Span of the offending token, if the error has one
    #[must_use]
    pub const fn span(&self) -> Option<TextRange> {
        match self {
            Self::UnexpectedToken { span, .. } | Self::UnexpectedEof { span, .. } => Some(*span),
            Self::Lexer(err) => Some(err.span),
            Self::MissingGoto { .. } => None,
        }
    }

    /// Terminals that had an action in the failing state
    #[must_use]
    pub fn expected(&self) -> &[String] {
        match self {
            Self::UnexpectedToken { expected, .. } | Self::UnexpectedEof { expected, .. } => {
                expected
            }
            _ => &[],
        }
    }

    /// Human-readable list of the expected terminals
    #[must_use]
    pub fn format_expected(&self) -> String {
        format_expected_list(self.expected())
    }
}

/// Format a list of expected tokens as a human-readable string
///
/// Each entry is quoted: `` `a' ``, `` `a' or `b' ``, `` `a', `b', or `c' ``.
#[must_use]
pub fn format_expected_list(expected: &[String]) -> String {
    let quoted: Vec<String> = expected.iter().map(|e| format!("`{e}'")).collect();
    match quoted.len() {
        0 => "nothing".to_string(),
        1 => quoted[0].clone(),
        2 => format!("{} or {}", quoted[0], quoted[1]),
        n => format!("{}, or {}", quoted[..n - 1].join(", "), quoted[n - 1]),
    }
}

/// Any failure surfaced by the crate's entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum Error {
    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub span: TextRange,
    pub message: String,
}

impl ParseWarning {
    #[must_use]
    pub const fn new(span: TextRange, message: String) -> Self {
        Self { span, message }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseMetrics {
    pub tokens_consumed: usize,
    pub nodes_created: usize,
    pub reductions: usize,
    pub parse_time: std::time::Duration,
}

/// Outcome of one parse call
///
/// On success `root` holds the tree. When the parser is configured to
/// return partial results, a failed parse leaves `root` empty, puts the
/// subtrees that were on the parse stack into `partial` and records the
/// failure in `errors` and `warnings`.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub root: Option<ParseTree>,
    pub partial: Vec<ParseTree>,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<ParseWarning>,
    pub metrics: ParseMetrics,
}

impl ParseResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.root.is_some() && self.errors.is_empty()
    }

    /// The finished tree, or every recorded error.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when the parse did not finish.
    pub fn into_tree(self) -> Result<ParseTree, Vec<ParseError>> {
        match self.root {
            Some(root) if self.errors.is_empty() => Ok(root),
            _ => Err(self.errors),
        }
    }
}

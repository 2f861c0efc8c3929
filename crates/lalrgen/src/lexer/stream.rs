//! # Token Stream
//!
//! Pull-based tokenization: the parser asks for one token at a time and the
//! stream runs the lexer just far enough to produce it.

use super::builder::{DEFAULT_MODE, ModeCommand};
use super::compiled::Lexer;
use crate::error::{LexerError, LexerErrorKind};
use crate::lexer::{Token, TokenValue};
use crate::syntax::{LineCol, LineIndex, TextRange, TextSize};
use compact_str::CompactString;
use smallvec::SmallVec;
use std::cell::OnceCell;
use std::fmt;

const PREVIEW_CHARS: usize = 10;

/// One rule match, recorded when tracing is enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub line_col: LineCol,
    pub range: TextRange,
    pub rule: CompactString,
    pub mode: CompactString,
    pub text: CompactString,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6}{:<6}{:<6}{:<16}{:?}",
            self.line_col.line + 1,
            self.line_col.column + 1,
            self.range.len().to_u32(),
            self.rule.as_str(),
            self.text.as_str()
        )
    }
}

/// Iterator over the tokens of one input
///
/// Holds the per-input state: position, mode stack and the text collected by
/// `more` rules. Yields `EOF` last; after an error it yields nothing more.
pub struct TokenStream<'a> {
    lexer: &'a Lexer,
    text: &'a str,
    position: usize,
    modes: SmallVec<[CompactString; 4]>,
    pending: Option<(usize, String)>,
    finished: bool,
    trace: Option<Vec<TraceEntry>>,
    line_index: OnceCell<LineIndex>,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(lexer: &'a Lexer, text: &'a str) -> Self {
        let mut modes = SmallVec::new();
        modes.push(CompactString::from(DEFAULT_MODE));
        Self {
            lexer,
            text,
            position: 0,
            modes,
            pending: None,
            finished: false,
            trace: None,
            line_index: OnceCell::new(),
        }
    }

    /// Record every rule match for [`take_trace`](Self::take_trace).
    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    /// Trace entries recorded so far
    pub fn take_trace(&mut self) -> Vec<TraceEntry> {
        self.trace.as_mut().map(std::mem::take).unwrap_or_default()
    }

    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the next unread character
    #[must_use]
    pub fn position(&self) -> TextSize {
        TextSize::of(self.position)
    }

    /// Active mode, the top of the mode stack
    #[must_use]
    pub fn mode(&self) -> &str {
        self.modes.last().map_or(DEFAULT_MODE, CompactString::as_str)
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        self.line_index.get_or_init(|| LineIndex::new(self.text))
    }

    fn apply(&mut self, command: &ModeCommand) {
        match command {
            ModeCommand::Push(mode) => self.modes.push(mode.clone()),
            ModeCommand::Pop => {
                if self.modes.len() > 1 {
                    self.modes.pop();
                }
            }
            ModeCommand::Set(mode) => {
                if let Some(top) = self.modes.last_mut() {
                    top.clone_from(mode);
                }
            }
        }
    }

    fn error(&self) -> LexerError {
        let rest = &self.text[self.position..];
        let escaped: String = rest.escape_debug().collect();
        let preview = if escaped.chars().count() > PREVIEW_CHARS {
            let head: String = escaped.chars().take(PREVIEW_CHARS).collect();
            format!("{head}...")
        } else {
            escaped
        };
        let mode = self.mode();
        let width = rest.chars().next().map_or(0, char::len_utf8);

        LexerError::new(
            TextRange::from_offsets(self.position, self.position + width),
            self.line_index().line_col(self.position()),
            LexerErrorKind::NoMatch {
                preview,
                mode: (mode != DEFAULT_MODE).then(|| mode.into()),
            },
        )
    }

    fn finish(&mut self) -> Token {
        self.finished = true;
        if let Some((start, text)) = self.pending.take()
            && !text.is_empty()
        {
            log::warn!("discarding unfinished token text {text:?} starting at offset {start}");
        }
        Token::eof(TextSize::of(self.text.len()))
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let (lexer, source) = (self.lexer, self.text);
        loop {
            if self.position >= source.len() {
                return Some(Ok(self.finish()));
            }

            let rest = &source[self.position..];
            let Some((rule, len)) = lexer.best_match(rest, self.mode()) else {
                self.finished = true;
                return Some(Err(self.error()));
            };
            let start = self.position;
            let matched = &rest[..len];
            self.position += len;

            log::trace!("{start}: {} matched {matched:?}", rule.name);
            if self.trace.is_some() {
                let entry = TraceEntry {
                    line_col: self.line_index().line_col(TextSize::of(start)),
                    range: TextRange::from_offsets(start, self.position),
                    rule: rule.name.clone(),
                    mode: self.mode().into(),
                    text: matched.into(),
                };
                if let Some(trace) = self.trace.as_mut() {
                    trace.push(entry);
                }
            }

            if let Some(command) = &rule.command {
                self.apply(command);
            }

            let (run_start, mut text) = self.pending.take().unwrap_or((start, String::new()));
            if !rule.skip {
                text.push_str(matched);
            }
            if rule.more {
                self.pending = Some((run_start, text));
                continue;
            }
            if rule.skip && text.is_empty() {
                continue;
            }

            let value = rule
                .transform
                .as_ref()
                .map_or(TokenValue::None, |transform| transform(&text));
            return Some(Ok(Token {
                name: rule.name.clone(),
                text: text.into(),
                range: TextRange::from_offsets(run_start, self.position),
                value,
            }));
        }
    }
}

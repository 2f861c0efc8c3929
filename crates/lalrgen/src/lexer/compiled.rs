use super::builder::{ConflictMode, DEFAULT_MODE, ModeCommand, Pattern, TokenRule};
use super::stream::{TokenStream, TraceEntry};
use crate::error::{GrammarError, LexerError};
use crate::grammar::EOF;
use crate::lexer::Token;
use regex::Regex;
use smallvec::SmallVec;

/// Compiled form of one pattern
#[derive(Debug, Clone)]
enum Matcher {
    Literal(compact_str::CompactString),
    Regex(Regex),
}

impl Matcher {
    fn match_len(&self, rest: &str) -> Option<usize> {
        match self {
            Self::Literal(text) => rest.starts_with(text.as_str()).then_some(text.len()),
            Self::Regex(regex) => regex.find(rest).map(|m| m.end()),
        }
    }
}

/// Token rule with its patterns compiled
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) rule: TokenRule,
    matchers: SmallVec<[Matcher; 1]>,
}

impl CompiledRule {
    pub(crate) fn compile(rule: TokenRule) -> Result<Self, GrammarError> {
        let mut matchers = SmallVec::new();
        for pattern in &rule.patterns {
            if matches!(pattern, Pattern::Literal(text) if text.is_empty()) {
                return Err(GrammarError::EmptyPattern {
                    token: rule.name.clone(),
                });
            }
            let matcher = match pattern {
                Pattern::Literal(text) if !rule.insensitive => Matcher::Literal(text.clone()),
                _ => {
                    let flags = if rule.insensitive { "(?i)" } else { "" };
                    let source = format!("\\A{flags}(?:{})", pattern.to_regex_source());
                    let regex = Regex::new(&source).map_err(|err| GrammarError::InvalidPattern {
                        token: rule.name.clone(),
                        message: err.to_string(),
                    })?;
                    Matcher::Regex(regex)
                }
            };
            matchers.push(matcher);
        }
        Ok(Self { rule, matchers })
    }

    /// Length of the first non-empty match of any pattern at the start of `rest`
    fn match_len(&self, rest: &str) -> Option<usize> {
        self.matchers
            .iter()
            .filter_map(|m| m.match_len(rest))
            .find(|len| *len > 0)
    }
}

/// Mode-aware tokenizer built by [`LexerBuilder`](super::LexerBuilder)
///
/// The rule set is read-only once built; every call to [`tokens`](Self::tokens)
/// gets its own mode stack and position, so one lexer can serve any number of
/// inputs.
#[derive(Debug, Clone)]
pub struct Lexer {
    rules: Vec<CompiledRule>,
    conflict_mode: ConflictMode,
}

impl Lexer {
    pub(crate) const fn new(rules: Vec<CompiledRule>, conflict_mode: ConflictMode) -> Self {
        Self {
            rules,
            conflict_mode,
        }
    }

    /// Lazily tokenize `text`. The stream ends with an `EOF` token, or with
    /// the first error.
    #[must_use]
    pub fn tokens<'a>(&'a self, text: &'a str) -> TokenStream<'a> {
        TokenStream::new(self, text)
    }

    /// Tokenize all of `text`, including the trailing `EOF` token.
    ///
    /// # Errors
    ///
    /// Returns the first position where no rule matches.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, LexerError> {
        self.tokens(text).collect()
    }

    /// Like [`tokenize`](Self::tokenize), also returning one trace entry per
    /// rule match, skipped and `more` matches included.
    ///
    /// # Errors
    ///
    /// Returns the first position where no rule matches.
    pub fn tokenize_with_trace(
        &self,
        text: &str,
    ) -> Result<(Vec<Token>, Vec<TraceEntry>), LexerError> {
        let mut stream = self.tokens(text).with_trace();
        let tokens = stream.by_ref().collect::<Result<Vec<_>, _>>()?;
        Ok((tokens, stream.take_trace()))
    }

    /// Pick the rule to apply at the start of `rest` in `mode`.
    pub(crate) fn best_match(&self, rest: &str, mode: &str) -> Option<(&TokenRule, usize)> {
        let mut best: Option<(&TokenRule, usize)> = None;
        for compiled in self.rules.iter().filter(|r| r.rule.mode == mode) {
            let Some(len) = compiled.match_len(rest) else {
                continue;
            };
            match self.conflict_mode {
                ConflictMode::First => return Some((&compiled.rule, len)),
                ConflictMode::Longest => {
                    if best.is_none_or(|(_, best_len)| len > best_len) {
                        best = Some((&compiled.rule, len));
                    }
                }
            }
        }
        best
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&TokenRule> {
        self.rules().find(|rule| rule.name == name)
    }

    /// Rules in declaration order
    pub fn rules(&self) -> impl Iterator<Item = &TokenRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Compile `rule` and append it after the existing rules.
    ///
    /// # Errors
    ///
    /// Fails on the same conditions as [`LexerBuilder::build`](super::LexerBuilder::build)
    /// for a single rule: a taken or reserved name, an empty literal, a bad
    /// pattern, or a mode command naming an unknown mode.
    pub fn add_rule(&mut self, rule: TokenRule) -> Result<(), GrammarError> {
        if rule.name == EOF {
            return Err(GrammarError::ReservedName { name: rule.name });
        }
        if self.rule(&rule.name).is_some() {
            return Err(GrammarError::DuplicateToken { name: rule.name });
        }
        if let Some(ModeCommand::Push(mode) | ModeCommand::Set(mode)) = &rule.command
            && mode != DEFAULT_MODE
            && *mode != rule.mode
            && self.rules().all(|existing| existing.mode != *mode)
        {
            return Err(GrammarError::UnknownMode {
                token: rule.name.clone(),
                mode: mode.clone(),
            });
        }
        self.rules.push(CompiledRule::compile(rule)?);
        Ok(())
    }

    /// Remove a rule by name; returns whether it existed.
    pub fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|compiled| compiled.rule.name != name);
        before != self.rules.len()
    }

    #[must_use]
    pub const fn conflict_mode(&self) -> ConflictMode {
        self.conflict_mode
    }

    pub const fn set_conflict_mode(&mut self, mode: ConflictMode) {
        self.conflict_mode = mode;
    }
}

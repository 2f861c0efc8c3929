use crate::error::GrammarError;
use crate::grammar::EOF;
use crate::lexer::compiled::{CompiledRule, Lexer};
use crate::lexer::TokenValue;
use compact_str::CompactString;
use hashbrown::HashSet;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Mode every lexer starts in
pub const DEFAULT_MODE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Literal(CompactString),
    CharClass(CharSet),
    Repeat {
        pattern: Box<Pattern>,
        min: usize,
        max: Option<usize>,
    },
    /// Regular expression in `regex` crate syntax, matched at the current
    /// position only
    Regex(CompactString),
    /// Any single character
    Any,
}

impl Pattern {
    #[must_use]
    pub fn literal(text: impl Into<CompactString>) -> Self {
        Self::Literal(text.into())
    }

    #[must_use]
    pub fn regex(source: impl Into<CompactString>) -> Self {
        Self::Regex(source.into())
    }

    /// Regex source equivalent to this pattern, wrapped in a group.
    pub(crate) fn to_regex_source(&self) -> String {
        match self {
            Self::Literal(text) => regex::escape(text),
            Self::CharClass(set) => set.to_regex_class(),
            Self::Repeat { pattern, min, max } => {
                let inner = pattern.to_regex_source();
                match max {
                    Some(max) => format!("(?:{inner}){{{min},{max}}}"),
                    None => format!("(?:{inner}){{{min},}}"),
                }
            }
            Self::Regex(source) => format!("(?:{source})"),
            Self::Any => "(?s:.)".to_string(),
        }
    }
}

/// Character class built from inclusive ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    ranges: Vec<(char, char)>,
}

impl CharSet {
    #[must_use]
    pub const fn new(ranges: Vec<(char, char)>) -> Self {
        Self { ranges }
    }

    #[must_use]
    pub fn digits() -> Self {
        Self::new(vec![('0', '9')])
    }

    #[must_use]
    pub fn letters() -> Self {
        Self::new(vec![('a', 'z'), ('A', 'Z')])
    }

    #[must_use]
    pub fn whitespace() -> Self {
        Self::new(vec![(' ', ' '), ('\t', '\t'), ('\r', '\r'), ('\n', '\n')])
    }

    #[must_use]
    pub fn matches(&self, c: char) -> bool {
        self.ranges.iter().any(|(start, end)| c >= *start && c <= *end)
    }

    fn to_regex_class(&self) -> String {
        let mut class = String::from("[");
        for (start, end) in &self.ranges {
            class.push_str(&regex::escape(&start.to_string()));
            if start != end {
                class.push('-');
                class.push_str(&regex::escape(&end.to_string()));
            }
        }
        class.push(']');
        class
    }
}

/// Mode change applied right after a rule matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeCommand {
    Push(CompactString),
    /// Never removes the bottom mode
    Pop,
    /// Replace the current mode
    Set(CompactString),
}

/// How the lexer chooses between rules matching at the same position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictMode {
    /// Longest match wins; equal lengths go to the earlier rule
    #[default]
    Longest,
    /// The earliest declared rule that matches wins
    First,
}

pub type ValueTransform = Arc<dyn Fn(&str) -> TokenValue + Send + Sync>;

/// One token definition: a name, its patterns and its flags
#[derive(Clone)]
pub struct TokenRule {
    pub name: CompactString,
    pub patterns: SmallVec<[Pattern; 1]>,
    /// Matched text is dropped
    pub skip: bool,
    /// Matched text is carried into the next emitted token
    pub more: bool,
    pub insensitive: bool,
    pub mode: CompactString,
    pub command: Option<ModeCommand>,
    pub transform: Option<ValueTransform>,
}

impl fmt::Debug for TokenRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRule")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .field("skip", &self.skip)
            .field("more", &self.more)
            .field("insensitive", &self.insensitive)
            .field("mode", &self.mode)
            .field("command", &self.command)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl TokenRule {
    #[must_use]
    pub fn new(name: impl Into<CompactString>, pattern: Pattern) -> Self {
        let mut patterns = SmallVec::new();
        patterns.push(pattern);
        Self {
            name: name.into(),
            patterns,
            skip: false,
            more: false,
            insensitive: false,
            mode: DEFAULT_MODE.into(),
            command: None,
            transform: None,
        }
    }

    /// Add an alternative pattern; the first one that matches is used.
    #[must_use]
    pub fn or(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    #[must_use]
    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    #[must_use]
    pub const fn more(mut self) -> Self {
        self.more = true;
        self
    }

    #[must_use]
    pub const fn insensitive(mut self) -> Self {
        self.insensitive = true;
        self
    }

    /// Only match while `mode` is the active mode.
    #[must_use]
    pub fn in_mode(mut self, mode: impl Into<CompactString>) -> Self {
        self.mode = mode.into();
        self
    }

    #[must_use]
    pub fn push_mode(mut self, mode: impl Into<CompactString>) -> Self {
        self.command = Some(ModeCommand::Push(mode.into()));
        self
    }

    #[must_use]
    pub fn pop_mode(mut self) -> Self {
        self.command = Some(ModeCommand::Pop);
        self
    }

    #[must_use]
    pub fn set_mode(mut self, mode: impl Into<CompactString>) -> Self {
        self.command = Some(ModeCommand::Set(mode.into()));
        self
    }

    #[must_use]
    pub fn transform(mut self, f: impl Fn(&str) -> TokenValue + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexerBuilder {
    rules: Vec<TokenRule>,
    conflict_mode: ConflictMode,
}

impl LexerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain token rule; declaration order breaks match ties.
    #[must_use]
    pub fn token(self, name: impl Into<CompactString>, pattern: Pattern) -> Self {
        self.rule(TokenRule::new(name, pattern))
    }

    #[must_use]
    pub fn rule(mut self, rule: TokenRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub const fn conflict_mode(mut self, mode: ConflictMode) -> Self {
        self.conflict_mode = mode;
        self
    }

    #[must_use]
    pub fn has_token(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name == name)
    }

    /// Declared token names in declaration order
    pub fn token_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Compile every pattern and check the rule set.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate or reserved token name, an empty literal, a
    /// pattern that does not compile, or a mode command naming a mode no
    /// rule belongs to.
    pub fn build(self) -> Result<Lexer, GrammarError> {
        self.validate()?;
        let rules = self
            .rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("compiled {} lexer rules", rules.len());
        Ok(Lexer::new(rules, self.conflict_mode))
    }

    fn validate(&self) -> Result<(), GrammarError> {
        let mut names: HashSet<&str, ahash::RandomState> = HashSet::default();
        let mut modes: HashSet<&str, ahash::RandomState> = HashSet::default();
        modes.insert(DEFAULT_MODE);
        for rule in &self.rules {
            if rule.name == EOF {
                return Err(GrammarError::ReservedName {
                    name: rule.name.clone(),
                });
            }
            if !names.insert(rule.name.as_str()) {
                return Err(GrammarError::DuplicateToken {
                    name: rule.name.clone(),
                });
            }
            modes.insert(rule.mode.as_str());
        }

        for rule in &self.rules {
            if let Some(ModeCommand::Push(mode) | ModeCommand::Set(mode)) = &rule.command
                && !modes.contains(mode.as_str())
            {
                return Err(GrammarError::UnknownMode {
                    token: rule.name.clone(),
                    mode: mode.clone(),
                });
            }
        }
        Ok(())
    }
}

//! # Grammar Builder
//!
//! Assembles a [`Grammar`] and its [`Lexer`] from token definitions and rule
//! bodies written as [`Expr`] values.
//!
//! Construction runs in two phases. First every token name and rule name is
//! registered, so bodies may refer to rules defined later or to themselves.
//! Then each body is resolved against the complete name table and lowered to
//! flat productions:
//!
//! - a top-level choice gives one production per alternative
//! - nested choices, optionals and repeats get generated helper
//!   nonterminals (`{rule}_alternation`, `{rule}_optional`, `{rule}_repeat`,
//!   `{rule}_group`), which are spliced out of parse trees
//! - every literal that is not a declared token becomes a literal lexer rule,
//!   appended after the declared tokens
//!
//! ```rust
//! use lalrgen::grammar::{Expr, GrammarBuilder};
//! use lalrgen::lexer::{Pattern, TokenRule};
//!
//! let language = GrammarBuilder::new()
//!     .token("NUMBER", Pattern::regex("[0-9]+"))
//!     .token_rule(TokenRule::new("WS", Pattern::regex(r"\s+")).skip())
//!     .rule("list", Expr::separated(Expr::token("NUMBER"), Expr::lit(",")))
//!     .start("list")
//!     .build()?;
//!
//! assert!(language.grammar.is_symbol(","));
//! assert!(language.lexer.rule(",").is_some());
//! # Ok::<(), lalrgen::error::GrammarError>(())
//! ```

use crate::error::GrammarError;
use crate::grammar::{EOF, Expr, Grammar};
use crate::lexer::{ConflictMode, Lexer, LexerBuilder, Pattern, TokenRule};
use crate::lr::{LrConfig, LrParser};
use compact_str::{CompactString, format_compact};
use hashbrown::HashSet;
use smallvec::{SmallVec, smallvec};

type Names = SmallVec<[CompactString; 4]>;

/// A grammar together with the lexer that feeds it
#[derive(Debug, Clone)]
pub struct Language {
    pub grammar: Grammar,
    pub lexer: Lexer,
}

impl Language {
    /// Build the LALR(1) parser for this language.
    ///
    /// # Errors
    ///
    /// See [`LrParser::new`].
    pub fn parser(self, config: LrConfig) -> Result<LrParser, GrammarError> {
        LrParser::new(self.grammar, self.lexer, config)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    lexer: LexerBuilder,
    rules: Vec<(CompactString, Expr)>,
    start: Option<CompactString>,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn token(mut self, name: impl Into<CompactString>, pattern: Pattern) -> Self {
        self.lexer = self.lexer.token(name, pattern);
        self
    }

    /// Declare a token with flags, modes or a value transform.
    #[must_use]
    pub fn token_rule(mut self, rule: TokenRule) -> Self {
        self.lexer = self.lexer.rule(rule);
        self
    }

    #[must_use]
    pub fn rule(mut self, name: impl Into<CompactString>, body: Expr) -> Self {
        self.rules.push((name.into(), body));
        self
    }

    #[must_use]
    pub fn start(mut self, name: impl Into<CompactString>) -> Self {
        self.start = Some(name.into());
        self
    }

    #[must_use]
    pub fn lexer_conflict_mode(mut self, mode: ConflictMode) -> Self {
        self.lexer = self.lexer.conflict_mode(mode);
        self
    }

    /// Resolve every rule body and build the grammar and its lexer.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for a missing or undefined start rule,
    /// duplicate or clashing names, references to undefined tokens or rules,
    /// invalid repeat bounds and any error from compiling the lexer.
    pub fn build(self) -> Result<Language, GrammarError> {
        let start = self.start.clone().ok_or(GrammarError::MissingStart)?;
        let mut grammar = Grammar::new();

        let tokens: HashSet<CompactString, ahash::RandomState> =
            self.lexer.token_names().map(CompactString::from).collect();
        for name in self.lexer.token_names() {
            if name != EOF {
                grammar.register_terminal(name)?;
            }
        }

        let mut rules: HashSet<CompactString, ahash::RandomState> = HashSet::default();
        for (name, _) in &self.rules {
            if tokens.contains(name) {
                return Err(GrammarError::NameConflict { name: name.clone() });
            }
            if !rules.insert(name.clone()) {
                return Err(GrammarError::DuplicateRule { name: name.clone() });
            }
            grammar.declare_nonterminal(name)?;
        }
        if !rules.contains(&start) {
            return Err(GrammarError::UndefinedStart { name: start });
        }

        let mut lowering = Lowering {
            grammar: &mut grammar,
            tokens: &tokens,
            rules: &rules,
            literals: Vec::new(),
            rule: CompactString::default(),
        };
        for (name, body) in &self.rules {
            lowering.rule.clone_from(name);
            let alternatives = match body {
                Expr::Choice(alternatives) if !alternatives.is_empty() => alternatives.as_slice(),
                other => std::slice::from_ref(other),
            };
            for alternative in alternatives {
                let symbols = lowering.lower(alternative)?;
                lowering.grammar.add_production(name, &symbols)?;
            }
        }
        let literals = lowering.literals;

        grammar.set_start(&start)?;
        let mut lexer = self.lexer;
        for literal in &literals {
            lexer = lexer.token(literal.clone(), Pattern::Literal(literal.clone()));
        }
        log::debug!(
            "lowered {} rules into {} productions ({} literal tokens)",
            self.rules.len(),
            grammar.productions().len(),
            literals.len()
        );

        Ok(Language {
            grammar,
            lexer: lexer.build()?,
        })
    }
}

/// Lowers rule bodies of one grammar into flat productions
struct Lowering<'a> {
    grammar: &'a mut Grammar,
    tokens: &'a HashSet<CompactString, ahash::RandomState>,
    rules: &'a HashSet<CompactString, ahash::RandomState>,
    literals: Vec<CompactString>,
    /// Rule whose body is being lowered; prefixes helper names
    rule: CompactString,
}

impl Lowering<'_> {
    fn lower(&mut self, expr: &Expr) -> Result<Names, GrammarError> {
        match expr {
            Expr::Empty => Ok(Names::new()),
            Expr::Literal(text) => self.literal(text),
            Expr::Token(name) => {
                if self.tokens.contains(name) {
                    Ok(smallvec![name.clone()])
                } else {
                    Err(self.undefined(name))
                }
            }
            Expr::Rule(name) => {
                if self.rules.contains(name) {
                    Ok(smallvec![name.clone()])
                } else {
                    Err(self.undefined(name))
                }
            }
            Expr::Seq(items) => {
                let mut symbols = Names::new();
                for item in items {
                    symbols.extend(self.lower(item)?);
                }
                Ok(symbols)
            }
            Expr::Choice(alternatives) => match alternatives.as_slice() {
                [] => Ok(Names::new()),
                [single] => self.lower(single),
                _ => {
                    let helper = self.fresh("alternation")?;
                    for alternative in alternatives {
                        let symbols = self.lower(alternative)?;
                        self.grammar.add_generated_production(&helper, &symbols)?;
                    }
                    Ok(smallvec![helper])
                }
            },
            Expr::Opt(inner) => {
                let symbols = self.lower(inner)?;
                let helper = self.fresh("optional")?;
                self.grammar.add_generated_production(&helper, &symbols)?;
                self.grammar.add_generated_production(&helper, Names::new())?;
                Ok(smallvec![helper])
            }
            Expr::Repeat { expr, min, max } => self.repeat(expr, *min, *max),
        }
    }

    fn literal(&mut self, text: &CompactString) -> Result<Names, GrammarError> {
        if text.is_empty() {
            return Err(GrammarError::EmptyPattern {
                token: self.rule.clone(),
            });
        }
        if !self.tokens.contains(text) && !self.literals.contains(text) {
            self.grammar.register_terminal(text)?;
            self.literals.push(text.clone());
        }
        Ok(smallvec![text.clone()])
    }

    fn repeat(&mut self, expr: &Expr, min: usize, max: Option<usize>) -> Result<Names, GrammarError> {
        if let Some(max) = max
            && max < min
        {
            return Err(GrammarError::InvalidRepeat {
                rule: self.rule.clone(),
                min,
                max,
            });
        }

        let symbols = self.lower(expr)?;
        let item = match symbols.as_slice() {
            [] => return Ok(Names::new()),
            [single] => single.clone(),
            _ => {
                let group = self.fresh("group")?;
                self.grammar.add_generated_production(&group, &symbols)?;
                group
            }
        };

        let mut out: Names = std::iter::repeat_n(item.clone(), min).collect();
        match max {
            Some(max) if max == min => {}
            None => {
                let helper = self.fresh("repeat")?;
                self.grammar
                    .add_generated_production(&helper, [item.as_str(), helper.as_str()])?;
                self.grammar.add_generated_production(&helper, Names::new())?;
                out.push(helper);
            }
            Some(max) => {
                let helper = self.fresh("repeat")?;
                for count in 0..=(max - min) {
                    let copies: Names = std::iter::repeat_n(item.clone(), count).collect();
                    self.grammar.add_generated_production(&helper, &copies)?;
                }
                out.push(helper);
            }
        }
        Ok(out)
    }

    /// Reserve a helper nonterminal name derived from the current rule.
    fn fresh(&mut self, suffix: &str) -> Result<CompactString, GrammarError> {
        let name = self
            .grammar
            .unique_name(&format_compact!("{}_{suffix}", self.rule));
        self.grammar.declare_nonterminal(&name)?;
        Ok(name)
    }

    fn undefined(&self, name: &CompactString) -> GrammarError {
        GrammarError::UndefinedSymbol {
            name: name.clone(),
            rule: self.rule.clone(),
        }
    }
}

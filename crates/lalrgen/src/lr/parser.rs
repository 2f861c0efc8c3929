use crate::error::{
    Error, GrammarError, ParseError, ParseMetrics, ParseResult, ParseWarning,
};
use crate::grammar::{Grammar, Nff};
use crate::lexer::{Lexer, Pattern, Token, TokenRule, TokenStream};
use crate::lr::automaton::Automaton;
use crate::lr::config::{ErrorMode, LrConfig};
use crate::lr::table::{Action, ParseTable};
use crate::tree::ParseTree;
use std::time::Instant;

/// One parse stack entry; the bottom frame has no node.
struct Frame {
    state: usize,
    node: Option<ParseTree>,
}

/// A failed parse: the error plus what was on the stack
struct Failure {
    error: ParseError,
    partial: Vec<ParseTree>,
}

/// Table-driven LALR(1) parser
///
/// Everything is built in [`new`](Self::new); parsing only reads the grammar,
/// lexer and table, so one parser can be shared between threads and reused
/// for any number of inputs.
#[derive(Debug, Clone)]
pub struct LrParser {
    grammar: Grammar,
    lexer: Lexer,
    nff: Nff,
    automaton: Automaton,
    table: ParseTable,
    config: LrConfig,
}

impl LrParser {
    /// Augment the grammar and build its analysis sets, automaton and table.
    ///
    /// Every grammar terminal the lexer has no rule for gets a literal rule
    /// matching its own name, appended after the declared rules.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] if the grammar has no usable start symbol,
    /// if a terminal cannot be registered with the lexer, or if
    /// `strict_conflicts` is set and the table has conflicts.
    pub fn new(
        mut grammar: Grammar,
        mut lexer: Lexer,
        config: LrConfig,
    ) -> Result<Self, GrammarError> {
        grammar.augment()?;
        register_terminals(&grammar, &mut lexer)?;
        let nff = Nff::compute(&grammar);
        log::debug!("nullable/FIRST fixpoint took {} passes", nff.passes());
        let automaton = Automaton::build(&grammar, &nff, config.use_lalr)?;
        let table = ParseTable::build(&grammar, &automaton);
        log::debug!(
            "parser ready: {} productions, {} states, {} conflicts",
            grammar.productions().len(),
            table.state_count(),
            table.conflicts().len()
        );

        if config.strict_conflicts && table.has_conflicts() {
            let summary = table
                .conflicts()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GrammarError::Conflicts {
                count: table.conflicts().len(),
                summary,
            });
        }

        Ok(Self {
            grammar,
            lexer,
            nff,
            automaton,
            table,
            config,
        })
    }

    /// Tokenize and parse `text`.
    ///
    /// # Errors
    ///
    /// With [`ErrorMode::Raise`], returns the first lexer or parse error.
    /// With [`ErrorMode::Partial`] the error is reported in the returned
    /// [`ParseResult`] instead.
    pub fn parse(&self, text: &str) -> Result<ParseResult, Error> {
        self.parse_stream(self.lexer.tokens(text))
    }

    /// Parse `text` and return the tree, whatever the configured error mode.
    ///
    /// # Errors
    ///
    /// Returns the first lexer or parse error.
    pub fn parse_tree(&self, text: &str) -> Result<ParseTree, Error> {
        let mut metrics = ParseMetrics::default();
        self.run(self.lexer.tokens(text), &mut metrics)
            .map_err(|failure| into_error(failure.error))
    }

    /// Parse the tokens of an existing stream.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn parse_stream(&self, stream: TokenStream<'_>) -> Result<ParseResult, Error> {
        let started = Instant::now();
        let mut metrics = ParseMetrics::default();
        let outcome = self.run(stream, &mut metrics);
        metrics.parse_time = started.elapsed();

        match outcome {
            Ok(root) => Ok(ParseResult {
                root: Some(root),
                metrics,
                ..ParseResult::default()
            }),
            Err(failure) => match self.config.error_mode {
                ErrorMode::Raise => Err(into_error(failure.error)),
                ErrorMode::Partial => {
                    let span = failure.error.span().unwrap_or_default();
                    let warning = ParseWarning::new(
                        span,
                        format!("parse stopped early: {}", failure.error),
                    );
                    Ok(ParseResult {
                        root: None,
                        partial: failure.partial,
                        errors: vec![failure.error],
                        warnings: vec![warning],
                        metrics,
                    })
                }
            },
        }
    }

    fn run(&self, mut stream: TokenStream<'_>, metrics: &mut ParseMetrics) -> Result<ParseTree, Failure> {
        let mut stack = vec![Frame {
            state: 0,
            node: None,
        }];
        let mut lookahead: Option<Token> = None;

        loop {
            let token = match lookahead.take() {
                Some(token) => token,
                None => match stream.next() {
                    Some(Ok(token)) => token,
                    Some(Err(err)) => return Err(fail(stack, ParseError::Lexer(err))),
                    None => Token::eof(stream.position()),
                },
            };
            let state = stack.last().map_or(0, |frame| frame.state);
            let action = self
                .grammar
                .symbol(&token.name)
                .filter(|symbol| self.grammar.is_terminal(*symbol))
                .map_or(Action::Error, |symbol| self.table.action(state, symbol));
            log::trace!("state {state}, lookahead {token}: {action:?}");

            match action {
                Action::Shift(next) => {
                    metrics.tokens_consumed += 1;
                    metrics.nodes_created += 1;
                    stack.push(Frame {
                        state: next,
                        node: Some(ParseTree::Leaf(token)),
                    });
                }
                Action::Reduce(index) => {
                    let Some(production) = self.grammar.production(index).cloned() else {
                        return Err(fail(stack, self.missing_goto(state, index)));
                    };
                    // the bottom frame is never popped
                    if stack.len() <= production.len() {
                        return Err(fail(stack, self.missing_goto(state, index)));
                    }
                    let split = stack.len() - production.len();
                    let children: Vec<ParseTree> = stack
                        .drain(split..)
                        .filter_map(|frame| frame.node)
                        .collect();
                    let exposed = stack.last().map_or(0, |frame| frame.state);
                    let Some(target) = self.table.goto(exposed, production.lhs()) else {
                        return Err(fail(stack, self.missing_goto(exposed, index)));
                    };
                    metrics.reductions += 1;
                    metrics.nodes_created += 1;
                    stack.push(Frame {
                        state: target,
                        node: Some(ParseTree::internal(production, children)),
                    });
                    lookahead = Some(token);
                }
                Action::Accept => {
                    let Some(root) = stack.pop().and_then(|frame| frame.node) else {
                        let error = self.unexpected(state, &token, &stream);
                        return Err(fail(stack, error));
                    };
                    return Ok(if self.config.simplify {
                        root.simplify()
                    } else {
                        root
                    });
                }
                Action::Goto(_) | Action::Error => {
                    let error = self.unexpected(state, &token, &stream);
                    return Err(fail(stack, error));
                }
            }
        }
    }

    fn unexpected(&self, state: usize, token: &Token, stream: &TokenStream<'_>) -> ParseError {
        let expected: Vec<String> = self
            .table
            .expected(state)
            .into_iter()
            .map(|symbol| self.grammar.name(symbol).to_string())
            .collect();
        let span = token.range;
        let line_col = stream.line_index().line_col(span.start());
        if token.is_eof() {
            ParseError::UnexpectedEof {
                span,
                line_col,
                expected,
            }
        } else {
            ParseError::UnexpectedToken {
                span,
                line_col,
                found: token.name.clone(),
                expected,
            }
        }
    }

    fn missing_goto(&self, state: usize, production: usize) -> ParseError {
        let symbol = self
            .grammar
            .production(production)
            .map(|p| p.name().into())
            .unwrap_or_default();
        ParseError::MissingGoto { state, symbol }
    }

    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    #[must_use]
    pub const fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    #[must_use]
    pub const fn nff(&self) -> &Nff {
        &self.nff
    }

    #[must_use]
    pub const fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    #[must_use]
    pub const fn table(&self) -> &ParseTable {
        &self.table
    }

    #[must_use]
    pub const fn config(&self) -> &LrConfig {
        &self.config
    }
}

fn register_terminals(grammar: &Grammar, lexer: &mut Lexer) -> Result<(), GrammarError> {
    for symbol in grammar.terminals() {
        let name = grammar.name(symbol);
        if symbol == grammar.eof() || lexer.rule(name).is_some() {
            continue;
        }
        log::debug!("registering literal token {name:?}");
        lexer.add_rule(TokenRule::new(name, Pattern::literal(name)))?;
    }
    Ok(())
}

fn fail(stack: Vec<Frame>, error: ParseError) -> Failure {
    Failure {
        error,
        partial: stack.into_iter().filter_map(|frame| frame.node).collect(),
    }
}

fn into_error(error: ParseError) -> Error {
    match error {
        ParseError::Lexer(err) => Error::Lexer(err),
        other => Error::Parse(other),
    }
}

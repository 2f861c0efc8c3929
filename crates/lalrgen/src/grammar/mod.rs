//! # Grammar
//!
//! The grammar model: interned symbols, flat productions and the start symbol.
//!
//! A [`Grammar`] can be filled directly through [`Grammar::add_production`],
//! [`Grammar::register_terminal`] and [`Grammar::set_start`], or assembled
//! from combinator expressions with [`GrammarBuilder`], which also produces
//! the matching lexer.
//!
//! ```rust
//! use lalrgen::grammar::Grammar;
//!
//! let mut grammar = Grammar::new();
//! grammar.register_terminal("NUMBER").unwrap();
//! grammar.add_production("sum", ["sum", "+", "NUMBER"]).unwrap();
//! grammar.add_production("sum", ["NUMBER"]).unwrap();
//! grammar.set_start("sum").unwrap();
//!
//! let plus = grammar.symbol("+").unwrap();
//! assert!(grammar.is_terminal(plus));
//! ```

pub mod analysis;
pub mod builder;
pub mod expr;

pub use analysis::Nff;
pub use builder::{GrammarBuilder, Language};
pub use expr::Expr;

use crate::error::GrammarError;
use compact_str::{CompactString, format_compact};
use lasso::{Key, Rodeo, Spur};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Reserved name of the end-of-input terminal
pub const EOF: &str = "EOF";

/// Interned grammar symbol
///
/// Symbols order by interning order, so sorting them reproduces the order in
/// which the grammar first saw each name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    /// Dense index, usable to address per-symbol tables.
    #[must_use]
    pub fn index(self) -> usize {
        self.0.into_usize()
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index().cmp(&other.index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `declared` is false for names that only showed up on a right-hand
    /// side; such a terminal turns into a nonterminal if it later gets a
    /// production of its own.
    Terminal { declared: bool },
    Nonterminal,
}

impl SymbolKind {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal { .. })
    }
}

/// A rewrite rule `lhs -> rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    index: usize,
    lhs: Symbol,
    name: CompactString,
    rhs: SmallVec<[Symbol; 4]>,
    rhs_names: SmallVec<[CompactString; 4]>,
    generated: bool,
}

impl Production {
    /// Position in the grammar's production list
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn lhs(&self) -> Symbol {
        self.lhs
    }

    /// Name of the left-hand nonterminal
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    #[must_use]
    pub fn rhs_names(&self) -> &[CompactString] {
        &self.rhs_names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    /// True for epsilon productions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    /// Synthesized rather than authored; such nodes are spliced out of trees.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.name)?;
        if self.rhs_names.is_empty() {
            return write!(f, " ε");
        }
        for name in &self.rhs_names {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

/// Productions, terminal/nonterminal sets and the start symbol
#[derive(Debug, Clone)]
pub struct Grammar {
    interner: Rodeo,
    kinds: Vec<SymbolKind>,
    productions: Vec<Arc<Production>>,
    by_lhs: Vec<SmallVec<[usize; 4]>>,
    start: Option<CompactString>,
    eof: Symbol,
    accept_production: Option<usize>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Rodeo::default();
        let eof = Symbol(interner.get_or_intern_static(EOF));
        Self {
            interner,
            kinds: vec![SymbolKind::Terminal { declared: true }],
            productions: Vec::new(),
            by_lhs: vec![SmallVec::new()],
            start: None,
            eof,
            accept_production: None,
        }
    }

    fn intern(&mut self, name: &str, kind: SymbolKind) -> Symbol {
        let symbol = Symbol(self.interner.get_or_intern(name));
        if symbol.index() == self.kinds.len() {
            self.kinds.push(kind);
            self.by_lhs.push(SmallVec::new());
        }
        symbol
    }

    /// Declare `name` as a terminal.
    ///
    /// # Errors
    ///
    /// Fails if `name` is `EOF` or already a nonterminal.
    pub fn register_terminal(&mut self, name: &str) -> Result<Symbol, GrammarError> {
        if name == EOF {
            return Err(GrammarError::ReservedName { name: name.into() });
        }
        if let Some(symbol) = self.symbol(name) {
            if !self.is_terminal(symbol) {
                return Err(GrammarError::NameConflict { name: name.into() });
            }
            self.kinds[symbol.index()] = SymbolKind::Terminal { declared: true };
            return Ok(symbol);
        }
        Ok(self.intern(name, SymbolKind::Terminal { declared: true }))
    }

    /// Register `name` as a nonterminal that has no productions yet.
    ///
    /// # Errors
    ///
    /// Fails if `name` is `EOF` or a declared terminal.
    pub fn declare_nonterminal(&mut self, name: &str) -> Result<Symbol, GrammarError> {
        if name == EOF {
            return Err(GrammarError::ReservedName { name: name.into() });
        }
        match self.symbol(name) {
            Some(symbol) => match self.kind(symbol) {
                SymbolKind::Terminal { declared: true } => {
                    Err(GrammarError::NameConflict { name: name.into() })
                }
                _ => {
                    self.kinds[symbol.index()] = SymbolKind::Nonterminal;
                    Ok(symbol)
                }
            },
            None => Ok(self.intern(name, SymbolKind::Nonterminal)),
        }
    }

    /// Add an authored production `name -> rhs` and return its index.
    ///
    /// Unknown right-hand names become implicit terminals.
    ///
    /// # Errors
    ///
    /// Fails if `name` is a declared terminal, or if `EOF` appears anywhere.
    pub fn add_production<I, S>(&mut self, name: &str, rhs: I) -> Result<usize, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push_production(name, rhs, false, false)
    }

    /// Same as [`add_production`](Self::add_production) but flags the
    /// production as generated.
    ///
    /// # Errors
    ///
    /// See [`add_production`](Self::add_production).
    pub fn add_generated_production<I, S>(
        &mut self,
        name: &str,
        rhs: I,
    ) -> Result<usize, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push_production(name, rhs, true, false)
    }

    fn push_production<I, S>(
        &mut self,
        name: &str,
        rhs: I,
        generated: bool,
        allow_eof: bool,
    ) -> Result<usize, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lhs = self.declare_nonterminal(name)?;
        let mut symbols = SmallVec::new();
        let mut rhs_names = SmallVec::new();
        for part in rhs {
            let part = part.as_ref();
            if part == EOF && !allow_eof {
                return Err(GrammarError::ReservedName { name: part.into() });
            }
            symbols.push(self.intern(part, SymbolKind::Terminal { declared: false }));
            rhs_names.push(CompactString::from(part));
        }

        let index = self.productions.len();
        self.productions.push(Arc::new(Production {
            index,
            lhs,
            name: name.into(),
            rhs: symbols,
            rhs_names,
            generated,
        }));
        self.by_lhs[lhs.index()].push(index);
        Ok(index)
    }

    /// Set the start symbol. Repeating the same name is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if a different start symbol is already set.
    pub fn set_start(&mut self, name: &str) -> Result<(), GrammarError> {
        match &self.start {
            Some(current) if current != name => Err(GrammarError::StartAlreadySet {
                current: current.clone(),
                requested: name.into(),
            }),
            _ => {
                self.start = Some(name.into());
                Ok(())
            }
        }
    }

    /// Add `S' -> S EOF` and repoint the start symbol at `S'`.
    ///
    /// Only the first call changes the grammar.
    ///
    /// # Errors
    ///
    /// Fails if no start symbol is set or it has no productions.
    pub fn augment(&mut self) -> Result<(), GrammarError> {
        if self.accept_production.is_some() {
            return Ok(());
        }
        let start = self.start.clone().ok_or(GrammarError::MissingStart)?;
        match self.symbol(&start) {
            Some(symbol) if !self.productions_of(symbol).is_empty() => {}
            _ => return Err(GrammarError::UndefinedStart { name: start }),
        }

        let mut augmented = format_compact!("{start}'");
        while self.is_symbol(&augmented) {
            augmented.push('\'');
        }
        let index = self.push_production(&augmented, [start.as_str(), EOF], true, true)?;
        self.start = Some(augmented);
        self.accept_production = Some(index);
        log::debug!("augmented grammar with {}", self.productions[index]);
        Ok(())
    }

    /// `base` if unused, otherwise the first free `base1`, `base2`, ...
    #[must_use]
    pub fn unique_name(&self, base: &str) -> CompactString {
        if !self.is_symbol(base) {
            return base.into();
        }
        (1..)
            .map(|n| format_compact!("{base}{n}"))
            .find(|candidate| !self.is_symbol(candidate))
            .unwrap_or_else(|| base.into())
    }

    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.interner.get(name).map(Symbol)
    }

    /// Name of an interned symbol
    #[must_use]
    pub fn name(&self, symbol: Symbol) -> &str {
        self.interner.resolve(&symbol.0)
    }

    #[must_use]
    pub fn kind(&self, symbol: Symbol) -> SymbolKind {
        self.kinds[symbol.index()]
    }

    #[must_use]
    pub fn is_symbol(&self, name: &str) -> bool {
        self.interner.contains(name)
    }

    #[must_use]
    pub fn is_terminal(&self, symbol: Symbol) -> bool {
        self.kinds
            .get(symbol.index())
            .is_some_and(|kind| kind.is_terminal())
    }

    #[must_use]
    pub fn is_nonterminal(&self, symbol: Symbol) -> bool {
        self.kinds
            .get(symbol.index())
            .is_some_and(|kind| !kind.is_terminal())
    }

    #[must_use]
    pub const fn eof(&self) -> Symbol {
        self.eof
    }

    /// Number of interned symbols; per-symbol tables use this as their width.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.kinds.len()
    }

    /// All symbols in interning order
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.kinds.len()).filter_map(|i| Spur::try_from_usize(i).map(Symbol))
    }

    pub fn terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols().filter(|s| self.is_terminal(*s))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols().filter(|s| self.is_nonterminal(*s))
    }

    #[must_use]
    pub fn productions(&self) -> &[Arc<Production>] {
        &self.productions
    }

    #[must_use]
    pub fn production(&self, index: usize) -> Option<&Arc<Production>> {
        self.productions.get(index)
    }

    /// Indices of the productions whose left-hand side is `symbol`
    #[must_use]
    pub fn productions_of(&self, symbol: Symbol) -> &[usize] {
        self.by_lhs
            .get(symbol.index())
            .map(|p| p.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn start(&self) -> Option<Symbol> {
        self.start.as_deref().and_then(|name| self.symbol(name))
    }

    #[must_use]
    pub fn start_name(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Index of `S' -> S EOF` once the grammar is augmented
    #[must_use]
    pub const fn accept_production(&self) -> Option<usize> {
        self.accept_production
    }

    #[must_use]
    pub const fn is_augmented(&self) -> bool {
        self.accept_production.is_some()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "% start: {}", self.start.as_deref().unwrap_or("?"))?;
        let terminals: Vec<&str> = self.terminals().map(|t| self.name(t)).collect();
        writeln!(f, "% terminals: {}", terminals.join(", "))?;
        for production in &self.productions {
            writeln!(f, "{production}")?;
        }
        Ok(())
    }
}

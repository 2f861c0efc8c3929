//! # Grammar Analysis
//!
//! Nullable, FIRST and FOLLOW sets computed to a fixpoint over the flat
//! productions of a [`Grammar`].
//!
//! LR(1) lookaheads come from [`Nff::first_of_sequence`], the FIRST set of a
//! symbol sequence followed by a trailing terminal. FOLLOW sets are computed
//! for inspection only.

use crate::grammar::{Grammar, Symbol};
use hashbrown::HashSet;
use smallvec::SmallVec;

/// Set of terminals
pub type SymbolSet = HashSet<Symbol, ahash::RandomState>;

/// Nullable/FIRST/FOLLOW table, indexed by [`Symbol::index`]
#[derive(Debug, Clone)]
pub struct Nff {
    nullable: Vec<bool>,
    first: Vec<SymbolSet>,
    follow: Vec<SymbolSet>,
    passes: usize,
}

impl Nff {
    #[must_use]
    pub fn compute(grammar: &Grammar) -> Self {
        let count = grammar.symbol_count();
        let mut nullable = vec![false; count];
        let mut first: Vec<SymbolSet> = (0..count).map(|_| SymbolSet::default()).collect();
        for terminal in grammar.terminals() {
            first[terminal.index()].insert(terminal);
        }

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;

            for production in grammar.productions() {
                let lhs = production.lhs().index();
                if !nullable[lhs] && production.rhs().iter().all(|s| nullable[s.index()]) {
                    nullable[lhs] = true;
                    changed = true;
                }

                for symbol in production.rhs() {
                    if symbol.index() != lhs {
                        let additions: SmallVec<[Symbol; 8]> = first[symbol.index()]
                            .iter()
                            .filter(|t| !first[lhs].contains(*t))
                            .copied()
                            .collect();
                        if !additions.is_empty() {
                            first[lhs].extend(additions);
                            changed = true;
                        }
                    }
                    if !nullable[symbol.index()] {
                        break;
                    }
                }
            }
        }

        let mut nff = Self {
            nullable,
            first,
            follow: Vec::new(),
            passes,
        };
        nff.follow = nff.compute_follow(grammar);
        log::debug!(
            "nullable/FIRST fixpoint reached after {passes} passes over {} productions",
            grammar.productions().len()
        );
        nff
    }

    fn compute_follow(&self, grammar: &Grammar) -> Vec<SymbolSet> {
        let mut follow: Vec<SymbolSet> = (0..grammar.symbol_count())
            .map(|_| SymbolSet::default())
            .collect();
        if let Some(start) = grammar.start() {
            follow[start.index()].insert(grammar.eof());
        }

        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions() {
                let rhs = production.rhs();
                for (i, symbol) in rhs.iter().enumerate() {
                    if !grammar.is_nonterminal(*symbol) {
                        continue;
                    }
                    let rest = &rhs[i + 1..];
                    let mut additions = self.first_of_sequence(rest, None);
                    if self.is_nullable_sequence(rest) {
                        additions.extend(follow[production.lhs().index()].iter().copied());
                    }
                    let target = &mut follow[symbol.index()];
                    for terminal in additions {
                        changed |= target.insert(terminal);
                    }
                }
            }
        }
        follow
    }

    #[must_use]
    pub fn nullable(&self, symbol: Symbol) -> bool {
        self.nullable.get(symbol.index()).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_nullable_sequence(&self, sequence: &[Symbol]) -> bool {
        sequence.iter().all(|s| self.nullable(*s))
    }

    /// FIRST set of one symbol; a terminal's FIRST set is itself.
    #[must_use]
    pub fn first(&self, symbol: Symbol) -> Option<&SymbolSet> {
        self.first.get(symbol.index())
    }

    /// FOLLOW set of a nonterminal
    #[must_use]
    pub fn follow(&self, symbol: Symbol) -> Option<&SymbolSet> {
        self.follow.get(symbol.index())
    }

    /// Terminals that can begin `sequence` followed by `trailing`.
    ///
    /// Scans left to right and stops at the first non-nullable symbol. The
    /// trailing terminal is included only when the whole sequence is
    /// nullable.
    #[must_use]
    pub fn first_of_sequence(&self, sequence: &[Symbol], trailing: Option<Symbol>) -> SymbolSet {
        let mut result = SymbolSet::default();
        for symbol in sequence {
            if let Some(first) = self.first(*symbol) {
                result.extend(first.iter().copied());
            }
            if !self.nullable(*symbol) {
                return result;
            }
        }
        result.extend(trailing);
        result
    }

    /// Number of passes the nullable/FIRST fixpoint needed
    #[must_use]
    pub const fn passes(&self) -> usize {
        self.passes
    }
}

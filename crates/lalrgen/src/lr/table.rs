//! ACTION/GOTO table construction.
//!
//! Cells are filled from the automaton in a fixed order and every contested
//! cell is settled by one rule:
//!
//! - shift beats reduce
//! - between two reductions the lower production index wins
//! - accept beats reduce on `EOF`
//!
//! Each contested cell is recorded as a [`Conflict`] so callers can inspect
//! or reject them.

use crate::grammar::{Grammar, Symbol};
use crate::lr::automaton::Automaton;
use compact_str::CompactString;
use std::fmt;

/// Table cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Shift the lookahead and go to state
    Shift(usize),
    /// Reduce using production
    Reduce(usize),
    /// Nonterminal transition after a reduction
    Goto(usize),
    /// Accept (successful parse)
    Accept,
    /// Error (no action)
    Error,
}

impl Action {
    #[must_use]
    pub const fn shift(state: usize) -> Self {
        Self::Shift(state)
    }

    #[must_use]
    pub const fn reduce(production: usize) -> Self {
        Self::Reduce(production)
    }

    #[must_use]
    pub const fn goto(state: usize) -> Self {
        Self::Goto(state)
    }

    #[must_use]
    pub const fn accept() -> Self {
        Self::Accept
    }

    #[must_use]
    pub const fn error() -> Self {
        Self::Error
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(state) => write!(f, "s{state}"),
            Self::Reduce(production) => write!(f, "r{production}"),
            Self::Goto(state) => write!(f, "g{state}"),
            Self::Accept => f.write_str("acc"),
            Self::Error => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    AcceptReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ShiftReduce => "shift/reduce",
            Self::ReduceReduce => "reduce/reduce",
            Self::AcceptReduce => "accept/reduce",
        })
    }
}

/// A cell that more than one action competed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub symbol: Symbol,
    /// Name of `symbol`
    pub name: CompactString,
    pub kind: ConflictKind,
    pub chosen: Action,
    pub rejected: Action,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} conflict in state {} on `{}': chose {} over {}",
            self.kind, self.state, self.name, self.chosen, self.rejected
        )
    }
}

/// Dense state × symbol grid of actions
#[derive(Debug, Clone)]
pub struct ParseTable {
    width: usize,
    cells: Vec<Option<Action>>,
    /// Column owners, for the terminal columns only
    terminals: Vec<Option<Symbol>>,
    conflicts: Vec<Conflict>,
}

impl ParseTable {
    #[must_use]
    pub fn build(grammar: &Grammar, automaton: &Automaton) -> Self {
        let width = grammar.symbol_count().max(1);
        let mut table = Self {
            width,
            cells: vec![None; width * automaton.state_count()],
            terminals: vec![None; width],
            conflicts: Vec::new(),
        };
        for terminal in grammar.terminals() {
            table.terminals[terminal.index()] = Some(terminal);
        }

        let eof = grammar.eof();
        for (id, state) in automaton.states().iter().enumerate() {
            for (symbol, target) in automaton.transitions(id) {
                let action = if grammar.is_terminal(symbol) {
                    Action::Shift(target)
                } else {
                    Action::Goto(target)
                };
                table.assign(grammar, id, symbol, action);
            }
            if state.iter().any(|item| item.is_accept(grammar)) {
                table.assign(grammar, id, eof, Action::Accept);
            }
            for (item, production) in state.reductions(grammar) {
                if grammar.accept_production() == Some(production.index()) {
                    continue;
                }
                table.assign(grammar, id, item.lookahead(), Action::Reduce(production.index()));
            }
        }

        table.conflicts.sort_by_key(|c| (c.state, c.symbol));
        log::debug!(
            "built table with {} states and {} conflicts",
            table.state_count(),
            table.conflicts.len()
        );
        table
    }

    fn assign(&mut self, grammar: &Grammar, state: usize, symbol: Symbol, action: Action) {
        if symbol.index() >= self.width {
            return;
        }
        let index = state * self.width + symbol.index();
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        let Some(current) = *cell else {
            *cell = Some(action);
            return;
        };
        if current == action {
            return;
        }

        let (chosen, rejected, kind) = match (current, action) {
            (Action::Shift(_), Action::Reduce(_)) => (current, action, ConflictKind::ShiftReduce),
            (Action::Reduce(_), Action::Shift(_)) => (action, current, ConflictKind::ShiftReduce),
            (Action::Accept, Action::Reduce(_)) => (current, action, ConflictKind::AcceptReduce),
            (Action::Reduce(_), Action::Accept) => (action, current, ConflictKind::AcceptReduce),
            (Action::Reduce(a), Action::Reduce(b)) => {
                let (low, high) = if a <= b { (current, action) } else { (action, current) };
                (low, high, ConflictKind::ReduceReduce)
            }
            // shift, goto and accept cells come from a deterministic transition map
            _ => return,
        };
        *cell = Some(chosen);

        let conflict = Conflict {
            state,
            symbol,
            name: grammar.name(symbol).into(),
            kind,
            chosen,
            rejected,
        };
        log::warn!("{conflict}");
        self.conflicts.push(conflict);
    }

    /// Action for `(state, symbol)`; [`Action::Error`] for an empty cell.
    #[must_use]
    pub fn action(&self, state: usize, symbol: Symbol) -> Action {
        self.cell(state, symbol).unwrap_or(Action::Error)
    }

    /// Target of the goto on `nonterminal` out of `state`
    #[must_use]
    pub fn goto(&self, state: usize, nonterminal: Symbol) -> Option<usize> {
        match self.cell(state, nonterminal) {
            Some(Action::Goto(target)) => Some(target),
            _ => None,
        }
    }

    fn cell(&self, state: usize, symbol: Symbol) -> Option<Action> {
        if symbol.index() >= self.width {
            return None;
        }
        self.cells
            .get(state * self.width + symbol.index())
            .copied()
            .flatten()
    }

    /// Terminals with an action in `state`, in symbol order
    #[must_use]
    pub fn expected(&self, state: usize) -> Vec<Symbol> {
        self.row(state)
            .iter()
            .zip(&self.terminals)
            .filter(|(cell, _)| cell.is_some())
            .filter_map(|(_, terminal)| *terminal)
            .collect()
    }

    fn row(&self, state: usize) -> &[Option<Action>] {
        let start = state * self.width;
        self.cells.get(start..start + self.width).unwrap_or_default()
    }

    /// Contested cells, sorted by state and symbol
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.cells.len() / self.width
    }

    /// Rows indexed by state; each row is indexed by [`Symbol::index`].
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Action>]> {
        self.cells.chunks(self.width)
    }
}

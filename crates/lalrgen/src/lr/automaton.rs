//! LR(1) automaton construction.
//!
//! The canonical LR(1) collection is built first, breadth-first from
//! `closure({S' -> . S EOF, EOF})`, with symbols visited in symbol order so
//! state numbering is reproducible. LALR(1) states are then obtained by
//! merging canonical states that share a core; a merged state takes the
//! number of the first canonical state with its core, counted in canonical
//! order.

use crate::error::GrammarError;
use crate::grammar::{Grammar, Nff, Symbol};
use crate::lr::item::{Core, Item, ItemSet};
use hashbrown::HashMap;
use std::collections::BTreeMap;

type Transitions = Vec<BTreeMap<Symbol, usize>>;

#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<ItemSet>,
    transitions: Transitions,
    by_core: HashMap<Core, usize, ahash::RandomState>,
    canonical_state_count: usize,
    merged: bool,
}

impl Automaton {
    /// Build the automaton for an augmented grammar.
    ///
    /// With `lalr` set, states sharing a core are merged; otherwise the
    /// canonical LR(1) collection is kept as is.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::NotAugmented`] if the grammar has no accept
    /// production.
    pub fn build(grammar: &Grammar, nff: &Nff, lalr: bool) -> Result<Self, GrammarError> {
        let accept = grammar
            .accept_production()
            .ok_or(GrammarError::NotAugmented)?;
        let (states, transitions) = Self::canonical(grammar, nff, accept);
        let canonical_state_count = states.len();
        log::debug!("canonical LR(1) collection has {canonical_state_count} states");

        if !lalr {
            let mut by_core = HashMap::with_hasher(ahash::RandomState::new());
            for (id, state) in states.iter().enumerate() {
                by_core.entry(state.core()).or_insert(id);
            }
            return Ok(Self {
                states,
                transitions,
                by_core,
                canonical_state_count,
                merged: false,
            });
        }

        let automaton = Self::merge(states, &transitions, canonical_state_count);
        log::debug!(
            "merged {} canonical states into {} LALR(1) states",
            canonical_state_count,
            automaton.states.len()
        );
        Ok(automaton)
    }

    fn canonical(grammar: &Grammar, nff: &Nff, accept: usize) -> (Vec<ItemSet>, Transitions) {
        let eof = grammar.eof();
        let start = ItemSet::closure(grammar, nff, [Item::new(accept, 0, eof)]);

        let mut index: HashMap<ItemSet, usize, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        index.insert(start.clone(), 0);
        let mut states = vec![start];
        let mut transitions: Transitions = vec![BTreeMap::new()];

        let mut current = 0;
        while current < states.len() {
            for symbol in states[current].next_symbols(grammar) {
                // the accept item never moves past EOF
                if symbol == eof {
                    continue;
                }
                let target = states[current].goto(grammar, nff, symbol);
                if target.is_empty() {
                    continue;
                }
                let id = match index.get(&target) {
                    Some(&id) => id,
                    None => {
                        let id = states.len();
                        index.insert(target.clone(), id);
                        states.push(target);
                        transitions.push(BTreeMap::new());
                        id
                    }
                };
                transitions[current].insert(symbol, id);
            }
            current += 1;
        }
        (states, transitions)
    }

    fn merge(canonical: Vec<ItemSet>, transitions: &Transitions, canonical_state_count: usize) -> Self {
        let mut by_core: HashMap<Core, usize, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        let mut states: Vec<ItemSet> = Vec::new();
        let mut remap = Vec::with_capacity(canonical.len());

        for state in canonical {
            let id = *by_core.entry(state.core()).or_insert_with(|| {
                states.push(ItemSet::new());
                states.len() - 1
            });
            states[id].merge(&state);
            remap.push(id);
        }

        let mut merged: Transitions = vec![BTreeMap::new(); states.len()];
        for (from, edges) in transitions.iter().enumerate() {
            for (&symbol, &to) in edges {
                merged[remap[from]].insert(symbol, remap[to]);
            }
        }

        Self {
            states,
            transitions: merged,
            by_core,
            canonical_state_count,
            merged: true,
        }
    }

    /// Retained states; state `0` is the start state.
    #[must_use]
    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    #[must_use]
    pub fn state(&self, id: usize) -> Option<&ItemSet> {
        self.states.get(id)
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Size of the canonical LR(1) collection before any merging
    #[must_use]
    pub const fn canonical_state_count(&self) -> usize {
        self.canonical_state_count
    }

    #[must_use]
    pub const fn is_lalr(&self) -> bool {
        self.merged
    }

    /// Successor of `state` on `symbol`
    #[must_use]
    pub fn transition(&self, state: usize, symbol: Symbol) -> Option<usize> {
        self.transitions.get(state)?.get(&symbol).copied()
    }

    /// All outgoing edges of `state`, in symbol order
    pub fn transitions(&self, state: usize) -> impl Iterator<Item = (Symbol, usize)> + '_ {
        self.transitions
            .get(state)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(&symbol, &to)| (symbol, to)))
    }

    /// Id of the retained state with the same core as `set`.
    ///
    /// In a canonical automaton several states can share a core; an exact
    /// match wins, else the first state with that core.
    #[must_use]
    pub fn find_state(&self, set: &ItemSet) -> Option<usize> {
        if !self.merged
            && let Some(id) = self.states.iter().position(|state| state == set)
        {
            return Some(id);
        }
        self.by_core.get(&set.core()).copied()
    }
}

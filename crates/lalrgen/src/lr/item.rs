//! LR(1) items and item sets.

use crate::grammar::{Grammar, Nff, Production, Symbol};
use std::collections::BTreeSet;
use std::fmt;

/// `(production, dot)` pairs of an item set, lookaheads dropped
pub type Core = Vec<(usize, usize)>;

/// A production with a dot marking progress and one lookahead terminal
///
/// Items order by production, then dot, then lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    production: usize,
    dot: usize,
    lookahead: Symbol,
}

impl Item {
    #[must_use]
    pub const fn new(production: usize, dot: usize, lookahead: Symbol) -> Self {
        Self {
            production,
            dot,
            lookahead,
        }
    }

    #[must_use]
    pub const fn production(&self) -> usize {
        self.production
    }

    #[must_use]
    pub const fn dot(&self) -> usize {
        self.dot
    }

    #[must_use]
    pub const fn lookahead(&self) -> Symbol {
        self.lookahead
    }

    #[must_use]
    pub const fn core(&self) -> (usize, usize) {
        (self.production, self.dot)
    }

    /// The item with its dot moved one symbol to the right
    #[must_use]
    pub const fn advance(&self) -> Self {
        Self::new(self.production, self.dot + 1, self.lookahead)
    }

    /// Symbol right after the dot; `None` for reduce items.
    #[must_use]
    pub fn next(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar
            .production(self.production)
            .and_then(|p| p.rhs().get(self.dot).copied())
    }

    /// True when the dot is past the whole right-hand side
    #[must_use]
    pub fn is_reduce(&self, grammar: &Grammar) -> bool {
        grammar
            .production(self.production)
            .is_some_and(|p| self.dot >= p.len())
    }

    /// `S' -> S . EOF`: the parser accepts when it sees `EOF` here.
    #[must_use]
    pub fn is_accept(&self, grammar: &Grammar) -> bool {
        grammar.accept_production() == Some(self.production)
            && self.next(grammar) == Some(grammar.eof())
    }

    /// Render as `A -> x . y, a`.
    #[must_use]
    pub fn display<'g>(&self, grammar: &'g Grammar) -> ItemDisplay<'g> {
        ItemDisplay {
            item: *self,
            grammar,
        }
    }
}

pub struct ItemDisplay<'g> {
    item: Item,
    grammar: &'g Grammar,
}

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(production) = self.grammar.production(self.item.production) else {
            return write!(f, "<production {}>", self.item.production);
        };
        write!(f, "{} ->", production.name())?;
        for (i, name) in production.rhs_names().iter().enumerate() {
            if i == self.item.dot {
                f.write_str(" .")?;
            }
            write!(f, " {name}")?;
        }
        if self.item.dot >= production.len() {
            f.write_str(" .")?;
        }
        write!(f, ", {}", self.grammar.name(self.item.lookahead))
    }
}

/// A state of the automaton: a deduplicated, ordered set of items
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ItemSet {
    items: BTreeSet<Item>,
}

impl ItemSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand `seed` with every item reachable by expanding the nonterminal
    /// after a dot.
    ///
    /// For `A -> α . X β, a` and each production `X -> γ`, adds `X -> . γ, b`
    /// for every `b` in FIRST(β a).
    pub fn closure<I>(grammar: &Grammar, nff: &Nff, seed: I) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        let mut items = BTreeSet::new();
        let mut work = Vec::new();
        for item in seed {
            if items.insert(item) {
                work.push(item);
            }
        }

        while let Some(item) = work.pop() {
            let Some(production) = grammar.production(item.production) else {
                continue;
            };
            let Some(&next) = production.rhs().get(item.dot) else {
                continue;
            };
            if !grammar.is_nonterminal(next) {
                continue;
            }
            let rest = &production.rhs()[item.dot + 1..];
            let mut lookaheads: Vec<Symbol> = nff
                .first_of_sequence(rest, Some(item.lookahead))
                .into_iter()
                .collect();
            lookaheads.sort_unstable();
            for &expansion in grammar.productions_of(next) {
                for &lookahead in &lookaheads {
                    let added = Item::new(expansion, 0, lookahead);
                    if items.insert(added) {
                        work.push(added);
                    }
                }
            }
        }
        Self { items }
    }

    /// Advance every item whose next symbol is `symbol`, then close.
    ///
    /// Empty when no item can move over `symbol`.
    #[must_use]
    pub fn goto(&self, grammar: &Grammar, nff: &Nff, symbol: Symbol) -> Self {
        let kernel = self
            .items
            .iter()
            .filter(|item| item.next(grammar) == Some(symbol))
            .map(Item::advance);
        Self::closure(grammar, nff, kernel)
    }

    /// Symbols that appear right after a dot, in symbol order
    #[must_use]
    pub fn next_symbols(&self, grammar: &Grammar) -> BTreeSet<Symbol> {
        self.items.iter().filter_map(|item| item.next(grammar)).collect()
    }

    #[must_use]
    pub fn core(&self) -> Core {
        let mut core: Core = self.items.iter().map(Item::core).collect();
        core.dedup();
        core
    }

    /// Union in the items of `other`, which should share this set's core.
    pub fn merge(&mut self, other: &Self) {
        self.items.extend(other.items.iter().copied());
    }

    pub fn insert(&mut self, item: Item) -> bool {
        self.items.insert(item)
    }

    #[must_use]
    pub fn contains(&self, item: &Item) -> bool {
        self.items.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reduce items paired with their productions
    pub fn reductions<'g>(
        &'g self,
        grammar: &'g Grammar,
    ) -> impl Iterator<Item = (&'g Item, &'g Production)> + 'g {
        self.items.iter().filter_map(move |item| {
            grammar
                .production(item.production)
                .filter(|p| item.dot >= p.len())
                .map(|p| (item, p.as_ref()))
        })
    }

    /// One item per line, in item order.
    #[must_use]
    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> ItemSetDisplay<'a> {
        ItemSetDisplay { set: self, grammar }
    }
}

impl FromIterator<Item> for ItemSet {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = &'a Item;
    type IntoIter = std::collections::btree_set::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

pub struct ItemSetDisplay<'a> {
    set: &'a ItemSet,
    grammar: &'a Grammar,
}

impl fmt::Display for ItemSetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.set {
            writeln!(f, "{}", item.display(self.grammar))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parentheses() -> (Grammar, Nff) {
        let mut grammar = Grammar::new();
        grammar.add_production("S", ["(", "S", ")"]).unwrap();
        grammar.add_production("S", ["(", ")"]).unwrap();
        grammar.set_start("S").unwrap();
        grammar.augment().unwrap();
        let nff = Nff::compute(&grammar);
        (grammar, nff)
    }

    fn start_state(grammar: &Grammar, nff: &Nff) -> ItemSet {
        let accept = grammar.accept_production().unwrap();
        ItemSet::closure(grammar, nff, [Item::new(accept, 0, grammar.eof())])
    }

    #[test]
    fn test_closure_expands_start() {
        let (grammar, nff) = parentheses();
        let state = start_state(&grammar, &nff);

        let lines: Vec<String> = state.iter().map(|i| i.display(&grammar).to_string()).collect();
        assert_eq!(
            lines,
            vec!["S -> . ( S ), EOF", "S -> . ( ), EOF", "S' -> . S EOF, EOF"]
        );
    }

    #[test]
    fn test_goto_propagates_lookaheads() {
        let (grammar, nff) = parentheses();
        let open = grammar.symbol("(").unwrap();
        let state = start_state(&grammar, &nff).goto(&grammar, &nff, open);

        // nested S is followed by `)`
        let s_open = Item::new(0, 0, grammar.symbol(")").unwrap());
        assert!(state.contains(&s_open));
        assert!(state.contains(&Item::new(0, 1, grammar.eof())));
        assert!(state.contains(&Item::new(1, 1, grammar.eof())));
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn test_goto_on_unused_symbol_is_empty() {
        let (grammar, nff) = parentheses();
        let close = grammar.symbol(")").unwrap();
        assert!(start_state(&grammar, &nff).goto(&grammar, &nff, close).is_empty());
    }

    #[test]
    fn test_core_ignores_lookahead() {
        let (grammar, _) = parentheses();
        let eof = grammar.eof();
        let close = grammar.symbol(")").unwrap();
        let a: ItemSet = [Item::new(0, 1, eof), Item::new(1, 1, eof)].into_iter().collect();
        let b: ItemSet = [Item::new(0, 1, close), Item::new(1, 1, close)].into_iter().collect();

        assert_ne!(a, b);
        assert_eq!(a.core(), b.core());

        let mut merged = a.clone();
        merged.merge(&b);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.core(), a.core());
    }

    #[test]
    fn test_accept_and_reduce_items() {
        let (grammar, _) = parentheses();
        let accept = grammar.accept_production().unwrap();
        let eof = grammar.eof();

        assert!(Item::new(accept, 1, eof).is_accept(&grammar));
        assert!(!Item::new(accept, 0, eof).is_accept(&grammar));
        assert!(Item::new(1, 2, eof).is_reduce(&grammar));
        assert_eq!(Item::new(1, 2, eof).display(&grammar).to_string(), "S -> ( ) ., EOF");
    }
}

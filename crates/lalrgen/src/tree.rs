//! # Parse Trees
//!
//! A [`ParseTree`] is either an internal node labeled by the production that
//! was reduced, with one child per right-hand symbol, or a leaf holding a
//! token.
//!
//! ```rust
//! use lalrgen::grammar::{Expr, GrammarBuilder};
//! use lalrgen::lr::LrConfig;
//!
//! let parser = GrammarBuilder::new()
//!     .rule("pair", Expr::seq([Expr::lit("<"), Expr::opt(Expr::lit("x")), Expr::lit(">")]))
//!     .start("pair")
//!     .build()?
//!     .parser(LrConfig::default())?;
//!
//! let tree = parser.parse_tree("<x>")?;
//! // the generated `pair_optional` node is spliced away
//! assert_eq!(tree.degree(), 3);
//! assert_eq!(tree.text(), "<x>");
//! # Ok::<(), lalrgen::error::Error>(())
//! ```

use crate::grammar::Production;
use crate::lexer::Token;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    Internal {
        production: Arc<Production>,
        children: Vec<ParseTree>,
    },
    Leaf(Token),
}

impl ParseTree {
    #[must_use]
    pub const fn internal(production: Arc<Production>, children: Vec<Self>) -> Self {
        Self::Internal {
            production,
            children,
        }
    }

    /// Production name for internal nodes, token name for leaves
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Internal { production, .. } => production.name(),
            Self::Leaf(token) => &token.name,
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    #[must_use]
    pub fn production(&self) -> Option<&Arc<Production>> {
        match self {
            Self::Internal { production, .. } => Some(production),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        match self {
            Self::Leaf(token) => Some(token),
            Self::Internal { .. } => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Internal { children, .. } => children,
            Self::Leaf(_) => &[],
        }
    }

    /// Number of children
    #[must_use]
    pub fn degree(&self) -> usize {
        self.children().len()
    }

    /// Number of nodes in the tree, this one included
    #[must_use]
    pub fn size(&self) -> usize {
        self.preorder().count()
    }

    /// Nesting of internal nodes; a leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, level)) = stack.pop() {
            match node {
                Self::Leaf(_) => deepest = deepest.max(level),
                Self::Internal { children, .. } => {
                    deepest = deepest.max(level + 1);
                    stack.extend(children.iter().map(|child| (child, level + 1)));
                }
            }
        }
        deepest
    }

    /// Nodes in pre-order, this one first
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Leaf tokens, left to right
    #[must_use]
    pub fn leaves(&self) -> Vec<&Token> {
        self.preorder().filter_map(Self::token).collect()
    }

    /// Concatenated leaf text
    #[must_use]
    pub fn text(&self) -> String {
        self.leaves().iter().map(|t| t.text.as_str()).collect()
    }

    /// First node named `name`, depth-first, this node included
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Self> {
        self.preorder().find(|node| node.name() == name)
    }

    /// Every node named `name`, in pre-order
    #[must_use]
    pub fn find_all(&self, name: &str) -> Vec<&Self> {
        self.preorder().filter(|node| node.name() == name).collect()
    }

    /// Replace every descendant built from a generated production by its
    /// children. The root is kept even when it is generated.
    #[must_use]
    pub fn simplify(mut self) -> Self {
        let Self::Internal { children, .. } = &mut self else {
            return self;
        };
        // generated nodes open no output of their own, so their children
        // land in the nearest kept ancestor
        let mut pending: Vec<(Option<Arc<Production>>, std::vec::IntoIter<Self>)> =
            vec![(None, std::mem::take(children).into_iter())];
        let mut outputs: Vec<Vec<Self>> = vec![Vec::new()];
        while let Some((_, iter)) = pending.last_mut() {
            let Some(mut child) = iter.next() else {
                if let Some((Some(production), _)) = pending.pop() {
                    let children = outputs.pop().unwrap_or_default();
                    if let Some(out) = outputs.last_mut() {
                        out.push(Self::internal(production, children));
                    }
                }
                continue;
            };
            let opened = match &mut child {
                Self::Internal {
                    production,
                    children,
                } => Some((production.clone(), std::mem::take(children))),
                Self::Leaf(_) => None,
            };
            match opened {
                Some((production, children)) => {
                    let kept = (!production.is_generated()).then_some(production);
                    if kept.is_some() {
                        outputs.push(Vec::new());
                    }
                    pending.push((kept, children.into_iter()));
                }
                None => {
                    if let Some(out) = outputs.last_mut() {
                        out.push(child);
                    }
                }
            }
        }

        if let Self::Internal { children, .. } = &mut self {
            *children = outputs.pop().unwrap_or_default();
        }
        self
    }
}

/// Pre-order iterator returned by [`ParseTree::preorder`]
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    stack: Vec<&'a ParseTree>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a ParseTree;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

// Deep trees would overflow the stack with the derived recursive drop.
impl Drop for ParseTree {
    fn drop(&mut self) {
        let Self::Internal { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let Self::Internal { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            let indent = depth * 2;
            match node {
                Self::Leaf(token) => writeln!(f, "{:indent$}{token}", "")?,
                Self::Internal {
                    production,
                    children,
                } => {
                    writeln!(f, "{:indent$}{production}", "")?;
                    stack.extend(children.iter().rev().map(|child| (child, depth + 1)));
                }
            }
        }
        Ok(())
    }
}

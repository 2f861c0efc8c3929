/// What a parse does when the table has no action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Return the first error
    #[default]
    Raise,
    /// Return the subtrees built so far together with the error
    Partial,
}

/// Configuration for LR parser
#[derive(Debug, Clone)]
pub struct LrConfig {
    /// Use LALR(1) instead of canonical LR(1) (smaller tables, same power for most grammars)
    pub use_lalr: bool,

    pub error_mode: ErrorMode,

    /// Reject grammars whose table has any conflict
    pub strict_conflicts: bool,

    /// Splice generated nodes out of finished trees
    pub simplify: bool,
}

impl Default for LrConfig {
    fn default() -> Self {
        Self {
            use_lalr: true,
            error_mode: ErrorMode::Raise,
            strict_conflicts: false,
            simplify: true,
        }
    }
}

impl LrConfig {
    #[must_use]
    pub const fn with_lalr(mut self, use_lalr: bool) -> Self {
        self.use_lalr = use_lalr;
        self
    }

    #[must_use]
    pub const fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    #[must_use]
    pub const fn with_strict_conflicts(mut self, strict: bool) -> Self {
        self.strict_conflicts = strict;
        self
    }

    #[must_use]
    pub const fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }
}

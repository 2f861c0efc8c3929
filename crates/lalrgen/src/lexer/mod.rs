//! # Lexer
//!
//! Mode-aware tokenization of source text.
//!
//! Each [`TokenRule`] names a terminal and gives one or more patterns
//! (literals or regular expressions) plus flags:
//!
//! - `skip`: drop the matched text
//! - `more`: keep the matched text and prepend it to the next emitted token
//! - `insensitive`: match without regard to case
//! - a mode the rule belongs to, and an optional [`ModeCommand`] run after it
//!   matches
//!
//! Only rules of the active mode are tried. When several match, the
//! [`ConflictMode`] decides: the longest match (ties to the earlier rule) or
//! the earliest declared rule.
//!
//! ```rust
//! use lalrgen::lexer::{LexerBuilder, Pattern, TokenRule};
//!
//! let lexer = LexerBuilder::new()
//!     .rule(TokenRule::new("COMMENT_START", Pattern::literal("/*")).skip().push_mode("COMMENT"))
//!     .rule(TokenRule::new("COMMENT_END", Pattern::literal("*/")).skip().in_mode("COMMENT").pop_mode())
//!     .rule(TokenRule::new("COMMENT_TEXT", Pattern::regex(r"(?:[^*]|\*+[^*/])+")).skip().in_mode("COMMENT"))
//!     .token("ID", Pattern::regex("[a-z]+"))
//!     .build()?;
//!
//! let tokens = lexer.tokenize("/* x+1 */y")?;
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].text, "y");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
mod compiled;
pub mod stream;
pub mod token;

pub use builder::{
    CharSet, ConflictMode, DEFAULT_MODE, LexerBuilder, ModeCommand, Pattern, TokenRule,
    ValueTransform,
};
pub use compiled::Lexer;
pub use stream::{TokenStream, TraceEntry};
pub use token::{Token, TokenValue};

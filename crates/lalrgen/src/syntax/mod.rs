//! Source positions shared by the lexer, the parser and their errors.

pub mod line_col;
mod text;

pub use line_col::{LineCol, LineIndex};
pub use text::{TextRange, TextSize};

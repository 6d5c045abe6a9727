pub mod parser;
pub mod printer;
pub mod tokenizer;

pub use parser::{BinaryOp, Expr, FormulaException, UnaryOp, parse};
pub use printer::canonical_print;
pub use tokenizer::{Token, TokenType, Tokenizer, TokenizerError};

// Re-export the shared position/value/error vocabulary for downstream crates
// that only need to depend on `cellforge-parse`.
pub use cellforge_common::{FormulaError, FormulaErrorKind, Position, Value};

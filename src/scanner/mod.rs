mod lexer;
mod token;

#[cfg(test)]
pub(crate) mod str_test_strategies;

pub use lexer::{Scanner, scan, is_formula};
pub(crate) use lexer::{Captures, full_match, is_separator};
pub use token::DiceToken;

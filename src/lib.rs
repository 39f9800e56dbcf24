//! Clickable dice formulas in free-form text.
//!
//! [`scan`] finds `NdS[+/-M]` formulas (with a latin `d` or cyrillic `к`),
//! [`build`] and [`DecorationBuilder`] turn the formulas of a visible window into
//! document ranges, and [`evaluate_and_format`] rolls a clicked formula into a
//! notification text.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]


#[cfg(test)]
mod roll_test_strategies;

mod decoration;
mod error;
mod format;
mod random;
mod roll;
mod scanner;

pub use decoration::{
    Decoration, DecorationSet, DecorationBuilder, Window, ViewChange,
    DICE_CLASS, FORMULA_ATTRIBUTE,
    build, build_windows
};
pub use error::Error;
pub use format::{Notice, INVALID_FORMULA, format, evaluate_and_format};
pub use random::RandomSource;
pub use roll::{
    Formula, FormulaBuilder, Roller, RollerBuilder, RollResult, Critical,
    DEFAULT_MAX_DICE,
    evaluate
};
pub use scanner::{DiceToken, Scanner, scan, is_formula};

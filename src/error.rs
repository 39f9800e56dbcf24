use std::num::ParseIntError;


/// Every way a dice formula can be rejected by the evaluator.
///
/// All variants are flavours of "invalid formula": text handed to the evaluator
/// that does not describe a rollable `NdS[+/-M]` formula.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Invalid dice formula: {0}")]
    InvalidFormula(String),

    #[error("Zero value not allowed: {0}")]
    ZeroValue(String),

    #[error("Number out of range in {formula} - {source}")]
    Number {
        formula: String,
        #[source]
        source: ParseIntError
    },

    #[error("Too many dice: {count} exceeds the limit of {max}")]
    TooManyDice {
        count: u32,
        max: u32
    }
}

use std::fmt::Display;
use tracing::warn;
use crate::{Critical, RandomSource, RollResult, Roller};


/// Text shown in place of a breakdown when a formula cannot be rolled.
pub const INVALID_FORMULA: &str = "Invalid dice formula";

const DICE_ICON: &str = "🎲";


/// A ready-to-display roll report for the host's notification surface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notice {
    /// Multi-line breakdown of the roll.
    pub text: String,
    /// Critical classification, for styling the notification.
    pub style: Option<Critical>
}

impl Notice {
    /// The notice shown for a formula that could not be evaluated.
    pub fn invalid() -> Self {
        Self { text: INVALID_FORMULA.into(), style: None }
    }

    /// The style class to attach to the notification, if any.
    pub fn css_class(&self) -> Option<&'static str> {
        self.style.map(Critical::css_class)
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}


/// Formats `result`, the outcome of rolling `formula`, as a three-line breakdown.
///
/// The `= total` suffix is only written when the modifier is non-zero.
///
/// # Examples
/// ```
/// use dice_notes::{format, RollResult};
///
/// let notice = format("2d6+1", &RollResult::new(vec![3, 5], 1));
/// assert_eq!(notice.text, "🎲 2d6+1\nRolls: [3] [5]\nSum: 8 + 1 = 9");
///
/// let notice = format("4d10", &RollResult::new(vec![2, 2, 2, 2], 0));
/// assert_eq!(notice.text.lines().last(), Some("Sum: 8"));
/// ```
pub fn format(formula: &str, result: &RollResult) -> Notice {
    let rolls = result.rolls()
        .iter()
        .map(|roll| format!("[{roll}]"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut text = format!("{DICE_ICON} {formula}\nRolls: {rolls}\nSum: {}", result.base_sum());

    let modifier = result.modifier();
    if modifier != 0 {
        let sign = if modifier > 0 { '+' } else { '-' };
        text.push_str(&format!(" {sign} {} = {}", modifier.unsigned_abs(), result.final_sum()));
    }

    Notice { text, style: result.critical() }
}


/// Rolls `literal` and formats the result, falling back to [`Notice::invalid()`].
///
/// This is the entry point for a click on a rendered formula.
///
/// # Examples
/// ```
/// use dice_notes::{evaluate_and_format, INVALID_FORMULA};
///
/// let notice = evaluate_and_format("1d4");
/// assert!(notice.text.starts_with("🎲 1d4\nRolls: ["));
///
/// assert_eq!(evaluate_and_format("not dice").text, INVALID_FORMULA);
/// ```
pub fn evaluate_and_format(literal: &str) -> Notice {
    Roller::default().evaluate_and_format_with(literal, &mut rand::rng())
}

impl Roller {
    /// Like [`evaluate_and_format`], using this roller's limits and `rng`.
    pub fn evaluate_and_format_with<R: RandomSource + ?Sized>(&self, literal: &str, rng: &mut R) -> Notice {
        match self.evaluate_with(literal, rng) {
            Ok(result) => format(literal, &result),
            Err(err) => {
                warn!(formula = literal, %err, "could not roll dice formula");
                Notice::invalid()
            }
        }
    }
}

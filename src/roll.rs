use std::{fmt::Display, str::FromStr};
use tracing::trace;
use crate::{Error, RandomSource};
use crate::scanner::{self, Captures};


/// Default upper bound on the number of dice a single formula may roll.
pub const DEFAULT_MAX_DICE: u32 = 1000;

/// The only formula that can roll a critical.
const CRITICAL_FORMULA: &str = "1d20";


/// Marks a natural 20 or a natural 1 on a plain `1d20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Critical {
    /// The die showed 20.
    Success,
    /// The die showed 1.
    Fail
}

impl Critical {
    /// The style class a host attaches to the notification for this critical.
    pub const fn css_class(self) -> &'static str {
        match self {
            Critical::Success => "dice-critical-success",
            Critical::Fail => "dice-critical-fail"
        }
    }

    /// Classifies the rolls of `formula`.
    ///
    /// Only the literal text `1d20` (in any ASCII case) qualifies. `1к20`, `1d20+0`
    /// and `01d20` roll the same die but are never critical.
    fn classify(formula: &str, rolls: &[u32]) -> Option<Self> {
        if !formula.eq_ignore_ascii_case(CRITICAL_FORMULA) {
            return None;
        }

        match rolls {
            [20] => Some(Critical::Success),
            [1] => Some(Critical::Fail),
            _ => None
        }
    }
}


/// A parsed `NdS[+/-M]` dice formula.
///
/// Usually obtained by parsing a literal found by [`crate::scan()`], or built with
/// [`Formula::builder()`] / the [`crate::formula!`] macro.
///
/// # Examples
/// ```
/// use dice_notes::Formula;
///
/// let formula: Formula = "3к8-2".parse().unwrap();
///
/// assert_eq!(formula.count(), 3);
/// assert_eq!(formula.sides(), 8);
/// assert_eq!(formula.modifier(), -2);
/// assert_eq!(formula.to_string(), "3к8-2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    count: u32,
    sides: u32,
    modifier: i32,
    separator: char
}

impl Formula {
    /// Creates a new [`FormulaBuilder`] for dice with `sides` sides.
    ///
    /// # Examples
    /// ```
    /// use dice_notes::Formula;
    ///
    /// let formula = Formula::builder(6)
    ///     .count(2)
    ///     .modifier(1)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(formula.to_string(), "2d6+1");
    /// ```
    pub fn builder(sides: u32) -> FormulaBuilder {
        FormulaBuilder::new(sides)
    }

    /// Number of dice rolled.
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Number of sides on each die.
    pub const fn sides(&self) -> u32 {
        self.sides
    }

    /// Flat value added to the sum of the dice.
    pub const fn modifier(&self) -> i32 {
        self.modifier
    }

    /// The character written between count and sides (`d`, `D`, `к` or `К`).
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Smallest possible final sum.
    pub const fn min(&self) -> i64 {
        self.count as i64 + self.modifier as i64
    }

    /// Largest possible final sum.
    ///
    /// # Examples
    /// ```
    /// use dice_notes::Formula;
    ///
    /// let formula: Formula = "2d6+1".parse().unwrap();
    /// assert_eq!(formula.possible_values(), (3, 13));
    /// ```
    pub const fn max(&self) -> i64 {
        self.count as i64 * self.sides as i64 + self.modifier as i64
    }

    /// Average final sum.
    pub fn avg(&self) -> f64 {
        (self.min() as f64 + self.max() as f64) / 2.0
    }

    /// Equivalent to `(self.min(), self.max())`.
    pub const fn possible_values(&self) -> (i64, i64) {
        (self.min(), self.max())
    }

    /// Draws one value per die from `rng`, in draw order.
    pub fn roll<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        (0..self.count)
            .map(|_| rng.roll_die(self.sides))
            .collect()
    }

    fn from_captures(literal: &str, captures: Captures) -> Result<Self, Error> {
        let number = |source| Error::Number { formula: literal.into(), source };

        let count: u32 = literal[captures.count].parse().map_err(number)?;
        let sides: u32 = literal[captures.sides].parse().map_err(number)?;
        let modifier: i32 = match captures.modifier {
            Some(span) => literal[span].parse().map_err(number)?,
            None => 0
        };

        if count == 0 || sides == 0 {
            return Err(Error::ZeroValue(literal.into()));
        }

        Ok(Self { count, sides, modifier, separator: captures.separator })
    }
}

impl FromStr for Formula {
    type Err = Error;

    /// Parses a complete dice formula. Surrounding text or whitespace is rejected.
    ///
    /// # Errors
    /// - [`Error::InvalidFormula`] if `s` is not exactly one `NdS[+/-M]` formula.
    /// - [`Error::ZeroValue`] if the count or the number of sides is zero.
    /// - [`Error::Number`] if a number does not fit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = scanner::full_match(s)
            .ok_or_else(|| Error::InvalidFormula(s.into()))?;

        Self::from_captures(s, captures)
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.count, self.separator, self.sides)?;

        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}")
        }
    }
}


/// A builder for [`Formula`] values.
///
/// Count defaults to 1, modifier to 0 and separator to `d`.
#[derive(Debug, Clone)]
pub struct FormulaBuilder {
    sides: u32,
    count: u32,
    modifier: i32,
    separator: char
}

impl FormulaBuilder {
    fn new(sides: u32) -> Self {
        Self {
            sides,
            count: 1,
            modifier: 0,
            separator: 'd'
        }
    }

    /// Sets the number of dice.
    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Sets the flat modifier.
    pub fn modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    /// Sets the separator used when the formula is displayed.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Finalizes the builder.
    ///
    /// # Errors
    /// - Returns [`Error::ZeroValue`] if `sides` or `count` is 0.
    /// - Returns [`Error::InvalidFormula`] if the separator is not one of `d`, `D`, `к`, `К`.
    ///
    /// # Examples
    /// ```
    /// use dice_notes::{Formula, Error};
    ///
    /// assert!(Formula::builder(20).build().is_ok());
    /// assert!(matches!(Formula::builder(0).build(), Err(Error::ZeroValue(_))));
    /// assert!(matches!(Formula::builder(6).separator('x').build(), Err(Error::InvalidFormula(_))));
    /// ```
    pub fn build(self) -> Result<Formula, Error> {
        let formula = Formula {
            count: self.count,
            sides: self.sides,
            modifier: self.modifier,
            separator: self.separator
        };

        if !scanner::is_separator(self.separator) {
            return Err(Error::InvalidFormula(formula.to_string()));
        }

        if self.sides == 0 || self.count == 0 {
            return Err(Error::ZeroValue(formula.to_string()));
        }

        Ok(formula)
    }
}


/// The outcome of rolling one formula.
///
/// `rolls` keeps the draw order so it can be shown back to the user as rolled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollResult {
    rolls: Vec<u32>,
    base_sum: i64,
    modifier: i32,
    final_sum: i64,
    critical: Option<Critical>
}

impl RollResult {
    /// Creates a result from raw die values and a modifier, with no critical.
    ///
    /// # Examples
    /// ```
    /// use dice_notes::RollResult;
    ///
    /// let result = RollResult::new(vec![3, 5], 1);
    /// assert_eq!(result.base_sum(), 8);
    /// assert_eq!(result.final_sum(), 9);
    /// ```
    pub fn new(rolls: Vec<u32>, modifier: i32) -> Self {
        let base_sum: i64 = rolls.iter().map(|&roll| roll as i64).sum();

        Self {
            rolls,
            base_sum,
            modifier,
            final_sum: base_sum + modifier as i64,
            critical: None
        }
    }

    /// Replaces the critical tag.
    pub fn with_critical(mut self, critical: Option<Critical>) -> Self {
        self.critical = critical;
        self
    }

    /// Individual die values in draw order.
    pub fn rolls(&self) -> &[u32] {
        &self.rolls
    }

    /// Sum of the dice alone.
    pub const fn base_sum(&self) -> i64 {
        self.base_sum
    }

    /// The formula's modifier.
    pub const fn modifier(&self) -> i32 {
        self.modifier
    }

    /// `base_sum + modifier`.
    pub const fn final_sum(&self) -> i64 {
        self.final_sum
    }

    /// Set only for a plain `1d20` that rolled 20 or 1.
    pub const fn critical(&self) -> Option<Critical> {
        self.critical
    }
}


/// Evaluates dice formulas.
///
/// Configured through [`Roller::builder()`]; [`Roller::default()`] allows up to
/// [`DEFAULT_MAX_DICE`] dice per formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roller {
    max_dice: u32
}

impl Default for Roller {
    fn default() -> Self {
        Self { max_dice: DEFAULT_MAX_DICE }
    }
}

impl Roller {
    /// Creates a new [`RollerBuilder`] starting from the default configuration.
    pub fn builder() -> RollerBuilder {
        RollerBuilder::new()
    }

    /// Largest dice count this roller accepts.
    pub const fn max_dice(&self) -> u32 {
        self.max_dice
    }

    /// Parses `literal` and checks it against this roller's limits.
    ///
    /// # Errors
    /// Any error of [`Formula::from_str()`], or [`Error::TooManyDice`] if the dice
    /// count exceeds [`Roller::max_dice()`].
    pub fn parse(&self, literal: &str) -> Result<Formula, Error> {
        let formula: Formula = literal.parse()?;

        if formula.count > self.max_dice {
            return Err(Error::TooManyDice { count: formula.count, max: self.max_dice });
        }

        Ok(formula)
    }

    /// Rolls `literal` with the thread-local generator.
    ///
    /// # Errors
    /// See [`Roller::parse()`].
    pub fn evaluate(&self, literal: &str) -> Result<RollResult, Error> {
        self.evaluate_with(literal, &mut rand::rng())
    }

    /// Rolls `literal`, drawing every die from `rng`.
    ///
    /// # Errors
    /// See [`Roller::parse()`].
    ///
    /// # Examples
    /// ```
    /// use dice_notes::{Roller, Critical};
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let result = Roller::default().evaluate_with("4d6-1", &mut rng).unwrap();
    ///
    /// assert_eq!(result.rolls().len(), 4);
    /// assert_eq!(result.final_sum(), result.base_sum() - 1);
    /// assert_eq!(result.critical(), None);
    /// ```
    pub fn evaluate_with<R: RandomSource + ?Sized>(&self, literal: &str, rng: &mut R) -> Result<RollResult, Error> {
        let formula = self.parse(literal)?;
        let rolls = formula.roll(rng);
        let critical = Critical::classify(literal, &rolls);

        let result = RollResult::new(rolls, formula.modifier).with_critical(critical);
        trace!(formula = literal, rolls = ?result.rolls, total = result.final_sum, "rolled dice");

        Ok(result)
    }
}


/// A builder for [`Roller`].
#[derive(Debug, Clone)]
pub struct RollerBuilder {
    max_dice: u32
}

impl RollerBuilder {
    fn new() -> Self {
        Self { max_dice: DEFAULT_MAX_DICE }
    }

    /// Sets the largest dice count a formula may have.
    pub fn max_dice(mut self, max_dice: u32) -> Self {
        self.max_dice = max_dice;
        self
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    /// Returns [`Error::ZeroValue`] if `max_dice` is 0.
    pub fn build(self) -> Result<Roller, Error> {
        if self.max_dice == 0 {
            return Err(Error::ZeroValue("max_dice".into()));
        }

        Ok(Roller { max_dice: self.max_dice })
    }
}


/// Rolls `literal` with the default [`Roller`] and the thread-local generator.
///
/// # Errors
/// Returns an error if `literal` is not exactly one valid dice formula.
///
/// # Examples
/// ```
/// use dice_notes::evaluate;
///
/// let result = evaluate("2d6+1").unwrap();
/// assert_eq!(result.rolls().len(), 2);
/// assert!((3..=13).contains(&result.final_sum()));
///
/// assert!(evaluate("roll 2d6").is_err());
/// ```
pub fn evaluate(literal: &str) -> Result<RollResult, Error> {
    Roller::default().evaluate(literal)
}


/// A macro for building [`Formula`] values.
///
/// # Syntax
/// - `formula!(SIDES)`: one die, e.g. `formula!(20)` for 1d20.
/// - `formula!(SIDES, COUNT)`: e.g. `formula!(6, 3)` for 3d6.
/// - `formula!(SIDES, COUNT, MODIFIER)`: e.g. `formula!(8, 2, -1)` for 2d8-1.
///
/// # Returns
/// `Result<Formula, Error>` - The result of calling `FormulaBuilder::build()`.
///
/// # Examples
/// ```
/// use dice_notes::formula;
///
/// assert_eq!(formula!(20).unwrap().to_string(), "1d20");
/// assert_eq!(formula!(6, 3).unwrap().to_string(), "3d6");
/// assert_eq!(formula!(8, 2, -1).unwrap().to_string(), "2d8-1");
/// assert!(formula!(0).is_err());
/// ```
#[macro_export]
macro_rules! formula {
    ($sides:literal) => {
        $crate::Formula::builder($sides)
            .build()
    };

    ($sides:literal, $count:literal) => {
        $crate::Formula::builder($sides)
            .count($count)
            .build()
    };

    ($sides:literal, $count:literal, $modifier:expr) => {
        $crate::Formula::builder($sides)
            .count($count)
            .modifier($modifier)
            .build()
    }
}


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use super::*;
    use crate::roll_test_strategies::{formula_strategy, Sequence};


    proptest! {
        #[test]
        fn test_evaluate_invariants(formula in formula_strategy(), seed: u64) {
            use rand::{SeedableRng, rngs::StdRng};

            let literal = formula.to_string();
            let mut rng = StdRng::seed_from_u64(seed);
            let result = Roller::default().evaluate_with(&literal, &mut rng).unwrap();

            prop_assert_eq!(result.rolls().len(), formula.count() as usize);
            for &roll in result.rolls() {
                prop_assert!(roll >= 1 && roll <= formula.sides());
            }

            let sum: i64 = result.rolls().iter().map(|&roll| roll as i64).sum();
            prop_assert_eq!(result.base_sum(), sum);
            prop_assert_eq!(result.final_sum(), sum + formula.modifier() as i64);
            prop_assert!(result.final_sum() >= formula.min());
            prop_assert!(result.final_sum() <= formula.max());
        }

        #[test]
        fn test_formula_display_reparses(formula in formula_strategy()) {
            let literal = formula.to_string();

            prop_assert!(crate::is_formula(&literal));
            prop_assert_eq!(literal.parse::<Formula>().unwrap(), formula);
        }

        #[test]
        fn test_formula_bounds(formula in formula_strategy()) {
            let (min, max) = formula.possible_values();

            prop_assert_eq!(min, formula.count() as i64 + formula.modifier() as i64);
            prop_assert_eq!(max, formula.count() as i64 * formula.sides() as i64 + formula.modifier() as i64);
            prop_assert_eq!(formula.avg(), (min as f64 + max as f64) / 2.0);
        }

        #[test]
        fn test_only_plain_d20_is_critical(formula in formula_strategy(), roll in 1..=20u32) {
            let literal = formula.to_string();
            if literal.eq_ignore_ascii_case("1d20") {
                return Ok(());
            }

            let rolls = vec![roll; formula.count() as usize];
            prop_assert_eq!(Critical::classify(&literal, &rolls), None);
        }

        #[test]
        fn test_builder_validation(sides in 0..50u32, count in 0..50u32) {
            let result = Formula::builder(sides).count(count).build();

            if sides == 0 || count == 0 {
                prop_assert!(matches!(result, Err(Error::ZeroValue(_))));
            } else {
                prop_assert!(result.is_ok());
            }
        }

        #[test]
        fn test_max_dice_limit(count in 1..=40u32, max in 1..=20u32) {
            let roller = Roller::builder().max_dice(max).build().unwrap();
            let result = roller.parse(&format!("{count}d6"));

            if count > max {
                prop_assert_eq!(result, Err(Error::TooManyDice { count, max }));
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }

    #[test]
    fn test_rolls_with_modifier() {
        let mut rng = Sequence::new([3, 5]);
        let result = Roller::default().evaluate_with("2d6+1", &mut rng).unwrap();

        assert_eq!(result.rolls(), &[3, 5]);
        assert_eq!(result.base_sum(), 8);
        assert_eq!(result.final_sum(), 9);
        assert_eq!(result.critical(), None);
    }

    #[test]
    fn test_negative_modifier() {
        let mut rng = Sequence::new([1, 1, 1]);
        let result = Roller::default().evaluate_with("3к4-5", &mut rng).unwrap();

        assert_eq!(result.modifier(), -5);
        assert_eq!(result.final_sum(), -2);
    }

    #[test]
    fn test_critical_success_and_fail() {
        let roller = Roller::default();

        let success = roller.evaluate_with("1d20", &mut Sequence::new([20])).unwrap();
        assert_eq!(success.critical(), Some(Critical::Success));

        let fail = roller.evaluate_with("1D20", &mut Sequence::new([1])).unwrap();
        assert_eq!(fail.critical(), Some(Critical::Fail));

        let plain = roller.evaluate_with("1d20", &mut Sequence::new([13])).unwrap();
        assert_eq!(plain.critical(), None);
    }

    #[test]
    fn test_critical_needs_exact_literal() {
        let roller = Roller::default();

        for literal in ["1D20+0", "1d20-0", "1к20", "1К20", "01d20", "1d020"] {
            for roll in [1, 20] {
                let result = roller.evaluate_with(literal, &mut Sequence::new([roll])).unwrap();
                assert_eq!(result.critical(), None, "{literal} rolled {roll}");
            }
        }
    }

    #[test]
    fn test_invalid_formulas() {
        let roller = Roller::default();

        for literal in ["", "d20", "2d", "2 d6", "2d6 ", "roll 2d6", "2d6+", "2x6"] {
            assert_eq!(roller.evaluate(literal), Err(Error::InvalidFormula(literal.into())));
        }
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(evaluate("0d6"), Err(Error::ZeroValue("0d6".into())));
        assert_eq!(evaluate("2d0+1"), Err(Error::ZeroValue("2d0+1".into())));
    }

    #[test]
    fn test_numbers_out_of_range() {
        assert!(matches!(evaluate("99999999999d6"), Err(Error::Number { .. })));
        assert!(matches!(evaluate("1d6+99999999999"), Err(Error::Number { .. })));
    }

    #[test]
    fn test_default_limit() {
        assert!(evaluate("1000d2").is_ok());
        assert_eq!(
            evaluate("1001d2"),
            Err(Error::TooManyDice { count: 1001, max: DEFAULT_MAX_DICE })
        );
    }

    #[test]
    fn test_roller_builder_rejects_zero() {
        assert!(matches!(Roller::builder().max_dice(0).build(), Err(Error::ZeroValue(_))));
    }

    #[test]
    fn test_formula_keeps_separator() {
        let formula: Formula = "2К10+3".parse().unwrap();

        assert_eq!(formula.separator(), 'К');
        assert_eq!(formula.to_string(), "2К10+3");
    }

    #[test]
    fn test_zero_modifier_not_displayed() {
        let formula: Formula = "1d20+0".parse().unwrap();
        assert_eq!(formula.to_string(), "1d20");
    }

    #[test]
    fn test_macro_separator_default() {
        let formula = crate::formula!(10, 4).unwrap();
        assert_eq!(formula.separator(), 'd');
        assert_eq!(formula.count(), 4);
    }
}

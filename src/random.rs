use rand::Rng;


/// A source of die results.
///
/// The evaluator only ever asks for one value at a time, so any generator that can
/// produce a uniform integer in `1..=sides` works. Every [`rand::Rng`] already is a
/// `RandomSource`, which means `rand::rng()` or a seeded `StdRng` can be passed
/// straight to [`crate::Roller::evaluate_with()`].
///
/// # Examples
/// ```
/// use dice_notes::RandomSource;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let value = rng.roll_die(6);
/// assert!((1..=6).contains(&value));
/// ```
pub trait RandomSource {
    /// Returns an integer uniformly distributed over `1..=sides`.
    ///
    /// Callers never pass `sides == 0`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides)
    }
}

use std::collections::VecDeque;
use proptest::prelude::*;
use crate::{Formula, RandomSource};
use crate::scanner::str_test_strategies::separator_strategy;


/// Replays a fixed list of die values, for tests that need known rolls.
#[derive(Debug, Clone)]
pub(crate) struct Sequence(VecDeque<u32>);

impl Sequence {
    pub(crate) fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self(values.into_iter().collect())
    }
}

impl RandomSource for Sequence {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let value = self.0.pop_front().expect("sequence exhausted");
        assert!((1..=sides).contains(&value), "{value} is not a d{sides} result");
        value
    }
}


pub(crate) fn formula_strategy() -> impl Strategy<Value = Formula> {
    (1..=50u32, 1..=100u32, -100..=100i32, separator_strategy())
        .prop_map(|(count, sides, modifier, separator)| {
            Formula::builder(sides)
                .count(count)
                .modifier(modifier)
                .separator(separator)
                .build()
                .unwrap()
        })
}

use proptest::prelude::*;


pub(crate) fn separator_strategy() -> impl Strategy<Value = char> {
    prop_oneof![Just('d'), Just('D'), Just('к'), Just('К')]
}

pub(crate) fn modifier_strategy() -> impl Strategy<Value = String> {
    prop::option::of((prop_oneof![Just('+'), Just('-')], 0u32..=1000))
        .prop_map(|modifier| match modifier {
            Some((sign, value)) => format!("{sign}{value}"),
            None => String::new()
        })
}

pub(crate) fn dice_literal_strategy() -> impl Strategy<Value = String> {
    (1u32..=1000, separator_strategy(), 1u32..=1000, modifier_strategy())
        .prop_map(|(count, separator, sides, modifier)| format!("{count}{separator}{sides}{modifier}"))
}

/// Text that can sit next to a formula without extending it or forming a new one.
pub(crate) fn filler_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Zа-яА-Я ,.!?\n]{1,12}"
}

pub(crate) fn prose_with_literals_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        filler_strategy(),
        prop::collection::vec((dice_literal_strategy(), filler_strategy()), 0..6)
    ).prop_map(|(head, pieces)| {
        let mut text = head;
        let mut literals = Vec::with_capacity(pieces.len());

        for (literal, filler) in pieces {
            text.push_str(&literal);
            text.push_str(&filler);
            literals.push(literal);
        }

        (text, literals)
    })
}

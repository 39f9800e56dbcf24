use std::ops::Range;


/// A dice formula found in a piece of text.
///
/// `start` and `end` form a half-open range counted in `char`s from the beginning
/// of the scanned text, so `end - start == literal.chars().count()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiceToken<'a> {
    /// The exact matched text, e.g. `"3d8+2"`.
    pub literal: &'a str,
    /// Offset of the first character of the token.
    pub start: usize,
    /// Offset one past the last character of the token.
    pub end: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    byte_start: usize
}

impl<'a> DiceToken<'a> {
    pub(crate) fn new(literal: &'a str, start: usize, chars: usize, byte_start: usize) -> Self {
        Self {
            literal,
            start,
            end: start + chars,
            byte_start
        }
    }

    /// The token's range in `char` offsets.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The token's range in byte offsets, suitable for slicing the scanned `&str`.
    ///
    /// # Examples
    /// ```
    /// use dice_notes::scan;
    ///
    /// let text = "бросок 1к6";
    /// let token = scan(text).next().unwrap();
    ///
    /// assert_eq!(token.span(), 7..10);
    /// assert_eq!(&text[token.byte_span()], "1к6");
    /// ```
    pub fn byte_span(&self) -> Range<usize> {
        self.byte_start..self.byte_start + self.literal.len()
    }

    /// Number of characters in the token.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always `false`, a dice token holds at least three characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

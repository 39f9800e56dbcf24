use std::ops::Range;
use crate::scanner::DiceToken;


/// Byte spans of the parts of one dice formula, relative to where matching began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Captures {
    pub count: Range<usize>,
    pub separator: char,
    pub sides: Range<usize>,
    /// Includes the sign.
    pub modifier: Option<Range<usize>>,
    pub len: usize,
    pub chars: usize
}


#[derive(Debug, Clone, Copy)]
struct Cursor<'a> {
    input: &'a str,
    position: usize,
    chars: usize
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0, chars: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn bump(&mut self, ch: char) {
        self.position += ch.len_utf8();
        self.chars += 1;
    }

    fn read_digits(&mut self) -> Option<Range<usize>> {
        let start = self.position;
        while let Some(ch) = self.peek().filter(char::is_ascii_digit) {
            self.bump(ch);
        }

        (self.position > start).then_some(start..self.position)
    }

    fn read_separator(&mut self) -> Option<char> {
        let ch = self.peek().filter(|ch| is_separator(*ch))?;
        self.bump(ch);
        Some(ch)
    }

    /// A sign without digits after it is left unconsumed.
    fn read_modifier(&mut self) -> Option<Range<usize>> {
        let sign = self.peek().filter(|ch| matches!(ch, '+' | '-'))?;

        let mut ahead = *self;
        ahead.bump(sign);
        ahead.read_digits()?;

        let span = self.position..ahead.position;
        *self = ahead;
        Some(span)
    }
}


/// Whether `ch` may separate the dice count from the die size.
///
/// Both the latin `d` and the cyrillic `к` are accepted so a formula can be typed
/// without switching keyboard layouts.
pub(crate) fn is_separator(ch: char) -> bool {
    matches!(ch, 'd' | 'D' | 'к' | 'К')
}

/// Matches a dice formula at the very start of `input`, taking the longest match.
pub(crate) fn match_prefix(input: &str) -> Option<Captures> {
    let mut cursor = Cursor::new(input);

    let count = cursor.read_digits()?;
    let separator = cursor.read_separator()?;
    let sides = cursor.read_digits()?;
    let modifier = cursor.read_modifier();

    Some(Captures {
        count,
        separator,
        sides,
        modifier,
        len: cursor.position,
        chars: cursor.chars
    })
}

/// Matches `input` only if the whole string is a single dice formula.
pub(crate) fn full_match(input: &str) -> Option<Captures> {
    match_prefix(input).filter(|captures| captures.len == input.len())
}

/// Returns `true` if `input` is exactly one dice formula, with nothing around it.
///
/// # Examples
/// ```
/// use dice_notes::is_formula;
///
/// assert!(is_formula("2d6+1"));
/// assert!(is_formula("3К8"));
/// assert!(!is_formula("2d6 + 1"));
/// assert!(!is_formula("d20"));
/// ```
pub fn is_formula(input: &str) -> bool {
    full_match(input).is_some()
}


/// A lazy scanner over every dice formula in a piece of text.
///
/// Matching is leftmost-first and greedy: once a formula is found scanning resumes
/// right after it, so tokens never overlap and come out in ascending order.
/// Cloning the scanner (or calling [`scan`] again) restarts from the same place.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    position: usize,
    chars: usize
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0, chars: 0 }
    }

    // Every start inside one run of digits reaches the same separator check,
    // so after a failed match the whole run can be skipped.
    fn skip(&mut self, rest: &str) {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();

        if digits > 0 {
            self.position += digits;
            self.chars += digits;
        } else if let Some(ch) = rest.chars().next() {
            self.position += ch.len_utf8();
            self.chars += 1;
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = DiceToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.input;

        while self.position < input.len() {
            let rest = &input[self.position..];

            if let Some(captures) = match_prefix(rest) {
                let token = DiceToken::new(&rest[..captures.len], self.chars, captures.chars, self.position);
                self.position += captures.len;
                self.chars += captures.chars;
                return Some(token);
            }

            self.skip(rest);
        }

        None
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}


/// Scans `input` for dice formulas.
///
/// Never fails: text without formulas simply yields nothing.
///
/// # Examples
/// ```
/// use dice_notes::scan;
///
/// let tokens: Vec<_> = scan("Roll 2d6+1 now").collect();
///
/// assert_eq!(tokens.len(), 1);
/// assert_eq!(tokens[0].literal, "2d6+1");
/// assert_eq!(tokens[0].span(), 5..10);
/// ```
pub fn scan(input: &str) -> Scanner<'_> {
    Scanner::new(input)
}

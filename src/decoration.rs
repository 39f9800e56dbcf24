use std::ops::Deref;
use tracing::debug;
use crate::scan;


/// Style class carried by every dice decoration, used by hosts to target clicks.
pub const DICE_CLASS: &str = "clickable-dice";

/// Attribute under which a decoration exposes its formula.
pub const FORMULA_ATTRIBUTE: &str = "data-dice-formula";


/// A highlighted dice formula in document coordinates.
///
/// `from..to` is half-open and counted in `char`s from the start of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decoration {
    /// Absolute offset of the first character.
    pub from: usize,
    /// Absolute offset one past the last character.
    pub to: usize,
    /// The literal formula, so a click can be served without reading the document.
    pub formula: String
}

impl Decoration {
    /// Always [`DICE_CLASS`].
    pub const fn class(&self) -> &'static str {
        DICE_CLASS
    }

    /// Attributes to render on the decorated span.
    pub fn attributes(&self) -> [(&'static str, &str); 1] {
        [(FORMULA_ATTRIBUTE, &self.formula)]
    }

    /// Whether the character at `offset` lies inside this decoration.
    pub fn contains(&self, offset: usize) -> bool {
        self.from <= offset && offset < self.to
    }
}


/// An ordered set of non-overlapping [`Decoration`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecorationSet(Vec<Decoration>);

impl DecorationSet {
    /// A set with no decorations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The decoration covering the character at `offset`, if any.
    ///
    /// # Examples
    /// ```
    /// use dice_notes::build;
    ///
    /// let set = build("hit for 2d8+3", 100);
    ///
    /// assert_eq!(set.at(110).map(|d| d.formula.as_str()), Some("2d8+3"));
    /// assert!(set.at(107).is_none());
    /// assert!(set.at(113).is_none());
    /// ```
    pub fn at(&self, offset: usize) -> Option<&Decoration> {
        let index = self.0.partition_point(|decoration| decoration.to <= offset);
        self.0.get(index).filter(|decoration| decoration.contains(offset))
    }
}

impl Deref for DecorationSet {
    type Target = [Decoration];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Decoration;
    type IntoIter = std::slice::Iter<'a, Decoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


/// A visible slice of a larger document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    /// Absolute `char` offset of `text` within the document.
    pub start: usize,
    /// The visible text.
    pub text: &'a str
}

impl<'a> Window<'a> {
    /// Creates a window over `text`, which starts at `start` in the document.
    pub fn new(start: usize, text: &'a str) -> Self {
        Self { start, text }
    }
}

impl<'a> From<(usize, &'a str)> for Window<'a> {
    fn from((start, text): (usize, &'a str)) -> Self {
        Self::new(start, text)
    }
}


/// What changed in the host view since the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewChange {
    /// The document text was edited.
    pub doc_changed: bool,
    /// The visible windows moved or resized.
    pub viewport_changed: bool
}

impl ViewChange {
    /// Whether decorations must be recomputed.
    pub const fn needs_rebuild(&self) -> bool {
        self.doc_changed || self.viewport_changed
    }
}


/// Builds decorations for a single window whose text starts at `window_start`.
///
/// A formula cut by the edge of the window is not recovered from neighbouring text.
///
/// # Examples
/// ```
/// use dice_notes::build;
///
/// let set = build("Roll 2d6+1 now", 40);
///
/// assert_eq!(set.len(), 1);
/// assert_eq!((set[0].from, set[0].to), (45, 50));
/// assert_eq!(set[0].attributes(), [("data-dice-formula", "2d6+1")]);
/// ```
pub fn build(text: &str, window_start: usize) -> DecorationSet {
    build_windows([Window::new(window_start, text)])
}

/// Builds one set from several visible windows, given in document order.
///
/// A decoration starting before the end of the previous one is skipped, so the
/// set stays ordered and non-overlapping even for overlapping windows.
pub fn build_windows<'a, I, W>(windows: I) -> DecorationSet
where
    I: IntoIterator<Item = W>,
    W: Into<Window<'a>>
{
    let mut decorations: Vec<Decoration> = Vec::new();

    for window in windows {
        let window = window.into();

        for token in scan(window.text) {
            let from = window.start + token.start;
            let to = window.start + token.end;

            if decorations.last().is_some_and(|last| from < last.to) {
                debug!(from, to, formula = token.literal, "skipping overlapping dice decoration");
                continue;
            }

            decorations.push(Decoration { from, to, formula: token.literal.into() });
        }
    }

    DecorationSet(decorations)
}


/// Keeps the decorations of a live view up to date.
///
/// The builder always publishes a completely built set: a rebuild computes the new
/// set first and swaps it in afterwards, so [`DecorationBuilder::decorations()`]
/// never shows a partial result.
///
/// # Examples
/// ```
/// use dice_notes::{DecorationBuilder, ViewChange, Window};
///
/// let doc = "first 1d4, later 3d6";
/// let mut builder = DecorationBuilder::new([Window::new(0, &doc[..10])]);
/// assert_eq!(builder.decorations().len(), 1);
///
/// let scrolled = ViewChange { viewport_changed: true, ..Default::default() };
/// assert!(builder.update(scrolled, [Window::new(11, &doc[11..])]));
/// assert_eq!(builder.decorations()[0].formula, "3d6");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DecorationBuilder {
    decorations: DecorationSet
}

impl DecorationBuilder {
    /// Creates a builder with decorations for the initial `windows`.
    pub fn new<'a, I, W>(windows: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Window<'a>>
    {
        let mut builder = Self::default();
        builder.rebuild(windows);
        builder
    }

    /// The last completed set.
    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    /// Recomputes decorations for `windows` and publishes them.
    pub fn rebuild<'a, I, W>(&mut self, windows: I)
    where
        I: IntoIterator<Item = W>,
        W: Into<Window<'a>>
    {
        let decorations = build_windows(windows);
        debug!(previous = self.decorations.len(), current = decorations.len(), "rebuilt dice decorations");
        self.decorations = decorations;
    }

    /// Rebuilds only if `change` affects the view; returns whether it did.
    pub fn update<'a, I, W>(&mut self, change: ViewChange, windows: I) -> bool
    where
        I: IntoIterator<Item = W>,
        W: Into<Window<'a>>
    {
        if !change.needs_rebuild() {
            return false;
        }

        self.rebuild(windows);
        true
    }
}

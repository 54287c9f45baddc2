//! Building blocks shared by every tree kind: identity, formatting prefixes and padding.
//!
//! A tree never stores positions. Instead every node keeps the literal text that
//! precedes it (its [`Space`] prefix) and every delimiter keeps the literal text
//! around it ([`RightPadded`], [`LeftPadded`], [`Container`]). Printing a tree
//! concatenates those pieces, so an untouched subtree prints back byte-for-byte.

use std::fmt;

use archery::ArcK;
use rpds::Vector;
use uuid::Uuid;

use super::markers::Markers;

/// Opaque, stable identity of a tree node.
///
/// Identity survives structural edits (`with_*` copies keep it) and never takes
/// part in node equality, which is purely structural. Compare identities with
/// [`TreeId::as_uuid`] or [`TreeId::is_same`].
#[derive(Clone, Copy)]
pub struct TreeId(Uuid);

impl TreeId {
    /// Allocates a fresh random identity.
    pub fn random() -> Self {
        TreeId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    pub fn is_same(&self, other: &TreeId) -> bool {
        self.0 == other.0
    }
}

impl Default for TreeId {
    fn default() -> Self {
        TreeId::random()
    }
}

// Structural equality: two nodes with different identities but the same content are equal.
impl PartialEq for TreeId {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Debug for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeId({})", self.0)
    }
}

/// Literal whitespace and comments preceding a syntax element, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Space {
    whitespace: String,
}

impl Space {
    pub const EMPTY: Space = Space { whitespace: String::new() };

    pub fn format(text: impl Into<String>) -> Self {
        Space { whitespace: text.into() }
    }

    /// A single space, the most common separator.
    pub fn single() -> Self {
        Space::format(" ")
    }

    pub fn as_str(&self) -> &str {
        &self.whitespace
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty()
    }

    /// Whether the prefix carries a comment rather than only whitespace.
    pub fn has_comment(&self) -> bool {
        self.whitespace.contains("//") || self.whitespace.contains("/*") || self.whitespace.contains("<!--")
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.whitespace)
    }
}

/// An element followed by the formatting that precedes the next delimiter.
///
/// For `foo(a , b)` the first argument is `RightPadded { element: a, after: " " }`.
#[derive(Debug, Clone, PartialEq)]
pub struct RightPadded<T> {
    pub element: T,
    pub after: Space,
    pub markers: Markers,
}

impl<T> RightPadded<T> {
    pub fn new(element: T, after: Space) -> Self {
        RightPadded { element, after, markers: Markers::empty() }
    }

    pub fn build(element: T) -> Self {
        RightPadded::new(element, Space::EMPTY)
    }

    pub fn with_element(self, element: T) -> Self {
        RightPadded { element, ..self }
    }

    pub fn with_after(self, after: Space) -> Self {
        RightPadded { after, ..self }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RightPadded<U> {
        RightPadded { element: f(self.element), after: self.after, markers: self.markers }
    }
}

/// An element preceded by the formatting after the previous delimiter.
///
/// For `a.b`, the `b` name of a field access is `LeftPadded { before: "", element: b }`
/// where `before` is the space ahead of the dot.
#[derive(Debug, Clone, PartialEq)]
pub struct LeftPadded<T> {
    pub before: Space,
    pub element: T,
    pub markers: Markers,
}

impl<T> LeftPadded<T> {
    pub fn new(before: Space, element: T) -> Self {
        LeftPadded { before, element, markers: Markers::empty() }
    }

    pub fn build(element: T) -> Self {
        LeftPadded::new(Space::EMPTY, element)
    }

    pub fn with_element(self, element: T) -> Self {
        LeftPadded { element, ..self }
    }

    pub fn with_before(self, before: Space) -> Self {
        LeftPadded { before, ..self }
    }
}

pub type PaddedVector<T> = Vector<RightPadded<T>, ArcK>;

/// A delimited, separated list such as an argument list `( a, b )`.
///
/// `before` is the space ahead of the opening delimiter; each element carries the
/// space that precedes its following separator or the closing delimiter.
#[derive(Debug, Clone, PartialEq)]
pub struct Container<T> {
    pub before: Space,
    pub elements: PaddedVector<T>,
    pub markers: Markers,
}

impl<T: Clone> Container<T> {
    pub fn new(before: Space, elements: PaddedVector<T>) -> Self {
        Container { before, elements, markers: Markers::empty() }
    }

    pub fn empty() -> Self {
        Container::new(Space::EMPTY, Vector::new_with_ptr_kind())
    }

    pub fn from_padded(before: Space, elements: impl IntoIterator<Item = RightPadded<T>>) -> Self {
        Container::new(before, elements.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The bare elements without their padding.
    pub fn elements(&self) -> Vec<T> {
        self.elements.iter().map(|rp| rp.element.clone()).collect()
    }

    pub fn padding(&self) -> impl Iterator<Item = &RightPadded<T>> {
        self.elements.iter()
    }

    pub fn with_before(&self, before: Space) -> Self {
        Container { before, ..self.clone() }
    }

    pub fn with_padded(&self, elements: PaddedVector<T>) -> Self {
        Container { elements, ..self.clone() }
    }

    /// Replaces the bare elements, reusing the existing padding position by position.
    ///
    /// Extra new elements get empty padding; padding of dropped positions is discarded.
    pub fn with_elements(&self, elements: Vec<T>) -> Self {
        let padded: PaddedVector<T> = elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| match self.elements.get(i) {
                Some(existing) => existing.clone().with_element(element),
                None => RightPadded::build(element),
            })
            .collect();
        self.with_padded(padded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_ids_are_distinct_but_structurally_equal() {
        let a = TreeId::random();
        let b = TreeId::random();
        assert!(!a.is_same(&b));
        assert_eq!(a, b);
        assert!(a.is_same(&a.clone()));
    }

    #[test]
    fn test_space_detects_comments() {
        assert!(Space::format("/*a*/ ").has_comment());
        assert!(Space::format("\n  // note\n").has_comment());
        assert!(!Space::format("\n    ").has_comment());
    }

    #[test]
    fn test_container_with_elements_keeps_padding() {
        let container = Container::from_padded(
            Space::EMPTY,
            vec![RightPadded::new(1, Space::single()), RightPadded::new(2, Space::EMPTY)],
        );
        let replaced = container.with_elements(vec![10, 20, 30]);
        let after: Vec<String> = replaced.padding().map(|rp| rp.after.to_string()).collect();
        assert_eq!(after, vec![" ", "", ""]);
        assert_eq!(replaced.elements(), vec![10, 20, 30]);
    }
}

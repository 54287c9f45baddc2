//! Typed metadata attached to tree nodes, orthogonal to their structural fields.
//!
//! Any `'static` value that is `Debug + PartialEq + Send + Sync` can be a marker.
//! A [`Markers`] bag keeps them in insertion order and is persistent: every
//! "update" returns a new bag and leaves the original untouched, so a node that
//! is shared by several concurrent traversals never observes a change.
//!
//! ```rust
//! use rewrite_engine::ir::markers::Markers;
//!
//! #[derive(Debug, PartialEq)]
//! struct Generated(bool);
//!
//! let markers = Markers::empty().add(Generated(true));
//! assert_eq!(markers.find_first::<Generated>(), Some(&Generated(true)));
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use archery::ArcK;
use rpds::Vector;

/// A piece of typed metadata.
///
/// Implemented for every eligible type through the blanket impl below, so
/// callers never implement it by hand.
pub trait Marker: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn dyn_eq(&self, other: &dyn Marker) -> bool;

    fn marker_name(&self) -> &'static str;
}

impl<T> Marker for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Marker) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| o == self)
    }

    fn marker_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Ordered, heterogeneous collection of markers keyed by their runtime type.
#[derive(Clone, Default)]
pub struct Markers {
    entries: Vector<Arc<dyn Marker>, ArcK>,
}

impl Markers {
    pub fn empty() -> Self {
        Markers { entries: Vector::new_with_ptr_kind() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Marker>> {
        self.entries.iter()
    }

    /// First marker of type `T`, by insertion order.
    pub fn find_first<T: Marker>(&self) -> Option<&T> {
        self.entries.iter().find_map(|m| m.as_any().downcast_ref::<T>())
    }

    pub fn find_all<T: Marker>(&self) -> Vec<&T> {
        self.entries.iter().filter_map(|m| m.as_any().downcast_ref::<T>()).collect()
    }

    pub fn contains<T: Marker>(&self) -> bool {
        self.find_first::<T>().is_some()
    }

    /// Appends a marker, keeping any existing markers of the same type.
    pub fn add<T: Marker>(&self, marker: T) -> Self {
        self.add_arc(Arc::new(marker))
    }

    pub fn add_arc(&self, marker: Arc<dyn Marker>) -> Self {
        Markers { entries: self.entries.push_back(marker) }
    }

    /// Inserts `marker`, or replaces the first marker of the same type with
    /// `remap(existing, marker)`. Other markers keep their position.
    pub fn compute<T, F>(&self, marker: T, remap: F) -> Self
    where
        T: Marker,
        F: FnOnce(&T, T) -> T,
    {
        let found = self
            .entries
            .iter()
            .enumerate()
            .find_map(|(i, m)| m.as_any().downcast_ref::<T>().map(|existing| (i, existing)));
        match found {
            Some((index, existing)) => {
                let replaced: Arc<dyn Marker> = Arc::new(remap(existing, marker));
                match self.entries.set(index, replaced) {
                    Some(entries) => Markers { entries },
                    None => self.clone(),
                }
            }
            None => self.add(marker),
        }
    }

    /// Inserts or replaces the first marker of type `T`.
    pub fn set_by_type<T: Marker>(&self, marker: T) -> Self {
        self.compute(marker, |_, new| new)
    }

    pub fn remove_all<T: Marker>(&self) -> Self {
        if !self.contains::<T>() {
            return self.clone();
        }
        Markers {
            entries: self.entries.iter().filter(|m| !m.as_any().is::<T>()).cloned().collect(),
        }
    }
}

impl PartialEq for Markers {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().zip(other.entries.iter()).all(|(a, b)| a.dyn_eq(b.as_ref()))
    }
}

impl fmt::Debug for Markers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

/// Marks a node found by a search visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub description: Option<String>,
}

impl SearchResult {
    pub fn found(description: Option<String>) -> Self {
        SearchResult { description }
    }
}

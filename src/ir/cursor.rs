//! Ancestor stack threaded through a traversal.
//!
//! A visitor pushes every node it enters and pops it on the way out, so at any
//! point the cursor holds the path from the source file down to the node being
//! visited. Each frame also owns a small scratch map where visitors leave
//! messages for ancestors or descendants; those messages live exactly as long as
//! the frame.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::java_node::{J, JKind, JNode};
use super::xml_node::{Tag, Xml};

struct Frame<T> {
    value: T,
    messages: FxHashMap<String, Box<dyn Any + Send>>,
}

pub struct Cursor<T> {
    frames: Vec<Frame<T>>,
}

impl<T> Default for Cursor<T> {
    fn default() -> Self {
        Cursor { frames: Vec::new() }
    }
}

impl<T> Cursor<T> {
    pub fn new() -> Self {
        Cursor::default()
    }

    pub fn push(&mut self, value: T) {
        self.frames.push(Frame { value, messages: FxHashMap::default() });
    }

    /// Drops the innermost frame together with its messages.
    pub fn pop(&mut self) -> Option<T> {
        self.frames.pop().map(|frame| frame.value)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_root(&self) -> bool {
        self.frames.len() <= 1
    }

    /// The node currently being visited.
    pub fn value(&self) -> Option<&T> {
        self.frames.last().map(|frame| &frame.value)
    }

    pub fn parent(&self) -> Option<&T> {
        self.frames.iter().rev().nth(1).map(|frame| &frame.value)
    }

    /// The source file the traversal started from.
    pub fn root(&self) -> Option<&T> {
        self.frames.first().map(|frame| &frame.value)
    }

    /// Values from the current node up to the root.
    pub fn path(&self) -> impl Iterator<Item = &T> {
        self.frames.iter().rev().map(|frame| &frame.value)
    }

    /// Nearest value, starting at the current node, that satisfies `predicate`.
    pub fn first_enclosing_where(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.path().find(|value| predicate(value))
    }

    pub fn put_message<V: Any + Send>(&mut self, key: impl Into<String>, value: V) {
        if let Some(frame) = self.frames.last_mut() {
            frame.messages.insert(key.into(), Box::new(value));
        }
    }

    /// Message stored on the current frame only.
    pub fn get_message<V: Any + Send>(&self, key: &str) -> Option<&V> {
        self.frames.last()?.messages.get(key)?.downcast_ref::<V>()
    }

    /// Message stored on the current frame or the closest ancestor that has one.
    pub fn get_nearest_message<V: Any + Send>(&self, key: &str) -> Option<&V> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.messages.get(key).and_then(|m| m.downcast_ref::<V>()))
    }

    /// Stores a message on the nearest frame whose value satisfies `predicate`.
    ///
    /// Returns false when no such frame exists; nothing is stored then.
    pub fn put_message_on_first_enclosing<V: Any + Send>(
        &mut self,
        predicate: impl Fn(&T) -> bool,
        key: impl Into<String>,
        value: V,
    ) -> bool {
        match self.frames.iter_mut().rev().find(|frame| predicate(&frame.value)) {
            Some(frame) => {
                frame.messages.insert(key.into(), Box::new(value));
                true
            }
            None => {
                trace!("No enclosing frame accepted the message");
                false
            }
        }
    }

    /// Removes and returns a message from the current frame.
    pub fn poll_message<V: Any + Send>(&mut self, key: &str) -> Option<V> {
        let frame = self.frames.last_mut()?;
        let boxed = frame.messages.remove(key)?;
        match boxed.downcast::<V>() {
            Ok(value) => Some(*value),
            Err(other) => {
                // Wrong type requested; leave the message where it was
                frame.messages.insert(key.to_string(), other);
                None
            }
        }
    }
}

impl Cursor<J> {
    /// Nearest enclosing node of kind `T`, the current node included.
    pub fn first_enclosing<T: JNode>(&self) -> Option<Arc<T>> {
        self.path().find_map(|value| value.cast::<T>())
    }

    pub fn first_enclosing_kind(&self, kind: JKind) -> Option<&J> {
        self.first_enclosing_where(|value| value.kind() == kind)
    }
}

impl Cursor<Xml> {
    /// Names of the enclosing tags from the root element down to the current tag.
    pub fn tag_path(&self) -> Vec<String> {
        let mut names: Vec<String> = self.path().filter_map(|x| x.as_tag().map(|t| t.name.clone())).collect();
        names.reverse();
        names
    }

    pub fn first_enclosing_tag(&self, name: &str) -> Option<Arc<Tag>> {
        self.path().filter_map(Xml::as_tag).find(|t| t.name == name).cloned()
    }
}

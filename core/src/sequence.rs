//! Ordered sequence of owned values.
//!
//! `Sequence<T>` is the container the stack-machine backend emits into. It
//! owns every element; dropping the sequence (or calling
//! [`Sequence::destroy`]) releases each element exactly once.
//!
//! Positions are plain indices. `insert_after` and `delete_after` address the
//! element *following* a position, the way a singly linked chain would.

use core::ops::Index;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SequenceError {
    #[error("position {index} is out of bounds for a sequence of length {len}")]
    #[diagnostic(code(stutter::sequence::out_of_bounds))]
    OutOfBounds { index: usize, len: usize },

    #[error("out of memory while growing sequence past {len} elements")]
    #[diagnostic(code(stutter::sequence::out_of_memory))]
    OutOfMemory { len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence<T> {
    items: Vec<T>,
}

impl<T> Sequence<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// A sequence holding exactly `value`.
    pub fn of(value: T) -> Self {
        Self { items: vec![value] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `value` at the tail and return its position.
    pub fn append(&mut self, value: T) -> usize {
        self.items.push(value);
        self.items.len() - 1
    }

    /// Like [`append`](Self::append), but reports allocation failure instead of aborting.
    pub fn try_append(&mut self, value: T) -> Result<usize, SequenceError> {
        self.items
            .try_reserve(1)
            .map_err(|_| SequenceError::OutOfMemory {
                len: self.items.len(),
            })?;
        Ok(self.append(value))
    }

    /// Insert `value` right after position `index`; returns the new position.
    pub fn insert_after(&mut self, index: usize, value: T) -> Result<usize, SequenceError> {
        self.check_position(index)?;
        self.items.insert(index + 1, value);
        Ok(index + 1)
    }

    /// Remove the element following position `index` and hand it back.
    pub fn delete_after(&mut self, index: usize) -> Result<T, SequenceError> {
        let next = index + 1;
        if next >= self.items.len() {
            return Err(SequenceError::OutOfBounds {
                index: next,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(next))
    }

    /// Link `other` after the last element of `self`.
    ///
    /// The result holds `self`'s elements followed by `other`'s, both in
    /// their original order.
    pub fn concat(mut self, mut other: Sequence<T>) -> Self {
        self.items.append(&mut other.items);
        self
    }

    /// Release every element. Equivalent to dropping the sequence.
    pub fn destroy(self) {
        drop(self);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    fn check_position(&self, index: usize) -> Result<(), SequenceError> {
        if index >= self.items.len() {
            return Err(SequenceError::OutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Sequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

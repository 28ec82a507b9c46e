//! Generic insertion-ordered entity store
//!
//! `EntityList` is shared by teams and competences; nothing in here knows
//! which entity type it holds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ListError;

/// Ordered, mutable collection of entities of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityList<T> {
    items: Vec<T>,
}

impl<T> EntityList<T> {
    /// Creates an empty list
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends an item. Always succeeds.
    pub fn add(&mut self, item: T) -> bool {
        self.items.push(item);
        true
    }

    /// Returns the item at `index`
    pub fn get_at(&self, index: usize) -> Result<&T, ListError> {
        self.items.get(index).ok_or(ListError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Whether `index` addresses an existing item
    pub fn check_index(&self, index: usize) -> bool {
        index < self.items.len()
    }

    /// Removes the item at `index`, returning false if the index is invalid
    pub fn remove_at(&mut self, index: usize) -> bool {
        if !self.check_index(index) {
            return false;
        }
        self.items.remove(index);
        true
    }

    /// Removes several positions at once.
    ///
    /// Indices are applied from highest to lowest so earlier removals never
    /// shift later ones. Invalid or repeated indices are skipped.
    pub fn remove_at_many(&mut self, indices: &[usize]) -> bool {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for index in sorted.into_iter().rev() {
            self.remove_at(index);
        }
        true
    }

    /// Overwrites the item at `index`; false if the index is invalid
    pub fn replace_at(&mut self, item: T, index: usize) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Clears the list
    pub fn remove_all(&mut self) -> bool {
        self.items.clear();
        true
    }

    /// Live read-only view of every item in order
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Position of the first item matching `pred`
    pub fn position<P>(&self, pred: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().position(pred)
    }

    pub fn find<P>(&self, mut pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().find(|item| pred(item))
    }

    pub fn find_mut<P>(&mut self, mut pred: P) -> Option<&mut T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter_mut().find(|item| pred(item))
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Consumes the list, returning the underlying items
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: PartialEq> EntityList<T> {
    /// Removes the first item equal to `item`; returns whether one was found
    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|existing| existing == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<T: fmt::Display> EntityList<T> {
    /// Display string of every item, in order
    pub fn to_string_list(&self) -> Vec<String> {
        self.items.iter().map(|item| item.to_string()).collect()
    }
}

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for EntityList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<'a, T> IntoIterator for &'a EntityList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

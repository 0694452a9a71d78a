//! Persistent, thread-safe singly-linked list.
//!
//! A [List] is a chain of immutable cons cells, each holding one value and the rest of the list.
//! Cells are reference counted with [Arc], so prepending with [List::cons] is O(1) and shares the
//! existing cells, and a list can be handed to other threads whenever its values can.
//!
//! ```text
//! a:          1 -> 2 -> 3 -> nil
//! b = a.cons(0): 0 -> [1 -> 2 -> 3 -> nil]  (shares every cell of a)
//! ```
//!
//! # Example
//!
//! ```rust
//! use fanfold_cons::{list, List};
//!
//! let a = list![1, 2, 3];
//! assert_eq!(a.head(), Some(&1));
//! assert_eq!(a.len(), 3);
//!
//! // Prepending leaves the original untouched
//! let b = a.cons(0);
//! assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
//! assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//!
//! // Lists can be built from any iterator, preserving its order
//! let c: List<u32> = (1..=5).collect();
//! assert_eq!(c.iter().sum::<u32>(), 15);
//! ```

use std::{fmt, iter::FusedIterator, sync::Arc};

/// Creates a [List] containing the given values, in order.
///
/// ```rust
/// use fanfold_cons::list;
///
/// let l = list![1, 2, 3];
/// assert_eq!(l.head(), Some(&1));
///
/// let empty: fanfold_cons::List<u8> = list![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! list {
    () => {
        $crate::List::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::List::from([$($value),+])
    };
}

/// A single cons cell.
struct Cell<T> {
    value: T,
    next: List<T>,
}

/// A persistent singly-linked list.
///
/// The empty list is the terminal marker every non-empty list ends in.
pub struct List<T> {
    head: Option<Arc<Cell<T>>>,
    len: usize,
}

impl<T> List<T> {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Returns a new list with `value` in front of `self`.
    ///
    /// The returned list shares every cell of `self`.
    pub fn cons(&self, value: T) -> Self {
        self.clone().prepend(value)
    }

    /// Like [List::cons], but consumes `self` instead of bumping a reference count.
    fn prepend(self, value: T) -> Self {
        let len = self.len + 1;
        Self {
            head: Some(Arc::new(Cell { value, next: self })),
            len,
        }
    }

    /// Returns the first value, or `None` if the list is empty.
    pub fn head(&self) -> Option<&T> {
        self.head.as_deref().map(|cell| &cell.value)
    }

    /// Returns the list following the first value, or `None` if the list is empty.
    ///
    /// The tail of a single-element list is the empty list.
    pub fn tail(&self) -> Option<&List<T>> {
        self.head.as_deref().map(|cell| &cell.next)
    }

    /// Returns the number of values in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no values.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns an iterator over the values of the list, front to back.
    ///
    /// Each call starts a new traversal from the front.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
            remaining: self.len,
        }
    }
}

impl<T> Clone for List<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        // Unlink cells one at a time so long lists do not recurse once per cell
        let mut head = self.head.take();
        while let Some(cell) = head {
            match Arc::try_unwrap(cell) {
                Ok(mut cell) => head = cell.next.head.take(),
                // Still referenced by another list
                Err(_) => break,
            }
        }
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        // Cells are linked back-to-front
        let values: Vec<T> = iter.into_iter().collect();
        values
            .into_iter()
            .rev()
            .fold(Self::new(), |list, value| list.prepend(value))
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for List<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the values of a [List], created by [List::iter].
pub struct Iter<'a, T> {
    next: Option<&'a Cell<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.next?;
        self.next = cell.next.head.as_deref();
        self.remaining -= 1;
        Some(&cell.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
        }
    }
}

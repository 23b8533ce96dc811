//! Persistent (immutable) vector based on a 32-way trie with a tail buffer.
//!
//! This module provides [`PersistentVector`], an immutable indexed sequence
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! `PersistentVector` is a 32-way branching trie in the style of Clojure's
//! `PersistentVector`. It provides:
//!
//! - O(log32 N) random access (effectively O(1) for practical sizes)
//! - O(log32 N) update, copying only the root-to-leaf path
//! - O(log32 N) `push_back` (amortized O(1) with tail optimization)
//! - O(1) len and `is_empty`
//!
//! All operations return new vectors without modifying the original,
//! and structural sharing ensures memory efficiency.
//!
//! # Internal Structure
//!
//! The vector consists of:
//! - An optional root node (absent while the vector holds 32 elements or fewer)
//! - A tail buffer (up to 32 elements) holding the most recent appends
//! - The trie depth, counted in branch levels between the root and the leaves
//!
//! # Examples
//!
//! ```rust
//! use radix_vector::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new()
//!     .push_back(1)
//!     .push_back(2)
//!     .push_back(3);
//!
//! assert_eq!(vector.get(0), Ok(&1));
//! assert_eq!(vector.get(2), Ok(&3));
//!
//! // Structural sharing: the original vector is preserved
//! let extended = vector.push_back(4);
//! assert_eq!(vector.len(), 3);     // Original unchanged
//! assert_eq!(extended.len(), 4);   // New vector
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use super::ReferenceCounter;
use super::node::{BRANCHING_FACTOR, MASK, Node, trie_capacity};
use crate::error::VectorError;

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a 32-way trie.
///
/// # Time Complexity
///
/// | Operation    | Complexity                    |
/// |--------------|-------------------------------|
/// | `new`        | O(1)                          |
/// | `get`        | O(log32 N)                    |
/// | `update`     | O(log32 N)                    |
/// | `push_back`  | O(log32 N) amortized O(1)     |
/// | `len`        | O(1)                          |
/// | `clone`      | O(1)                          |
///
/// # Examples
///
/// ```rust
/// use radix_vector::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Ok(&50));
/// assert_eq!(vector.depth(), 1);
/// ```
pub struct PersistentVector<T> {
    /// Total number of elements
    length: usize,
    /// Branch levels between the root and the leaves (0 while there is no root)
    depth: usize,
    /// Root node of the trie, absent while `length <= 32`
    root: Option<ReferenceCounter<Node<T>>>,
    /// Tail buffer for efficient append (up to 32 elements)
    tail: ReferenceCounter<[T]>,
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// assert_eq!(vector.depth(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            length: 0,
            depth: 0,
            root: None,
            tail: ReferenceCounter::from(Vec::<T>::new()),
        }
    }

    /// Creates a vector containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::singleton(42);
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(vector.get(0), Ok(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self {
            length: 1,
            depth: 0,
            root: None,
            tail: ReferenceCounter::from(vec![element]),
        }
    }

    /// Returns the number of elements in the vector.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of branch levels between the root and the leaves.
    ///
    /// This is 0 while all elements fit in the tail (32 or fewer), and grows
    /// by one each time the trie fills up at its current height.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let small: PersistentVector<usize> = (0..32).collect();
    /// assert_eq!(small.depth(), 0);
    ///
    /// let grown = small.push_back(32);
    /// assert_eq!(grown.depth(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the first index stored in the tail buffer.
    #[inline]
    fn tail_offset(&self) -> usize {
        self.length - self.tail.len()
    }

    /// Returns a reference to the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfBounds`] if `index >= self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::VectorError;
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Ok(&1));
    /// assert_eq!(vector.get(4), Ok(&5));
    /// assert_eq!(
    ///     vector.get(10),
    ///     Err(VectorError::OutOfBounds { index: 10, length: 5 })
    /// );
    /// ```
    pub fn get(&self, index: usize) -> Result<&T, VectorError> {
        if index >= self.length {
            return Err(self.out_of_bounds(index));
        }

        let found = if index >= self.tail_offset() {
            self.tail.get(index & MASK)
        } else {
            self.root
                .as_deref()
                .and_then(|root| root.find_leaf(self.depth, index))
                .and_then(|leaf| leaf.get(index & MASK))
        };

        found.ok_or_else(|| self.out_of_bounds(index))
    }

    /// Returns a reference to the first element, or `None` if the vector is empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Returns a reference to the last element, or `None` if the vector is empty.
    ///
    /// # Complexity
    ///
    /// O(1) - the last element is always in the tail
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tail.last()
    }

    /// Returns a value that renders the vector as `[e0, e1, ..., en-1] (depth)`,
    /// formatting each element with `render`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<u8> = (9..12).collect();
    /// let rendered = vector
    ///     .display_with(|element, formatter| write!(formatter, "{element:#x}"))
    ///     .to_string();
    /// assert_eq!(rendered, "[0x9, 0xa, 0xb] (0)");
    /// ```
    #[must_use]
    pub fn display_with<F>(&self, render: F) -> DisplayWith<'_, T, F>
    where
        F: Fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    {
        DisplayWith {
            vector: self,
            render,
        }
    }

    /// Returns the element storage of every leaf followed by the tail, in index order.
    fn chunks(&self) -> Vec<&[T]> {
        let mut chunks = Vec::with_capacity(self.length / BRANCHING_FACTOR + 1);
        if let Some(root) = &self.root {
            root.collect_leaves(&mut chunks);
        }
        chunks.push(&self.tail[..]);
        chunks
    }

    fn out_of_bounds(&self, index: usize) -> VectorError {
        tracing::trace!(index, length = self.length, "index out of bounds");
        VectorError::OutOfBounds {
            index,
            length: self.length,
        }
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Appends an element to the back of the vector.
    ///
    /// Returns a new vector with the element at index `self.len()`. This
    /// operation never fails.
    ///
    /// # Complexity
    ///
    /// O(log32 N) amortized O(1) due to tail optimization
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new()
    ///     .push_back(1)
    ///     .push_back(2)
    ///     .push_back(3);
    ///
    /// assert_eq!(vector.len(), 3);
    /// assert_eq!(vector.get(2), Ok(&3));
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        if self.tail.len() < BRANCHING_FACTOR {
            // Tail has space, just add to tail
            let mut new_tail = Vec::with_capacity(self.tail.len() + 1);
            new_tail.extend_from_slice(&self.tail);
            new_tail.push(element);

            Self {
                length: self.length + 1,
                depth: self.depth,
                root: self.root.clone(),
                tail: ReferenceCounter::from(new_tail),
            }
        } else {
            self.push_tail_to_root(element)
        }
    }

    /// Appends every element of `iter` in order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let extended = vector.push_back_many(4..=6);
    ///
    /// assert_eq!(extended.len(), 6);
    /// assert_eq!(extended.get(5), Ok(&6));
    /// assert_eq!(vector.len(), 3);
    /// ```
    #[must_use]
    pub fn push_back_many<I>(&self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter()
            .fold(self.clone(), |vector, element| vector.push_back(element))
    }

    /// Folds the full tail into the trie and starts a new tail with `element`.
    fn push_tail_to_root(&self, element: T) -> Self {
        // The leaf shares the tail's storage; no elements are copied
        let tail_leaf = Node::leaf(self.tail.clone());
        let tail_offset = self.tail_offset();

        let (root, depth) = match &self.root {
            None => {
                tracing::trace!(length = self.length + 1, "creating trie root from full tail");
                (Node::new_path(1, tail_leaf), 1)
            }
            Some(root) if tail_offset == trie_capacity(self.depth) => {
                tracing::trace!(
                    length = self.length + 1,
                    depth = self.depth + 1,
                    "trie saturated, growing one level"
                );
                (Node::grow(root, self.depth, tail_leaf), self.depth + 1)
            }
            Some(root) => (root.push_tail(self.depth, tail_offset, tail_leaf), self.depth),
        };

        Self {
            length: self.length + 1,
            depth,
            root: Some(ReferenceCounter::new(root)),
            tail: ReferenceCounter::from(vec![element]),
        }
    }

    /// Updates the element at the given index.
    ///
    /// Returns a new vector with `element` at `index`. The original vector is
    /// unchanged, and every node outside the root-to-leaf path is shared.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfBounds`] if `index >= self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.update(2, 100)?;
    ///
    /// assert_eq!(updated.get(2), Ok(&100));
    /// assert_eq!(vector.get(2), Ok(&3)); // Original unchanged
    /// # Ok::<(), radix_vector::VectorError>(())
    /// ```
    pub fn update(&self, index: usize, element: T) -> Result<Self, VectorError> {
        if index >= self.length {
            return Err(self.out_of_bounds(index));
        }

        if index >= self.tail_offset() {
            let mut new_tail = self.tail.to_vec();
            new_tail[index & MASK] = element;

            return Ok(Self {
                length: self.length,
                depth: self.depth,
                root: self.root.clone(),
                tail: ReferenceCounter::from(new_tail),
            });
        }

        let new_root = self
            .root
            .as_deref()
            .and_then(|root| root.update(self.depth, index, element))
            .ok_or_else(|| self.out_of_bounds(index))?;

        Ok(Self {
            length: self.length,
            depth: self.depth,
            root: Some(ReferenceCounter::new(new_root)),
            tail: self.tail.clone(),
        })
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders a [`PersistentVector`] as `[e0, e1, ..., en-1] (depth)`.
///
/// Created by [`PersistentVector::display_with`].
pub struct DisplayWith<'a, T, F> {
    vector: &'a PersistentVector<T>,
    render: F,
}

impl<T, F> fmt::Display for DisplayWith<'_, T, F>
where
    F: Fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self.vector.chunks().into_iter().flatten() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            (self.render)(element, formatter)?;
        }
        write!(formatter, "] ({})", self.vector.depth)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentVector<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            length: self.length,
            depth: self.depth,
            root: self.root.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new().push_back_many(iter)
    }
}

impl<T> Index<usize> for PersistentVector<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Ok(element) => element,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        if ReferenceCounter::ptr_eq(&self.tail, &other.tail)
            && match (&self.root, &other.root) {
                (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
                (None, None) => true,
                _ => false,
            }
        {
            return true;
        }
        // Equal lengths imply identical chunk boundaries
        self.chunks() == other.chunks()
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self.chunks().into_iter().flatten() {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_list()
            .entries(self.chunks().into_iter().flatten())
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_with(|element, formatter| fmt::Display::fmt(element, formatter))
            .fmt(formatter)
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentVector<i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentVector<i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sequential(length: usize) -> PersistentVector<usize> {
        (0..length).collect()
    }

    fn root_children(vector: &PersistentVector<usize>) -> &[Option<ReferenceCounter<Node<usize>>>] {
        match vector.root.as_deref() {
            Some(Node::Branch(children)) => children,
            _ => panic!("expected a branch root"),
        }
    }

    // =========================================================================
    // Display Tests
    // =========================================================================

    #[rstest]
    fn test_display_empty_vector() {
        let vector: PersistentVector<i32> = PersistentVector::new();
        assert_eq!(format!("{vector}"), "[] (0)");
    }

    #[rstest]
    fn test_display_single_element_vector() {
        let vector = PersistentVector::singleton(42);
        assert_eq!(format!("{vector}"), "[42] (0)");
    }

    #[rstest]
    fn test_display_reports_depth() {
        let vector = sequential(33);
        let rendered = vector.to_string();
        assert!(rendered.starts_with("[0, 1, 2, "));
        assert!(rendered.ends_with(", 31, 32] (1)"));
    }

    #[rstest]
    fn test_display_with_custom_formatter() {
        let vector = PersistentVector::new().push_back("a").push_back("b");
        let rendered = vector
            .display_with(|element, formatter| write!(formatter, "{element:?}"))
            .to_string();
        assert_eq!(rendered, r#"["a", "b"] (0)"#);
    }

    #[rstest]
    fn test_debug_is_plain_list() {
        let vector: PersistentVector<i32> = (1..=3).collect();
        assert_eq!(format!("{vector:?}"), "[1, 2, 3]");
    }

    // =========================================================================
    // Structure Tests
    // =========================================================================

    #[rstest]
    fn test_new_has_no_root() {
        let vector: PersistentVector<i32> = PersistentVector::new();
        assert!(vector.root.is_none());
        assert_eq!(vector.depth, 0);
        assert!(vector.tail.is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(31)]
    #[case(32)]
    fn test_root_absent_up_to_branching_factor(#[case] length: usize) {
        let vector = sequential(length);
        assert!(vector.root.is_none());
        assert_eq!(vector.tail.len(), length);
    }

    #[rstest]
    fn test_promoting_tail_shares_its_storage() {
        let full = sequential(32);
        let promoted = full.push_back(32);

        assert_eq!(promoted.depth, 1);
        assert_eq!(promoted.tail.len(), 1);
        match root_children(&promoted)[0].as_deref() {
            Some(Node::Leaf(elements)) => assert!(ReferenceCounter::ptr_eq(elements, &full.tail)),
            _ => panic!("expected the old tail as leaf 0"),
        }
    }

    #[rstest]
    fn test_depth_growth_keeps_old_root_at_slot_zero() {
        let saturated = sequential(1056);
        assert_eq!(saturated.depth, 1);
        assert_eq!(saturated.tail.len(), 32);

        let grown = saturated.push_back(1056);
        assert_eq!(grown.depth, 2);

        let children = root_children(&grown);
        assert!(ReferenceCounter::ptr_eq(
            children[0].as_ref().unwrap(),
            saturated.root.as_ref().unwrap()
        ));
        assert!(children[1].is_some());
        assert!(children[2..].iter().all(Option::is_none));
    }

    #[rstest]
    fn test_push_into_unsaturated_trie_shares_existing_leaves() {
        let before = sequential(96);
        let after = before.push_back(96);

        let before_children = root_children(&before);
        let after_children = root_children(&after);
        for slot in 0..2 {
            assert!(ReferenceCounter::ptr_eq(
                before_children[slot].as_ref().unwrap(),
                after_children[slot].as_ref().unwrap()
            ));
        }
        assert!(before_children[2].is_none());
        assert!(after_children[2].is_some());
    }

    #[rstest]
    fn test_update_in_tail_shares_root() {
        let vector = sequential(40);
        let updated = vector.update(35, 0).unwrap();

        assert!(ReferenceCounter::ptr_eq(
            vector.root.as_ref().unwrap(),
            updated.root.as_ref().unwrap()
        ));
        assert!(!ReferenceCounter::ptr_eq(&vector.tail, &updated.tail));
    }

    #[rstest]
    fn test_update_in_trie_shares_tail_and_siblings() {
        let vector = sequential(100);
        let updated = vector.update(40, 0).unwrap();

        assert!(ReferenceCounter::ptr_eq(&vector.tail, &updated.tail));
        let before = root_children(&vector);
        let after = root_children(&updated);
        assert!(ReferenceCounter::ptr_eq(
            before[0].as_ref().unwrap(),
            after[0].as_ref().unwrap()
        ));
        assert!(!ReferenceCounter::ptr_eq(
            before[1].as_ref().unwrap(),
            after[1].as_ref().unwrap()
        ));
    }

    #[rstest]
    fn test_clone_shares_everything() {
        let vector = sequential(100);
        let cloned = vector.clone();
        assert!(ReferenceCounter::ptr_eq(&vector.tail, &cloned.tail));
        assert_eq!(vector, cloned);
    }

    // =========================================================================
    // Access Tests
    // =========================================================================

    #[rstest]
    fn test_push_back_and_get() {
        let vector = PersistentVector::new()
            .push_back(1)
            .push_back(2)
            .push_back(3);
        assert_eq!(vector.len(), 3);
        assert_eq!(vector.get(0), Ok(&1));
        assert_eq!(vector.get(1), Ok(&2));
        assert_eq!(vector.get(2), Ok(&3));
    }

    #[rstest]
    fn test_large_vector() {
        let vector = sequential(40_000);
        assert_eq!(vector.len(), 40_000);
        assert_eq!(vector.depth(), 3);
        for index in 0..40_000 {
            assert_eq!(vector.get(index), Ok(&index));
        }
    }

    #[rstest]
    fn test_first_and_last() {
        let vector = sequential(70);
        assert_eq!(vector.first(), Some(&0));
        assert_eq!(vector.last(), Some(&69));

        let empty: PersistentVector<usize> = PersistentVector::new();
        assert_eq!(empty.first(), None);
        assert_eq!(empty.last(), None);
    }

    #[rstest]
    fn test_index_operator() {
        let vector = sequential(50);
        assert_eq!(vector[49], 49);
    }

    #[rstest]
    #[should_panic(expected = "index 50 is out of bounds for vector of length 50")]
    fn test_index_operator_panics_out_of_bounds() {
        let vector = sequential(50);
        let _element = vector[50];
    }

    #[rstest]
    fn test_update() {
        let vector = sequential(10);
        let updated = vector.update(5, 100).unwrap();
        assert_eq!(updated.get(5), Ok(&100));
        assert_eq!(vector.get(5), Ok(&5));
    }

    #[rstest]
    fn test_update_out_of_bounds() {
        let vector = sequential(10);
        assert_eq!(
            vector.update(10, 0).unwrap_err(),
            VectorError::OutOfBounds {
                index: 10,
                length: 10
            }
        );
    }

    #[rstest]
    fn test_eq_across_independent_builds() {
        let built = sequential(100);
        let updated = built.update(3, 0).unwrap().update(3, 3).unwrap();
        assert_eq!(built, updated);
        assert_ne!(built, built.update(99, 0).unwrap());
        assert_ne!(built, sequential(99));
    }
}

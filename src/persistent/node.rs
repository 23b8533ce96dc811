//! Node model and index arithmetic for the 32-way trie.
//!
//! A trie is built from two kinds of nodes: [`Node::Branch`] holds up to 32
//! optional children, [`Node::Leaf`] holds up to 32 elements. An absent child
//! marks a subtree that has not been allocated yet.
//!
//! Nodes are never mutated after construction. Every write path copies the
//! nodes it touches and shares the rest.

use super::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Branching factor (2^5 = 32)
pub(crate) const BRANCHING_FACTOR: usize = 32;

/// Bits of the index consumed per trie level
pub(crate) const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting the digit within a node
pub(crate) const MASK: usize = BRANCHING_FACTOR - 1;

static_assertions::const_assert_eq!(BRANCHING_FACTOR, 1 << BITS_PER_LEVEL);

/// Child slots of a branch node.
pub(crate) type Children<T> = [Option<ReferenceCounter<Node<T>>>; BRANCHING_FACTOR];

/// Returns the 5-bit digit of `index` that selects a child at `level`.
///
/// Level 0 is the leaf level, so `index_in_level(index, 0)` is the slot
/// within a leaf.
#[inline]
pub(crate) const fn index_in_level(index: usize, level: usize) -> usize {
    (index >> (BITS_PER_LEVEL * level)) & MASK
}

/// Number of elements a trie of `depth` branch levels can hold.
///
/// Saturates at `usize::MAX` instead of overflowing.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn trie_capacity(depth: usize) -> usize {
    match BRANCHING_FACTOR.checked_pow((depth + 1) as u32) {
        Some(capacity) => capacity,
        None => usize::MAX,
    }
}

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure for the trie.
pub(crate) enum Node<T> {
    /// Branch node with lazily allocated children
    Branch(Children<T>),
    /// Leaf node containing elements; shares its storage with the tail it was promoted from
    Leaf(ReferenceCounter<[T]>),
}

impl<T> Node<T> {
    /// Wraps an existing element slice as a leaf without copying it.
    #[inline]
    pub(crate) const fn leaf(elements: ReferenceCounter<[T]>) -> Self {
        Self::Leaf(elements)
    }

    /// Builds a chain of `levels` branch nodes, each populated only at slot 0,
    /// ending in `node`.
    ///
    /// With `levels == 0` the node itself is returned.
    pub(crate) fn new_path(levels: usize, node: Self) -> Self {
        (0..levels).fold(node, |child, _| {
            let mut children = empty_children();
            children[0] = Some(ReferenceCounter::new(child));
            Self::Branch(children)
        })
    }

    /// Builds a root one level taller than `root`: the old root becomes
    /// slot 0 and a fresh path of `depth` branches ending in `tail_leaf`
    /// becomes slot 1.
    pub(crate) fn grow(root: &ReferenceCounter<Self>, depth: usize, tail_leaf: Self) -> Self {
        let mut children = empty_children();
        children[0] = Some(root.clone());
        children[1] = Some(ReferenceCounter::new(Self::new_path(depth, tail_leaf)));
        Self::Branch(children)
    }

    /// Follows `depth` branch levels from `self` towards `index`.
    ///
    /// Returns the leaf storage that holds `index`, or `None` if the path runs
    /// into an unallocated slot or the node shapes disagree with `depth`.
    pub(crate) fn find_leaf(&self, depth: usize, index: usize) -> Option<&[T]> {
        let mut node = self;
        let mut level = depth;

        while level > 0 {
            match node {
                Self::Branch(children) => {
                    node = children[index_in_level(index, level)].as_deref()?;
                    level -= 1;
                }
                Self::Leaf(_) => return None,
            }
        }

        match node {
            Self::Leaf(elements) => Some(&elements[..]),
            Self::Branch(_) => None,
        }
    }
}

impl<T: Clone> Node<T> {
    /// Returns a copy of this node with `element` stored at `index`.
    ///
    /// Only the nodes on the path to `index` are copied; every sibling is
    /// shared with `self`. Returns `None` if the path is not allocated.
    pub(crate) fn update(&self, level: usize, index: usize, element: T) -> Option<Self> {
        match self {
            Self::Branch(children) if level > 0 => {
                let subindex = index_in_level(index, level);
                let child = children[subindex].as_ref()?;
                let updated = child.update(level - 1, index, element)?;

                let mut new_children = children.clone();
                new_children[subindex] = Some(ReferenceCounter::new(updated));
                Some(Self::Branch(new_children))
            }
            Self::Leaf(elements) if level == 0 => {
                let leaf_index = index & MASK;
                if leaf_index >= elements.len() {
                    return None;
                }
                let mut new_elements = elements.to_vec();
                new_elements[leaf_index] = element;
                Some(Self::Leaf(ReferenceCounter::from(new_elements)))
            }
            _ => None,
        }
    }
}

impl<T> Node<T> {
    /// Inserts `tail_leaf` as the leaf covering `tail_offset`, copying the
    /// branch nodes on the way down and growing fresh paths through any
    /// unallocated slot.
    ///
    /// `level` is the level of `self` and must be at least 1.
    pub(crate) fn push_tail(&self, level: usize, tail_offset: usize, tail_leaf: Self) -> Self {
        let subindex = index_in_level(tail_offset, level);

        match self {
            Self::Branch(children) => {
                let mut new_children = children.clone();

                let child = if level == 1 {
                    tail_leaf
                } else {
                    match &children[subindex] {
                        Some(existing) => existing.push_tail(level - 1, tail_offset, tail_leaf),
                        None => Self::new_path(level - 1, tail_leaf),
                    }
                };

                new_children[subindex] = Some(ReferenceCounter::new(child));
                Self::Branch(new_children)
            }
            // A leaf never sits above level 0 in a well-formed trie.
            Self::Leaf(_) => tail_leaf,
        }
    }

    /// Appends the element storage of every leaf below this node, left to right.
    pub(crate) fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a [T]>) {
        match self {
            Self::Branch(children) => {
                for child in children.iter().flatten() {
                    child.collect_leaves(leaves);
                }
            }
            Self::Leaf(elements) => leaves.push(&elements[..]),
        }
    }
}

fn empty_children<T>() -> Children<T> {
    std::array::from_fn(|_| None)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn leaf_of(range: std::ops::Range<usize>) -> Node<usize> {
        Node::leaf(ReferenceCounter::from(range.collect::<Vec<_>>()))
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(31, 0, 31)]
    #[case(32, 0, 0)]
    #[case(32, 1, 1)]
    #[case(1055, 1, 0)]
    #[case(1056, 2, 1)]
    #[case(0b11111_00011_00001, 2, 31)]
    #[case(0b11111_00011_00001, 1, 3)]
    #[case(0b11111_00011_00001, 0, 1)]
    fn test_index_in_level(#[case] index: usize, #[case] level: usize, #[case] expected: usize) {
        assert_eq!(index_in_level(index, level), expected);
    }

    #[rstest]
    #[case(0, 32)]
    #[case(1, 1024)]
    #[case(2, 32_768)]
    fn test_trie_capacity(#[case] depth: usize, #[case] expected: usize) {
        assert_eq!(trie_capacity(depth), expected);
    }

    #[rstest]
    fn test_trie_capacity_saturates() {
        assert_eq!(trie_capacity(64), usize::MAX);
    }

    #[rstest]
    fn test_new_path_zero_levels_returns_node() {
        let path = Node::new_path(0, leaf_of(0..4));
        assert!(matches!(path, Node::Leaf(ref elements) if elements.len() == 4));
    }

    #[rstest]
    fn test_new_path_populates_only_slot_zero() {
        let path = Node::new_path(3, leaf_of(0..32));

        let mut node = &path;
        for _ in 0..3 {
            match node {
                Node::Branch(children) => {
                    assert_eq!(children.iter().flatten().count(), 1);
                    node = children[0].as_deref().unwrap();
                }
                Node::Leaf(_) => panic!("expected a branch"),
            }
        }
        assert!(matches!(node, Node::Leaf(_)));
    }

    #[rstest]
    fn test_grow_places_old_root_and_new_path() {
        let root = ReferenceCounter::new(Node::new_path(1, leaf_of(0..32)));
        let grown = Node::grow(&root, 1, leaf_of(1024..1056));

        match &grown {
            Node::Branch(children) => {
                assert!(ReferenceCounter::ptr_eq(children[0].as_ref().unwrap(), &root));
                assert_eq!(children.iter().flatten().count(), 2);
            }
            Node::Leaf(_) => panic!("expected a branch"),
        }
        assert_eq!(grown.find_leaf(2, 1030).map(|leaf| leaf[6]), Some(1030));
        assert_eq!(grown.find_leaf(2, 7).map(|leaf| leaf[7]), Some(7));
    }

    #[rstest]
    fn test_find_leaf_follows_digits() {
        let root = Node::new_path(1, leaf_of(0..32)).push_tail(1, 32, leaf_of(32..64));

        assert_eq!(root.find_leaf(1, 5).map(|leaf| leaf[5]), Some(5));
        assert_eq!(root.find_leaf(1, 40).map(|leaf| leaf[40 & MASK]), Some(40));
        assert!(root.find_leaf(1, 64).is_none());
    }

    #[rstest]
    fn test_push_tail_grows_missing_path() {
        let root = Node::new_path(2, leaf_of(0..32));
        let grown = root.push_tail(2, 1024, leaf_of(1024..1056));

        assert_eq!(grown.find_leaf(2, 0).map(|leaf| leaf[0]), Some(0));
        assert_eq!(grown.find_leaf(2, 1030).map(|leaf| leaf[6]), Some(1030));
    }

    #[rstest]
    fn test_update_copies_path_and_shares_siblings() {
        let root = Node::new_path(1, leaf_of(0..32)).push_tail(1, 32, leaf_of(32..64));
        let updated = root.update(1, 3, 999).unwrap();

        assert_eq!(updated.find_leaf(1, 3).map(|leaf| leaf[3]), Some(999));
        assert_eq!(root.find_leaf(1, 3).map(|leaf| leaf[3]), Some(3));

        match (&root, &updated) {
            (Node::Branch(before), Node::Branch(after)) => {
                let before_sibling = before[1].as_ref().unwrap();
                let after_sibling = after[1].as_ref().unwrap();
                assert!(ReferenceCounter::ptr_eq(before_sibling, after_sibling));
                assert!(!ReferenceCounter::ptr_eq(
                    before[0].as_ref().unwrap(),
                    after[0].as_ref().unwrap()
                ));
            }
            _ => panic!("expected branch roots"),
        }
    }

    #[rstest]
    fn test_update_unallocated_path_returns_none() {
        let root = Node::new_path(1, leaf_of(0..32));
        assert!(root.update(1, 100, 0).is_none());
    }

    #[rstest]
    fn test_collect_leaves_in_order() {
        let root = Node::new_path(1, leaf_of(0..32))
            .push_tail(1, 32, leaf_of(32..64))
            .push_tail(1, 64, leaf_of(64..96));

        let mut leaves = Vec::new();
        root.collect_leaves(&mut leaves);

        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves.concat(), (0..96).collect::<Vec<_>>());
    }
}

//! Persistent (immutable) data structures.
//!
//! This module provides [`PersistentVector`], an indexed sequence in which
//! every update and append returns a new version while all earlier versions
//! stay valid and unchanged.
//!
//! # Structural Sharing
//!
//! A new version copies only the nodes on the path it changes and points at
//! the rest of the previous version's nodes. Nodes are reference counted and
//! reclaimed once no version refers to them.
//!
//! # Examples
//!
//! ```rust
//! use radix_vector::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Ok(&50));
//!
//! // Structural sharing: the original vector is preserved
//! let updated = vector.update(50, 999)?;
//! assert_eq!(vector.get(50), Ok(&50));     // Original unchanged
//! assert_eq!(updated.get(50), Ok(&999));   // New version
//! # Ok::<(), radix_vector::VectorError>(())
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod node;
mod vector;

pub use vector::DisplayWith;
pub use vector::PersistentVector;

// =============================================================================
// Tests
// =============================================================================

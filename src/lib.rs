//! # radix-vector
//!
//! A persistent (immutable, structurally shared) vector for Rust.
//!
//! ## Overview
//!
//! [`PersistentVector`](persistent::PersistentVector) offers array-like indexed
//! access and update, but every change returns a new version and leaves all
//! earlier versions valid and unchanged. It suits programs that keep many
//! snapshots of an evolving sequence, such as undo histories or readers that
//! must never observe a half-finished edit.
//!
//! Internally the vector is a 32-way trie plus a tail buffer of up to 32
//! recently appended elements:
//!
//! - **Read**: descend one 5-bit digit of the index per trie level
//! - **Update**: copy only the root-to-leaf path, share everything else
//! - **Append**: fill the tail, then fold it into the trie as a new leaf
//!
//! ## Feature Flags
//!
//! - `persistent`: the persistent vector (enabled by default)
//! - `arc`: use `Arc` instead of `Rc` so versions can be shared across threads
//!
//! ## Example
//!
//! ```rust
//! use radix_vector::prelude::*;
//!
//! let history: Vec<PersistentVector<char>> = "undo"
//!     .chars()
//!     .scan(PersistentVector::new(), |vector, character| {
//!         *vector = vector.push_back(character);
//!         Some(vector.clone())
//!     })
//!     .collect();
//!
//! assert_eq!(history[1].len(), 2);
//! assert_eq!(history[3].get(3), Ok(&'o'));
//! assert_eq!(history[0].get(1), Err(VectorError::OutOfBounds { index: 1, length: 1 }));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use radix_vector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::VectorError;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;
}

mod error;

pub use error::VectorError;

#[cfg(feature = "persistent")]
pub mod persistent;

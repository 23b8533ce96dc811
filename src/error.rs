//! Error types for persistent vector operations.
//!
//! Indexed reads and updates are the only fallible operations; both reject
//! an index outside `[0, length)` with [`VectorError::OutOfBounds`].

use thiserror::Error;

/// Errors returned by [`PersistentVector`](crate::persistent::PersistentVector).
///
/// A failed operation never modifies the vector it was called on.
///
/// # Examples
///
/// ```rust
/// use radix_vector::VectorError;
/// use radix_vector::persistent::PersistentVector;
///
/// let vector = PersistentVector::new().push_back(1);
/// assert_eq!(
///     vector.get(1),
///     Err(VectorError::OutOfBounds { index: 1, length: 1 })
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    /// The index is not smaller than the vector length.
    #[error("index {index} is out of bounds for vector of length {length}")]
    OutOfBounds {
        /// The rejected index.
        index: usize,
        /// The length of the vector at the time of the call.
        length: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_display() {
        let error = VectorError::OutOfBounds {
            index: 33,
            length: 33,
        };
        assert_eq!(
            format!("{error}"),
            "index 33 is out of bounds for vector of length 33"
        );
    }

    #[test]
    fn test_out_of_bounds_is_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(VectorError::OutOfBounds {
            index: 0,
            length: 0,
        });
        assert_eq!(
            error.to_string(),
            "index 0 is out of bounds for vector of length 0"
        );
    }
}

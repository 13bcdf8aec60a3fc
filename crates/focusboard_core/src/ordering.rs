//! Ordering engine for id sequences.
//!
//! # Responsibility
//! - Move one element within a sequence (`reorder`).
//! - Detach from one sequence and attach to another (`remove_at` +
//!   `insert_at`) for cross-container moves.
//!
//! # Invariants
//! - Functions are pure: inputs are never mutated.
//! - `reorder` interprets `to` against the sequence after removal (splice
//!   semantics).
//! - Indices are bounds-checked; no other validation is performed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OrderingResult<T> = Result<T, OrderingError>;

/// Errors from ordering operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingError {
    /// `index` is not valid for a sequence of length `len`.
    IndexOutOfBounds { index: usize, len: usize },
    /// The inserted element already exists in the destination.
    DuplicateItem,
}

impl Display for OrderingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for sequence of length {len}")
            }
            Self::DuplicateItem => write!(f, "item already present in destination sequence"),
        }
    }
}

impl Error for OrderingError {}

/// Moves the element at `from` so that it ends up at `to`.
///
/// `from` must be `< len`; `to` must be `< len` as well, since the removed
/// element is reinserted into a sequence of length `len - 1`.
pub fn reorder<T: Clone>(sequence: &[T], from: usize, to: usize) -> OrderingResult<Vec<T>> {
    let (mut shortened, item) = remove_at(sequence, from)?;
    if to > shortened.len() {
        return Err(OrderingError::IndexOutOfBounds {
            index: to,
            len: sequence.len(),
        });
    }
    shortened.insert(to, item);
    Ok(shortened)
}

/// Returns the sequence without the element at `from`, and that element.
pub fn remove_at<T: Clone>(sequence: &[T], from: usize) -> OrderingResult<(Vec<T>, T)> {
    if from >= sequence.len() {
        return Err(OrderingError::IndexOutOfBounds {
            index: from,
            len: sequence.len(),
        });
    }
    let mut remaining = sequence.to_vec();
    let item = remaining.remove(from);
    Ok((remaining, item))
}

/// Returns the sequence with `item` inserted at `to` (`to <= len`).
pub fn insert_at<T: Clone + PartialEq>(
    sequence: &[T],
    to: usize,
    item: T,
) -> OrderingResult<Vec<T>> {
    if to > sequence.len() {
        return Err(OrderingError::IndexOutOfBounds {
            index: to,
            len: sequence.len(),
        });
    }
    if sequence.contains(&item) {
        return Err(OrderingError::DuplicateItem);
    }
    let mut extended = Vec::with_capacity(sequence.len() + 1);
    extended.extend_from_slice(&sequence[..to]);
    extended.push(item);
    extended.extend_from_slice(&sequence[to..]);
    Ok(extended)
}

/// Result of moving one element between two sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer<T> {
    pub source: Vec<T>,
    pub destination: Vec<T>,
    pub moved: T,
}

/// Removes the element at `from` in `source` and inserts it at `to` in
/// `destination`. Both sequences are validated before anything is built.
pub fn transfer<T: Clone + PartialEq>(
    source: &[T],
    destination: &[T],
    from: usize,
    to: usize,
) -> OrderingResult<Transfer<T>> {
    let (source, moved) = remove_at(source, from)?;
    let destination = insert_at(destination, to, moved.clone())?;
    Ok(Transfer {
        source,
        destination,
        moved,
    })
}

#[cfg(test)]
mod tests {
    use super::{insert_at, remove_at, reorder, transfer, OrderingError};

    fn sorted(mut items: Vec<u32>) -> Vec<u32> {
        items.sort_unstable();
        items
    }

    #[test]
    fn reorder_uses_post_removal_index() {
        assert_eq!(reorder(&["L1", "L2", "L3"], 2, 0).unwrap(), ["L3", "L1", "L2"]);
        assert_eq!(reorder(&["a", "b", "c", "d"], 0, 3).unwrap(), ["b", "c", "d", "a"]);
        assert_eq!(reorder(&["a", "b", "c"], 1, 1).unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn reorder_preserves_length_and_multiset_for_every_valid_pair() {
        let sequence: Vec<u32> = (0..6).collect();
        for from in 0..sequence.len() {
            for to in 0..sequence.len() {
                let moved = reorder(&sequence, from, to).unwrap();
                assert_eq!(moved.len(), sequence.len());
                assert_eq!(sorted(moved.clone()), sequence);
                assert_eq!(moved[to], sequence[from]);
            }
        }
    }

    #[test]
    fn reorder_rejects_out_of_range_indices() {
        assert_eq!(
            reorder(&[1, 2, 3], 3, 0),
            Err(OrderingError::IndexOutOfBounds { index: 3, len: 3 })
        );
        assert_eq!(
            reorder(&[1, 2, 3], 0, 3),
            Err(OrderingError::IndexOutOfBounds { index: 3, len: 3 })
        );
        assert!(reorder::<u32>(&[], 0, 0).is_err());
    }

    #[test]
    fn insert_at_allows_append_and_rejects_duplicates() {
        assert_eq!(insert_at(&[1, 2], 2, 3).unwrap(), [1, 2, 3]);
        assert_eq!(insert_at(&[1, 2], 0, 3).unwrap(), [3, 1, 2]);
        assert_eq!(insert_at(&[1, 2], 0, 2), Err(OrderingError::DuplicateItem));
        assert!(insert_at(&[1, 2], 3, 9).is_err());
    }

    #[test]
    fn transfer_places_item_in_exactly_one_sequence() {
        let source = ["c1", "c2", "c3"];
        let destination = ["c4"];
        let result = transfer(&source, &destination, 1, 1).unwrap();
        assert_eq!(result.source, ["c1", "c3"]);
        assert_eq!(result.destination, ["c4", "c2"]);
        assert_eq!(result.moved, "c2");

        for from in 0..source.len() {
            for to in 0..=destination.len() {
                let result = transfer(&source, &destination, from, to).unwrap();
                let moved = source[from];
                let count = result.source.iter().filter(|id| **id == moved).count()
                    + result.destination.iter().filter(|id| **id == moved).count();
                assert_eq!(count, 1);
                assert_eq!(
                    result.source.len() + result.destination.len(),
                    source.len() + destination.len()
                );
            }
        }
    }

    #[test]
    fn remove_at_leaves_input_untouched() {
        let input = vec![1, 2, 3];
        let (rest, item) = remove_at(&input, 0).unwrap();
        assert_eq!(item, 1);
        assert_eq!(rest, [2, 3]);
        assert_eq!(input, [1, 2, 3]);
    }
}

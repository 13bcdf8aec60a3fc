//! Card search over projections.
//!
//! # Responsibility
//! - Filter a list's cards by a regex over title and content.
//!
//! # Invariants
//! - Filtering never reorders: results keep list display order.

mod card_filter;

pub use card_filter::CardFilter;

//! Domain model for profiles, employees and their evaluations.
//!
//! # Responsibility
//! - Define the records read back from the store.
//! - Define the draft (form) shapes accepted by write use-cases.
//!
//! # Invariants
//! - Identifiers and timestamps are assigned by the store, never by callers.
//! - Drafts validate required text before any store call.

pub mod employee;
pub mod evaluation;
pub mod profile;
pub mod validation;

/// Uppercase initials of whitespace-separated words, at most two letters.
pub(crate) fn initials_of(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

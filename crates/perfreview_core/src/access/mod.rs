//! Sign-in identity and allow-list access gate.
//!
//! # Responsibility
//! - Model the identity consumed from the sign-in session.
//! - Decide allow/deny against a closed allow-list.
//!
//! # Invariants
//! - Policy checks are pure and total; a missing email is always denied.

mod identity;
mod policy;

pub use identity::{Identity, IdentityMetadata};
pub use policy::{AccessDecision, AccessPolicy, DEFAULT_ALLOWED_EMAILS};

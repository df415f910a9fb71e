//! Allow-list access policy.

use super::identity::Identity;
use std::collections::BTreeSet;

/// Build-time allow-list used when no configuration overrides it.
pub const DEFAULT_ALLOWED_EMAILS: &[&str] = &["ammonlarson@gmail.com"];

const UNAUTHORIZED_MESSAGE: &str = "Access denied. This application is restricted to the \
authorized users only. Contact your administrator if you believe this is an error.";

/// Outcome of gating a (possibly absent) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// No session; sign-in is required.
    SignedOut,
    /// Signed in but not on the allow-list.
    Denied { message: String },
    /// Signed in and allowed.
    Allowed,
}

/// Closed allow-list of email addresses, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed: BTreeSet<String>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EMAILS.iter().copied())
    }
}

impl AccessPolicy {
    /// Creates a policy; entries are trimmed and lowercased, blanks dropped.
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = emails
            .into_iter()
            .map(|value| value.as_ref().trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .collect();
        Self { allowed }
    }

    /// Returns `true` iff the identity has an email on the allow-list.
    pub fn is_authorized(&self, identity: &Identity) -> bool {
        match identity.email() {
            Some(email) => self.allowed.contains(&email.to_lowercase()),
            None => false,
        }
    }

    /// Explanation shown to a denied caller, echoing their email.
    pub fn unauthorized_message(&self, identity: &Identity) -> String {
        match identity.email() {
            Some(email) => format!("{UNAUTHORIZED_MESSAGE} Signed in as: {email}"),
            None => UNAUTHORIZED_MESSAGE.to_string(),
        }
    }

    /// Gates an optional session identity.
    pub fn evaluate(&self, identity: Option<&Identity>) -> AccessDecision {
        match identity {
            None => AccessDecision::SignedOut,
            Some(identity) if self.is_authorized(identity) => AccessDecision::Allowed,
            Some(identity) => AccessDecision::Denied {
                message: self.unauthorized_message(identity),
            },
        }
    }

    /// Allowed emails in sorted order.
    pub fn allowed_emails(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessDecision, AccessPolicy};
    use crate::access::Identity;

    #[test]
    fn matches_allow_list_case_insensitively() {
        let policy = AccessPolicy::default();
        assert!(policy.is_authorized(&Identity::with_email("AmmonLarson@Gmail.com")));
        assert!(policy.is_authorized(&Identity::with_email("  ammonlarson@gmail.com ")));
    }

    #[test]
    fn denies_other_addresses_and_missing_email() {
        let policy = AccessPolicy::default();
        assert!(!policy.is_authorized(&Identity::with_email("someone@gmail.com")));
        assert!(!policy.is_authorized(&Identity::with_email("")));
        assert!(!policy.is_authorized(&Identity::default()));
    }

    #[test]
    fn unauthorized_message_echoes_email_when_present() {
        let policy = AccessPolicy::default();
        let message = policy.unauthorized_message(&Identity::with_email("intruder@example.com"));
        assert!(message.starts_with("Access denied."));
        assert!(message.contains("intruder@example.com"));

        let anonymous = policy.unauthorized_message(&Identity::default());
        assert!(anonymous.starts_with("Access denied."));
    }

    #[test]
    fn evaluate_distinguishes_signed_out_denied_and_allowed() {
        let policy = AccessPolicy::new(["Lead@Example.com"]);
        assert_eq!(policy.evaluate(None), AccessDecision::SignedOut);
        assert_eq!(
            policy.evaluate(Some(&Identity::with_email("lead@example.com"))),
            AccessDecision::Allowed
        );
        assert!(matches!(
            policy.evaluate(Some(&Identity::with_email("x@example.com"))),
            AccessDecision::Denied { .. }
        ));
        assert_eq!(
            policy.allowed_emails().collect::<Vec<_>>(),
            vec!["lead@example.com"]
        );
    }
}

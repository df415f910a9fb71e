//! Identity consumed from the sign-in session.

use crate::model::initials_of;
use serde::{Deserialize, Serialize};

/// Profile metadata supplied by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Authenticated identity as seen by the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub email: Option<String>,
    /// Accepts the provider's `user_metadata` key as well.
    #[serde(default, alias = "user_metadata")]
    pub metadata: IdentityMetadata,
}

impl Identity {
    /// Creates an identity carrying only an email address.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            metadata: IdentityMetadata::default(),
        }
    }

    /// Parses the session user payload.
    pub fn from_session_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Non-blank email, if any.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Full name, falling back to email and then a fixed label.
    pub fn display_name(&self) -> &str {
        self.metadata
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or_else(|| self.email())
            .unwrap_or("Unknown user")
    }

    /// Uppercase initials of the display name, at most two letters.
    pub fn initials(&self) -> String {
        initials_of(self.display_name())
    }
}

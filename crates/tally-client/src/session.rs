//! # Session
//!
//! Explicit authentication context.
//!
//! A [`Session`] is passed by reference into every backend call. There is
//! no ambient, process-wide token: two sessions can be used side by side,
//! and a call made with [`Session::anonymous`] carries no `Authorization`
//! header at all (the backend decides whether to reject it).
//!
//! ```text
//! login(credentials) ──► Session { token: Some(jwt), user }
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        ▼                     ▼                     ▼
//!  search_products(&s)  create_sale(&s)       sales_summary(&s)
//!        │                     │                     │
//!        └── Authorization: Bearer <jwt> (iff token) ┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// The signed-in user, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl SessionUser {
    /// "First Last" when both are known, otherwise the username.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.username.clone(),
        }
    }
}

/// Authentication context for backend calls.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<SessionUser>,
}

impl Session {
    /// A session without a token.
    pub fn anonymous() -> Self {
        Session::default()
    }

    /// A session from an existing token (e.g. `--token` on the command line).
    pub fn with_token(token: impl Into<String>) -> Self {
        Session {
            token: Some(token.into()),
            user: None,
        }
    }

    pub(crate) fn authenticated(token: String, user: SessionUser) -> Self {
        Session {
            token: Some(token),
            user: Some(user),
        }
    }

    /// Token for the `Authorization: Bearer` header, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }
}

// Never print the token.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

/// Login form.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Email or username.
    pub identifier: String,
    pub password: String,
}

/// Registration form.
///
/// The email doubles as the username.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

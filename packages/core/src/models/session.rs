//! Session identity supplied by the external auth service
//!
//! The core never authenticates anyone. It receives a `Session` describing who is
//! signed in and passes it explicitly to every operation that needs it.

use crate::models::PersonRecord;
use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Stable user id; doubles as the owner id of the records this user creates
    #[serde(alias = "uid")]
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub is_admin: bool,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            display_name: None,
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::new(user_id)
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Whether this session created the given record
    pub fn owns(&self, record: &PersonRecord) -> bool {
        record.owner_id == self.user_id
    }

    /// Name to greet the user with: display name, then email, then user id
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
    }
}

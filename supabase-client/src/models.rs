//! Auth and table request / response models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Email and password pair used for sign-in and sign-up.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Email address is invalid"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Extra sign-up settings.
#[derive(Debug, Clone, Default)]
pub struct SignUpOptions {
    /// Where the confirmation email links back to.
    pub email_redirect_to: Option<String>,
    /// Stored as the user's metadata.
    pub data: Option<Value>,
}

/// Fields changeable through `update_user`. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Email address is invalid"))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// An authenticated user as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub app_metadata: Value,
}

/// Tokens issued on sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Outcome of sign-in and sign-up.
///
/// Sign-up yields no session while the email is waiting for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

/// A table operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOperation {
    Select { columns: String },
    Insert { rows: Value },
    Update { values: Value },
    Delete,
}

impl TableOperation {
    pub fn is_read(&self) -> bool {
        matches!(self, TableOperation::Select { .. })
    }
}

/// Equality filter on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

/// A fully described request against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRequest {
    pub table: String,
    pub operation: TableOperation,
    pub filters: Vec<Filter>,
}

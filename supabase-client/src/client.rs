//! The capability surface shared by the remote and example-mode clients.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientResult;
use crate::models::{
    AuthResponse, Credentials, Filter, SignUpOptions, TableOperation, TableRequest, User,
    UserAttributes,
};

/// Auth and table access against the hosted backend.
#[async_trait]
pub trait SupabaseClient: Send + Sync {
    async fn sign_in_with_password(&self, credentials: &Credentials) -> ClientResult<AuthResponse>;

    async fn sign_up(
        &self,
        credentials: &Credentials,
        options: &SignUpOptions,
    ) -> ClientResult<AuthResponse>;

    async fn sign_out(&self) -> ClientResult<()>;

    /// Sends a password reset email.
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> ClientResult<()>;

    async fn update_user(&self, attributes: &UserAttributes) -> ClientResult<User>;

    /// The signed-in user, or `None` without a session.
    async fn get_user(&self) -> ClientResult<Option<User>>;

    /// Claims of the current access token, or `None` without a session.
    async fn get_claims(&self) -> ClientResult<Option<Value>>;

    /// Runs a table request built with [`TableQuery`].
    async fn execute(&self, request: TableRequest) -> ClientResult<Vec<Value>>;

    /// Whether this client answers without a backend.
    fn is_example_mode(&self) -> bool;
}

impl dyn SupabaseClient {
    /// Starts a request scoped to `table`.
    pub fn from(&self, table: &str) -> TableQuery<'_> {
        TableQuery {
            client: self,
            table: table.to_string(),
            filters: Vec::new(),
        }
    }
}

/// Builder for one table request.
pub struct TableQuery<'a> {
    client: &'a dyn SupabaseClient,
    table: String,
    filters: Vec<Filter>,
}

impl<'a> TableQuery<'a> {
    /// Restricts the request to rows where `column` equals `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    pub async fn select(self, columns: &str) -> ClientResult<Vec<Value>> {
        self.run(TableOperation::Select {
            columns: columns.to_string(),
        })
        .await
    }

    /// Inserts one object or an array of objects.
    pub async fn insert(self, rows: Value) -> ClientResult<Vec<Value>> {
        self.run(TableOperation::Insert { rows }).await
    }

    pub async fn update(self, values: Value) -> ClientResult<Vec<Value>> {
        self.run(TableOperation::Update { values }).await
    }

    pub async fn delete(self) -> ClientResult<Vec<Value>> {
        self.run(TableOperation::Delete).await
    }

    async fn run(self, operation: TableOperation) -> ClientResult<Vec<Value>> {
        let request = TableRequest {
            table: self.table,
            operation,
            filters: self.filters,
        };
        self.client.execute(request).await
    }
}

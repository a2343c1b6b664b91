//! Example-mode client.
//!
//! Answers every call immediately with a fixed result and never touches the
//! network. Writes fail with a fixed message, reads succeed empty.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::SupabaseClient;
use crate::error::{
    ClientError, ClientResult, AUTH_EXAMPLE_MODE_MESSAGE, DATABASE_EXAMPLE_MODE_MESSAGE,
};
use crate::models::{AuthResponse, Credentials, SignUpOptions, TableRequest, User, UserAttributes};

#[derive(Debug, Clone, Copy, Default)]
pub struct MockClient;

impl MockClient {
    pub fn new() -> Self {
        MockClient
    }
}

#[async_trait]
impl SupabaseClient for MockClient {
    async fn sign_in_with_password(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        tracing::debug!(email = %credentials.email, "Example mode sign-in");
        Err(ClientError::ExampleMode(AUTH_EXAMPLE_MODE_MESSAGE))
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        _options: &SignUpOptions,
    ) -> ClientResult<AuthResponse> {
        tracing::debug!(email = %credentials.email, "Example mode sign-up");
        Err(ClientError::ExampleMode(AUTH_EXAMPLE_MODE_MESSAGE))
    }

    async fn sign_out(&self) -> ClientResult<()> {
        tracing::debug!("Example mode sign-out");
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        _redirect_to: Option<&str>,
    ) -> ClientResult<()> {
        tracing::debug!(email = %email, "Example mode password reset");
        Ok(())
    }

    async fn update_user(&self, _attributes: &UserAttributes) -> ClientResult<User> {
        tracing::debug!("Example mode user update");
        Err(ClientError::ExampleMode(AUTH_EXAMPLE_MODE_MESSAGE))
    }

    async fn get_user(&self) -> ClientResult<Option<User>> {
        tracing::debug!("Example mode user lookup");
        Ok(None)
    }

    async fn get_claims(&self) -> ClientResult<Option<Value>> {
        Ok(None)
    }

    async fn execute(&self, request: TableRequest) -> ClientResult<Vec<Value>> {
        tracing::debug!(table = %request.table, operation = ?request.operation, "Example mode table request");
        if request.operation.is_read() {
            Ok(Vec::new())
        } else {
            Err(ClientError::ExampleMode(DATABASE_EXAMPLE_MODE_MESSAGE))
        }
    }

    fn is_example_mode(&self) -> bool {
        true
    }
}

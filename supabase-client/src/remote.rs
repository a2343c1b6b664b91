//! Client bound to a real hosted project.
//!
//! Auth goes through the `/auth/v1` endpoints and table access through the
//! `/rest/v1` endpoints. Every request carries the anon key; requests made
//! while signed in are authorized with the session's access token.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use validator::{Validate, ValidateEmail};

use crate::client::SupabaseClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AuthResponse, Credentials, Session, SignUpOptions, TableOperation, TableRequest, User,
    UserAttributes,
};
use crate::session::SessionStorage;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: SessionStorage,
}

impl RemoteClient {
    /// Creates a client. No request is made until the first call.
    pub fn new(
        url: &str,
        anon_key: &str,
        session: SessionStorage,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: String, session: Option<&Session>) -> RequestBuilder {
        let token = session.map_or(self.anon_key.as_str(), |s| s.access_token.as_str());
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    fn store_session(&self, session: &Session) {
        self.session.save(session);
        tracing::debug!("Session stored");
    }
}

/// Fails with the service's own message when the status is not a success.
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

async fn json_body<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = check(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) fn api_error(status: StatusCode, body: &str) -> ClientError {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["msg", "message", "error_description", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });
    let message = from_json
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Reads the payload of a JWT without verifying its signature.
pub(crate) fn decode_claims(token: &str) -> ClientResult<Value> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ClientError::InvalidToken("expected three segments".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::InvalidToken(e.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// First DNS label of the project URL, e.g. `abcd` for `https://abcd.supabase.co`.
pub fn project_ref(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = without_scheme
        .split(['/', ':', '?'])
        .next()
        .unwrap_or_default();
    host.split('.').next().unwrap_or_default().to_string()
}

/// Rows in a PostgREST response body. Writes without a representation return nothing.
fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[async_trait]
impl SupabaseClient for RemoteClient {
    async fn sign_in_with_password(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        credentials.validate()?;
        let response = self
            .request(Method::POST, self.auth_url("token"), None)
            .query(&[("grant_type", "password")])
            .json(credentials)
            .send()
            .await?;
        let session: Session = json_body(response).await?;
        self.store_session(&session);
        tracing::info!(email = %credentials.email, "Signed in");
        Ok(AuthResponse {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        options: &SignUpOptions,
    ) -> ClientResult<AuthResponse> {
        credentials.validate()?;
        let mut body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        if let Some(data) = &options.data {
            body["data"] = data.clone();
        }
        let mut request = self.request(Method::POST, self.auth_url("signup"), None);
        if let Some(redirect_to) = &options.email_redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        let value: Value = json_body(request.json(&body).send().await?).await?;

        // With email confirmation on, only the user comes back.
        if value.get("access_token").is_some() {
            let session: Session = serde_json::from_value(value)?;
            self.store_session(&session);
            Ok(AuthResponse {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user: User = serde_json::from_value(value)?;
            tracing::info!(user_id = %user.id, "Sign-up pending email confirmation");
            Ok(AuthResponse {
                user: Some(user),
                session: None,
            })
        }
    }

    async fn sign_out(&self) -> ClientResult<()> {
        let Some(session) = self.session.load() else {
            self.session.clear();
            return Ok(());
        };
        let response = self
            .request(Method::POST, self.auth_url("logout"), Some(&session))
            .send()
            .await?;
        match check(response).await {
            Ok(_) => {}
            // The session is already gone on the server.
            Err(ClientError::Api { status, .. }) if matches!(status, 401 | 403 | 404) => {}
            Err(e) => return Err(e),
        }
        self.session.clear();
        tracing::info!("Signed out");
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> ClientResult<()> {
        if !email.validate_email() {
            return Err(ClientError::Validation("Email address is invalid".to_string()));
        }
        let mut request = self.request(Method::POST, self.auth_url("recover"), None);
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        check(request.json(&json!({ "email": email })).send().await?).await?;
        Ok(())
    }

    async fn update_user(&self, attributes: &UserAttributes) -> ClientResult<User> {
        attributes.validate()?;
        let mut session = self.session.load().ok_or(ClientError::NotAuthenticated)?;
        let response = self
            .request(Method::PUT, self.auth_url("user"), Some(&session))
            .json(attributes)
            .send()
            .await?;
        let user: User = json_body(response).await?;
        session.user = Some(user.clone());
        self.store_session(&session);
        Ok(user)
    }

    async fn get_user(&self) -> ClientResult<Option<User>> {
        let Some(session) = self.session.load() else {
            return Ok(None);
        };
        let response = self
            .request(Method::GET, self.auth_url("user"), Some(&session))
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        Ok(Some(json_body(response).await?))
    }

    async fn get_claims(&self) -> ClientResult<Option<Value>> {
        match self.session.load() {
            Some(session) => decode_claims(&session.access_token).map(Some),
            None => Ok(None),
        }
    }

    async fn execute(&self, request: TableRequest) -> ClientResult<Vec<Value>> {
        let session = self.session.load();
        let url = self.rest_url(&request.table);
        let filters: Vec<(String, String)> = request
            .filters
            .iter()
            .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
            .collect();

        let builder = match &request.operation {
            TableOperation::Select { columns } => self
                .request(Method::GET, url, session.as_ref())
                .query(&[("select", columns)]),
            TableOperation::Insert { rows } => self
                .request(Method::POST, url, session.as_ref())
                .header("Prefer", "return=representation")
                .json(rows),
            TableOperation::Update { values } => self
                .request(Method::PATCH, url, session.as_ref())
                .header("Prefer", "return=representation")
                .json(values),
            TableOperation::Delete => self
                .request(Method::DELETE, url, session.as_ref())
                .header("Prefer", "return=representation"),
        };

        let response = check(builder.query(&filters).send().await?).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        let rows = into_rows(serde_json::from_slice(&bytes)?);
        tracing::debug!(table = %request.table, rows = rows.len(), "Table request completed");
        Ok(rows)
    }

    fn is_example_mode(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::RequestCookies;
    use crate::models::Filter;
    use axum::body::to_bytes;
    use axum::extract::Request;
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn token(claims: Value) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    fn session(access_token: String) -> Session {
        Session {
            access_token,
            refresh_token: "refresh".into(),
            token_type: "bearer".into(),
            expires_in: None,
            expires_at: None,
            user: None,
        }
    }

    fn memory_client() -> RemoteClient {
        RemoteClient::new("https://abcd.supabase.co/", "anon", SessionStorage::memory()).unwrap()
    }

    #[test]
    fn test_project_ref() {
        assert_eq!(project_ref("https://abcd.supabase.co"), "abcd");
        assert_eq!(project_ref("http://localhost:54321"), "localhost");
        assert_eq!(project_ref("abcd.supabase.co/path"), "abcd");
    }

    #[test]
    fn test_urls_drop_trailing_slash() {
        let client = memory_client();
        assert_eq!(client.auth_url("signup"), "https://abcd.supabase.co/auth/v1/signup");
        assert_eq!(client.rest_url("todos"), "https://abcd.supabase.co/rest/v1/todos");
    }

    #[test]
    fn test_api_error_message_sources() {
        let err = api_error(StatusCode::BAD_REQUEST, r#"{"msg":"Invalid login credentials"}"#);
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert_eq!(err.status(), Some(400));

        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#,
        );
        assert_eq!(err.to_string(), "Email not confirmed");

        assert_eq!(api_error(StatusCode::BAD_GATEWAY, "upstream down").to_string(), "upstream down");
        assert_eq!(api_error(StatusCode::NOT_FOUND, "").to_string(), "Not Found");
    }

    #[test]
    fn test_decode_claims() {
        let claims = decode_claims(&token(json!({"sub": "u1", "role": "authenticated"}))).unwrap();
        assert_eq!(claims["sub"], "u1");
        assert!(matches!(decode_claims("opaque"), Err(ClientError::InvalidToken(_))));
    }

    #[test]
    fn test_into_rows() {
        assert_eq!(into_rows(json!([{"id": 1}])), vec![json!({"id": 1})]);
        assert_eq!(into_rows(json!({"id": 1})), vec![json!({"id": 1})]);
        assert!(into_rows(Value::Null).is_empty());
    }

    #[tokio::test]
    async fn test_calls_without_session_stay_offline() {
        let client = memory_client();
        assert_eq!(client.get_user().await.unwrap(), None);
        assert_eq!(client.get_claims().await.unwrap(), None);
        assert!(client.sign_out().await.is_ok());
        assert!(matches!(
            client.update_user(&UserAttributes::default()).await,
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_sending() {
        let client = memory_client();
        assert!(matches!(
            client.sign_in_with_password(&Credentials::new("nope", "pw")).await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            client.reset_password_for_email("nope", None).await,
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_server_client_reads_session_from_request_cookies() {
        let jar = Arc::new(RequestCookies::from_headers(&HeaderMap::new()));
        let storage = SessionStorage::cookies(jar.clone(), "abcd");
        storage.save(&session(token(json!({"sub": "u1"}))));

        // A later request that carries the cookie sees the same session.
        let mut headers = HeaderMap::new();
        jar.apply_to(&mut headers).unwrap();
        let cookie = headers
            .get(axum::http::header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let mut next_request = HeaderMap::new();
        next_request.insert(axum::http::header::COOKIE, cookie.parse().unwrap());

        let next_jar = Arc::new(RequestCookies::from_headers(&next_request).read_only());
        let client = RemoteClient::new(
            "https://abcd.supabase.co",
            "anon",
            SessionStorage::cookies(next_jar, "abcd"),
        )
        .unwrap();
        let claims = client.get_claims().await.unwrap().unwrap();
        assert_eq!(claims["sub"], "u1");
    }

    /// A request as seen by the stub server.
    #[derive(Debug, Clone)]
    struct Recorded {
        method: Method,
        path: String,
        query: String,
        headers: HeaderMap,
        body: Value,
    }

    impl Recorded {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).and_then(|v| v.to_str().ok())
        }
    }

    type Route = (Method, &'static str, StatusCode, Value);

    struct Stub {
        url: String,
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    impl Stub {
        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().clone()
        }

        fn client(&self) -> RemoteClient {
            RemoteClient::new(&self.url, "anon", SessionStorage::memory()).unwrap()
        }
    }

    /// Serves canned JSON replies on a local port and records every request.
    async fn stub(routes: Vec<Route>) -> Stub {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        let routes = Arc::new(routes);
        let app = Router::new().fallback(move |request: Request| {
            let log = log.clone();
            let routes = routes.clone();
            async move {
                let (parts, body) = request.into_parts();
                let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
                log.lock().push(Recorded {
                    method: parts.method.clone(),
                    path: parts.uri.path().to_string(),
                    query: parts.uri.query().unwrap_or_default().to_string(),
                    headers: parts.headers.clone(),
                    body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
                });
                let reply = routes
                    .iter()
                    .find(|(method, path, ..)| *method == parts.method && *path == parts.uri.path());
                match reply {
                    Some((_, _, status, body)) => (*status, Json(body.clone())).into_response(),
                    None => StatusCode::NOT_FOUND.into_response(),
                }
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Stub { url, requests }
    }

    fn session_body(access_token: &str) -> Value {
        json!({
            "access_token": access_token,
            "refresh_token": "refresh",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {"id": "u1", "email": "user@example.com"},
        })
    }

    fn select_all(table: &str) -> TableRequest {
        TableRequest {
            table: table.to_string(),
            operation: TableOperation::Select {
                columns: "*".to_string(),
            },
            filters: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_persists_session_and_authorizes_later_requests() {
        let stub = stub(vec![
            (Method::POST, "/auth/v1/token", StatusCode::OK, session_body("user-token")),
            (Method::GET, "/rest/v1/todos", StatusCode::OK, json!([{"id": 1}])),
        ])
        .await;
        let client = stub.client();

        let response = client
            .sign_in_with_password(&Credentials::new("user@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(response.user.unwrap().id, "u1");
        assert_eq!(client.session.load().unwrap().access_token, "user-token");

        let rows = client.execute(select_all("todos")).await.unwrap();
        assert_eq!(rows, vec![json!({"id": 1})]);

        let requests = stub.requests();
        let sign_in = &requests[0];
        assert_eq!(sign_in.method, Method::POST);
        assert_eq!(sign_in.query, "grant_type=password");
        assert_eq!(sign_in.header("apikey"), Some("anon"));
        assert_eq!(sign_in.header("authorization"), Some("Bearer anon"));
        assert_eq!(
            sign_in.body,
            json!({"email": "user@example.com", "password": "secret"})
        );

        let select = &requests[1];
        assert_eq!(select.path, "/rest/v1/todos");
        assert_eq!(select.query, "select=*");
        assert_eq!(select.header("apikey"), Some("anon"));
        assert_eq!(select.header("authorization"), Some("Bearer user-token"));
        assert_eq!(select.header("prefer"), None);
    }

    #[tokio::test]
    async fn test_rejected_sign_in_stores_nothing() {
        let stub = stub(vec![(
            Method::POST,
            "/auth/v1/token",
            StatusCode::BAD_REQUEST,
            json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}),
        )])
        .await;
        let client = stub.client();

        let err = client
            .sign_in_with_password(&Credentials::new("user@example.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(client.session.load().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation_has_no_session() {
        let stub = stub(vec![(
            Method::POST,
            "/auth/v1/signup",
            StatusCode::OK,
            json!({"id": "u2", "email": "new@example.com"}),
        )])
        .await;
        let client = stub.client();
        let options = SignUpOptions {
            email_redirect_to: Some("https://app.example/welcome".into()),
            data: Some(json!({"plan": "free"})),
        };

        let response = client
            .sign_up(&Credentials::new("new@example.com", "secret"), &options)
            .await
            .unwrap();

        assert!(response.session.is_none());
        assert_eq!(response.user.unwrap().id, "u2");
        assert!(client.session.load().is_none());
        let request = &stub.requests()[0];
        assert_eq!(
            request.query,
            "redirect_to=https%3A%2F%2Fapp.example%2Fwelcome"
        );
        assert_eq!(request.body["email"], "new@example.com");
        assert_eq!(request.body["data"], json!({"plan": "free"}));
    }

    #[tokio::test]
    async fn test_auto_confirmed_sign_up_stores_session() {
        let stub = stub(vec![(
            Method::POST,
            "/auth/v1/signup",
            StatusCode::OK,
            session_body("fresh-token"),
        )])
        .await;
        let client = stub.client();

        let response = client
            .sign_up(&Credentials::new("user@example.com", "secret"), &SignUpOptions::default())
            .await
            .unwrap();

        assert_eq!(response.session.unwrap().access_token, "fresh-token");
        assert_eq!(client.session.load().unwrap().access_token, "fresh-token");
        assert_eq!(stub.requests()[0].query, "");
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_when_accepted_or_already_gone() {
        for status in [
            StatusCode::OK,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
        ] {
            let stub = stub(vec![(
                Method::POST,
                "/auth/v1/logout",
                status,
                json!({"msg": "session not found"}),
            )])
            .await;
            let client = stub.client();
            client.session.save(&session("user-token".into()));

            client.sign_out().await.unwrap();

            assert!(client.session.load().is_none(), "status {status}");
            assert_eq!(
                stub.requests()[0].header("authorization"),
                Some("Bearer user-token")
            );
        }
    }

    #[tokio::test]
    async fn test_sign_out_keeps_session_on_server_error() {
        let stub = stub(vec![(
            Method::POST,
            "/auth/v1/logout",
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"message": "database unavailable"}),
        )])
        .await;
        let client = stub.client();
        client.session.save(&session("user-token".into()));

        let err = client.sign_out().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "database unavailable");
        assert_eq!(client.session.load().unwrap().access_token, "user-token");
    }

    #[tokio::test]
    async fn test_get_user_treats_unauthorized_as_signed_out() {
        let stub = stub(vec![(
            Method::GET,
            "/auth/v1/user",
            StatusCode::UNAUTHORIZED,
            json!({"msg": "invalid JWT"}),
        )])
        .await;
        let client = stub.client();
        client.session.save(&session("expired-token".into()));

        assert_eq!(client.get_user().await.unwrap(), None);
        assert_eq!(
            stub.requests()[0].header("authorization"),
            Some("Bearer expired-token")
        );
    }

    #[tokio::test]
    async fn test_get_user_returns_current_user() {
        let stub = stub(vec![(
            Method::GET,
            "/auth/v1/user",
            StatusCode::OK,
            json!({"id": "u1", "email": "user@example.com"}),
        )])
        .await;
        let client = stub.client();
        client.session.save(&session("user-token".into()));

        let user = client.get_user().await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("user@example.com"));
    }

    #[tokio::test]
    async fn test_update_user_refreshes_stored_user() {
        let stub = stub(vec![(
            Method::PUT,
            "/auth/v1/user",
            StatusCode::OK,
            json!({"id": "u1", "user_metadata": {"name": "Ada"}}),
        )])
        .await;
        let client = stub.client();
        client.session.save(&session("user-token".into()));
        let attributes = UserAttributes {
            data: Some(json!({"name": "Ada"})),
            ..Default::default()
        };

        let user = client.update_user(&attributes).await.unwrap();

        assert_eq!(user.user_metadata, json!({"name": "Ada"}));
        assert_eq!(client.session.load().unwrap().user, Some(user));
        assert_eq!(stub.requests()[0].body, json!({"data": {"name": "Ada"}}));
    }

    #[tokio::test]
    async fn test_table_writes_send_filters_and_representation_preference() {
        let stub = stub(vec![
            (Method::PATCH, "/rest/v1/todos", StatusCode::OK, json!([{"id": 1, "done": true}])),
            (Method::DELETE, "/rest/v1/todos", StatusCode::OK, Value::Null),
            (Method::POST, "/rest/v1/todos", StatusCode::CREATED, json!({"id": 2})),
        ])
        .await;
        let client: Arc<dyn SupabaseClient> = Arc::new(stub.client());

        let updated = client
            .from("todos")
            .eq("id", 1)
            .update(json!({"done": true}))
            .await
            .unwrap();
        let deleted = client
            .from("todos")
            .eq("id", 1)
            .eq("owner", "u1")
            .delete()
            .await
            .unwrap();
        let inserted = client
            .from("todos")
            .insert(json!({"title": "a"}))
            .await
            .unwrap();

        assert_eq!(updated, vec![json!({"id": 1, "done": true})]);
        assert!(deleted.is_empty());
        assert_eq!(inserted, vec![json!({"id": 2})]);

        let requests = stub.requests();
        assert_eq!(requests[0].method, Method::PATCH);
        assert_eq!(requests[0].query, "id=eq.1");
        assert_eq!(requests[0].body, json!({"done": true}));
        assert_eq!(requests[1].method, Method::DELETE);
        assert_eq!(requests[1].query, "id=eq.1&owner=eq.u1");
        assert_eq!(requests[2].body, json!({"title": "a"}));
        for request in &requests {
            assert_eq!(request.header("prefer"), Some("return=representation"));
            assert_eq!(request.header("apikey"), Some("anon"));
            assert_eq!(request.header("authorization"), Some("Bearer anon"));
        }
    }

    #[tokio::test]
    async fn test_select_filters_are_sent() {
        let stub = stub(vec![(Method::GET, "/rest/v1/todos", StatusCode::OK, json!([]))]).await;
        let client = stub.client();
        let mut request = select_all("todos");
        request.filters.push(Filter {
            column: "done".into(),
            value: "false".into(),
        });

        assert!(client.execute(request).await.unwrap().is_empty());
        assert_eq!(stub.requests()[0].query, "select=*&done=eq.false");
    }
}

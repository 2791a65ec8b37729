//! HTTP client for the ClearMind REST API.
//!
//! A single client covers the auth, profile, chat and item endpoints. The
//! bearer token is read from the injected [`Session`] on every request; the
//! client itself never persists or clears it.
//!
//! Endpoints (relative to `api.base_url`):
//! - POST   /auth/login, /auth/register
//! - GET    /users/me, PUT /users/me
//! - POST   /chat
//! - GET    /items, POST /items
//! - GET    /items/{id}, PUT /items/{id}, DELETE /items/{id}
//! - PATCH  /items/{id}/status

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{ClearMindError, Result};
use crate::models::{
    AuthResponse, ChatReply, ChatRequest, Item, ItemPayload, ItemQuery, LoginRequest,
    ProfileUpdate, RegisterRequest, Status, StatusUpdate, User,
};
use crate::session::Session;
use crate::store::{Classifier, ItemStore};

#[derive(Debug, Clone)]
pub struct ClearMindClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl ClearMindClient {
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(base_url: impl Into<String>, session: Session) -> Result<Self> {
        let config = ApiConfig {
            base_url: base_url.into(),
            timeout_seconds: None,
        };
        Self::new(&config, session)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Auth & profile
    // ------------------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send_json(self.request(Method::POST, "/auth/login").json(&body))
            .await
    }

    pub async fn register(&self, body: &RegisterRequest) -> Result<AuthResponse> {
        self.send_json(self.request(Method::POST, "/auth/register").json(body))
            .await
    }

    pub async fn me(&self) -> Result<User> {
        self.send_json(self.request(Method::GET, "/users/me")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.send_json(self.request(Method::PUT, "/users/me").json(update))
            .await
    }

    // ------------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------------

    pub async fn send_chat(&self, message: &str) -> Result<ChatReply> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        self.send_json(self.request(Method::POST, "/chat").json(&body))
            .await
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let token = self.session.token().filter(|t| !t.is_empty());
        tracing::debug!(method = %method, path, authenticated = token.is_some(), "API request");

        let req = self.http.request(method, url);
        match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response> {
        let response = req.send().await.map_err(|e| {
            tracing::error!(error = %e, "Request did not reach the server");
            ClearMindError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        tracing::warn!(status = status.as_u16(), detail = ?detail, "API error");
        Err(error_for_status(status.as_u16(), detail))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = self.execute(req).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to decode API response");
            ClearMindError::Decode(e)
        })
    }
}

#[async_trait]
impl ItemStore for ClearMindClient {
    async fn list(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        self.send_json(self.request(Method::GET, "/items").query(query))
            .await
    }

    async fn get(&self, id: i64) -> Result<Item> {
        self.send_json(self.request(Method::GET, &format!("/items/{id}")))
            .await
    }

    async fn create(&self, payload: &ItemPayload) -> Result<Item> {
        self.send_json(self.request(Method::POST, "/items").json(payload))
            .await
    }

    async fn update(&self, id: i64, payload: &ItemPayload) -> Result<Item> {
        self.send_json(self.request(Method::PUT, &format!("/items/{id}")).json(payload))
            .await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::DELETE, &format!("/items/{id}")))
            .await?;
        Ok(())
    }

    async fn update_status(&self, id: i64, status: Status) -> Result<Item> {
        let body = StatusUpdate { status };
        self.send_json(
            self.request(Method::PATCH, &format!("/items/{id}/status"))
                .json(&body),
        )
        .await
    }
}

#[async_trait]
impl Classifier for ClearMindClient {
    async fn classify(&self, message: &str) -> Result<ChatReply> {
        self.send_chat(message).await
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Pull the `detail` field out of an error body. Strings are taken verbatim;
/// structured details (e.g. 422 validation lists) are re-serialised compactly.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn error_for_status(status: u16, detail: Option<String>) -> ClearMindError {
    match status {
        401 | 403 => ClearMindError::Unauthorized { detail },
        400 | 422 => ClearMindError::Rejected { status, detail },
        404 => ClearMindError::NotFound { detail },
        _ => ClearMindError::Server { status, detail },
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Subcategory};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn item_body(id: i64, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": 1,
            "title": format!("Item {id}"),
            "description": null,
            "category": "task",
            "subcategory": "goal",
            "life_area": null,
            "deadline": null,
            "status": status,
            "priority": 5,
            "created_at": "2025-01-01T10:00:00",
            "updated_at": "2025-01-01T10:00:00"
        })
    }

    fn client_for(server: &MockServer, token: Option<&str>) -> ClearMindClient {
        let session = Session::in_memory();
        if let Some(t) = token {
            session.set_token(t).unwrap();
        }
        ClearMindClient::with_base_url(server.uri(), session).expect("Failed to create client")
    }

    #[tokio::test]
    async fn test_list_attaches_bearer_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(header("authorization", "Bearer tok-1"))
            .and(query_param("category", "idea"))
            .and(query_param("status", "in_progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([item_body(1, "pending")])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("tok-1"));
        let query = ItemQuery {
            category: Some(Category::Idea),
            status: Some(Status::InProgress),
            life_area: None,
        };
        let items = client.list(&query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].subcategory, Some(Subcategory::Goal));
    }

    #[tokio::test]
    async fn test_no_token_sends_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(|req: &Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(401)
                        .set_body_json(json!({"detail": "Not authenticated"}))
                }
            })
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.me().await.unwrap_err();
        match err {
            ClearMindError::Unauthorized { detail } => {
                assert_eq!(detail.as_deref(), Some("Not authenticated"))
            }
            other => panic!("Expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_status_sends_patch_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/items/42/status"))
            .and(body_json(json!({"status": "done"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(item_body(42, "done")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        let item = client.update_status(42, Status::Done).await.unwrap();
        assert_eq!(item.status, Status::Done);
    }

    #[tokio::test]
    async fn test_delete_accepts_204() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/items/9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        assert!(client.delete(9).await.is_ok());
    }

    #[tokio::test]
    async fn test_validation_error_keeps_structured_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [{"loc": ["body", "title"], "msg": "field required"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        let err = client.create(&ItemPayload::default()).await.unwrap_err();
        match &err {
            ClearMindError::Rejected { status, detail } => {
                assert_eq!(*status, 422);
                assert!(detail.as_deref().unwrap().contains("field required"));
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_found_and_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items/404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Item not found"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items/500"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        let nf = client.get(404).await.unwrap_err();
        assert!(matches!(nf, ClearMindError::NotFound { .. }));
        assert_eq!(nf.detail(), Some("Item not found"));

        let se = client.get(500).await.unwrap_err();
        assert!(matches!(se, ClearMindError::Server { status: 500, detail: None }));
    }

    #[tokio::test]
    async fn test_network_error_when_server_unreachable() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = ClearMindClient::with_base_url(uri, Session::in_memory()).unwrap();
        let err = client.list(&ItemQuery::default()).await.unwrap_err();
        assert!(matches!(err, ClearMindError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        let err = client.list(&ItemQuery::default()).await.unwrap_err();
        assert!(matches!(err, ClearMindError::Decode(_)));
    }

    #[tokio::test]
    async fn test_chat_posts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({"message": "buy milk tomorrow"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Added it.",
                "items": [{"title": "Buy milk", "category": "task", "priority": 4}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        let reply = client.classify("buy milk tomorrow").await.unwrap();
        assert_eq!(reply.message, "Added it.");
        assert_eq!(reply.items[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "a@b.co", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt", "token_type": "bearer"
            })))
            .mount(&server)
            .await;

        let client =
            ClearMindClient::with_base_url(format!("{}/", server.uri()), Session::in_memory())
                .unwrap();
        let resp = client.login("a@b.co", "pw").await.unwrap();
        assert_eq!(resp.access_token, "jwt");
        // The client reports the token; persisting it is the caller's job.
        assert!(!client.session().is_authenticated());
    }

    #[test]
    fn test_extract_detail_shapes() {
        assert_eq!(extract_detail(r#"{"detail":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(extract_detail(r#"{"detail":{"code":1}}"#).as_deref(), Some(r#"{"code":1}"#));
        assert_eq!(extract_detail(r#"{"detail":null}"#), None);
        assert_eq!(extract_detail("plain text"), None);
        assert_eq!(extract_detail(""), None);
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(error_for_status(401, None).is_unauthorized());
        assert!(error_for_status(403, None).is_unauthorized());
        assert!(matches!(error_for_status(400, None), ClearMindError::Rejected { status: 400, .. }));
        assert!(matches!(error_for_status(422, None), ClearMindError::Rejected { status: 422, .. }));
        assert!(matches!(error_for_status(404, None), ClearMindError::NotFound { .. }));
        assert!(matches!(error_for_status(503, None), ClearMindError::Server { status: 503, .. }));
    }
}

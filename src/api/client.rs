//! HTTP client for the publishing API.
//!
//! # Security Note - Logging
//!
//! The bearer token is kept in a `SecretString` and the Authorization header
//! is built through `RedactedHeader`, whose `Display` and `Debug` never show
//! the value. The header is also marked sensitive so reqwest/hyper logging
//! skips it.

use std::fmt;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use url::Url;

use crate::config::Config;
use crate::entity::EntitySpec;
use crate::entity::record::coerce_to_string;
use crate::error::{AdminError, Result};
use crate::session::SessionStore;

use super::error::api_error;
use super::{DerivedResponse, EntityBackend, Payload, normalize_list_body};

/// Wrapper for sensitive header values that redacts the value when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn bearer(token: &str) -> Self {
        Self {
            value: format!("Bearer {token}"),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(&self.value)
            .map_err(|_| AdminError::Auth("stored token contains invalid characters".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Token and user record returned by a successful login
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user: Value,
}

/// Publishing API client
pub struct ApiClient {
    client: Client,
    base: Url,
    token: SecretString,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// An empty token is allowed; requests then carry `Bearer ` and the
    /// server decides.
    pub fn new(base_url: &str, token: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(AdminError::Config(format!(
                "API URL '{base_url}' cannot be used as a base"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base,
            token: SecretString::from(token.to_string()),
        })
    }

    /// Create a client from configuration and the persisted session token
    pub fn from_config(config: &Config, session: &SessionStore) -> Result<Self> {
        Self::new(
            &config.effective_api_url(),
            session.token(),
            config.request_timeout(),
        )
    }

    /// Resolve path segments under the base URL.
    ///
    /// Each segment is pushed as one percent-encoded path segment, so an id
    /// containing `/` stays a single segment. Empty segments are rejected.
    pub fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        if segments.iter().any(|s| s.is_empty()) {
            return Err(AdminError::Other(
                "path segment must not be empty".to_string(),
            ));
        }
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AdminError::Config("API URL cannot be used as a base".to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Resolve a configured relative path such as `auth/login`
    pub fn relative_url(&self, path: &str) -> Result<Url> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.endpoint_url(&segments)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let auth = RedactedHeader::bearer(self.token.expose_secret());
        Ok(builder.header(header::AUTHORIZATION, auth.as_header_value()?))
    }

    /// Send a request and turn any non-2xx status into an `Api` error
    async fn send_checked(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("request rejected with {status}: {body}");
        Err(api_error(status, &body))
    }

    /// GET a collection and normalize the body to an array
    pub async fn fetch_list(&self, endpoint: &str) -> Result<Vec<Value>> {
        let url = self.endpoint_url(&[endpoint])?;
        tracing::debug!("GET {url}");
        let response = self.send_checked(self.authorized(self.client.get(url))?).await?;
        let body: Value = response.json().await?;
        Ok(normalize_list_body(body))
    }

    fn with_payload(
        &self,
        builder: RequestBuilder,
        spec: &EntitySpec,
        payload: &Payload,
    ) -> RequestBuilder {
        if spec.is_multipart() {
            builder.multipart(multipart_form(payload))
        } else {
            builder.json(&Value::Object(payload.fields.clone()))
        }
    }

    /// GET one of the derived endpoints, failing when `success` is false
    pub async fn fetch_derived(&self, segments: &[&str]) -> Result<DerivedResponse> {
        let url = self.endpoint_url(segments)?;
        tracing::debug!("GET {url}");
        let response = self.send_checked(self.authorized(self.client.get(url))?).await?;
        let status = response.status();
        let derived: DerivedResponse = response.json().await?;
        if !derived.success {
            let message = derived
                .payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request was not successful")
                .to_string();
            return Err(AdminError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(derived)
    }

    /// Issue archive of one journal
    pub async fn issues_by_journal(&self, journal_id: &str) -> Result<DerivedResponse> {
        self.fetch_derived(&["issues", "archives", journal_id]).await
    }

    pub async fn latest_issue(&self, journal_id: &str) -> Result<DerivedResponse> {
        self.fetch_derived(&["issues", "latest", journal_id]).await
    }

    pub async fn articles_by_issue(&self, issue_id: &str) -> Result<DerivedResponse> {
        self.fetch_derived(&["articles", "issue", issue_id]).await
    }

    pub async fn articles_by_journal(&self, journal_id: &str) -> Result<DerivedResponse> {
        self.fetch_derived(&["articles", "journal", journal_id]).await
    }

    /// Exchange credentials for a token. No Authorization header is sent.
    pub async fn login(&self, login_path: &str, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.relative_url(login_path)?;
        tracing::debug!("POST {url}");
        let response = self
            .send_checked(
                self.client
                    .post(url)
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        let body: Value = response.json().await?;
        parse_login_body(body)
    }
}

fn multipart_form(payload: &Payload) -> Form {
    let mut form = Form::new();
    for (key, value) in &payload.fields {
        let text = match value {
            Value::Object(obj) => obj
                .get("_id")
                .map(coerce_to_string)
                .unwrap_or_else(|| value.to_string()),
            other => coerce_to_string(other),
        };
        form = form.text(key.clone(), text);
    }
    for attachment in &payload.files {
        let part = Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
        form = form.part(attachment.field.clone(), part);
    }
    form
}

/// Accepts `{ token, user }` or the same wrapped in `data`
pub fn parse_login_body(body: Value) -> Result<LoginResponse> {
    let root = match body.get("data") {
        Some(data @ Value::Object(_)) if data.get("token").is_some() => data.clone(),
        _ => body,
    };
    let token = root
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AdminError::Auth("login response did not include a token".to_string()))?
        .to_string();
    let user = root.get("user").cloned().unwrap_or_else(|| json!({}));
    Ok(LoginResponse { token, user })
}

impl EntityBackend for ApiClient {
    async fn list(&self, spec: &EntitySpec) -> Result<Vec<Value>> {
        self.fetch_list(spec.endpoint).await
    }

    async fn create(&self, spec: &EntitySpec, payload: &Payload) -> Result<()> {
        let url = self.endpoint_url(&[spec.endpoint])?;
        tracing::debug!("POST {url} (multipart: {})", spec.is_multipart());
        let builder = self.with_payload(self.authorized(self.client.post(url))?, spec, payload);
        self.send_checked(builder).await?;
        Ok(())
    }

    async fn update(&self, spec: &EntitySpec, id: &str, payload: &Payload) -> Result<()> {
        let url = self.endpoint_url(&[spec.endpoint, id])?;
        tracing::debug!("PUT {url} (multipart: {})", spec.is_multipart());
        let builder = self.with_payload(self.authorized(self.client.put(url))?, spec, payload);
        self.send_checked(builder).await?;
        Ok(())
    }

    async fn delete(&self, spec: &EntitySpec, id: &str) -> Result<()> {
        let url = self.endpoint_url(&[spec.endpoint, id])?;
        tracing::debug!("DELETE {url}");
        self.send_checked(self.authorized(self.client.delete(url))?)
            .await?;
        Ok(())
    }

    /// Always JSON, even for entities whose full writes are multipart
    async fn patch(&self, spec: &EntitySpec, id: &str, fields: &Map<String, Value>) -> Result<()> {
        let url = self.endpoint_url(&[spec.endpoint, id])?;
        tracing::debug!("PUT {url} (patch)");
        self.send_checked(self.authorized(self.client.put(url))?.json(fields))
            .await?;
        Ok(())
    }
}

//! Supabase HTTP client.
//!
//! Tables go through `PostgREST` (`/rest/v1`), accounts through `GoTrue`
//! (`/auth/v1`) and files through Storage (`/storage/v1`). Every request
//! carries the project API key.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::{AuthSession, AuthUser, Backend, BackendError, Filter, Query};
use crate::config::SupabaseConfig;

/// Client for a Supabase project.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

/// Error body shapes used by the different Supabase services.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Sign-up answers with a bare user, or with a session when email
/// confirmation is disabled for the project.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                base_url: config.url.as_str().trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(Url::parse(&format!("{}/{path}", self.inner.base_url))?)
    }

    fn rest_url(&self, table: &str, pairs: &[(String, String)]) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{table}"))?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Start a request authorized with the project key.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request_as(method, url, self.inner.api_key.expose_secret())
    }

    /// Start a request authorized with an arbitrary bearer token.
    fn request_as(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header("apikey", self.inner.api_key.expose_secret())
            .bearer_auth(bearer)
    }

    /// Send a request and return the response body.
    async fn execute(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| body.chars().take(200).collect());

            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Supabase returned non-success status"
            );

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(BackendError::Unauthorized(message));
            }
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse Supabase response"
            );
            BackendError::Parse(e)
        })
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    fn backend_tag(&self) -> &'static str {
        "supabase"
    }

    #[instrument(skip(self, query), fields(table = %table))]
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let url = self.rest_url(table, &query.to_query_pairs())?;
        let rows: Vec<Value> = self.execute_json(self.request(Method::GET, url)).await?;
        debug!(rows = rows.len(), "Selected rows");
        Ok(rows)
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        let url = self.rest_url(table, &[])?;
        let rows: Vec<Value> = self
            .execute_json(
                self.request(Method::POST, url)
                    .header("Prefer", "return=representation")
                    .json(&row),
            )
            .await?;

        rows.into_iter().next().ok_or_else(|| BackendError::Rejected {
            status: 200,
            message: format!("insert into {table} returned no row"),
        })
    }

    #[instrument(skip(self, filter, patch), fields(table = %table))]
    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.rest_url(table, &filter.to_query_pairs())?;
        let rows: Vec<Value> = self
            .execute_json(
                self.request(Method::PATCH, url)
                    .header("Prefer", "return=representation")
                    .json(&patch),
            )
            .await?;
        debug!(rows = rows.len(), "Updated rows");
        Ok(rows)
    }

    #[instrument(skip(self, filter), fields(table = %table))]
    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64, BackendError> {
        let url = self.rest_url(table, &filter.to_query_pairs())?;
        let rows: Vec<Value> = self
            .execute_json(
                self.request(Method::DELETE, url)
                    .header("Prefer", "return=representation"),
            )
            .await?;
        Ok(rows.len() as u64)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response: SignUpResponse = self
            .execute_json(self.request(Method::POST, url).json(&json!({
                "email": email,
                "password": password.expose_secret(),
            })))
            .await?;

        Ok(match response {
            SignUpResponse::Session(session) => session.user,
            SignUpResponse::User(user) => user,
        })
    }

    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        self.execute_json(self.request(Method::POST, url).json(&json!({
            "email": email,
            "password": password.expose_secret(),
        })))
        .await
    }

    #[instrument(skip_all)]
    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        self.execute_json(self.request_as(Method::GET, url, access_token))
            .await
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{bucket}/{path}"))?;
        self.execute(
            self.request(Method::POST, url)
                .header("Content-Type", content_type)
                .body(bytes),
        )
        .await?;
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.inner.base_url
        )
    }

    #[instrument(skip(self))]
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{bucket}"))?;
        self.execute(
            self.request(Method::DELETE, url)
                .json(&json!({ "prefixes": paths })),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: Url::parse("https://abcd.supabase.co/").unwrap(),
            api_key: SecretString::from("k3Y-Zx81QpL0v7TnW2mR"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_rest_url_encodes_filters() {
        let query = Query::all().eq("user_email", "01012345678@rockygym.com");
        let url = client().rest_url("users_subscription", &query.to_query_pairs()).unwrap();
        assert_eq!(url.path(), "/rest/v1/users_subscription");
        assert_eq!(
            url.query(),
            Some("select=*&user_email=eq.01012345678%40rockygym.com")
        );
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            client().public_url("profiles", "u1/a.png"),
            "https://abcd.supabase.co/storage/v1/object/public/profiles/u1/a.png"
        );
    }

    #[test]
    fn test_error_body_message_precedence() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"msg":"Invalid login credentials","error":"invalid_grant"}"#)
                .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Invalid login credentials")
        );
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let user = r#"{"id":"5f0c8a64-2a4a-4d3e-9d55-1a8f2c8b9f10","email":"01012345678@rockygym.com","created_at":"2026-01-05T10:00:00Z"}"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(user).unwrap(),
            SignUpResponse::User(_)
        ));

        let session = format!(r#"{{"access_token":"t","token_type":"bearer","user":{user}}}"#);
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(&session).unwrap(),
            SignUpResponse::Session(_)
        ));
    }
}

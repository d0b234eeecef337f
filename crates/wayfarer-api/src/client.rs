//! HTTP client for the travel-plans API.
//!
//! Every call goes through [`ApiClient::execute`], which owns header
//! handling and failure normalisation. Endpoint-specific methods live in
//! [`crate::endpoints`] and only shape parameters.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::error::{self, ApiError};
use crate::models::{AuthResponse, Credentials, User};
use crate::session::Session;

/// Client bound to one base URL and one [`Session`].
///
/// Callers never set `Content-Type` or `Authorization`; both are attached
/// here on every request.
#[derive(Debug)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Session) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            session,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Issue a request and decode the JSON response body into `T`.
    ///
    /// `endpoint` is relative to the configured base URL. An empty success
    /// body decodes as JSON `null`.
    pub async fn request<T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let body = body.map(|b| serde_json::to_vec(&b)).transpose()?;
        let (status, value) = self.execute(method, endpoint, &[], body).await?;
        decode(status, endpoint, value)
    }

    pub(crate) async fn get<T>(&self, endpoint: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.get_with_query(endpoint, &[]).await
    }

    pub(crate) async fn get_with_query<T>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let (status, value) = self.execute(Method::GET, endpoint, query, None).await?;
        decode(status, endpoint, value)
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(body)?;
        let (status, value) = self.execute(method, endpoint, &[], Some(body)).await?;
        decode(status, endpoint, value)
    }

    /// Send one request and return the status with the parsed body.
    ///
    /// Non-success statuses become [`ApiError::Request`] (or
    /// [`ApiError::Decode`] when the error body is not JSON). Every failure
    /// is logged here.
    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, serde_json::Value), ApiError> {
        let url = self.config.url_for(endpoint);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        debug!(%method, endpoint, "sending request");

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                error!(%method, endpoint, error = %e, "API request could not be sent");
                return Err(ApiError::Network(e));
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                error!(%method, endpoint, %status, error = %e, "failed to read API response");
                return Err(ApiError::Network(e));
            }
        };

        if !status.is_success() {
            let err = error::from_error_body(status, &bytes);
            error!(%method, endpoint, %status, error = %err, "API request failed");
            return Err(err);
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok((status, serde_json::Value::Null));
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok((status, value)),
            Err(e) => {
                error!(%method, endpoint, %status, error = %e, "API response is not JSON");
                Err(ApiError::Decode {
                    status,
                    message: e.to_string(),
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Session operations
    // -----------------------------------------------------------------------

    /// Exchange credentials for a token.
    ///
    /// On success the token and user are stored in the session (memory and
    /// persisted storage) before returning.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let credentials = Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let response: AuthResponse = self
            .send_json(Method::POST, "/auth/login", &credentials)
            .await?;

        self.session
            .establish(response.token.clone(), response.user.clone())?;
        debug!(user_id = %response.user.id, "logged in");
        Ok(response)
    }

    /// Drop the session locally. No request is sent.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.session.clear()?;
        debug!("logged out");
        Ok(())
    }

    /// The user recorded at login, without contacting the server.
    pub fn cached_user(&self) -> Option<&User> {
        self.session.user()
    }
}

fn decode<T>(status: StatusCode, endpoint: &str, value: serde_json::Value) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|e| {
        error!(endpoint, %status, error = %e, "unexpected API response shape");
        ApiError::Decode {
            status,
            message: e.to_string(),
        }
    })
}

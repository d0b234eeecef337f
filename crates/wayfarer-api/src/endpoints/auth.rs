//! Endpoint methods for account creation and the current user.
//!
//! Login and logout touch the session and live on the client itself.

use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{NewUser, User};

impl ApiClient {
    /// Create an account. Does not log in.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> Result<User, ApiError> {
        let body = NewUser {
            email: email.to_owned(),
            name: name.to_owned(),
            password: password.to_owned(),
        };
        self.send_json(Method::POST, "/users", &body).await
    }

    /// Ask the server who the current token belongs to.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }
}

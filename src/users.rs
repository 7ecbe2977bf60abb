//! User accounts — registration, login, profile.
//!
//! Token handling is the caller's: install `AuthResponse::token` into the
//! session's [`SessionCredentials`] after a successful login or
//! registration.
//!
//! [`SessionCredentials`]: crate::client::SessionCredentials

use std::sync::Arc;

use crate::client::{ApiClient, ApiError};
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, User};

pub struct UserService {
    client: Arc<ApiClient>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST /users/register` — create an account, returning the profile
    /// and a fresh bearer token.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post_json("/users/register", request).await
    }

    /// `POST /users/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.client.post_json("/users/login", &request).await
    }

    /// `GET /users/profile` for the authenticated user.
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.client.get_json("/users/profile").await
    }
}

//! Authentication and profile calls

use serde_json::json;

use crate::error::Result;
use crate::gateway::{ApiGateway, ResponseEnvelope};
use crate::models::{ProfileUpdate, RecordId, User};
use crate::validation::{validate_login, RegistrationForm};

pub struct AuthApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> AuthApi<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// `POST /api/auth/login`; establishes the session on success
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        validate_login(email, password)?;
        let response = self
            .gateway
            .post(
                "/api/auth/login",
                &json!({ "email": email.trim(), "password": password }),
            )
            .await?;
        self.establish(&response)
    }

    /// `POST /api/auth/register`; establishes the session on success
    pub async fn register(&self, form: &RegistrationForm) -> Result<User> {
        let body = form.validate()?;
        let response = self.gateway.post("/api/auth/register", &body).await?;
        self.establish(&response)
    }

    fn establish(&self, response: &ResponseEnvelope) -> Result<User> {
        let token: String = response.field("token")?;
        let user: User = response.field("user")?;
        self.gateway.session().establish(token, user.clone());
        Ok(user)
    }

    pub async fn profile(&self) -> Result<User> {
        self.gateway.get("/api/auth/profile").await?.field("user")
    }

    /// `PUT /api/auth/profile`; the returned user replaces the session's copy
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let user: User = self
            .gateway
            .put("/api/auth/profile", update)
            .await?
            .field("user")?;
        self.gateway.session().set_user(Some(user.clone()));
        Ok(user)
    }

    /// Another user's public profile
    pub async fn public_profile(&self, user_id: RecordId) -> Result<User> {
        self.gateway
            .get(format!("/api/auth/users/{user_id}"))
            .await?
            .field("user")
    }

    pub async fn verify_token(&self) -> Result<bool> {
        Ok(self
            .gateway
            .get("/api/auth/verify-token")
            .await?
            .success_flag())
    }

    /// Forget the session locally. The service keeps no logout state.
    pub fn logout(&self) {
        self.gateway.session().clear();
    }
}

//! Login, registration and logout flows.
//!
//! The client only reports tokens; these flows are where a token is written
//! to or removed from the session.

use crate::client::ClearMindClient;
use crate::error::Result;
use crate::models::{AuthResponse, RegisterRequest};
use crate::routes::Route;
use crate::session::Session;
use crate::validation::{validate_registration, RegisterForm};

/// Fallback inline message for auth failures without a backend detail.
pub const AUTH_FAILURE: &str = "Authentication failed";

/// Where to go after a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub response: AuthResponse,
    pub next: Route,
}

pub async fn login(
    client: &ClearMindClient,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<SignedIn> {
    let response = client.login(email, password).await.map_err(|e| {
        tracing::warn!(error = %e, "Login failed");
        e
    })?;
    session.set_token(&response.access_token)?;
    Ok(SignedIn {
        response,
        next: Route::Dashboard,
    })
}

/// Validate locally first; an invalid form never reaches the network.
pub async fn register(
    client: &ClearMindClient,
    session: &Session,
    form: &RegisterForm,
) -> Result<SignedIn> {
    validate_registration(form)?;

    let body = RegisterRequest {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        name: form.name.trim().to_string(),
    };
    let response = client.register(&body).await.map_err(|e| {
        tracing::warn!(error = %e, "Registration failed");
        e
    })?;
    session.set_token(&response.access_token)?;
    Ok(SignedIn {
        response,
        next: Route::Onboarding,
    })
}

pub fn logout(session: &Session) -> Result<Route> {
    session.clear()?;
    Ok(Route::Landing)
}

//! Auth API (GoTrue) implementation of [`IdentityProvider`].

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use secrecy::SecretString;
use tracing::{debug, instrument};

use super::SupabaseClient;
use super::types::{GoTrueError, PasswordCredentials, SignUpResponse, TokenResponse};
use crate::store::{AuthError, AuthSession, AuthUser, IdentityProvider, StoreError};

async fn read_error(response: Response) -> (u16, GoTrueError, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str(&body).unwrap_or_default();
    (status, parsed, body)
}

fn provider_error(status: u16, parsed: &GoTrueError, body: String) -> AuthError {
    AuthError::Provider {
        status,
        message: parsed.message().map_or(body, ToOwned::to_owned),
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.auth("token")?)
            .query(&[("grant_type", "password")])
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, parsed, body) = read_error(response).await;
            debug!(status, code = ?parsed.error_code, "Sign-in rejected");
            return Err(match (status, parsed.error_code.as_deref()) {
                (_, Some("invalid_credentials")) | (400, None) => AuthError::InvalidCredentials,
                (_, Some("email_not_confirmed")) => {
                    AuthError::Validation("Please confirm your email before signing in".into())
                }
                _ => provider_error(status, &parsed, body),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(AuthSession {
            user: AuthUser {
                id: token.user.id,
                email: token.user.email.unwrap_or_else(|| email.to_owned()),
            },
            access_token: SecretString::from(token.access_token),
        })
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .post(self.auth("signup")?)
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, parsed, body) = read_error(response).await;
            debug!(status, code = ?parsed.error_code, "Sign-up rejected");
            let already_registered = parsed.error_code.as_deref() == Some("user_already_exists")
                || parsed
                    .message()
                    .is_some_and(|m| m.to_lowercase().contains("already registered"));
            return Err(if already_registered {
                AuthError::UserAlreadyExists
            } else if matches!(status, 400 | 422) {
                AuthError::Validation(
                    parsed
                        .message()
                        .unwrap_or("Registration was rejected")
                        .to_owned(),
                )
            } else {
                provider_error(status, &parsed, body)
            });
        }

        let user = response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?
            .into_user();

        Ok(AuthUser {
            id: user.id,
            email: user.email.unwrap_or_else(|| email.to_owned()),
        })
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.auth("logout")?)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        // An expired token is as good as revoked.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }

        let (status, parsed, body) = read_error(response).await;
        Err(provider_error(status, &parsed, body))
    }
}

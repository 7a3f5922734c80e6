//! Visitor account service.
//!
//! Email/password sign-in and registration against the hosted identity
//! provider. Signed-in visitors see full search result pages; nothing else on
//! the site depends on it. This is unrelated to the admin gate.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::models::{CurrentUser, UserProfile};
use crate::store::{AuthError, IdentityProvider, LeadStore};

/// Sign-in form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form.
#[derive(Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("full_name", &self.full_name)
            .field("company_name", &self.company_name)
            .field("email", &self.email)
            .field("mobile", &self.mobile)
            .finish_non_exhaustive()
    }
}

fn require(value: &str, label: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{label} is required")));
    }
    Ok(())
}

/// Visitor sign-in, registration and sign-out.
#[derive(Clone)]
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn LeadStore>,
}

impl AccountService {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn LeadStore>) -> Self {
        Self { identity, profiles }
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for blank fields and
    /// `AuthError::InvalidCredentials` for a wrong email or password.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Result<CurrentUser, AuthError> {
        require(&form.email, "Email")?;
        require(&form.password, "Password")?;

        let session = self
            .identity
            .sign_in(form.email.trim(), &form.password)
            .await?;
        info!(user_id = %session.user.id, "Visitor signed in");

        Ok(CurrentUser::new(
            session.user.id,
            session.user.email,
            session.access_token.expose_secret().to_owned(),
        ))
    }

    /// Revoke the visitor's provider session. Failures are logged only; the
    /// local session is cleared regardless.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn logout(&self, user: &CurrentUser) {
        if let Err(e) = self.identity.sign_out(user.access_token()).await {
            warn!(error = %e, "Failed to revoke provider session");
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create an account and write its profile row.
    ///
    /// The provider may require email verification before the new account can
    /// sign in, so registration does not sign the visitor in.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` for blank fields or mismatched passwords
    /// - `AuthError::UserAlreadyExists` if the email is registered
    /// - `AuthError::Store` if the profile row cannot be written
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<UserProfile, AuthError> {
        require(&form.full_name, "Full name")?;
        require(&form.company_name, "Company name")?;
        require(&form.email, "Email")?;
        require(&form.mobile, "Mobile")?;
        require(&form.password, "Password")?;
        if form.password != form.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        let email = form.email.trim();
        let user = self.identity.sign_up(email, &form.password).await?;
        info!(user_id = %user.id, "Visitor registered");

        let profile = UserProfile {
            company_name: form.company_name.trim().to_owned(),
            full_name: form.full_name.trim().to_owned(),
            email: email.to_owned(),
            mobile: form.mobile.trim().to_owned(),
        };
        self.profiles.create_user_profile(&profile).await?;

        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryBackend;

    fn service(backend: &Arc<MemoryBackend>) -> AccountService {
        AccountService::new(backend.clone(), backend.clone())
    }

    fn registration() -> RegistrationForm {
        RegistrationForm {
            full_name: "Priya Shah".to_string(),
            company_name: "Shah Pharma".to_string(),
            email: "priya@example.test".to_string(),
            mobile: "+91 98 0000 0000".to_string(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let backend = Arc::new(MemoryBackend::new());
        let service = service(&backend);

        service.register(&registration()).await.unwrap();
        assert_eq!(backend.profiles().len(), 1);

        let user = service
            .login(&LoginForm {
                email: "priya@example.test".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.email, "priya@example.test");
        assert!(backend.is_token_active(user.access_token()));

        service.logout(&user).await;
        assert!(!backend.is_token_active(user.access_token()));
    }

    #[tokio::test]
    async fn test_register_password_mismatch() {
        let backend = Arc::new(MemoryBackend::new());
        let mut form = registration();
        form.confirm_password = "something else".to_string();

        let result = service(&backend).register(&form).await;
        assert!(matches!(result, Err(AuthError::Validation(m)) if m == "Passwords do not match"));
        assert!(backend.profiles().is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let backend = Arc::new(MemoryBackend::new());
        backend.add_user("priya@example.test", "whatever");

        let result = service(&backend).register(&registration()).await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let backend = Arc::new(MemoryBackend::new());
        backend.add_user("sam@example.test", "right");

        let result = service(&backend)
            .login(&LoginForm {
                email: "sam@example.test".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_registration_debug_hides_password() {
        let debug = format!("{:?}", registration());
        assert!(!debug.contains("correct horse"));
    }
}

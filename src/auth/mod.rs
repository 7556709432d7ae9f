use std::sync::Arc;

use log::{ info, warn };
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::backend::{ BackendClient, BackendError };
use crate::store::{ keys, ProfileStore, StoreError };

/// Shape a well-formed address must have: something@something.tld, no
/// whitespace on either side of the separators.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const GUEST_NAME: &str = "Guest";
pub const GUEST_EMAIL: &str = "No email";
pub const GUEST_STATUS: &str = "Not logged in";
pub const ACTIVE_STATUS: &str = "Active User";

const LOGIN_REJECTED: &str = "Invalid username or password.";
const LOGIN_UNREACHABLE: &str = "Server error. Make sure the backend is running.";

#[derive(Clone, Debug, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Client-side sign-up rejections; each carries the exact message shown
/// inline next to the form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignupError {
    #[error("Please enter username , email and password.")]
    MissingFields,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Signup(#[from] SignupError),

    /// Login rejection or backend unavailability, already reduced to the
    /// inline message the user sees. The form stays usable for retry.
    #[error("{0}")]
    Login(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the account/settings views display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub status: String,
}

impl Profile {
    pub fn guest() -> Self {
        Self {
            name: GUEST_NAME.to_string(),
            email: GUEST_EMAIL.to_string(),
            status: GUEST_STATUS.to_string(),
        }
    }
}

/// Validation runs before any network or store access; each failure is a
/// distinct literal message and none are fatal.
pub fn validate_signup(form: &SignupForm) -> Result<(), SignupError> {
    if form.username.is_empty() || form.email.is_empty() || form.password.is_empty() {
        return Err(SignupError::MissingFields);
    }
    if form.password != form.confirm_password {
        return Err(SignupError::PasswordMismatch);
    }
    if !EMAIL_RE.is_match(&form.email) {
        return Err(SignupError::InvalidEmail);
    }
    Ok(())
}

pub struct AuthService {
    store: Arc<dyn ProfileStore>,
    backend: Arc<dyn BackendClient>,
}

impl AuthService {
    pub fn new(store: Arc<dyn ProfileStore>, backend: Arc<dyn BackendClient>) -> Self {
        Self { store, backend }
    }

    /// Validates the form and persists the new credentials locally.
    pub async fn sign_up(&self, form: &SignupForm) -> Result<(), AuthError> {
        validate_signup(form)?;
        self.store.set(keys::USERNAME, &form.username).await?;
        self.store.set(keys::EMAIL, &form.email).await?;
        self.store.set(keys::PASSWORD, &form.password).await?;
        info!("signed up user {}", form.username);
        Ok(())
    }

    /// Exchanges credentials with the backend. A rejection surfaces the
    /// response body's detail string when present, otherwise a fixed
    /// message; transport failures get their own fixed message.
    pub async fn login(&self, username: &str, password: &str) -> Result<Profile, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Login(
                "Please enter username and password.".to_string(),
            ));
        }

        match self.backend.login(username, password).await {
            Ok(success) => {
                let email = success
                    .email
                    .unwrap_or_else(|| format!("{}@example.com", username));
                self.store.set(keys::USER_EMAIL, &email).await?;
                self.store.set(keys::USERNAME, username).await?;
                info!("logged in as {}", username);
                self.profile().await.map_err(AuthError::Store)
            }
            Err(BackendError::Rejected { detail, .. }) => {
                Err(AuthError::Login(detail.unwrap_or_else(|| LOGIN_REJECTED.to_string())))
            }
            Err(BackendError::Transport(err)) => {
                warn!("login request failed: {}", err);
                Err(AuthError::Login(LOGIN_UNREACHABLE.to_string()))
            }
        }
    }

    /// Derives the displayed profile from the store; an empty store reads
    /// as the guest triple.
    pub async fn profile(&self) -> Result<Profile, StoreError> {
        let name = self
            .store
            .get(keys::USERNAME)
            .await?
            .unwrap_or_else(|| GUEST_NAME.to_string());
        let email = self
            .store
            .get(keys::EMAIL)
            .await?
            .unwrap_or_else(|| GUEST_EMAIL.to_string());
        let status = if self.store.get(keys::PASSWORD).await?.is_some() {
            ACTIVE_STATUS.to_string()
        } else {
            GUEST_STATUS.to_string()
        };
        Ok(Profile { name, email, status })
    }

    /// Clears all stored credentials; the profile reverts to guest.
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.store.clear().await?;
        info!("logged out, local data cleared");
        Ok(())
    }
}

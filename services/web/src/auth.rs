//! Credential verification

use tracing::{info, warn};

use crate::error::AppError;
use crate::models::Principal;
use crate::repositories::UserRepository;

/// Verifies submitted credentials against the credential store
#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
}

impl Authenticator {
    /// Create a new authenticator
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Authenticate an email/password pair.
    ///
    /// An unknown email and a wrong password fail with the same
    /// `InvalidCredentials` value so a caller cannot tell whether an
    /// account exists. Both paths leave an audit trail carrying the
    /// normalized email and the internal reason; password material is never
    /// logged.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AppError> {
        let email = email.trim().to_lowercase();

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("Login failed for {}: unknown email", email);
            return Err(AppError::InvalidCredentials);
        };

        if !self.users.verify_password(&user, password)? {
            warn!("Login failed for {}: password mismatch", email);
            return Err(AppError::InvalidCredentials);
        }

        info!("Login succeeded for {}", email);
        Ok(Principal::from(&user))
    }
}

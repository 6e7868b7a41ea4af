use crate::error::InputError;
use std::fmt;
use zeroize::Zeroizing;

/// Environment variables consulted for the API key, in priority order.
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["ITINERA_API_KEY", "OPENAI_API_KEY"];

/// An API key scoped to one session.
///
/// The secret is zeroized when the last copy is dropped. Revoking a session
/// drops the registry's copy; a provider already built from a clone keeps its
/// own until the run ends. The process environment is never touched.
#[derive(Clone)]
pub struct SessionCredential {
    secret: Zeroizing<String>,
}

impl SessionCredential {
    pub fn new(secret: impl Into<String>) -> Result<Self, InputError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(InputError::MissingCredential {
                var: CREDENTIAL_ENV_VARS[1],
            });
        }
        Ok(Self {
            secret: Zeroizing::new(secret.trim().to_string()),
        })
    }

    /// Read the key from the process environment.
    pub fn from_env() -> Result<Self, InputError> {
        let secret = CREDENTIAL_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .ok_or(InputError::MissingCredential {
                var: CREDENTIAL_ENV_VARS[1],
            })?;
        Self::new(secret)
    }

    pub fn expose(&self) -> &str {
        &self.secret
    }

    /// `"Bearer <key>"`, itself zeroized on drop.
    pub fn bearer_header(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("Bearer {}", self.secret.as_str()))
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

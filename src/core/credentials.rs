//! API access credentials

use crate::core::errors::{LaraError, Result};

/// Immutable access key pair used to sign requests.
///
/// The secret never travels over the wire; only the key id is sent, inside
/// the `Authorization` header next to the computed signature.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Public access key identifier
    pub access_key_id: String,
    /// Secret used to key the request signature
    pub access_key_secret: String,
}

impl Credentials {
    /// Create credentials from an access key pair
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }

    /// Load credentials from the `LARA_ACCESS_KEY_ID` and
    /// `LARA_ACCESS_KEY_SECRET` environment variables
    pub fn from_env() -> Result<Self> {
        let access_key_id = std::env::var("LARA_ACCESS_KEY_ID").map_err(|_| {
            LaraError::InvalidInput {
                message: "LARA_ACCESS_KEY_ID environment variable is required".to_string(),
            }
        })?;

        let access_key_secret = std::env::var("LARA_ACCESS_KEY_SECRET").map_err(|_| {
            LaraError::InvalidInput {
                message: "LARA_ACCESS_KEY_SECRET environment variable is required".to_string(),
            }
        })?;

        Ok(Self {
            access_key_id,
            access_key_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_creation() {
        let credentials = Credentials::new("my-key-id", "my-key-secret");
        assert_eq!(credentials.access_key_id, "my-key-id");
        assert_eq!(credentials.access_key_secret, "my-key-secret");
    }
}

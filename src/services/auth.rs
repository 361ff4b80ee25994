//! Credential verification seam for the login endpoint.

use std::env;

/// Checks a username/password pair.
///
/// Returns the user's full name on success.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> Option<String>;
}

/// A single fixed account, for demos and tests
#[derive(Clone)]
pub struct StaticCredentials {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password123".to_string(),
            full_name: "Administrator".to_string(),
        }
    }
}

impl StaticCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            full_name: full_name.into(),
        }
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            username: env::var("FACECONTROL_DEMO_USERNAME").unwrap_or(defaults.username),
            password: env::var("FACECONTROL_DEMO_PASSWORD").unwrap_or(defaults.password),
            full_name: env::var("FACECONTROL_DEMO_FULLNAME").unwrap_or(defaults.full_name),
        }
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<String> {
        (username == self.username && password == self.password).then(|| self.full_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials() {
        let creds = StaticCredentials::new("jane", "s3cret", "Jane Doe");
        assert_eq!(creds.verify("jane", "s3cret").as_deref(), Some("Jane Doe"));
        assert_eq!(creds.verify("jane", "wrong"), None);
        assert_eq!(creds.verify("john", "s3cret"), None);
    }
}

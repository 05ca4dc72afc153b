use std::fmt;

use crate::VitalsError;

/// Environment variable holding the account identifier.
pub const ACCOUNT_ID_ENV: &str = "WELLNESS_ACCOUNT_ID";
/// Environment variable holding the account secret.
pub const ACCOUNT_SECRET_ENV: &str = "WELLNESS_ACCOUNT_SECRET";

/// The single credential pair a deployment logs in with.
///
/// Fixed for the lifetime of the process. `Debug` redacts the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identifier: String,
    secret: String,
}

impl Credentials {
    /// Construct credentials from an identifier and a secret.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Read [`ACCOUNT_ID_ENV`] and [`ACCOUNT_SECRET_ENV`] from the process environment.
    ///
    /// # Errors
    /// Returns `VitalsError::Configuration` naming every missing or empty variable.
    pub fn from_env() -> Result<Self, VitalsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `VitalsError::Configuration` naming every missing or empty variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VitalsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        match (read(ACCOUNT_ID_ENV), read(ACCOUNT_SECRET_ENV)) {
            (Some(identifier), Some(secret)) => Ok(Self { identifier, secret }),
            (id, secret) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push(ACCOUNT_ID_ENV);
                }
                if secret.is_none() {
                    missing.push(ACCOUNT_SECRET_ENV);
                }
                Err(VitalsError::missing_credentials(&missing))
            }
        }
    }

    /// Account identifier (user name or email).
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Account secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn resolves_both_variables() {
        let vars = env(&[(ACCOUNT_ID_ENV, "me@example.com"), (ACCOUNT_SECRET_ENV, "pw")]);
        let creds = Credentials::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(creds.identifier(), "me@example.com");
        assert_eq!(creds.secret(), "pw");
    }

    #[test]
    fn empty_values_count_as_missing() {
        let vars = env(&[(ACCOUNT_ID_ENV, "me@example.com"), (ACCOUNT_SECRET_ENV, "  ")]);
        let err = Credentials::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing credentials"), "{msg}");
        assert!(msg.contains(ACCOUNT_SECRET_ENV), "{msg}");
        assert!(!msg.contains(ACCOUNT_ID_ENV), "{msg}");
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials::new("me", "hunter2");
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}

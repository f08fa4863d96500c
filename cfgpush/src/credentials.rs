//! Operator credentials shared by every session in a run.

use secrecy::SecretString;

/// Login and enable credentials.
///
/// Entered once at startup and only ever borrowed afterwards. `Debug` output
/// never contains the secrets.
#[derive(Debug)]
pub struct Credentials {
    username: String,
    password: SecretString,
    enable_secret: SecretString,
}

impl Credentials {
    /// Create credentials. An empty enable secret falls back to the password.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        enable_secret: impl Into<String>,
    ) -> Self {
        let password: String = password.into();
        let mut enable_secret: String = enable_secret.into();
        if enable_secret.is_empty() {
            enable_secret = password.clone();
        }

        Self {
            username: username.into(),
            password: SecretString::from(password),
            enable_secret: SecretString::from(enable_secret),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn enable_secret(&self) -> &SecretString {
        &self.enable_secret
    }
}

use std::env;

use crate::error::Error;
use crate::soap::Credentials;

pub const USERNAME_KEY: &str = "hosttech_username";
pub const PASSWORD_KEY: &str = "hosttech_password";

pub trait CredentialManager: Send + Sync {
    fn get(&self, key: &str) -> Result<String, Error>;

    fn credentials(&self) -> Result<Credentials, Error> {
        Ok(Credentials::new(self.get(USERNAME_KEY)?, self.get(PASSWORD_KEY)?))
    }
}

/// Reads `HOSTTECH_USERNAME` / `HOSTTECH_PASSWORD` from the environment.
pub struct EnvCredentialManager;

impl CredentialManager for EnvCredentialManager {
    fn get(&self, key: &str) -> Result<String, Error> {
        let var = key.to_uppercase();
        match env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::Credential(format!("{var} is not set"))),
        }
    }
}

/// Credentials given on the command line.
pub struct StaticCredentialManager {
    username: String,
    password: String,
}

impl StaticCredentialManager {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl CredentialManager for StaticCredentialManager {
    fn get(&self, key: &str) -> Result<String, Error> {
        match key {
            USERNAME_KEY => Ok(self.username.clone()),
            PASSWORD_KEY => Ok(self.password.clone()),
            _ => Err(Error::Credential(format!("Unknown key: {key}"))),
        }
    }
}

use std::path::PathBuf;

use crate::{error::AppError, management::JsonLog, types::Credential, utils};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Operator accounts. Passwords are stored as salted SHA-256 hashes.
pub struct UserStore {
    log: JsonLog<Credential>,
}

impl UserStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        Ok(Self {
            log: JsonLog::open(path).await?,
        })
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(), AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("username must not be empty".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let salt = utils::generate_salt();
        let credential = Credential {
            username: username.to_string(),
            password_hash: utils::hash_password(&salt, password),
            salt,
        };

        let stored = self
            .log
            .append_unless(credential, |c| c.username == username)
            .await?;
        if !stored {
            return Err(AppError::Validation(format!(
                "username '{}' is already taken",
                username
            )));
        }
        Ok(())
    }

    /// Returns the canonical username when the password matches.
    pub async fn verify(&self, username: &str, password: &str) -> Result<String, AppError> {
        let username = username.trim();
        let credential = self
            .log
            .find(|c| c.username == username)
            .await
            .ok_or(AppError::InvalidCredentials)?;

        if utils::verify_password(&credential.salt, password, &credential.password_hash) {
            Ok(credential.username)
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}

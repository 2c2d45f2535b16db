//! Credential file for the metrics endpoint.
//!
//! # Format
//! ```text
//! # comment
//! user:$2b$12$...bcrypt hash...
//! ```
//! Blank lines, `#` comments and lines that do not split into exactly two
//! `:`-separated fields are skipped. Both fields are trimmed.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("cannot open password file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// User name → bcrypt hash.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    users: HashMap<String, String>,
}

impl Credentials {
    pub fn parse(content: &str) -> Self {
        let users = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let parts: Vec<&str> = line.split(':').collect();
                match parts.as_slice() {
                    [user, hash] => Some((user.trim().to_string(), hash.trim().to_string())),
                    _ => None,
                }
            })
            .collect();
        Self { users }
    }

    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        fs::read_to_string(path)
            .map(|content| Self::parse(&content))
            .map_err(|source| CredentialsError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Load `path`; an unreadable file yields an empty set, which denies every request.
    pub fn load_or_empty(path: &Path) -> Self {
        if path.as_os_str().is_empty() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(credentials) => {
                tracing::info!(path = %path.display(), users = credentials.len(), "password file loaded");
                credentials
            }
            Err(e) => {
                tracing::warn!(error = %e, "metrics endpoint will reject all requests");
                Self::default()
            }
        }
    }

    /// Check `password` against the stored hash for `user`.
    pub fn verify(&self, user: &str, password: &str) -> bool {
        let Some(hash) = self.users.get(user).filter(|hash| !hash.is_empty()) else {
            return false;
        };
        match bcrypt::verify(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(user = %user, error = %e, "cannot compare hash");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// bcrypt hash of `password` for a credential file entry.
pub fn hash_password(password: &str) -> Result<String, CredentialsError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

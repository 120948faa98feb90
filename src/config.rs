//! EdgeOne Credential Configuration
//!
//! Credentials are loaded from the environment every time a client is built.
//! Nothing is cached, so rotating `TEO_SECRET_KEY` takes effect on the next
//! request without a restart.
//!
//! Expected env vars:
//! - TEO_SECRET_ID
//! - TEO_SECRET_KEY
//! - TEO_REGION
//! - TEO_ENDPOINT (optional, defaults to `teo.tencentcloudapi.com`)
//! - TEO_LANGUAGE (optional, `zh-CN` or `en-US`)
//! - TEO_REQUEST_TIMEOUT_SECS (optional, defaults to 60, must be positive)
//!
//! A `.env` file is read once at startup by `load_env_file`. Values already
//! present in the real environment win over the file.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::TeoError;

pub const ENV_SECRET_ID: &str = "TEO_SECRET_ID";
pub const ENV_SECRET_KEY: &str = "TEO_SECRET_KEY";
pub const ENV_REGION: &str = "TEO_REGION";
pub const ENV_ENDPOINT: &str = "TEO_ENDPOINT";
pub const ENV_LANGUAGE: &str = "TEO_LANGUAGE";
pub const ENV_REQUEST_TIMEOUT: &str = "TEO_REQUEST_TIMEOUT_SECS";

/// Public EdgeOne API host
pub const DEFAULT_ENDPOINT: &str = "teo.tencentcloudapi.com";

/// Per-call timeout, matching the vendor SDK default
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// API secret pair (SENSITIVE)
#[derive(Clone)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .finish()
    }
}

/// Everything needed to build one signed EdgeOne client
#[derive(Debug, Clone)]
pub struct TeoConfig {
    pub credential: Credential,
    pub region: String,
    /// Bare host (`teo.tencentcloudapi.com`) or full base URL (`http://127.0.0.1:8080`)
    pub endpoint: String,
    pub language: Option<String>,
    pub request_timeout: Duration,
}

impl TeoConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, TeoError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TeoError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(TeoError::MissingCredential(key));

        let request_timeout = match get(ENV_REQUEST_TIMEOUT) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| TeoError::InvalidConfig {
                    key: ENV_REQUEST_TIMEOUT,
                    value: raw,
                })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            credential: Credential {
                secret_id: require(ENV_SECRET_ID)?,
                secret_key: require(ENV_SECRET_KEY)?,
            },
            region: require(ENV_REGION)?,
            endpoint: get(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            language: get(ENV_LANGUAGE),
            request_timeout,
        })
    }
}

/// Load a `.env` file into the process environment.
///
/// `None` searches the working directory and its parents for `.env`. Returns
/// the file that was loaded; a missing or unreadable file is not an error.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|_| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

//! Authentication for the provider API.

use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};

/// Trait for managing authentication headers
pub trait AuthManager: Send + Sync {
    /// Get the authentication headers for a request
    fn get_headers(&self) -> HeaderMap;

    /// Validate the API key format
    fn validate_api_key(&self) -> Result<(), String>;
}

/// Bearer token authentication manager
pub struct BearerAuthManager {
    api_key: SecretString,
}

impl BearerAuthManager {
    /// Create a new bearer authentication manager
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }
}

impl AuthManager for BearerAuthManager {
    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let bearer = format!("Bearer {}", self.api_key.expose_secret());
        if let Ok(value) = bearer.parse() {
            headers.insert("authorization", value);
        }

        if let Ok(value) = "application/json".parse() {
            headers.insert("content-type", value);
        }

        headers
    }

    fn validate_api_key(&self) -> Result<(), String> {
        let key = self.api_key.expose_secret();

        if key.is_empty() {
            return Err("API key cannot be empty".to_string());
        }

        if !key.starts_with("sk-") {
            return Err("API key must start with 'sk-'".to_string());
        }

        if key.len() < 20 {
            return Err("API key is too short".to_string());
        }

        Ok(())
    }
}

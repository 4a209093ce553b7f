//! Server configuration - explicit settings for the HTTP transport
//!
//! Built once at startup and handed to the server, instead of the
//! transport reading process-global state.

use std::env;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Frontend origin allowed by CORS when none is configured.
const DEFAULT_ALLOWED_ORIGIN: &str = "https://excel-joiner-frontend.onrender.com";

/// Settings for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the TCP listener binds to
    pub bind_addr: String,

    /// Origin echoed in Access-Control-Allow-Origin
    pub allowed_origin: String,
}

impl ServerConfig {
    /// Build from environment variables, falling back to defaults.
    /// `JOINER_BIND_ADDR` and `JOINER_ALLOWED_ORIGIN` are honoured, with
    /// `.env` files loaded by the binary before this is called.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("JOINER_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            allowed_origin: env::var("JOINER_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.to_string()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.allowed_origin.starts_with("https://"));
    }
}

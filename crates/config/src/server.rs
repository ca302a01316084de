//! HTTP surface configuration: bind address and the shared-secret key
//! required on `X-Council-Key` for non-public routes.

use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` disables auth entirely — used for local development.
    pub api_key: Option<SecretString>,
}

impl ServerConfig {
    pub fn from_env(api_key: Option<String>) -> Self {
        let host = std::env::var("COUNCIL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("COUNCIL_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8787);

        Self {
            host,
            port,
            api_key: api_key.map(SecretString::from),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

use std::{sync::OnceLock, time::Duration};

use reqwest::Client;

/// Process-wide HTTP client, built once and cloned (cheap — internally
/// `Arc`-backed) by every adapter. Sharing one client keeps the connection
/// pool warm across providers instead of paying a fresh TLS handshake per
/// request.
pub fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT
        .get_or_init(|| {
            Client::builder()
                .timeout(Duration::from_secs(120))
                .pool_idle_timeout(Some(Duration::from_secs(5)))
                .tcp_nodelay(true)
                .tcp_keepalive(Some(Duration::from_secs(60)))
                .build()
                .expect("failed to build shared http client")
        })
        .clone()
}

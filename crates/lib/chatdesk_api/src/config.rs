//! API server configuration.

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// SQLite connection URL.
    pub database_url: String,
    /// JWT signing secret for session cookies.
    pub jwt_secret: String,
    /// Session lifetime in seconds.
    pub session_ttl_secs: i64,
    /// Mark the session cookie `Secure` (serve over HTTPS only).
    pub secure_cookies: bool,
}

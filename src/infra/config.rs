use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub cors_origin: HeaderValue,
    /// Base URL of the direct-debit gateway (OnePipe-compatible).
    pub gateway_base_url: Url,
    pub gateway_api_key: SecretString,
    /// Upper bound on a single gateway call; the charge path blocks on it.
    pub gateway_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());
        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 86_400);

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let gateway_base_url: Url = get_env("GATEWAY_BASE_URL");
        let gateway_api_key: SecretString =
            SecretString::new(get_env::<String>("GATEWAY_API_KEY").into());
        let gateway_timeout_secs: u64 = get_env_default("GATEWAY_TIMEOUT_SECS", 30);

        Self {
            bind_addr,
            database_url,
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            cors_origin,
            gateway_base_url,
            gateway_api_key,
            gateway_timeout_secs,
        }
    }
}

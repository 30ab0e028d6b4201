use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub store_auth: String,
    pub store_timeout_secs: u64,
    pub auth_login_url: String,
    pub auth_identity_url: String,
    pub auth_api_key: String,
    pub port: u16,
}

impl Config {
    pub fn init() -> Config {
        let store_url = env::var("STORE_URL").unwrap_or_else(|_| {
            panic!("🔒 STORE_URL environment variable must be set and non-empty!");
        });

        if store_url.is_empty() {
            panic!("🔒 STORE_URL cannot be empty!");
        }

        Config {
            store_url,
            store_auth: env::var("STORE_AUTH").unwrap_or_default(),
            store_timeout_secs: 10,
            auth_login_url: env::var("AUTH_LOGIN_URL").unwrap_or_default(),
            auth_identity_url: env::var("AUTH_IDENTITY_URL")
                .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string()),
            auth_api_key: env::var("AUTH_API_KEY").unwrap_or_default(),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(8080),
        }
    }
}

use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub responder_url: String,
    pub responder_api_key: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            responder_url: env::var("RESPONDER_URL").expect("RESPONDER_URL must be set"),
            responder_api_key: env::var("RESPONDER_API_KEY")
                .expect("RESPONDER_API_KEY must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

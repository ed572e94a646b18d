use dotenv::dotenv;

pub struct Config {
    pub bind_addr: String,
    pub api_base_url: String,
    pub watchlist_path: String,
    pub static_dir: String,
    pub cache_ttl_secs: u64,
    pub categories_ttl_secs: u64,
    pub http_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        Ok(Config {
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            api_base_url: std::env::var("COINGECKO_API_URL")
                .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string()),
            watchlist_path: std::env::var("WATCHLIST_PATH")
                .unwrap_or_else(|_| "./watchlist.json".to_string()),
            static_dir: std::env::var("STATIC_DIR")
                .unwrap_or_else(|_| "api/static".to_string()),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            categories_ttl_secs: std::env::var("CATEGORIES_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            http_timeout_ms: std::env::var("HTTP_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10000),
        })
    }
}

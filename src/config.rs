use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub youtube: YouTubeConfig,
    pub summarizer: SummarizerConfig,
    pub quota: QuotaConfig,
    pub billing: BillingConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider.
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeConfig {
    pub request_timeout_ms: u64,
    /// Preferred caption language code, e.g. "en".
    pub caption_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub request_timeout_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Transcript characters fed to the model per digest.
    pub transcript_char_budget: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// Lifetime free digests per user.
    pub free_allowance: i32,
    /// Credits granted per purchased pack.
    pub pack_size: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Shared secret the payment provider sends on fulfillment webhooks.
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub digest_requests_per_minute: u32,
    pub window_seconds: u32,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for environment variable overrides)
        dotenvy::dotenv().ok();

        // Build config from config.yml (required) with environment variable overrides
        let config = config::Config::builder()
            // Load config.yml (REQUIRED)
            .add_source(config::File::with_name("config").required(true))
            // Allow environment variables to override config file
            .add_source(
                config::Environment::with_prefix("PITCHDIGEST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

use crate::{
    config::Config,
    services::{
        DigestPipeline, DigestStore, OpenAiSummarizer, QuotaService, UserService,
        YouTubeTranscriptService,
    },
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: Arc<redis::Client>,
    pub user_service: Arc<UserService>,
    pub quota_service: Arc<QuotaService>,
    pub digest_store: Arc<DigestStore>,
    pub pipeline: Arc<DigestPipeline>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        // Connect to database
        let db = sea_orm::Database::connect(&config.database.url).await?;

        // Connect to Redis
        let redis = Arc::new(redis::Client::open(config.redis.url.as_str())?);

        // Initialize services
        let user_service = Arc::new(UserService::new(db.clone()));
        let quota_service = Arc::new(QuotaService::new(db.clone(), &config.quota));
        let digest_store = Arc::new(DigestStore::new(db.clone()));
        let transcripts = Arc::new(YouTubeTranscriptService::new(&config.youtube)?);
        let summarizer = Arc::new(OpenAiSummarizer::new(&config.summarizer)?);

        let pipeline = Arc::new(DigestPipeline::new(
            quota_service.clone(),
            digest_store.clone(),
            transcripts,
            summarizer,
            config.summarizer.transcript_char_budget,
        ));

        Ok(Self {
            db,
            redis,
            user_service,
            quota_service,
            digest_store,
            pipeline,
            config: Arc::new(config),
        })
    }
}

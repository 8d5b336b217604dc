// Service modules
pub mod digest_pipeline;
pub mod digest_store;
pub mod quota_service;
pub mod summarizer_service;
pub mod transcript_service;
pub mod user_service;
pub mod video_resolver;

pub use digest_pipeline::{DigestOutcome, DigestPipeline};
pub use digest_store::{CreateOutcome, DigestStore};
pub use quota_service::QuotaService;
pub use summarizer_service::{OpenAiSummarizer, Summarizer};
pub use transcript_service::{TranscriptProvider, YouTubeTranscriptService};
pub use user_service::UserService;
pub use video_resolver::VideoId;

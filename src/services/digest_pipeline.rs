//! Digest generation pipeline.
//!
//! Order of operations: resolve → cache lookup → quota pre-check →
//! transcript → summarize → debit → persist. A cache hit returns before any
//! quota touch, and the debit happens only once a markdown result exists,
//! so failed or duplicate requests are never charged.

use crate::{
    error::{ApiError, Result},
    models::quota::QuotaSnapshot,
    services::{
        digest_store::{CreateOutcome, DigestStore},
        quota_service::QuotaService,
        summarizer_service::{build_transcript_excerpt, Summarizer},
        transcript_service::TranscriptProvider,
        video_resolver,
    },
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

pub struct DigestPipeline {
    quota_service: Arc<QuotaService>,
    digest_store: Arc<DigestStore>,
    transcripts: Arc<dyn TranscriptProvider>,
    summarizer: Arc<dyn Summarizer>,
    transcript_char_budget: usize,
}

#[derive(Debug, Clone)]
pub struct DigestOutcome {
    pub video_id: String,
    pub video_title: String,
    pub markdown: String,
    pub quota: QuotaSnapshot,
    pub cached: bool,
}

impl DigestPipeline {
    pub fn new(
        quota_service: Arc<QuotaService>,
        digest_store: Arc<DigestStore>,
        transcripts: Arc<dyn TranscriptProvider>,
        summarizer: Arc<dyn Summarizer>,
        transcript_char_budget: usize,
    ) -> Self {
        Self {
            quota_service,
            digest_store,
            transcripts,
            summarizer,
            transcript_char_budget,
        }
    }

    #[instrument(skip(self, raw_input))]
    pub async fn run(&self, user_id: Uuid, raw_input: &str) -> Result<DigestOutcome> {
        let video_id = video_resolver::resolve(raw_input).ok_or_else(|| {
            ApiError::InvalidVideoReference(format!("Not a YouTube video reference: {raw_input}"))
        })?;

        // Idempotence: an existing digest is returned as-is, free of charge
        if let Some(existing) = self.digest_store.find(user_id, video_id.as_str()).await? {
            let quota = self.quota_service.get_quota(user_id).await?;
            info!("Cache hit for user {} video {}", user_id, video_id);
            return Ok(DigestOutcome {
                video_id: existing.video_id,
                video_title: existing.video_title,
                markdown: existing.markdown,
                quota,
                cached: true,
            });
        }

        // Cheap pre-check before any external call; the debit below
        // re-verifies atomically.
        let quota = self.quota_service.get_quota(user_id).await?;
        if quota.total_remaining <= 0 {
            return Err(ApiError::QuotaExceeded(
                "No digests remaining".to_string(),
            ));
        }

        let transcript = self.transcripts.fetch_transcript(&video_id).await?;

        let excerpt = build_transcript_excerpt(&transcript.segments, self.transcript_char_budget);
        let markdown = self
            .summarizer
            .summarize(&excerpt, &transcript.title)
            .await?;

        if markdown.trim().is_empty() {
            return Err(ApiError::AiProvider(
                "Summarizer returned empty output".to_string(),
            ));
        }

        // Charge only now that a result exists
        let quota = self.quota_service.debit_one(user_id).await?;

        match self
            .digest_store
            .create(user_id, video_id.as_str(), &transcript.title, &markdown)
            .await
        {
            Ok(CreateOutcome::Created(digest)) => {
                info!(
                    "Generated digest for user {} video {} ({} chars)",
                    user_id,
                    video_id,
                    digest.markdown.len()
                );
                Ok(DigestOutcome {
                    video_id: digest.video_id,
                    video_title: digest.video_title,
                    markdown: digest.markdown,
                    quota,
                    cached: false,
                })
            }
            Ok(CreateOutcome::AlreadyExists(digest)) => {
                // A concurrent request persisted first; serve its row
                warn!(
                    "Persistence race for user {} video {}; returning the stored digest",
                    user_id, video_id
                );
                Ok(DigestOutcome {
                    video_id: digest.video_id,
                    video_title: digest.video_title,
                    markdown: digest.markdown,
                    quota,
                    cached: true,
                })
            }
            Err(e) => {
                // The credit is already spent. Flag for manual reconciliation.
                error!(
                    user_id = %user_id,
                    video_id = %video_id,
                    "RECONCILIATION: digest persistence failed after a successful debit: {e}"
                );
                Err(e)
            }
        }
    }
}

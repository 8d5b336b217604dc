//! Caption and title retrieval for YouTube videos.
//!
//! The watch page embeds a `captionTracks` list whose `baseUrl` serves the
//! caption track; fetching it with `fmt=json3` yields timed events. Videos
//! without that list have no captions, which is a stable client-visible
//! condition, not a transient failure. Titles come from the official oEmbed
//! endpoint and are best-effort only.

use crate::{
    config::YouTubeConfig,
    error::{ApiError, Result},
    services::video_resolver::VideoId,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct TranscriptSegment {
    pub start_seconds: f64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct VideoTranscript {
    pub segments: Vec<TranscriptSegment>,
    pub title: String,
}

/// External transcript boundary. `TranscriptUnavailable` means the video has
/// no captions; any other error is a transient provider failure.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<VideoTranscript>;
}

pub struct YouTubeTranscriptService {
    http_client: reqwest::Client,
    caption_language: String,
}

#[derive(Debug, Deserialize)]
struct CaptionEvents {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
struct CaptionEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(default)]
    segs: Vec<CaptionSeg>,
}

#[derive(Debug, Deserialize)]
struct CaptionSeg {
    #[serde(default)]
    utf8: String,
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
}

impl YouTubeTranscriptService {
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            caption_language: config.caption_language.clone(),
        })
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        let response = self
            .http_client
            .get(&watch_url)
            .send()
            .await
            .map_err(|e| ApiError::TranscriptProvider(format!("watch page request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::TranscriptProvider(format!(
                "watch page returned status {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::TranscriptProvider(format!("watch page body read failed: {e}")))
    }

    async fn fetch_caption_events(&self, base_url: &str) -> Result<CaptionEvents> {
        let track_url = format!("{base_url}&fmt=json3");
        let response = self
            .http_client
            .get(&track_url)
            .send()
            .await
            .map_err(|e| {
                ApiError::TranscriptProvider(format!("caption track request failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(ApiError::TranscriptProvider(format!(
                "caption track returned status {}",
                response.status()
            )));
        }

        response.json::<CaptionEvents>().await.map_err(|e| {
            ApiError::TranscriptProvider(format!("caption track parse failed: {e}"))
        })
    }

    /// Best-effort title lookup; a missing title degrades to a placeholder
    /// instead of failing the whole request.
    async fn fetch_title(&self, video_id: &VideoId) -> String {
        let oembed_url = format!(
            "https://www.youtube.com/oembed?url=https://www.youtube.com/watch?v={video_id}&format=json"
        );

        let result = async {
            self.http_client
                .get(&oembed_url)
                .send()
                .await?
                .error_for_status()?
                .json::<OEmbedResponse>()
                .await
        }
        .await;

        match result {
            Ok(oembed) => oembed.title,
            Err(e) => {
                warn!("oEmbed title lookup failed for {}: {}", video_id, e);
                format!("Video {video_id}")
            }
        }
    }
}

#[async_trait]
impl TranscriptProvider for YouTubeTranscriptService {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<VideoTranscript> {
        let html = self.fetch_watch_page(video_id).await?;

        let base_url = extract_caption_base_url(&html, &self.caption_language).ok_or_else(|| {
            ApiError::TranscriptUnavailable(format!(
                "No captions available for video {video_id}"
            ))
        })?;

        let events = self.fetch_caption_events(&base_url).await?;

        let segments: Vec<TranscriptSegment> = events
            .events
            .into_iter()
            .filter_map(|event| {
                let text: String = event
                    .segs
                    .iter()
                    .map(|seg| seg.utf8.as_str())
                    .collect::<Vec<_>>()
                    .join("")
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                if text.is_empty() {
                    None
                } else {
                    Some(TranscriptSegment {
                        start_seconds: event.start_ms as f64 / 1000.0,
                        text,
                    })
                }
            })
            .collect();

        if segments.is_empty() {
            return Err(ApiError::TranscriptUnavailable(format!(
                "Caption track for video {video_id} is empty"
            )));
        }

        let title = self.fetch_title(video_id).await;

        debug!(
            "Fetched transcript for {}: {} segments, title {:?}",
            video_id,
            segments.len(),
            title
        );

        Ok(VideoTranscript { segments, title })
    }
}

/// Pull the first matching caption track base URL out of the watch page.
/// Prefers the configured language; falls back to the first track listed.
fn extract_caption_base_url(html: &str, language: &str) -> Option<String> {
    let tracks_start = html.find("\"captionTracks\":[")?;
    let tracks = &html[tracks_start..];
    let tracks_end = tracks.find(']')?;
    let tracks = &tracks[..tracks_end];

    let preferred = format!("\"languageCode\":\"{language}\"");
    let mut chosen: Option<String> = None;

    let mut rest = tracks;
    while let Some(pos) = rest.find("\"baseUrl\":\"") {
        let after = &rest[pos + "\"baseUrl\":\"".len()..];
        let end = after.find('"')?;
        let raw = &after[..end];
        let url = raw.replace("\\u0026", "&").replace("\\/", "/");

        if chosen.is_none() {
            chosen = Some(url.clone());
        }
        // Language code appears after the baseUrl within the same track object
        let track_tail = &after[end..];
        let next_track = track_tail.find("\"baseUrl\":\"").unwrap_or(track_tail.len());
        if track_tail[..next_track].contains(&preferred) {
            return Some(url);
        }

        rest = &after[end..];
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        r#"..."captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","languageCode":"de"},"#,
        r#"{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en"}]..."#
    );

    #[test]
    fn prefers_the_configured_language() {
        let url = extract_caption_base_url(SAMPLE, "en").unwrap();
        assert!(url.ends_with("lang=en"));
        assert!(url.contains('&'));
    }

    #[test]
    fn falls_back_to_the_first_track() {
        let url = extract_caption_base_url(SAMPLE, "fr").unwrap();
        assert!(url.ends_with("lang=de"));
    }

    #[test]
    fn pages_without_captions_yield_none() {
        assert!(extract_caption_base_url("<html>no captions here</html>", "en").is_none());
    }
}

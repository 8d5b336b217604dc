//! Digest generation against an OpenAI-compatible chat-completions API.
//!
//! The output shape (five timestamped bullets plus three quick links) is
//! enforced by prompt only; the core checks non-emptiness and passes the
//! model text through otherwise.

use crate::{
    config::SummarizerConfig,
    error::{ApiError, Result},
    services::transcript_service::TranscriptSegment,
    utils::format_timestamp,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// External summarization boundary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript_excerpt: &str, title: &str) -> Result<String>;
}

pub struct OpenAiSummarizer {
    config: SummarizerConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You are an expert business content summarizer. \
Always follow the exact format requested and provide actionable insights.";

impl OpenAiSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config: config.clone(),
            http_client,
        })
    }

    fn build_prompt(transcript_excerpt: &str, title: &str) -> String {
        format!(
            r#"You are an expert at creating concise, actionable summaries of business content.

Please summarize this YouTube video transcript into exactly 5 bullet points. Each bullet point should:
- Include a timestamp in (MM:SS) format at the beginning
- Capture a key insight, strategy, or important point
- Be concise but specific enough to be valuable

After the 5 bullets, add a "Quick links:" section with exactly 3 key timestamps that highlight the most important moments.

Video Title: {title}

Transcript: {transcript_excerpt}

Format your response exactly like this:

• (MM:SS) [Key insight or point]
• (MM:SS) [Key insight or point]
• (MM:SS) [Key insight or point]
• (MM:SS) [Key insight or point]
• (MM:SS) [Key insight or point]

**Quick links:**
• (MM:SS) [Brief description]
• (MM:SS) [Brief description]
• (MM:SS) [Brief description]
"#
        )
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    #[instrument(skip(self, transcript_excerpt))]
    async fn summarize(&self, transcript_excerpt: &str, title: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(transcript_excerpt, title),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::AiProvider(format!("Chat completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::AiProvider(format!(
                "Chat completion returned status {status}: {error_text}"
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ApiError::AiProvider(format!("Failed to parse chat completion response: {e}"))
        })?;

        let markdown = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        info!("Generated digest for {:?} ({} chars)", title, markdown.len());

        Ok(markdown)
    }
}

/// Render transcript segments into the prompt excerpt: chronological order,
/// each segment prefixed with its source timestamp, cut off once the
/// character budget is reached.
pub fn build_transcript_excerpt(segments: &[TranscriptSegment], char_budget: usize) -> String {
    let mut excerpt = String::new();

    for segment in segments {
        let line = format!("({}) {}", format_timestamp(segment.start_seconds), segment.text);
        if !excerpt.is_empty() && excerpt.len() + 1 + line.len() > char_budget {
            break;
        }
        if excerpt.len() + line.len() > char_budget && excerpt.is_empty() {
            // A single oversized segment is truncated rather than dropped
            let mut cut = char_budget.min(line.len());
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            excerpt.push_str(&line[..cut]);
            break;
        }
        if !excerpt.is_empty() {
            excerpt.push('\n');
        }
        excerpt.push_str(&line);
    }

    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_seconds: start,
            text: text.to_string(),
        }
    }

    #[test]
    fn excerpt_prefixes_each_segment_with_its_timestamp() {
        let segments = vec![segment(0.0, "intro"), segment(65.0, "first point")];
        let excerpt = build_transcript_excerpt(&segments, 5000);
        assert_eq!(excerpt, "(00:00) intro\n(01:05) first point");
    }

    #[test]
    fn excerpt_respects_the_character_budget() {
        let segments: Vec<_> = (0..100)
            .map(|i| segment(i as f64 * 10.0, "some spoken words go here"))
            .collect();
        let excerpt = build_transcript_excerpt(&segments, 500);
        assert!(excerpt.len() <= 500);
        // Budget cuts between segments, never mid-line
        assert!(excerpt.lines().all(|l| l.starts_with('(')));
    }

    #[test]
    fn excerpt_keeps_chronological_order() {
        let segments = vec![segment(10.0, "a"), segment(20.0, "b"), segment(30.0, "c")];
        let excerpt = build_transcript_excerpt(&segments, 5000);
        let positions: Vec<_> = ["(00:10)", "(00:20)", "(00:30)"]
            .iter()
            .map(|ts| excerpt.find(ts).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn oversized_first_segment_is_truncated_not_dropped() {
        let segments = vec![segment(0.0, &"x".repeat(1000))];
        let excerpt = build_transcript_excerpt(&segments, 100);
        assert_eq!(excerpt.len(), 100);
        assert!(excerpt.starts_with("(00:00) "));
    }

    #[test]
    fn prompt_pins_the_five_bullet_format() {
        let prompt = OpenAiSummarizer::build_prompt("(00:00) hello", "My Talk");
        assert!(prompt.contains("exactly 5 bullet points"));
        assert!(prompt.contains("Quick links:"));
        assert!(prompt.contains("Video Title: My Talk"));
        assert!(prompt.contains("(00:00) hello"));
    }
}

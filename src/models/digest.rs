use crate::models::quota::QuotaSnapshot;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// POST /api/v1/digest request body
#[derive(Debug, Deserialize, Validate)]
pub struct DigestRequest {
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,
}

/// POST /api/v1/digest response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestResponse {
    pub markdown: String,
    pub quota: QuotaSnapshot,
    pub cached: bool,
    pub video_id: String,
    pub video_title: String,
}

/// One entry of GET /api/v1/digests
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestRecord {
    pub video_id: String,
    pub video_title: String,
    pub markdown: String,
    pub created_at: String,
}

impl From<entity::digests::Model> for DigestRecord {
    fn from(model: entity::digests::Model) -> Self {
        Self {
            video_id: model.video_id,
            video_title: model.video_title,
            markdown: model.markdown,
            created_at: model.created_at.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_fails_validation() {
        let request = DigestRequest { url: String::new() };
        assert!(request.validate().is_err());
    }

    #[test]
    fn non_empty_url_passes_validation() {
        let request = DigestRequest {
            url: "https://youtu.be/abc12345678".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}

//! Turns user-supplied video references into canonical video identifiers.
//!
//! Accepted forms, checked in this order: full watch URL (`?v=` query
//! parameter), short youtu.be URL, embed URL, bare 11-character id.

use std::fmt;
use url::Url;

const VIDEO_ID_LEN: usize = 11;

/// Canonical YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve a raw user input into a video id. Returns `None` when no
/// accepted pattern matches; the boundary maps that to a 400, never a 500.
pub fn resolve(input: &str) -> Option<VideoId> {
    let input = input.trim();

    if let Ok(parsed) = Url::parse(input) {
        if let Some(id) = id_from_url(&parsed) {
            return Some(VideoId(id));
        }
        // A parseable URL that matches no pattern is not a video reference;
        // it must not fall through to the bare-id check.
        return None;
    }

    // Scheme-less references like "www.youtube.com/watch?v=..." fail the
    // parse above; retry with a scheme when the leading segment is a
    // YouTube host.
    if starts_with_youtube_host(input) {
        if let Ok(parsed) = Url::parse(&format!("https://{input}")) {
            if let Some(id) = id_from_url(&parsed) {
                return Some(VideoId(id));
            }
        }
        return None;
    }

    if is_video_id(input) {
        return Some(VideoId(input.to_string()));
    }

    None
}

fn starts_with_youtube_host(s: &str) -> bool {
    let host = s.split('/').next().unwrap_or("").to_ascii_lowercase();
    is_youtube_host(&host) || host == "youtu.be"
}

fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_youtube_host(host: &str) -> bool {
    host == "youtube.com" || host.ends_with(".youtube.com")
}

fn id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    // youtube.com/watch?v=<id>
    if is_youtube_host(&host) && url.path() == "/watch" {
        for (key, value) in url.query_pairs() {
            if key == "v" && !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }

    // youtu.be/<id>
    if host == "youtu.be" {
        let segment = url.path_segments()?.next()?.trim();
        if !segment.is_empty() {
            return Some(segment.to_string());
        }
    }

    // youtube.com/embed/<id>
    if is_youtube_host(&host) {
        let mut segments = url.path_segments()?;
        let first = segments.next().unwrap_or("");
        let second = segments.next().unwrap_or("").trim();
        if first == "embed" && !second.is_empty() {
            return Some(second.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_url_forms_resolve_to_the_same_id() {
        let inputs = [
            "https://www.youtube.com/watch?v=abc12345678",
            "https://youtu.be/abc12345678",
            "https://www.youtube.com/embed/abc12345678",
            "abc12345678",
        ];
        for input in inputs {
            let id = resolve(input).unwrap_or_else(|| panic!("failed to resolve {input}"));
            assert_eq!(id.as_str(), "abc12345678");
        }
    }

    #[test]
    fn watch_url_with_extra_query_params_resolves() {
        let id = resolve("https://www.youtube.com/watch?t=42&v=abc12345678&feature=share").unwrap();
        assert_eq!(id.as_str(), "abc12345678");
    }

    #[test]
    fn short_url_drops_query_string() {
        let id = resolve("https://youtu.be/abc12345678?t=99").unwrap();
        assert_eq!(id.as_str(), "abc12345678");
    }

    #[test]
    fn bare_host_without_www_resolves() {
        let id = resolve("https://youtube.com/watch?v=abc12345678").unwrap();
        assert_eq!(id.as_str(), "abc12345678");
    }

    #[test]
    fn scheme_less_references_resolve() {
        let inputs = [
            "www.youtube.com/watch?v=abc12345678",
            "youtu.be/abc12345678",
            "www.youtube.com/embed/abc12345678",
        ];
        for input in inputs {
            let id = resolve(input).unwrap_or_else(|| panic!("failed to resolve {input}"));
            assert_eq!(id.as_str(), "abc12345678");
        }
    }

    #[test]
    fn scheme_less_non_video_paths_are_rejected() {
        assert!(resolve("www.youtube.com/feed/subscriptions").is_none());
    }

    #[test]
    fn free_text_is_rejected() {
        assert!(resolve("not a url").is_none());
    }

    #[test]
    fn unrelated_urls_are_rejected() {
        assert!(resolve("https://example.com/watch?v=abc12345678").is_none());
        assert!(resolve("https://vimeo.com/123456").is_none());
    }

    #[test]
    fn bare_ids_must_be_exactly_eleven_chars() {
        assert!(resolve("abc1234567").is_none());
        assert!(resolve("abc123456789").is_none());
        assert!(resolve("abc1234567!").is_none());
        assert!(resolve("a_c-2345678").is_some());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let id = resolve("  abc12345678\n").unwrap();
        assert_eq!(id.as_str(), "abc12345678");
    }
}

/// Format a segment offset as the "(MM:SS)"-style `MM:SS` timestamp used
/// throughout digest output. Videos longer than an hour keep accumulating
/// minutes ("75:03") rather than switching to an H:MM:SS form.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(59.9), "00:59");
        assert_eq!(format_timestamp(61.0), "01:01");
        assert_eq!(format_timestamp(754.2), "12:34");
    }

    #[test]
    fn long_videos_keep_counting_minutes() {
        assert_eq!(format_timestamp(4503.0), "75:03");
    }

    #[test]
    fn negative_offsets_clamp_to_zero() {
        assert_eq!(format_timestamp(-3.0), "00:00");
    }
}

use std::sync::OnceLock;

use regex::Regex;

/*
Recognised YouTube link shapes

youtube.com/watch?v=ID      youtu.be/ID
youtube.com/embed/ID        youtube.com/v/ID
youtube.com/watch?feature=share&v=ID

The id runs until the first '&', '?', '#' or newline.
*/

fn video_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        [
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([^&\n?#]+)",
            r"youtube\.com/watch\?.*v=([^&\n?#]+)",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

pub fn extract_video_id(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    video_patterns().iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
    })
}

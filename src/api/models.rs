//! API data models

use serde::{Deserialize, Serialize};

use crate::segment::{VideoLink, VideoTime};
use crate::subtitles::CueMatch;

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Result of a subtitle download request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadReport {
    pub link: String,
    pub langs: String,
    pub imported: usize,
    pub subtitles: usize,
}

impl From<CueMatch> for VideoLink {
    fn from(m: CueMatch) -> Self {
        Self {
            content: m.cue.content,
            link: m.link,
        }
    }
}

impl From<CueMatch> for VideoTime {
    fn from(m: CueMatch) -> Self {
        Self {
            video_id: m.video_id,
            subtitle: m.cue.content,
            start: f64::from(m.cue.start),
            end: f64::from(m.cue.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::{Cue, VideoSite};

    fn sample() -> CueMatch {
        CueMatch {
            site: VideoSite::Youtube,
            video_id: "abc".into(),
            cue: Cue {
                start: 7,
                end: 9,
                content: "cats".into(),
            },
            link: "https://youtube.com/embed/abc?start=6".into(),
        }
    }

    #[test]
    fn test_match_conversions() {
        let link = VideoLink::from(sample());
        assert_eq!(link.content, "cats");
        assert_eq!(link.link, "https://youtube.com/embed/abc?start=6");

        let time = VideoTime::from(sample());
        assert_eq!(time.video_id, "abc");
        assert_eq!(time.start, 7.0);
        assert_eq!(time.end, 9.0);
    }

    #[test]
    fn test_response_wrapper() {
        let ok = ApiResponse::success(3);
        assert!(ok.success);
        assert_eq!(ok.data, Some(3));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"success": true, "data": 3, "error": null})
        );
    }
}

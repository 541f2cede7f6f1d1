//! Video segment records exchanged between the API and its clients

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Segment with a ready-made player URL (`/api/getVideoLinks`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoLink {
    pub content: String,
    pub link: String,
}

/// Segment as a raw video id and time range (`/api/getVideos`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoTime {
    pub video_id: String,
    pub subtitle: String,
    pub start: f64,
    pub end: f64,
}

/// How a client turns a `VideoTime` into a player URL
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedTemplate {
    pub base: String,
    /// Seconds of playback kept before the cue starts
    pub lead_in: f64,
}

impl Default for EmbedTemplate {
    fn default() -> Self {
        Self {
            base: "https://www.youtube.com/embed/".to_string(),
            lead_in: 2.0,
        }
    }
}

impl EmbedTemplate {
    pub fn url_for(&self, time: &VideoTime) -> String {
        let start = (time.start - self.lead_in).max(0.0).floor() as u64;
        format!("{}{}?start={}", self.base, time.video_id, start)
    }
}

/// What the player shows for one search hit, whichever endpoint produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub caption: String,
    pub embed_url: String,
}

impl From<VideoLink> for Segment {
    fn from(link: VideoLink) -> Self {
        Self {
            caption: link.content,
            embed_url: link.link,
        }
    }
}

impl Segment {
    pub fn from_time(time: VideoTime, template: &EmbedTemplate) -> Self {
        Self {
            embed_url: template.url_for(&time),
            caption: time.subtitle,
        }
    }
}

/// Which of the two segment endpoints a client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// `GET /api/getVideoLinks/{word}`; failures show the error view
    #[default]
    Links,
    /// `GET /api/getVideos/{word}`; failures are ignored
    Videos,
}

impl Variant {
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Variant::Links => "/api/getVideoLinks/",
            Variant::Videos => "/api/getVideos/",
        }
    }

    /// Whether a failed fetch replaces the view with an error message
    pub fn reports_errors(&self) -> bool {
        matches!(self, Variant::Links)
    }

    /// Decode a response body into display segments
    pub fn decode(&self, body: &[u8], template: &EmbedTemplate) -> Result<Vec<Segment>, serde_json::Error> {
        let segments = match self {
            Variant::Links => serde_json::from_slice::<Vec<VideoLink>>(body)?
                .into_iter()
                .map(Segment::from)
                .collect(),
            Variant::Videos => serde_json::from_slice::<Vec<VideoTime>>(body)?
                .into_iter()
                .map(|time| Segment::from_time(time, template))
                .collect(),
        };
        Ok(segments)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Links => write!(f, "links"),
            Variant::Videos => write!(f, "videos"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "links" | "a" => Ok(Variant::Links),
            "videos" | "b" => Ok(Variant::Videos),
            other => Err(format!("unknown endpoint variant: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_time_wire_names() {
        let json = r#"[{"videoId":"abc","subtitle":"hi","start":12,"end":14.5}]"#;
        let times: Vec<VideoTime> = serde_json::from_str(json).unwrap();
        assert_eq!(times[0].video_id, "abc");
        assert_eq!(times[0].start, 12.0);

        let back = serde_json::to_value(&times[0]).unwrap();
        assert!(back.get("videoId").is_some());
    }

    #[test]
    fn test_embed_url_starts_two_seconds_early() {
        let template = EmbedTemplate::default();
        let time = VideoTime {
            video_id: "abc".into(),
            subtitle: "hi".into(),
            start: 12.0,
            end: 14.0,
        };
        assert_eq!(template.url_for(&time), "https://www.youtube.com/embed/abc?start=10");

        let early = VideoTime { start: 1.0, ..time };
        assert_eq!(template.url_for(&early), "https://www.youtube.com/embed/abc?start=0");
    }

    #[test]
    fn test_decode_per_variant() {
        let template = EmbedTemplate::default();
        let links = br#"[{"content":"intro","link":"https://yt/embed/abc"}]"#;
        let segments = Variant::Links.decode(links, &template).unwrap();
        assert_eq!(segments[0].caption, "intro");
        assert_eq!(segments[0].embed_url, "https://yt/embed/abc");

        let times = br#"[{"videoId":"v","subtitle":"sub","start":5,"end":6}]"#;
        let segments = Variant::Videos.decode(times, &template).unwrap();
        assert_eq!(segments[0].caption, "sub");
        assert_eq!(segments[0].embed_url, "https://www.youtube.com/embed/v?start=3");

        assert!(Variant::Links.decode(times, &template).is_err());
        assert!(Variant::Videos.decode(b"not json", &template).is_err());
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("links".parse::<Variant>().unwrap(), Variant::Links);
        assert_eq!("Videos".parse::<Variant>().unwrap(), Variant::Videos);
        assert!("other".parse::<Variant>().is_err());
        assert!(Variant::Links.reports_errors());
        assert!(!Variant::Videos.reports_errors());
    }
}

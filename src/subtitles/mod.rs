/// Subtitle library module
///
/// Holds the downloaded subtitles for every indexed video and answers
/// word searches over their cues.

pub mod parser;
pub mod library;
pub mod download;

pub use parser::{parse_cues, SubtitleFileName};
pub use library::SubtitleLibrary;
pub use download::{DownloadError, Downloader};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error types for subtitle library operations
#[derive(thiserror::Error, Debug)]
pub enum SubtitleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed subtitle JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognised subtitle file name: {0}")]
    FileName(String),
}

/// Video hosting site a subtitle was downloaded from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VideoSite {
    Youtube,
    #[serde(alias = "BiliBili")]
    Bilibili,
    #[default]
    Unknown,
}

impl VideoSite {
    /// Base of the embeddable player URL; the video id is appended to it
    pub fn embed_base(&self) -> Option<&'static str> {
        match self {
            VideoSite::Youtube => Some("https://youtube.com/embed/"),
            VideoSite::Bilibili => Some("https://player.bilibili.com/player.html?bvid="),
            VideoSite::Unknown => None,
        }
    }
}

impl From<&str> for VideoSite {
    fn from(domain: &str) -> Self {
        match domain {
            "youtube.com" => VideoSite::Youtube,
            "bilibili.com" => VideoSite::Bilibili,
            _ => VideoSite::Unknown,
        }
    }
}

/// Subtitle language as reported by yt-dlp
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Lang {
    En,
    Chinese,
    #[default]
    Unknown,
}

impl From<&str> for Lang {
    fn from(code: &str) -> Self {
        match code {
            "en" | "en-GB" | "en-US" => Lang::En,
            "zh-CN" | "zh-Hans" => Lang::Chinese,
            _ => Lang::Unknown,
        }
    }
}

/// One subtitle line with its time range in whole seconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cue {
    pub start: u32,
    pub end: u32,
    pub content: String,
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}s-{}s] {}", self.start, self.end, self.content)
    }
}

/// All cues of one video in one language
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subtitle {
    pub site: VideoSite,
    pub video_id: String,
    pub lang: Lang,
    pub cues: Vec<Cue>,
}

/// A cue that matched a search, together with the video it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct CueMatch {
    pub site: VideoSite,
    pub video_id: String,
    pub cue: Cue,
    /// Embeddable player URL starting just before the cue
    pub link: String,
}

impl Subtitle {
    pub fn new(site: VideoSite, video_id: impl Into<String>, lang: Lang) -> Self {
        Self {
            site,
            video_id: video_id.into(),
            lang,
            cues: Vec::new(),
        }
    }

    /// Player URL for a cue, or `None` when the site has no known embed player
    pub fn embed_link(&self, cue: &Cue) -> Option<String> {
        let base = self.site.embed_base()?;
        let offset = cue.start.saturating_sub(1);
        let link = match self.site {
            VideoSite::Youtube => format!("{}{}?start={}", base, self.video_id, offset),
            VideoSite::Bilibili => format!(
                "{}{}&page=1&high_quality=1&danmaku=0&as_wide=1&t={}",
                base, self.video_id, offset
            ),
            VideoSite::Unknown => return None,
        };
        Some(link)
    }

    /// Every cue containing `word`, in cue order
    pub fn search(&self, word: &str) -> Vec<CueMatch> {
        self.cues
            .iter()
            .filter(|cue| cue.content.contains(word))
            .filter_map(|cue| {
                let link = self.embed_link(cue)?;
                Some(CueMatch {
                    site: self.site,
                    video_id: self.video_id.clone(),
                    cue: cue.clone(),
                    link,
                })
            })
            .collect()
    }
}

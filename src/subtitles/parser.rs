use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::warn;

use super::{Cue, Lang, SubtitleError, VideoSite};

/// `HH:MM:SS,mmm --> HH:MM:SS,mmm`, with `.` accepted for WebVTT and the
/// hour field optional
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(\d{2,}):)?(\d{2}):(\d{2})[,.]\d{3}\s+-->\s+(?:(\d{2,}):)?(\d{2}):(\d{2})[,.]\d{3}",
    )
    .unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Parse SRT or WebVTT text into cues.
///
/// Every text line under a timestamp becomes its own cue carrying that
/// timestamp's range. Sequence numbers, the `WEBVTT` header and NOTE blocks
/// are skipped because they never follow a timestamp line.
pub fn parse_cues(text: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut range: Option<(u32, u32)> = None;

    for line in text.trim_start_matches('\u{feff}').lines() {
        let line = line.trim_end_matches('\r');

        if let Some(caps) = TIMESTAMP_RE.captures(line) {
            range = parse_range(&caps);
            if range.is_none() {
                warn!("Dropping cue block with out-of-range timestamp: {}", line);
            }
            continue;
        }

        if line.trim().is_empty() {
            range = None;
            continue;
        }

        if let Some((start, end)) = range {
            let content = TAG_RE.replace_all(line, "").trim().to_string();
            if !content.is_empty() {
                cues.push(Cue { start, end, content });
            }
        }
    }

    cues
}

fn parse_range(caps: &Captures) -> Option<(u32, u32)> {
    let field = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let seconds = |h: usize| -> Option<u32> {
        field(h)?
            .checked_mul(3600)?
            .checked_add(field(h + 1)? * 60)?
            .checked_add(field(h + 2)?)
    };

    Some((seconds(1)?, seconds(4)?))
}

/// Parsed form of a yt-dlp output name such as `youtube.com:dQw4w9WgXcQ.en.srt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleFileName {
    pub domain: String,
    pub site: VideoSite,
    pub video_id: String,
    pub lang_code: String,
    pub extension: String,
}

impl SubtitleFileName {
    pub fn parse(name: &str) -> Result<Self, SubtitleError> {
        let bad = || SubtitleError::FileName(name.to_string());

        let (rest, extension) = name.rsplit_once('.').ok_or_else(bad)?;
        let (rest, lang_code) = rest.rsplit_once('.').ok_or_else(bad)?;
        let (domain, video_id) = rest.split_once(':').ok_or_else(bad)?;

        if video_id.is_empty() || lang_code.is_empty() {
            return Err(bad());
        }

        Ok(Self {
            domain: domain.to_string(),
            site: VideoSite::from(domain),
            video_id: video_id.to_string(),
            lang_code: lang_code.to_string(),
            extension: extension.to_ascii_lowercase(),
        })
    }

    pub fn lang(&self) -> Lang {
        Lang::from(self.lang_code.as_str())
    }

    /// Name of the converted JSON file that replaces the raw download
    pub fn json_name(&self) -> String {
        format!("{}:{}.{}.json", self.domain, self.video_id, self.lang_code)
    }
}

//! API request handlers

use serde_json::Value;
use tracing::info;

use super::error::ApiError;
use super::models::DownloadReport;
use super::server::AppState;
use crate::segment::{VideoLink, VideoTime};
use crate::subtitles::SubtitleLibrary;

/// Handle health check requests
pub async fn health_check(library: &SubtitleLibrary) -> Value {
    serde_json::json!({
        "status": "healthy",
        "service": "clipfinder",
        "version": env!("CARGO_PKG_VERSION"),
        "subtitles": library.len().await,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

/// Matching cues with ready-made player links
pub async fn video_links(library: &SubtitleLibrary, word: &str) -> Vec<VideoLink> {
    library
        .search(word)
        .await
        .into_iter()
        .map(VideoLink::from)
        .collect()
}

/// Matching cues as video ids and time ranges
pub async fn video_times(library: &SubtitleLibrary, word: &str) -> Vec<VideoTime> {
    library
        .search(word)
        .await
        .into_iter()
        .map(VideoTime::from)
        .collect()
}

/// Player links only
pub async fn links(library: &SubtitleLibrary, word: &str) -> Vec<String> {
    library
        .search(word)
        .await
        .into_iter()
        .map(|m| m.link)
        .collect()
}

/// Download subtitles for a video and add them to the library
pub async fn download_subtitle(
    state: &AppState,
    link: &str,
    langs: Option<&str>,
) -> Result<DownloadReport, ApiError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(ApiError::BadRequest("missing video link".to_string()));
    }
    if link.starts_with('-') {
        return Err(ApiError::BadRequest(format!("invalid video link: {}", link)));
    }

    let langs = langs.map(str::trim).filter(|l| !l.is_empty());
    if langs.map_or(false, |l| l.starts_with('-')) {
        return Err(ApiError::BadRequest("invalid subtitle languages".to_string()));
    }
    let imported = state.downloader.download(link, langs, &state.library).await?;
    let subtitles = state.library.len().await;

    info!("📥 {} now indexed ({} new files from {})", subtitles, imported, link);
    Ok(DownloadReport {
        link: link.to_string(),
        langs: langs.unwrap_or(state.downloader.default_langs()).to_string(),
        imported,
        subtitles,
    })
}

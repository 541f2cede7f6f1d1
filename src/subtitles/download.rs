use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{info, warn};

use super::{SubtitleError, SubtitleLibrary};

#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("Failed to execute {0}. Is it installed?")]
    MissingTool(String),

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Subtitle(#[from] SubtitleError),
}

/// Fetches subtitle tracks with yt-dlp into a library directory
#[derive(Debug, Clone)]
pub struct Downloader {
    binary: PathBuf,
    default_langs: String,
}

impl Downloader {
    pub fn new(binary: impl Into<PathBuf>, default_langs: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            default_langs: default_langs.into(),
        }
    }

    pub fn default_langs(&self) -> &str {
        &self.default_langs
    }

    /// Arguments passed to yt-dlp for one download.
    ///
    /// The link always follows `--` so yt-dlp never reads it as an option.
    pub fn args(&self, link: &str, langs: Option<&str>, library: &SubtitleLibrary) -> Vec<String> {
        let template = library.dir().join("%(webpage_url_domain)s:%(id)s");
        vec![
            format!("--sub-langs={}", langs.unwrap_or(&self.default_langs)),
            "--write-subs".to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            "--skip-download".to_string(),
            "--".to_string(),
            link.to_string(),
        ]
    }

    /// Download subtitles for `link` and import them into the library.
    ///
    /// Returns the number of subtitle files imported.
    pub async fn download(
        &self,
        link: &str,
        langs: Option<&str>,
        library: &SubtitleLibrary,
    ) -> Result<usize, DownloadError> {
        let tool = self.binary.to_string_lossy().into_owned();
        info!("⬇️ Downloading subtitles for {} ({})", link, langs.unwrap_or(&self.default_langs));

        let output = Command::new(&self.binary)
            .args(self.args(link, langs, library))
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DownloadError::MissingTool(tool.clone()),
                _ => DownloadError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} failed for {}: {}", tool, link, stderr);
            return Err(DownloadError::Failed {
                tool,
                status: output.status,
                stderr,
            });
        }

        let imported = library.import_downloads().await?;
        if imported == 0 {
            warn!("No subtitles were produced for {}", link);
        }
        Ok(imported)
    }
}

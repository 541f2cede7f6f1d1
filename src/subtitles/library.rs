use futures::future::join_all;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{parse_cues, CueMatch, Subtitle, SubtitleError, SubtitleFileName};

/// Directory of converted subtitle files plus an in-memory index over them.
///
/// Files are stored as JSON named `{domain}:{video_id}.{lang}.json`. The index
/// is keyed by file name so searches walk videos in a stable order.
#[derive(Debug, Clone)]
pub struct SubtitleLibrary {
    dir: PathBuf,
    index: Arc<RwLock<BTreeMap<String, Subtitle>>>,
}

impl SubtitleLibrary {
    /// Open a library directory, creating it if needed, and index its JSON files
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, SubtitleError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let library = Self {
            dir,
            index: Arc::new(RwLock::new(BTreeMap::new())),
        };
        library.reload().await?;

        info!(
            "📚 Subtitle library opened at {} with {} subtitles",
            library.dir.display(),
            library.len().await
        );
        Ok(library)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.read().await.is_empty()
    }

    /// Rebuild the index from the JSON files on disk
    pub async fn reload(&self) -> Result<usize, SubtitleError> {
        let paths = self.files_with_extensions(&["json"]).await?;

        let loaded = join_all(paths.iter().map(|path| load_subtitle_file(path))).await;

        let mut index = BTreeMap::new();
        for (path, result) in paths.iter().zip(loaded) {
            match result {
                Ok(subtitle) => {
                    index.insert(file_name(path), subtitle);
                }
                Err(e) => {
                    warn!("Skipping unreadable subtitle file {}: {}", path.display(), e);
                }
            }
        }

        let count = index.len();
        *self.index.write().await = index;
        debug!("📁 Indexed {} subtitle files", count);
        Ok(count)
    }

    /// Convert raw `.srt`/`.vtt` downloads into JSON subtitles and index them.
    ///
    /// Each raw file is removed once its JSON replacement is written. Files
    /// whose names do not follow the download template, or that are not
    /// readable UTF-8, are left untouched.
    pub async fn import_downloads(&self) -> Result<usize, SubtitleError> {
        let raw_files = self.files_with_extensions(&["srt", "vtt"]).await?;
        let mut imported = 0;

        for path in raw_files {
            let name = file_name(&path);
            let parsed = match SubtitleFileName::parse(&name) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Not importing {}: {}", path.display(), e);
                    continue;
                }
            };

            let text = match fs::read(&path).await.map(String::from_utf8) {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!("Not importing {}: not valid UTF-8 ({})", path.display(), e.utf8_error());
                    continue;
                }
                Err(e) => {
                    warn!("Not importing {}: {}", path.display(), e);
                    continue;
                }
            };
            let mut subtitle = Subtitle::new(parsed.site, parsed.video_id.clone(), parsed.lang());
            subtitle.cues = parse_cues(&text);

            self.store(&parsed.json_name(), subtitle).await?;
            fs::remove_file(&path).await?;
            imported += 1;
        }

        if imported > 0 {
            info!("📥 Imported {} downloaded subtitle files", imported);
        }
        Ok(imported)
    }

    /// Write a subtitle to disk under `name` and add it to the index
    pub async fn store(&self, name: &str, subtitle: Subtitle) -> Result<(), SubtitleError> {
        let json = serde_json::to_string(&subtitle)?;
        fs::write(self.dir.join(name), json).await?;

        debug!("💾 Stored {} ({} cues)", name, subtitle.cues.len());
        self.index.write().await.insert(name.to_string(), subtitle);
        Ok(())
    }

    /// Every cue containing `word` across all subtitles
    pub async fn search(&self, word: &str) -> Vec<CueMatch> {
        if word.is_empty() {
            return Vec::new();
        }

        let index = self.index.read().await;
        let matches: Vec<CueMatch> = index
            .values()
            .flat_map(|subtitle| subtitle.search(word))
            .collect();

        debug!("🔍 '{}' matched {} cues", word, matches.len());
        matches
    }

    async fn files_with_extensions(&self, extensions: &[&str]) -> Result<Vec<PathBuf>, SubtitleError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut paths = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| extensions.contains(&ext.to_ascii_lowercase().as_str()));
            if matches && path.is_file() {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

async fn load_subtitle_file(path: &Path) -> Result<Subtitle, SubtitleError> {
    let content = fs::read_to_string(path).await?;
    let subtitle: Subtitle = serde_json::from_str(&content)?;
    Ok(subtitle)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

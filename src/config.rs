use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::segment::{EmbedTemplate, Variant};

/// Configuration for Clipfinder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTTP API settings
    pub server: ServerConfig,

    /// Subtitle library and download settings
    pub library: LibraryConfig,

    /// Settings for the search client
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory holding downloaded and converted subtitles
    pub subtitles_dir: PathBuf,

    /// Languages requested from yt-dlp when none are given
    pub default_langs: String,

    /// yt-dlp executable
    pub yt_dlp_binary: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API server
    pub server_url: String,

    /// Which segment endpoint to query
    pub variant: Variant,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Player URL prefix for `getVideos` results
    pub embed_base: String,

    /// Seconds of playback kept before a cue
    pub lead_in_seconds: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            subtitles_dir: PathBuf::from("./subtitles"),
            default_langs: "zh-CN,en".to_string(),
            yt_dlp_binary: PathBuf::from("yt-dlp"),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let embed = EmbedTemplate::default();
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            variant: Variant::Links,
            timeout_seconds: 10,
            embed_base: embed.base,
            lead_in_seconds: embed.lead_in,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            library: LibraryConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn embed_template(&self) -> EmbedTemplate {
        EmbedTemplate {
            base: self.embed_base.clone(),
            lead_in: self.lead_in_seconds,
        }
    }
}

impl Config {
    /// Load configuration from the first file found, falling back to
    /// defaults. Environment overrides are applied either way.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::from_default_locations(),
        };
        config.apply_env();
        Ok(config)
    }

    fn from_default_locations() -> Self {
        let config_paths = [
            "clipfinder.toml",
            "config/clipfinder.toml",
            "/etc/clipfinder/config.toml",
        ];

        for path in &config_paths {
            let path = Path::new(path);
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{:#}", e),
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Self::default()
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Override settings from `CLIPFINDER_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(port) = var("CLIPFINDER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!("Invalid CLIPFINDER_PORT value {}: {}", port, e),
            }
        }

        if let Some(dir) = var("CLIPFINDER_SUBTITLES_DIR") {
            self.library.subtitles_dir = PathBuf::from(dir);
        }

        if let Some(langs) = var("CLIPFINDER_LANGS") {
            self.library.default_langs = langs;
        }

        if let Some(binary) = var("CLIPFINDER_YT_DLP") {
            self.library.yt_dlp_binary = PathBuf::from(binary);
        }

        if let Some(url) = var("CLIPFINDER_SERVER_URL") {
            self.client.server_url = url;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be greater than 0"));
        }

        if self.library.default_langs.trim().is_empty() {
            return Err(anyhow!("library.default_langs must name at least one language"));
        }

        url::Url::parse(&self.client.server_url)
            .with_context(|| format!("client.server_url is not a valid URL: {}", self.client.server_url))?;

        if self.client.timeout_seconds == 0 {
            return Err(anyhow!("client.timeout_seconds must be greater than 0"));
        }

        if self.client.lead_in_seconds < 0.0 {
            return Err(anyhow!("client.lead_in_seconds cannot be negative"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Clipfinder Configuration:\n\
            - Listen: {}:{}\n\
            - Subtitles Directory: {}\n\
            - Default Languages: {}\n\
            - Server URL: {}\n\
            - Endpoint Variant: {}",
            self.server.host,
            self.server.port,
            self.library.subtitles_dir.display(),
            self.library.default_langs,
            self.client.server_url,
            self.client.variant,
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_subtitles_dir(mut self, dir: PathBuf) -> Self {
        self.config.library.subtitles_dir = dir;
        self
    }

    pub fn with_default_langs(mut self, langs: impl Into<String>) -> Self {
        self.config.library.default_langs = langs.into();
        self
    }

    pub fn with_yt_dlp_binary(mut self, binary: PathBuf) -> Self {
        self.config.library.yt_dlp_binary = binary;
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.config.client.server_url = url.into();
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.config.client.variant = variant;
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.client.timeout_seconds = seconds;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

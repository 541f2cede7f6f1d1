//! API module for Clipfinder
//!
//! Serves segment searches over the subtitle library and accepts subtitle
//! download requests.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::subtitles::{Downloader, SubtitleLibrary};

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, AppState};

/// API Server for handling REST requests
#[derive(Debug)]
pub struct ApiServer {
    state: AppState,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(library: SubtitleLibrary, config: &Config) -> Self {
        let downloader = Downloader::new(
            config.library.yt_dlp_binary.clone(),
            config.library.default_langs.clone(),
        );
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            state: AppState {
                library,
                downloader: Arc::new(downloader),
            },
        }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on {}:{}", self.host, self.port);
        server::start_http_server(self.state, &self.host, self.port).await
    }
}

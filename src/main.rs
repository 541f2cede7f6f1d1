use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use clipfinder::{
    ApiServer, Browser, Config, Downloader, HttpSegmentClient, SegmentSource, SubtitleLibrary,
    Variant,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let mut config = Config::load(config_path.as_deref())?;

    match matches.subcommand() {
        Some(("serve", sub)) => {
            apply_serve_args(&mut config, sub);
            config.validate()?;
            serve(config).await
        }
        Some(("download", sub)) => {
            apply_library_args(&mut config, sub);
            config.validate()?;
            download(config, sub).await
        }
        Some(("search", sub)) => {
            apply_client_args(&mut config, sub)?;
            config.validate()?;
            search(config, sub).await
        }
        Some(("browse", sub)) => {
            apply_client_args(&mut config, sub)?;
            config.validate()?;
            browse(config).await
        }
        _ => unreachable!("subcommand is required"),
    }
}

fn cli() -> Command {
    let subtitles_dir = Arg::new("subtitles-dir")
        .short('d')
        .long("subtitles-dir")
        .value_name("DIR")
        .help("Directory holding downloaded subtitles");
    let server = Arg::new("server")
        .short('s')
        .long("server")
        .value_name("URL")
        .help("Base URL of the Clipfinder API");
    let variant = Arg::new("variant")
        .long("variant")
        .value_name("VARIANT")
        .help("Segment endpoint to query")
        .value_parser(["links", "videos"]);

    Command::new("clipfinder")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Search video subtitles and step through the matching clips")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .global(true),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API over the subtitle library")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("Port to listen on")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("ADDR")
                        .help("Address to bind"),
                )
                .arg(subtitles_dir.clone()),
        )
        .subcommand(
            Command::new("download")
                .about("Download subtitles for a video into the library")
                .arg(Arg::new("link").value_name("LINK").required(true))
                .arg(
                    Arg::new("lang")
                        .short('l')
                        .long("lang")
                        .value_name("LANGS")
                        .help("Comma-separated subtitle languages"),
                )
                .arg(subtitles_dir),
        )
        .subcommand(
            Command::new("search")
                .about("Fetch and print every clip matching a word")
                .arg(Arg::new("word").value_name("WORD").required(true))
                .arg(server.clone())
                .arg(variant.clone()),
        )
        .subcommand(
            Command::new("browse")
                .about("Interactively search and step through clips")
                .arg(server)
                .arg(variant),
        )
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "clipfinder=debug,tower_http=debug,info"
    } else {
        "clipfinder=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_library_args(config: &mut Config, matches: &ArgMatches) {
    if let Some(dir) = matches.get_one::<String>("subtitles-dir") {
        config.library.subtitles_dir = PathBuf::from(dir);
    }
}

fn apply_serve_args(config: &mut Config, matches: &ArgMatches) {
    apply_library_args(config, matches);
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
}

fn apply_client_args(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    if let Some(server) = matches.get_one::<String>("server") {
        config.client.server_url = server.clone();
    }
    if let Some(variant) = matches.get_one::<String>("variant") {
        config.client.variant = variant.parse::<Variant>().map_err(anyhow::Error::msg)?;
    }
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    info!("🚀 Clipfinder starting...");
    info!("{}", config.summary());

    let library = SubtitleLibrary::open(&config.library.subtitles_dir)
        .await
        .context("Failed to open subtitle library")?;
    if let Err(e) = library.import_downloads().await {
        warn!("Failed to import pending downloads: {}", e);
    }

    ApiServer::new(library, &config).start().await
}

async fn download(config: Config, matches: &ArgMatches) -> Result<()> {
    let link = matches
        .get_one::<String>("link")
        .context("missing video link")?;
    let langs = matches.get_one::<String>("lang").map(String::as_str);

    let library = SubtitleLibrary::open(&config.library.subtitles_dir).await?;
    let downloader = Downloader::new(
        config.library.yt_dlp_binary.clone(),
        config.library.default_langs.clone(),
    );

    let imported = downloader.download(link, langs, &library).await?;
    info!("✅ Imported {} subtitle files, {} indexed in total", imported, library.len().await);
    Ok(())
}

async fn search(config: Config, matches: &ArgMatches) -> Result<()> {
    let word = matches
        .get_one::<String>("word")
        .context("missing search word")?;

    let client = HttpSegmentClient::new(&config.client)?;
    let segments = client.fetch(word).await?;

    if segments.is_empty() {
        println!("No clips found for '{}'", word);
        return Ok(());
    }

    for (i, segment) in segments.iter().enumerate() {
        println!("{:>3}. {}\n     {}", i + 1, segment.caption, segment.embed_url);
    }
    Ok(())
}

async fn browse(config: Config) -> Result<()> {
    let client = HttpSegmentClient::new(&config.client)?;
    info!(
        "🔎 Browsing {} via {} (type a word, :n for next, :q to quit)",
        config.client.server_url, config.client.variant
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut browser = Browser::new(Arc::new(client), tokio::io::stdout());
    browser.run(stdin).await
}

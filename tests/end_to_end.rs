use clipfinder::{
    build_router, AppState, ConfigBuilder, Downloader, HttpSegmentClient, Outcome, SearchSession,
    SegmentSource, SubtitleLibrary, Variant,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_test::assert_ok;

const SRT: &str = "1\n00:00:05,000 --> 00:00:07,000\nwhere are the cats\n\n2\n00:01:10,000 --> 00:01:12,500\ncats everywhere\n";

/// Serve a library containing one imported download on an ephemeral port
async fn spawn_server(temp: &TempDir) -> String {
    std::fs::write(temp.path().join("youtube.com:vid1.en.srt"), SRT).unwrap();
    let library = SubtitleLibrary::open(temp.path()).await.unwrap();
    assert_eq!(library.import_downloads().await.unwrap(), 1);

    let state = AppState {
        library,
        downloader: Arc::new(Downloader::new("yt-dlp", "en")),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(url: &str, variant: Variant) -> HttpSegmentClient {
    let config = ConfigBuilder::new()
        .with_server_url(url)
        .with_variant(variant)
        .build();
    HttpSegmentClient::new(&config.client).unwrap()
}

#[tokio::test]
async fn test_links_round_trip_through_server() {
    let temp = TempDir::new().unwrap();
    let url = spawn_server(&temp).await;
    let client = client(&url, Variant::Links);

    let segments = assert_ok!(client.fetch("cats").await);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].caption, "where are the cats");
    assert_eq!(segments[0].embed_url, "https://youtube.com/embed/vid1?start=4");
    assert_eq!(segments[1].embed_url, "https://youtube.com/embed/vid1?start=69");
}

#[tokio::test]
async fn test_videos_round_trip_applies_client_lead_in() {
    let temp = TempDir::new().unwrap();
    let url = spawn_server(&temp).await;
    let client = client(&url, Variant::Videos);

    let segments = assert_ok!(client.fetch("everywhere").await);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].embed_url, "https://www.youtube.com/embed/vid1?start=68");
}

#[tokio::test]
async fn test_session_steps_through_server_results() {
    let temp = TempDir::new().unwrap();
    let url = spawn_server(&temp).await;
    let client = client(&url, Variant::Links);
    let mut session = SearchSession::new(Variant::Links);

    let request = session.set_search_term("cats").unwrap();
    let outcome = session.apply(request.token, client.fetch(&request.term).await);
    assert_eq!(outcome, Outcome::Replaced(2));
    assert_eq!(session.view().indicator().as_deref(), Some("1 of 2 videos"));

    session.next();
    assert_eq!(session.current().unwrap().caption, "cats everywhere");
    session.next();
    assert_eq!(session.current().unwrap().caption, "where are the cats");
}

//! Tests for redirect-following fetches and archive downloads

mod common;

use axum::Router;
use axum::extract::Path;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse as _, Response};
use axum::routing::get;
use degit::error::DegitError;
use degit::remote::{ArchiveDownloader, CloneSpec, Fetcher};
use tempfile::TempDir;

async fn hop(Path(remaining): Path<u32>) -> Response {
    if remaining == 0 {
        return (StatusCode::OK, "arrived").into_response();
    }
    (
        StatusCode::FOUND,
        [(header::LOCATION, format!("/hop/{}", remaining - 1))],
    )
        .into_response()
}

fn redirect_app() -> Router {
    Router::new()
        .route("/hop/{remaining}", get(hop))
        .route(
            "/loop",
            get(|| async { (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/loop")]) }),
        )
        .route("/broken", get(|| async { StatusCode::FOUND }))
        .route(
            "/relative/start",
            get(|| async { (StatusCode::SEE_OTHER, [(header::LOCATION, "end")]) }),
        )
        .route("/relative/end", get(|| async { "relative ok" }))
        .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
}

fn http_status(err: &anyhow::Error) -> Option<u16> {
    match err.downcast_ref::<DegitError>() {
        Some(DegitError::Http { status, .. }) => Some(*status),
        _ => None,
    }
}

#[tokio::test]
async fn test_follows_redirect_chain_to_success() {
    let base = common::spawn_server(redirect_app()).await;
    let fetcher = Fetcher::new(20).unwrap();

    let response = fetcher.fetch(&format!("{base}/hop/5")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "arrived");
}

#[tokio::test]
async fn test_redirect_cap_is_inclusive() {
    let base = common::spawn_server(redirect_app()).await;
    let fetcher = Fetcher::new(3).unwrap();

    assert!(fetcher.fetch(&format!("{base}/hop/3")).await.is_ok());

    let err = fetcher.fetch(&format!("{base}/hop/4")).await.unwrap_err();
    match err.downcast_ref::<DegitError>() {
        Some(DegitError::TooManyRedirects { limit, url }) => {
            assert_eq!(*limit, 3);
            assert!(url.ends_with("/hop/4"));
        }
        other => panic!("expected TooManyRedirects, got {other:?}"),
    }
}

#[tokio::test]
async fn test_redirect_loop_is_stopped() {
    let base = common::spawn_server(redirect_app()).await;
    let fetcher = Fetcher::new(20).unwrap();

    let err = fetcher.fetch(&format!("{base}/loop")).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DegitError>(),
        Some(DegitError::TooManyRedirects { limit: 20, .. })
    ));
}

#[tokio::test]
async fn test_redirect_without_location_is_http_error() {
    let base = common::spawn_server(redirect_app()).await;
    let fetcher = Fetcher::new(20).unwrap();

    let err = fetcher.fetch(&format!("{base}/broken")).await.unwrap_err();
    assert_eq!(http_status(&err), Some(302));
    assert!(err.to_string().contains("no location header"));
}

#[tokio::test]
async fn test_relative_location_is_resolved() {
    let base = common::spawn_server(redirect_app()).await;
    let fetcher = Fetcher::new(20).unwrap();

    let response = fetcher
        .fetch(&format!("{base}/relative/start"))
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "relative ok");
}

#[tokio::test]
async fn test_error_statuses_are_terminal() {
    let base = common::spawn_server(redirect_app()).await;
    let fetcher = Fetcher::new(20).unwrap();

    let err = fetcher.fetch(&format!("{base}/missing")).await.unwrap_err();
    assert_eq!(http_status(&err), Some(404));

    let err = fetcher.fetch(&format!("{base}/boom")).await.unwrap_err();
    assert_eq!(http_status(&err), Some(500));
}

#[tokio::test]
async fn test_unreachable_host_is_download_error() {
    let fetcher = Fetcher::new(20).unwrap();

    let err = fetcher.fetch("http://127.0.0.1:1/nothing").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DegitError>(),
        Some(DegitError::Download { .. })
    ));

    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DegitError>(),
        Some(DegitError::Download { .. })
    ));
}

#[tokio::test]
async fn test_download_streams_archive_to_file() {
    let archive = common::widgets_archive("widgets-2f1c9e0");
    let base = common::spawn_server(common::archive_host("acme/widgets", "HEAD", archive.clone()))
        .await;
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HEAD.tar.gz");

    let fetcher = Fetcher::new(20).unwrap();
    let spec = CloneSpec::parse("acme/widgets").unwrap();
    let downloader = ArchiveDownloader::new(&fetcher, &spec, &base);
    assert_eq!(
        downloader.url(),
        format!("{base}/acme/widgets/archive/HEAD.tar.gz")
    );

    let written = downloader.download_to(&path).await.unwrap();
    assert_eq!(written, archive.len() as u64);
    assert_eq!(std::fs::read(&path).unwrap(), archive);
}

#[tokio::test]
async fn test_download_of_unknown_ref_fails() {
    let archive = common::widgets_archive("widgets-2f1c9e0");
    let base = common::spawn_server(common::archive_host("acme/widgets", "HEAD", archive)).await;
    let temp_dir = TempDir::new().unwrap();

    let fetcher = Fetcher::new(20).unwrap();
    let spec = CloneSpec::parse("acme/widgets#nope").unwrap();
    let err = ArchiveDownloader::new(&fetcher, &spec, &base)
        .download_to(&temp_dir.path().join("nope.tar.gz"))
        .await
        .unwrap_err();
    assert_eq!(http_status(&err), Some(404));
}

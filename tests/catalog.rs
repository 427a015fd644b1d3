use cinefetch::catalog::TmdbCatalogClient;
use cinefetch::config::{ApiConfig, HttpConfig};
use cinefetch::error::CineFetchError;
use cinefetch::images::HttpImageFetcher;
use cinefetch::traits::{CatalogClient, ImageFetcher};
use cinefetch::utils::HttpClient;
use mockito::{Matcher, ServerGuard};
use std::io::Cursor;

fn http_client() -> HttpClient {
    HttpClient::new(&HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 5,
        user_agent: None,
    })
}

fn api_config(server: &ServerGuard) -> ApiConfig {
    ApiConfig {
        base_url: server.url(),
        api_key: Some("test-key".to_string()),
        language: "en-US".to_string(),
        image_base_url: "https://img.example/w500".to_string(),
    }
}

#[tokio::test]
async fn normalizes_raw_records() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/movie/now_playing")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(
            r#"{"results":[
                {"id":10,"title":"X","overview":"first","poster_path":"/p10.jpg"},
                {"id":11,"title":"Y","poster_path":null}
            ]}"#,
        )
        .create_async()
        .await;

    let client = TmdbCatalogClient::new(http_client(), &api_config(&server)).unwrap();
    let items = client.fetch_page(1).await.unwrap();
    mock.assert_async().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "10");
    assert_eq!(items[0].title, "X");
    assert_eq!(items[0].description, "first");
    assert_eq!(
        items[0].poster_url.as_deref(),
        Some("https://img.example/w500/p10.jpg")
    );

    assert_eq!(items[1].id, "11");
    assert_eq!(items[1].description, "");
    assert_eq!(items[1].poster_url, None);
}

#[tokio::test]
async fn http_error_maps_to_remote_unavailable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/movie/now_playing")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let client = TmdbCatalogClient::new(http_client(), &api_config(&server)).unwrap();
    let err = client.fetch_page(1).await.unwrap_err();
    assert!(matches!(err, CineFetchError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn bad_body_maps_to_malformed_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/movie/now_playing")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results":[{"title":"missing id"}]}"#)
        .create_async()
        .await;

    let client = TmdbCatalogClient::new(http_client(), &api_config(&server)).unwrap();
    let err = client.fetch_page(1).await.unwrap_err();
    assert!(matches!(err, CineFetchError::MalformedResponse(_)));
}

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::new(1, 1);
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buffer, image::ImageOutputFormat::Png)
        .expect("encode png");
    buffer.into_inner()
}

#[tokio::test]
async fn image_fetcher_returns_decodable_poster_bytes() {
    let mut server = mockito::Server::new_async().await;
    let png = tiny_png();
    server
        .mock("GET", "/poster.png")
        .with_status(200)
        .with_body(png.clone())
        .create_async()
        .await;

    let fetcher = HttpImageFetcher::new(http_client());
    let bytes = fetcher
        .fetch_bytes(&format!("{}/poster.png", server.url()))
        .await
        .unwrap();
    assert_eq!(bytes, png);
}

#[tokio::test]
async fn undecodable_poster_is_a_fetch_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/poster.png")
        .with_status(200)
        .with_body("not an image")
        .create_async()
        .await;

    let fetcher = HttpImageFetcher::new(http_client());
    let err = fetcher
        .fetch_bytes(&format!("{}/poster.png", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(err, CineFetchError::FetchFailed(_)));
}

#[tokio::test]
async fn poster_http_error_is_a_fetch_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/poster.png")
        .with_status(404)
        .create_async()
        .await;

    let fetcher = HttpImageFetcher::new(http_client());
    let err = fetcher
        .fetch_bytes(&format!("{}/poster.png", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(err, CineFetchError::FetchFailed(_)));
}

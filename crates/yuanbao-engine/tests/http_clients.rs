use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{
    header_exists, header_regex, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yuanbao_contracts::config::PluginConfig;
use yuanbao_engine::{ImageDownload, ImageFetcher, ImageLookup, ImageRequestClient};

fn api_client(server: &MockServer) -> ImageRequestClient {
    let config = PluginConfig {
        api_base_url: format!("{}/draw", server.uri()),
        account_id: "10001".to_string(),
        ..PluginConfig::default()
    };
    ImageRequestClient::new(Arc::new(config)).unwrap()
}

#[tokio::test]
async fn api_sends_encoded_query_and_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/draw"))
        .and(query_param("msg", "一只 猫"))
        .and(query_param("qq", "10001"))
        .and(query_param("fg", "油画风格"))
        .and(header_regex("user-agent", "^Mozilla/5.0 "))
        .and(header_exists("accept"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": [{"url": "http://x/1.png"}, {"url": ""}, {"url": "http://x/2.png"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = api_client(&server)
        .request_images("一只 猫", Some("油画风格"))
        .await;
    assert_eq!(
        lookup,
        ImageLookup::Urls(vec![
            "http://x/1.png".to_string(),
            "http://x/2.png".to_string()
        ])
    );
}

#[tokio::test]
async fn api_omits_style_parameter_without_style() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/draw"))
        .and(query_param("msg", "cat"))
        .and(query_param_is_missing("fg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": [{"url": "http://x/1.png"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let urls = api_client(&server).request_images("cat", None).await.into_urls();
    assert_eq!(urls, vec!["http://x/1.png"]);
}

#[tokio::test]
async fn api_error_envelope_yields_no_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/draw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 500})))
        .mount(&server)
        .await;

    let lookup = api_client(&server).request_images("cat", None).await;
    assert!(matches!(lookup, ImageLookup::Failed(_)));
    assert!(lookup.into_urls().is_empty());
}

#[tokio::test]
async fn api_non_200_status_yields_no_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/draw"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "code": 200,
            "data": [{"url": "http://x/1.png"}]
        })))
        .mount(&server)
        .await;

    let lookup = api_client(&server).request_images("cat", None).await;
    assert_eq!(lookup, ImageLookup::Failed("unexpected status 503".to_string()));
}

#[tokio::test]
async fn api_timeout_yields_no_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/draw"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "data": [{"url": "http://x/1.png"}]}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let lookup = api_client(&server)
        .with_timeout(Duration::from_millis(100))
        .request_images("cat", None)
        .await;
    assert!(matches!(lookup, ImageLookup::Failed(_)));
}

#[tokio::test]
async fn api_unreachable_host_yields_no_urls() {
    let config = PluginConfig {
        api_base_url: "http://127.0.0.1:9/draw".to_string(),
        ..PluginConfig::default()
    };
    let lookup = ImageRequestClient::new(Arc::new(config))
        .unwrap()
        .with_timeout(Duration::from_secs(2))
        .request_images("cat", None)
        .await;
    assert!(lookup.into_urls().is_empty());
}

#[tokio::test]
async fn fetch_rejects_body_at_threshold() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/small.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 1000]))
        .mount(&server)
        .await;

    let fetcher = ImageFetcher::new(true).unwrap();
    let download = fetcher.fetch(&format!("{}/small.png", server.uri())).await;
    assert!(matches!(download, ImageDownload::Rejected(_)));
}

#[tokio::test]
async fn fetch_accepts_body_above_threshold() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.png"))
        .and(header_regex("accept", "image/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 1001]))
        .mount(&server)
        .await;

    let url = format!("{}/big.png", server.uri());
    let asset = ImageFetcher::new(true)
        .unwrap()
        .fetch(&url)
        .await
        .into_asset()
        .unwrap();
    assert_eq!(asset.source_url, url);
    assert_eq!(asset.bytes.len(), 1001);
}

#[tokio::test]
async fn fetch_rejects_non_200_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404).set_body_bytes(vec![1u8; 4096]))
        .mount(&server)
        .await;

    let download = ImageFetcher::new(true)
        .unwrap()
        .fetch(&format!("{}/gone.png", server.uri()))
        .await;
    assert_eq!(
        download,
        ImageDownload::Rejected("unexpected status 404".to_string())
    );
}

#[tokio::test]
async fn fetch_timeout_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![1u8; 4096])
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let download = ImageFetcher::new(true)
        .unwrap()
        .with_timeout(Duration::from_millis(100))
        .fetch(&format!("{}/slow.png", server.uri()))
        .await;
    assert!(matches!(download, ImageDownload::Failed(_)));
}

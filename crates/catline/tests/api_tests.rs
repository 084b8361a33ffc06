//! REST endpoint tests against a mock server.

use catline::{CatApi, CatConfig, CatError, NetworkError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> CatConfig {
    CatConfig::new("127.0.0.1")
        .port(server.address().port())
        .user("alice")
        .instant(false)
}

fn api_for(server: &MockServer) -> CatApi {
    CatApi::new(&config_for(server)).expect("Failed to build api")
}

#[tokio::test]
async fn test_base_url() {
    let server = MockServer::start().await;
    let api = api_for(&server);
    assert_eq!(api.base_url(), format!("http://127.0.0.1:{}", server.address().port()));
}

#[tokio::test]
async fn test_status_sends_identity_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("access_token", "meow"))
        .and(header("user_id", "alice"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "We're all mad here, dear!", "version": "1.7"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = CatApi::new(&config_for(&server).auth_key("meow")).unwrap();
    let status = api.status().await.unwrap();

    assert_eq!(status.status, "We're all mad here, dear!");
    assert_eq!(status.version.as_deref(), Some("1.7"));
}

#[tokio::test]
async fn test_no_access_token_without_auth_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    api_for(&server).status().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("access_token").is_none());
    assert_eq!(requests[0].headers.get("user_id").unwrap(), "alice");
}

#[tokio::test]
async fn test_list_plugins_with_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plugins/"))
        .and(query_param("query", "weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "filters": {"query": "weather"},
            "installed": [{"id": "weather", "name": "Weather", "active": true}],
            "registry": [{"id": "weather_pro", "name": "Weather Pro", "url": "https://example.com/wp"}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = api_for(&server).plugins().list(Some("weather")).await.unwrap();

    assert_eq!(list.filters.query.as_deref(), Some("weather"));
    assert_eq!(list.installed.len(), 1);
    assert_eq!(list.installed[0].active, Some(true));
    assert_eq!(list.registry[0].extra["url"], "https://example.com/wp");
}

#[tokio::test]
async fn test_list_plugins_without_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plugins/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"installed": [], "registry": []})))
        .mount(&server)
        .await;

    let list = api_for(&server).plugins().list(None).await.unwrap();
    assert!(list.installed.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn test_upload_plugin_archive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/plugins/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "filename": "weather.zip",
            "content_type": "application/zip",
            "info": "Plugin is being installed asynchronously",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = api_for(&server)
        .plugins()
        .upload(b"PK\x03\x04".to_vec(), "weather.zip")
        .await
        .unwrap();
    assert_eq!(response.filename, "weather.zip");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"weather.zip\""));
    assert!(body.contains("application/zip"));
}

#[tokio::test]
async fn test_upload_from_registry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/plugins/upload/registry"))
        .and(body_json(json!({"url": "https://example.com/weather"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://example.com/weather",
            "info": "Plugin is being installed asynchronously",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = api_for(&server)
        .plugins()
        .upload_from_registry("https://example.com/weather")
        .await
        .unwrap();
    assert_eq!(response.url, "https://example.com/weather");
}

#[tokio::test]
async fn test_toggle_details_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/plugins/toggle/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"info": "Plugin weather toggled"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plugins/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "weather", "name": "Weather", "hooks": [{"name": "before_cat_sends_message", "priority": 1}]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/plugins/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": "weather"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let plugins = api.plugins();

    assert_eq!(plugins.toggle("weather").await.unwrap().info, "Plugin weather toggled");
    let details = plugins.details("weather").await.unwrap();
    assert_eq!(details.data.hooks.len(), 1);
    assert_eq!(plugins.delete("weather").await.unwrap().deleted, "weather");
}

#[tokio::test]
async fn test_plugin_id_is_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plugins/my%20plugin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "my plugin"}})))
        .expect(1)
        .mount(&server)
        .await;

    let details = api_for(&server).plugins().details("my plugin").await.unwrap();
    assert_eq!(details.data.id, "my plugin");
}

#[tokio::test]
async fn test_plugin_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plugins/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "settings": [{"name": "weather", "value": {"unit": "C"}, "schema": {"type": "object"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plugins/settings/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "weather", "value": {"unit": "C"}})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/plugins/settings/weather"))
        .and(body_json(json!({"unit": "F"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "weather", "value": {"unit": "F"}})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let plugins = api.plugins();

    let all = plugins.settings().await.unwrap();
    assert_eq!(all.settings[0].name, "weather");
    assert!(all.settings[0].schema.is_some());

    let one = plugins.get_settings("weather").await.unwrap();
    assert_eq!(one.value, json!({"unit": "C"}));

    let updated = plugins.upsert_settings("weather", &json!({"unit": "F"})).await.unwrap();
    assert_eq!(updated.value["unit"], "F");
}

#[tokio::test]
async fn test_embedder_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/embedder/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "settings": [
                {"name": "EmbedderFakeConfig", "value": {}},
                {"name": "EmbedderOpenAIConfig", "value": {}},
            ],
            "selected_configuration": "EmbedderFakeConfig",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/embedder/settings/EmbedderOpenAIConfig"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "EmbedderOpenAIConfig", "value": {}})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/embedder/settings/EmbedderOpenAIConfig"))
        .and(body_json(json!({"openai_api_key": "sk-test"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "EmbedderOpenAIConfig",
            "value": {"openai_api_key": "sk-test"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let embedder = api.embedder();

    let all = embedder.settings().await.unwrap();
    assert_eq!(all.settings.len(), 2);
    assert_eq!(all.selected_configuration.as_deref(), Some("EmbedderFakeConfig"));

    let one = embedder.setting("EmbedderOpenAIConfig").await.unwrap();
    assert_eq!(one.name, "EmbedderOpenAIConfig");

    let updated = embedder
        .upsert_setting("EmbedderOpenAIConfig", &json!({"openai_api_key": "sk-test"}))
        .await
        .unwrap();
    assert_eq!(updated.value["openai_api_key"], "sk-test");
}

#[tokio::test]
async fn test_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/embedder/settings/Unknown"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["path", "languageEmbedderName"], "msg": "unknown embedder", "type": "value_error"}]
        })))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .embedder()
        .upsert_setting("Unknown", &json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    match err {
        CatError::Validation(validation) => {
            assert_eq!(validation.detail.len(), 1);
            assert_eq!(validation.detail[0].msg, "unknown embedder");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid Credentials"))
        .mount(&server)
        .await;

    let err = api_for(&server).status().await.unwrap_err();
    assert!(matches!(
        err,
        CatError::Network(NetworkError::HttpStatus { status: 403, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_server() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = CatConfig::new("127.0.0.1").port(port).instant(false);

    let err = CatApi::new(&config).unwrap().status().await.unwrap_err();
    assert!(matches!(err, CatError::Network(NetworkError::Connection(_))));
}

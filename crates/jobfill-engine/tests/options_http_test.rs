use jobfill_engine::options::{HttpOptionSource, OptionSource, fetch_all_options};
use jobfill_engine::protocol::OptionId;
use jobfill_engine::remote::SourceError;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn items(range: std::ops::RangeInclusive<u32>) -> serde_json::Value {
    json!(
        range
            .map(|i| json!({ "id": i, "text": format!("School {}", i) }))
            .collect::<Vec<_>>()
    )
}

#[tokio::test]
async fn fetches_page_with_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schools"))
        .and(query_param("term", "mit"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": 10, "text": "MIT" },
                { "id": "ext-7", "text": "MIT Sloan" }
            ],
            "meta": { "total_count": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpOptionSource::new();
    let page = source
        .fetch_page(&format!("{}/schools?term=mit", server.uri()), 1, 2)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, OptionId::Int(10));
    assert_eq!(page.items[1].id, OptionId::Text("ext-7".into()));
    assert_eq!(page.meta.total_count, Some(2));
}

#[tokio::test]
async fn walks_every_page_over_http() {
    let server = MockServer::start().await;
    for (page, range) in [(1, 1..=2), (2, 3..=4), (3, 5..=5)] {
        Mock::given(method("GET"))
            .and(path("/schools"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": items(range),
                "meta": { "total_count": 5 }
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let source = HttpOptionSource::new();
    let fetched = fetch_all_options(&source, &format!("{}/schools", server.uri()), 2).await;

    assert!(fetched.is_complete());
    assert_eq!(fetched.items.len(), 5);
    assert_eq!(
        fetched.find_by_text("school 5").map(|o| o.id.to_string()),
        Some("5".to_string())
    );
}

#[tokio::test]
async fn server_error_keeps_earlier_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schools"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": items(1..=2),
            "meta": { "total_count": 6 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schools"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = HttpOptionSource::new();
    let fetched = fetch_all_options(&source, &format!("{}/schools", server.uri()), 2).await;

    assert_eq!(fetched.items.len(), 2);
    assert_eq!(fetched.total, Some(6));
    assert!(fetched.error.as_deref().unwrap().contains("500"));
}

#[tokio::test]
async fn missing_total_means_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": items(1..=2)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpOptionSource::new();
    let fetched = fetch_all_options(&source, &format!("{}/schools", server.uri()), 2).await;

    assert_eq!(fetched.items.len(), 2);
    assert_eq!(fetched.total, None);
    assert!(fetched.is_complete());
}

#[tokio::test]
async fn malformed_body_is_a_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let source = HttpOptionSource::new();
    let err = source
        .fetch_page(&format!("{}/schools", server.uri()), 1, 100)
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Serialization(_)));
}

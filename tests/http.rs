use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use perfume_gateway::api::{AppState, router};
use perfume_gateway::config::AppConfig;

fn app(server: &MockServer, api_key: Option<&str>) -> Router {
    let mut config = AppConfig::default();
    config.pocketbase.base_url = server.uri();
    config.openai.base_url = server.uri();
    config.openai.api_key = api_key.map(str::to_string);

    router(AppState::from_config(&config).expect("Failed to build state."))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("Request failed.");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body.");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn items(records: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "page": 1, "items": records }))
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn root_reports_running() {
    let server = MockServer::start().await;
    let response = app(&server, None).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Backend server is running!");
}

#[tokio::test]
async fn plain_search_requires_search_text() {
    let server = MockServer::start().await;
    let (status, body) = send(app(&server, None), get("/api/perfumes")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "searchText query parameter is required");
}

#[tokio::test]
async fn plain_search_rejects_unknown_match_mode() {
    let server = MockServer::start().await;
    let (status, _) = send(
        app(&server, None),
        get("/api/perfumes?searchText=oud&match=some"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plain_search_finds_equivalence_by_description_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/perfumes/records"))
        .respond_with(items(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/equivalencias/records"))
        .respond_with(items(json!([{
            "id": "eq1",
            "title": "Dulce 12",
            "description": "Notas de vanilla y ámbar",
            "store": "Tienda Uno",
            "price": "9,95 €"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(app(&server, None), get("/api/perfumes?searchText=vanilla")).await;

    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().expect("expected an array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "eq1");
    assert_eq!(records[0]["perfume_title"], "Nombre de Perfume Original no Disponible");
}

#[tokio::test]
async fn plain_search_applies_refinement() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/perfumes/records"))
        .respond_with(items(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/equivalencias/records"))
        .respond_with(items(json!([
            { "id": "a", "store": "S1", "price": "30 €" },
            { "id": "b", "store": "S2", "price": "10 €" },
            { "id": "c", "store": "S1", "price": "12,50 € – 20 €" }
        ])))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server, None),
        get("/api/perfumes?searchText=rosa&store=S1&sort=price"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["c", "a"]);
}

#[tokio::test]
async fn plain_search_keeps_good_records_next_to_malformed_ones() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/perfumes/records"))
        .respond_with(items(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/equivalencias/records"))
        .respond_with(items(json!([
            { "id": "good1", "description": "vanilla", "price": "9,95 €" },
            { "id": "bad", "description": "vanilla", "price": null, "store": 7 },
            { "id": "broken", "description": "vanilla", "expand": "not an object" }
        ])))
        .mount(&server)
        .await;

    let (status, body) = send(app(&server, None), get("/api/perfumes?searchText=vanilla")).await;

    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().expect("expected an array");
    let ids: Vec<&str> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["good1", "bad"]);
    assert_eq!(records[1]["price"], "");
    assert_eq!(records[1]["store"], "7");
}

#[tokio::test]
async fn plain_search_treats_blank_price_bounds_as_unset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/perfumes/records"))
        .respond_with(items(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/equivalencias/records"))
        .respond_with(items(json!([
            { "id": "a", "price": "30 €" },
            { "id": "b", "price": "" }
        ])))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server, None),
        get("/api/perfumes?searchText=rosa&minPrice=&maxPrice="),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn plain_search_rejects_non_numeric_price_bound() {
    let server = MockServer::start().await;
    let (status, _) = send(
        app(&server, None),
        get("/api/perfumes?searchText=rosa&minPrice=cheap"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ai_search_surfaces_unparseable_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("not json"))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server, Some("sk-test")),
        post_json("/api/perfumes/ai-search", json!({ "description": "algo dulce" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to parse AI response.");
    assert_eq!(body["rawResponse"], "not json");
}

#[tokio::test]
async fn ai_search_without_key_fails_before_calling_out() {
    let server = MockServer::start().await;
    let (status, body) = send(
        app(&server, None),
        post_json("/api/perfumes/ai-search", json!({ "description": "algo dulce" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "AI service is not configured.");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn ai_search_requires_description() {
    let server = MockServer::start().await;
    let (status, body) = send(
        app(&server, Some("sk-test")),
        post_json("/api/perfumes/ai-search", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "description field is required in the request body");
}

#[tokio::test]
async fn ai_search_returns_analysis_matches_and_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(
            r#"{"keywords": ["vainilla"], "scent_family": "Gourmand", "mood_or_occasion": ""}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/perfumes/records"))
        .and(query_param("perPage", "20"))
        .respond_with(items(json!([{ "id": "p1", "title": "Tobacco Vanille" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/equivalencias/records"))
        .and(query_param("filter", "(perfume_id=\"p1\")"))
        .and(query_param("expand", "perfume_id"))
        .respond_with(items(json!([{
            "id": "eq9",
            "title": "Equivalente 9",
            "perfume_id": "p1",
            "expand": { "perfume_id": { "id": "p1", "title": "Tobacco Vanille" } }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server, Some("sk-test")),
        post_json(
            "/api/perfumes/ai-search",
            json!({ "description": "dulce, con vainilla" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userInput"], "dulce, con vainilla");
    assert_eq!(body["aiAnalysis"]["scent_family"], "Gourmand");
    assert_eq!(body["matchedEquivalencias"][0]["id"], "eq9");
    assert_eq!(body["matchedEquivalencias"][0]["perfume_title"], "Tobacco Vanille");

    let filter = body["generatedFilter"].as_str().unwrap();
    assert!(filter.contains("title~\"vainilla\""));
    assert!(filter.contains("title~\"Gourmand\""));
}

#[tokio::test]
async fn ai_search_with_no_terms_skips_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("{}"))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server, Some("sk-test")),
        post_json("/api/perfumes/ai-search", json!({ "description": "no sé" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generatedFilter"], "");
    assert_eq!(body["matchedEquivalencias"], json!([]));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "only the completion call should be made");
}

#[tokio::test]
async fn equivalences_need_ids_or_terms() {
    let server = MockServer::start().await;
    let (status, _) = send(app(&server, None), get("/api/equivalencias")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn equivalences_by_ids_join_through_parent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/equivalencias/records"))
        .and(query_param("filter", "(perfume_id=\"p1\" || perfume_id=\"p2\")"))
        .respond_with(items(json!([{ "id": "e1", "perfume_id": "p1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server, None),
        get("/api/equivalencias?perfumeIds=p1,%20p2,"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "e1");
}

#[tokio::test]
async fn equivalences_soft_fail_to_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = send(app(&server, None), get("/api/equivalencias?search=oud")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn health_reports_catalog_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (status, body) = send(app(&server, None), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["catalog"], "down");
    assert_eq!(body["ai_enabled"], false);
}

//! Public search visibility and lead capture.

use elate_chem_integration_tests::{TestServer, vendor};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};

async fn five_acids() -> TestServer {
    let server = TestServer::start([
        vendor(1, "Acetic acid", "64-19-7"),
        vendor(2, "Citric acid", "77-92-9"),
        vendor(3, "Nitric acid", "7697-37-2"),
        vendor(4, "Sulfuric acid", "7664-93-9"),
        vendor(5, "Formic acid", "64-18-6"),
        vendor(6, "Toluene", "108-88-3"),
    ])
    .await;
    server.backend.add_user("buyer@example.test", "correct horse");
    server
}

#[tokio::test]
async fn test_anonymous_sees_one_signed_in_sees_all() {
    let server = five_acids().await;
    let client = TestServer::client();

    let body: Value = client
        .get(server.url("/api/search?q=acid"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_count"], 5);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["hidden_count"], 4);
    assert_eq!(body["authenticated"], false);

    let resp = client
        .post(server.url("/api/auth/login"))
        .json(&json!({"email": "buyer@example.test", "password": "correct horse"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = client
        .get(server.url("/api/search?q=acid"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["results"].as_array().unwrap().len(), 5);
    assert_eq!(body["hidden_count"], 0);
    assert_eq!(body["authenticated"], true);

    let resp = client
        .post(server.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = client
        .get(server.url("/api/search?q=acid"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_home_page_teaser() {
    let server = five_acids().await;
    let client = TestServer::client();

    let html = client
        .get(server.url("/?q=acid"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("4 more results"));
}

#[tokio::test]
async fn test_wrong_visitor_password() {
    let server = five_acids().await;
    let client = TestServer::client();

    let resp = client
        .post(server.url("/api/auth/login"))
        .json(&json!({"email": "buyer@example.test", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_blank_query_skips_store() {
    let server = five_acids().await;
    let client = TestServer::client();

    let body: Value = client
        .get(server.url("/api/search?q=%20%20"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_count"], 0);
    assert!(body["results"].as_array().unwrap().is_empty());
    assert!(server.backend.searches().is_empty());
}

#[tokio::test]
async fn test_cas_number_search() {
    let server = five_acids().await;
    let client = TestServer::client();

    let body: Value = client
        .get(server.url("/api/search?q=108-88"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["results"][0]["chemical_name"], "Toluene");
}

#[tokio::test]
async fn test_not_found_request_form() {
    let server = five_acids().await;
    let client = TestServer::client();

    let html = client
        .get(server.url("/?q=xylene"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("We couldn&#x27;t find") || html.contains("We couldn't find"));

    let resp = client
        .post(server.url("/search-requests"))
        .form(&[
            ("chemical_name", "Xylene"),
            ("cas_number", ""),
            ("contact_info", "buyer@example.test"),
            ("searched_query", "xylene"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()[header::LOCATION],
        "/?q=xylene&notice=request_sent"
    );

    let requests = server.backend.search_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].chemical_name, "Xylene");
}

#[tokio::test]
async fn test_contact_api_validates() {
    let server = five_acids().await;
    let client = TestServer::client();

    let resp = client
        .post(server.url("/api/contact"))
        .json(&json!({"name": "Priya", "email": "", "message": "Hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(server.url("/api/contact"))
        .json(&json!({"name": "Priya", "email": "p@example.test", "message": "Hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(server.backend.contacts().len(), 1);
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start([]).await;
    let client = TestServer::client();

    let resp = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = client.get(server.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    server.backend.fail_reads(true);
    let resp = client.get(server.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

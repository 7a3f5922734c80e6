//! Admin vendor API and dashboard forms.

use elate_chem_integration_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, TestServer, vendor};
use reqwest::{Client, StatusCode, header};
use serde_json::{Value, json};

async fn admin_client(server: &TestServer) -> Client {
    let client = TestServer::client();
    let resp = client
        .post(server.url("/api/login"))
        .json(&json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    client
}

fn new_vendor() -> Value {
    json!({
        "chemical_name": "Benzene",
        "category": "Aromatic",
        "cas_number": "71-43-2",
        "supplier_name": "Benz Co",
        "contact_info": "sales@benz.test",
        "phone_number": "+49 30 5550 0100",
        "business_status": "Trader",
        "country": "Germany",
    })
}

#[tokio::test]
async fn test_next_srno_after_gaps() {
    let server = TestServer::start([
        vendor(1, "Acetone", "67-64-1"),
        vendor(3, "Benzene", "71-43-2"),
        vendor(7, "Toluene", "108-88-3"),
    ])
    .await;
    let client = admin_client(&server).await;

    let body: Value = client
        .get(server.url("/api/admin/vendors/next-srno"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["sequence_number"], "8");
}

#[tokio::test]
async fn test_next_srno_empty_directory() {
    let server = TestServer::start([]).await;
    let client = admin_client(&server).await;

    let body: Value = client
        .get(server.url("/api/admin/vendors/next-srno"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["sequence_number"], "1");
}

#[tokio::test]
async fn test_insert_update_fetch() {
    let server = TestServer::start([vendor(1, "Acetone", "67-64-1")]).await;
    let client = admin_client(&server).await;

    let resp = client
        .post(server.url("/api/admin/vendors"))
        .json(&new_vendor())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["vendor"]["sequence_number"], "2");

    let mut changed = new_vendor();
    changed["country"] = json!("Austria");
    let resp = client
        .put(server.url("/api/admin/vendors/2"))
        .json(&changed)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["vendor"]["country"], "Austria");

    let fetched: Value = client
        .get(server.url("/api/admin/vendors/2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut expected = new_vendor();
    expected["country"] = json!("Austria");
    expected["sequence_number"] = json!("2");
    assert_eq!(fetched, expected);
}

#[tokio::test]
async fn test_insert_requires_every_field() {
    let server = TestServer::start([]).await;
    let client = admin_client(&server).await;

    let mut partial = new_vendor();
    partial["country"] = json!("  ");
    let resp = client
        .post(server.url("/api/admin/vendors"))
        .json(&partial)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(server.backend.vendors().is_empty());
}

#[tokio::test]
async fn test_update_unknown_vendor() {
    let server = TestServer::start([]).await;
    let client = admin_client(&server).await;

    let resp = client
        .put(server.url("/api/admin/vendors/42"))
        .json(&new_vendor())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_needs_confirmation() {
    let server = TestServer::start([
        vendor(1, "Acetone", "67-64-1"),
        vendor(2, "Benzene", "71-43-2"),
        vendor(3, "Toluene", "108-88-3"),
    ])
    .await;
    let client = admin_client(&server).await;

    let resp = client
        .delete(server.url("/api/admin/vendors/2"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.backend.vendors().len(), 3);

    let resp = client
        .delete(server.url("/api/admin/vendors/2?confirm=true"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = client
        .get(server.url("/api/admin/vendors"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["chemical_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Acetone", "Toluene"]);
    assert_eq!(body["total_count"], 2);
}

#[tokio::test]
async fn test_admin_listing_pages() {
    let server = TestServer::start((1..=23).map(|n| vendor(n, &format!("Chem {n}"), "1-1-1"))).await;
    let client = admin_client(&server).await;

    let body: Value = client
        .get(server.url("/api/admin/vendors?page=3"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["page"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    // Sequence numbers order as text: page 3 of 1..=23 is 7, 8, 9
    assert_eq!(body["results"][0]["sequence_number"], "7");

    // Past the end clamps to the last page
    let body: Value = client
        .get(server.url("/api/admin/vendors?page=9"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["page"], 3);
}

#[tokio::test]
async fn test_dashboard_add_form() {
    let server = TestServer::start([vendor(1, "Acetone", "67-64-1")]).await;
    let client = admin_client(&server).await;

    let html = client
        .get(server.url("/dashboard"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(r#"name="sequence_number" value="2""#));

    let resp = client
        .post(server.url("/dashboard/vendors"))
        .form(&[
            ("sequence_number", "2"),
            ("chemical_name", "Benzene"),
            ("category", "Aromatic"),
            ("cas_number", "71-43-2"),
            ("supplier_name", "Benz Co"),
            ("contact_info", "sales@benz.test"),
            ("phone_number", "555"),
            ("business_status", "Trader"),
            ("country", "Germany"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/dashboard?notice=added");
    assert_eq!(server.backend.vendors().len(), 2);

    // Submitting the stale number again is rejected and a new one offered
    let resp = client
        .post(server.url("/dashboard/vendors"))
        .form(&[
            ("sequence_number", "2"),
            ("chemical_name", "Phenol"),
            ("category", "Aromatic"),
            ("cas_number", "108-95-2"),
            ("supplier_name", "Benz Co"),
            ("contact_info", "sales@benz.test"),
            ("phone_number", "555"),
            ("business_status", "Trader"),
            ("country", "Germany"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Sequence number 2 is already taken"));
    assert!(html.contains(r#"name="sequence_number" value="3""#));
    assert!(html.contains("Phenol"));
}

#[tokio::test]
async fn test_dashboard_unreadable_store_offers_first_number() {
    let server = TestServer::start([vendor(4, "Acetone", "67-64-1")]).await;
    let client = admin_client(&server).await;
    server.backend.fail_reads(true);

    let html = client
        .get(server.url("/dashboard"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(r#"name="sequence_number" value="1""#));
    assert!(html.contains("Could not load vendors"));
}

#[tokio::test]
async fn test_dashboard_edit_and_delete_pages() {
    let server = TestServer::start([
        vendor(1, "Acetone", "67-64-1"),
        vendor(2, "Benzene", "71-43-2"),
    ])
    .await;
    let client = admin_client(&server).await;

    let html = client
        .get(server.url("/dashboard/vendors/2/edit"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Benzene"));

    let mut form: Vec<(&str, String)> = vec![
        ("chemical_name", "Benzene".to_string()),
        ("category", "Solvent".to_string()),
        ("cas_number", "71-43-2".to_string()),
        ("supplier_name", "Supplier 2".to_string()),
        ("contact_info", "sales2@supplier.test".to_string()),
        ("phone_number", "+91 22 5550 0100".to_string()),
        ("business_status", "Manufacturer".to_string()),
        ("country", "Japan".to_string()),
    ];
    let resp = client
        .post(server.url("/dashboard/vendors/2"))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/dashboard?notice=updated");

    form.retain(|(name, _)| *name != "country");
    let resp = client
        .post(server.url("/dashboard/vendors/2"))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(server.url("/dashboard/vendors/2/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(server.backend.vendors().len(), 2);

    let resp = client
        .post(server.url("/dashboard/vendors/2/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()[header::LOCATION], "/dashboard?notice=deleted");

    let remaining = server.backend.vendors();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].details.chemical_name, "Acetone");
}

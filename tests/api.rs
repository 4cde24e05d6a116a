use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use outreach_tracker::server::{build_router, AppState};
use tracker_core::filter::{EntryFilter, EntryQuery};
use tracker_core::models::{Club, Entry, NewEntry, Status, StatusUpdate};
use tracker_core::store::{CompanyMatches, ContactProbe, SuggestField};
use tracker_core::{EntryStore, InMemoryStore, KeywordScreener};

/// Serve the API over `store` on an ephemeral port and return its base URL.
async fn spawn_app(store: InMemoryStore) -> String {
    spawn_with(store, KeywordScreener::new()).await
}

async fn spawn_with(store: impl EntryStore + 'static, screener: KeywordScreener) -> String {
    let state = AppState::new(Arc::new(store), screener);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn payload(company: &str) -> Value {
    json!({
        "member_name": "Asha",
        "club": "8x8",
        "company": company,
        "email": "hr@example.com",
        "entry_date": today(),
    })
}

fn stored(id: &str, company: &str, contact: Option<&str>, email: &str) -> Entry {
    Entry::with_id(
        id.to_string(),
        NewEntry {
            member_name: "Ravi".to_string(),
            club: Club::TheBigO,
            company: company.to_string(),
            opportunity_type: None,
            contact_person: contact.map(str::to_string),
            email: Some(email.to_string()),
            linkedin: None,
            phone: None,
            status: Status::YetToContact,
            status_notes: None,
            entry_date: "2024-06-01".to_string(),
        },
        "2024-06-01T00:00:00Z",
        "2024-06-01T00:00:00Z",
    )
}

async fn create(client: &Client, base: &str, body: &Value) -> Value {
    let res = client
        .post(format!("{}/api/entries", base))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json::<Value>().await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let base = spawn_app(InMemoryStore::new()).await;
    let body: Value = reqwest::get(format!("{}/api/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_create_then_fetch() {
    let base = spawn_app(InMemoryStore::new()).await;
    let client = Client::new();

    let created = create(&client, &base, &payload("  Acme  ")).await;
    assert_eq!(created["success"], true);
    let entry = &created["data"];
    assert_eq!(entry["company"], "Acme");
    assert_eq!(entry["status"], "Yet to contact");
    assert_eq!(entry["created_at"], entry["updated_at"]);

    let id = entry["id"].as_str().unwrap();
    let res = client
        .get(format!("{}/api/entries/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["data"]["id"], id);
}

#[tokio::test]
async fn test_financial_company_rejected() {
    let base = spawn_app(InMemoryStore::new()).await;
    let res = Client::new()
        .post(format!("{}/api/entries", base))
        .json(&payload("ABC Bank"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Financial company detected");
    let keywords = body["blocked_keywords"].as_array().unwrap();
    assert!(keywords.contains(&json!("bank")));
}

#[tokio::test]
async fn test_financial_opportunity_rejected() {
    let base = spawn_app(InMemoryStore::new()).await;
    let mut body = payload("Acme");
    body["opportunity_type"] = json!("Investment banking internship");
    let res = Client::new()
        .post(format!("{}/api/entries", base))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Financial opportunity detected");
}

#[tokio::test]
async fn test_configured_extra_keywords_apply() {
    let screener = KeywordScreener::new().with_extra(&["globex".to_string()], &[]);
    let base = spawn_with(InMemoryStore::new(), screener).await;
    let res = Client::new()
        .post(format!("{}/api/entries", base))
        .json(&payload("Globex Corp"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validation_details() {
    let base = spawn_app(InMemoryStore::new()).await;
    let res = Client::new()
        .post(format!("{}/api/entries", base))
        .json(&json!({
            "member_name": "Asha",
            "club": "Chess Club",
            "company": "Acme",
            "status": "Others",
            "entry_date": "01/06/2024",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "bad_request");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"club"));
    assert!(fields.contains(&"entry_date"));
    assert!(fields.contains(&"status_notes"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let base = spawn_app(InMemoryStore::new()).await;
    let res = Client::new()
        .post(format!("{}/api/entries", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_and_count() {
    let base = spawn_app(InMemoryStore::new()).await;
    let client = Client::new();
    create(&client, &base, &payload("Acme Robotics")).await;
    create(&client, &base, &payload("Initech")).await;

    let body: Value = client
        .get(format!("{}/api/entries?company=acme&club=8x8&status=", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["company"], "Acme Robotics");

    let body: Value = client
        .get(format!("{}/api/entries", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["company"], "Initech");
}

#[tokio::test]
async fn test_replace_keeps_created_at() {
    let base = spawn_app(InMemoryStore::new()).await;
    let client = Client::new();
    let created = create(&client, &base, &payload("Acme")).await;
    let id = created["data"]["id"].as_str().unwrap();

    let res = client
        .put(format!("{}/api/entries/{}", base, id))
        .json(&payload("Initech"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["company"], "Initech");
    assert_eq!(body["data"]["created_at"], created["data"]["created_at"]);
}

#[tokio::test]
async fn test_status_patch() {
    let base = spawn_app(InMemoryStore::new()).await;
    let client = Client::new();
    let created = create(&client, &base, &payload("Acme")).await;
    let id = created["data"]["id"].as_str().unwrap();
    let url = format!("{}/api/entries/{}/status", base, id);

    let res = client
        .patch(&url)
        .query(&[("status", "Others")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .patch(&url)
        .query(&[("status", "Others"), ("status_notes", "Met at career fair")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = client
        .patch(&url)
        .query(&[("status", "Requested on mail")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["status"], "Requested on mail");
    assert_eq!(body["data"]["status_notes"], "Met at career fair");

    let res = client
        .patch(&url)
        .query(&[("status", "Shortlisted")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let base = spawn_app(InMemoryStore::new()).await;
    let client = Client::new();
    let id = uuid::Uuid::new_v4();

    let res = client
        .get(format!("{}/api/entries/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "not_found");

    let res = client
        .delete(format!("{}/api/entries/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(format!("{}/api/entries/{}", base, id))
        .json(&payload("Acme"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete() {
    let base = spawn_app(InMemoryStore::new()).await;
    let client = Client::new();
    let created = create(&client, &base, &payload("Acme")).await;
    let url = format!("{}/api/entries/{}", base, created["data"]["id"].as_str().unwrap());

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_scenario() {
    let base = spawn_app(InMemoryStore::new()).await;
    let client = Client::new();
    for status in ["In progress", "Rejected"] {
        let mut body = payload("Acme");
        body["status"] = json!(status);
        create(&client, &base, &body).await;
    }

    let body: Value = client
        .get(format!("{}/api/stats", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let report = &body["data"];
    assert_eq!(report["summary"]["total_entries"], 2);
    assert_eq!(report["summary"]["recent_entries_7days"], 2);
    assert_eq!(
        report["club_distribution"],
        json!([{ "club": "8x8", "count": 2 }])
    );
    let perf = &report["club_performance"][0];
    assert_eq!(perf["club"], "8x8");
    assert_eq!(perf["total_entries"], 2);
    assert_eq!(perf["active_count"], 1);
    assert_eq!(perf["success_rate"], 50.0);
    assert_eq!(report["top_companies"][0], json!({ "company": "Acme", "count": 2 }));
    assert_eq!(report["daily_timeline"][0]["date"], today());

    let body: Value = client
        .get(format!("{}/api/stats?club=Nature%20Watch&member_name=", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["summary"]["total_entries"], 0);
}

#[tokio::test]
async fn test_company_suggestions() {
    let store = InMemoryStore::with_entries(vec![
        stored("a", "Acme", None, "a@x.io"),
        stored("b", "ACE", None, "b@x.io"),
        stored("c", "Zen", None, "c@x.io"),
    ]);
    let base = spawn_app(store).await;
    let client = Client::new();

    let body: Value = client
        .get(format!("{}/api/suggestions/companies?q=Ac", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "success": true, "data": ["ACE", "Acme"] }));

    let res = client
        .get(format!("{}/api/suggestions/companies?q=%20A%20", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_suggestions_skip_missing() {
    let store = InMemoryStore::with_entries(vec![
        stored("a", "Acme", Some("Jordan Lee"), "a@x.io"),
        stored("b", "Acme", None, "b@x.io"),
        stored("c", "Zen", Some("Joanna Park"), "c@x.io"),
    ]);
    let base = spawn_app(store).await;

    let body: Value = reqwest::get(format!("{}/api/suggestions/contacts?q=jo", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], json!(["Joanna Park", "Jordan Lee"]));
}

#[tokio::test]
async fn test_check_duplicate_with_exclusion() {
    let store = InMemoryStore::with_entries(vec![stored("e1", "Acme", Some("Sam"), "x@y.com")]);
    let base = spawn_app(store).await;
    let client = Client::new();

    let body: Value = client
        .get(format!("{}/api/check-duplicate", base))
        .query(&[("email", "x@y.com"), ("company", "Acme")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = &body["data"];
    assert_eq!(body["success"], true);
    assert_eq!(data["duplicate_contact"]["exists"], true);
    assert_eq!(data["duplicate_contact"]["details"]["member_name"], "Ravi");
    assert_eq!(data["company_exists"]["exists"], true);
    assert_eq!(data["company_exists"]["count"], 1);
    assert_eq!(data["is_financial"], false);

    let body: Value = client
        .get(format!("{}/api/check-duplicate", base))
        .query(&[("email", "x@y.com"), ("exclude_id", "e1")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["duplicate_contact"]["exists"], false);
}

#[tokio::test]
async fn test_check_duplicate_flags_financial_company() {
    let base = spawn_app(InMemoryStore::new()).await;
    let body: Value = Client::new()
        .get(format!("{}/api/check-duplicate", base))
        .query(&[("company", "Northwind Insurance")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["is_financial"], true);
    assert!(body["data"]["blocked_keywords"]
        .as_array()
        .unwrap()
        .contains(&json!("insurance")));
    assert_eq!(body["data"]["company_exists"]["exists"], false);
}

/// Store whose every operation fails, standing in for a lost database.
struct UnavailableStore;

#[async_trait]
impl EntryStore for UnavailableStore {
    async fn insert_entry(&self, _entry: &Entry) -> Result<()> {
        bail!("database unavailable")
    }

    async fn get_entry(&self, _id: &str) -> Result<Option<Entry>> {
        bail!("database unavailable")
    }

    async fn replace_entry(&self, _id: &str, _fields: NewEntry, _now: &str) -> Result<Option<Entry>> {
        bail!("database unavailable")
    }

    async fn update_status(
        &self,
        _id: &str,
        _update: &StatusUpdate,
        _now: &str,
    ) -> Result<Option<Entry>> {
        bail!("database unavailable")
    }

    async fn delete_entry(&self, _id: &str) -> Result<bool> {
        bail!("database unavailable")
    }

    async fn list_entries(&self, _query: &EntryQuery) -> Result<Vec<Entry>> {
        bail!("database unavailable")
    }

    async fn find_entries(&self, _filter: &EntryFilter) -> Result<Vec<Entry>> {
        bail!("database unavailable")
    }

    async fn count_entries(&self, _filter: &EntryFilter) -> Result<u64> {
        bail!("database unavailable")
    }

    async fn suggest_values(
        &self,
        _field: SuggestField,
        _prefix: &str,
        _limit: usize,
    ) -> Result<Vec<String>> {
        bail!("database unavailable")
    }

    async fn find_by_contact(
        &self,
        _probe: &ContactProbe,
        _exclude_id: Option<&str>,
    ) -> Result<Option<Entry>> {
        bail!("database unavailable")
    }

    async fn find_by_company(
        &self,
        _company: &str,
        _exclude_id: Option<&str>,
    ) -> Result<CompanyMatches> {
        bail!("database unavailable")
    }
}

#[tokio::test]
async fn test_suggestion_store_failure_is_soft() {
    let base = spawn_with(UnavailableStore, KeywordScreener::new()).await;
    let client = Client::new();

    for path in ["companies", "contacts"] {
        let res = client
            .get(format!("{}/api/suggestions/{}?q=ac", base, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "success": false, "data": [] }));
    }
}

#[tokio::test]
async fn test_check_duplicate_store_failure_is_soft() {
    let base = spawn_with(UnavailableStore, KeywordScreener::new()).await;
    let res = Client::new()
        .get(format!("{}/api/check-duplicate", base))
        .query(&[("email", "x@y.com")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("database unavailable"));
}

#[tokio::test]
async fn test_stats_store_failure_is_internal_error() {
    let base = spawn_with(UnavailableStore, KeywordScreener::new()).await;
    let res = reqwest::get(format!("{}/api/stats", base)).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "internal");
}

#[tokio::test]
async fn test_unparseable_query_keeps_json_envelope() {
    let base = spawn_app(InMemoryStore::new()).await;
    let client = Client::new();

    let res = client
        .get(format!("{}/api/stats?club=8x8&club=Others", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "bad_request");

    let res = client
        .get(format!("{}/api/check-duplicate?email=a@b.io&email=c@d.io", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

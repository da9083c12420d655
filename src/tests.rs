//! Integration tests for the scheduler backend.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, LogFormat};
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

const GREETER_LEADER: i64 = 999;
const USHER_LEADER: i64 = 995;
const MUSIC_LEADER: i64 = 998;

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Pretty,
            upcoming_sundays: 16,
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn as_leader(&self, builder: RequestBuilder, leader_id: i64) -> RequestBuilder {
        builder.header("x-leader-id", leader_id.to_string())
    }

    fn as_member(&self, builder: RequestBuilder, member_id: i64) -> RequestBuilder {
        builder.header("x-member-id", member_id.to_string())
    }

    async fn register(&self, email: &str, primary: Value, secondary: Value) -> i64 {
        let resp = self
            .client
            .post(self.url("/api/members"))
            .json(&json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "email": email,
                "primaryTeams": primary,
                "secondaryTeams": secondary
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_i64().unwrap()
    }

    async fn assign(&self, leader_id: i64, date: &str, team: &str, member_id: i64) -> reqwest::Response {
        self.as_leader(
            self.client
                .post(self.url(&format!("/api/schedule/{}/{}", date, team))),
            leader_id,
        )
        .json(&json!({ "memberId": member_id }))
        .send()
        .await
        .unwrap()
    }

    async fn revision(&self) -> i64 {
        let body: Value = self
            .client
            .get(self.url("/api/datastore/revision"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["data"]["revisionId"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::new().await;

    // Plain client without the default key header
    let resp = Client::new()
        .get(fixture.url("/api/teams"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_psk() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/teams"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_no_psk_configured_allows_requests() {
    let fixture = TestFixture::with_psk(None).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/teams"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_session_roles() {
    let fixture = TestFixture::new().await;
    let member_id = fixture
        .register("jane@example.com", json!(["greeter"]), json!([]))
        .await;

    let resp = fixture
        .as_leader(fixture.client.get(fixture.url("/api/session")), GREETER_LEADER)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["team"], "greeter");
    assert_eq!(body["data"]["name"], "Will Johnson");

    let resp = fixture
        .as_member(fixture.client.get(fixture.url("/api/session")), member_id)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["id"], member_id);

    // No session headers
    let resp = fixture
        .client
        .get(fixture.url("/api/session"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Unknown leader
    let resp = fixture
        .as_leader(fixture.client.get(fixture.url("/api/session")), 42)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_team_directory() {
    let fixture = TestFixture::new().await;
    fixture
        .register("jane@example.com", json!(["greeter"]), json!(["usher"]))
        .await;

    let body: Value = fixture
        .client
        .get(fixture.url("/api/teams"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let teams = body["data"].as_array().unwrap();
    assert_eq!(teams.len(), 7);

    let greeter = teams.iter().find(|t| t["team"] == "greeter").unwrap();
    assert_eq!(greeter["leader"]["id"], GREETER_LEADER);
    assert_eq!(greeter["primaryCount"], 1);

    let body: Value = fixture
        .client
        .get(fixture.url("/api/teams/usher/members"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let roster = body["data"].as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["affiliation"], "secondary");
}

#[tokio::test]
async fn test_register_member_rejects_overlap() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/members"))
        .json(&json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jane@example.com",
            "primaryTeams": ["usher"],
            "secondaryTeams": ["usher"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_member_updates_only_own_teams() {
    let fixture = TestFixture::new().await;
    let jane = fixture
        .register("jane@example.com", json!(["greeter"]), json!([]))
        .await;
    let john = fixture
        .register("john@example.com", json!(["music"]), json!([]))
        .await;

    let resp = fixture
        .as_member(
            fixture.client.put(fixture.url(&format!("/api/members/{}", jane))),
            jane,
        )
        .json(&json!({ "primaryTeams": ["usher"], "secondaryTeams": ["prayer"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["primaryTeams"], json!(["usher"]));
    assert_eq!(body["data"]["secondaryTeams"], json!(["prayer"]));

    let resp = fixture
        .as_member(
            fixture.client.put(fixture.url(&format!("/api/members/{}", jane))),
            john,
        )
        .json(&json!({ "primaryTeams": ["music"], "secondaryTeams": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_assign_is_exclusive_per_date() {
    let fixture = TestFixture::new().await;
    let member = fixture
        .register("jane@example.com", json!(["greeter"]), json!(["music"]))
        .await;

    let resp = fixture
        .assign(GREETER_LEADER, "2024-06-02", "greeter", member)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["greeter"], json!([member]));

    let resp = fixture
        .assign(MUSIC_LEADER, "2024-06-02", "music", member)
        .await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "ALREADY_ASSIGNED_ELSEWHERE");
    assert_eq!(body["error"]["details"]["team"], "greeter");
    assert_eq!(body["error"]["details"]["leaderName"], "Will Johnson");

    // Another date is free
    let resp = fixture
        .assign(MUSIC_LEADER, "2024-06-09", "music", member)
        .await;
    assert_eq!(resp.status(), 200);

    let body: Value = fixture
        .client
        .get(fixture.url(&format!("/api/schedule/2024-06-02/lookup/{}", member)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["team"], "greeter");
}

#[tokio::test]
async fn test_assign_requires_team_leader() {
    let fixture = TestFixture::new().await;
    let member = fixture
        .register("jane@example.com", json!(["greeter"]), json!([]))
        .await;

    let resp = fixture
        .assign(USHER_LEADER, "2024-06-02", "greeter", member)
        .await;
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .as_member(
            fixture
                .client
                .post(fixture.url("/api/schedule/2024-06-02/greeter")),
            member,
        )
        .json(&json!({ "memberId": member }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_remove_member() {
    let fixture = TestFixture::new().await;
    let member = fixture
        .register("jane@example.com", json!(["greeter"]), json!([]))
        .await;
    fixture
        .assign(GREETER_LEADER, "2024-06-02", "greeter", member)
        .await;

    let path = format!("/api/schedule/2024-06-02/greeter/{}", member);

    let resp = fixture
        .as_leader(fixture.client.delete(fixture.url(&path)), USHER_LEADER)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .as_leader(fixture.client.delete(fixture.url(&path)), GREETER_LEADER)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].get("greeter").is_none());

    // Removing again is a no-op
    let revision = fixture.revision().await;
    let resp = fixture
        .as_leader(fixture.client.delete(fixture.url(&path)), GREETER_LEADER)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(fixture.revision().await, revision);
}

#[tokio::test]
async fn test_transfer_approval_moves_member_once() {
    let fixture = TestFixture::new().await;
    let member = fixture
        .register("jane@example.com", json!(["greeter"]), json!(["usher"]))
        .await;
    fixture
        .assign(GREETER_LEADER, "2024-06-02", "greeter", member)
        .await;

    // Usher leader asks the greeter leader for the member
    let resp = fixture
        .as_leader(fixture.client.post(fixture.url("/api/requests")), USHER_LEADER)
        .json(&json!({
            "memberId": member,
            "fromTeam": "greeter",
            "date": "2024-06-02",
            "message": "Short on ushers"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let request_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["toTeam"], "usher");
    assert_eq!(body["data"]["fromLeaderName"], "Will Johnson");

    // It shows up as incoming for greeter and outgoing for usher
    let body: Value = fixture
        .as_leader(
            fixture.client.get(fixture.url("/api/requests/incoming")),
            GREETER_LEADER,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let body: Value = fixture
        .as_leader(fixture.client.get(fixture.url("/api/requests")), USHER_LEADER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // The requesting leader cannot approve their own request
    let approve = format!("/api/requests/{}/approve", request_id);
    let resp = fixture
        .as_leader(fixture.client.post(fixture.url(&approve)), USHER_LEADER)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .as_leader(fixture.client.post(fixture.url(&approve)), GREETER_LEADER)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "approved");

    let body: Value = fixture
        .client
        .get(fixture.url("/api/schedule/2024-06-02"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["usher"], json!([member]));
    assert!(body["data"].get("greeter").is_none());

    // Second approval is rejected and changes nothing
    let revision = fixture.revision().await;
    let resp = fixture
        .as_leader(fixture.client.post(fixture.url(&approve)), GREETER_LEADER)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_STATE");
    assert_eq!(body["error"]["details"]["status"], "approved");
    assert_eq!(fixture.revision().await, revision);
}

#[tokio::test]
async fn test_transfer_denial_leaves_schedule() {
    let fixture = TestFixture::new().await;
    let member = fixture
        .register("jane@example.com", json!(["greeter"]), json!(["usher"]))
        .await;
    fixture
        .assign(GREETER_LEADER, "2024-06-02", "greeter", member)
        .await;

    let body: Value = fixture
        .as_leader(fixture.client.post(fixture.url("/api/requests")), USHER_LEADER)
        .json(&json!({ "memberId": member, "fromTeam": "greeter", "date": "2024-06-02" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    let resp = fixture
        .as_leader(
            fixture
                .client
                .post(fixture.url(&format!("/api/requests/{}/deny", request_id))),
            GREETER_LEADER,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "denied");

    let body: Value = fixture
        .client
        .get(fixture.url("/api/schedule/2024-06-02"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["greeter"], json!([member]));

    // Approving after denial fails
    let resp = fixture
        .as_leader(
            fixture
                .client
                .post(fixture.url(&format!("/api/requests/{}/approve", request_id))),
            GREETER_LEADER,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn test_transfer_unknown_request() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .as_leader(
            fixture
                .client
                .post(fixture.url("/api/requests/does-not-exist/approve")),
            GREETER_LEADER,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_propose_requires_assignment_on_from_team() {
    let fixture = TestFixture::new().await;
    let member = fixture
        .register("jane@example.com", json!(["greeter"]), json!(["usher"]))
        .await;

    let resp = fixture
        .as_leader(fixture.client.post(fixture.url("/api/requests")), USHER_LEADER)
        .json(&json!({ "memberId": member, "fromTeam": "greeter", "date": "2024-06-02" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_availability_selection_rules() {
    let fixture = TestFixture::new().await;
    let member = fixture
        .register("jane@example.com", json!(["greeter"]), json!([]))
        .await;

    let put = |body: Value| {
        fixture
            .as_member(
                fixture
                    .client
                    .put(fixture.url("/api/availability/6-2024/2024-06-02")),
                member,
            )
            .json(&body)
            .send()
    };

    let resp = put(json!({ "primaryTeams": ["usher", "greeter"], "secondaryTeams": [] }))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = put(json!({ "primaryTeams": ["usher"], "secondaryTeams": ["music", "prayer"] }))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    for rejected in [
        json!({ "primaryTeams": ["usher", "greeter", "music"], "secondaryTeams": [] }),
        json!({ "primaryTeams": ["usher", "greeter"], "secondaryTeams": ["music"] }),
    ] {
        let resp = put(rejected).await.unwrap();
        assert_eq!(resp.status(), 422);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "INVALID_SELECTION");
    }

    // Last accepted declaration is what is stored
    let body: Value = fixture
        .as_member(
            fixture.client.get(fixture.url("/api/availability/6-2024")),
            member,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let declarations = body["data"].as_array().unwrap();
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0]["primaryTeams"], json!(["usher"]));
    assert_eq!(declarations[0]["secondaryTeams"], json!(["music", "prayer"]));

    let resp = fixture
        .as_member(
            fixture
                .client
                .delete(fixture.url("/api/availability/6-2024/2024-06-02")),
            member,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["primaryTeams"], json!([]));
}

#[tokio::test]
async fn test_availability_requires_member_session() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .as_leader(
            fixture.client.get(fixture.url("/api/availability/6-2024")),
            GREETER_LEADER,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let body: Value = fixture
        .client
        .get(fixture.url("/api/availability/6-2024/sundays"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["data"],
        json!(["2024-06-02", "2024-06-09", "2024-06-16", "2024-06-23", "2024-06-30"])
    );
}

#[tokio::test]
async fn test_general_requests() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .as_leader(
            fixture.client.post(fixture.url("/api/general-requests")),
            MUSIC_LEADER,
        )
        .json(&json!({ "message": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .as_leader(
            fixture.client.post(fixture.url("/api/general-requests")),
            MUSIC_LEADER,
        )
        .json(&json!({ "message": "Need two more singers for Easter" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = fixture
        .client
        .get(fixture.url("/api/general-requests"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let requests = body["data"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["team"], "music");
    assert_eq!(requests[0]["requestingLeaderName"], "Music Leader");
}

#[tokio::test]
async fn test_upcoming_sundays() {
    let fixture = TestFixture::new().await;

    let body: Value = fixture
        .client
        .get(fixture.url("/api/schedule/sundays?from=2024-06-02&count=3"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["data"],
        json!(["2024-06-09", "2024-06-16", "2024-06-23"])
    );
}

#[tokio::test]
async fn test_datastore_snapshot_and_revision() {
    let fixture = TestFixture::new().await;
    assert_eq!(fixture.revision().await, 0);

    let member = fixture
        .register("jane@example.com", json!(["greeter"]), json!([]))
        .await;
    assert_eq!(fixture.revision().await, 1);

    let resp = fixture
        .assign(GREETER_LEADER, "2024-06-02", "greeter", member)
        .await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["revisionId"], 2);

    // A rejected write leaves the revision alone
    fixture
        .assign(GREETER_LEADER, "2024-06-02", "greeter", member)
        .await;
    assert_eq!(fixture.revision().await, 2);

    let body: Value = fixture
        .client
        .get(fixture.url("/api/datastore"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["schemaVersion"], 1);
    assert_eq!(body["data"]["revisionId"], 2);
    assert_eq!(body["data"]["assignments"]["2024-06-02"]["greeter"], json!([member]));
    assert_eq!(body["data"]["requests"], json!([]));
    assert_eq!(body["data"]["generalRequests"], json!([]));
}

#[tokio::test]
async fn test_sunday_listings_at_calendar_end() {
    let fixture = TestFixture::new().await;

    let near_end = chrono::NaiveDate::MAX - chrono::Duration::days(20);
    let from = near_end.to_string().replace('+', "%2B");
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/schedule/sundays?from={}&count=104", from)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let sundays = body["data"].as_array().unwrap();
    assert!(!sundays.is_empty());
    assert!(sundays.len() < 104);

    // Year outside the calendar is not a month key
    let resp = fixture
        .client
        .get(fixture.url("/api/availability/12-999999/sundays"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// tests/api_tests.rs

use tempfile::TempDir;
use treasure_hunt_backend::{config::Config, routes, seed, state::AppState};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the upload
/// directory, which is deleted when dropped.
async fn spawn_app(seeded: bool) -> (String, TempDir) {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");

    // 1. In-memory stores, no database needed
    let config = Config {
        rust_log: "error".to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        ..Config::default()
    };
    let state = AppState::in_memory(config);

    // 2. Sample teams and checkpoints
    if seeded {
        seed::seed(state.teams.as_ref(), state.checkpoints.as_ref())
            .await
            .expect("Failed to seed");
    }

    // 3. Create the router with the app state
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, upload_dir)
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let (address, _dir) = spawn_app(true).await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn login_works() {
    // Arrange
    let (address, _dir) = spawn_app(true).await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(&format!("{}/api/teams/login", address))
        .json(&serde_json::json!({ "teamCode": "TEAM001" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["teamCode"], "TEAM001");
    assert_eq!(body["data"]["teamName"], "Adventure Seekers");
    assert_eq!(body["data"]["assignedRoute"], serde_json::json!([1, 2, 3]));
    assert_eq!(body["data"]["currentIndex"], 0);
}

#[tokio::test]
async fn login_unknown_team_404() {
    // Arrange
    let (address, _dir) = spawn_app(true).await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(&format!("{}/api/teams/login", address))
        .json(&serde_json::json!({ "teamCode": "TEAM999" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid team code");
}

#[tokio::test]
async fn login_fails_validation() {
    // Arrange
    let (address, _dir) = spawn_app(true).await;
    let client = reqwest::Client::new();

    // Act: empty team code
    let response = client
        .post(&format!("{}/api/teams/login", address))
        .json(&serde_json::json!({ "teamCode": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn login_malformed_body_is_json_400() {
    // Arrange
    let (address, _dir) = spawn_app(true).await;
    let client = reqwest::Client::new();

    for (content_type, body) in [
        ("application/json", "{}"),
        ("application/json", "{\"teamCode\": 7}"),
        ("application/json", "not json"),
    ] {
        // Act
        let response = client
            .post(&format!("{}/api/teams/login", address))
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .expect("Failed to execute request");

        // Assert
        assert_eq!(response.status().as_u16(), 400, "body {body:?}");
        let json: serde_json::Value = response.json().await.unwrap();
        assert!(json["error"].is_string(), "body {body:?}");
    }
}

#[tokio::test]
async fn seed_is_idempotent() {
    // Arrange
    let (address, _dir) = spawn_app(false).await;
    let client = reqwest::Client::new();

    // Login fails before seeding
    let before = client
        .post(&format!("{}/api/teams/login", address))
        .json(&serde_json::json!({ "teamCode": "TEAM002" }))
        .send()
        .await
        .unwrap();
    assert_eq!(before.status().as_u16(), 404);

    // Act
    let first: serde_json::Value = client
        .get(&format!("{}/api/seed", address))
        .send()
        .await
        .expect("Seed failed")
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = client
        .get(&format!("{}/api/seed", address))
        .send()
        .await
        .expect("Seed failed")
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(first["message"], "Data seeded successfully");
    assert_eq!(first["summary"]["teamsCreated"], 2);
    assert_eq!(first["summary"]["checkpointsCreated"], 3);
    assert_eq!(second["summary"]["teamsCreated"], 0);

    let after = client
        .post(&format!("{}/api/teams/login", address))
        .json(&serde_json::json!({ "teamCode": "TEAM002" }))
        .send()
        .await
        .unwrap();
    assert_eq!(after.status().as_u16(), 200);
}

#[tokio::test]
async fn progress_hides_answers() {
    // Arrange
    let (address, _dir) = spawn_app(true).await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/api/teams/TEAM002/progress", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["routeComplete"], false);
    assert_eq!(body["currentCheckpoint"]["id"], 2);
    assert_eq!(body["currentCheckpoint"]["questions"][0]["id"], "q2");
    assert!(body["currentCheckpoint"]["questions"][0]
        .get("expectedAnswer")
        .is_none());

    let missing = client
        .get(&format!("{}/api/teams/NOPE/progress", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

use club_registry::{Mode, RegistrationConfig, RegistrationServer, SequentialIds};
use serde_json::{json, Value};
use std::sync::Arc;

const SALLY_ID: &str = "3c8da4d5-1597-46e7-baa1-e402aed70d80";
const JOHN_ID: &str = "ce20079c-2326-4f17-8ac4-f617bfd28b7f";

async fn list_ids(client: &reqwest::Client, server: &RegistrationServer) -> Vec<String> {
    let users: Vec<Value> = client
        .get(format!("{}/user", server.url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    users
        .iter()
        .map(|u| u["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_index_acknowledgements() {
    let server = RegistrationServer::new(RegistrationConfig::memory()).await.unwrap();
    let client = reqwest::Client::new();

    let response = client.get(server.url()).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "A GET Request");

    let response = client
        .post(server.url())
        .json(&json!({ "hello": "world" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "POST request received.");
}

#[tokio::test]
async fn test_register_then_fetch_location() {
    let server = RegistrationServer::new(RegistrationConfig::memory().with_port(0))
        .await
        .unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/register", server.url()))
        .json(&json!({
            "username": "sallyS2",
            "password": "abc12345",
            "favoriteClub": "Ogden Curling Club",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let location = response.headers()["location"].to_str().unwrap().to_string();
    let created: Value = response.json().await.unwrap();

    let id = created["id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
    assert_ne!(id, SALLY_ID);
    assert_ne!(id, JOHN_ID);
    assert_eq!(created["newsLetter"], false);
    assert_eq!(location, format!("/users/{}", id));

    let fetched: Value = client
        .get(format!("{}{}", server.url(), location))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    assert_eq!(
        list_ids(&client, &server).await,
        vec![SALLY_ID.to_string(), JOHN_ID.to_string(), id.to_string()]
    );
}

#[tokio::test]
async fn test_register_short_username() {
    let server = RegistrationServer::new(RegistrationConfig::memory()).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/register", server.url()))
        .json(&json!({
            "username": "abc",
            "password": "abc12345",
            "favoriteClub": "Ogden Curling Club",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(
        response.text().await.unwrap(),
        "Username must be between 6 and 20 characters"
    );
    assert_eq!(list_ids(&client, &server).await.len(), 2);
}

#[tokio::test]
async fn test_odd_newsletter_does_not_hide_missing_password() {
    let server = RegistrationServer::new(RegistrationConfig::memory()).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/register", server.url()))
        .json(&json!({ "username": "sallyS2", "newsLetter": "yes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(response.text().await.unwrap(), "Password required");

    let response = client
        .post(format!("{}/register", server.url()))
        .json(&json!({
            "username": "sallyS2",
            "password": "abc12345",
            "favoriteClub": "Ogden Curling Club",
            "newsLetter": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["newsLetter"], true);
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found() {
    let server = RegistrationServer::new(RegistrationConfig::memory()).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .delete(format!("{}/user/not-a-real-id", server.url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "User not found");
    assert_eq!(list_ids(&client, &server).await.len(), 2);
}

#[tokio::test]
async fn test_registrations_and_deletions_keep_order() {
    let server = RegistrationServer::with_id_generator(
        RegistrationConfig::memory(),
        Arc::new(SequentialIds::new("member")),
    )
    .await
    .unwrap();
    let client = reqwest::Client::new();

    for name in ["memberOne", "memberTwo", "memberThree"] {
        let response = client
            .post(format!("{}/register", server.url()))
            .json(&json!({
                "username": name,
                "password": "curl1ng99",
                "favoriteClub": "Park City Curling Club",
                "newsLetter": true,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    for id in ["member-2", SALLY_ID] {
        let response = client
            .delete(format!("{}/user/{}", server.url(), id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 204);
        assert!(response.text().await.unwrap().is_empty());
    }

    assert_eq!(
        list_ids(&client, &server).await,
        vec![JOHN_ID, "member-1", "member-3"]
    );
}

#[tokio::test]
async fn test_temp_dir_storage_round_trip() {
    let server = RegistrationServer::new(RegistrationConfig::temp_dir()).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/register", server.url()))
        .json(&json!({
            "username": "diskUser1",
            "password": "s70nes0nice",
            "favoriteClub": "Utah Olympic Oval Curling Club",
            "newsLetter": "true",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["newsLetter"], true);

    assert_eq!(list_ids(&client, &server).await.len(), 3);
}

#[tokio::test]
async fn test_directory_storage_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let client = reqwest::Client::new();

    let first = RegistrationServer::new(RegistrationConfig::directory(dir.path().to_path_buf()))
        .await
        .unwrap();
    let response = client
        .delete(format!("{}/user/{}", first.url(), JOHN_ID))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let second = RegistrationServer::new(RegistrationConfig::directory(dir.path().to_path_buf()))
        .await
        .unwrap();
    assert_eq!(list_ids(&client, &second).await, vec![SALLY_ID.to_string()]);
}

#[tokio::test]
async fn test_cross_origin_allow_list() {
    let config = RegistrationConfig::memory()
        .with_mode(Mode::Production)
        .with_allowed_origins(["http://localhost:3000"]);
    let server = RegistrationServer::new(config).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/user", server.url()))
        .header("Origin", "http://intruder.example")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert!(response.text().await.unwrap().is_empty());

    let response = client
        .get(format!("{}/user", server.url()))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}

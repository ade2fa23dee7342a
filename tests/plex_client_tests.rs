//! Plex client against a local stand-in for plex.tv and a Plex server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use plex_sorter::domain::remote::RemotePlaylists;
use plex_sorter::error::SorterError;
use plex_sorter::infrastructure::plex::{PlexClient, PlexCredentials};
use plex_sorter::services::sync_service::{SyncOptions, SyncPipeline};
use serde_json::{Value, json};
use tracing::Span;

const ACCOUNT_TOKEN: &str = "account-token";
const SERVER_TOKEN: &str = "server-token";

#[derive(Clone, Default)]
struct FakePlex {
    base: String,
    sign_ins: Arc<Mutex<usize>>,
    resource_lookups: Arc<Mutex<usize>>,
    identity_lookups: Arc<Mutex<usize>>,
    created: Arc<Mutex<Vec<HashMap<String, String>>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

fn token(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-plex-token").and_then(|v| v.to_str().ok())
}

fn server_auth(headers: &HeaderMap) -> Result<(), StatusCode> {
    match token(headers) {
        Some(SERVER_TOKEN) => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn sign_in(
    State(fake): State<FakePlex>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    *fake.sign_ins.lock().unwrap() += 1;
    match (form.get("login"), form.get("password")) {
        (Some(login), Some(password)) if login == "ann" && password == "hunter2" => {
            Ok(Json(json!({ "id": 1, "authToken": ACCOUNT_TOKEN })))
        }
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn resources(
    State(fake): State<FakePlex>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    *fake.resource_lookups.lock().unwrap() += 1;
    if token(&headers) != Some(ACCOUNT_TOKEN) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!([
        {
            "name": "Living Room TV",
            "provides": "player",
            "connections": []
        },
        {
            "name": "Den",
            "provides": "server",
            "accessToken": SERVER_TOKEN,
            "connections": [
                { "uri": "https://relay.invalid:8443", "local": false, "relay": true },
                { "uri": format!("{}/", fake.base), "local": true, "relay": false }
            ]
        }
    ])))
}

async fn list_playlists(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    server_auth(&headers)?;
    Ok(Json(json!({
        "MediaContainer": {
            "size": 4,
            "Metadata": [
                { "ratingKey": "20", "key": "/playlists/20/items", "title": "Demo Sorted", "playlistType": "audio" },
                { "ratingKey": "10", "key": "/playlists/10/items", "title": "Demo", "playlistType": "audio" },
                { "ratingKey": "11", "key": "/playlists/11/items", "title": "Empty", "playlistType": "audio" },
                { "ratingKey": "21", "key": "/playlists/21/items", "title": "Demo Sorted", "playlistType": "audio" }
            ]
        }
    })))
}

async fn playlist_items(
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    server_auth(&headers)?;
    let container = match id.as_str() {
        "10" => json!({
            "size": 3,
            "Metadata": [
                { "ratingKey": "3", "title": "(Echo) (Live)", "parentTitle": "Night", "grandparentTitle": "Band" },
                { "ratingKey": "1", "title": "Beta (Remix)", "parentTitle": "Night", "grandparentTitle": "Band" },
                { "ratingKey": "2", "title": "Alpha" }
            ]
        }),
        "11" => json!({ "size": 0 }),
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(Json(json!({ "MediaContainer": container })))
}

async fn identity(
    State(fake): State<FakePlex>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    server_auth(&headers)?;
    *fake.identity_lookups.lock().unwrap() += 1;
    Ok(Json(json!({ "MediaContainer": { "machineIdentifier": "machine-1" } })))
}

async fn create_playlist(
    State(fake): State<FakePlex>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    server_auth(&headers)?;
    fake.created.lock().unwrap().push(params);
    Ok(Json(json!({ "MediaContainer": { "size": 1 } })))
}

async fn delete_playlist(
    State(fake): State<FakePlex>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    server_auth(&headers)?;
    fake.deleted.lock().unwrap().push(id);
    Ok(StatusCode::NO_CONTENT)
}

async fn start_fake_plex() -> FakePlex {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind test listener");
    let fake = FakePlex {
        base: format!("http://{}", listener.local_addr().unwrap()),
        ..FakePlex::default()
    };

    let app = Router::new()
        .route("/api/v2/users/signin", post(sign_in))
        .route("/api/v2/resources", get(resources))
        .route("/playlists", get(list_playlists).post(create_playlist))
        .route("/playlists/:id", delete(delete_playlist))
        .route("/playlists/:id/items", get(playlist_items))
        .route("/identity", get(identity))
        .with_state(fake.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    fake
}

fn direct_client(fake: &FakePlex, token: &str) -> PlexClient {
    PlexClient::with_token(reqwest::Client::new(), fake.base.clone(), token, Span::none())
}

#[tokio::test]
async fn username_and_password_sign_in_and_find_server() {
    let fake = start_fake_plex().await;
    let creds = PlexCredentials {
        username: Some("ann".into()),
        password: Some("hunter2".into()),
        server_name: Some("Den".into()),
        account_url: fake.base.clone(),
        ..PlexCredentials::default()
    };

    let client = PlexClient::connect(reqwest::Client::new(), &creds, Span::none())
        .await
        .expect("Should connect");
    let playlists = client.list_playlists().await.expect("Should list playlists");

    assert_eq!(*fake.sign_ins.lock().unwrap(), 1);
    assert_eq!(*fake.resource_lookups.lock().unwrap(), 1);
    assert_eq!(playlists.get("Demo").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn token_skips_sign_in() {
    let fake = start_fake_plex().await;
    let creds = PlexCredentials {
        token: Some(ACCOUNT_TOKEN.into()),
        username: Some("ann".into()),
        password: Some("wrong".into()),
        server_name: Some("Den".into()),
        account_url: fake.base.clone(),
        ..PlexCredentials::default()
    };

    let client = PlexClient::connect(reqwest::Client::new(), &creds, Span::none())
        .await
        .expect("Should connect with token");
    client.list_playlists().await.expect("Should list playlists");

    assert_eq!(*fake.sign_ins.lock().unwrap(), 0);
}

#[tokio::test]
async fn base_url_skips_server_lookup() {
    let fake = start_fake_plex().await;
    let creds = PlexCredentials {
        token: Some(SERVER_TOKEN.into()),
        server_name: Some("Den".into()),
        base_url: Some(fake.base.clone()),
        account_url: "http://127.0.0.1:9".into(),
        ..PlexCredentials::default()
    };

    let client = PlexClient::connect(reqwest::Client::new(), &creds, Span::none())
        .await
        .expect("Should connect directly");
    client.list_playlists().await.expect("Should list playlists");

    assert_eq!(*fake.resource_lookups.lock().unwrap(), 0);
}

#[tokio::test]
async fn rejected_password_is_a_configuration_error() {
    let fake = start_fake_plex().await;
    let creds = PlexCredentials {
        username: Some("ann".into()),
        password: Some("wrong".into()),
        server_name: Some("Den".into()),
        account_url: fake.base.clone(),
        ..PlexCredentials::default()
    };

    let err = PlexClient::connect(reqwest::Client::new(), &creds, Span::none())
        .await
        .err()
        .expect("Sign in should fail");

    assert!(matches!(err, SorterError::Configuration(_)), "got {err:?}");
}

#[tokio::test]
async fn unknown_server_name_is_a_configuration_error() {
    let fake = start_fake_plex().await;
    let mut creds = PlexCredentials::with_token(ACCOUNT_TOKEN, "Attic");
    creds.account_url = fake.base.clone();

    let err = PlexClient::connect(reqwest::Client::new(), &creds, Span::none())
        .await
        .err()
        .expect("Lookup should fail");

    assert!(matches!(err, SorterError::Configuration(_)), "got {err:?}");
}

#[tokio::test]
async fn playlist_tracks_strip_only_leading_parentheses() {
    let fake = start_fake_plex().await;
    let client = direct_client(&fake, SERVER_TOKEN);

    let tracks = client.playlist_tracks("Demo").await.unwrap();

    let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Echo Live", "Beta (Remix)", "Alpha"]);
    assert_eq!(tracks[0].track_id, "3");
    assert_eq!(tracks[0].album, "Night");
    assert_eq!(tracks[0].artist, "Band");
    assert_eq!(tracks[2].album, "");
    assert_eq!(tracks[2].artist, "");
}

#[tokio::test]
async fn playlist_without_items_yields_no_tracks() {
    let fake = start_fake_plex().await;
    let client = direct_client(&fake, SERVER_TOKEN);

    let tracks = client.playlist_tracks("Empty").await.unwrap();

    assert!(tracks.is_empty());
}

#[tokio::test]
async fn missing_playlist_is_not_found() {
    let fake = start_fake_plex().await;
    let client = direct_client(&fake, SERVER_TOKEN);

    let err = client.playlist_tracks("Nope").await.unwrap_err();

    assert!(matches!(err, SorterError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn create_playlist_sends_ids_in_order() {
    let fake = start_fake_plex().await;
    let client = direct_client(&fake, SERVER_TOKEN);
    let ids = vec!["2".to_string(), "1".to_string(), "3".to_string()];

    client.create_playlist("Demo Sorted", &ids).await.unwrap();

    let created = fake.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let params = &created[0];
    assert_eq!(params["title"], "Demo Sorted");
    assert_eq!(params["type"], "audio");
    assert_eq!(params["smart"], "0");
    assert_eq!(
        params["uri"],
        "server://machine-1/com.plexapp.plugins.library/library/metadata/2,1,3"
    );
}

#[tokio::test]
async fn create_playlist_with_no_tracks_makes_no_request() {
    let fake = start_fake_plex().await;
    let client = direct_client(&fake, SERVER_TOKEN);

    let err = client.create_playlist("Nothing", &[]).await.unwrap_err();

    assert!(matches!(err, SorterError::Validation(_)));
    assert_eq!(*fake.identity_lookups.lock().unwrap(), 0);
    assert!(fake.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delete_playlist_targets_the_id() {
    let fake = start_fake_plex().await;
    let client = direct_client(&fake, SERVER_TOKEN);

    client.delete_playlist("77").await.unwrap();

    assert_eq!(*fake.deleted.lock().unwrap(), ["77"]);
}

#[tokio::test]
async fn rejected_token_is_a_transport_error() {
    let fake = start_fake_plex().await;
    let client = direct_client(&fake, "stale-token");

    let err = client.list_playlists().await.unwrap_err();

    assert!(matches!(err, SorterError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn playlist_entries_keep_repeated_names() {
    let fake = start_fake_plex().await;
    let client = direct_client(&fake, SERVER_TOKEN);

    let entries = client.playlist_entries().await.unwrap();
    let collapsed = client.list_playlists().await.unwrap();

    let sorted_ids: Vec<_> = entries
        .iter()
        .filter(|(name, _)| name == "Demo Sorted")
        .map(|(_, id)| id.as_str())
        .collect();
    assert_eq!(sorted_ids, ["20", "21"]);
    assert_eq!(collapsed.get("Demo Sorted").map(String::as_str), Some("21"));
}

#[tokio::test]
async fn replace_sync_removes_all_same_named_targets() {
    let fake = start_fake_plex().await;
    let pipeline = SyncPipeline::new(direct_client(&fake, SERVER_TOKEN), Span::none());

    pipeline
        .run(&SyncOptions::new("Demo").replace_existing(true))
        .await
        .expect("Sync should succeed");

    assert_eq!(*fake.deleted.lock().unwrap(), ["20", "21"]);
    let created = fake.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["title"], "Demo Sorted");
}

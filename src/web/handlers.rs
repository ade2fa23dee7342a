use std::fmt::Write;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::table::{StoreTable, TrackColumn};
use crate::domain::track::Track;
use crate::error::{Result, SorterError};

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const SORTED_PLAYLIST_HTML: &str = include_str!("../../templates/sorted_playlist.html");

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    /// Names the table the track goes into.
    pub playlist_name: String,
    pub track_name: String,
    #[serde(default)]
    pub album_name: String,
    #[serde(default)]
    pub artist_name: String,
    pub track_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SortedPlaylistQuery {
    pub playlist_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /submit
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Result<&'static str> {
    let table: StoreTable = form.playlist_name.parse()?;
    let track = Track::new(
        form.track_name,
        form.album_name,
        form.artist_name,
        form.track_id,
    );

    let mut session = state.store.open().await?;
    session.insert_track(table, &track).await?;
    session.close().await?;

    Ok("Playlist data saved successfully!")
}

/// GET /sorted_playlist?playlist_name=<table>
pub async fn sorted_playlist(
    State(state): State<AppState>,
    Query(query): Query<SortedPlaylistQuery>,
) -> Result<Html<String>> {
    let name = query
        .playlist_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SorterError::Validation("playlist_name is required".into()))?;
    let table: StoreTable = name.parse()?;

    let mut session = state.store.open().await?;
    let tracks = session.sorted_by_column(table, TrackColumn::TrackName).await?;
    session.close().await?;

    Ok(Html(render_sorted_playlist(table, &tracks)))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn render_sorted_playlist(table: StoreTable, tracks: &[Track]) -> String {
    let mut rows = String::new();
    for track in tracks {
        let _ = writeln!(
            rows,
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&track.title),
            escape_html(&track.album),
            escape_html(&track.artist),
            escape_html(&track.track_id),
        );
    }
    SORTED_PLAYLIST_HTML
        .replace("{{playlist_name}}", table.as_str())
        .replace("{{rows}}", &rows)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

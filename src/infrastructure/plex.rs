use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{Span, debug, info};

use crate::domain::remote::RemotePlaylists;
use crate::domain::track::Track;
use crate::error::{Result, SorterError};

pub const PLEX_TV_URL: &str = "https://plex.tv";

const PRODUCT: &str = "plex-sorter";
const LIBRARY_METADATA: &str = "com.plexapp.plugins.library/library/metadata";

/// Account settings used to reach a Plex server. Empty strings count as unset.
#[derive(Debug, Clone)]
pub struct PlexCredentials {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub server_name: Option<String>,
    /// Talk to this server URL directly instead of looking the server up on
    /// the account.
    pub base_url: Option<String>,
    pub account_url: String,
}

impl Default for PlexCredentials {
    fn default() -> Self {
        Self {
            token: None,
            username: None,
            password: None,
            server_name: None,
            base_url: None,
            account_url: PLEX_TV_URL.to_string(),
        }
    }
}

enum Auth<'a> {
    Token(&'a str),
    Account { username: &'a str, password: &'a str },
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl PlexCredentials {
    pub fn with_token(token: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            server_name: Some(server_name.into()),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(Auth<'_>, &str)> {
        let auth = match (
            present(&self.token),
            present(&self.username),
            present(&self.password),
        ) {
            (Some(token), _, _) => Auth::Token(token),
            (None, Some(username), Some(password)) => Auth::Account { username, password },
            _ => {
                return Err(SorterError::Configuration(
                    "provide either a token or a username and password".into(),
                ));
            }
        };
        let server_name = present(&self.server_name)
            .ok_or_else(|| SorterError::Configuration("a server name is required".into()))?;
        Ok((auth, server_name))
    }
}

#[derive(Deserialize)]
struct MediaContainerResponse<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Deserialize)]
struct MetadataList<T> {
    #[serde(rename = "Metadata", default = "Vec::new")]
    metadata: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistEntry {
    rating_key: String,
    title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackEntry {
    rating_key: String,
    title: String,
    parent_title: Option<String>,
    grandparent_title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Identity {
    machine_identifier: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    auth_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resource {
    name: String,
    #[serde(default)]
    provides: String,
    access_token: Option<String>,
    #[serde(default)]
    connections: Vec<ResourceConnection>,
}

#[derive(Deserialize)]
struct ResourceConnection {
    uri: String,
    #[serde(default)]
    relay: bool,
}

/// plex.tv account endpoints, only needed while connecting.
struct PlexAccount<'a> {
    http: &'a Client,
    url: &'a str,
    client_id: &'a str,
}

impl PlexAccount<'_> {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.url))
            .header(ACCEPT, "application/json")
            .header("X-Plex-Product", PRODUCT)
            .header("X-Plex-Client-Identifier", self.client_id)
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<String> {
        let resp = self
            .request(Method::POST, "/api/v2/users/signin")
            .form(&[("login", username), ("password", password)])
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(SorterError::Configuration(format!(
                "Plex rejected the credentials for {username}"
            )));
        }

        let body: SignInResponse = resp.error_for_status()?.json().await?;
        Ok(body.auth_token)
    }

    /// Resolves `server_name` to a base URL and the token to use against it.
    async fn find_server(&self, token: &str, server_name: &str) -> Result<(String, String)> {
        let resources: Vec<Resource> = self
            .request(Method::GET, "/api/v2/resources")
            .query(&[("includeHttps", "1"), ("includeRelay", "1")])
            .header("X-Plex-Token", token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let resource = resources
            .into_iter()
            .find(|r| r.name == server_name && r.provides.split(',').any(|p| p == "server"))
            .ok_or_else(|| {
                SorterError::Configuration(format!(
                    "no Plex server named {server_name:?} on this account"
                ))
            })?;

        let base_url = resource
            .connections
            .iter()
            .find(|c| !c.relay)
            .or(resource.connections.first())
            .map(|c| c.uri.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                SorterError::Configuration(format!(
                    "Plex server {server_name:?} has no connections"
                ))
            })?;

        let server_token = resource.access_token.unwrap_or_else(|| token.to_string());
        Ok((base_url, server_token))
    }
}

pub struct PlexClient {
    http: Client,
    base_url: String,
    token: String,
    client_id: String,
    span: Span,
}

impl PlexClient {
    /// Authenticates and resolves the target server.
    ///
    /// The token wins when both a token and a username/password pair are
    /// present. Missing settings fail with `Configuration` before any request
    /// is made.
    pub async fn connect(http: Client, credentials: &PlexCredentials, span: Span) -> Result<Self> {
        let (auth, server_name) = credentials.validate()?;
        let client_id = uuid::Uuid::new_v4().to_string();
        let account = PlexAccount {
            http: &http,
            url: credentials.account_url.trim_end_matches('/'),
            client_id: &client_id,
        };

        let account_token = match auth {
            Auth::Token(token) => {
                debug!(parent: &span, "Connecting with access token");
                token.to_string()
            }
            Auth::Account { username, password } => {
                debug!(parent: &span, "Signing in to Plex as {username}");
                account.sign_in(username, password).await?
            }
        };

        let (base_url, token) = match present(&credentials.base_url) {
            Some(url) => (url.trim_end_matches('/').to_string(), account_token),
            None => account.find_server(&account_token, server_name).await?,
        };

        info!(parent: &span, "Connected to Plex server {server_name} at {base_url}");
        Ok(Self {
            http,
            base_url,
            token,
            client_id,
            span,
        })
    }

    /// Client for a known server URL and token, skipping authentication.
    pub fn with_token(
        http: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client_id: uuid::Uuid::new_v4().to_string(),
            span,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .header(ACCEPT, "application/json")
            .header("X-Plex-Token", &self.token)
            .header("X-Plex-Product", PRODUCT)
            .header("X-Plex-Client-Identifier", &self.client_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let resp = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn machine_identifier(&self) -> Result<String> {
        let identity: MediaContainerResponse<Identity> = self.get_json("/identity", &[]).await?;
        Ok(identity.media_container.machine_identifier)
    }
}

#[async_trait]
impl RemotePlaylists for PlexClient {
    async fn playlist_entries(&self) -> Result<Vec<(String, String)>> {
        let container: MediaContainerResponse<MetadataList<PlaylistEntry>> = self
            .get_json("/playlists", &[("playlistType", "audio")])
            .await?;

        let playlists: Vec<(String, String)> = container
            .media_container
            .metadata
            .into_iter()
            .map(|p| (p.title, p.rating_key))
            .collect();
        debug!(parent: &self.span, "Found {} playlists", playlists.len());
        Ok(playlists)
    }

    async fn playlist_tracks(&self, name: &str) -> Result<Vec<Track>> {
        let playlists = self.list_playlists().await?;
        let playlist_id = playlists
            .get(name)
            .ok_or_else(|| SorterError::NotFound(format!("playlist {name:?}")))?;

        let container: MediaContainerResponse<MetadataList<TrackEntry>> = self
            .get_json(&format!("/playlists/{playlist_id}/items"), &[])
            .await?;

        let tracks: Vec<Track> = container
            .media_container
            .metadata
            .into_iter()
            .map(|entry| {
                let track = Track::new(
                    entry.title,
                    entry.parent_title.unwrap_or_default(),
                    entry.grandparent_title.unwrap_or_default(),
                    entry.rating_key,
                );
                if track.title.starts_with('(') {
                    let track = track.normalized();
                    debug!(parent: &self.span, "New title: {}", track.title);
                    track
                } else {
                    track
                }
            })
            .collect();

        info!(parent: &self.span, "Fetched {} tracks from {name:?}", tracks.len());
        Ok(tracks)
    }

    async fn create_playlist(&self, name: &str, track_ids: &[String]) -> Result<()> {
        debug!(parent: &self.span, "Creating playlist: {name}");
        if track_ids.is_empty() {
            debug!(parent: &self.span, "No songs to add to the playlist");
            return Err(SorterError::Validation(
                "must include items to add when creating a new playlist".into(),
            ));
        }
        debug!(parent: &self.span, "Playlist songs: {track_ids:?}");

        let machine = self.machine_identifier().await?;
        let uri = format!("server://{machine}/{LIBRARY_METADATA}/{}", track_ids.join(","));
        self.request(Method::POST, "/playlists")
            .query(&[
                ("type", "audio"),
                ("title", name),
                ("smart", "0"),
                ("uri", uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        info!(parent: &self.span, "Created playlist {name:?} with {} tracks", track_ids.len());
        Ok(())
    }

    async fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        self.request(Method::DELETE, &format!("/playlists/{playlist_id}"))
            .send()
            .await?
            .error_for_status()?;
        info!(parent: &self.span, "Deleted playlist {playlist_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_without_token_or_full_account_fails() {
        let creds = PlexCredentials {
            username: Some("user".into()),
            server_name: Some("Den".into()),
            ..PlexCredentials::default()
        };
        let err = PlexClient::connect(Client::new(), &creds, Span::none())
            .await
            .err()
            .expect("connect should fail");
        assert!(matches!(err, SorterError::Configuration(_)));
    }

    #[tokio::test]
    async fn connect_without_server_name_fails() {
        let creds = PlexCredentials {
            username: Some("user".into()),
            password: Some("secret".into()),
            ..PlexCredentials::default()
        };
        let err = PlexClient::connect(Client::new(), &creds, Span::none())
            .await
            .err()
            .expect("connect should fail");
        assert!(matches!(err, SorterError::Configuration(_)));
    }

    #[test]
    fn token_takes_precedence_over_account() {
        let creds = PlexCredentials {
            token: Some("abc".into()),
            username: Some("user".into()),
            password: Some("secret".into()),
            server_name: Some("Den".into()),
            ..PlexCredentials::default()
        };
        let (auth, server) = creds.validate().unwrap();
        assert!(matches!(auth, Auth::Token("abc")));
        assert_eq!(server, "Den");
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let creds = PlexCredentials {
            token: Some(String::new()),
            username: Some("user".into()),
            password: Some(String::new()),
            server_name: Some("Den".into()),
            ..PlexCredentials::default()
        };
        assert!(matches!(
            creds.validate(),
            Err(SorterError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn create_playlist_rejects_empty_track_list() {
        // Port 9 (discard) is never contacted: validation happens first.
        let client = PlexClient::with_token(Client::new(), "http://127.0.0.1:9", "t", Span::none());
        let err = client.create_playlist("Empty", &[]).await.unwrap_err();
        assert!(matches!(err, SorterError::Validation(_)));
    }
}

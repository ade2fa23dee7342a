use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row};
use tracing::{Span, debug, info};

use crate::domain::table::{StoreTable, TrackColumn};
use crate::domain::track::{Track, TrackFilter};
use crate::error::Result;

const TRACK_COLUMNS_DDL: &str = "id INTEGER PRIMARY KEY AUTOINCREMENT, \
     url TEXT, \
     track_name TEXT, \
     album_name TEXT, \
     artist_name TEXT, \
     track_id TEXT";

const SELECT_COLUMNS: &str = "id, url, track_name, album_name, artist_name, track_id";

/// Handle to the SQLite track database. Holds no connection itself; each unit
/// of work opens a [`StoreSession`].
#[derive(Clone)]
pub struct Store {
    path: PathBuf,
    options: SqliteConnectOptions,
    span: Span,
}

impl Store {
    pub fn new(path: impl AsRef<Path>, span: Span) -> Self {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        Self {
            path,
            options,
            span,
        }
    }

    pub async fn open(&self) -> Result<StoreSession> {
        let conn = self.options.connect().await?;
        debug!(parent: &self.span, "Connected to database {}", self.path.display());
        Ok(StoreSession {
            conn,
            span: self.span.clone(),
        })
    }

    /// Creates the track tables if they are missing.
    pub async fn initialize(&self) -> Result<()> {
        let mut session = self.open().await?;
        for table in StoreTable::ALL {
            let sql = format!("CREATE TABLE IF NOT EXISTS {table} ({TRACK_COLUMNS_DDL})");
            sqlx::query(&sql).execute(&mut session.conn).await?;
        }
        info!(parent: &self.span, "Database set up at {}", self.path.display());
        session.close().await
    }
}

/// One open connection. Call [`StoreSession::close`] when done; dropping the
/// session on an error path releases the connection as well.
///
/// Every write runs in autocommit mode and is durable once the call returns.
pub struct StoreSession {
    conn: SqliteConnection,
    span: Span,
}

impl StoreSession {
    pub async fn insert_track(&mut self, table: StoreTable, track: &Track) -> Result<i64> {
        let sql = format!(
            "INSERT INTO {table} (url, track_name, album_name, artist_name, track_id) \
             VALUES (?, ?, ?, ?, ?)"
        );
        let result = sqlx::query(&sql)
            .bind(track.url.as_deref())
            .bind(track.title.as_str())
            .bind(track.album.as_str())
            .bind(track.artist.as_str())
            .bind(track.track_id.as_str())
            .execute(&mut self.conn)
            .await?;
        debug!(parent: &self.span, "Inserted {track} into {table}");
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_tracks(&mut self, table: StoreTable, tracks: &[Track]) -> Result<usize> {
        for track in tracks {
            self.insert_track(table, track).await?;
        }
        Ok(tracks.len())
    }

    /// Deletes every row carrying `track_id`. Matching nothing is not an error.
    pub async fn delete_track(&mut self, table: StoreTable, track_id: &str) -> Result<u64> {
        let sql = format!("DELETE FROM {table} WHERE track_id = ?");
        let removed = sqlx::query(&sql)
            .bind(track_id)
            .execute(&mut self.conn)
            .await?
            .rows_affected();
        debug!(parent: &self.span, "Removed {removed} rows for track {track_id} from {table}");
        Ok(removed)
    }

    pub async fn find_tracks(
        &mut self,
        table: StoreTable,
        filter: &TrackFilter,
    ) -> Result<Vec<Track>> {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM {table} WHERE 1=1");
        let mut params = Vec::new();
        if let Some(track_id) = filter.track_id.as_deref() {
            sql.push_str(" AND track_id = ?");
            params.push(track_id);
        }
        if let Some(album) = filter.album.as_deref() {
            sql.push_str(" AND album_name = ?");
            params.push(album);
        }
        if let Some(artist) = filter.artist.as_deref() {
            sql.push_str(" AND artist_name = ?");
            params.push(artist);
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        let rows = query.fetch_all(&mut self.conn).await?;
        Ok(rows.iter().map(track_from_row).collect::<sqlx::Result<_>>()?)
    }

    /// All rows of `table` ascending by `column`, ties broken by row id.
    pub async fn sorted_by_column(
        &mut self,
        table: StoreTable,
        column: TrackColumn,
    ) -> Result<Vec<Track>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM {table} ORDER BY {column}, id");
        let rows = sqlx::query(&sql).fetch_all(&mut self.conn).await?;
        Ok(rows.iter().map(track_from_row).collect::<sqlx::Result<_>>()?)
    }

    pub async fn count(&mut self, table: StoreTable) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        Ok(sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut self.conn)
            .await?)
    }

    pub async fn close(self) -> Result<()> {
        let StoreSession { conn, span } = self;
        conn.close().await?;
        debug!(parent: &span, "Database connection closed");
        Ok(())
    }
}

fn track_from_row(row: &SqliteRow) -> sqlx::Result<Track> {
    let text = |column: &str| -> sqlx::Result<String> {
        Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
    };
    Ok(Track {
        id: Some(row.try_get("id")?),
        title: text("track_name")?,
        album: text("album_name")?,
        artist: text("artist_name")?,
        track_id: text("track_id")?,
        url: row.try_get("url")?,
    })
}

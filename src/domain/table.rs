use std::fmt;
use std::str::FromStr;

use crate::error::SorterError;

/// The three track tables of the local store.
///
/// Table names reach SQL only through this enum, so callers cannot inject
/// arbitrary identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreTable {
    /// Rows submitted through the web form.
    Playlist,
    ApplicationData,
    /// Mirror of remote playlist data written by the sync pipeline.
    PlexData,
}

impl StoreTable {
    pub const ALL: [StoreTable; 3] = [
        StoreTable::Playlist,
        StoreTable::ApplicationData,
        StoreTable::PlexData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreTable::Playlist => "playlist",
            StoreTable::ApplicationData => "application_data",
            StoreTable::PlexData => "plex_data",
        }
    }
}

impl fmt::Display for StoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreTable {
    type Err = SorterError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        StoreTable::ALL
            .into_iter()
            .find(|table| table.as_str() == name)
            .ok_or_else(|| SorterError::Integrity(format!("no such table: {name}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackColumn {
    Id,
    Url,
    TrackName,
    AlbumName,
    ArtistName,
    TrackId,
}

impl TrackColumn {
    pub const ALL: [TrackColumn; 6] = [
        TrackColumn::Id,
        TrackColumn::Url,
        TrackColumn::TrackName,
        TrackColumn::AlbumName,
        TrackColumn::ArtistName,
        TrackColumn::TrackId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TrackColumn::Id => "id",
            TrackColumn::Url => "url",
            TrackColumn::TrackName => "track_name",
            TrackColumn::AlbumName => "album_name",
            TrackColumn::ArtistName => "artist_name",
            TrackColumn::TrackId => "track_id",
        }
    }
}

impl fmt::Display for TrackColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackColumn {
    type Err = SorterError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TrackColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == name)
            .ok_or_else(|| SorterError::Validation(format!("unknown column: {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_round_trip() {
        for table in StoreTable::ALL {
            assert_eq!(table.as_str().parse::<StoreTable>().unwrap(), table);
        }
    }

    #[test]
    fn unknown_table_is_an_integrity_error() {
        let err = "songs; DROP TABLE playlist".parse::<StoreTable>().unwrap_err();
        assert!(matches!(err, SorterError::Integrity(_)));
    }

    #[test]
    fn unknown_column_is_a_validation_error() {
        let err = "rowid".parse::<TrackColumn>().unwrap_err();
        assert!(matches!(err, SorterError::Validation(_)));
    }
}

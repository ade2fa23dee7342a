//! Sorts Plex playlists by track title and keeps a small SQLite mirror of
//! track metadata, with a web form for manual entry.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod services;
pub mod web;

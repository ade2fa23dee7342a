pub mod plex;
pub mod store;

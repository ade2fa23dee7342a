pub mod playlist;
pub mod remote;
pub mod table;
pub mod title;
pub mod track;

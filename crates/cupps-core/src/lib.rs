// Shared foundation for the prospect scorer: data model, configuration,
// SQLite storage, and CSV import.

pub mod config;
pub mod db;
pub mod import;
pub mod model;

//! Collection sources: TMDB collections and the published collections sheet.
//!
//! Both sources produce a [`CollectionDescriptor`] (name, poster, overview
//! and ordered members) that the sync layer applies to a Plex library.

pub mod error;
pub mod resolve;
pub mod sheets;
pub mod tmdb;
pub mod types;

pub use error::CatalogError;
pub use resolve::resolve_sheet_row;
pub use sheets::{
    available_rows, find_row, parse_sheet_csv, parse_timestamp, CollectionSheet, SheetsClient,
    DEFAULT_SHEETS_URL,
};
pub use tmdb::{MovieCatalog, TmdbClient};
pub use types::*;

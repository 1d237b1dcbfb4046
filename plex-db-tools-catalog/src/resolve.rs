//! Turning sheet rows into collection descriptors.

use crate::tmdb::MovieCatalog;
use crate::types::{CollectionDescriptor, SheetRow};

/// Resolve a sheet row's member ids through the movie catalog.
///
/// Ids that are not alphanumeric, or that the catalog cannot resolve, are
/// logged and listed in `unresolved`; the rest keep their sheet order.
pub fn resolve_sheet_row(catalog: &dyn MovieCatalog, row: &SheetRow) -> CollectionDescriptor {
    log::debug!(
        "Found sheets collection: {:?} with {} parts",
        row.name,
        row.member_ids.len()
    );

    let mut members = Vec::with_capacity(row.member_ids.len());
    let mut unresolved = Vec::new();
    for id in &row.member_ids {
        if !is_valid_member_id(id) {
            log::error!("Collection {:?} had an invalid part: {:?}", row.name, id);
            unresolved.push(format!("TMDB movie {id:?}"));
            continue;
        }
        match catalog.movie(id) {
            Ok(member) => members.push(member),
            Err(e) => {
                log::warn!(
                    "Failed retrieving details for part {:?} of collection {:?}: {}",
                    id,
                    row.name,
                    e
                );
                unresolved.push(format!("TMDB movie {id}"));
            }
        }
    }

    CollectionDescriptor {
        name: row.name.clone(),
        poster_url: row.poster_url.clone(),
        overview: row.summary.clone(),
        members,
        unresolved,
    }
}

/// Check a TMDB id before it becomes part of a request path.
pub(crate) fn is_valid_member_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

//! The Movie Database (TMDB) client.
//!
//! Uses TMDB API v3: <https://developer.themoviedb.org/docs>

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::CatalogError;
use crate::resolve::is_valid_member_id;
use crate::types::{CollectionDescriptor, CollectionMember};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Movie metadata lookups needed to build collections.
pub trait MovieCatalog {
    /// Resolve a TMDB collection and all of its parts.
    fn collection(&self, collection_id: &str) -> Result<CollectionDescriptor, CatalogError>;

    /// Resolve a single movie to its title and external ids.
    fn movie(&self, movie_id: &str) -> Result<CollectionMember, CatalogError>;
}

// ── Response Types ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionResponse {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    pub parts: Vec<CollectionPart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionPart {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MovieResponse {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub imdb_id: Option<String>,
}

impl From<MovieResponse> for CollectionMember {
    fn from(movie: MovieResponse) -> Self {
        Self {
            title: movie.title,
            tmdb_id: Some(movie.id),
            imdb_id: movie.imdb_id.filter(|id| !id.is_empty()),
        }
    }
}

/// Full-size image URL for a TMDB image path (e.g. `/abc.jpg`).
pub fn image_url(path: &str) -> String {
    format!("{IMAGE_BASE}{path}")
}

// ── Client ──────────────────────────────────────────────────────────────────

/// Blocking HTTP client for the TMDB API.
pub struct TmdbClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: &str) -> Result<Self, CatalogError> {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a client against a different API root (e.g. a local stub).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("TMDB request: {}", url);

        let resp = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::not_found(what.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                what: what.to_string(),
                status: status.as_u16(),
            });
        }

        let text = resp.text()?;
        log::trace!("TMDB response for {}: {}", what, text);
        Ok(serde_json::from_str(&text)?)
    }
}

impl MovieCatalog for TmdbClient {
    fn collection(&self, collection_id: &str) -> Result<CollectionDescriptor, CatalogError> {
        check_id(collection_id)?;
        log::debug!("Retrieving movie collection details for: {:?}", collection_id);
        let details: CollectionResponse = self.get_json(
            &format!("/collection/{collection_id}"),
            &format!("TMDB collection {collection_id}"),
        )?;
        log::trace!(
            "Retrieved TMDB collection {} ({:?}) with {} parts",
            details.id,
            details.name,
            details.parts.len()
        );

        // Every part must resolve; a partial TMDB collection is not applied
        let mut members = Vec::with_capacity(details.parts.len());
        for part in &details.parts {
            log::debug!(
                "Retrieving movie details for collection part: {:?} - TmdbId: {}",
                part.title,
                part.id
            );
            members.push(self.movie(&part.id.to_string())?);
        }

        Ok(build_collection(details, members))
    }

    fn movie(&self, movie_id: &str) -> Result<CollectionMember, CatalogError> {
        check_id(movie_id)?;
        let movie: MovieResponse =
            self.get_json(&format!("/movie/{movie_id}"), &format!("TMDB movie {movie_id}"))?;
        Ok(movie.into())
    }
}

fn check_id(id: &str) -> Result<(), CatalogError> {
    if is_valid_member_id(id) {
        Ok(())
    } else {
        Err(CatalogError::InvalidId(id.to_string()))
    }
}

pub(crate) fn build_collection(
    details: CollectionResponse,
    members: Vec<CollectionMember>,
) -> CollectionDescriptor {
    CollectionDescriptor {
        name: details.name,
        poster_url: details
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|p| image_url(&p)),
        overview: details.overview.filter(|o| !o.trim().is_empty()),
        members,
        unresolved: Vec::new(),
    }
}

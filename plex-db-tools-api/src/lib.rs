//! Client for the Plex Media Server HTTP API.
//!
//! Covers the handful of metadata actions the maintenance commands need:
//! refresh, analyze, collection tagging, summary and poster updates.

pub mod client;
pub mod error;

pub use client::{ItemTarget, MediaServer, PlexClient};
pub use error::ApiError;

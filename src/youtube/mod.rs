//! YouTube Data API access.
//!
//! This module provides the HTTP transport and the three-step lookup chain
//! (channel → uploads playlist → video statistics) that produces
//! [`ChannelStats`](crate::models::ChannelStats).

pub mod error;
pub mod fetcher;
pub mod transport;
pub mod types;

pub use error::FetchError;
pub use fetcher::{StatsFetcher, StatsSource};
pub use transport::HttpTransport;

/// Default API root for the YouTube Data API v3.
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Largest page the playlistItems endpoint will return.
pub const MAX_RESULTS_LIMIT: u32 = 50;

//! Errors raised while fetching channel statistics.

use thiserror::Error;

/// Failure of any step in the lookup chain.
///
/// Every variant halts monitoring; the `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Channel lookup failed (HTTP {status}): {detail}. Check the channel ID.")]
    ChannelLookup { status: u16, detail: String },

    #[error("Channel {0} does not exist")]
    ChannelNotFound(String),

    #[error("Could not fetch the list of uploads (HTTP {status}): {detail}")]
    PlaylistLookup { status: u16, detail: String },

    #[error("Channel has no uploaded videos")]
    NoUploads,

    #[error("Could not fetch video statistics (HTTP {status}): {detail}")]
    VideoStats { status: u16, detail: String },

    #[error("Video {video_id} reported an invalid view count: {value:?}")]
    InvalidViewCount { video_id: String, value: String },

    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// HTTP status behind the error, when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::ChannelLookup { status, .. }
            | FetchError::PlaylistLookup { status, .. }
            | FetchError::VideoStats { status, .. } => Some(*status),
            _ => None,
        }
    }
}

//! Wire types for the YouTube Data API v3 responses we read.
//!
//! Only the fields the lookup chain needs are modelled; everything else in
//! the payload is ignored by serde.

use serde::Deserialize;

/// Common list envelope. A missing `items` array decodes as empty.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

/// Counters are sent as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
}

impl VideoStatistics {
    /// Parsed view count; an absent counter counts as zero.
    pub fn views(&self) -> Result<u64, String> {
        match self.view_count.as_deref() {
            None => Ok(0),
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| raw.to_string()),
        }
    }
}

/// Error payload returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Best-effort human-readable reason extracted from an error body.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => "no details".to_string(),
    }
}

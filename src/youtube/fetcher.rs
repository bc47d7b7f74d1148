//! The channel → uploads → statistics lookup chain.

use crate::models::ChannelStats;
use crate::youtube::error::FetchError;
use crate::youtube::transport::{ApiResponse, ApiTransport};
use crate::youtube::types::{
    error_detail, ChannelItem, ListResponse, PlaylistItem, VideoItem,
};
use crate::youtube::MAX_RESULTS_LIMIT;
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Anything that can produce a fresh [`ChannelStats`] snapshot.
pub trait StatsSource {
    fn fetch_stats(&self) -> BoxFuture<'_, Result<ChannelStats, FetchError>>;
}

/// Fetches aggregate statistics for one channel.
pub struct StatsFetcher<T> {
    transport: T,
    channel_id: String,
    api_key: String,
    max_results: u32,
}

impl<T: ApiTransport> StatsFetcher<T> {
    /// Create a fetcher. `max_results` is clamped to `1..=50`.
    pub fn new(transport: T, channel_id: &str, api_key: &str, max_results: u32) -> Self {
        Self {
            transport,
            channel_id: channel_id.to_string(),
            api_key: api_key.to_string(),
            max_results: max_results.clamp(1, MAX_RESULTS_LIMIT),
        }
    }

    async fn request(
        &self,
        endpoint: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<ApiResponse, FetchError> {
        query.push(("key", self.api_key.clone()));
        self.transport.get(endpoint, &query).await
    }

    /// Step 1: resolve the channel's uploads playlist.
    async fn uploads_playlist(&self) -> Result<String, FetchError> {
        let response = self
            .request(
                "channels",
                vec![
                    ("part", "contentDetails".to_string()),
                    ("id", self.channel_id.clone()),
                ],
            )
            .await?;

        if !response.is_success() {
            return Err(FetchError::ChannelLookup {
                status: response.status,
                detail: error_detail(&response.body),
            });
        }

        let channels: ListResponse<ChannelItem> = decode("channels", &response)?;
        let channel = channels
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ChannelNotFound(self.channel_id.clone()))?;

        let uploads = channel.content_details.related_playlists.uploads;
        debug!("Uploads playlist for {}: {}", self.channel_id, uploads);
        Ok(uploads)
    }

    /// Step 2: list video ids on the first page of the uploads playlist.
    async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>, FetchError> {
        let response = self
            .request(
                "playlistItems",
                vec![
                    ("part", "contentDetails".to_string()),
                    ("playlistId", playlist_id.to_string()),
                    ("maxResults", self.max_results.to_string()),
                ],
            )
            .await?;

        if !response.is_success() {
            return Err(FetchError::PlaylistLookup {
                status: response.status,
                detail: error_detail(&response.body),
            });
        }

        let items: ListResponse<PlaylistItem> = decode("playlistItems", &response)?;
        let ids: Vec<String> = items
            .items
            .into_iter()
            .map(|item| item.content_details.video_id)
            .collect();

        if ids.is_empty() {
            return Err(FetchError::NoUploads);
        }

        debug!("Found {} videos in {}", ids.len(), playlist_id);
        Ok(ids)
    }

    /// Step 3: per-video view counts.
    async fn video_views(&self, video_ids: &[String]) -> Result<Vec<u64>, FetchError> {
        let response = self
            .request(
                "videos",
                vec![
                    ("part", "statistics".to_string()),
                    ("id", video_ids.join(",")),
                ],
            )
            .await?;

        if !response.is_success() {
            return Err(FetchError::VideoStats {
                status: response.status,
                detail: error_detail(&response.body),
            });
        }

        let videos: ListResponse<VideoItem> = decode("videos", &response)?;
        if videos.items.len() < video_ids.len() {
            warn!(
                "Statistics returned for {} of {} videos",
                videos.items.len(),
                video_ids.len()
            );
        }

        videos
            .items
            .iter()
            .map(|video| {
                video
                    .statistics
                    .views()
                    .map_err(|value| FetchError::InvalidViewCount {
                        video_id: video.id.clone(),
                        value,
                    })
            })
            .collect()
    }
}

impl<T: ApiTransport> StatsSource for StatsFetcher<T> {
    fn fetch_stats(&self) -> BoxFuture<'_, Result<ChannelStats, FetchError>> {
        async move {
            let uploads = self.uploads_playlist().await?;
            let video_ids = self.playlist_video_ids(&uploads).await?;
            let views = self.video_views(&video_ids).await?;

            Ok(ChannelStats::from_view_counts(video_ids.len() as u64, views))
        }
        .boxed()
    }
}

fn decode<D: DeserializeOwned>(endpoint: &str, response: &ApiResponse) -> Result<D, FetchError> {
    serde_json::from_str(&response.body).map_err(|source| FetchError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

//! Paginated enumeration of the two remote catalogs.
//!
//! Both enumerators are forward-only streams that own their cursor state. Each
//! page is fetched only when the previous one has been consumed, and the first
//! error ends the stream.

use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use tube_api_client::ApiClient;
use tube_core::{BackupObjectRecord, RemoteVideoRecord};
use tube_storage::{BackupStore, StorageError};

use crate::error::{SyncError, SyncResult};

/// Offset-paginated source of a channel's videos.
#[async_trait]
pub trait VideoPageSource: Send + Sync {
    /// Up to `count` records starting at offset `start`, newest first.
    async fn fetch_page(&self, start: usize, count: usize) -> SyncResult<Vec<RemoteVideoRecord>>;
}

/// The videos of one PeerTube channel.
#[derive(Clone, Debug)]
pub struct ChannelVideoSource {
    client: ApiClient,
    channel: String,
}

impl ChannelVideoSource {
    pub fn new(client: ApiClient, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl VideoPageSource for ChannelVideoSource {
    async fn fetch_page(&self, start: usize, count: usize) -> SyncResult<Vec<RemoteVideoRecord>> {
        Ok(self
            .client
            .list_channel_videos(&self.channel, start, count)
            .await?)
    }
}

/// Every video of `source`, page by page.
///
/// The next offset is the previous offset plus the length of the page actually
/// received. A page shorter than `page_size` ends the listing; any reported
/// total is ignored. A zero page size is treated as one.
pub fn video_catalog<'a, S>(
    source: &'a S,
    page_size: usize,
) -> impl Stream<Item = SyncResult<RemoteVideoRecord>> + Send + 'a
where
    S: VideoPageSource + ?Sized,
{
    let page_size = page_size.max(1);

    stream::try_unfold(Some(0usize), move |next_start| {
        next_video_page(source, next_start, page_size)
    })
    .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, SyncError>)))
    .try_flatten()
}

async fn next_video_page<S>(
    source: &S,
    next_start: Option<usize>,
    page_size: usize,
) -> SyncResult<Option<(Vec<RemoteVideoRecord>, Option<usize>)>>
where
    S: VideoPageSource + ?Sized,
{
    let Some(start) = next_start else {
        return Ok(None);
    };

    let page = source.fetch_page(start, page_size).await?;
    let next = if page.len() < page_size {
        None
    } else {
        Some(start + page.len())
    };

    Ok(Some((page, next)))
}

/// Position in a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    Continue(String),
    Done,
}

/// Every object under `prefix` in the backup store.
///
/// Follows continuation tokens until the store reports the listing is no
/// longer truncated. No ordering is imposed beyond what the backend returns.
pub fn backup_catalog<'a, B>(
    store: &'a B,
    prefix: &'a str,
    page_size: i32,
) -> impl Stream<Item = SyncResult<BackupObjectRecord>> + Send + 'a
where
    B: BackupStore + ?Sized,
{
    let page_size = page_size.max(1);

    stream::try_unfold(Cursor::Start, move |cursor| {
        next_backup_page(store, prefix, page_size, cursor)
    })
    .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, SyncError>)))
    .try_flatten()
}

async fn next_backup_page<B>(
    store: &B,
    prefix: &str,
    page_size: i32,
    cursor: Cursor,
) -> SyncResult<Option<(Vec<BackupObjectRecord>, Cursor)>>
where
    B: BackupStore + ?Sized,
{
    let token = match &cursor {
        Cursor::Start => None,
        Cursor::Continue(token) => Some(token.as_str()),
        Cursor::Done => return Ok(None),
    };

    let page = store.list_page(prefix, page_size, token).await?;

    let next = if page.is_truncated {
        match page.next_continuation_token {
            Some(token) => Cursor::Continue(token),
            // Restarting without a token would loop over the same keys forever
            None => {
                return Err(StorageError::ListFailed(format!(
                    "listing of '{}' in bucket '{}' is truncated but has no continuation token",
                    prefix,
                    store.bucket()
                ))
                .into())
            }
        }
    } else {
        Cursor::Done
    };

    Ok(Some((page.objects, next)))
}

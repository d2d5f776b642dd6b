use crate::discord::DiscordClient;
use crate::error::Result;
use crate::message::Message;
use crate::target::ArchiveTarget;
use async_trait::async_trait;

/// Largest page the messages endpoint hands out.
pub const PAGE_SIZE: usize = 100;

/// Pagination token meaning "from the very first message".
pub const START_TOKEN: &str = "0";

/// A remote collection that can be paged forward from an exclusive id.
#[async_trait]
pub trait PageSource {
    /// Returns at most `limit` records with ids strictly after `after`,
    /// newest first. An empty page means there is nothing after `after`.
    async fn fetch_page(
        &self,
        target: &ArchiveTarget,
        after: &str,
        limit: usize,
    ) -> Result<Vec<Message>>;
}

#[async_trait]
impl PageSource for DiscordClient {
    async fn fetch_page(
        &self,
        target: &ArchiveTarget,
        after: &str,
        limit: usize,
    ) -> Result<Vec<Message>> {
        self.channel_messages(&target.id, after, limit).await
    }
}

/// Whether a page of raw length `len` is the last one.
pub fn is_exhausted(len: usize, page_size: usize) -> bool {
    len < page_size
}

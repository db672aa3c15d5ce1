use crate::model::{Post, SourceError};

#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    /// Up to `limit` posts in the source's ranking order.
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<Post>, SourceError>;
}

use async_trait::async_trait;

use crate::{
    catalog::types::{Chapter, MangaRef},
    Result,
};

/// Read-only port to the manga catalog.
///
/// Implementations only return published, non-deleted entries.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    async fn list_mangas(&self) -> Result<Vec<MangaRef>>;

    /// Chapters of `slug`, newest first. `page_offset` is zero-based and
    /// skips whole listing pages.
    async fn list_chapters(&self, slug: &str, page_offset: u32) -> Result<Vec<Chapter>>;

    /// Exact match on manga slug + chapter number.
    async fn get_chapter(&self, slug: &str, number: f64) -> Result<Option<Chapter>>;
}

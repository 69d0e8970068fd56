use crate::types::Result;
use pdf_view_runtime::{DocumentSource, PageSize, PageSurface};
use std::future::Future;

/// Decodes documents and rasterizes their pages.
///
/// Both operations may be slow; implementations should move blocking work
/// off the async executor (`spawn_blocking`).
pub trait Renderer: Send + Sync + 'static {
    /// Native size of every page, in page order
    fn decode(&self, source: &DocumentSource) -> impl Future<Output = Result<Vec<PageSize>>> + Send;

    /// Rasterize the 0-based `page_index` at `scale` (1.0 = one pixel per point)
    fn rasterize(
        &self,
        source: &DocumentSource,
        page_index: usize,
        scale: f32,
    ) -> impl Future<Output = Result<PageSurface>> + Send;
}

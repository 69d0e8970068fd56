use crate::renderer::Renderer;
use crate::types::*;
use pdf_view_runtime::{DocumentSource, PageSize, PageSurface};
use pdfium_render::prelude::*;
use std::path::PathBuf;

/// Initialize Pdfium, trying the vendored library first, then falling back to system
pub fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    // Try to load from vendor directory (relative to workspace root)
    let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    if let Some(vendor_path) = vendor_path {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

fn pdfium_error(e: PdfiumError) -> ViewerError {
    ViewerError::Pdfium(e.to_string())
}

/// Renderer backed by the Pdfium library.
///
/// Pdfium handles are not `Send`, so every call binds the library and opens
/// the document inside a blocking task.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the Pdfium library in `dir` instead of searching for it
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(dir.into()),
        }
    }

    fn bind(library_dir: Option<&PathBuf>) -> Result<Pdfium> {
        match library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .map(Pdfium::new)
                .map_err(pdfium_error),
            None => init_pdfium().map_err(pdfium_error),
        }
    }
}

fn open<'a>(pdfium: &'a Pdfium, source: &'a DocumentSource) -> Result<PdfDocument<'a>> {
    match source {
        DocumentSource::Path(path) => pdfium.load_pdf_from_file(path, None),
        DocumentSource::Bytes(bytes) => pdfium.load_pdf_from_byte_slice(bytes, None),
    }
    .map_err(pdfium_error)
}

impl Renderer for PdfiumRenderer {
    async fn decode(&self, source: &DocumentSource) -> Result<Vec<PageSize>> {
        let source = source.clone();
        let library_dir = self.library_dir.clone();
        tokio::task::spawn_blocking(move || {
            let pdfium = Self::bind(library_dir.as_ref())?;
            let document = open(&pdfium, &source)?;
            let sizes: Vec<PageSize> = document
                .pages()
                .iter()
                .map(|page| PageSize::new(page.width().value, page.height().value))
                .collect();
            Ok::<_, ViewerError>(sizes)
        })
        .await?
    }

    async fn rasterize(
        &self,
        source: &DocumentSource,
        page_index: usize,
        scale: f32,
    ) -> Result<PageSurface> {
        let source = source.clone();
        let library_dir = self.library_dir.clone();
        tokio::task::spawn_blocking(move || {
            let pdfium = Self::bind(library_dir.as_ref())?;
            let document = open(&pdfium, &source)?;
            let index =
                u16::try_from(page_index).map_err(|_| ViewerError::PageOutOfRange(page_index))?;
            let page = document
                .pages()
                .get(index)
                .map_err(|_| ViewerError::PageOutOfRange(page_index))?;

            let config = PdfRenderConfig::new().scale_page_by_factor(scale);
            let bitmap = page.render_with_config(&config).map_err(pdfium_error)?;
            let rgba_data = bitmap.as_rgba_bytes().to_vec();
            let width = bitmap.width() as usize;
            let height = bitmap.height() as usize;

            Ok::<_, ViewerError>(PageSurface::new(width, height, rgba_data))
        })
        .await?
    }
}

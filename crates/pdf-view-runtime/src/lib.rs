use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Commands sent from the view controller to the render worker
#[derive(Debug, Clone)]
pub enum ViewerCommand {
    Load {
        request: RequestId,
        source: DocumentSource,
    },
    RenderPage {
        request: RequestId,
        doc_id: DocumentId,
        page_index: usize,
        scale: f32,
    },
    /// Warm the cache for pages likely to be visited next (lower priority than direct renders)
    PrefetchPages {
        doc_id: DocumentId,
        page_indices: Vec<usize>,
        scale: f32,
    },
    Close {
        doc_id: DocumentId,
    },
}

/// Updates sent from the render worker back to the view controller
#[derive(Debug, Clone)]
pub enum ViewerUpdate {
    Loaded {
        request: RequestId,
        doc_id: DocumentId,
        page_sizes: Vec<PageSize>,
    },
    LoadFailed {
        request: RequestId,
        message: String,
    },
    PageRendered {
        request: RequestId,
        doc_id: DocumentId,
        page_index: usize,
        scale: f32,
        surface: PageSurface,
    },
    RenderFailed {
        request: RequestId,
        doc_id: DocumentId,
        page_index: usize,
        message: String,
    },
    Closed {
        doc_id: DocumentId,
    },
}

/// Handle to a document loaded by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// Sequence number of a load or render request.
///
/// Issued in increasing order by the controller, so a larger id is always the
/// more recent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Where a document is read from
#[derive(Clone, PartialEq)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DocumentSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Path(path) => write!(f, "{}", path.display()),
            DocumentSource::Bytes(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl From<Vec<u8>> for DocumentSource {
    fn from(bytes: Vec<u8>) -> Self {
        DocumentSource::Bytes(bytes.into())
    }
}

/// Native page size in PDF points (1/72 inch), rotation already applied
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// US Letter, used when a page carries no usable media box
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Pixel dimensions of this page rasterized at `scale` (1.0 = one pixel per point)
    pub fn scaled(self, scale: f32) -> (usize, usize) {
        let width = (self.width * scale).round().max(1.0) as usize;
        let height = (self.height * scale).round().max(1.0) as usize;
        (width, height)
    }
}

/// A rasterized page, RGBA8, row-major
#[derive(Clone, PartialEq)]
pub struct PageSurface {
    pub width: usize,
    pub height: usize,
    pub rgba_data: Arc<[u8]>,
}

impl PageSurface {
    pub fn new(width: usize, height: usize, rgba_data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            rgba_data: rgba_data.into(),
        }
    }

    /// Whether the pixel buffer matches the stated dimensions
    pub fn is_consistent(&self) -> bool {
        self.rgba_data.len() == self.width * self.height * 4
    }
}

impl fmt::Debug for PageSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba_data.len())
            .finish()
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Pdfium error: {0}")]
    Pdfium(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Page index {0} is out of range")]
    PageOutOfRange(usize),
    #[error("Document has no pages")]
    NoPages,
    #[error("Render worker is not running")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, ViewerError>;

/// Failure surfaced to whoever observes the view
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewFault {
    /// The document could not be opened or decoded. Terminal until `reload`.
    #[error("Failed to load document: {0}")]
    Load(String),
    /// One page failed to rasterize. Navigating away recovers.
    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },
}

/// Lifecycle of a view
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    /// No document
    #[default]
    Idle,
    /// A load request is in flight
    Loading,
    /// Document decoded; page and scale can change
    Ready,
    /// Loading failed; only `reload` leaves this state
    Failed(ViewFault),
}

impl Phase {
    pub fn is_ready(&self) -> bool {
        matches!(self, Phase::Ready)
    }
}

/// What observers see after every committed change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewSnapshot {
    pub phase: Phase,
    /// 1-indexed; 0 while no document is loaded
    pub current_page: usize,
    pub total_pages: usize,
    pub scale: f32,
    pub fullscreen: bool,
    /// A render request is outstanding
    pub rendering: bool,
    /// Most recent render failure for the current view, cleared by the next successful render
    pub fault: Option<ViewFault>,
}

mod inspect;
#[cfg(feature = "pdfium")]
mod pdfium;

pub use inspect::{inspect, page_sizes, read_source};
#[cfg(feature = "pdfium")]
pub use pdfium::{PdfiumRenderer, init_pdfium};

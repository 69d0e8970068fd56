pub mod backend;
mod cache;
pub mod constants;
mod controller;
mod document;
pub mod keymap;
mod options;
mod renderer;
mod types;
mod worker;

pub use cache::{PageCache, PageKey, page_key};
pub use controller::{DisplayedPage, ViewController};
pub use document::{DocumentView, ScaleBounds};
pub use keymap::{Key, KeyPress, ViewAction, WheelInput};
pub use options::ViewerOptions;
pub use renderer::Renderer;
pub use types::*;
pub use worker::worker_task;

pub use pdf_view_runtime::{
    DocumentId, DocumentSource, PageSize, PageSurface, RequestId, ViewerCommand, ViewerUpdate,
};

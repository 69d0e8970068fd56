#![allow(dead_code)]

use pdf_view_core::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Renderer double: every page has a fixed size, chosen pages fail.
#[derive(Clone, Default)]
pub struct ScriptedRenderer {
    pub pages: Vec<PageSize>,
    pub fail_decode: bool,
    pub failing_pages: HashSet<usize>,
    /// (page_index, scale) of every rasterize call
    pub calls: Arc<Mutex<Vec<(usize, f32)>>>,
}

impl ScriptedRenderer {
    pub fn with_pages(count: usize, width: f32, height: f32) -> Self {
        Self {
            pages: vec![PageSize::new(width, height); count],
            ..Default::default()
        }
    }

    pub fn failing_on(mut self, page_index: usize) -> Self {
        self.failing_pages.insert(page_index);
        self
    }

    pub fn rendered_pages(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }
}

impl Renderer for ScriptedRenderer {
    async fn decode(&self, _source: &DocumentSource) -> Result<Vec<PageSize>> {
        if self.fail_decode {
            return Err(ViewerError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "not a PDF",
            )));
        }
        Ok(self.pages.clone())
    }

    async fn rasterize(
        &self,
        _source: &DocumentSource,
        page_index: usize,
        scale: f32,
    ) -> Result<PageSurface> {
        self.calls.lock().unwrap().push((page_index, scale));
        if self.failing_pages.contains(&page_index) {
            return Err(ViewerError::Pdfium(format!("cannot draw page {}", page_index)));
        }
        let size = self
            .pages
            .get(page_index)
            .ok_or(ViewerError::PageOutOfRange(page_index))?;
        let (width, height) = size.scaled(scale);
        Ok(PageSurface::new(
            width,
            height,
            vec![page_index as u8; width * height * 4],
        ))
    }
}

pub fn source() -> DocumentSource {
    DocumentSource::from(b"%PDF-1.7 test".to_vec())
}

use crate::constants::scale_key;
use pdf_view_runtime::{DocumentId, PageSurface};
use std::collections::HashMap;

/// Cache key: document, 0-based page, bucketed scale
pub type PageKey = (DocumentId, usize, u32);

pub fn page_key(doc_id: DocumentId, page_index: usize, scale: f32) -> PageKey {
    (doc_id, page_index, scale_key(scale))
}

/// Least-recently-used store of rasterized pages.
///
/// Each entry carries the tick of its last use; the oldest tick is evicted
/// when an insert would exceed capacity.
pub struct PageCache {
    pages: HashMap<PageKey, (u64, PageSurface)>,
    tick: u64,
    capacity: usize,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            pages: HashMap::new(),
            tick: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.pages.contains_key(key)
    }

    pub fn insert(&mut self, key: PageKey, surface: PageSurface) {
        if !self.pages.contains_key(&key) && self.pages.len() >= self.capacity {
            let oldest = self
                .pages
                .iter()
                .min_by_key(|(_, (used, _))| *used)
                .map(|(k, _)| *k);
            if let Some(oldest) = oldest {
                self.pages.remove(&oldest);
            }
        }
        let used = self.touch();
        self.pages.insert(key, (used, surface));
    }

    pub fn get(&mut self, key: &PageKey) -> Option<&PageSurface> {
        let used = self.touch();
        let (last_used, surface) = self.pages.get_mut(key)?;
        *last_used = used;
        Some(&*surface)
    }

    /// Drop every cached page of a document
    pub fn remove_document(&mut self, doc_id: DocumentId) {
        self.pages.retain(|(id, _, _), _| *id != doc_id);
    }

    fn touch(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

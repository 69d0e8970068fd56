//! Page and zoom state of one loaded document

use crate::constants::{SCALE_EPSILON, clamp_scale};
use crate::types::{Result, ViewerError};
use pdf_view_runtime::PageSize;

/// Inclusive zoom limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    pub min: f32,
    pub max: f32,
}

impl ScaleBounds {
    /// Bounds must be positive, finite and ordered
    pub fn validate(self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ViewerError::Config(
                "Zoom settings must be finite numbers".to_string(),
            ));
        }
        if self.min <= 0.0 {
            return Err(ViewerError::Config(
                "Minimum scale must be positive".to_string(),
            ));
        }
        if self.min > self.max {
            return Err(ViewerError::Config(format!(
                "Minimum scale {} exceeds maximum scale {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn clamp(self, scale: f32) -> f32 {
        clamp_scale(scale, self.min, self.max)
    }

    pub fn contains(self, scale: f32) -> bool {
        scale >= self.min && scale <= self.max
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self {
            min: crate::constants::MIN_SCALE,
            max: crate::constants::MAX_SCALE,
        }
    }
}

/// `{current_page, total_pages, scale}` for a paginated, zoomable view.
///
/// The page count is fixed at construction. Page and scale only change through
/// the methods below, which clamp instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    current_page: usize,
    scale: f32,
    bounds: ScaleBounds,
    page_sizes: Vec<PageSize>,
}

impl DocumentView {
    pub fn new(page_sizes: Vec<PageSize>, initial_scale: f32, bounds: ScaleBounds) -> Result<Self> {
        if page_sizes.is_empty() {
            return Err(ViewerError::NoPages);
        }
        bounds.validate()?;
        Ok(Self {
            current_page: 1,
            scale: bounds.clamp(initial_scale),
            bounds,
            page_sizes,
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.page_sizes.len()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// Native size of a 1-indexed page
    pub fn page_size(&self, page: usize) -> Option<PageSize> {
        page.checked_sub(1).and_then(|i| self.page_sizes.get(i)).copied()
    }

    pub fn page_sizes(&self) -> &[PageSize] {
        &self.page_sizes
    }

    /// Move to `page`. Returns false (and changes nothing) when `page` is out
    /// of range or already current.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Set the zoom factor, clamped to the bounds. Returns whether it changed.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        let clamped = self.bounds.clamp(scale);
        if (clamped - self.scale).abs() < SCALE_EPSILON {
            return false;
        }
        self.scale = clamped;
        true
    }

    pub fn zoom_by(&mut self, factor: f32) -> bool {
        self.set_scale(self.scale * factor)
    }

    /// Scale that makes the current page exactly `container_width` pixels wide
    pub fn fit_width_scale(&self, container_width: f32) -> Option<f32> {
        let size = self.page_size(self.current_page)?;
        if size.width <= 0.0 || container_width <= 0.0 || !container_width.is_finite() {
            return None;
        }
        Some(container_width / size.width)
    }

    /// 0-based indices of the pages either side of the current one
    pub fn neighbor_indices(&self) -> Vec<usize> {
        let index = self.current_page - 1;
        let mut neighbors = Vec::with_capacity(2);
        if index + 1 < self.total_pages() {
            neighbors.push(index + 1);
        }
        if index > 0 {
            neighbors.push(index - 1);
        }
        neighbors
    }
}

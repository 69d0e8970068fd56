use crate::constants::*;
use crate::document::ScaleBounds;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Viewer configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewerOptions {
    // Zoom
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_step: f32,
    pub initial_scale: f32,

    // Worker
    pub cache_pages: usize,
    pub prefetch_neighbors: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_step: ZOOM_STEP,
            initial_scale: INITIAL_SCALE,
            cache_pages: DEFAULT_CACHE_PAGES,
            prefetch_neighbors: true,
        }
    }
}

impl ViewerOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ViewerError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ViewerError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn scale_bounds(&self) -> ScaleBounds {
        ScaleBounds {
            min: self.min_scale,
            max: self.max_scale,
        }
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !self.zoom_step.is_finite() || !self.initial_scale.is_finite() {
            return Err(ViewerError::Config(
                "Zoom settings must be finite numbers".to_string(),
            ));
        }

        self.scale_bounds().validate()?;

        if !self.scale_bounds().contains(self.initial_scale) {
            return Err(ViewerError::Config(format!(
                "Initial scale {} is outside [{}, {}]",
                self.initial_scale, self.min_scale, self.max_scale
            )));
        }

        if self.zoom_step <= 1.0 {
            return Err(ViewerError::Config(
                "Zoom step must be greater than 1".to_string(),
            ));
        }

        if self.cache_pages == 0 {
            return Err(ViewerError::Config(
                "Page cache must hold at least one page".to_string(),
            ));
        }

        Ok(())
    }
}

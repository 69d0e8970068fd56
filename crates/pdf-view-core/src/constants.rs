//! Shared constants for the page viewer
//!
//! Defaults for zoom limits, zoom step and cache sizing. `ViewerOptions`
//! starts from these values.

// =============================================================================
// Zoom
// =============================================================================

/// Smallest zoom factor relative to the native page size
pub const MIN_SCALE: f32 = 0.3;

/// Largest zoom factor relative to the native page size
pub const MAX_SCALE: f32 = 3.0;

/// Multiplier applied by one zoom-in step (divisor for zoom-out)
pub const ZOOM_STEP: f32 = 1.2;

/// Zoom factor a freshly loaded document starts at
pub const INITIAL_SCALE: f32 = 1.0;

/// Two scales closer than this are treated as equal
pub const SCALE_EPSILON: f32 = 1e-4;

// =============================================================================
// Caching
// =============================================================================

/// Maximum number of rendered pages kept by the worker
pub const DEFAULT_CACHE_PAGES: usize = 50;

/// Scales are bucketed to this many steps per unit when used as cache keys
pub const SCALE_KEY_RESOLUTION: f32 = 1000.0;

/// Convert a scale into a hashable cache key component
pub fn scale_key(scale: f32) -> u32 {
    (scale * SCALE_KEY_RESOLUTION).round() as u32
}

/// Clamp a scale into `[min, max]`
pub fn clamp_scale(scale: f32, min: f32, max: f32) -> f32 {
    if scale.is_nan() {
        return min;
    }
    scale.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_key_buckets() {
        assert_eq!(scale_key(1.0), 1000);
        assert_eq!(scale_key(1.2), 1200);
        assert_eq!(scale_key(1.00001), scale_key(1.0));
    }

    #[test]
    fn test_clamp_scale() {
        assert_eq!(clamp_scale(5.0, MIN_SCALE, MAX_SCALE), MAX_SCALE);
        assert_eq!(clamp_scale(0.01, MIN_SCALE, MAX_SCALE), MIN_SCALE);
        assert_eq!(clamp_scale(f32::NAN, MIN_SCALE, MAX_SCALE), MIN_SCALE);
        assert_eq!(clamp_scale(f32::INFINITY, MIN_SCALE, MAX_SCALE), MAX_SCALE);
    }
}

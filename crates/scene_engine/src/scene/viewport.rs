//! Screen rectangle used by projection

/// Pixel rectangle with a top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport anchored at the origin
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Whether the viewport has no area
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width / height, `None` for an empty viewport
    pub fn aspect_ratio(&self) -> Option<f32> {
        (!self.is_empty()).then(|| self.width / self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_viewports() {
        assert!(Viewport::from_size(0.0, 600.0).is_empty());
        assert!(Viewport::from_size(800.0, -1.0).is_empty());
        assert!(Viewport::from_size(f32::NAN, 1.0).is_empty());
        assert!(!Viewport::new(10.0, 10.0, 1.0, 1.0).is_empty());
        assert_eq!(Viewport::from_size(800.0, 400.0).aspect_ratio(), Some(2.0));
        assert_eq!(Viewport::default().aspect_ratio(), None);
    }
}

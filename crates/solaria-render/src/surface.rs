//! Surface dimension tracking.
//!
//! Reports physical pixels for GPU configuration and clamps zero-size
//! windows (minimised, or Wayland before the first configure) to 1x1.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Event produced when the surface dimensions or scale factor change.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceResizeEvent {
    pub physical: PhysicalSize,
    pub scale_factor: f64,
}

/// Tracks the window's physical size and scale factor.
pub struct SurfaceWrapper {
    physical_width: u32,
    physical_height: u32,
    scale_factor: f64,
    /// Set once a real, non-zero size has been seen.
    configured: bool,
}

impl SurfaceWrapper {
    /// If the initial dimensions are zero they are clamped to 1 and the
    /// wrapper is marked as unconfigured.
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        let has_valid_size = physical_width > 0 && physical_height > 0;
        Self {
            physical_width: physical_width.max(MIN_SURFACE_DIMENSION),
            physical_height: physical_height.max(MIN_SURFACE_DIMENSION),
            scale_factor,
            configured: has_valid_size,
        }
    }

    /// Handle a window resize. Returns an event only if the clamped
    /// dimensions actually changed.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let width = physical_width.max(MIN_SURFACE_DIMENSION);
        let height = physical_height.max(MIN_SURFACE_DIMENSION);

        if width == self.physical_width && height == self.physical_height {
            return None;
        }

        self.physical_width = width;
        self.physical_height = height;
        self.configured = physical_width > 0 && physical_height > 0;

        Some(SurfaceResizeEvent {
            physical: PhysicalSize { width, height },
            scale_factor: self.scale_factor,
        })
    }

    /// Handle a scale factor change (window moved between displays).
    pub fn handle_scale_factor_changed(
        &mut self,
        new_scale_factor: f64,
        new_physical_width: u32,
        new_physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        self.scale_factor = new_scale_factor;
        self.handle_resize(new_physical_width, new_physical_height)
    }

    pub fn physical_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.physical_width,
            height: self.physical_height,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Whether the last reported size was a real one. Rendering is skipped
    /// while this is false.
    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

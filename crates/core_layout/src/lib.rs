//! PaneStack Core Layout Engine
//!
//! Platform-agnostic layout engine for a horizontal stack of panes.
//!
//! This crate implements the "pane stack" paradigm where:
//! - Panes open to the right of each other in a single row
//! - Panes that do not fit collapse into narrow tabs on the left or right edge
//! - The first full pane is pinned; the panes after it slide as one track
//! - Dragging past the track's bounds promotes or restores one tab at a time

mod allocator;
mod container;
mod offset;
mod pane;
mod pane_list;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use allocator::{allocate, collapsed_count, Allocation, AllocatorInput, LayoutPartition};
pub use container::{Container, Frame, PanePlacement, PaneRole, RenderedPane, ViewportSource};
pub use offset::{
    Axis, DragPhase, DragSample, GestureBounds, GestureOutcome, OffsetController, OffsetState,
    RefugeSide, RefugeView,
};
pub use pane::{NavRequest, Navigator, PaneContent, PaneDescriptor, PaneId};
pub use pane_list::PaneList;

/// Default width of a full pane in pixels.
pub const DEFAULT_PANE_WIDTH: f64 = 400.0;

/// Default width of a collapsed tab in pixels.
pub const DEFAULT_TAB_WIDTH: f64 = 40.0;

/// Errors from building a container configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Pane width must be a positive number of pixels, got {0}")]
    InvalidPaneWidth(f64),

    #[error("Tab width must be a positive number of pixels, got {0}")]
    InvalidTabWidth(f64),
}

/// Widths the container lays panes out with.
///
/// Passed explicitly to the container and carried by every frame; nothing
/// about the layout is read from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Width of a full pane, capped to the viewport width.
    pub pane_width: f64,
    /// Width of a collapsed tab.
    pub tab_width: f64,
}

impl ContainerConfig {
    /// Create a validated configuration.
    pub fn new(pane_width: f64, tab_width: f64) -> Result<Self, ConfigError> {
        if !(pane_width.is_finite() && pane_width > 0.0) {
            return Err(ConfigError::InvalidPaneWidth(pane_width));
        }
        if !(tab_width.is_finite() && tab_width > 0.0) {
            return Err(ConfigError::InvalidTabWidth(tab_width));
        }
        Ok(Self {
            pane_width,
            tab_width,
        })
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            pane_width: DEFAULT_PANE_WIDTH,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

/// Size of the area the container lays out into.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportMetrics {
    pub width: f64,
    pub height: f64,
}

impl ViewportMetrics {
    /// Create metrics; negative or non-finite sizes become zero.
    pub fn new(width: f64, height: f64) -> Self {
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: clean(width),
            height: clean(height),
        }
    }

    /// Whether a width has been measured yet.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0
    }
}

/// A rectangle in container coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Visibility of a placed pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Pane overlaps its visible region.
    Visible,
    /// Pane slid entirely past the left edge of the track region.
    OffScreenLeft,
    /// Pane slid entirely past the right edge of the track region.
    OffScreenRight,
}

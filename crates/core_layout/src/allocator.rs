//! Width/tab allocation.
//!
//! Decides how many panes collapse into tabs, how the collapsed ones are split
//! between the left and right edge, and how far the sliding track has to be
//! shifted so its last pane ends flush with the viewport edge.
//!
//! Everything here is a pure function of its inputs. Widths are kept as
//! unrounded `f64`; non-finite or negative inputs are treated as zero.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::pane::PaneDescriptor;

/// Scalar inputs of the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocatorInput {
    /// Number of panes in the list.
    pub pane_count: usize,
    /// Width of a full pane (configured width capped by the viewport).
    pub max_pane_width: f64,
    /// Measured viewport width; zero while unmeasured.
    pub viewport_width: f64,
    /// Width of a collapsed tab.
    pub tab_width: f64,
}

impl AllocatorInput {
    /// Derive allocator input from the configured pane width.
    ///
    /// The pane width is capped to the viewport width once the viewport has
    /// been measured. Before that the configured width is used as is.
    pub fn new(pane_count: usize, pane_width: f64, viewport_width: f64, tab_width: f64) -> Self {
        let pane_width = sanitize(pane_width);
        let viewport_width = sanitize(viewport_width);
        let max_pane_width = if viewport_width > 0.0 {
            pane_width.min(viewport_width)
        } else {
            pane_width
        };
        Self {
            pane_count,
            max_pane_width,
            viewport_width,
            tab_width: sanitize(tab_width),
        }
    }
}

/// Result of an allocation: segment sizes plus the resting track offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Total number of panes.
    pub pane_count: usize,
    /// Panes collapsed into tabs on the left edge.
    pub left_tabs: usize,
    /// Panes in the sliding track (after the pinned pane).
    pub track_panes: usize,
    /// Panes collapsed into tabs on the right edge.
    pub right_tabs: usize,
    /// Pixels the track is shifted left when resting.
    pub track_offset: f64,
    /// Full pane width used for this allocation.
    pub pane_width: f64,
    /// Tab width used for this allocation.
    pub tab_width: f64,
    /// Viewport width used for this allocation.
    pub viewport_width: f64,
    /// False while the viewport has not been measured yet.
    pub measured: bool,
}

impl Allocation {
    /// Number of panes collapsed into tabs on either side.
    pub fn collapsed(&self) -> usize {
        self.left_tabs + self.right_tabs
    }

    /// Whether a pinned pane exists.
    pub fn has_pinned(&self) -> bool {
        self.pane_count > 0
    }

    /// Index of the pinned pane.
    pub fn pinned_index(&self) -> Option<usize> {
        self.has_pinned().then_some(self.left_tabs)
    }

    /// Indices of the track panes.
    pub fn track_range(&self) -> Range<usize> {
        let start = self.left_tabs + usize::from(self.has_pinned());
        start..start + self.track_panes
    }

    /// Indices of the right tabs.
    pub fn right_range(&self) -> Range<usize> {
        let start = self.track_range().end;
        start..start + self.right_tabs
    }

    /// Width left for panes once every tab has been laid out.
    pub fn available_width(&self) -> f64 {
        (self.viewport_width - self.collapsed() as f64 * self.tab_width).max(0.0)
    }

    /// Shift that brings the last track pane flush with the right tabs.
    ///
    /// The track starts one pane width after the left tabs and slides over the
    /// pinned pane, so this exceeds `track_offset` by at most one pane width.
    /// Unmeasured layouts and empty tracks never shift.
    pub fn resting_shift(&self) -> f64 {
        if !self.measured || self.track_panes == 0 {
            return 0.0;
        }
        let panes_width = self.pane_width * (self.track_panes + 1) as f64;
        (panes_width - self.available_width()).max(0.0)
    }

    /// Split `panes` into the four layout segments.
    ///
    /// `panes` is expected to hold `pane_count` entries; extra or missing
    /// entries shift into or out of the last segments rather than panicking.
    pub fn partition<'a, V>(&self, panes: &'a [PaneDescriptor<V>]) -> LayoutPartition<'a, V> {
        let len = panes.len();
        let left_end = self.left_tabs.min(len);
        let pinned = self.pinned_index().and_then(|i| panes.get(i));
        let track = self.track_range();
        let track_start = track.start.min(len);
        let track_end = track.end.min(len).max(track_start);

        LayoutPartition {
            left_tabs: &panes[..left_end],
            pinned,
            track: &panes[track_start..track_end],
            right_tabs: &panes[track_end..],
        }
    }
}

/// Number of panes that must collapse into tabs.
///
/// Smallest `k` such that the `n - k` remaining panes plus `k` tabs no longer
/// overflow, never collapsing the last remaining (pinned) pane.
pub fn collapsed_count(input: &AllocatorInput) -> usize {
    let n = input.pane_count;
    let w = sanitize(input.max_pane_width);
    let v = sanitize(input.viewport_width);
    let t = sanitize(input.tab_width);

    if n <= 1 || v <= 0.0 || w <= t {
        return 0;
    }

    let needed = ((n - 1) as f64 * w - v + t) / (w - t);
    let k = needed.ceil().max(0.0);
    if !k.is_finite() {
        return 0;
    }
    (k as usize).min(n - 1)
}

/// Allocate panes for `input`.
///
/// `tab_offset` counts how many of the collapsed panes have been pushed to
/// the right edge by drag gestures; it is clamped to `0..=collapsed`.
pub fn allocate(input: &AllocatorInput, tab_offset: i32) -> Allocation {
    let n = input.pane_count;
    let pane_width = sanitize(input.max_pane_width);
    let viewport_width = sanitize(input.viewport_width);
    let tab_width = sanitize(input.tab_width);
    let measured = viewport_width > 0.0;

    if n == 0 {
        return Allocation {
            pane_count: 0,
            left_tabs: 0,
            track_panes: 0,
            right_tabs: 0,
            track_offset: 0.0,
            pane_width,
            tab_width,
            viewport_width,
            measured,
        };
    }

    let collapsed = collapsed_count(input);
    let right_tabs = usize::try_from(tab_offset.max(0)).unwrap_or(0).min(collapsed);
    let left_tabs = collapsed - right_tabs;
    let track_panes = n - collapsed - 1;

    let mut allocation = Allocation {
        pane_count: n,
        left_tabs,
        track_panes,
        right_tabs,
        track_offset: 0.0,
        pane_width,
        tab_width,
        viewport_width,
        measured,
    };

    if measured {
        let track_width = pane_width * track_panes as f64;
        allocation.track_offset = (track_width - allocation.available_width()).max(0.0);
    }

    allocation
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Panes split by role, borrowed from the pane list.
///
/// Concatenating the segments in order yields the list exactly.
pub struct LayoutPartition<'a, V> {
    /// Collapsed panes on the left edge.
    pub left_tabs: &'a [PaneDescriptor<V>],
    /// First full-width pane, anchored left.
    pub pinned: Option<&'a PaneDescriptor<V>>,
    /// Full-width panes that slide as a unit.
    pub track: &'a [PaneDescriptor<V>],
    /// Collapsed panes on the right edge.
    pub right_tabs: &'a [PaneDescriptor<V>],
}

impl<'a, V> LayoutPartition<'a, V> {
    /// Total panes across all segments.
    pub fn len(&self) -> usize {
        self.left_tabs.len()
            + usize::from(self.pinned.is_some())
            + self.track.len()
            + self.right_tabs.len()
    }

    /// Check if the partition is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All panes in display order.
    pub fn iter(&self) -> impl Iterator<Item = &'a PaneDescriptor<V>> + 'a {
        self.left_tabs
            .iter()
            .chain(self.pinned)
            .chain(self.track.iter())
            .chain(self.right_tabs.iter())
    }

    /// Pane ids in display order.
    pub fn ids(&self) -> Vec<&'a str> {
        self.iter().map(|p| p.id.as_str()).collect()
    }

    /// Ids of a segment.
    pub fn segment_ids(segment: &'a [PaneDescriptor<V>]) -> Vec<&'a str> {
        segment.iter().map(|p| p.id.as_str()).collect()
    }

    /// Id of the pinned pane.
    pub fn pinned_id(&self) -> Option<&'a str> {
        self.pinned.map(|p| p.id.as_str())
    }
}

impl<V> Clone for LayoutPartition<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for LayoutPartition<'_, V> {}

impl<V> std::fmt::Debug for LayoutPartition<'_, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutPartition")
            .field("left_tabs", &Self::segment_ids(self.left_tabs))
            .field("pinned", &self.pinned_id())
            .field("track", &Self::segment_ids(self.track))
            .field("right_tabs", &Self::segment_ids(self.right_tabs))
            .finish()
    }
}

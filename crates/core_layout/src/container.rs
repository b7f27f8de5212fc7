//! Container orchestrator.
//!
//! Ties the pane list, the viewport measurement, the allocator and the offset
//! controller together and turns the result into placements.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocator::{Allocation, AllocatorInput, LayoutPartition};
use crate::offset::{
    DragPhase, DragSample, GestureBounds, GestureOutcome, OffsetController, OffsetState,
    RefugeSide, RefugeView,
};
use crate::pane::{NavRequest, Navigator, PaneDescriptor, PaneId};
use crate::pane_list::PaneList;
use crate::{ContainerConfig, Rect, ViewportMetrics, Visibility};

/// Source of viewport measurements, polled on every tick.
pub trait ViewportSource {
    /// Latest known metrics; zero width while unmeasured.
    fn metrics(&self) -> ViewportMetrics;
}

impl ViewportSource for ViewportMetrics {
    fn metrics(&self) -> ViewportMetrics {
        *self
    }
}

/// How a pane is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneRole {
    /// Collapsed tab on the left edge.
    LeftTab,
    /// Full pane anchored after the left tabs.
    Pinned,
    /// Full pane in the sliding track.
    Track,
    /// Collapsed tab on the right edge.
    RightTab,
}

impl PaneRole {
    /// Whether the pane is shown full width.
    pub fn is_full(self) -> bool {
        matches!(self, Self::Pinned | Self::Track)
    }
}

/// Computed placement for a pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanePlacement {
    /// Pane identifier.
    pub pane_id: PaneId,
    /// Index in the pane list.
    pub index: usize,
    /// Role in the current partition.
    pub role: PaneRole,
    /// Target rectangle relative to the container.
    pub rect: Rect,
    /// Whether the pane is inside its visible region.
    pub visibility: Visibility,
    /// True for the tab currently mid-transition.
    pub in_refuge: bool,
}

/// Snapshot of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Placements in pane list order.
    pub placements: Vec<PanePlacement>,
    /// Allocation behind the placements.
    pub allocation: Allocation,
    /// Live track offset.
    pub offset: OffsetState,
    /// Phase of the drag state machine.
    pub phase: DragPhase,
    /// Tab in transition, if any.
    pub refuge: Option<RefugeView>,
    /// X coordinate of the track's left edge, including the live offset.
    pub track_x: f64,
    /// Viewport the frame was laid out for.
    pub viewport: ViewportMetrics,
}

/// A pane ready to draw: its placement and, for full panes, its view.
#[derive(Debug, Clone)]
pub struct RenderedPane<V> {
    /// Where the pane goes.
    pub placement: PanePlacement,
    /// Tab title.
    pub title: String,
    /// Content view; `None` for collapsed tabs.
    pub view: Option<V>,
}

/// A horizontal stack of panes with overflow tabs.
#[derive(Debug)]
pub struct Container<V> {
    config: ContainerConfig,
    panes: PaneList<V>,
    viewport: ViewportMetrics,
    controller: OffsetController,
    navigator: Navigator<V>,
}

impl<V> Container<V> {
    /// Create a container over `initial_panes`.
    pub fn new(
        initial_panes: impl IntoIterator<Item = PaneDescriptor<V>>,
        config: ContainerConfig,
    ) -> Self {
        let panes = PaneList::from_panes(initial_panes);
        let viewport = ViewportMetrics::default();
        let input = AllocatorInput::new(
            panes.len(),
            config.pane_width,
            viewport.width,
            config.tab_width,
        );
        Self {
            config,
            panes,
            viewport,
            controller: OffsetController::new(input),
            navigator: Navigator::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Replace the configuration and re-derive the layout.
    pub fn set_config(&mut self, config: ContainerConfig) {
        if config != self.config {
            info!(
                "Container config changed: pane width {} -> {}, tab width {} -> {}",
                self.config.pane_width, config.pane_width, self.config.tab_width, config.tab_width
            );
            self.config = config;
            self.relayout();
        }
    }

    /// Open panes.
    pub fn panes(&self) -> &PaneList<V> {
        &self.panes
    }

    /// Last applied viewport metrics.
    pub fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    /// Handle for navigating this container from outside or from content.
    ///
    /// Requests are applied on the next [`tick`](Self::tick) or
    /// [`apply_navigation`](Self::apply_navigation).
    pub fn navigator(&self) -> Navigator<V> {
        self.navigator.clone()
    }

    /// Open a pane: append a new id, or promote an existing one to the end.
    pub fn open_pane(&mut self, next: PaneDescriptor<V>) {
        let promoted = self.panes.contains(&next.id);
        info!(
            "{} pane {:?}",
            if promoted { "Promoting" } else { "Opening" },
            next.id
        );
        self.panes.open_pane(next);
        self.relayout();
    }

    /// Close a pane. Absent ids leave the layout untouched.
    pub fn close_pane(&mut self, id: &str) -> Option<PaneDescriptor<V>> {
        let removed = self.panes.close_pane(id);
        if removed.is_some() {
            info!("Closed pane {:?}", id);
            self.relayout();
        } else {
            debug!("Close of unknown pane {:?} ignored", id);
        }
        removed
    }

    /// Apply new viewport metrics. Only a width change re-derives the layout.
    pub fn set_viewport(&mut self, metrics: ViewportMetrics) {
        let metrics = ViewportMetrics::new(metrics.width, metrics.height);
        let width_changed = metrics.width != self.viewport.width;
        self.viewport = metrics;
        if width_changed {
            debug!("Viewport width now {}", metrics.width);
            self.relayout();
        }
    }

    /// Poll the viewport source and apply queued navigation.
    ///
    /// Returns the number of navigation requests applied.
    pub fn tick(&mut self, source: &impl ViewportSource) -> usize {
        self.set_viewport(source.metrics());
        self.apply_navigation()
    }

    /// Apply queued navigation requests in order.
    pub fn apply_navigation(&mut self) -> usize {
        let requests = self.navigator.drain();
        let count = requests.len();
        for request in requests {
            match request {
                NavRequest::Open(pane) => self.open_pane(pane),
                NavRequest::Close(id) => {
                    self.close_pane(&id);
                }
            }
        }
        count
    }

    /// Feed a drag sample to the offset controller.
    pub fn drag(&mut self, sample: DragSample) -> GestureOutcome {
        self.controller.apply(sample)
    }

    /// Feed a wheel delta to the offset controller.
    pub fn wheel(&mut self, delta: f64) -> GestureOutcome {
        self.controller.wheel(delta)
    }

    /// End the current gesture.
    pub fn end_gesture(&mut self) -> GestureOutcome {
        self.controller.end_gesture()
    }

    /// Abort the current gesture.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        self.controller.cancel()
    }

    /// Bounds to configure the drag provider with.
    pub fn gesture_bounds(&self) -> GestureBounds {
        self.controller.gesture_bounds()
    }

    /// Offset controller.
    pub fn controller(&self) -> &OffsetController {
        &self.controller
    }

    /// Current allocation.
    pub fn allocation(&self) -> &Allocation {
        self.controller.allocation()
    }

    /// Current partition of the pane list.
    pub fn partition(&self) -> LayoutPartition<'_, V> {
        self.allocation().partition(self.panes.as_slice())
    }

    /// Compute placements for the current state.
    pub fn frame(&self) -> Frame {
        let allocation = *self.allocation();
        let offset = self.controller.state();
        let refuge = self.controller.refuge();
        let t = allocation.tab_width;
        let w = allocation.pane_width;
        let width = self.viewport.width;
        let height = self.viewport.height;

        let left_edge = allocation.left_tabs as f64 * t;
        let right_edge = width - allocation.right_tabs as f64 * t;
        let track_x = left_edge + w + offset.x;

        let mut placements = Vec::with_capacity(self.panes.len());
        let right_start = allocation.right_range().start;

        for (index, pane) in self.panes.as_slice().iter().enumerate() {
            let (role, rect, visibility) = if index < allocation.left_tabs {
                let rect = Rect::new(index as f64 * t, 0.0, t, height);
                (PaneRole::LeftTab, rect, Visibility::Visible)
            } else if Some(index) == allocation.pinned_index() {
                let rect = Rect::new(left_edge, 0.0, w, height);
                (PaneRole::Pinned, rect, Visibility::Visible)
            } else if index < right_start {
                let slot = index - allocation.track_range().start;
                let rect = Rect::new(track_x + slot as f64 * w, 0.0, w, height);
                (PaneRole::Track, rect, clip(&rect, left_edge, right_edge))
            } else {
                let from_right = (allocation.pane_count - index) as f64;
                let rect = Rect::new(width - from_right * t, 0.0, t, height);
                (PaneRole::RightTab, rect, Visibility::Visible)
            };

            let in_refuge = refuge.is_some_and(|r| r.index == index);
            let rect = match refuge {
                Some(r) if in_refuge => refuge_rect(&rect, &r, w),
                _ => rect,
            };

            placements.push(PanePlacement {
                pane_id: pane.id.clone(),
                index,
                role,
                rect,
                visibility,
                in_refuge,
            });
        }

        Frame {
            placements,
            allocation,
            offset,
            phase: self.controller.phase(),
            refuge,
            track_x,
            viewport: self.viewport,
        }
    }

    fn relayout(&mut self) {
        let input = AllocatorInput::new(
            self.panes.len(),
            self.config.pane_width,
            self.viewport.width,
            self.config.tab_width,
        );
        self.controller.reconfigure(input);
    }
}

impl<V: Clone> Container<V> {
    /// Lay out and produce views for the current frame.
    ///
    /// Full panes and the pane in refuge get their content rendered with this
    /// container's navigator; collapsed tabs only carry their title.
    pub fn render(&self) -> Vec<RenderedPane<V>> {
        let frame = self.frame();
        frame
            .placements
            .into_iter()
            .zip(self.panes.as_slice())
            .map(|(placement, pane)| {
                let view = (placement.role.is_full() || placement.in_refuge)
                    .then(|| pane.content.view(&self.navigator));
                RenderedPane {
                    placement,
                    title: pane.title.clone(),
                    view,
                }
            })
            .collect()
    }
}

fn clip(rect: &Rect, left: f64, right: f64) -> Visibility {
    if rect.right() <= left {
        Visibility::OffScreenLeft
    } else if rect.x >= right {
        Visibility::OffScreenRight
    } else {
        Visibility::Visible
    }
}

/// Grow a tab toward full pane width as its refuge progresses.
fn refuge_rect(tab: &Rect, refuge: &RefugeView, pane_width: f64) -> Rect {
    let extra = (pane_width - tab.width).max(0.0) * refuge.fraction;
    let width = tab.width + extra;
    let x = match refuge.side {
        RefugeSide::Left => tab.x,
        RefugeSide::Right => tab.x - extra,
    };
    Rect::new(x, tab.y, width, tab.height)
}

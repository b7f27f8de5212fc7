//! Drag/scroll offset controller.
//!
//! Owns the live track offset `x` and the tab-offset counter, and turns an
//! ordered stream of drag or wheel samples into either clamped track movement
//! or single-step tab promotions.
//!
//! `x` is the translation applied to the track. At rest it sits at
//! `-resting_shift` so the last track pane ends on the right edge, and it is
//! always kept inside `[-resting_shift, 0]`. Travel past either bound is
//! accumulated separately as refuge progress; a full pane width of progress
//! moves one pane between tab and pane state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocator::{allocate, Allocation, AllocatorInput};

/// Edge a pane in refuge is coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefugeSide {
    /// The last left tab is being promoted (track dragged right).
    Left,
    /// The first right tab is being restored (track dragged left).
    Right,
}

impl RefugeSide {
    /// Drag direction that advances this refuge.
    pub fn direction(self) -> f64 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }

    /// Change applied to the tab-offset counter when the refuge commits.
    pub fn counter_delta(self) -> i32 {
        match self {
            Self::Left => 1,
            Self::Right => -1,
        }
    }
}

/// Phase of the offset state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DragPhase {
    /// No gesture; `x` sits at the resting offset.
    Resting,
    /// A gesture moves `x` within bounds.
    Dragging,
    /// A gesture pushes past a bound and a pane is mid-transition.
    Refuge {
        /// Edge the pane comes from.
        side: RefugeSide,
        /// Travel accumulated past the bound, in pixels.
        progress: f64,
    },
}

/// Live track offset and its clamp range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetState {
    /// Signed track translation in pixels.
    pub x: f64,
    /// Lower bound of `x`.
    pub min: f64,
    /// Upper bound of `x`.
    pub max: f64,
}

impl OffsetState {
    /// Resting state for an allocation.
    pub fn resting(allocation: &Allocation) -> Self {
        let rest = 0.0 - allocation.resting_shift();
        Self {
            x: rest,
            min: rest,
            max: 0.0,
        }
    }

    /// Check whether `x` lies within bounds.
    pub fn in_bounds(&self) -> bool {
        self.x >= self.min && self.x <= self.max
    }
}

/// One sample from the drag provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSample {
    /// Cumulative offset since the gesture started.
    pub offset: f64,
    /// Sign of the current movement (-1, 0 or 1).
    pub direction: i8,
    /// False once the gesture has ended.
    pub active: bool,
}

impl DragSample {
    /// An in-progress sample; direction is taken from the offset change
    /// reported by the provider.
    pub fn moving(offset: f64, direction: i8) -> Self {
        Self {
            offset,
            direction: direction.signum(),
            active: true,
        }
    }

    /// The final sample of a gesture.
    pub fn released(offset: f64) -> Self {
        Self {
            offset,
            direction: 0,
            active: false,
        }
    }
}

/// Axis a gesture is constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Horizontal movement only.
    X,
}

/// Parameters handed to the drag provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureBounds {
    /// Constrained axis.
    pub axis: Axis,
    /// Lowest offset the provider should report.
    pub min: f64,
    /// Highest offset the provider should report.
    pub max: f64,
}

/// What a sample did to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The track moved (or stayed clamped) within bounds.
    Moved,
    /// A bound was hit with a pane available to move; refuge started.
    EnteredRefuge(RefugeSide),
    /// A refuge committed and the tab-offset counter changed by one.
    Committed(RefugeSide),
    /// A refuge was abandoned by reversing direction.
    Aborted,
    /// The gesture ended and `x` returned to the resting offset.
    Settled,
}

/// A pane currently in refuge, for rendering over the pinned slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefugeView {
    /// Index of the pane in the pane list.
    pub index: usize,
    /// Edge the pane comes from.
    pub side: RefugeSide,
    /// Progress toward commit, from 0 to 1.
    pub fraction: f64,
}

/// Drag/scroll state machine over the allocator.
#[derive(Debug, Clone)]
pub struct OffsetController {
    input: AllocatorInput,
    tab_offset: i32,
    allocation: Allocation,
    state: OffsetState,
    phase: DragPhase,
    last_offset: f64,
}

impl OffsetController {
    /// Create a controller resting on the allocation for `input`.
    pub fn new(input: AllocatorInput) -> Self {
        let allocation = allocate(&input, 0);
        Self {
            input,
            tab_offset: 0,
            allocation,
            state: OffsetState::resting(&allocation),
            phase: DragPhase::Resting,
            last_offset: 0.0,
        }
    }

    /// Apply a structural change (pane list or viewport).
    ///
    /// Discards any gesture in flight, resets the tab-offset counter and
    /// moves to the new resting offset.
    pub fn reconfigure(&mut self, input: AllocatorInput) {
        if self.phase != DragPhase::Resting {
            debug!("Discarding in-flight gesture on layout change");
        }
        self.input = input;
        self.tab_offset = 0;
        self.allocation = allocate(&input, 0);
        self.state = OffsetState::resting(&self.allocation);
        self.phase = DragPhase::Resting;
        self.last_offset = 0.0;
        debug!(
            "Layout reset: {} panes, {} left tabs, resting shift {}",
            self.allocation.pane_count,
            self.allocation.left_tabs,
            self.allocation.resting_shift()
        );
    }

    /// Current allocator input.
    pub fn input(&self) -> &AllocatorInput {
        &self.input
    }

    /// Current allocation.
    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    /// Live offset state.
    pub fn state(&self) -> OffsetState {
        self.state
    }

    /// Live track translation.
    pub fn x(&self) -> f64 {
        self.state.x
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Number of collapsed panes pushed to the right edge.
    pub fn tab_offset(&self) -> i32 {
        self.tab_offset
    }

    /// Resting translation for the current allocation.
    pub fn resting_x(&self) -> f64 {
        0.0 - self.allocation.resting_shift()
    }

    /// Bounds for the drag provider.
    pub fn gesture_bounds(&self) -> GestureBounds {
        GestureBounds {
            axis: Axis::X,
            min: self.state.min,
            max: self.state.max,
        }
    }

    /// The pane currently in refuge, if any.
    pub fn refuge(&self) -> Option<RefugeView> {
        let DragPhase::Refuge { side, progress } = self.phase else {
            return None;
        };
        let index = match side {
            RefugeSide::Left => self.allocation.left_tabs.checked_sub(1)?,
            RefugeSide::Right => self.allocation.right_range().start,
        };
        let width = self.allocation.pane_width;
        let fraction = if width > 0.0 {
            (progress / width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(RefugeView {
            index,
            side,
            fraction,
        })
    }

    /// Process one drag sample.
    pub fn apply(&mut self, sample: DragSample) -> GestureOutcome {
        if !sample.active {
            return self.end_gesture();
        }

        if self.phase == DragPhase::Resting {
            debug!("Gesture started at x={}", self.state.x);
            self.phase = DragPhase::Dragging;
            self.last_offset = 0.0;
        }

        let offset = if sample.offset.is_finite() {
            sample.offset
        } else {
            self.last_offset
        };
        let delta = offset - self.last_offset;
        self.last_offset = offset;

        let direction = if sample.direction != 0 {
            f64::from(sample.direction.signum())
        } else if delta != 0.0 {
            delta.signum()
        } else {
            0.0
        };

        self.advance(delta, direction)
    }

    /// Process a wheel delta as part of an open gesture.
    ///
    /// Positive deltas scroll toward the right end of the list, which moves
    /// the track left. The gesture stays open until [`end_gesture`] or
    /// [`cancel`].
    ///
    /// [`end_gesture`]: Self::end_gesture
    /// [`cancel`]: Self::cancel
    pub fn wheel(&mut self, delta: f64) -> GestureOutcome {
        if !delta.is_finite() {
            return GestureOutcome::Moved;
        }
        let offset = if self.phase == DragPhase::Resting {
            -delta
        } else {
            self.last_offset - delta
        };
        let direction = if delta > 0.0 {
            -1
        } else if delta < 0.0 {
            1
        } else {
            0
        };
        self.apply(DragSample::moving(offset, direction))
    }

    /// End the gesture and return `x` to the resting offset.
    pub fn end_gesture(&mut self) -> GestureOutcome {
        if self.phase == DragPhase::Resting {
            return GestureOutcome::Settled;
        }
        self.state.x = self.resting_x();
        self.phase = DragPhase::Resting;
        self.last_offset = 0.0;
        debug!("Gesture settled at x={}", self.state.x);
        GestureOutcome::Settled
    }

    /// Abort the gesture. Identical to ending it without a commit.
    pub fn cancel(&mut self) -> GestureOutcome {
        self.end_gesture()
    }

    fn advance(&mut self, delta: f64, direction: f64) -> GestureOutcome {
        let DragPhase::Refuge { side, progress } = self.phase else {
            return self.drag_by(delta);
        };

        if direction != 0.0 && direction != side.direction() {
            debug!("Refuge on {:?} aborted", side);
            self.phase = DragPhase::Dragging;
            self.drag_by(delta);
            return GestureOutcome::Aborted;
        }

        let progress = (progress + delta * side.direction()).max(0.0);
        self.phase = DragPhase::Refuge { side, progress };
        if progress >= self.allocation.pane_width {
            return self.commit(side);
        }
        GestureOutcome::Moved
    }

    fn drag_by(&mut self, delta: f64) -> GestureOutcome {
        let target = self.state.x + delta;
        let OffsetState { min, max, .. } = self.state;

        let (side, excess) = if target > max {
            self.state.x = max;
            (RefugeSide::Left, target - max)
        } else if target < min {
            self.state.x = min;
            (RefugeSide::Right, min - target)
        } else {
            self.state.x = target;
            return GestureOutcome::Moved;
        };

        if !self.can_enter_refuge(side) {
            return GestureOutcome::Moved;
        }

        debug!("Entering refuge on {:?}", side);
        self.phase = DragPhase::Refuge {
            side,
            progress: excess,
        };
        if excess >= self.allocation.pane_width {
            return self.commit(side);
        }
        GestureOutcome::EnteredRefuge(side)
    }

    fn can_enter_refuge(&self, side: RefugeSide) -> bool {
        if self.allocation.pane_width <= 0.0 {
            return false;
        }
        match side {
            RefugeSide::Left => self.allocation.left_tabs > 0,
            RefugeSide::Right => self.allocation.right_tabs > 0,
        }
    }

    fn commit(&mut self, side: RefugeSide) -> GestureOutcome {
        let collapsed = i32::try_from(self.allocation.collapsed()).unwrap_or(i32::MAX);
        self.tab_offset = (self.tab_offset + side.counter_delta()).clamp(0, collapsed);
        self.allocation = allocate(&self.input, self.tab_offset);
        self.state = OffsetState::resting(&self.allocation);
        self.phase = DragPhase::Dragging;
        info!(
            "Tab transition committed from {:?}: {} left / {} right tabs",
            side, self.allocation.left_tabs, self.allocation.right_tabs
        );
        GestureOutcome::Committed(side)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    /// 6 panes of 300px in a 700px viewport: 4 left tabs, pinned, one track
    /// pane resting 60px over the pinned pane.
    fn collapsed_controller() -> OffsetController {
        OffsetController::new(AllocatorInput::new(6, 300.0, 700.0, 40.0))
    }

    /// 10 panes of 30px with 40px tabs: nothing collapses, rests at -200.
    fn scrolling_controller() -> OffsetController {
        OffsetController::new(AllocatorInput::new(10, 30.0, 100.0, 40.0))
    }

    #[test]
    fn test_starts_resting() {
        let ctl = scrolling_controller();
        assert_eq!(ctl.phase(), DragPhase::Resting);
        assert_eq!(ctl.x(), -200.0);
        assert_eq!(ctl.state().min, -200.0);
        assert_eq!(ctl.state().max, 0.0);
        assert_eq!(ctl.gesture_bounds().axis, Axis::X);
    }

    #[test]
    fn test_drag_moves_within_bounds() {
        let mut ctl = scrolling_controller();

        assert_eq!(ctl.apply(DragSample::moving(50.0, 1)), GestureOutcome::Moved);
        assert_eq!(ctl.phase(), DragPhase::Dragging);
        assert_eq!(ctl.x(), -150.0);

        ctl.apply(DragSample::moving(500.0, 1));
        assert_eq!(ctl.x(), 0.0);
        // No tabs to promote, so the overshoot is simply clamped.
        assert_eq!(ctl.phase(), DragPhase::Dragging);

        ctl.apply(DragSample::moving(460.0, -1));
        assert_eq!(ctl.x(), -40.0);
    }

    #[test]
    fn test_release_returns_to_rest() {
        let mut ctl = scrolling_controller();
        ctl.apply(DragSample::moving(50.0, 1));
        assert_eq!(ctl.x(), -150.0);
        assert_eq!(ctl.apply(DragSample::released(50.0)), GestureOutcome::Settled);

        assert_eq!(ctl.x(), -200.0);
        assert_eq!(ctl.phase(), DragPhase::Resting);
    }

    #[test]
    fn test_release_near_upper_bound_returns_to_rest() {
        // Two panes of 300 in 400: nothing collapses and the track pane
        // rests 200px over the pinned one, more than half a pane.
        let mut ctl = OffsetController::new(AllocatorInput::new(2, 300.0, 400.0, 40.0));
        assert_eq!(ctl.resting_x(), -200.0);

        ctl.apply(DragSample::moving(200.0, 1));
        assert_eq!(ctl.x(), 0.0);
        ctl.apply(DragSample::released(200.0));

        assert_eq!(ctl.phase(), DragPhase::Resting);
        assert_eq!(ctl.x(), ctl.resting_x());

        ctl.apply(DragSample::moving(180.0, 1));
        ctl.cancel();
        assert_eq!(ctl.x(), -200.0);
    }

    #[test]
    fn test_refuge_commit_promotes_left_tab() {
        let mut ctl = collapsed_controller();
        assert_eq!(ctl.allocation().left_tabs, 4);
        assert_eq!(ctl.x(), -60.0);

        // 60px reaches the bound, the remaining 40px start the refuge.
        assert_eq!(
            ctl.apply(DragSample::moving(100.0, 1)),
            GestureOutcome::EnteredRefuge(RefugeSide::Left)
        );
        assert_eq!(ctl.x(), 0.0);
        let refuge = ctl.refuge().expect("refuge");
        assert_eq!(refuge.index, 3);
        assert!((refuge.fraction - 40.0 / 300.0).abs() < 1e-9);

        assert_eq!(ctl.apply(DragSample::moving(250.0, 1)), GestureOutcome::Moved);
        assert_eq!(
            ctl.apply(DragSample::moving(400.0, 1)),
            GestureOutcome::Committed(RefugeSide::Left)
        );

        assert_eq!(ctl.tab_offset(), 1);
        assert_eq!(ctl.allocation().left_tabs, 3);
        assert_eq!(ctl.allocation().right_tabs, 1);
        assert_eq!(ctl.phase(), DragPhase::Dragging);
        assert_eq!(ctl.x(), ctl.resting_x());
        assert!(ctl.refuge().is_none());
    }

    #[test]
    fn test_refuge_reversal_aborts() {
        let mut ctl = collapsed_controller();
        ctl.apply(DragSample::moving(120.0, 1));
        assert!(matches!(ctl.phase(), DragPhase::Refuge { .. }));

        assert_eq!(ctl.apply(DragSample::moving(100.0, -1)), GestureOutcome::Aborted);
        assert_eq!(ctl.phase(), DragPhase::Dragging);
        assert_eq!(ctl.tab_offset(), 0);

        ctl.apply(DragSample::released(100.0));
        assert_eq!(ctl.phase(), DragPhase::Resting);
        assert_eq!(ctl.allocation().left_tabs, 4);
    }

    #[test]
    fn test_release_in_refuge_does_not_commit() {
        let mut ctl = collapsed_controller();
        ctl.apply(DragSample::moving(200.0, 1));
        ctl.apply(DragSample::released(200.0));

        assert_eq!(ctl.tab_offset(), 0);
        assert_eq!(ctl.x(), ctl.resting_x());
        assert!(ctl.refuge().is_none());
    }

    #[test]
    fn test_right_refuge_restores_tab() {
        let mut ctl = collapsed_controller();
        ctl.apply(DragSample::moving(400.0, 1));
        assert_eq!(ctl.tab_offset(), 1);
        ctl.apply(DragSample::released(400.0));

        // Dragging left with a right tab present pulls it back.
        assert_eq!(
            ctl.apply(DragSample::moving(-100.0, -1)),
            GestureOutcome::EnteredRefuge(RefugeSide::Right)
        );
        assert_eq!(ctl.refuge().map(|r| r.index), Some(5));
        assert_eq!(
            ctl.apply(DragSample::moving(-300.0, -1)),
            GestureOutcome::Committed(RefugeSide::Right)
        );
        assert_eq!(ctl.tab_offset(), 0);
        assert_eq!(ctl.allocation().right_tabs, 0);
    }

    #[test]
    fn test_one_commit_per_sample() {
        let mut ctl = collapsed_controller();
        assert_eq!(
            ctl.apply(DragSample::moving(5000.0, 1)),
            GestureOutcome::Committed(RefugeSide::Left)
        );
        assert_eq!(ctl.tab_offset(), 1);
    }

    #[test]
    fn test_no_refuge_without_tabs_on_that_side() {
        let mut ctl = collapsed_controller();
        // No right tabs yet: dragging left only clamps.
        assert_eq!(ctl.apply(DragSample::moving(-500.0, -1)), GestureOutcome::Moved);
        assert_eq!(ctl.phase(), DragPhase::Dragging);
        assert_eq!(ctl.x(), ctl.state().min);
    }

    #[test]
    fn test_x_stays_in_bounds_during_drag() {
        let mut ctl = collapsed_controller();
        let mut offset = 0.0;
        let steps = [
            90.0, 90.0, 90.0, 90.0, -30.0, 200.0, 350.0, -700.0, -400.0, 120.0, 80.0, -60.0,
            1000.0, -2500.0, 45.0,
        ];
        for step in steps {
            offset += step;
            let direction = if step > 0.0 { 1 } else { -1 };
            ctl.apply(DragSample::moving(offset, direction));
            let state = ctl.state();
            assert!(state.in_bounds(), "x={} outside [{}, {}]", state.x, state.min, state.max);
            assert!((0..=4).contains(&ctl.tab_offset()));
        }
    }

    #[test]
    fn test_reconfigure_discards_gesture() {
        let mut ctl = collapsed_controller();
        ctl.apply(DragSample::moving(400.0, 1));
        ctl.apply(DragSample::moving(450.0, 1));
        assert_eq!(ctl.tab_offset(), 1);

        ctl.reconfigure(AllocatorInput::new(7, 300.0, 700.0, 40.0));

        assert_eq!(ctl.phase(), DragPhase::Resting);
        assert_eq!(ctl.tab_offset(), 0);
        assert_eq!(ctl.allocation().right_tabs, 0);
        assert_eq!(ctl.x(), ctl.resting_x());
    }

    #[test]
    fn test_wheel_scrolls_track() {
        let mut ctl = scrolling_controller();
        ctl.end_gesture();

        // Wheel up (negative) moves the track right.
        ctl.wheel(-60.0);
        assert_eq!(ctl.x(), -140.0);
        ctl.wheel(-30.0);
        assert_eq!(ctl.x(), -110.0);
        ctl.wheel(50.0);
        assert_eq!(ctl.x(), -160.0);

        ctl.end_gesture();
        assert_eq!(ctl.phase(), DragPhase::Resting);
        assert_eq!(ctl.x(), -200.0);
    }

    #[test]
    fn test_wheel_promotes_tab() {
        let mut ctl = collapsed_controller();
        ctl.wheel(-200.0);
        assert!(matches!(ctl.phase(), DragPhase::Refuge { side: RefugeSide::Left, .. }));
        assert_eq!(ctl.wheel(-200.0), GestureOutcome::Committed(RefugeSide::Left));
        assert_eq!(ctl.tab_offset(), 1);
    }

    #[test]
    fn test_non_finite_samples_are_ignored() {
        let mut ctl = scrolling_controller();
        ctl.apply(DragSample::moving(f64::NAN, 1));
        assert_eq!(ctl.x(), -200.0);
        ctl.wheel(f64::INFINITY);
        assert_eq!(ctl.x(), -200.0);
    }

    #[test]
    fn test_cancel_matches_release() {
        let mut a = collapsed_controller();
        let mut b = collapsed_controller();
        for ctl in [&mut a, &mut b] {
            ctl.apply(DragSample::moving(150.0, 1));
        }
        a.cancel();
        b.apply(DragSample::released(150.0));
        assert_eq!(a.state(), b.state());
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.tab_offset(), b.tab_offset());
    }
}

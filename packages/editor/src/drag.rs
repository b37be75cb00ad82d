//! # Drag-and-Drop Coordinator
//!
//! Turns pointer gestures into `move_block` requests.
//!
//! ```text
//! Idle -> Armed -> Dragging -> Idle
//!    \------> Idle (click or cancel from Armed)
//! ```
//!
//! The coordinator never mutates the tree. It reads the store to validate
//! hover targets and reports a [`DragOutcome`]; the session applies the move.
//! Geometry comes from the UI layer as a list of [`DropZone`]s.

use crate::mutations::MutationError;
use crate::tree::TreeStore;
use blockmail_model::BlockId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pointer travel (in px) before a press turns into a drag
pub const DEFAULT_ACTIVATION_DISTANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_squared(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned bounding box in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Rendered bounds of a block that may receive drops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    pub id: BlockId,
    pub rect: Rect,
}

impl DropZone {
    pub fn new(id: impl Into<BlockId>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
        }
    }
}

/// Hover feedback for the current drop candidate
#[derive(Debug, Clone, PartialEq)]
pub enum DropFeedback {
    /// Releasing here moves the source into `target`
    Valid(BlockId),

    /// Releasing here does nothing; `reason` explains why
    Invalid {
        target: BlockId,
        reason: MutationError,
    },
}

impl DropFeedback {
    pub fn target(&self) -> &str {
        match self {
            DropFeedback::Valid(target) | DropFeedback::Invalid { target, .. } => target,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, DropFeedback::Valid(_))
    }
}

/// Gesture lifecycle state
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,

    /// Pointer is down on a block but has not travelled far enough
    Armed { source: BlockId, origin: Point },

    Dragging {
        source: BlockId,
        origin: Point,
        current: Point,
        hover: Option<DropFeedback>,
    },
}

/// What a finished gesture asks the session to do
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Pointer released before the activation distance: select the block
    Click(BlockId),

    /// Move `source` into `target`
    Drop { source: BlockId, target: BlockId },

    /// Released over a target that cannot accept the source
    Rejected {
        source: BlockId,
        target: BlockId,
        reason: MutationError,
    },

    /// Released outside every zone, or aborted
    Cancelled,

    /// Pointer event arrived with no gesture in progress
    Ignored,
}

/// Pointer-driven drag state machine
#[derive(Debug, Clone)]
pub struct DragCoordinator {
    state: DragState,
    activation_distance: f32,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::with_activation_distance(DEFAULT_ACTIVATION_DISTANCE)
    }

    pub fn with_activation_distance(activation_distance: f32) -> Self {
        Self {
            state: DragState::Idle,
            activation_distance: activation_distance.max(0.0),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Block being dragged, once the drag has started
    pub fn source(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn hover(&self) -> Option<&DropFeedback> {
        match &self.state {
            DragState::Dragging { hover, .. } => hover.as_ref(),
            _ => None,
        }
    }

    /// Pointer pressed on a block
    pub fn pointer_down(&mut self, source: impl Into<BlockId>, point: Point) {
        self.state = DragState::Armed {
            source: source.into(),
            origin: point,
        };
    }

    /// Pointer moved. Starts the drag once past the activation distance and
    /// refreshes the hover target while dragging.
    pub fn pointer_move(
        &mut self,
        point: Point,
        zones: &[DropZone],
        store: &TreeStore,
    ) -> Option<&DropFeedback> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);

        self.state = match state {
            DragState::Idle => DragState::Idle,

            DragState::Armed { source, origin } => {
                let threshold = self.activation_distance * self.activation_distance;
                if origin.distance_squared(point) >= threshold {
                    debug!(source = %source, "Drag started");
                    let hover = resolve_feedback(&source, hit_test(point, zones), store);
                    DragState::Dragging {
                        source,
                        origin,
                        current: point,
                        hover,
                    }
                } else {
                    DragState::Armed { source, origin }
                }
            }

            DragState::Dragging { source, origin, .. } => {
                let hover = resolve_feedback(&source, hit_test(point, zones), store);
                DragState::Dragging {
                    source,
                    origin,
                    current: point,
                    hover,
                }
            }
        };

        self.hover()
    }

    /// Pointer released. Always returns the machine to `Idle`.
    pub fn pointer_up(&mut self, point: Point, zones: &[DropZone], store: &TreeStore) -> DragOutcome {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => DragOutcome::Ignored,

            DragState::Armed { source, .. } => DragOutcome::Click(source),

            DragState::Dragging { source, .. } => {
                match resolve_feedback(&source, zone_at(point, zones), store) {
                    Some(DropFeedback::Valid(target)) => DragOutcome::Drop { source, target },
                    Some(DropFeedback::Invalid { target, reason }) => {
                        debug!(source = %source, target = %target, %reason, "Drop rejected");
                        DragOutcome::Rejected {
                            source,
                            target,
                            reason,
                        }
                    }
                    None => DragOutcome::Cancelled,
                }
            }
        }
    }

    /// Abort the gesture without touching the tree
    pub fn cancel(&mut self) -> DragOutcome {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => DragOutcome::Ignored,
            _ => DragOutcome::Cancelled,
        }
    }
}

impl Default for DragCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_feedback(
    source: &str,
    zone: Option<&DropZone>,
    store: &TreeStore,
) -> Option<DropFeedback> {
    let zone = zone?;
    Some(match store.validate_move(source, &zone.id) {
        Ok(()) => DropFeedback::Valid(zone.id.clone()),
        Err(reason) => DropFeedback::Invalid {
            target: zone.id.clone(),
            reason,
        },
    })
}

/// Innermost zone containing `point`. Ties keep the order of `zones`.
pub fn zone_at(point: Point, zones: &[DropZone]) -> Option<&DropZone> {
    zones
        .iter()
        .filter(|zone| zone.rect.contains(point))
        .fold(None::<&DropZone>, |best, zone| match best {
            Some(b) if b.rect.area() <= zone.rect.area() => Some(b),
            _ => Some(zone),
        })
}

/// Hover candidate for `point`.
///
/// Same as [`zone_at`], except that outside every zone the zone with the
/// nearest center is suggested. Only used for hover feedback; a release
/// needs a zone under the pointer.
pub fn hit_test(point: Point, zones: &[DropZone]) -> Option<&DropZone> {
    zone_at(point, zones).or_else(|| {
        zones.iter().fold(None::<&DropZone>, |best, zone| match best {
            Some(b)
                if b.rect.center().distance_squared(point)
                    <= zone.rect.center().distance_squared(point) =>
            {
                Some(b)
            }
            _ => Some(zone),
        })
    })
}

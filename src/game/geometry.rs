//! Tunnel geometry store
//!
//! An append-only ordered sequence of wall-offset pairs, one per fixed-height
//! segment. The coordinate stream task is the single writer; the simulation
//! loop only reads windows of it. Once the stream signals completion the
//! store is frozen and further appends are dropped.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use super::{CANVAS_HEIGHT, SEGMENT_HEIGHT};

/// One fixed-height slice of tunnel, as signed offsets from the center line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub left: f64,
    pub right: f64,
}

/// Geometry shared between the stream task (writer) and the session (reader)
pub type SharedGeometry = Arc<RwLock<TunnelGeometry>>;

/// Append-only tunnel geometry for one session
#[derive(Debug, Default)]
pub struct TunnelGeometry {
    segments: Vec<WallSegment>,
    complete: bool,
}

impl TunnelGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedGeometry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Append one segment in receive order. Dropped after completion.
    pub fn push(&mut self, segment: WallSegment) {
        if self.complete {
            warn!(?segment, "Segment received after stream completion, dropping");
            return;
        }
        self.segments.push(segment);
    }

    /// Mark the geometry read-only; the stream sent its sentinel.
    pub fn freeze(&mut self) {
        self.complete = true;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at a given index (segment index = vertical position / height)
    pub fn get(&self, index: usize) -> Option<WallSegment> {
        self.segments.get(index).copied()
    }

    /// Total vertical extent of the tunnel
    pub fn total_height(&self) -> f64 {
        self.segments.len() as f64 * SEGMENT_HEIGHT
    }

    /// Segment index of the leading edge at a given scroll offset
    pub fn leading_index(offset_y: f64) -> usize {
        (offset_y / SEGMENT_HEIGHT).floor() as usize
    }

    /// Sub-segment remainder of the scroll offset, for seamless rendering
    pub fn sub_offset(offset_y: f64) -> f64 {
        offset_y % SEGMENT_HEIGHT
    }

    /// The slice of segments visible at a given scroll offset.
    ///
    /// Two segments past the bottom edge are included so sub-segment
    /// scrolling never exposes a seam at the boundary.
    pub fn visible_window(&self, offset_y: f64) -> &[WallSegment] {
        let start = Self::leading_index(offset_y).min(self.segments.len());
        let count = (CANVAS_HEIGHT / SEGMENT_HEIGHT) as usize + 2;
        let end = (start + count).min(self.segments.len());
        &self.segments[start..end]
    }
}

// Point-in-time copies handed to the presentation sink. Nothing here refers back
// into world storage; every field is an owned value.

use super::geometry::{AimDirection, Position, ViewportMetrics};
use super::state::{Aim, RunCounters};
use super::tuning::DifficultyLevel;

/// Capacity of the publisher-owned hit-marker ring.
pub const MARKER_RING_CAPACITY: usize = 32;
/// Frames a hit marker stays visible.
pub const MARKER_LIFETIME_FRAMES: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileView {
    pub position: Position,
    pub direction: AimDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitMarker {
    pub position: Position,
    pub frames_left: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BayGauge {
    pub loaded: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub frame: u64,
    pub difficulty: DifficultyLevel,
    pub viewport: ViewportMetrics,
    pub actors: Vec<Position>,
    pub projectiles: Vec<ProjectileView>,
    pub aim: Aim,
    pub bays: BayGauge,
    pub counters: RunCounters,
    pub markers: Vec<HitMarker>,
}

/// Short-lived hit markers; new markers are dropped while the ring is full.
#[derive(Debug, Clone, Default)]
pub struct MarkerRing {
    markers: Vec<HitMarker>,
}

impl MarkerRing {
    pub fn new() -> Self {
        Self {
            markers: Vec::with_capacity(MARKER_RING_CAPACITY),
        }
    }

    pub fn push(&mut self, position: Position) -> bool {
        if self.markers.len() >= MARKER_RING_CAPACITY {
            return false;
        }
        self.markers.push(HitMarker {
            position,
            frames_left: MARKER_LIFETIME_FRAMES,
        });
        true
    }

    /// Ages every marker by one frame and prunes the expired ones.
    pub fn decay(&mut self) {
        for marker in &mut self.markers {
            marker.frames_left = marker.frames_left.saturating_sub(1);
        }
        self.markers.retain(|marker| marker.frames_left > 0);
    }

    pub fn markers(&self) -> &[HitMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

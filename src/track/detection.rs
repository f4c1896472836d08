use serde::{Deserialize, Serialize};

use crate::track::{BBox, Ltrb, TrackId};

///
/// A bounding box detection in a single frame.
///
/// class_id : index into the detector's class vocabulary.
/// confidence : f32 - Detector confidence score.
/// bbox : BBox in format `(x1, y1, x2, y2)`.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BBox<Ltrb>,
}

/// A detection the tracker attached to a persistent identity.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDetection {
    pub track_id: TrackId,
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BBox<Ltrb>,
}

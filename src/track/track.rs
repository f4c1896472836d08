use crate::track::{BBox, Detection, Ltrb, TrackId};

///
///   Enumeration type for the single target track state. Newly created tracks are
///   classified as `tentative` until enough evidence has been collected. Then,
///   the track state is changed to `confirmed`. Tracks that are no longer alive
///   are classified as `deleted` to mark them for removal from the set of active
///   tracks.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackState {
    Tentative,
    Confirmed,
    Deleted,
}

///
/// A single target track following the last associated box of one object.
///
/// track_id : A unique track identifier.
/// class_id : Detector class the track was started from; only detections
///     of the same class are associated with it.
/// n_init : Number of hits before the track is confirmed. The track is
///     deleted if a miss occurs while it is still tentative.
/// max_age : Maximum number of consecutive misses before the track is deleted.
///
#[derive(Clone, Debug)]
pub struct Track {
    pub track_id: TrackId,
    pub class_id: usize,
    pub time_since_update: u32,

    bbox: BBox<Ltrb>,
    hits: u32,
    state: TrackState,
    n_init: u32,
    max_age: u32,
}

impl Track {
    pub fn new(detection: &Detection, track_id: TrackId, n_init: u32, max_age: u32) -> Self {
        let state = if n_init <= 1 {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        };

        Self {
            track_id,
            class_id: detection.class_id,
            time_since_update: 0,
            bbox: detection.bbox,
            hits: 1,
            state,
            n_init,
            max_age,
        }
    }

    /// Last associated box in `(x1, y1, x2, y2)` format.
    #[inline]
    pub fn bbox(&self) -> BBox<Ltrb> {
        self.bbox
    }

    /// Advance the track one frame. Must be called once per frame before
    /// association.
    pub fn predict(&mut self) {
        self.time_since_update += 1;
    }

    pub fn update(&mut self, detection: &Detection) {
        self.bbox = detection.bbox;

        self.hits += 1;
        self.time_since_update = 0;

        if self.state == TrackState::Tentative && self.hits >= self.n_init {
            self.state = TrackState::Confirmed;
        }
    }

    ///
    /// Mark this track as missed (no association at the current time step).
    ///
    #[inline]
    pub fn mark_missed(&mut self) {
        if self.state == TrackState::Tentative || self.time_since_update > self.max_age {
            self.state = TrackState::Deleted;
        }
    }

    /// Promote a track regardless of its hit count.
    #[inline]
    pub fn confirm(&mut self) {
        if self.state == TrackState::Tentative {
            self.state = TrackState::Confirmed;
        }
    }

    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.state == TrackState::Deleted
    }
}

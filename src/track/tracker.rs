use tracing::debug;

use crate::config::TrackingConfig;
use crate::track::iou_matching::iou_cost;
use crate::track::linear_assignment::min_cost_matching;
use crate::track::track::Track;
use crate::track::{Detection, ObjectTracker, TrackId, TrackedDetection};

/// This is the multi-target tracker.
///
/// Associates each frame's detections with the tracks alive in the previous
/// frame by IoU, solving the assignment with the Hungarian method.
///
/// ```text
///     max_iou_distance : Associations with `1 - iou` above it are rejected.
///     max_age : Maximum number of missed frames before a track is deleted.
///     n_init : Number of hits before a track is reported. Tracks born on the
///         very first frame are reported at once, so the opening frame of a
///         clip carries identities.
/// ```
#[derive(Clone, Debug)]
pub struct IouTracker {
    max_iou_distance: f32,
    max_age: u32,
    n_init: u32,
    tracks: Vec<Track>,
    next_id: TrackId,
    frame_count: usize,
}

impl IouTracker {
    pub fn new(max_iou_distance: f32 /*=0.7*/, max_age: u32 /*=30*/, n_init: u32 /*=1*/) -> Self {
        Self {
            max_iou_distance,
            max_age,
            n_init,
            tracks: Vec::new(),
            next_id: 1,
            frame_count: 0,
        }
    }

    pub fn from_config(config: &TrackingConfig) -> Self {
        Self::new(config.max_iou_distance, config.max_age, config.n_init)
    }

    fn initiate_track(&mut self, detection: &Detection) -> usize {
        let mut track = Track::new(detection, self.next_id, self.n_init, self.max_age);
        if self.frame_count == 1 {
            track.confirm();
        }

        self.tracks.push(track);
        self.next_id += 1;

        self.tracks.len() - 1
    }
}

impl ObjectTracker for IouTracker {
    fn update(&mut self, detections: &[Detection]) -> Vec<TrackedDetection> {
        self.frame_count += 1;

        for track in &mut self.tracks {
            track.predict();
        }

        let (matches, unmatched_tracks, unmatched_detections) =
            min_cost_matching(&iou_cost, self.max_iou_distance, &self.tracks, detections);

        let mut reported = Vec::with_capacity(detections.len());

        for &(track_idx, detection_idx) in &matches {
            self.tracks[track_idx].update(&detections[detection_idx]);
            reported.push((track_idx, detection_idx));
        }

        for &track_idx in &unmatched_tracks {
            self.tracks[track_idx].mark_missed();
        }

        for &detection_idx in &unmatched_detections {
            let track_idx = self.initiate_track(&detections[detection_idx]);
            reported.push((track_idx, detection_idx));
        }

        let output: Vec<TrackedDetection> = reported
            .into_iter()
            .filter(|&(track_idx, _)| self.tracks[track_idx].is_confirmed())
            .map(|(track_idx, detection_idx)| {
                let detection = &detections[detection_idx];

                TrackedDetection {
                    track_id: self.tracks[track_idx].track_id,
                    class_id: detection.class_id,
                    confidence: detection.confidence,
                    bbox: detection.bbox,
                }
            })
            .collect();

        self.tracks.retain(|t| !t.is_deleted());

        debug!(
            frame = self.frame_count,
            matched = matches.len(),
            born = unmatched_detections.len(),
            alive = self.tracks.len(),
            "tracker update"
        );

        output
    }
}

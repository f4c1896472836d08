use ndarray::prelude::*;

use crate::track::linear_assignment::INFTY_COST;
use crate::track::track::Track;
use crate::track::{BBox, Detection, Ltwh};

/// Computer intersection over union.
/// Parameters
/// ----------
/// bbox : A bounding box in format `(top left x, top left y, width, height)`.
/// candidates : Candidate bounding boxes in the same format as `bbox`.
/// Returns
/// -------
/// The intersection over union in [0, 1] between the `bbox` and each
/// candidate. Degenerate (zero area) pairs score 0.
pub fn iou(bbox: &BBox<Ltwh>, candidates: &[BBox<Ltwh>]) -> Array1<f32> {
    let bbox_area = bbox.width() * bbox.height();
    let b1 = bbox.as_ltrb();

    candidates
        .iter()
        .map(|c_ltwh| {
            let b2 = c_ltwh.as_ltrb();

            let i_xmin = b1.left().max(b2.left());
            let i_ymin = b1.top().max(b2.top());

            let i_xmax = b1.right().min(b2.right());
            let i_ymax = b1.bottom().min(b2.bottom());

            let intersection_area = (i_xmax - i_xmin).max(0.0) * (i_ymax - i_ymin).max(0.0);
            let candidate_area = c_ltwh.width() * c_ltwh.height();
            let union_area = bbox_area + candidate_area - intersection_area;

            if union_area <= 0.0 {
                0.0
            } else {
                intersection_area / union_area
            }
        })
        .collect()
}

///
/// An intersection over union distance metric.
///
/// Returns a square cost matrix padded to `max(tracks, detections)` where
/// entry (i, j) is `1 - iou(tracks[track_indices[i]], detections[detection_indices[j]])`.
/// Pairs of different classes cost `INFTY_COST` so a referee track never
/// absorbs a player detection.
///
pub fn iou_cost(tracks: &[Track], detections: &[Detection], track_indices: &[usize], detection_indices: &[usize]) -> Array2<f32> {
    let track_n = track_indices.len();
    let det_n = detection_indices.len();
    let n = track_n.max(det_n);

    let mut cost_matrix = Array2::from_elem((n, n), 1.0);

    let candidates: Vec<_> = detection_indices
        .iter()
        .map(|&i| detections[i].bbox.as_ltwh())
        .collect();

    for (row, &track_idx) in track_indices.iter().enumerate() {
        let track = &tracks[track_idx];

        let mut costs = 1.0 - iou(&track.bbox().as_ltwh(), &candidates);
        for (cost, &det_idx) in costs.iter_mut().zip(detection_indices.iter()) {
            if detections[det_idx].class_id != track.class_id {
                *cost = INFTY_COST;
            }
        }

        cost_matrix.slice_mut(s![row, ..det_n]).assign(&costs);
    }

    cost_matrix
}

#[test]
fn iou_of_identical_and_disjoint_boxes() {
    let bbox = BBox::ltwh(0.0, 0.0, 10.0, 10.0);
    let scores = iou(&bbox, &[
        BBox::ltwh(0.0, 0.0, 10.0, 10.0),
        BBox::ltwh(5.0, 0.0, 10.0, 10.0),
        BBox::ltwh(50.0, 50.0, 10.0, 10.0),
    ]);

    assert!((scores[0] - 1.0).abs() < 1e-6);
    assert!((scores[1] - 50.0 / 150.0).abs() < 1e-6);
    assert_eq!(scores[2], 0.0);
}

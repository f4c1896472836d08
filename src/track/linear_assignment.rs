use ndarray::prelude::*;
use tracing::warn;

use crate::track::track::Track;
use crate::track::Detection;

pub const INFTY_COST: f32 = 1e+5;

/// Solve linear assignment problem.
///
/// Parameters
/// ----------
/// distance_metric : Fn(tracks, detections, track_indices, detection_indices) -> Array2
///     Returns the (padded, square) cost matrix where element (i, j) is the
///     association cost between the i-th track in the given track indices and
///     the j-th detection in the given detection indices.
/// max_distance : Gating threshold. Associations with cost larger than this
///     value are disregarded.
/// tracks : Tracks at the current time step.
/// detections : Detections at the current time step.
///
/// Returns
/// -------
/// (matches, unmatched_tracks, unmatched_detections), all expressed as
/// indices into `tracks` and `detections`.
///
pub fn min_cost_matching<D: Fn(&[Track], &[Detection], &[usize], &[usize]) -> Array2<f32>>(
    distance_metric: &D,
    max_distance: f32,
    tracks: &[Track],
    detections: &[Detection],
) -> (Vec<(usize, usize)>, Vec<usize>, Vec<usize>) {
    let track_indices: Vec<usize> = (0..tracks.len()).collect();
    let detection_indices: Vec<usize> = (0..detections.len()).collect();

    if detection_indices.is_empty() || track_indices.is_empty() {
        return (vec![], track_indices, detection_indices);  // Nothing to match.
    }

    let mut cost_matrix = distance_metric(tracks, detections, &track_indices, &detection_indices);
    cost_matrix.mapv_inplace(|x| if x > max_distance { max_distance + 1.0e-5 } else { x });

    let mut weights = munkres::WeightMatrix::from_row_vec(cost_matrix.nrows(), cost_matrix.iter().copied().collect());
    let indices = match munkres::solve_assignment(&mut weights) {
        Ok(indices) => indices,
        Err(err) => {
            warn!("assignment solver failed ({:?}), treating every pair as unmatched", err);
            return (vec![], track_indices, detection_indices);
        }
    };

    let mut track_matched = vec![false; track_indices.len()];
    let mut detection_matched = vec![false; detection_indices.len()];
    let mut matches = vec![];

    for pos in indices.into_iter() {
        if pos.row < track_indices.len() && pos.column < detection_indices.len()
            && cost_matrix[(pos.row, pos.column)] <= max_distance
        {
            track_matched[pos.row] = true;
            detection_matched[pos.column] = true;
            matches.push((track_indices[pos.row], detection_indices[pos.column]));
        }
    }

    let unmatched_tracks = track_indices
        .into_iter()
        .filter(|&idx| !track_matched[idx])
        .collect();

    let unmatched_detections = detection_indices
        .into_iter()
        .filter(|&idx| !detection_matched[idx])
        .collect();

    (matches, unmatched_tracks, unmatched_detections)
}

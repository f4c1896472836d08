use ndarray::prelude::*;

use crate::error::Error;

/// Result of a k=2 clustering over row-vector samples.
#[derive(Debug, Clone)]
pub struct TwoClusters {
    centers: Array2<f32>,
    labels: Vec<usize>,
}

impl TwoClusters {
    #[inline]
    pub fn center(&self, cluster: usize) -> ArrayView1<'_, f32> {
        self.centers.row(cluster)
    }

    /// Cluster of every fitted sample, in input order.
    #[inline]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Nearest centre of `point`; ties go to cluster 0.
    #[inline]
    pub fn predict(&self, point: ArrayView1<'_, f32>) -> usize {
        nearest(self.centers.view(), point)
    }

    /// `false` when both centres coincide, i.e. the samples held a single value.
    pub fn is_separated(&self) -> bool {
        squared_distance(self.center(0), self.center(1)) > 0.0
    }
}

#[inline]
fn squared_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[inline]
fn nearest(centers: ArrayView2<'_, f32>, point: ArrayView1<'_, f32>) -> usize {
    if squared_distance(centers.row(1), point) < squared_distance(centers.row(0), point) {
        1
    } else {
        0
    }
}

/// Split `points` (one sample per row) into two clusters with Lloyd's algorithm.
///
/// Seeding is deterministic: the first sample, then the sample farthest from
/// it (first one on ties). An emptied cluster keeps its previous centre.
/// Iterates until no label changes or `max_iterations` is reached.
pub fn fit_two_clusters(points: ArrayView2<'_, f32>, max_iterations: usize) -> Result<TwoClusters, Error> {
    if points.nrows() == 0 {
        return Err(Error::InvalidFrame("no samples to cluster".into()));
    }

    let first = points.row(0);
    let mut farthest = 0;
    let mut farthest_dist = 0.0;
    for (idx, row) in points.outer_iter().enumerate() {
        let dist = squared_distance(first, row);
        if dist > farthest_dist {
            farthest = idx;
            farthest_dist = dist;
        }
    }

    let mut centers = Array2::zeros((2, points.ncols()));
    centers.row_mut(0).assign(&first);
    centers.row_mut(1).assign(&points.row(farthest));

    let mut labels = vec![usize::MAX; points.nrows()];

    for _ in 0..max_iterations.max(1) {
        let mut changed = false;
        for (label, row) in labels.iter_mut().zip(points.outer_iter()) {
            let cluster = nearest(centers.view(), row);
            if *label != cluster {
                *label = cluster;
                changed = true;
            }
        }

        if !changed {
            break;
        }

        for cluster in 0..2 {
            let mut sum = Array1::<f32>::zeros(points.ncols());
            let mut count = 0usize;

            for (&label, row) in labels.iter().zip(points.outer_iter()) {
                if label == cluster {
                    sum += &row;
                    count += 1;
                }
            }

            if count > 0 {
                centers.row_mut(cluster).assign(&(sum / count as f32));
            }
        }
    }

    Ok(TwoClusters { centers, labels })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_two_blobs() {
        let points = arr2(&[
            [0.0f32, 0.0, 0.0],
            [250.0, 250.0, 250.0],
            [2.0, 1.0, 0.0],
            [248.0, 252.0, 251.0],
            [1.0, 2.0, 3.0],
        ]);

        let clusters = fit_two_clusters(points.view(), 300).unwrap();

        assert_eq!(clusters.labels(), &[0, 1, 0, 1, 0]);
        assert!((clusters.center(0)[0] - 1.0).abs() < 1e-4);
        assert!((clusters.center(1)[1] - 251.0).abs() < 1e-4);
        assert!(clusters.is_separated());
        assert_eq!(clusters.predict(aview1(&[240.0, 240.0, 240.0])), 1);
        assert_eq!(clusters.predict(aview1(&[10.0, 10.0, 10.0])), 0);
    }

    #[test]
    fn identical_samples_collapse() {
        let points = Array2::from_elem((6, 3), 17.0f32);
        let clusters = fit_two_clusters(points.view(), 300).unwrap();

        assert!(!clusters.is_separated());
        assert!(clusters.labels().iter().all(|&l| l == 0));
    }

    #[test]
    fn empty_input_fails() {
        let points = Array2::<f32>::zeros((0, 3));

        assert!(fit_two_clusters(points.view(), 300).is_err());
    }
}

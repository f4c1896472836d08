pub mod assigner;
pub mod kmeans;

pub use assigner::TeamAssigner;
pub use kmeans::{fit_two_clusters, TwoClusters};

use serde::{Deserialize, Serialize};

/// BGR colour, as a cluster centre over 8-bit pixel values.
pub type Color = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    One,
    Two,
}

impl Team {
    /// 1-based team number.
    #[inline]
    pub fn id(&self) -> u8 {
        match self {
            Team::One => 1,
            Team::Two => 2,
        }
    }

    /// Team owning the given cluster of the two-team colour model.
    #[inline]
    pub fn from_cluster(cluster: usize) -> Self {
        if cluster == 0 {
            Team::One
        } else {
            Team::Two
        }
    }
}

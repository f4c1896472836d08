pub mod config;
pub mod detect;
pub mod error;
pub mod possession;
pub mod team;
pub mod track;

#[cfg(feature = "opencv")]
pub mod annotate;
#[cfg(feature = "opencv")]
pub mod video;

use std::path::Path;

use tracing::info;

pub use config::AnalysisConfig;
pub use detect::{ClassNames, DetectionReplay, Detector};
pub use error::Error;
pub use possession::{possession_shares, BallAssigner, Possession};
pub use team::{Color, Team, TeamAssigner};
pub use track::{BBox, Displacement, IouTracker, Ltrb, ObjectState, Position, TrackBuilder, TrackId, TrackStore};

#[cfg(feature = "opencv")]
pub use annotate::Annotator;

/// A decoded video frame: `(height, width, 3)` BGR pixels.
pub type Frame = ndarray::Array3<u8>;

/// Everything the pipeline derives from a video.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub tracks: TrackStore,
    pub possession: Possession,
    pub team_colors: Option<[Color; 2]>,
}

impl Analysis {
    /// Ball control shares over the whole video.
    #[inline]
    pub fn final_shares(&self) -> Option<(f32, f32)> {
        possession_shares(&self.possession, self.possession.len().saturating_sub(1))
    }
}

/// Detection, tracking and attribution over a whole video.
pub struct FootballAnalysis<D: Detector> {
    config: AnalysisConfig,
    detector: D,
}

impl<D: Detector> FootballAnalysis<D> {
    pub fn new(config: AnalysisConfig, detector: D) -> Self {
        Self { config, detector }
    }

    /// Tracks of every object in `frames`.
    ///
    /// With `read_from_stub` and an existing stub at `stub_path`, the stored
    /// tracks are reused after checking they cover exactly `frames`.
    /// Otherwise detection and tracking run and, given a `stub_path`, the
    /// result is written there.
    pub fn object_tracks(&mut self, frames: &[Frame], read_from_stub: bool, stub_path: Option<&Path>) -> Result<TrackStore, Error> {
        if read_from_stub {
            if let Some(path) = stub_path {
                if let Some(tracks) = track::stub::load(path)? {
                    tracks.ensure_frame_count(frames.len())?;
                    return Ok(tracks);
                }

                info!("No track stub at {}, running detection", path.display());
            }
        }

        let tracker = IouTracker::from_config(&self.config.tracking);
        let mut builder = TrackBuilder::from_config(&mut self.detector, tracker, &self.config.detection);
        let tracks = builder.build(frames)?;

        if let Some(path) = stub_path {
            track::stub::save(path, &tracks)?;
        }

        Ok(tracks)
    }

    /// Run every stage on `frames`. `camera_motion`, when given, holds one
    /// displacement per frame.
    pub fn run(&mut self, frames: &[Frame], camera_motion: Option<&[Displacement]>) -> Result<Analysis, Error> {
        if frames.is_empty() {
            return Err(Error::EmptyVideo);
        }

        let stub_path = self.config.stub.path.clone();
        let mut tracks = self.object_tracks(frames, self.config.stub.read, stub_path.as_deref())?;

        tracks.ball = track::interpolate_ball(&tracks.ball)?;
        track::position::add_positions(&mut tracks);

        if let Some(motion) = camera_motion {
            track::position::apply_camera_motion(&mut tracks, motion)?;
        }

        let mut teams = TeamAssigner::from_config(&self.config.team);
        teams.assign_teams(&mut tracks, frames)?;

        let possession = BallAssigner::from_config(&self.config.possession).assign_possession(&mut tracks)?;

        info!("Analysed {} frames", frames.len());

        Ok(Analysis {
            tracks,
            possession,
            team_colors: teams.team_colors(),
        })
    }
}

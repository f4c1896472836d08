use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::team::{Color, Team};
use crate::track::{BBox, Ltrb, Position};

pub type TrackId = u32;

/// The ball is a single object; it is always stored under this identity.
pub const BALL_ID: TrackId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Player,
    Referee,
    Ball,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Player, Category::Referee, Category::Ball];
}

/// State of one object in one frame. Fields past `bbox` are filled in by the
/// pipeline stages that own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub bbox: BBox<Ltrb>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub position_adjusted: Option<Position>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub team_color: Option<Color>,
    #[serde(default)]
    pub has_ball: bool,
}

impl ObjectState {
    pub fn new(bbox: BBox<Ltrb>) -> Self {
        Self {
            bbox,
            position: None,
            position_adjusted: None,
            team: None,
            team_color: None,
            has_ball: false,
        }
    }
}

/// Identity → state for one category in one frame.
pub type FrameTracks = BTreeMap<TrackId, ObjectState>;

/// Per-category, frame-indexed object states of one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackStore {
    pub players: Vec<FrameTracks>,
    pub referees: Vec<FrameTracks>,
    pub ball: Vec<FrameTracks>,
}

impl TrackStore {
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            players: Vec::with_capacity(frames),
            referees: Vec::with_capacity(frames),
            ball: Vec::with_capacity(frames),
        }
    }

    /// Open an empty slot for the next frame in every category.
    pub fn push_frame(&mut self) -> usize {
        self.players.push(FrameTracks::new());
        self.referees.push(FrameTracks::new());
        self.ball.push(FrameTracks::new());

        self.players.len() - 1
    }

    #[inline]
    pub fn frames(&self, category: Category) -> &[FrameTracks] {
        match category {
            Category::Player => &self.players,
            Category::Referee => &self.referees,
            Category::Ball => &self.ball,
        }
    }

    #[inline]
    pub fn frames_mut(&mut self, category: Category) -> &mut Vec<FrameTracks> {
        match category {
            Category::Player => &mut self.players,
            Category::Referee => &mut self.referees,
            Category::Ball => &mut self.ball,
        }
    }

    /// Number of frames, or an error when the categories disagree.
    pub fn frame_count(&self) -> Result<usize, Error> {
        let expected = self.players.len();

        for category in [Category::Referee, Category::Ball] {
            let found = self.frames(category).len();
            if found != expected {
                return Err(Error::FrameCountMismatch { expected, found });
            }
        }

        Ok(expected)
    }

    /// Fail loudly when a stored store does not line up with the video.
    pub fn ensure_frame_count(&self, expected: usize) -> Result<(), Error> {
        let found = self.frame_count()?;

        if found != expected {
            return Err(Error::StaleStub { expected, found });
        }

        Ok(())
    }

    /// The ball entry of a frame, if any.
    #[inline]
    pub fn ball_at(&self, frame_num: usize) -> Option<&ObjectState> {
        self.ball.get(frame_num).and_then(|frame| frame.get(&BALL_ID))
    }
}

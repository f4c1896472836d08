use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::track::{BBox, Category, Ltrb, TrackStore};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: &Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Per-frame camera displacement, as produced by a camera-motion estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    pub dx: f32,
    pub dy: f32,
}

/// Bottom-centre of the box, where a person touches the ground.
#[inline]
pub fn foot_position(bbox: &BBox<Ltrb>) -> Position {
    Position::new(bbox.center_x(), bbox.bottom())
}

#[inline]
pub fn center_position(bbox: &BBox<Ltrb>) -> Position {
    Position::new(bbox.center_x(), (bbox.top() + bbox.bottom()) / 2.0)
}

/// Fill `position` for every object: feet for people, centre for the ball.
pub fn add_positions(store: &mut TrackStore) {
    for category in Category::ALL {
        let project: fn(&BBox<Ltrb>) -> Position = match category {
            Category::Ball => center_position,
            Category::Player | Category::Referee => foot_position,
        };

        for frame in store.frames_mut(category).iter_mut() {
            for state in frame.values_mut() {
                state.position = Some(project(&state.bbox));
            }
        }
    }
}

/// Camera-compensated positions: `position + displacement[frame]`.
pub fn apply_camera_motion(store: &mut TrackStore, motion: &[Displacement]) -> Result<(), Error> {
    let expected = store.frame_count()?;
    if motion.len() != expected {
        return Err(Error::FrameCountMismatch { expected, found: motion.len() });
    }

    for category in Category::ALL {
        for (frame, shift) in store.frames_mut(category).iter_mut().zip(motion) {
            for state in frame.values_mut() {
                state.position_adjusted = state
                    .position
                    .map(|p| Position::new(p.x + shift.dx, p.y + shift.dy));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{ObjectState, BALL_ID};

    fn store() -> TrackStore {
        let mut store = TrackStore::default();
        store.push_frame();
        store.players[0].insert(7, ObjectState::new(BBox::ltrb(10.0, 20.0, 30.0, 80.0)));
        store.referees[0].insert(3, ObjectState::new(BBox::ltrb(0.0, 0.0, 4.0, 10.0)));
        store.ball[0].insert(BALL_ID, ObjectState::new(BBox::ltrb(100.0, 100.0, 110.0, 120.0)));
        store
    }

    #[test]
    fn people_stand_on_their_feet_and_the_ball_is_centred() {
        let mut store = store();
        add_positions(&mut store);

        assert_eq!(store.players[0][&7].position, Some(Position::new(20.0, 80.0)));
        assert_eq!(store.referees[0][&3].position, Some(Position::new(2.0, 10.0)));
        assert_eq!(store.ball[0][&BALL_ID].position, Some(Position::new(105.0, 110.0)));
        assert_eq!(store.players[0][&7].bbox, BBox::ltrb(10.0, 20.0, 30.0, 80.0));
    }

    #[test]
    fn camera_motion_is_added_per_frame() {
        let mut store = store();
        add_positions(&mut store);
        apply_camera_motion(&mut store, &[Displacement { dx: 1.5, dy: -2.0 }]).unwrap();

        assert_eq!(store.players[0][&7].position_adjusted, Some(Position::new(21.5, 78.0)));
        assert!(apply_camera_motion(&mut store, &[]).is_err());
    }
}

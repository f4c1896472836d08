use tracing::{debug, info};

use crate::config::PossessionConfig;
use crate::error::Error;
use crate::team::Team;
use crate::track::{FrameTracks, Position, TrackId, TrackStore};

/// Team in control of the ball, one entry per frame. `None` until somebody
/// first gets close enough to the ball.
pub type Possession = Vec<Option<Team>>;

#[derive(Debug, Clone)]
pub struct BallAssigner {
    /// Largest foot-to-ball distance, in pixels, that still counts as
    /// control. Inclusive: a player exactly this far away qualifies.
    pub max_player_ball_distance: f32,
}

impl Default for BallAssigner {
    fn default() -> Self {
        Self::from_config(&PossessionConfig::default())
    }
}

impl BallAssigner {
    pub fn new(max_player_ball_distance: f32) -> Self {
        Self { max_player_ball_distance }
    }

    pub fn from_config(config: &PossessionConfig) -> Self {
        Self::new(config.max_player_ball_distance)
    }

    /// Player closest to the ball, if within reach. Equal distances go to the
    /// lowest identity.
    pub fn assign_ball_to_player(&self, players: &FrameTracks, ball: Position) -> Option<TrackId> {
        let mut best: Option<(TrackId, f32)> = None;

        for (&track_id, state) in players {
            let position = match state.position {
                Some(position) => position,
                None => continue,
            };

            let distance = position.distance(&ball);
            if distance > self.max_player_ball_distance {
                continue;
            }

            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((track_id, distance)),
            }
        }

        best.map(|(track_id, _)| track_id)
    }

    /// Mark the ball holder of every frame and return the possession sequence.
    ///
    /// Frames without anybody in reach carry the previous entry over.
    pub fn assign_possession(&self, tracks: &mut TrackStore) -> Result<Possession, Error> {
        let frame_count = tracks.frame_count()?;
        let mut possession = Possession::with_capacity(frame_count);

        for frame_num in 0..frame_count {
            let previous = possession.last().copied().flatten();

            let ball = tracks.ball_at(frame_num).and_then(|ball| ball.position);
            let holder = ball.and_then(|ball| self.assign_ball_to_player(&tracks.players[frame_num], ball));

            let team = match holder.and_then(|id| tracks.players[frame_num].get_mut(&id)) {
                Some(state) => {
                    state.has_ball = true;
                    debug!(frame_num, track_id = ?holder, "ball assigned");
                    state.team.or(previous)
                }
                None => previous,
            };

            possession.push(team);
        }

        if let Some((one, two)) = possession_shares(&possession, frame_count.saturating_sub(1)) {
            info!(
                "Ball control over {} frames: team 1 {:.2}%, team 2 {:.2}%",
                frame_count,
                one * 100.0,
                two * 100.0
            );
        }

        Ok(possession)
    }
}

/// Cumulative ball control of both teams over frames `0..=upto`.
///
/// Only frames with a possession entry count, so the two shares sum to 1.
/// `None` while no frame has one.
pub fn possession_shares(possession: &Possession, upto: usize) -> Option<(f32, f32)> {
    let end = possession.len().min(upto.saturating_add(1));
    let (mut one, mut two) = (0usize, 0usize);

    for team in possession[..end].iter().flatten() {
        match team {
            Team::One => one += 1,
            Team::Two => two += 1,
        }
    }

    let total = one + two;
    if total == 0 {
        return None;
    }

    Some((one as f32 / total as f32, two as f32 / total as f32))
}

use std::collections::HashMap;

use ndarray::prelude::*;
use tracing::{debug, info};

use crate::config::TeamConfig;
use crate::error::Error;
use crate::team::{fit_two_clusters, Color, Team, TwoClusters};
use crate::track::{BBox, FrameTracks, Ltrb, TrackId, TrackStore};
use crate::Frame;

/// Splits players into two teams by shirt colour.
///
/// The colour model is fitted once, on the bootstrap frame. Every identity is
/// classified the first time it is seen and keeps that team for the rest of
/// the video, so occlusion or lighting changes cannot make a player flicker
/// between teams.
#[derive(Debug, Clone)]
pub struct TeamAssigner {
    bootstrap_frame: usize,
    max_iterations: usize,
    team_model: Option<TwoClusters>,
    team_colors: Option<[Color; 2]>,
    identity_to_team: HashMap<TrackId, Team>,
}

impl TeamAssigner {
    pub fn new(bootstrap_frame: usize, max_iterations: usize) -> Self {
        Self {
            bootstrap_frame,
            max_iterations,
            team_model: None,
            team_colors: None,
            identity_to_team: HashMap::new(),
        }
    }

    pub fn from_config(config: &TeamConfig) -> Self {
        Self::new(config.bootstrap_frame, config.max_iterations)
    }

    /// Colour of the given team's cluster centre, once fitted.
    #[inline]
    pub fn team_color(&self, team: Team) -> Option<Color> {
        self.team_colors.map(|colors| match team {
            Team::One => colors[0],
            Team::Two => colors[1],
        })
    }

    #[inline]
    pub fn team_colors(&self) -> Option<[Color; 2]> {
        self.team_colors
    }

    /// Shirt colour of the player inside `bbox`.
    ///
    /// Clusters the pixels of the top half of the box in two, takes the
    /// cluster owning most of the four corners as background and returns the
    /// centre of the other one.
    pub fn player_color(&self, frame: &Frame, bbox: &BBox<Ltrb>) -> Result<Color, Error> {
        let (height, width, channels) = frame.dim();
        if channels != 3 {
            return Err(Error::InvalidFrame(format!("expected 3 channels, got {}", channels)));
        }

        if !bbox.is_valid() {
            return Err(Error::EmptyCrop(bbox.coords()));
        }

        let clamp = |v: f32, max: usize| (v.max(0.0) as usize).min(max);
        let (x1, x2) = (clamp(bbox.left(), width), clamp(bbox.right(), width));
        let (y1, y2) = (clamp(bbox.top(), height), clamp(bbox.bottom(), height));

        let crop_w = x2.saturating_sub(x1);
        let top_h = y2.saturating_sub(y1) / 2;
        if crop_w == 0 || top_h == 0 {
            return Err(Error::EmptyCrop(bbox.coords()));
        }

        let top_half = frame.slice(s![y1..y1 + top_h, x1..x2, ..]);
        let pixels = Array2::from_shape_vec(
            (top_h * crop_w, 3),
            top_half.iter().map(|&v| f32::from(v)).collect(),
        )?;

        let clusters = fit_two_clusters(pixels.view(), self.max_iterations)?;
        let labels = clusters.labels();

        let corners = [
            labels[0],
            labels[crop_w - 1],
            labels[(top_h - 1) * crop_w],
            labels[top_h * crop_w - 1],
        ];
        let player_cluster = 1 - background_cluster(&corners);

        Ok(to_color(clusters.center(player_cluster)))
    }

    /// Fit the two team colours from every player visible in `frame`.
    pub fn assign_team_color(&mut self, frame: &Frame, players: &FrameTracks) -> Result<(), Error> {
        if players.len() < 2 {
            return Err(Error::NotEnoughPlayers(players.len()));
        }

        let mut colors = Array2::zeros((players.len(), 3));
        for (mut row, state) in colors.outer_iter_mut().zip(players.values()) {
            row.assign(&aview1(&self.player_color(frame, &state.bbox)?));
        }

        let clusters = fit_two_clusters(colors.view(), self.max_iterations)?;
        if !clusters.is_separated() {
            return Err(Error::DegenerateClusters);
        }

        let team_colors = [to_color(clusters.center(0)), to_color(clusters.center(1))];
        info!(
            "Team colors fitted from {} players: team 1 {:?}, team 2 {:?}",
            players.len(),
            team_colors[0],
            team_colors[1]
        );

        self.team_colors = Some(team_colors);
        self.team_model = Some(clusters);

        Ok(())
    }

    /// Team of player `track_id`. The first answer for an identity is final.
    pub fn player_team(&mut self, frame: &Frame, bbox: &BBox<Ltrb>, track_id: TrackId) -> Result<Team, Error> {
        if let Some(&team) = self.identity_to_team.get(&track_id) {
            return Ok(team);
        }

        let model = self.team_model.as_ref().ok_or(Error::TeamsNotAssigned)?;
        let color = self.player_color(frame, bbox)?;
        let team = Team::from_cluster(model.predict(aview1(&color)));

        debug!(track_id, team = team.id(), "player assigned to team");
        self.identity_to_team.insert(track_id, team);

        Ok(team)
    }

    /// Bootstrap the colour model, then tag every player of every frame with
    /// its team and team colour.
    pub fn assign_teams(&mut self, tracks: &mut TrackStore, frames: &[Frame]) -> Result<(), Error> {
        let expected = tracks.frame_count()?;
        if frames.len() != expected {
            return Err(Error::FrameCountMismatch { expected, found: frames.len() });
        }

        let bootstrap = self.bootstrap_frame;
        if bootstrap >= expected {
            return Err(Error::InvalidFrame(format!(
                "bootstrap frame {} is past the end of a {} frame video",
                bootstrap, expected
            )));
        }

        self.assign_team_color(&frames[bootstrap], &tracks.players[bootstrap])?;

        for (frame, players) in frames.iter().zip(tracks.players.iter_mut()) {
            for (&track_id, state) in players.iter_mut() {
                let team = self.player_team(frame, &state.bbox, track_id)?;
                state.team = Some(team);
                state.team_color = self.team_color(team);
            }
        }

        Ok(())
    }
}

/// Cluster holding the majority of the corner pixels; a 2-2 split goes to
/// cluster 0.
fn background_cluster(corners: &[usize; 4]) -> usize {
    let ones = corners.iter().filter(|&&c| c == 1).count();

    if ones > corners.len() - ones {
        1
    } else {
        0
    }
}

#[inline]
fn to_color(center: ArrayView1<'_, f32>) -> Color {
    [center[0], center[1], center[2]]
}

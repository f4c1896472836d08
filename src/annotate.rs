use opencv::core::{self, Mat, Point, Rect, Scalar, Size, Vector};
use opencv::imgproc;
use opencv::prelude::*;
use tracing::debug;

use crate::config::RenderConfig;
use crate::error::Error;
use crate::possession::{possession_shares, Possession};
use crate::team::Color;
use crate::track::{BBox, Ltrb, TrackId, TrackStore};
use crate::video::{frame_to_mat, mat_to_frame};
use crate::Frame;

const PLAYER_DEFAULT: (f64, f64, f64) = (0.0, 0.0, 255.0);
const REFEREE: (f64, f64, f64) = (0.0, 255.0, 255.0);
const BALL: (f64, f64, f64) = (0.0, 255.0, 0.0);
const HOLDER: (f64, f64, f64) = (0.0, 0.0, 255.0);
const BLACK: (f64, f64, f64) = (0.0, 0.0, 0.0);
const WHITE: (f64, f64, f64) = (255.0, 255.0, 255.0);

const LABEL_WIDTH: i32 = 40;
const LABEL_HEIGHT: i32 = 20;

#[inline]
fn scalar(c: (f64, f64, f64)) -> Scalar {
    Scalar::new(c.0, c.1, c.2, 0.0)
}

#[inline]
fn team_scalar(color: Color) -> Scalar {
    Scalar::new(f64::from(color[0]), f64::from(color[1]), f64::from(color[2]), 0.0)
}

/// Box under a player's feet holding its identity.
fn label_rect(bbox: &BBox<Ltrb>) -> Rect {
    let x_center = bbox.center_x() as i32;
    let y2 = bbox.bottom() as i32;

    Rect::new(x_center - LABEL_WIDTH / 2, y2 + 5, LABEL_WIDTH, LABEL_HEIGHT)
}

/// Text origin inside the label; three-digit ids shift left to stay centred.
fn label_origin(label: &Rect, track_id: TrackId) -> Point {
    let mut x = label.x + 12;
    if track_id > 99 {
        x -= 10;
    }

    Point::new(x, label.y + 15)
}

/// Marker above the box: tip on the top edge, base 20px higher.
fn triangle(bbox: &BBox<Ltrb>) -> [Point; 3] {
    let x = bbox.center_x() as i32;
    let y = bbox.top() as i32;

    [Point::new(x, y), Point::new(x - 10, y - 20), Point::new(x + 10, y - 20)]
}

/// Draws identities, teams and ball control onto copies of the frames.
#[derive(Debug, Clone)]
pub struct Annotator {
    panel_alpha: f64,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl Annotator {
    pub fn new(panel_alpha: f64) -> Self {
        Self { panel_alpha }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.panel_alpha)
    }

    pub fn annotate(&self, frames: &[Frame], tracks: &TrackStore, possession: &Possession) -> Result<Vec<Frame>, Error> {
        let expected = tracks.frame_count()?;
        for found in [frames.len(), possession.len()] {
            if found != expected {
                return Err(Error::FrameCountMismatch { expected, found });
            }
        }

        let annotated = frames
            .iter()
            .enumerate()
            .map(|(frame_num, frame)| self.annotate_frame(frame_num, frame, tracks, possession))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(frames = annotated.len(), "frames annotated");

        Ok(annotated)
    }

    fn annotate_frame(
        &self,
        frame_num: usize,
        frame: &Frame,
        tracks: &TrackStore,
        possession: &Possession,
    ) -> Result<Frame, Error> {
        let mut canvas = frame_to_mat(frame)?;

        for (&track_id, player) in &tracks.players[frame_num] {
            let color = player.team_color.map(team_scalar).unwrap_or_else(|| scalar(PLAYER_DEFAULT));
            self.draw_ellipse(&mut canvas, &player.bbox, color, Some(track_id))?;

            if player.has_ball {
                self.draw_triangle(&mut canvas, &player.bbox, scalar(HOLDER))?;
            }
        }

        for (&track_id, referee) in &tracks.referees[frame_num] {
            self.draw_ellipse(&mut canvas, &referee.bbox, scalar(REFEREE), Some(track_id))?;
        }

        for ball in tracks.ball[frame_num].values() {
            self.draw_triangle(&mut canvas, &ball.bbox, scalar(BALL))?;
        }

        self.draw_ball_control(&mut canvas, frame_num, possession)?;

        mat_to_frame(&canvas)
    }

    fn draw_ellipse(&self, canvas: &mut Mat, bbox: &BBox<Ltrb>, color: Scalar, track_id: Option<TrackId>) -> Result<(), Error> {
        let width = bbox.width() as i32;
        let center = Point::new(bbox.center_x() as i32, bbox.bottom() as i32);

        imgproc::ellipse(
            canvas,
            center,
            Size::new(width, (0.35 * width as f32) as i32),
            0.0,
            -45.0,
            235.0,
            color,
            2,
            imgproc::LINE_4,
            0,
        )?;

        if let Some(track_id) = track_id {
            let label = label_rect(bbox);
            imgproc::rectangle(canvas, label, color, imgproc::FILLED, imgproc::LINE_8, 0)?;

            imgproc::put_text(
                canvas,
                &track_id.to_string(),
                label_origin(&label, track_id),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.6,
                scalar(BLACK),
                2,
                imgproc::LINE_8,
                false,
            )?;
        }

        Ok(())
    }

    fn draw_triangle(&self, canvas: &mut Mat, bbox: &BBox<Ltrb>, color: Scalar) -> Result<(), Error> {
        let mut contour = Vector::<Vector<Point>>::new();
        contour.push(Vector::from_iter(triangle(bbox)));

        imgproc::fill_poly(canvas, &contour, color, imgproc::LINE_8, 0, Point::new(0, 0))?;
        imgproc::polylines(canvas, &contour, true, scalar(BLACK), 2, imgproc::LINE_8, 0)?;

        Ok(())
    }

    /// Translucent panel in the bottom-right corner with each team's share of
    /// ball control up to this frame.
    fn draw_ball_control(&self, canvas: &mut Mat, frame_num: usize, possession: &Possession) -> Result<(), Error> {
        let (width, height) = (canvas.cols(), canvas.rows());

        let mut overlay = canvas.try_clone()?;
        imgproc::rectangle(
            &mut overlay,
            Rect::new(width - 570, height - 230, 550, 120),
            scalar(WHITE),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )?;

        let mut blended = Mat::default();
        core::add_weighted(&overlay, self.panel_alpha, &*canvas, 1.0 - self.panel_alpha, 0.0, &mut blended, -1)?;
        blended.copy_to(canvas)?;

        let (team_1, team_2) = match possession_shares(possession, frame_num) {
            Some(shares) => shares,
            None => return Ok(()),
        };

        for (row, (team, share)) in [(1, team_1), (2, team_2)].iter().enumerate() {
            imgproc::put_text(
                canvas,
                &format!("Team {} Ball Control: {:.2}%", team, share * 100.0),
                Point::new(width - 520, height - 180 + 50 * row as i32),
                imgproc::FONT_HERSHEY_SIMPLEX,
                1.0,
                scalar(BLACK),
                3,
                imgproc::LINE_8,
                false,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Team;
    use crate::track::{ObjectState, BALL_ID};
    use ndarray::s;

    fn scene() -> (Vec<Frame>, TrackStore, Possession) {
        let frames: Vec<Frame> = (0..2).map(|_| Frame::from_elem((480, 1280, 3), 90)).collect();

        let mut tracks = TrackStore::default();
        for frame_num in 0..2 {
            tracks.push_frame();

            let mut player = ObjectState::new(BBox::ltrb(100.0, 60.0, 130.0, 140.0));
            player.team = Some(Team::One);
            player.team_color = Some([200.0, 40.0, 30.0]);
            player.has_ball = frame_num == 1;
            tracks.players[frame_num].insert(123, player);

            tracks.referees[frame_num].insert(7, ObjectState::new(BBox::ltrb(300.0, 60.0, 325.0, 140.0)));
            tracks.ball[frame_num].insert(BALL_ID, ObjectState::new(BBox::ltrb(120.0, 130.0, 128.0, 138.0)));
        }

        (frames, tracks, vec![None, Some(Team::One)])
    }

    #[test]
    fn inputs_are_left_untouched() {
        let (frames, tracks, possession) = scene();
        let (frames_before, tracks_before, possession_before) = (frames.clone(), tracks.clone(), possession.clone());

        let annotated = Annotator::default().annotate(&frames, &tracks, &possession).unwrap();

        assert_eq!(frames, frames_before);
        assert_eq!(tracks, tracks_before);
        assert_eq!(possession, possession_before);

        assert_eq!(annotated.len(), 2);
        assert_eq!(annotated[0].dim(), frames[0].dim());
        assert_ne!(annotated[0], frames[0]);
    }

    fn pixel(frame: &Frame, y: usize, x: usize) -> [u8; 3] {
        [frame[[y, x, 0]], frame[[y, x, 1]], frame[[y, x, 2]]]
    }

    #[test]
    fn referees_get_an_id_label() {
        let (frames, tracks, possession) = scene();
        let annotated = Annotator::default().annotate(&frames, &tracks, &possession).unwrap();

        // label box spans x 292..332, y 145..165 under the referee; its left
        // edge is clear of the text
        for frame in &annotated {
            assert_eq!(pixel(frame, 162, 295), [0, 255, 255]);
        }
    }

    #[test]
    fn holder_marker_follows_has_ball() {
        let (frames, tracks, possession) = scene();
        let annotated = Annotator::default().annotate(&frames, &tracks, &possession).unwrap();

        // inside the triangle above the player box (tip at 115, 60)
        assert_eq!(pixel(&annotated[0], 48, 115), [90, 90, 90]);
        assert_eq!(pixel(&annotated[1], 48, 115), [0, 0, 255]);
    }

    #[test]
    fn panel_text_waits_for_the_first_possession() {
        let (frames, tracks, possession) = scene();
        let annotated = Annotator::default().annotate(&frames, &tracks, &possession).unwrap();

        // panel covers x 710..1260, y 250..370 of a 1280x480 frame
        let panel = |frame: &Frame| frame.slice(s![260..360, 720..1250, ..]).to_owned();

        assert!(panel(&annotated[0]).iter().all(|&v| v == 156));
        assert!(panel(&annotated[1]).iter().any(|&v| v < 100));
    }

    #[test]
    fn misaligned_inputs_are_rejected() {
        let (frames, tracks, possession) = scene();
        let annotator = Annotator::default();

        assert!(annotator.annotate(&frames[..1], &tracks, &possession).is_err());
        assert!(annotator.annotate(&frames, &tracks, &possession[..1].to_vec()).is_err());
    }

    #[test]
    fn three_digit_labels_shift_left() {
        let bbox = BBox::ltrb(100.0, 60.0, 130.0, 140.0);
        let label = label_rect(&bbox);

        assert_eq!(label, Rect::new(95, 145, 40, 20));
        assert_eq!(label_origin(&label, 42), Point::new(107, 160));
        assert_eq!(label_origin(&label, 123), Point::new(97, 160));
        assert_eq!(triangle(&bbox)[1], Point::new(105, 40));
    }
}

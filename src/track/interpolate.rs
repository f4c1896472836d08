use ndarray::prelude::*;
use tracing::debug;

use crate::error::Error;
use crate::track::{BBox, FrameTracks, ObjectState, BALL_ID};

/// Fill every frame the ball was not detected in.
///
/// Each of the four box coordinates is treated as an independent series with
/// gaps. Interior gaps are interpolated linearly between the nearest known
/// samples, leading gaps take the first known sample and trailing gaps keep
/// the last one. Detected frames are returned untouched.
pub fn interpolate_ball(ball: &[FrameTracks]) -> Result<Vec<FrameTracks>, Error> {
    if ball.is_empty() {
        return Ok(Vec::new());
    }

    let mut samples = Array2::from_elem((ball.len(), 4), f32::NAN);
    for (frame_num, frame) in ball.iter().enumerate() {
        if let Some(state) = frame.get(&BALL_ID) {
            samples.row_mut(frame_num).assign(&state.bbox.as_view());
        }
    }

    for column in samples.columns_mut() {
        fill_gaps(column)?;
    }

    let mut synthesized = 0;
    let filled = ball
        .iter()
        .zip(samples.rows())
        .map(|(frame, row)| {
            let state = match frame.get(&BALL_ID) {
                Some(state) => state.clone(),
                None => {
                    synthesized += 1;
                    ObjectState::new(BBox::ltrb(row[0], row[1], row[2], row[3]))
                }
            };

            let mut out = FrameTracks::new();
            out.insert(BALL_ID, state);
            out
        })
        .collect();

    debug!(frames = ball.len(), synthesized, "ball track interpolated");

    Ok(filled)
}

fn fill_gaps(mut series: ArrayViewMut1<'_, f32>) -> Result<(), Error> {
    let known: Vec<usize> = series
        .indexed_iter()
        .filter(|(_, v)| !v.is_nan())
        .map(|(idx, _)| idx)
        .collect();

    let (first, last) = match (known.first(), known.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(Error::NoBallDetections),
    };

    for pair in known.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (from, to) = (series[a], series[b]);
        let span = (b - a) as f32;

        for idx in a + 1..b {
            series[idx] = from + (to - from) * ((idx - a) as f32 / span);
        }
    }

    let head = series[first];
    series.slice_mut(s![..first]).fill(head);

    let tail = series[last];
    series.slice_mut(s![last + 1..]).fill(tail);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn track(boxes: &[Option<[f32; 4]>]) -> Vec<FrameTracks> {
        boxes
            .iter()
            .map(|bbox| {
                let mut frame = FrameTracks::new();
                if let Some(bbox) = bbox {
                    frame.insert(BALL_ID, ObjectState::new(BBox::from(*bbox)));
                }
                frame
            })
            .collect()
    }

    fn x1(frames: &[FrameTracks], frame_num: usize) -> f32 {
        frames[frame_num][&BALL_ID].bbox.left()
    }

    #[test]
    fn gap_is_stepped_linearly() {
        let input = track(&[
            None,
            None,
            Some([10.0, 10.0, 20.0, 20.0]),
            None,
            None,
            None,
            Some([50.0, 10.0, 60.0, 20.0]),
            None,
        ]);

        let out = interpolate_ball(&input).unwrap();

        assert_eq!(out.len(), input.len());
        assert!((x1(&out, 3) - 20.0).abs() < 1e-4);
        assert!((x1(&out, 4) - 30.0).abs() < 1e-4);
        assert!((x1(&out, 5) - 40.0).abs() < 1e-4);
        assert_eq!(out[4][&BALL_ID].bbox.coords(), [30.0, 10.0, 40.0, 20.0]);

        // leading frames copy the first sighting, trailing ones the last
        assert_eq!(out[0][&BALL_ID].bbox.coords(), [10.0, 10.0, 20.0, 20.0]);
        assert_eq!(out[1][&BALL_ID].bbox.coords(), [10.0, 10.0, 20.0, 20.0]);
        assert_eq!(out[7][&BALL_ID].bbox.coords(), [50.0, 10.0, 60.0, 20.0]);
    }

    #[test]
    fn detected_frames_keep_their_state() {
        let mut input = track(&[Some([0.0, 0.0, 2.0, 2.0]), None]);
        input[0].get_mut(&BALL_ID).unwrap().has_ball = true;

        let out = interpolate_ball(&input).unwrap();

        assert!(out[0][&BALL_ID].has_ball);
        assert!(!out[1][&BALL_ID].has_ball);
    }

    #[test]
    fn never_seen_ball_is_an_error() {
        match interpolate_ball(&track(&[None, None])) {
            Err(Error::NoBallDetections) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(interpolate_ball(&[]).unwrap().is_empty());
    }

    fn ball_track() -> impl Strategy<Value = Vec<Option<[f32; 4]>>> {
        let bbox = (0.0f32..1000.0, 0.0f32..1000.0, 1.0f32..50.0, 1.0f32..50.0)
            .prop_map(|(x, y, w, h)| [x, y, x + w, y + h]);

        prop::collection::vec(prop::option::of(bbox), 1..60)
            .prop_filter("ball seen at least once", |v| v.iter().any(Option::is_some))
    }

    proptest! {
        #[test]
        fn every_frame_gets_a_ball(boxes in ball_track()) {
            let out = interpolate_ball(&track(&boxes)).unwrap();

            prop_assert_eq!(out.len(), boxes.len());
            for frame in &out {
                prop_assert_eq!(frame.len(), 1);
                prop_assert!(frame[&BALL_ID].bbox.coords().iter().all(|v| v.is_finite()));
            }
        }

        #[test]
        fn interior_gaps_stay_between_neighbours(boxes in ball_track()) {
            let out = interpolate_ball(&track(&boxes)).unwrap();
            let known: Vec<usize> = (0..boxes.len()).filter(|&i| boxes[i].is_some()).collect();

            for pair in known.windows(2) {
                let (a, b) = (boxes[pair[0]].unwrap(), boxes[pair[1]].unwrap());

                for frame_num in pair[0] + 1..pair[1] {
                    let filled = out[frame_num][&BALL_ID].bbox.coords();
                    for c in 0..4 {
                        let (lo, hi) = (a[c].min(b[c]), a[c].max(b[c]));
                        prop_assert!(filled[c] >= lo - 1e-3 && filled[c] <= hi + 1e-3);
                    }
                }
            }
        }
    }
}

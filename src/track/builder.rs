use tracing::{debug, info, warn};

use crate::config::DetectionConfig;
use crate::detect::{ClassNames, Detector};
use crate::error::Error;
use crate::track::{Detection, FrameTracks, ObjectState, ObjectTracker, TrackStore, BALL_ID};
use crate::Frame;

/// Class ids the store cares about, resolved once from the detector's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Vocabulary {
    player: usize,
    referee: usize,
    ball: usize,
    goalkeeper: Option<usize>,
}

impl Vocabulary {
    fn resolve(names: &ClassNames) -> Result<Self, Error> {
        Ok(Self {
            player: names.require("player")?,
            referee: names.require("referee")?,
            ball: names.require("ball")?,
            goalkeeper: names.id("goalkeeper"),
        })
    }
}

/// Runs detection in batches and feeds it through a tracker to fill a
/// `TrackStore`.
pub struct TrackBuilder<D, T> {
    detector: D,
    tracker: T,
    batch_size: usize,
}

impl<D: Detector, T: ObjectTracker> TrackBuilder<D, T> {
    pub fn new(detector: D, tracker: T, batch_size: usize) -> Self {
        Self {
            detector,
            tracker,
            batch_size: batch_size.max(1),
        }
    }

    pub fn from_config(detector: D, tracker: T, config: &DetectionConfig) -> Self {
        Self::new(detector, tracker, config.batch_size)
    }

    pub fn build(&mut self, frames: &[Frame]) -> Result<TrackStore, Error> {
        let vocabulary = Vocabulary::resolve(self.detector.class_names())?;
        let mut store = TrackStore::with_capacity(frames.len());

        for (batch_idx, batch) in frames.chunks(self.batch_size).enumerate() {
            let detections = self.detector.detect(batch)?;
            if detections.len() != batch.len() {
                return Err(Error::DetectorMismatch {
                    expected: batch.len(),
                    found: detections.len(),
                });
            }

            debug!(batch = batch_idx, frames = batch.len(), "detection batch");

            for frame_detections in detections {
                self.push_frame(&mut store, &vocabulary, frame_detections);
            }
        }

        info!(
            "Tracked {} frames: {} player and {} referee identities",
            frames.len(),
            identities(&store.players),
            identities(&store.referees)
        );

        Ok(store)
    }

    fn push_frame(&mut self, store: &mut TrackStore, vocabulary: &Vocabulary, detections: Vec<Detection>) {
        let frame_num = store.push_frame();

        let mut ball: Option<Detection> = None;
        let mut ball_count = 0;
        let mut people = Vec::with_capacity(detections.len());

        for mut detection in detections {
            if Some(detection.class_id) == vocabulary.goalkeeper {
                detection.class_id = vocabulary.player;
            }

            if detection.class_id == vocabulary.ball {
                ball_count += 1;
                if ball.as_ref().map_or(true, |b| detection.confidence > b.confidence) {
                    ball = Some(detection);
                }
            } else if detection.class_id == vocabulary.player || detection.class_id == vocabulary.referee {
                people.push(detection);
            }
        }

        if ball_count > 1 {
            warn!(frame_num, ball_count, "several balls detected, keeping the most confident");
        }

        for tracked in self.tracker.update(&people) {
            let frames = if tracked.class_id == vocabulary.player {
                &mut store.players
            } else {
                &mut store.referees
            };

            frames[frame_num].insert(tracked.track_id, ObjectState::new(tracked.bbox));
        }

        if let Some(ball) = ball {
            store.ball[frame_num].insert(BALL_ID, ObjectState::new(ball.bbox));
        }
    }
}

fn identities(frames: &[FrameTracks]) -> usize {
    let mut ids: Vec<_> = frames.iter().flat_map(|f| f.keys().copied()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DetectionReplay;
    use crate::track::{BBox, IouTracker};

    const BALL: usize = 0;
    const GOALKEEPER: usize = 1;
    const PLAYER: usize = 2;
    const REFEREE: usize = 3;

    fn names() -> ClassNames {
        vec![(BALL, "ball"), (GOALKEEPER, "goalkeeper"), (PLAYER, "player"), (REFEREE, "referee")]
            .into_iter()
            .collect()
    }

    fn det(class_id: usize, confidence: f32, x: f32) -> Detection {
        Detection {
            class_id,
            confidence,
            bbox: BBox::ltrb(x, 50.0, x + 20.0, 110.0),
        }
    }

    fn frames(n: usize) -> Vec<Frame> {
        (0..n).map(|_| Frame::zeros((8, 8, 3))).collect()
    }

    /// Counts the batches it was asked for.
    struct Counting {
        inner: DetectionReplay,
        batches: Vec<usize>,
    }

    impl Detector for Counting {
        fn class_names(&self) -> &ClassNames {
            self.inner.class_names()
        }

        fn detect(&mut self, frames: &[Frame]) -> Result<Vec<Vec<Detection>>, Error> {
            self.batches.push(frames.len());
            self.inner.detect(frames)
        }
    }

    #[test]
    fn builds_one_entry_per_frame_and_category() {
        let recorded: Vec<Vec<Detection>> = (0..45)
            .map(|i| {
                let x = i as f32;
                vec![
                    det(PLAYER, 0.9, 100.0 + x),
                    det(GOALKEEPER, 0.8, 400.0 - x),
                    det(REFEREE, 0.7, 700.0),
                    det(BALL, 0.3, 250.0),
                    det(BALL, 0.6, 260.0 + x),
                ]
            })
            .collect();

        let detector = Counting {
            inner: DetectionReplay::new(names(), recorded, 0.1),
            batches: Vec::new(),
        };
        let mut builder = TrackBuilder::new(detector, IouTracker::new(0.7, 30, 1), 20);

        let store = builder.build(&frames(45)).unwrap();

        assert_eq!(builder.detector.batches, vec![20, 20, 5]);
        assert_eq!(store.frame_count().unwrap(), 45);

        for frame_num in 0..45 {
            assert_eq!(store.players[frame_num].len(), 2, "goalkeeper counts as player");
            assert_eq!(store.referees[frame_num].len(), 1);

            let ball = store.ball_at(frame_num).unwrap();
            assert_eq!(ball.bbox.left(), 260.0 + frame_num as f32);
        }

        // identities are stable across batches
        assert_eq!(store.players[0].keys().collect::<Vec<_>>(), store.players[44].keys().collect::<Vec<_>>());
        assert_eq!(identities(&store.players), 2);
    }

    #[test]
    fn missing_vocabulary_class_is_fatal() {
        let names: ClassNames = vec![(0, "player"), (1, "ball")].into_iter().collect();
        let replay = DetectionReplay::new(names, vec![vec![]], 0.1);
        let mut builder = TrackBuilder::new(replay, IouTracker::new(0.7, 30, 1), 20);

        match builder.build(&frames(1)) {
            Err(Error::MissingClass(label)) => assert_eq!(label, "referee"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn short_recording_is_a_mismatch() {
        let replay = DetectionReplay::new(names(), vec![vec![]; 3], 0.1);
        let mut builder = TrackBuilder::new(replay, IouTracker::new(0.7, 30, 1), 2);

        match builder.build(&frames(4)) {
            Err(Error::DetectorMismatch { expected: 2, found: 1 }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}

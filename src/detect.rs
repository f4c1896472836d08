use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Error;
use crate::track::Detection;
use crate::Frame;

/// Detector vocabulary: class id → label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassNames(HashMap<usize, String>);

impl ClassNames {
    #[inline]
    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.0.get(&class_id).map(String::as_str)
    }

    /// Class id of `label`; the lowest one if the label is listed twice.
    pub fn id(&self, label: &str) -> Option<usize> {
        self.0
            .iter()
            .filter(|(_, name)| name.as_str() == label)
            .map(|(&id, _)| id)
            .min()
    }

    /// Like `id`, but a missing label is fatal.
    pub fn require(&self, label: &str) -> Result<usize, Error> {
        self.id(label).ok_or_else(|| Error::MissingClass(label.to_string()))
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for ClassNames {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, name)| (id, name.into())).collect())
    }
}

/// Object detector over batches of frames.
pub trait Detector {
    fn class_names(&self) -> &ClassNames;

    /// Detections of every frame of `frames`, in order.
    fn detect(&mut self, frames: &[Frame]) -> Result<Vec<Vec<Detection>>, Error>;
}

impl<D: Detector + ?Sized> Detector for &mut D {
    #[inline]
    fn class_names(&self) -> &ClassNames {
        (**self).class_names()
    }

    #[inline]
    fn detect(&mut self, frames: &[Frame]) -> Result<Vec<Vec<Detection>>, Error> {
        (**self).detect(frames)
    }
}

#[derive(Debug, Deserialize)]
struct Recording {
    names: ClassNames,
    frames: Vec<Vec<Detection>>,
}

/// Replays detections recorded by an external detector run.
///
/// The JSON layout is
/// `{"names": {"0": "ball", ...}, "frames": [[{"class_id": 0, "confidence": 0.9, "bbox": [x1, y1, x2, y2]}]]}`.
#[derive(Debug, Clone)]
pub struct DetectionReplay {
    names: ClassNames,
    frames: Vec<Vec<Detection>>,
    cursor: usize,
}

impl DetectionReplay {
    pub fn new(names: ClassNames, frames: Vec<Vec<Detection>>, min_confidence: f32) -> Self {
        let frames = frames
            .into_iter()
            .map(|frame| {
                frame
                    .into_iter()
                    .filter(|det| det.confidence >= min_confidence)
                    .collect()
            })
            .collect();

        Self {
            names,
            frames,
            cursor: 0,
        }
    }

    pub fn from_file(path: impl AsRef<Path>, min_confidence: f32) -> Result<Self, Error> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let recording: Recording = serde_json::from_reader(reader)?;

        info!(
            "Loaded {} recorded frames ({} classes) from {}",
            recording.frames.len(),
            recording.names.0.len(),
            path.display()
        );

        Ok(Self::new(recording.names, recording.frames, min_confidence))
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }
}

impl Detector for DetectionReplay {
    fn class_names(&self) -> &ClassNames {
        &self.names
    }

    fn detect(&mut self, frames: &[Frame]) -> Result<Vec<Vec<Detection>>, Error> {
        if frames.len() > self.remaining() {
            return Err(Error::DetectorMismatch {
                expected: frames.len(),
                found: self.remaining(),
            });
        }

        let batch = self.frames[self.cursor..self.cursor + frames.len()].to_vec();
        self.cursor += frames.len();

        debug!(frames = batch.len(), cursor = self.cursor, "replayed detection batch");

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::BBox;

    const RECORDING: &str = r#"{
        "names": {"0": "ball", "1": "goalkeeper", "2": "player", "3": "referee"},
        "frames": [
            [{"class_id": 2, "confidence": 0.91, "bbox": [10.0, 20.0, 30.0, 80.0]},
             {"class_id": 0, "confidence": 0.05, "bbox": [50.0, 50.0, 54.0, 54.0]}],
            [],
            [{"class_id": 3, "confidence": 0.7, "bbox": [100.0, 20.0, 120.0, 80.0]}]
        ]
    }"#;

    fn frames(n: usize) -> Vec<Frame> {
        (0..n).map(|_| Frame::zeros((4, 4, 3))).collect()
    }

    #[test]
    fn replays_recorded_batches_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.json");
        std::fs::write(&path, RECORDING).unwrap();

        let mut replay = DetectionReplay::from_file(&path, 0.1).unwrap();
        assert_eq!(replay.class_names().require("referee").unwrap(), 3);
        assert_eq!(replay.class_names().name(1), Some("goalkeeper"));

        let first = replay.detect(&frames(2)).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].len(), 1, "low confidence ball is dropped");
        assert_eq!(first[0][0].bbox, BBox::ltrb(10.0, 20.0, 30.0, 80.0));
        assert!(first[1].is_empty());

        match replay.detect(&frames(2)) {
            Err(Error::DetectorMismatch { expected: 2, found: 1 }) => {}
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(replay.detect(&frames(1)).unwrap()[0][0].class_id, 3);
        assert_eq!(replay.remaining(), 0);
    }

    #[test]
    fn missing_label_is_fatal() {
        let names: ClassNames = vec![(0, "ball"), (1, "player")].into_iter().collect();

        assert_eq!(names.id("player"), Some(1));
        match names.require("referee") {
            Err(Error::MissingClass(label)) => assert_eq!(label, "referee"),
            other => panic!("unexpected {:?}", other),
        }
    }
}

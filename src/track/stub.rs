//! Track store snapshot on disk ("stub"), used to skip detection and
//! tracking on repeated runs over the same video.
//!
//! Format: LZ4 (size-prepended) + MessagePack(serde) of `StubFile`.

use std::fs;
use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Error;
use crate::track::TrackStore;

/// Bumped whenever `TrackStore` changes shape.
pub const STUB_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StubFile {
    schema_version: u32,
    frame_count: usize,
    tracks: TrackStore,
}

/// Read a stub. `Ok(None)` when there is no file at `path`; a present file is
/// either decoded whole or rejected.
pub fn load(path: &Path) -> Result<Option<TrackStore>, Error> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    let payload = decompress_size_prepended(&bytes)?;
    let stub: StubFile = rmp_serde::from_slice(&payload)?;

    if stub.schema_version != STUB_SCHEMA_VERSION {
        return Err(Error::StubVersion {
            expected: STUB_SCHEMA_VERSION,
            found: stub.schema_version,
        });
    }

    stub.tracks.ensure_frame_count(stub.frame_count)?;

    info!("Loaded track stub {} ({} frames)", path.display(), stub.frame_count);

    Ok(Some(stub.tracks))
}

pub fn save(path: &Path, tracks: &TrackStore) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let stub = StubFile {
        schema_version: STUB_SCHEMA_VERSION,
        frame_count: tracks.frame_count()?,
        tracks: tracks.clone(),
    };

    let payload = rmp_serde::to_vec_named(&stub)?;
    fs::write(path, compress_prepend_size(&payload))?;

    info!("Saved track stub {} ({} frames)", path.display(), stub.frame_count);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Team;
    use crate::track::{BBox, ObjectState, Position, BALL_ID};

    fn sample() -> TrackStore {
        let mut store = TrackStore::default();
        for frame_num in 0..4 {
            store.push_frame();

            let x = frame_num as f32 * 5.0;
            let mut player = ObjectState::new(BBox::ltrb(x, 10.0, x + 20.0, 60.0));
            player.team = Some(Team::Two);
            player.team_color = Some([12.0, 200.0, 30.5]);
            player.position = Some(Position::new(x + 10.0, 60.0));
            player.has_ball = frame_num % 2 == 0;

            store.players[frame_num].insert(4, player);
            store.referees[frame_num].insert(9, ObjectState::new(BBox::ltrb(0.0, 0.0, 8.0, 30.0)));
            if frame_num != 2 {
                store.ball[frame_num].insert(BALL_ID, ObjectState::new(BBox::ltrb(50.0, 50.0, 55.0, 55.0)));
            }
        }
        store
    }

    #[test]
    fn round_trip_reproduces_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stubs").join("track_stubs.bin");
        let store = sample();

        save(&path, &store).unwrap();
        let loaded = load(&path).unwrap().expect("stub written above");

        assert_eq!(loaded, store);
    }

    #[test]
    fn missing_file_is_absent_not_an_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load(&dir.path().join("nope.bin")).unwrap().is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.bin");
        std::fs::write(&path, compress_prepend_size(b"definitely not a stub")).unwrap();

        assert!(load(&path).is_err());
    }

    #[test]
    fn other_schema_versions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.bin");
        let stub = StubFile {
            schema_version: STUB_SCHEMA_VERSION + 1,
            frame_count: 4,
            tracks: sample(),
        };
        let payload = rmp_serde::to_vec_named(&stub).unwrap();
        std::fs::write(&path, compress_prepend_size(&payload)).unwrap();

        match load(&path) {
            Err(Error::StubVersion { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}

use err_derive::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "Detector vocabulary has no `{}` class", _0)]
    MissingClass(String),

    #[error(display = "Detector returned {} frames for a batch of {}", found, expected)]
    DetectorMismatch { expected: usize, found: usize },

    #[error(display = "Video has no frames")]
    EmptyVideo,

    #[error(display = "Frame count mismatch: expected {}, got {}", expected, found)]
    FrameCountMismatch { expected: usize, found: usize },

    #[error(display = "Stub holds {} frames but the video has {}", found, expected)]
    StaleStub { expected: usize, found: usize },

    #[error(display = "Stub schema version {} is not supported (expected {})", found, expected)]
    StubVersion { expected: u32, found: u32 },

    #[error(display = "Ball was never detected, nothing to interpolate")]
    NoBallDetections,

    #[error(display = "Bounding box {:?} does not cover any pixel of the frame", _0)]
    EmptyCrop([f32; 4]),

    #[error(display = "Need at least 2 players to fit team colors, got {}", _0)]
    NotEnoughPlayers(usize),

    #[error(display = "All player colors are identical, cannot separate two teams")]
    DegenerateClusters,

    #[error(display = "Team colors were not assigned yet")]
    TeamsNotAssigned,

    #[error(display = "Invalid frame: {}", _0)]
    InvalidFrame(String),

    #[error(display = "IO Error: {}", _0)]
    Io(std::io::Error),

    #[error(display = "Stub encode Error: {}", _0)]
    StubEncode(rmp_serde::encode::Error),

    #[error(display = "Stub decode Error: {}", _0)]
    StubDecode(rmp_serde::decode::Error),

    #[error(display = "Stub decompress Error: {}", _0)]
    StubDecompress(lz4_flex::block::DecompressError),

    #[error(display = "JSON Error: {}", _0)]
    Json(serde_json::Error),

    #[error(display = "Config Error: {}", _0)]
    Config(serde_yaml::Error),

    #[cfg(feature = "opencv")]
    #[error(display = "OpenCV Error: {}", _0)]
    OpenCv(opencv::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::StubEncode(err)
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::StubDecode(err)
    }
}

impl From<lz4_flex::block::DecompressError> for Error {
    fn from(err: lz4_flex::block::DecompressError) -> Self {
        Self::StubDecompress(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err)
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::InvalidFrame(err.to_string())
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for Error {
    fn from(err: opencv::Error) -> Self {
        Self::OpenCv(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

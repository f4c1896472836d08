use std::io;
use std::path::Path;

use ndarray::Array3;
use opencv::core::{self, Mat, Size};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoWriter};
use tracing::info;

use crate::error::Error;
use crate::Frame;

/// Decoded video: BGR frames plus the source frame rate.
#[derive(Debug, Clone)]
pub struct VideoFrames {
    pub frames: Vec<Frame>,
    pub fps: f64,
}

/// Copy a frame into a fresh 8-bit, 3-channel `Mat`.
pub fn frame_to_mat(frame: &Frame) -> Result<Mat, Error> {
    let (height, _, channels) = frame.dim();
    if channels != 3 {
        return Err(Error::InvalidFrame(format!("expected 3 channels, got {}", channels)));
    }

    let data: Vec<u8> = frame.iter().copied().collect();
    let mat = Mat::from_slice(&data)?;
    let mat = mat.reshape(3, height as i32)?;

    Ok(mat.try_clone()?)
}

pub fn mat_to_frame(mat: &Mat) -> Result<Frame, Error> {
    if mat.typ() != core::CV_8UC3 {
        return Err(Error::InvalidFrame(format!("unsupported Mat type {}", mat.typ())));
    }

    let (rows, cols) = (mat.rows() as usize, mat.cols() as usize);
    let data = if mat.is_continuous() {
        mat.data_bytes()?.to_vec()
    } else {
        mat.try_clone()?.data_bytes()?.to_vec()
    };

    Ok(Array3::from_shape_vec((rows, cols, 3), data)?)
}

pub fn read_video(path: impl AsRef<Path>) -> Result<VideoFrames, Error> {
    let path = path.as_ref();
    let mut cap = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;

    if !cap.is_opened()? {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("cannot open video {}", path.display()),
        )));
    }

    let fps = cap.get(videoio::CAP_PROP_FPS)?;
    let mut frames = Vec::new();
    let mut mat = Mat::default();

    while cap.read(&mut mat)? {
        if mat.empty() {
            break;
        }

        frames.push(mat_to_frame(&mat)?);
    }

    info!("Read {} frames @ {:.1} FPS from {}", frames.len(), fps, path.display());

    Ok(VideoFrames { frames, fps })
}

/// Encode `frames` as XVID. All frames must share the first frame's size.
pub fn save_video(frames: &[Frame], path: impl AsRef<Path>, fps: f64) -> Result<(), Error> {
    let path = path.as_ref();
    let (height, width, _) = frames.first().ok_or(Error::EmptyVideo)?.dim();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let fourcc = VideoWriter::fourcc('X', 'V', 'I', 'D')?;
    let mut writer = VideoWriter::new(
        &path.to_string_lossy(),
        fourcc,
        fps,
        Size::new(width as i32, height as i32),
        true,
    )?;

    if !writer.is_opened()? {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("cannot open video writer for {}", path.display()),
        )));
    }

    for frame in frames {
        if frame.dim() != (height, width, 3) {
            return Err(Error::InvalidFrame(format!(
                "frame is {:?}, video is {}x{}",
                frame.dim(),
                width,
                height
            )));
        }

        writer.write(&frame_to_mat(frame)?)?;
    }

    writer.release()?;

    info!("Saved {} frames @ {:.1} FPS to {}", frames.len(), fps, path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mat_keeps_pixel_layout() {
        let mut frame = Frame::zeros((4, 6, 3));
        frame[[1, 4, 0]] = 10;
        frame[[1, 4, 1]] = 20;
        frame[[1, 4, 2]] = 30;
        frame[[3, 0, 2]] = 255;

        let mat = frame_to_mat(&frame).unwrap();
        assert_eq!((mat.rows(), mat.cols(), mat.channels()), (4, 6, 3));

        let px = mat.at_2d::<core::Vec3b>(1, 4).unwrap();
        assert_eq!([px[0], px[1], px[2]], [10, 20, 30]);

        assert_eq!(mat_to_frame(&mat).unwrap(), frame);
    }

    #[test]
    fn nothing_to_save() {
        let dir = tempfile::tempdir().unwrap();

        match save_video(&[], dir.path().join("out.avi"), 24.0) {
            Err(Error::EmptyVideo) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}

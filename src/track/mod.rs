pub mod builder;
pub mod detection;
pub mod interpolate;
pub mod iou_matching;
pub mod linear_assignment;
pub mod position;
pub mod store;
pub mod stub;
pub mod track;
pub mod tracker;

pub use builder::TrackBuilder;
pub use detection::{Detection, TrackedDetection};
pub use interpolate::interpolate_ball;
pub use position::{Displacement, Position};
pub use store::{Category, FrameTracks, ObjectState, TrackId, TrackStore, BALL_ID};
pub use tracker::IouTracker;

use core::marker::PhantomData;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

pub trait BBoxFormat: std::fmt::Debug + Copy {}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// Axis-aligned box in pixel coordinates, tagged with its coordinate layout.
///
/// Serialized as a bare `[f32; 4]` in its own layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]", bound = "")]
pub struct BBox<F: BBoxFormat>([f32; 4], PhantomData<F>);

impl<F: BBoxFormat> BBox<F> {
    #[inline]
    pub fn as_view(&self) -> ArrayView1<'_, f32> {
        aview1(&self.0)
    }

    #[inline]
    pub fn coords(&self) -> [f32; 4] {
        self.0
    }
}

impl<F: BBoxFormat> From<[f32; 4]> for BBox<F> {
    #[inline]
    fn from(v: [f32; 4]) -> Self {
        BBox(v, PhantomData)
    }
}

impl<F: BBoxFormat> From<BBox<F>> for [f32; 4] {
    #[inline]
    fn from(v: BBox<F>) -> Self {
        v.0
    }
}

impl BBox<Ltwh> {
    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3]
    }

    #[inline]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }

    #[inline]
    pub fn ltwh(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], PhantomData)
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], PhantomData)
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.0[2] - self.0[0]
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.0[3] - self.0[1]
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.0[0] + self.0[2]) / 2.0
    }

    /// Finite coordinates with a positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|v| v.is_finite()) && self.width() > 0.0 && self.height() > 0.0
    }
}

impl<'a> From<&'a BBox<Ltwh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Ltwh>) -> Self {
        Self([
            v.0[0],
            v.0[1],
            v.0[2] + v.0[0],
            v.0[3] + v.0[1],
        ], PhantomData)
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        Self([
            v.0[0],
            v.0[1],
            v.0[2] - v.0[0],
            v.0[3] - v.0[1],
        ], PhantomData)
    }
}

/// Assigns persistent identities to per-frame detections.
pub trait ObjectTracker {
    /// Consume the detections of the next frame (in frame order) and return
    /// the ones that belong to a reportable track, tagged with its id.
    fn update(&mut self, detections: &[Detection]) -> Vec<TrackedDetection>;
}

#[test]
fn bbox_layout_conversions() {
    let ltrb = BBox::ltrb(10.0, 20.0, 30.0, 60.0);
    let ltwh = ltrb.as_ltwh();

    assert_eq!(ltwh.coords(), [10.0, 20.0, 20.0, 40.0]);
    assert_eq!(ltwh.as_ltrb(), ltrb);
    assert_eq!(ltrb.center_x(), 20.0);
    assert!(ltrb.is_valid());
    assert!(!BBox::ltrb(10.0, 20.0, 10.0, 60.0).is_valid());
}

#[test]
fn bbox_serializes_as_plain_array() {
    let bbox = BBox::ltrb(1.0, 2.0, 3.0, 4.0);
    let json = serde_json::to_string(&bbox).unwrap();

    assert_eq!(json, "[1.0,2.0,3.0,4.0]");
    assert_eq!(serde_json::from_str::<BBox<Ltrb>>(&json).unwrap(), bbox);
}

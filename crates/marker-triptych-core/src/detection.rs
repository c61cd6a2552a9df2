use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::raster::truncate_point;

/// One detected marker in input-frame pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    /// Dictionary symbol id. Not guaranteed unique within a frame.
    pub id: i32,
    /// Corners clockwise, starting at the marker's own top-left.
    pub corners: Vec<Point2<f32>>,
}

impl MarkerDetection {
    pub fn new(id: i32, corners: [Point2<f32>; 4]) -> Self {
        Self {
            id,
            corners: corners.to_vec(),
        }
    }

    pub fn from_corners(id: i32, corners: Vec<Point2<f32>>) -> Self {
        Self { id, corners }
    }

    /// Fewer than three corners cannot bound an area.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.corners.len() < 3
    }

    /// False when any corner coordinate is NaN or infinite.
    pub fn has_finite_corners(&self) -> bool {
        self.corners.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Corners truncated to integer pixels.
    pub fn pixel_corners(&self) -> Vec<[i32; 2]> {
        self.corners.iter().copied().map(truncate_point).collect()
    }

    pub fn center(&self) -> Option<Point2<f32>> {
        if self.corners.is_empty() {
            return None;
        }
        let n = self.corners.len() as f32;
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point2::new(sx / n, sy / n))
    }
}

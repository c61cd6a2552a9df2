//! Native marker detector: global threshold, dark blobs, quad fit, decode.

#[cfg(feature = "tracing")]
use tracing::instrument;

use marker_triptych_core::{
    ColorImage, GrayImageView, MarkerDetection, MarkerDetector, PreviewError,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::decode::{CellDecoder, DecodeConfig};
use crate::threshold::otsu_threshold_image;
use crate::{Dictionary, Matcher};

/// Frames spanning less than this are not thresholded.
const MIN_IMAGE_CONTRAST: u8 = 32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadDetectorParams {
    /// Shortest accepted bounding-box side of a blob.
    pub min_side_px: usize,
    /// Smallest accepted blob, in pixels.
    pub min_area_px: usize,
    /// Hamming tolerance; `None` uses the dictionary's correction capacity.
    pub max_hamming: Option<u8>,
    pub decode: DecodeConfig,
}

impl Default for QuadDetectorParams {
    fn default() -> Self {
        Self {
            min_side_px: 16,
            min_area_px: 200,
            max_hamming: None,
            decode: DecodeConfig::default(),
        }
    }
}

/// Marker detector for dark, axis-unrestricted square markers on a light
/// background.
///
/// Each 4-connected dark blob that does not touch the frame edge is fitted
/// with a quadrilateral and decoded. Blobs inside an accepted marker, such
/// as its own black bits, are skipped.
pub struct QuadDetector {
    params: QuadDetectorParams,
    matcher: Matcher,
    decoder: CellDecoder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BBox {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl BBox {
    fn contains(&self, other: &BBox) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }
}

struct Blob {
    pixels: Vec<(u32, u32)>,
    bbox: BBox,
}

impl QuadDetector {
    /// `None` when the dictionary cannot be decoded into 64-bit codes.
    pub fn new(dict: Dictionary, params: QuadDetectorParams) -> Option<Self> {
        let max_hamming = params.max_hamming.unwrap_or(dict.max_correction_bits);
        let matcher = Matcher::new(dict, max_hamming)?;
        let decoder = CellDecoder::new(params.decode.clone(), dict.marker_size)?;
        Some(Self {
            params,
            matcher,
            decoder,
        })
    }

    pub fn dictionary(&self) -> Dictionary {
        self.matcher.dictionary()
    }

    /// Detect markers in a grayscale frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, img), fields(width = img.width, height = img.height))
    )]
    pub fn detect_gray(&mut self, img: &GrayImageView<'_>) -> Vec<MarkerDetection> {
        let (Some(&lo), Some(&hi)) = (img.data.iter().min(), img.data.iter().max()) else {
            return Vec::new();
        };
        if hi - lo < MIN_IMAGE_CONTRAST {
            return Vec::new();
        }
        let t = otsu_threshold_image(img);
        let dark: Vec<bool> = img.data.iter().map(|&v| v <= t).collect();

        let mut blobs = dark_blobs(&dark, img.width, img.height, &self.params);
        blobs.sort_by(|a, b| b.pixels.len().cmp(&a.pixels.len()));

        let mut accepted: Vec<BBox> = Vec::new();
        let mut out = Vec::new();
        for blob in blobs {
            if accepted.iter().any(|b| b.contains(&blob.bbox)) {
                continue;
            }
            let Some(quad) = fit_quad(&blob.pixels) else {
                continue;
            };
            let Some(obs) = self.decoder.decode_quad(img, &quad) else {
                continue;
            };
            let Some(m) = self.matcher.match_code(obs.code) else {
                log::trace!("blob at {:?} decoded to unknown code {:#x}", blob.bbox, obs.code);
                continue;
            };

            let mut corners = quad;
            corners.rotate_left(m.rotation as usize);
            accepted.push(blob.bbox);
            out.push(MarkerDetection::new(m.id as i32, corners));
        }
        out
    }
}

impl MarkerDetector for QuadDetector {
    fn detect(&mut self, frame: &ColorImage) -> Result<Vec<MarkerDetection>, PreviewError> {
        let gray = frame.to_gray();
        Ok(self.detect_gray(&gray.view()))
    }
}

/// 4-connected dark components that stay clear of the frame edge.
fn dark_blobs(dark: &[bool], w: usize, h: usize, params: &QuadDetectorParams) -> Vec<Blob> {
    let mut seen = vec![false; dark.len()];
    let mut stack = Vec::new();
    let mut blobs = Vec::new();

    for start in 0..dark.len() {
        if !dark[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        stack.push(start);

        let mut pixels = Vec::new();
        let mut bbox = BBox {
            x0: usize::MAX,
            y0: usize::MAX,
            x1: 0,
            y1: 0,
        };
        let mut touches_edge = false;

        while let Some(i) = stack.pop() {
            let (x, y) = (i % w, i / w);
            pixels.push((x as u32, y as u32));
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
            touches_edge |= x == 0 || y == 0 || x + 1 == w || y + 1 == h;

            let mut visit = |j: usize| {
                if dark[j] && !seen[j] {
                    seen[j] = true;
                    stack.push(j);
                }
            };
            if x > 0 {
                visit(i - 1);
            }
            if x + 1 < w {
                visit(i + 1);
            }
            if y > 0 {
                visit(i - w);
            }
            if y + 1 < h {
                visit(i + w);
            }
        }

        let side = (bbox.x1 - bbox.x0 + 1).min(bbox.y1 - bbox.y0 + 1);
        if touches_edge || pixels.len() < params.min_area_px || side < params.min_side_px {
            continue;
        }
        blobs.push(Blob { pixels, bbox });
    }
    blobs
}

/// Quadrilateral through a blob's extreme pixels, clockwise in image
/// coordinates. Corners sit on the outer pixel boundary.
fn fit_quad(pixels: &[(u32, u32)]) -> Option<[Point2<f32>; 4]> {
    if pixels.len() < 4 {
        return None;
    }
    let pts: Vec<Point2<f32>> = pixels
        .iter()
        .map(|&(x, y)| Point2::new(x as f32 + 0.5, y as f32 + 0.5))
        .collect();
    let n = pts.len() as f32;
    let centroid = Point2::new(
        pts.iter().map(|p| p.x).sum::<f32>() / n,
        pts.iter().map(|p| p.y).sum::<f32>() / n,
    );

    let farthest_from = |from: Point2<f32>| {
        pts.iter()
            .copied()
            .fold((from, -1.0f32), |(best, d_best), p| {
                let d = (p - from).norm_squared();
                if d > d_best {
                    (p, d)
                } else {
                    (best, d_best)
                }
            })
            .0
    };
    let p0 = farthest_from(centroid);
    let p2 = farthest_from(p0);

    let diag = p2 - p0;
    let cross = |p: Point2<f32>| {
        let v = p - p0;
        diag.x * v.y - diag.y * v.x
    };
    let (mut p1, mut p3) = (p0, p0);
    let (mut c_max, mut c_min) = (0.0f32, 0.0f32);
    for &p in &pts {
        let c = cross(p);
        if c > c_max {
            c_max = c;
            p1 = p;
        }
        if c < c_min {
            c_min = c;
            p3 = p;
        }
    }
    if c_max <= 0.0 || c_min >= 0.0 {
        return None;
    }

    let mut quad = [p0, p1, p2, p3];
    if signed_area(&quad) < 0.0 {
        quad.swap(1, 3);
    }

    // pixel centers -> outer pixel corners
    Some(quad.map(|p| {
        Point2::new(
            p.x + 0.5 * (p.x - centroid.x).signum(),
            p.y + 0.5 * (p.y - centroid.y).signum(),
        )
    }))
}

fn signed_area(quad: &[Point2<f32>; 4]) -> f32 {
    (0..4)
        .map(|i| {
            let a = quad[i];
            let b = quad[(i + 1) % 4];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

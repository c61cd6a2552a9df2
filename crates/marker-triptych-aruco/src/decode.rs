//! Reading marker bits through a quad homography.

use marker_triptych_core::{homography_from_4pt, GrayImageView, Homography};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::threshold::otsu_threshold_from_samples;

/// Side of the canonical marker square the sample grid is laid out on.
const CANONICAL_SIDE: f32 = 60.0;
/// Threshold samples per cell side.
const THRESH_SUBDIV: usize = 3;
/// Cell samples spanning less than this are not a marker.
const MIN_CONTRAST: u8 = 16;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Black border width in cells.
    pub border_bits: usize,
    /// Fraction of the marker side ignored along each edge.
    pub inset_frac: f32,
    /// Minimum fraction of border cells that must read black.
    pub min_border_score: f32,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            border_bits: 1,
            inset_frac: 0.0,
            min_border_score: 0.85,
        }
    }
}

/// Bits read from one quad, in quad order (corner 0 is the sampling origin).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    /// Inner bits, row-major, black = 1.
    pub code: u64,
    pub border_score: f32,
}

/// Reusable sampler for `(bits + 2·border)²` cell grids.
pub struct CellDecoder {
    cfg: DecodeConfig,
    bits: usize,
    cells: usize,
    points: Vec<Point2<f32>>,
    threshold_points: Vec<Point2<f32>>,
    square: [Point2<f32>; 4],
    scratch_bits: Vec<u8>,
    scratch_thr: Vec<u8>,
}

impl CellDecoder {
    /// `None` for grids that do not fit a 64-bit code.
    pub fn new(cfg: DecodeConfig, bits: usize) -> Option<Self> {
        let cells = bits + 2 * cfg.border_bits;
        if bits == 0 || bits * bits > 64 {
            return None;
        }

        let inset = (cfg.inset_frac.clamp(0.0, 0.4) * CANONICAL_SIDE).max(0.0);
        let side = CANONICAL_SIDE - 2.0 * inset;
        let step = side / cells as f32;
        let points = (0..cells * cells)
            .map(|i| {
                let (cx, cy) = (i % cells, i / cells);
                Point2::new(
                    inset + (cx as f32 + 0.5) * step,
                    inset + (cy as f32 + 0.5) * step,
                )
            })
            .collect();

        let grid = cells * THRESH_SUBDIV;
        let tstep = side / grid as f32;
        let threshold_points = (0..grid * grid)
            .map(|i| {
                let (tx, ty) = (i % grid, i / grid);
                Point2::new(
                    inset + (tx as f32 + 0.5) * tstep,
                    inset + (ty as f32 + 0.5) * tstep,
                )
            })
            .collect();

        let s = CANONICAL_SIDE;
        Some(Self {
            cfg,
            bits,
            cells,
            points,
            threshold_points,
            square: [
                Point2::new(0.0, 0.0),
                Point2::new(s, 0.0),
                Point2::new(s, s),
                Point2::new(0.0, s),
            ],
            scratch_bits: Vec::with_capacity(cells * cells),
            scratch_thr: Vec::with_capacity(grid * grid),
        })
    }

    /// Sample the marker whose outer corners are `quad` (clockwise).
    pub fn decode_quad(
        &mut self,
        img: &GrayImageView<'_>,
        quad: &[Point2<f32>; 4],
    ) -> Option<Observation> {
        let h = homography_from_4pt(&self.square, quad)?;
        self.decode_warped(img, &h)
    }

    fn decode_warped(&mut self, img: &GrayImageView<'_>, h: &Homography) -> Option<Observation> {
        self.scratch_bits.clear();
        for p in &self.points {
            let q = h.apply(*p);
            self.scratch_bits.push(sample_mean_3x3(img, q.x, q.y)?);
        }

        self.scratch_thr.clear();
        for p in &self.threshold_points {
            let q = h.apply(*p);
            if let Some(v) = sample_mean_3x3(img, q.x, q.y) {
                self.scratch_thr.push(v);
            }
        }

        decode_samples(
            &self.scratch_bits,
            &self.scratch_thr,
            self.cells,
            self.bits,
            self.cfg.border_bits,
            self.cfg.min_border_score,
        )
    }
}

fn decode_samples(
    samples: &[u8],
    thr_samples: &[u8],
    cells: usize,
    bits: usize,
    border: usize,
    min_border_score: f32,
) -> Option<Observation> {
    if samples.len() != cells * cells {
        return None;
    }
    let lo = samples.iter().copied().min()?;
    let hi = samples.iter().copied().max()?;
    if hi - lo < MIN_CONTRAST {
        return None;
    }
    let thr = if thr_samples.is_empty() {
        otsu_threshold_from_samples(samples)
    } else {
        otsu_threshold_from_samples(thr_samples)
    };

    let mut border_black = 0u32;
    let mut border_total = 0u32;
    let mut code = 0u64;
    for cy in 0..cells {
        for cx in 0..cells {
            let is_black = samples[cy * cells + cx] <= thr;
            let in_border = cx < border || cy < border || cx >= cells - border || cy >= cells - border;
            if in_border {
                border_total += 1;
                border_black += u32::from(is_black);
            } else if is_black {
                code |= 1u64 << ((cy - border) * bits + (cx - border));
            }
        }
    }

    let border_score = if border_total > 0 {
        border_black as f32 / border_total as f32
    } else {
        1.0
    };
    (border_score >= min_border_score).then_some(Observation { code, border_score })
}

fn sample_mean_3x3(img: &GrayImageView<'_>, x: f32, y: f32) -> Option<u8> {
    let ix = x.floor() as i32;
    let iy = y.floor() as i32;
    if ix < 1 || iy < 1 || ix + 1 >= img.width as i32 || iy + 1 >= img.height as i32 {
        return None;
    }
    let mut sum = 0u32;
    for dy in -1..=1 {
        let row = (iy + dy) as usize * img.width;
        for dx in -1..=1 {
            sum += img.data[row + (ix + dx) as usize] as u32;
        }
    }
    Some((sum / 9) as u8)
}

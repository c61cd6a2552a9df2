//! Generated frames with markers drifting over a light background.

use marker_triptych_core::{Bgr, ColorImage, FrameSource, MarkerDetection, PreviewError};

use crate::render::{paint_marker, MarkerLayout};
use crate::{rotate_code_u64, Dictionary};

const BACKGROUND: Bgr = Bgr::gray(214);

#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticConfig {
    pub width: usize,
    pub height: usize,
    /// Marker ids drawn in every frame, one slot each.
    pub ids: Vec<u32>,
    pub cell_px: usize,
    /// Frames produced before end of stream.
    pub frames: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            ids: vec![0, 7, 23],
            cell_px: 12,
            frames: 60,
        }
    }
}

/// Frame source that needs no camera.
///
/// Marker `i` sits in its own horizontal slot, is turned `i` quarter turns
/// and drifts a few pixels per frame.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    cfg: SyntheticConfig,
    dict: Dictionary,
    next: usize,
}

impl SyntheticSource {
    pub fn new(dict: Dictionary, cfg: SyntheticConfig) -> Self {
        Self { cfg, dict, next: 0 }
    }

    pub fn with_frames(dict: Dictionary, frames: usize) -> Self {
        Self::new(
            dict,
            SyntheticConfig {
                frames,
                ..SyntheticConfig::default()
            },
        )
    }

    fn layout(&self) -> MarkerLayout {
        MarkerLayout {
            bits: self.dict.marker_size,
            cell_px: self.cfg.cell_px,
            quiet_px: self.cfg.cell_px,
        }
    }

    fn slot_origin(&self, slot: usize, frame: usize) -> [i32; 2] {
        let slots = self.cfg.ids.len().max(1);
        let slot_w = self.cfg.width / slots;
        let total = self.layout().total_px();
        let room_x = slot_w.saturating_sub(total).max(1);
        let room_y = self.cfg.height.saturating_sub(total + 2).max(1);
        let x = slot * slot_w + (frame * 3) % room_x;
        let y = 1 + (slot * room_y / slots + frame * 2) % room_y;
        [x as i32, y as i32]
    }

    /// Render frame `index` and the ground-truth detections in it.
    pub fn render(&self, index: usize) -> (ColorImage, Vec<MarkerDetection>) {
        let mut img = ColorImage::filled(self.cfg.width, self.cfg.height, BACKGROUND);
        let layout = self.layout();
        let mut truth = Vec::with_capacity(self.cfg.ids.len());
        for (slot, &id) in self.cfg.ids.iter().enumerate() {
            let Some(code) = self.dict.code(id as usize) else {
                log::warn!("marker id {id} is not in {}", self.dict.name);
                continue;
            };
            let turns = (slot % 4) as u8;
            let drawn = rotate_code_u64(code, self.dict.marker_size, turns);
            let mut corners =
                paint_marker(&mut img.view_mut(), drawn, layout, self.slot_origin(slot, index));
            corners.rotate_left(turns as usize);
            truth.push(MarkerDetection::new(id as i32, corners));
        }
        (img, truth)
    }

    pub fn expected_markers(&self, index: usize) -> Vec<MarkerDetection> {
        self.render(index).1
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<ColorImage>, PreviewError> {
        if self.next >= self.cfg.frames {
            return Ok(None);
        }
        let (frame, _) = self.render(self.next);
        self.next += 1;
        Ok(Some(frame))
    }
}

use marker_triptych_core::{ColorImage, DisplaySink, PreviewError, Stage, WindowConfig};
use opencv::highgui;

use crate::mat::mat_from_image;
use crate::CvBackendError;

/// Resizable HighGUI window that keeps the canvas aspect ratio.
pub struct HighGuiDisplay {
    title: String,
}

impl HighGuiDisplay {
    pub fn open(window: &WindowConfig) -> Result<Self, PreviewError> {
        let title = window.title.clone();
        highgui::named_window(&title, highgui::WINDOW_NORMAL | highgui::WINDOW_KEEPRATIO)
            .and_then(|_| highgui::resize_window(&title, window.width as i32, window.height as i32))
            .map_err(|e| PreviewError::DisplayOpen(e.to_string()))?;
        log::debug!("opened window {title:?} at {}x{}", window.width, window.height);
        Ok(Self { title })
    }

    fn show_mat(&self, canvas: &ColorImage) -> Result<(), CvBackendError> {
        let mat = mat_from_image(canvas)?;
        highgui::imshow(&self.title, &mat)?;
        Ok(())
    }
}

impl DisplaySink for HighGuiDisplay {
    fn show(&mut self, canvas: &ColorImage) -> Result<(), PreviewError> {
        self.show_mat(canvas).map_err(|e| e.at(Stage::Display))
    }

    fn poll_key(&mut self, timeout_ms: u32) -> Result<Option<i32>, PreviewError> {
        let key = highgui::wait_key(timeout_ms.min(i32::MAX as u32) as i32)
            .map_err(|e| CvBackendError::from(e).at(Stage::Display))?;
        Ok((key >= 0).then_some(key))
    }
}

impl Drop for HighGuiDisplay {
    fn drop(&mut self) {
        if let Err(err) = highgui::destroy_window(&self.title) {
            log::debug!("failed to close window {:?}: {err}", self.title);
        }
    }
}

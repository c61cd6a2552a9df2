//! Conversions between OpenCV matrices and core image buffers.

use std::ffi::c_void;

use marker_triptych_core::{ColorImage, PanelViewMut};
use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::prelude::*;

use crate::CvBackendError;

/// Copy a frame into a new `CV_8UC3` matrix.
pub fn mat_from_image(img: &ColorImage) -> Result<Mat, CvBackendError> {
    let mut mat = Mat::new_rows_cols_with_default(
        img.height as i32,
        img.width as i32,
        CV_8UC3,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(&img.data);
    Ok(mat)
}

/// Copy a `CV_8UC3` matrix into an owned frame.
pub fn mat_to_image(mat: &Mat) -> Result<ColorImage, CvBackendError> {
    let typ = mat.typ();
    if typ != CV_8UC3 {
        return Err(CvBackendError::UnexpectedMatType { typ });
    }
    let data = if mat.is_continuous() {
        mat.data_bytes()?.to_vec()
    } else {
        mat.try_clone()?.data_bytes()?.to_vec()
    };
    Ok(ColorImage::from_raw(
        mat.cols() as usize,
        mat.rows() as usize,
        data,
    )?)
}

/// Run `f` with a matrix header that aliases the panel's pixels.
///
/// OpenCV draws straight into the canvas; no pixels are copied.
pub fn with_panel_mat<T>(
    panel: &mut PanelViewMut<'_>,
    f: impl FnOnce(&mut Mat) -> opencv::Result<T>,
) -> Result<T, CvBackendError> {
    let (rows, cols, step) = (panel.height() as i32, panel.width() as i32, panel.stride());
    // SAFETY: the header covers `rows` rows of `cols * 3` bytes spaced `step`
    // apart, which is exactly the memory the view borrows mutably. The header
    // does not own the data and is dropped before the borrow ends.
    let mut mat = unsafe {
        Mat::new_rows_cols_with_data_unsafe(
            rows,
            cols,
            CV_8UC3,
            panel.as_mut_ptr().cast::<c_void>(),
            step,
        )?
    };
    let out = f(&mut mat)?;
    drop(mat);
    Ok(out)
}

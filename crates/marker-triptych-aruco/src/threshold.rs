//! Otsu thresholding over sample sets and whole grayscale images.
//!
//! The returned `t` is the last intensity of the dark class: a value `v` is
//! dark when `v <= t`.

use marker_triptych_core::GrayImageView;

pub(crate) fn otsu_threshold_from_samples(samples: &[u8]) -> u8 {
    let mut hist = [0u32; 256];
    for &v in samples {
        hist[v as usize] += 1;
    }
    otsu_threshold_from_histogram(&hist)
}

pub(crate) fn otsu_threshold_image(img: &GrayImageView<'_>) -> u8 {
    otsu_threshold_from_samples(img.data)
}

fn otsu_threshold_from_histogram(hist: &[u32; 256]) -> u8 {
    let total: u64 = hist.iter().map(|&h| h as u64).sum();
    if total == 0 {
        return 127;
    }

    let occupied: Vec<usize> = (0..256).filter(|&i| hist[i] > 0).collect();
    let (Some(&lo), Some(&hi)) = (occupied.first(), occupied.last()) else {
        return 127;
    };
    if lo == hi {
        return lo as u8;
    }
    if occupied.len() == 2 {
        return ((lo + hi) / 2) as u8;
    }

    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let total = total as f64;
    let mut sum_dark = 0f64;
    let mut w_dark = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 127u8;

    for (t, &h) in hist.iter().enumerate() {
        w_dark += h as f64;
        if w_dark < 1.0 {
            continue;
        }
        let w_light = total - w_dark;
        if w_light < 1.0 {
            break;
        }
        sum_dark += t as f64 * h as f64;
        let m_dark = sum_dark / w_dark;
        let m_light = (sum_total - sum_dark) / w_light;
        let var_between = w_dark * w_light * (m_dark - m_light) * (m_dark - m_light);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }
    best_t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_levels_split_at_midpoint() {
        assert_eq!(otsu_threshold_from_samples(&[0, 0, 255, 255, 255]), 127);
        assert_eq!(otsu_threshold_from_samples(&[40, 200]), 120);
    }

    #[test]
    fn flat_and_empty_inputs() {
        assert_eq!(otsu_threshold_from_samples(&[90; 12]), 90);
        assert_eq!(otsu_threshold_from_samples(&[]), 127);
    }

    #[test]
    fn three_clusters_separate_the_darkest() {
        let mut samples = vec![10u8; 100];
        samples.extend(std::iter::repeat(12).take(50));
        samples.extend(std::iter::repeat(220).take(300));
        samples.extend(std::iter::repeat(250).take(300));
        let t = otsu_threshold_from_samples(&samples);
        assert!((12..220).contains(&t), "t = {t}");
    }

    #[test]
    fn image_threshold_uses_all_pixels() {
        let data: Vec<u8> = (0..64).map(|i| if i % 4 == 0 { 5 } else { 240 }).collect();
        let view = GrayImageView {
            width: 8,
            height: 8,
            data: &data,
        };
        let t = otsu_threshold_image(&view);
        assert!((5..240).contains(&t));
    }
}

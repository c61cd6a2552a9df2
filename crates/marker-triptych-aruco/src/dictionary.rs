//! Marker dictionary metadata and packed codes.

/// A fixed ArUco symbol set.
#[derive(Clone, Copy, Debug)]
pub struct Dictionary {
    pub name: &'static str,
    /// Inner bits per marker side.
    pub marker_size: usize,
    /// Bit errors the dictionary can still disambiguate.
    pub max_correction_bits: u8,
    /// One packed code per marker id.
    ///
    /// Bit `y * marker_size + x` holds inner cell `(x, y)`, **black = 1**.
    pub codes: &'static [u64],
}

impl Dictionary {
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.marker_size * self.marker_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn code(&self, id: usize) -> Option<u64> {
        self.codes.get(id).copied()
    }

    /// Whether inner cell `(x, y)` of marker `id` is black.
    pub fn is_black(&self, id: usize, x: usize, y: usize) -> Option<bool> {
        if x >= self.marker_size || y >= self.marker_size {
            return None;
        }
        self.code(id)
            .map(|code| (code >> (y * self.marker_size + x)) & 1 == 1)
    }
}

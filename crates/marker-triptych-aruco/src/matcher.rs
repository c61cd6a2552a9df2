//! Code lookup with rotation.

use crate::Dictionary;

/// Best dictionary entry for an observed code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub id: u32,
    /// `observed == rotate_code_u64(codes[id], n, rotation)`.
    pub rotation: u8,
    pub hamming: u8,
}

/// Exhaustive matcher over ids and the four rotations.
#[derive(Clone, Debug)]
pub struct Matcher {
    dict: Dictionary,
    max_hamming: u8,
    rotated: Vec<[u64; 4]>,
}

impl Matcher {
    /// `None` when the dictionary's codes do not fit in 64 bits.
    pub fn new(dict: Dictionary, max_hamming: u8) -> Option<Self> {
        if dict.bit_count() > 64 {
            return None;
        }
        let n = dict.marker_size;
        let rotated = dict
            .codes
            .iter()
            .map(|&code| [0, 1, 2, 3].map(|r| rotate_code_u64(code, n, r)))
            .collect();
        Some(Self {
            dict,
            max_hamming,
            rotated,
        })
    }

    /// Matcher accepting up to the dictionary's own correction capacity.
    pub fn with_default_tolerance(dict: Dictionary) -> Option<Self> {
        Self::new(dict, dict.max_correction_bits)
    }

    #[inline]
    pub fn dictionary(&self) -> Dictionary {
        self.dict
    }

    #[inline]
    pub fn max_hamming(&self) -> u8 {
        self.max_hamming
    }

    /// Lowest-distance match within `max_hamming`; the first one wins ties.
    pub fn match_code(&self, observed: u64) -> Option<Match> {
        let mut best: Option<Match> = None;
        for (id, rots) in self.rotated.iter().enumerate() {
            for (rot, &cand) in rots.iter().enumerate() {
                let hamming = (observed ^ cand).count_ones() as u8;
                if hamming > self.max_hamming || best.is_some_and(|b| b.hamming <= hamming) {
                    continue;
                }
                best = Some(Match {
                    id: id as u32,
                    rotation: rot as u8,
                    hamming,
                });
                if hamming == 0 {
                    return best;
                }
            }
        }
        best
    }
}

/// Rotate a row-major code (`idx = y * n + x`) by `rot` quarter turns
/// clockwise.
pub fn rotate_code_u64(code: u64, n: usize, rot: u8) -> u64 {
    let rot = rot & 3;
    if rot == 0 {
        return code;
    }
    let mut out = 0u64;
    for y in 0..n {
        for x in 0..n {
            let (sx, sy) = match rot {
                1 => (y, n - 1 - x),
                2 => (n - 1 - x, n - 1 - y),
                _ => (n - 1 - y, x),
            };
            out |= ((code >> (sy * n + sx)) & 1) << (y * n + x);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::DICT_4X4_50;

    #[test]
    fn four_quarter_turns_are_identity() {
        let code = 0xb352;
        let mut r = code;
        for _ in 0..4 {
            r = rotate_code_u64(r, 4, 1);
        }
        assert_eq!(r, code);
        assert_eq!(
            rotate_code_u64(rotate_code_u64(code, 4, 1), 4, 1),
            rotate_code_u64(code, 4, 2)
        );
    }

    #[test]
    fn quarter_turn_moves_top_left_to_top_right() {
        // only cell (0, 0) set
        let r = rotate_code_u64(1, 4, 1);
        assert_eq!(r, 1 << 3);
    }

    #[test]
    fn finds_rotated_code() {
        let matcher = Matcher::new(DICT_4X4_50, 0).expect("fits");
        let observed = rotate_code_u64(DICT_4X4_50.codes[17], 4, 3);
        let m = matcher.match_code(observed).expect("match");
        assert_eq!((m.id, m.rotation, m.hamming), (17, 3, 0));
    }

    #[test]
    fn corrects_a_single_bit_error() {
        let matcher = Matcher::with_default_tolerance(DICT_4X4_50).expect("fits");
        let observed = rotate_code_u64(DICT_4X4_50.codes[5], 4, 2) ^ (1 << 6);
        let m = matcher.match_code(observed).expect("match");
        assert_eq!((m.id, m.rotation, m.hamming), (5, 2, 1));
        assert!(Matcher::new(DICT_4X4_50, 0)
            .expect("fits")
            .match_code(observed)
            .is_none());
    }
}

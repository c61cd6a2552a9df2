//! Dictionaries compiled into the binary.
//!
//! Codes follow the OpenCV predefined tables with polarity flipped to
//! black = 1. `DICT_4X4_50` is the first half of `DICT_4X4_100`.

#![allow(clippy::unreadable_literal)]

use marker_triptych_core::DictionaryKind;

use crate::Dictionary;

#[rustfmt::skip]
const DICT_4X4_100_CODES: [u64; 100] = [
    0xb352, 0xa60f, 0x4b33, 0x9d66, 0x86d5, 0x4c61, 0x8b86, 0xb0dc, 0xa480, 0x950c,
    0x7660, 0x1a77, 0x128f, 0x0fab, 0x72db, 0x839b, 0x599d, 0xff99, 0x85c9, 0x0a91,
    0x2e9e, 0x2bf2, 0x54cc, 0xbe44, 0x1d80, 0x71d6, 0xd8ca, 0xd55a, 0x3b7b, 0x09d3,
    0x57dd, 0xb215, 0x0c86, 0x2cf0, 0x8aef, 0x6b6f, 0x51e7, 0x00df, 0x904f, 0xa5c7,
    0xe717, 0xebab, 0xceb3, 0xb2e3, 0xe8db, 0x288b, 0x034b, 0xd92d, 0x8bf5, 0x37f5,
    0xd675, 0xe955, 0x7d45, 0x1605, 0x7fe9, 0x19e9, 0xdb79, 0x6879, 0xb729, 0x5809,
    0x0419, 0x2781, 0xfafe, 0xdd3e, 0xba2e, 0xa136, 0xc9de, 0xab5e, 0xc65e, 0x6ec6,
    0x7a06, 0xc122, 0xdfc2, 0x2592, 0xec02, 0x2a12, 0x07ac, 0xb96c, 0xe564, 0x5434,
    0xe6cc, 0xfa1c, 0x135c, 0x4568, 0x5b60, 0x2220, 0xab88, 0x4d10, 0x5153, 0x4aae,
    0x1791, 0x0caf, 0x2d9f, 0x7c4b, 0xe46d, 0xd03d, 0x930d, 0x340d, 0xd869, 0x1cf1,
];

pub const DICT_4X4_50: Dictionary = Dictionary {
    name: "DICT_4X4_50",
    marker_size: 4,
    max_correction_bits: 1,
    codes: DICT_4X4_100_CODES.split_at(50).0,
};

pub const DICT_4X4_100: Dictionary = Dictionary {
    name: "DICT_4X4_100",
    marker_size: 4,
    max_correction_bits: 1,
    codes: &DICT_4X4_100_CODES,
};

const ALL: [Dictionary; 2] = [DICT_4X4_50, DICT_4X4_100];

/// Look up an embedded dictionary by its OpenCV name.
pub fn builtin_dictionary(name: &str) -> Option<Dictionary> {
    ALL.iter().copied().find(|d| d.name.eq_ignore_ascii_case(name))
}

pub fn dictionary(kind: DictionaryKind) -> Dictionary {
    match kind {
        DictionaryKind::Dict4x4_50 => DICT_4X4_50,
        DictionaryKind::Dict4x4_100 => DICT_4X4_100,
    }
}

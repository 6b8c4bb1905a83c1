// src/display/segment_map.rs - Where each LCD segment lives in segment memory

pub const SEG_A: u8 = 0x01;
pub const SEG_B: u8 = 0x02;
pub const SEG_C: u8 = 0x04;
pub const SEG_D: u8 = 0x08;
pub const SEG_E: u8 = 0x10;
pub const SEG_F: u8 = 0x20;
pub const SEG_G: u8 = 0x40;
pub const SEG_DP: u8 = 0x80;

/// Segment flags in map column order.
pub const SEGMENT_FLAGS: [u8; 8] = [SEG_A, SEG_B, SEG_C, SEG_D, SEG_E, SEG_F, SEG_G, SEG_DP];

pub const DIGIT_COUNT: usize = 8;

/// Packed `0xBBMM` entries: byte index in the high byte, bit mask in the low.
pub type SegmentMap = [[u16; 8]; DIGIT_COUNT];

/// Digit position x segment flag (A, B, C, D, E, F, G, DP) for the watch glass.
///
/// Odd and even positions are wired with different patterns, and each pair
/// shares a memory byte, so nothing here can be derived arithmetically.
pub static LCD_MAP: SegmentMap = [
    // Digit 0
    [0x0b04, 0x0b40, 0x0b20, 0x0b01, 0x0a10, 0x0a20, 0x0b02, 0x0b10],
    // Digit 1
    [0x0940, 0x0a04, 0x0a02, 0x0910, 0x0901, 0x0902, 0x0a01, 0x0a08],
    // Digit 2
    [0x0804, 0x0840, 0x0820, 0x0801, 0x0710, 0x0720, 0x0802, 0x0810],
    // Digit 3
    [0x0640, 0x0704, 0x0702, 0x0610, 0x0601, 0x0602, 0x0701, 0x0708],
    // Digit 4
    [0x0504, 0x0540, 0x0520, 0x0501, 0x0410, 0x0420, 0x0502, 0x0510],
    // Digit 5
    [0x0340, 0x0404, 0x0402, 0x0310, 0x0301, 0x0302, 0x0401, 0x0408],
    // Digit 6
    [0x0204, 0x0240, 0x0220, 0x0201, 0x0110, 0x0120, 0x0202, 0x0210],
    // Digit 7
    [0x0040, 0x0104, 0x0102, 0x0010, 0x0001, 0x0002, 0x0101, 0x0108],
];

/// One bit of LCD memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentBit {
    pub byte: usize,
    pub mask: u8,
}

impl SegmentBit {
    pub const fn from_packed(addr: u16) -> Self {
        Self {
            byte: (addr >> 8) as usize,
            mask: (addr & 0xFF) as u8,
        }
    }
}

/// Location of `flag` (one of the `SEG_*` constants) for digit `pos`.
pub fn segment_bit(map: &SegmentMap, pos: usize, flag: u8) -> Option<SegmentBit> {
    let column = SEGMENT_FLAGS.iter().position(|f| *f == flag)?;
    map.get(pos).map(|digit| SegmentBit::from_packed(digit[column]))
}

/// Fixed symbols that sit outside the digit map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Am,
    Pm,
    Colon,
    Minus,
    Plus,
    /// Division sign, doubling as the low-battery marker.
    Divide,
}

impl Indicator {
    pub const ALL: [Indicator; 6] = [
        Indicator::Am,
        Indicator::Pm,
        Indicator::Colon,
        Indicator::Minus,
        Indicator::Plus,
        Indicator::Divide,
    ];

    pub const fn bit(self) -> SegmentBit {
        match self {
            Indicator::Am => SegmentBit::from_packed(0x0004),
            Indicator::Pm => SegmentBit::from_packed(0x0140),
            Indicator::Colon => SegmentBit::from_packed(0x0320),
            Indicator::Minus => SegmentBit::from_packed(0x0604),
            Indicator::Plus => SegmentBit::from_packed(0x0904),
            Indicator::Divide => SegmentBit::from_packed(0x0c01),
        }
    }
}

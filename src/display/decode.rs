// src/display/decode.rs - LCD memory to per-digit segment masks
use super::segment_map::{
    DIGIT_COUNT, Indicator, LCD_MAP, SEG_DP, SEGMENT_FLAGS, SegmentBit, SegmentMap,
};
use crate::hardware::lcd::LcdBuffer;

/// Which fixed indicators are lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorSet {
    bits: u8,
}

impl IndicatorSet {
    fn index(indicator: Indicator) -> u8 {
        Indicator::ALL
            .iter()
            .position(|i| *i == indicator)
            .map(|p| 1 << p)
            .unwrap_or(0)
    }

    pub fn insert(&mut self, indicator: Indicator) {
        self.bits |= Self::index(indicator);
    }

    pub fn contains(&self, indicator: Indicator) -> bool {
        self.bits & Self::index(indicator) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// Decoded contents of the glass. `digits[pos]` uses the `SEG_*` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodedDisplay {
    pub digits: [u8; DIGIT_COUNT],
    pub indicators: IndicatorSet,
}

impl DecodedDisplay {
    /// Best-effort reading in display order (position 7 first).
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(DIGIT_COUNT * 2 + 1);
        for pos in (0..DIGIT_COUNT).rev() {
            let mask = self.digits[pos];
            out.push(glyph_char(mask));
            if mask & SEG_DP != 0 {
                out.push('.');
            }
            if pos == 6 && self.indicators.contains(Indicator::Colon) {
                out.push(':');
            }
        }
        out
    }
}

pub fn decode_digit(map: &SegmentMap, lcd: &LcdBuffer, pos: usize) -> u8 {
    let Some(entries) = map.get(pos) else {
        return 0;
    };
    entries
        .iter()
        .zip(SEGMENT_FLAGS)
        .filter(|(addr, _)| {
            let bit = SegmentBit::from_packed(**addr);
            lcd.test(bit.byte, bit.mask)
        })
        .fold(0, |mask, (_, flag)| mask | flag)
}

pub fn decode_with(map: &SegmentMap, lcd: &LcdBuffer) -> DecodedDisplay {
    let mut decoded = DecodedDisplay::default();
    for (pos, digit) in decoded.digits.iter_mut().enumerate() {
        *digit = decode_digit(map, lcd, pos);
    }
    for indicator in Indicator::ALL {
        let bit = indicator.bit();
        if lcd.test(bit.byte, bit.mask) {
            decoded.indicators.insert(indicator);
        }
    }
    decoded
}

/// Decode against the watch's own segment map.
pub fn decode(lcd: &LcdBuffer) -> DecodedDisplay {
    decode_with(&LCD_MAP, lcd)
}

const GLYPHS: &[(u8, char)] = &[
    (0x3F, '0'),
    (0x06, '1'),
    (0x5B, '2'),
    (0x4F, '3'),
    (0x66, '4'),
    (0x6D, '5'),
    (0x7D, '6'),
    (0x07, '7'),
    (0x7F, '8'),
    (0x6F, '9'),
    (0x77, 'A'),
    (0x7C, 'b'),
    (0x39, 'C'),
    (0x5E, 'd'),
    (0x79, 'E'),
    (0x71, 'F'),
    (0x76, 'H'),
    (0x38, 'L'),
    (0x54, 'n'),
    (0x5C, 'o'),
    (0x73, 'P'),
    (0x50, 'r'),
    (0x78, 't'),
    (0x3E, 'U'),
    (0x6E, 'y'),
    (0x40, '-'),
    (0x08, '_'),
    (0x00, ' '),
];

/// Character a segment mask most likely shows; `?` when unknown.
pub fn glyph_char(mask: u8) -> char {
    let segments = mask & !SEG_DP;
    GLYPHS
        .iter()
        .find(|(m, _)| *m == segments)
        .map(|(_, c)| *c)
        .unwrap_or('?')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::segment_map::{SEG_A, SEG_G, segment_bit};

    #[test]
    fn test_every_mapped_bit_round_trips() {
        for pos in 0..DIGIT_COUNT {
            for flag in SEGMENT_FLAGS {
                let bit = segment_bit(&LCD_MAP, pos, flag).unwrap();
                let mut lcd = LcdBuffer::new();
                lcd.set_bits(bit.byte, bit.mask);
                let decoded = decode(&lcd);
                assert_eq!(decoded.digits[pos], flag, "pos {pos} flag 0x{flag:02x}");
                for other in (0..DIGIT_COUNT).filter(|p| *p != pos) {
                    assert_eq!(decoded.digits[other], 0, "pos {pos} flag 0x{flag:02x} leaked");
                }
                assert!(decoded.indicators.is_empty());
            }
        }
    }

    #[test]
    fn test_out_of_range_byte_decodes_off() {
        let mut map = LCD_MAP;
        map[3][0] = 0x2001; // byte 32 does not exist
        let lcd = LcdBuffer::from_bytes([0xFF; crate::hardware::lcd::LCD_MEM_LEN]);
        assert_eq!(decode_digit(&map, &lcd, 3) & SEG_A, 0);
        assert_eq!(decode_digit(&map, &lcd, 3), 0xFE);
    }

    #[test]
    fn test_wide_mask_lights_on_any_bit() {
        let mut map = LCD_MAP;
        map[0][0] = 0x0C03;
        let mut lcd = LcdBuffer::new();
        lcd.set_bits(12, 0x02);
        assert_eq!(decode_digit(&map, &lcd, 0) & SEG_A, SEG_A);
    }

    #[test]
    fn test_indicators_decode() {
        let mut lcd = LcdBuffer::new();
        for indicator in [Indicator::Pm, Indicator::Colon] {
            let bit = indicator.bit();
            lcd.set_bits(bit.byte, bit.mask);
        }
        let decoded = decode(&lcd);
        assert!(decoded.indicators.contains(Indicator::Pm));
        assert!(decoded.indicators.contains(Indicator::Colon));
        assert!(!decoded.indicators.contains(Indicator::Am));
        assert_eq!(decoded.digits, [0; DIGIT_COUNT]);
    }

    #[test]
    fn test_text_reads_left_to_right_from_position_7() {
        let mut decoded = DecodedDisplay::default();
        decoded.digits[7] = 0x06;
        decoded.digits[6] = 0x5B;
        decoded.digits[0] = SEG_G;
        decoded.digits[2] = 0x3F | SEG_DP;
        decoded.indicators.insert(Indicator::Colon);
        assert_eq!(decoded.text(), "12:   0. -");
    }

    #[test]
    fn test_unknown_glyph() {
        assert_eq!(glyph_char(SEG_A | SEG_G), '?');
        assert_eq!(glyph_char(0x3F | SEG_DP), '0');
    }
}

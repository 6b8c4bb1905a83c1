// src/firmware/lcdtext.rs - Text and number output on the 8-digit glass
use crate::display::segment_map::{
    DIGIT_COUNT, Indicator, LCD_MAP, SEG_A, SEG_B, SEG_C, SEG_D, SEG_DP, SEG_E, SEG_F, SEG_G,
    SEGMENT_FLAGS, segment_bit,
};
use crate::hardware::PeripheralBus;

const DIGITS: [u8; 16] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,         // 0
    SEG_B | SEG_C,                                         // 1
    SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,                 // 2
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,                 // 3
    SEG_B | SEG_C | SEG_F | SEG_G,                         // 4
    SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,                 // 5
    SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,         // 6
    SEG_A | SEG_B | SEG_C,                                 // 7
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G, // 8
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,         // 9
    SEG_A | SEG_B | SEG_C | SEG_E | SEG_F | SEG_G,         // A
    SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,                 // b
    SEG_A | SEG_D | SEG_E | SEG_F,                         // C
    SEG_B | SEG_C | SEG_D | SEG_E | SEG_G,                 // d
    SEG_A | SEG_D | SEG_E | SEG_F | SEG_G,                 // E
    SEG_A | SEG_E | SEG_F | SEG_G,                         // F
];

/// Segment mask for `c`. Unknown characters are blank.
pub fn font(c: char) -> u8 {
    if let Some(d) = c.to_digit(16) {
        return DIGITS[d as usize];
    }
    match c.to_ascii_lowercase() {
        'h' => SEG_B | SEG_C | SEG_E | SEG_F | SEG_G,
        'l' => SEG_D | SEG_E | SEG_F,
        'n' => SEG_C | SEG_E | SEG_G,
        'o' => SEG_C | SEG_D | SEG_E | SEG_G,
        'p' => SEG_A | SEG_B | SEG_E | SEG_F | SEG_G,
        'r' => SEG_E | SEG_G,
        's' => DIGITS[5],
        't' => SEG_D | SEG_E | SEG_F | SEG_G,
        'u' => SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
        'y' => SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
        '-' => SEG_G,
        '_' => SEG_D,
        _ => 0,
    }
}

/// Blank the main LCD bank.
pub fn lcd_zero(bus: &mut PeripheralBus) {
    bus.lcdm_mut().clear();
}

/// Replace the segments of digit `pos` with `mask`.
pub fn lcd_segments(bus: &mut PeripheralBus, pos: usize, mask: u8) {
    for flag in SEGMENT_FLAGS {
        let Some(bit) = segment_bit(&LCD_MAP, pos, flag) else {
            return;
        };
        if mask & flag != 0 {
            bus.lcdm_mut().set_bits(bit.byte, bit.mask);
        } else {
            bus.lcdm_mut().clear_bits(bit.byte, bit.mask);
        }
    }
}

pub fn lcd_char(bus: &mut PeripheralBus, pos: usize, c: char) {
    lcd_segments(bus, pos, font(c));
}

/// Hex digit `value & 0xF` at `pos`.
pub fn lcd_digit(bus: &mut PeripheralBus, pos: usize, value: u32) {
    lcd_segments(bus, pos, DIGITS[(value & 0xF) as usize]);
}

pub fn lcd_cleardigit(bus: &mut PeripheralBus, pos: usize) {
    lcd_segments(bus, pos, 0);
}

pub fn lcd_dp(bus: &mut PeripheralBus, pos: usize, on: bool) {
    if let Some(bit) = segment_bit(&LCD_MAP, pos, SEG_DP) {
        if on {
            bus.lcdm_mut().set_bits(bit.byte, bit.mask);
        } else {
            bus.lcdm_mut().clear_bits(bit.byte, bit.mask);
        }
    }
}

/// Left-aligned text starting at position 7. A `.` lights the decimal point
/// of the character before it. Unused positions are blanked.
pub fn lcd_string(bus: &mut PeripheralBus, text: &str) {
    let mut masks: Vec<u8> = Vec::with_capacity(DIGIT_COUNT);
    for c in text.chars() {
        match (c, masks.last_mut()) {
            ('.', Some(last)) if *last & SEG_DP == 0 => *last |= SEG_DP,
            ('.', _) => masks.push(SEG_DP),
            _ => masks.push(font(c)),
        }
    }
    for (i, pos) in (0..DIGIT_COUNT).rev().enumerate() {
        lcd_segments(bus, pos, masks.get(i).copied().unwrap_or(0));
    }
}

/// Right-aligned decimal with leading blanks. Negative values light the
/// minus indicator. Only the low eight digits fit.
pub fn lcd_number(bus: &mut PeripheralBus, value: i64) {
    let bcd = l2bcd(value.unsigned_abs());
    set_indicator(bus, Indicator::Minus, value < 0);
    for pos in 0..DIGIT_COUNT {
        let rest = bcd >> (4 * pos);
        if pos == 0 || rest != 0 {
            lcd_digit(bus, pos, rest & 0xF);
        } else {
            lcd_cleardigit(bus, pos);
        }
    }
}

/// All eight nibbles of `value`, most significant at position 7.
pub fn lcd_hex(bus: &mut PeripheralBus, value: u32) {
    for pos in 0..DIGIT_COUNT {
        lcd_digit(bus, pos, value >> (4 * pos));
    }
}

pub fn set_indicator(bus: &mut PeripheralBus, indicator: Indicator, on: bool) {
    let bit = indicator.bit();
    if on {
        bus.lcdm_mut().set_bits(bit.byte, bit.mask);
    } else {
        bus.lcdm_mut().clear_bits(bit.byte, bit.mask);
    }
}

/// Two-digit packed BCD.
pub fn int2bcd(value: u32) -> u32 {
    ((value / 10) << 4) | (value % 10)
}

/// Packed BCD of the low eight decimal digits.
pub fn l2bcd(mut value: u64) -> u32 {
    let mut result = 0u32;
    let mut shift = 0;
    while value > 0 && shift < 32 {
        result |= ((value % 10) as u32) << shift;
        value /= 10;
        shift += 4;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::decode;

    #[test]
    fn test_bcd() {
        assert_eq!(int2bcd(59), 0x59);
        assert_eq!(int2bcd(7), 0x07);
        assert_eq!(l2bcd(0), 0);
        assert_eq!(l2bcd(20251006), 0x2025_1006);
        assert_eq!(l2bcd(123_456_789), 0x2345_6789);
    }

    #[test]
    fn test_number_right_aligned() {
        let mut bus = PeripheralBus::default();
        lcd_number(&mut bus, -1204);
        let shown = decode(bus.lcdm());
        assert_eq!(shown.text(), "    1204");
        assert!(shown.indicators.contains(Indicator::Minus));

        lcd_number(&mut bus, 0);
        let shown = decode(bus.lcdm());
        assert_eq!(shown.text(), "       0");
        assert!(!shown.indicators.contains(Indicator::Minus));
    }

    #[test]
    fn test_string_and_dp() {
        let mut bus = PeripheralBus::default();
        lcd_hex(&mut bus, 0xDEAD_BEEF);
        lcd_string(&mut bus, "25.10.06");
        assert_eq!(decode(bus.lcdm()).text(), "25.10.06  ");
        lcd_string(&mut bus, "Err");
        assert_eq!(decode(bus.lcdm()).text(), "Err     ");
    }

    #[test]
    fn test_hex() {
        let mut bus = PeripheralBus::default();
        lcd_hex(&mut bus, 0x0BAD_CAFE);
        assert_eq!(decode(bus.lcdm()).text(), "0bAdCAFE");
    }

    #[test]
    fn test_char_replaces_previous_glyph() {
        let mut bus = PeripheralBus::default();
        lcd_char(&mut bus, 3, '8');
        lcd_dp(&mut bus, 3, true);
        lcd_char(&mut bus, 3, '1');
        assert_eq!(decode(bus.lcdm()).digits[3], SEG_B | SEG_C);
        lcd_zero(&mut bus);
        assert!(bus.lcdm().is_blank());
    }
}
